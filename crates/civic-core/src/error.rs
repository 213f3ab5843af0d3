//! Parse errors for closed enums
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid status '{0}', expected one of: Pending, In Progress, Resolved")]
pub struct StatusParseError(pub String);
