//! Civic Core: Complaint data model, status/severity enums, ID generation
//!
//! Shared types for the civic issue reporter. Every other crate in the
//! workspace builds on the records defined here.

pub mod complaint;
pub mod error;
pub mod severity;
pub mod status;

pub use complaint::{generate_complaint_id, Complaint, Detection};
pub use error::StatusParseError;
pub use severity::SeverityLevel;
pub use status::ComplaintStatus;

/// Engine version reported by the health endpoint
pub const CIVIC_VERSION: &str = "1.0.0";
