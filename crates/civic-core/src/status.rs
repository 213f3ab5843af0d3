//! Complaint workflow status
//!
//! A closed enumeration of the three recognized workflow states. Any
//! other value is rejected at the boundary; the status field never
//! transitions automatically.

use crate::error::StatusParseError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Workflow status of a complaint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ComplaintStatus {
    /// Newly submitted, nobody has acted on it yet
    #[default]
    Pending,
    /// An authority is working on it
    #[serde(rename = "In Progress")]
    InProgress,
    /// Fixed and closed
    Resolved,
}

impl ComplaintStatus {
    /// All recognized statuses, in workflow order
    pub const ALL: [ComplaintStatus; 3] = [
        ComplaintStatus::Pending,
        ComplaintStatus::InProgress,
        ComplaintStatus::Resolved,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ComplaintStatus::Pending => "Pending",
            ComplaintStatus::InProgress => "In Progress",
            ComplaintStatus::Resolved => "Resolved",
        }
    }
}

impl std::fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ComplaintStatus {
    type Err = StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Pending" => Ok(ComplaintStatus::Pending),
            "In Progress" => Ok(ComplaintStatus::InProgress),
            "Resolved" => Ok(ComplaintStatus::Resolved),
            other => Err(StatusParseError(other.to_string())),
        }
    }
}
