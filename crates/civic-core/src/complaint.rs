//! Complaint record and builder
use crate::severity::SeverityLevel;
use crate::status::ComplaintStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single detected issue with the model's confidence in it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Issue label as reported by the model
    pub label: String,
    /// Confidence in [0, 1]
    pub confidence: f64,
}

impl Detection {
    pub fn new(label: impl Into<String>, confidence: f64) -> Self {
        Self {
            label: label.into(),
            confidence: confidence.clamp(0.0, 1.0),
        }
    }
}

/// The central record: one submitted report, from photo to assignment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Complaint {
    /// Unique ID, generated at creation, immutable
    pub complaint_id: String,
    /// True iff at least one issue label survived parsing
    pub issue_detected: bool,
    /// Issue labels in detection order (duplicates possible)
    pub civic_issues: Vec<String>,
    /// (label, confidence) pairs, informational only
    pub detections: Vec<Detection>,
    /// Aggregate severity, always in 1..=10
    pub severity_score: u8,
    /// Tier derived from the score
    pub severity_level: SeverityLevel,
    /// Deduplicated authorities responsible for the detected issues
    pub assigned_authorities: Vec<String>,
    /// Caller-supplied location, stored verbatim
    pub location: String,
    /// Workflow status, mutated only via admin update
    pub status: ComplaintStatus,
    /// Set once at creation
    pub created_at: DateTime<Utc>,
    /// Present only when the vision call failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Complaint {
    /// Build a complaint from a completed analysis. The caller is
    /// responsible for inserting it into the store; construction has
    /// no side effects so a failed downstream step never leaves a
    /// partially-visible record.
    pub fn from_analysis(
        location: impl Into<String>,
        civic_issues: Vec<String>,
        detections: Vec<Detection>,
        severity_score: u8,
        severity_level: SeverityLevel,
        assigned_authorities: Vec<String>,
    ) -> Self {
        Self {
            complaint_id: generate_complaint_id(),
            issue_detected: !civic_issues.is_empty(),
            civic_issues,
            detections,
            severity_score,
            severity_level,
            assigned_authorities,
            location: location.into(),
            status: ComplaintStatus::Pending,
            created_at: Utc::now(),
            error: None,
        }
    }

    /// Build the degraded record used when the vision call fails: no
    /// detections, severity floored, the fallback authority assigned,
    /// and the failure recorded in `error`. The request still gets a
    /// well-formed complaint back.
    pub fn from_failure(
        location: impl Into<String>,
        fallback_authority: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            complaint_id: generate_complaint_id(),
            issue_detected: false,
            civic_issues: Vec::new(),
            detections: Vec::new(),
            severity_score: 1,
            severity_level: SeverityLevel::Low,
            assigned_authorities: vec![fallback_authority.into()],
            location: location.into(),
            status: ComplaintStatus::Pending,
            created_at: Utc::now(),
            error: Some(error.into()),
        }
    }
}

/// Generate a complaint ID: date-stamped prefix plus a random
/// alphanumeric suffix. Collision-resistant within a process lifetime;
/// cryptographic uniqueness is not required.
pub fn generate_complaint_id() -> String {
    let date = Utc::now().format("%Y%m%d");
    let uuid = Uuid::new_v4().simple().to_string();
    format!("CIV-{}-{}", date, uuid[..8].to_uppercase())
}
