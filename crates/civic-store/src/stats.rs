//! Aggregate statistics over the complaint collection
use civic_core::{Complaint, ComplaintStatus, SeverityLevel};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Counts and the resolution rate derived from the full store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplaintStatistics {
    /// Total complaints held
    pub total: usize,
    /// Count per workflow status (all three statuses always present)
    pub by_status: BTreeMap<String, usize>,
    /// Count per severity tier (all three tiers always present)
    pub by_severity: BTreeMap<String, usize>,
    /// Count per issue label across all civic_issues occurrences
    pub by_issue_type: BTreeMap<String, usize>,
    /// Resolved / total, in [0, 1]; 0 when the store is empty
    pub resolution_rate: f64,
}

impl ComplaintStatistics {
    pub fn from_records(records: &[Complaint]) -> Self {
        let mut by_status: BTreeMap<String, usize> = ComplaintStatus::ALL
            .iter()
            .map(|s| (s.as_str().to_string(), 0))
            .collect();
        let mut by_severity: BTreeMap<String, usize> =
            [SeverityLevel::Low, SeverityLevel::Medium, SeverityLevel::High]
                .iter()
                .map(|s| (s.as_str().to_string(), 0))
                .collect();
        let mut by_issue_type: BTreeMap<String, usize> = BTreeMap::new();
        let mut resolved = 0usize;

        for record in records {
            *by_status.entry(record.status.as_str().to_string()).or_default() += 1;
            *by_severity
                .entry(record.severity_level.as_str().to_string())
                .or_default() += 1;
            for issue in &record.civic_issues {
                *by_issue_type.entry(issue.clone()).or_default() += 1;
            }
            if record.status == ComplaintStatus::Resolved {
                resolved += 1;
            }
        }

        let total = records.len();
        let resolution_rate = if total == 0 {
            0.0
        } else {
            resolved as f64 / total as f64
        };

        Self {
            total,
            by_status,
            by_severity,
            by_issue_type,
            resolution_rate,
        }
    }
}
