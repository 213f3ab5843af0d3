//! Civic Triage: severity scoring and authority assignment
//!
//! Maps detected issue labels onto an aggregate severity score (1-10),
//! a severity tier, and the set of authorities to notify, using a
//! static issue table.

pub mod table;

pub use table::{SeverityTable, TriageOutcome, FALLBACK_AUTHORITY};

/// Convenience function using the default table
pub fn triage(labels: &[String], explanation: Option<&str>) -> TriageOutcome {
    SeverityTable::default().resolve(labels, explanation)
}
