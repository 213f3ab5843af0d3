//! Static issue table and the scoring rule
//!
//! Aggregation rule: the score is the maximum base contribution across
//! distinct recognized labels, +1 for each additional distinct
//! recognized label beyond the first, +2 when an escalation keyword
//! appears in the explanation text. The result is capped at 10 and
//! floored at 1, so downstream consumers never see a zero severity.

use civic_core::SeverityLevel;
use serde::{Deserialize, Serialize};

/// Authority assigned when no recognized issue maps to one
pub const FALLBACK_AUTHORITY: &str = "Municipal Corporation";

/// Keywords in the model's explanation that bump the score
const ESCALATION_KEYWORDS: [&str; 6] = ["large", "major", "deep", "severe", "burst", "overflowing"];

/// Fixed increment applied when an escalation keyword is present
const ESCALATION_BONUS: u8 = 2;

/// Result of resolving a label sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageOutcome {
    /// Aggregate severity, always in 1..=10
    pub severity_score: u8,
    /// Tier derived from the score
    pub severity_level: SeverityLevel,
    /// Union of authorities for the recognized labels, first-seen
    /// order, falling back to [`FALLBACK_AUTHORITY`] when empty
    pub assigned_authorities: Vec<String>,
}

/// One row of the issue table
#[derive(Debug, Clone)]
struct IssueRule {
    label: &'static str,
    base_score: u8,
    authorities: &'static [&'static str],
}

/// Severity table with the recognized issue labels
#[derive(Debug, Clone)]
pub struct SeverityTable {
    rules: Vec<IssueRule>,
}

impl Default for SeverityTable {
    fn default() -> Self {
        Self {
            rules: vec![
                IssueRule {
                    label: "Pothole",
                    base_score: 6,
                    authorities: &["Public Works Department"],
                },
                IssueRule {
                    label: "Garbage Overflow",
                    base_score: 5,
                    authorities: &["Sanitation Department"],
                },
                IssueRule {
                    label: "Water Leakage",
                    base_score: 6,
                    authorities: &["Water Supply Department"],
                },
                IssueRule {
                    label: "Open Drain",
                    base_score: 8,
                    authorities: &["Drainage Department", "Public Works Department"],
                },
                IssueRule {
                    label: "Streetlight Issue",
                    base_score: 4,
                    authorities: &["Electricity Department"],
                },
            ],
        }
    }
}

impl SeverityTable {
    /// Resolve a label sequence into a severity score, tier and
    /// authority set. Unrecognized labels contribute nothing but do
    /// not block the rest.
    pub fn resolve(&self, labels: &[String], explanation: Option<&str>) -> TriageOutcome {
        let mut max_base: u8 = 0;
        let mut distinct: Vec<&IssueRule> = Vec::new();

        for label in labels {
            let Some(rule) = self.lookup(label) else {
                continue;
            };
            if distinct.iter().any(|r| r.label == rule.label) {
                continue;
            }
            max_base = max_base.max(rule.base_score);
            distinct.push(rule);
        }

        let mut score = max_base;
        if !distinct.is_empty() {
            score = score.saturating_add((distinct.len() - 1) as u8);
            if explanation.is_some_and(has_escalation_keyword) {
                score = score.saturating_add(ESCALATION_BONUS);
            }
        }
        let score = score.clamp(1, 10);

        let mut authorities: Vec<String> = Vec::new();
        for rule in &distinct {
            for authority in rule.authorities {
                if !authorities.iter().any(|a| a == authority) {
                    authorities.push((*authority).to_string());
                }
            }
        }
        if authorities.is_empty() {
            authorities.push(FALLBACK_AUTHORITY.to_string());
        }

        TriageOutcome {
            severity_score: score,
            severity_level: SeverityLevel::from_score(score),
            assigned_authorities: authorities,
        }
    }

    /// Labels this table recognizes
    pub fn recognized_labels(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.label).collect()
    }

    fn lookup(&self, label: &str) -> Option<&IssueRule> {
        let wanted = label.trim();
        self.rules.iter().find(|r| r.label.eq_ignore_ascii_case(wanted))
    }
}

fn has_escalation_keyword(text: &str) -> bool {
    let lowered = text.to_lowercase();
    ESCALATION_KEYWORDS.iter().any(|kw| lowered.contains(kw))
}
