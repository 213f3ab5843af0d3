//! Severity tiers
//!
//! Monotonic bucketing of the 1-10 severity score.

use serde::{Deserialize, Serialize};

/// Severity tier of a complaint
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum SeverityLevel {
    /// 1-3: Minor issue, no immediate risk
    #[default]
    Low,
    /// 4-7: Noticeable issue, possible hazard
    Medium,
    /// 8-10: Severe issue, immediate safety risk
    High,
}

impl SeverityLevel {
    /// Get the tier for a score. Scores below the 1-10 range are
    /// treated as the floor, scores above it as the ceiling.
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=3 => SeverityLevel::Low,
            4..=7 => SeverityLevel::Medium,
            _ => SeverityLevel::High,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SeverityLevel::Low => "Low",
            SeverityLevel::Medium => "Medium",
            SeverityLevel::High => "High",
        }
    }

    /// Parse a tier name, case-insensitively. Used by the admin list
    /// filter; unknown names return None rather than an error so the
    /// caller can shape its own rejection.
    pub fn parse_filter(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Some(SeverityLevel::Low),
            "medium" => Some(SeverityLevel::Medium),
            "high" => Some(SeverityLevel::High),
            _ => None,
        }
    }
}

impl std::fmt::Display for SeverityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_from_score_buckets() {
        assert_eq!(SeverityLevel::from_score(1), SeverityLevel::Low);
        assert_eq!(SeverityLevel::from_score(3), SeverityLevel::Low);
        assert_eq!(SeverityLevel::from_score(4), SeverityLevel::Medium);
        assert_eq!(SeverityLevel::from_score(7), SeverityLevel::Medium);
        assert_eq!(SeverityLevel::from_score(8), SeverityLevel::High);
        assert_eq!(SeverityLevel::from_score(10), SeverityLevel::High);
    }

    #[test]
    fn test_severity_monotonic() {
        let mut last = SeverityLevel::Low;
        for score in 1..=10 {
            let level = SeverityLevel::from_score(score);
            assert!(level >= last);
            last = level;
        }
    }

    #[test]
    fn test_parse_filter() {
        assert_eq!(SeverityLevel::parse_filter("High"), Some(SeverityLevel::High));
        assert_eq!(SeverityLevel::parse_filter("low"), Some(SeverityLevel::Low));
        assert_eq!(SeverityLevel::parse_filter("MEDIUM"), Some(SeverityLevel::Medium));
        assert_eq!(SeverityLevel::parse_filter("urgent"), None);
    }
}
