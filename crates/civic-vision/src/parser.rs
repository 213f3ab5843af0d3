//! Tolerant parser for model output
//!
//! The model is instructed to answer with bare JSON, but in practice
//! answers arrive wrapped in code fences or surrounded by prose. The
//! parser tries a direct parse first, then extracts the first balanced
//! `{...}` span. Any failure is non-fatal and yields the empty outcome.

use civic_core::Detection;
use serde::Deserialize;

/// Structured result of parsing one model response
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnalysisOutcome {
    /// Issue labels in detection order
    pub civic_issues: Vec<String>,
    /// (label, confidence) pairs; confidences clamped to [0, 1]
    pub detections: Vec<Detection>,
    /// Free-text visual reasoning, used for keyword escalation
    pub explanation: Option<String>,
}

impl AnalysisOutcome {
    /// The "no issues detected" outcome every parse failure maps to
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Wire shape the model is prompted to produce. All fields default so
/// partial answers still parse; the legacy single-issue fields are
/// accepted and normalized into the list shape.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RawAnalysis {
    civic_issues: Vec<String>,
    detections: Vec<RawDetection>,
    explanation: Option<String>,
    reason: Option<String>,
    issue_detected: Option<bool>,
    issue_type: Option<String>,
    confidence: Option<f64>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RawDetection {
    label: String,
    confidence: f64,
}

/// Parse raw model text into an [`AnalysisOutcome`]. Never fails: a
/// response we cannot interpret is logged and treated as "no issues".
pub fn parse_model_output(raw: &str) -> AnalysisOutcome {
    let candidate = strip_code_fences(raw.trim());

    match serde_json::from_str::<RawAnalysis>(candidate) {
        Ok(parsed) => return normalize(parsed),
        Err(direct_err) => {
            if let Some(span) = first_json_object(candidate) {
                match serde_json::from_str::<RawAnalysis>(span) {
                    Ok(parsed) => return normalize(parsed),
                    Err(span_err) => {
                        tracing::warn!(
                            error = %span_err,
                            raw = raw,
                            "embedded JSON object did not parse, treating as no issues"
                        );
                        return AnalysisOutcome::empty();
                    }
                }
            }
            tracing::warn!(
                error = %direct_err,
                raw = raw,
                "model response contained no parseable JSON, treating as no issues"
            );
        }
    }

    AnalysisOutcome::empty()
}

fn normalize(raw: RawAnalysis) -> AnalysisOutcome {
    let mut civic_issues = raw.civic_issues;
    let mut detections: Vec<Detection> = raw
        .detections
        .into_iter()
        .filter(|d| !d.label.is_empty())
        .map(|d| Detection::new(d.label, d.confidence))
        .collect();

    // Legacy single-issue shape: issue_detected/issue_type/confidence
    if civic_issues.is_empty() {
        if let (Some(true), Some(issue_type)) = (raw.issue_detected, raw.issue_type) {
            if !issue_type.is_empty() && issue_type != "None" {
                civic_issues.push(issue_type.clone());
                if detections.is_empty() {
                    detections.push(Detection::new(issue_type, raw.confidence.unwrap_or(0.5)));
                }
            }
        }
    }

    civic_issues.retain(|label| !label.trim().is_empty());

    AnalysisOutcome {
        civic_issues,
        detections,
        explanation: raw.explanation.or(raw.reason).filter(|s| !s.is_empty()),
    }
}

/// Strip a surrounding markdown code fence (``` or ```json)
fn strip_code_fences(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the optional language tag on the fence line
    let rest = match rest.split_once('\n') {
        Some((_, body)) => body,
        None => rest,
    };
    rest.strip_suffix("```").map(str::trim).unwrap_or(text)
}

/// Locate the first balanced `{...}` span, respecting JSON strings
/// and escapes.
fn first_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &byte) in bytes[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_json() {
        let raw = r#"{"civic_issues": ["Pothole"], "detections": [{"label": "Pothole", "confidence": 0.92}]}"#;
        let outcome = parse_model_output(raw);
        assert_eq!(outcome.civic_issues, vec!["Pothole".to_string()]);
        assert_eq!(outcome.detections.len(), 1);
        assert_eq!(outcome.detections[0].confidence, 0.92);
    }

    #[test]
    fn test_code_fenced_json() {
        let raw = "```json\n{\"civic_issues\": [\"Open Drain\"], \"detections\": []}\n```";
        let outcome = parse_model_output(raw);
        assert_eq!(outcome.civic_issues, vec!["Open Drain".to_string()]);
    }

    #[test]
    fn test_json_embedded_in_prose() {
        let raw = r#"Sure! Here is the analysis you asked for:
{"civic_issues": ["Water Leakage"], "detections": [{"label": "Water Leakage", "confidence": 0.8}], "explanation": "water pooling near the pipe"}
Let me know if you need anything else."#;
        let outcome = parse_model_output(raw);
        assert_eq!(outcome.civic_issues, vec!["Water Leakage".to_string()]);
        assert_eq!(
            outcome.explanation.as_deref(),
            Some("water pooling near the pipe")
        );
    }

    #[test]
    fn test_garbled_text_degrades_to_empty() {
        let outcome = parse_model_output("Sure! Here's the analysis: <garbled>");
        assert_eq!(outcome, AnalysisOutcome::empty());
        assert!(outcome.civic_issues.is_empty());
    }

    #[test]
    fn test_broken_json_degrades_to_empty() {
        let outcome = parse_model_output(r#"{"civic_issues": ["Pothole", }"#);
        assert_eq!(outcome, AnalysisOutcome::empty());
    }

    #[test]
    fn test_non_object_json_degrades_to_empty() {
        assert_eq!(parse_model_output("[1, 2, 3]"), AnalysisOutcome::empty());
        assert_eq!(parse_model_output("42"), AnalysisOutcome::empty());
        assert_eq!(parse_model_output(""), AnalysisOutcome::empty());
    }

    #[test]
    fn test_legacy_single_issue_shape() {
        let raw = r#"{"issue_detected": true, "issue_type": "Pothole", "confidence": 0.88, "reason": "deep crack across the lane"}"#;
        let outcome = parse_model_output(raw);
        assert_eq!(outcome.civic_issues, vec!["Pothole".to_string()]);
        assert_eq!(outcome.detections.len(), 1);
        assert_eq!(outcome.detections[0].confidence, 0.88);
        assert_eq!(
            outcome.explanation.as_deref(),
            Some("deep crack across the lane")
        );
    }

    #[test]
    fn test_legacy_none_issue_type_is_empty() {
        let raw = r#"{"issue_detected": false, "issue_type": "None", "confidence": 0.2}"#;
        let outcome = parse_model_output(raw);
        assert!(outcome.civic_issues.is_empty());
        assert!(outcome.detections.is_empty());
    }

    #[test]
    fn test_confidence_clamped() {
        let raw = r#"{"civic_issues": ["Pothole"], "detections": [{"label": "Pothole", "confidence": 3.5}]}"#;
        let outcome = parse_model_output(raw);
        assert_eq!(outcome.detections[0].confidence, 1.0);
    }

    #[test]
    fn test_braces_inside_strings_do_not_confuse_scan() {
        let raw = r#"note: {"civic_issues": ["Pothole"], "detections": [], "explanation": "shaped like a { brace }"}"#;
        let outcome = parse_model_output(raw);
        assert_eq!(outcome.civic_issues, vec!["Pothole".to_string()]);
    }

    #[test]
    fn test_blank_labels_dropped() {
        let raw = r#"{"civic_issues": ["", "  ", "Pothole"], "detections": []}"#;
        let outcome = parse_model_output(raw);
        assert_eq!(outcome.civic_issues, vec!["Pothole".to_string()]);
    }
}
