//! Recovering parser for the vision model's free-text diagnosis.
//!
//! The model is *asked* for bare JSON, but its reply is untrusted text that
//! merely tends to be well-formed. `parse` therefore never fails: it walks an
//! ordered list of strategies — strict JSON, embedded-object extraction,
//! synthesized fallback — stopping at the first that yields a record. The
//! fallback record *is* the error representation, encoded in-schema, because
//! the caller's only recourse is "show the user something" either way.

use serde::Deserialize;
use serde_json::Value;

use crate::domain::{DiagnosisRecord, Severity};

/// Instruction sent alongside the leaf photo.
pub const DIAGNOSIS_PROMPT: &str = r#"You are an agronomist. Analyze the plant leaf image for disease.
Return ONLY valid JSON (no markdown, no backticks). Use this schema:
{
  "disease": "string",
  "confidence": 0.0,
  "severity": "mild|moderate|severe|none",
  "advice": "string",
  "precautions": "string"
}
If the leaf looks fine, set disease="Healthy", severity="none"."#;

/// Guidance used when the reply could not be parsed at all.
pub const FALLBACK_PRECAUTIONS: &str =
    "Re-run with a clearer, well-lit photo with a single leaf.";

/// The fallback `advice` keeps this many characters of the raw reply.
const FALLBACK_ADVICE_CHARS: usize = 500;

/// Loosely-typed mirror of the reply schema. Extra fields are ignored;
/// `confidence` may arrive as a number or a quoted number.
#[derive(Debug, Default, Deserialize)]
struct RawDiagnosis {
    #[serde(default)]
    disease: Option<String>,
    #[serde(default)]
    confidence: Option<Value>,
    #[serde(default)]
    severity: Option<String>,
    #[serde(default)]
    advice: Option<String>,
    #[serde(default)]
    precautions: Option<String>,
}

/// Parse a model reply into a schema-valid record. Total: never fails.
pub fn parse(text: &str) -> DiagnosisRecord {
    let trimmed = text.trim();
    match parse_strict(trimmed).or_else(|| parse_embedded(trimmed)) {
        Some(raw) => finish(raw),
        None => fallback(trimmed),
    }
}

fn parse_strict(text: &str) -> Option<RawDiagnosis> {
    serde_json::from_str(text).ok()
}

/// Recover JSON wrapped in prose or markdown fences: take the span between
/// the first `{` and the last `}` (inclusive) and try again.
fn parse_embedded(text: &str) -> Option<RawDiagnosis> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    serde_json::from_str(&text[start..=end]).ok()
}

fn finish(raw: RawDiagnosis) -> DiagnosisRecord {
    let disease = raw
        .disease
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "Unknown".to_string());

    DiagnosisRecord {
        disease,
        confidence: clamp_confidence(raw.confidence.as_ref()),
        severity: severity_from_text(raw.severity.as_deref()),
        advice: raw.advice.unwrap_or_default(),
        precautions: raw.precautions.unwrap_or_default(),
    }
}

fn fallback(text: &str) -> DiagnosisRecord {
    DiagnosisRecord {
        disease: "Unknown".to_string(),
        confidence: 0.0,
        severity: Severity::None,
        advice: truncate_chars(text, FALLBACK_ADVICE_CHARS),
        precautions: FALLBACK_PRECAUTIONS.to_string(),
    }
}

/// Clamp into `[0, 1]` and round to 3 decimals. Non-numeric or absent values
/// become `0.0` without being treated as an error.
fn clamp_confidence(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    let c = parsed.filter(|v| v.is_finite()).unwrap_or(0.0);
    (c.clamp(0.0, 1.0) * 1000.0).round() / 1000.0
}

fn severity_from_text(raw: Option<&str>) -> Severity {
    match raw.map(str::trim) {
        Some(s) if s.eq_ignore_ascii_case("mild") => Severity::Mild,
        Some(s) if s.eq_ignore_ascii_case("moderate") => Severity::Moderate,
        Some(s) if s.eq_ignore_ascii_case("severe") => Severity::Severe,
        _ => Severity::None,
    }
}

fn truncate_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_json_with_out_of_range_confidence_is_clamped() {
        let rec = parse(r#"{"disease":"Healthy","confidence":1.4,"severity":"none"}"#);
        assert_eq!(rec.disease, "Healthy");
        assert!((rec.confidence - 1.0).abs() < 1e-12);
        assert_eq!(rec.severity, Severity::None);
        assert_eq!(rec.advice, "");
        assert_eq!(rec.precautions, "");
    }

    #[test]
    fn json_wrapped_in_prose_is_recovered() {
        let rec = parse(
            r#"Sure! Here is the result: {"disease":"Blight","confidence":0.8,"severity":"moderate","advice":"Apply fungicide","precautions":"Rotate crops"}"#,
        );
        assert_eq!(rec.disease, "Blight");
        assert!((rec.confidence - 0.8).abs() < 1e-9);
        assert_eq!(rec.severity, Severity::Moderate);
        assert_eq!(rec.advice, "Apply fungicide");
        assert_eq!(rec.precautions, "Rotate crops");
    }

    #[test]
    fn json_wrapped_in_markdown_fences_is_recovered() {
        let rec = parse(
            "```json\n{\"disease\":\"Rust\",\"confidence\":0.6,\"severity\":\"mild\"}\n```",
        );
        assert_eq!(rec.disease, "Rust");
        assert_eq!(rec.severity, Severity::Mild);
    }

    #[test]
    fn unparsable_reply_yields_fallback_record() {
        let rec = parse("I cannot analyze this image.");
        assert_eq!(rec.disease, "Unknown");
        assert_eq!(rec.confidence, 0.0);
        assert_eq!(rec.severity, Severity::None);
        assert_eq!(rec.advice, "I cannot analyze this image.");
        assert_eq!(rec.precautions, FALLBACK_PRECAUTIONS);
    }

    #[test]
    fn fallback_advice_is_truncated_deterministically() {
        let long = "x".repeat(1200);
        let rec = parse(&long);
        assert_eq!(rec.advice.chars().count(), 500);
    }

    #[test]
    fn quoted_and_garbage_confidence_values() {
        let quoted = parse(r#"{"disease":"Blight","confidence":"0.75"}"#);
        assert!((quoted.confidence - 0.75).abs() < 1e-9);

        let garbage = parse(r#"{"disease":"Blight","confidence":"very sure"}"#);
        assert_eq!(garbage.confidence, 0.0);

        let negative = parse(r#"{"disease":"Blight","confidence":-0.3}"#);
        assert_eq!(negative.confidence, 0.0);
    }

    #[test]
    fn confidence_is_rounded_to_three_decimals() {
        let rec = parse(r#"{"disease":"Blight","confidence":0.87654}"#);
        assert!((rec.confidence - 0.877).abs() < 1e-12);
    }

    #[test]
    fn missing_or_empty_disease_defaults_to_unknown() {
        let rec = parse(r#"{"confidence":0.5,"severity":"severe"}"#);
        assert_eq!(rec.disease, "Unknown");
        assert_eq!(rec.severity, Severity::Severe);

        let rec = parse(r#"{"disease":"  ","confidence":0.5}"#);
        assert_eq!(rec.disease, "Unknown");
    }

    #[test]
    fn unknown_severity_and_extra_fields_are_tolerated() {
        let rec = parse(r#"{"disease":"Blight","severity":"catastrophic","model_notes":"..."}"#);
        assert_eq!(rec.severity, Severity::None);
        assert_eq!(rec.disease, "Blight");
    }

    #[test]
    fn braces_in_prose_without_valid_json_still_fall_back() {
        let text = "the set {a, b} is not JSON";
        let rec = parse(text);
        assert_eq!(rec.disease, "Unknown");
        assert_eq!(rec.advice, text);
    }
}
