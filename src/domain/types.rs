//! Shared domain types.
//!
//! The raw/normalized split is deliberate: everything a remote source hands us
//! is modeled as a loosely-typed "raw" record, and all coercion happens at one
//! boundary (`data::prices::normalize` for prices, `diagnose::parse` for model
//! replies). Nothing downstream ever sees a raw record.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// Recency filter applied to `arrival_date`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    /// Keep only records whose arrival date equals today's calendar date
    /// (date-only comparison).
    Today,
    /// Keep records whose arrival timestamp (midnight of the arrival date) is
    /// at or after `now - n days`. Timestamp comparison, not date-only.
    LastNDays(u32),
    /// No recency filtering.
    All,
}

/// Immutable description of one price query.
///
/// `window` and `limit` are request-shaping only; they never mutate the
/// underlying source.
#[derive(Debug, Clone)]
pub struct QuerySpec {
    /// Exact commodity name (case-insensitive), `None` = no constraint.
    pub commodity: Option<String>,
    /// Exact state name (case-insensitive), `None` = no constraint.
    pub state: Option<String>,
    /// Exact market name (case-insensitive), `None` = no constraint.
    pub market: Option<String>,
    pub window: Window,
    /// Upper bound requested from the source, not the post-filter count.
    pub limit: usize,
}

impl Default for QuerySpec {
    fn default() -> Self {
        Self {
            commodity: None,
            state: None,
            market: None,
            window: Window::All,
            limit: 1000,
        }
    }
}

/// A price record exactly as the source sends it: every field optional, and
/// numeric fields sometimes quoted, sometimes not.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPriceRecord {
    #[serde(rename = "Arrival_Date", default, deserialize_with = "stringly")]
    pub arrival_date: Option<String>,
    #[serde(rename = "State", default, deserialize_with = "stringly")]
    pub state: Option<String>,
    #[serde(rename = "District", default, deserialize_with = "stringly")]
    pub district: Option<String>,
    #[serde(rename = "Market", default, deserialize_with = "stringly")]
    pub market: Option<String>,
    #[serde(rename = "Commodity", default, deserialize_with = "stringly")]
    pub commodity: Option<String>,
    #[serde(rename = "Min_Price", default, deserialize_with = "stringly")]
    pub min_price: Option<String>,
    #[serde(rename = "Max_Price", default, deserialize_with = "stringly")]
    pub max_price: Option<String>,
    #[serde(rename = "Modal_Price", default, deserialize_with = "stringly")]
    pub modal_price: Option<String>,
}

/// data.gov.in resources are inconsistent about quoting: the same field can be
/// a JSON string in one resource and a bare number in another. Accept both.
fn stringly<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// A validated price record.
///
/// Only constructed from a raw record whose `Arrival_Date` parsed; prices are
/// best-effort (missing means absent, not zero).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPriceRecord {
    /// ISO-formatted on output (`YYYY-MM-DD`).
    pub arrival_date: NaiveDate,
    pub state: String,
    pub district: String,
    pub market: String,
    pub commodity: String,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub modal_price: Option<f64>,
}

/// Reported severity of a leaf disease.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Mild,
    Moderate,
    Severe,
    None,
}

impl Severity {
    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            Severity::Mild => "mild",
            Severity::Moderate => "moderate",
            Severity::Severe => "severe",
            Severity::None => "none",
        }
    }
}

/// Fixed-schema diagnosis. Every instance satisfies the schema regardless of
/// the quality of the model reply it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisRecord {
    /// Never empty; defaults to `"Unknown"`.
    pub disease: String,
    /// Clamped to `[0.0, 1.0]`, rounded to 3 decimals.
    pub confidence: f64,
    pub severity: Severity,
    /// May be empty, never absent.
    pub advice: String,
    /// May be empty, never absent.
    pub precautions: String,
}
