//! Commodity price fetch + normalization.
//!
//! The remote payload is treated as untrusted: any field may be absent or
//! malformed. Policy, in order:
//!
//! - transport problems (timeout, non-2xx, malformed top-level JSON) are a
//!   typed error (`FetchError::SourceUnavailable`); retries are the caller's
//!   concern
//! - rows whose `Arrival_Date` does not parse are dropped, never surfaced —
//!   partial upstream corruption must not abort the whole batch
//! - an empty source answer is `NoRecords`; a non-empty answer that the
//!   window/filters fully exclude is `NoMatch`
//! - output is sorted by arrival date descending; the sort is stable, so ties
//!   keep original source order

use chrono::{Local, NaiveDate, NaiveDateTime, TimeDelta};
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::config::PriceSourceConfig;
use crate::domain::{NormalizedPriceRecord, QuerySpec, RawPriceRecord, Window};
use crate::error::FetchError;

/// Arrival dates arrive as `DD/MM/YYYY`.
const ARRIVAL_DATE_FMT: &str = "%d/%m/%Y";

#[derive(Debug, Deserialize)]
struct RecordsResponse {
    /// A missing `records` key is a valid "no data" answer, not a transport
    /// error.
    #[serde(default)]
    records: Vec<RawPriceRecord>,
}

pub struct PriceClient {
    client: Client,
    config: PriceSourceConfig,
}

impl PriceClient {
    pub fn new(config: PriceSourceConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| FetchError::SourceUnavailable {
                detail: format!("Failed to build HTTP client: {e}"),
            })?;
        Ok(Self { client, config })
    }

    /// Fetch, filter, and normalize price records for `spec`.
    pub fn fetch(&self, spec: &QuerySpec) -> Result<Vec<NormalizedPriceRecord>, FetchError> {
        let raw = self.fetch_raw(spec)?;
        normalize(raw, spec, Local::now().naive_local())
    }

    fn fetch_raw(&self, spec: &QuerySpec) -> Result<Vec<RawPriceRecord>, FetchError> {
        let endpoint = format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.resource_id
        );
        let limit = spec.limit.to_string();

        // The source-side sort is an optimization only; `normalize` re-sorts.
        let mut req = self
            .client
            .get(&endpoint)
            .header("accept", "application/json")
            .query(&[
                ("api-key", self.config.api_key.as_str()),
                ("format", "json"),
                ("limit", limit.as_str()),
                ("sort[Arrival_Date]", "desc"),
            ]);

        if let Some(commodity) = &spec.commodity {
            req = req.query(&[("filters[Commodity]", commodity.as_str())]);
        }
        if let Some(state) = &spec.state {
            req = req.query(&[("filters[State]", state.as_str())]);
        }
        if let Some(market) = &spec.market {
            req = req.query(&[("filters[Market]", market.as_str())]);
        }

        let resp = req.send().map_err(|e| FetchError::SourceUnavailable {
            detail: format!("Price source request failed: {e}"),
        })?;

        if !resp.status().is_success() {
            return Err(FetchError::SourceUnavailable {
                detail: format!("Price source returned status {}.", resp.status()),
            });
        }

        let body: RecordsResponse = resp.json().map_err(|e| FetchError::SourceUnavailable {
            detail: format!("Malformed price source response: {e}"),
        })?;

        Ok(body.records)
    }
}

/// Turn raw records into the normalized, window-filtered, sorted output.
///
/// `now` is injected so recency comparisons are testable with a fixed clock.
pub fn normalize(
    raw: Vec<RawPriceRecord>,
    spec: &QuerySpec,
    now: NaiveDateTime,
) -> Result<Vec<NormalizedPriceRecord>, FetchError> {
    if raw.is_empty() {
        return Err(FetchError::NoRecords);
    }

    let mut records = Vec::with_capacity(raw.len());
    for r in raw {
        let Some(date) = parse_arrival_date(r.arrival_date.as_deref()) else {
            continue;
        };

        // The remote already filters, but its matching is exact-case; re-check
        // locally so `QuerySpec`'s case-insensitive semantics hold.
        if !matches_filter(r.commodity.as_deref(), spec.commodity.as_deref()) {
            continue;
        }
        if !matches_filter(r.state.as_deref(), spec.state.as_deref()) {
            continue;
        }
        if !matches_filter(r.market.as_deref(), spec.market.as_deref()) {
            continue;
        }

        if !in_window(date, spec.window, now) {
            continue;
        }

        records.push(NormalizedPriceRecord {
            arrival_date: date,
            state: r.state.unwrap_or_default(),
            district: r.district.unwrap_or_default(),
            market: r.market.unwrap_or_default(),
            commodity: r.commodity.unwrap_or_default(),
            min_price: parse_price(r.min_price.as_deref()),
            max_price: parse_price(r.max_price.as_deref()),
            modal_price: parse_price(r.modal_price.as_deref()),
        });
    }

    if records.is_empty() {
        return Err(FetchError::NoMatch);
    }

    records.sort_by(|a, b| b.arrival_date.cmp(&a.arrival_date));
    Ok(records)
}

fn parse_arrival_date(raw: Option<&str>) -> Option<NaiveDate> {
    let s = raw?.trim();
    if s.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(s, ARRIVAL_DATE_FMT).ok()
}

fn in_window(date: NaiveDate, window: Window, now: NaiveDateTime) -> bool {
    match window {
        Window::All => true,
        Window::Today => date == now.date(),
        Window::LastNDays(n) => {
            // The record sits at midnight of its arrival date; the cutoff
            // keeps the current time of day. Timestamp comparison, not
            // date-only, so the boundary is exact.
            let cutoff = now - TimeDelta::days(i64::from(n));
            date.and_hms_opt(0, 0, 0).is_some_and(|ts| ts >= cutoff)
        }
    }
}

fn matches_filter(value: Option<&str>, filter: Option<&str>) -> bool {
    let Some(filter) = filter else { return true };
    let Some(value) = value else { return false };
    value.trim().eq_ignore_ascii_case(filter.trim())
}

/// Best-effort price parse. "NR" (not reported) and empty cells mean absent.
fn parse_price(raw: Option<&str>) -> Option<f64> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("NR") {
        return None;
    }
    let v = trimmed.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(date: &str, commodity: &str, district: &str, modal: &str) -> RawPriceRecord {
        RawPriceRecord {
            arrival_date: Some(date.to_string()),
            state: Some("Maharashtra".to_string()),
            district: Some(district.to_string()),
            market: Some("Pune".to_string()),
            commodity: Some(commodity.to_string()),
            min_price: Some("1200".to_string()),
            max_price: Some("1600".to_string()),
            modal_price: Some(modal.to_string()),
        }
    }

    fn noon(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn midnight(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn unparsable_dates_are_dropped_silently() {
        let rows = vec![
            raw("15/03/2025", "Tomato", "Pune", "1500"),
            raw("2025-03-15", "Tomato", "Nashik", "1500"), // ISO: wrong format for this source
            raw("garbage", "Tomato", "Satara", "1500"),
            RawPriceRecord::default(), // no date at all
        ];
        let out = normalize(rows, &QuerySpec::default(), noon(2025, 3, 15)).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].district, "Pune");
        assert_eq!(
            out[0].arrival_date,
            NaiveDate::from_ymd_opt(2025, 3, 15).unwrap()
        );
    }

    #[test]
    fn output_sorted_descending_with_stable_ties() {
        let rows = vec![
            raw("13/03/2025", "Onion", "A", "900"),
            raw("15/03/2025", "Onion", "B", "950"),
            raw("14/03/2025", "Onion", "C", "920"),
            raw("15/03/2025", "Onion", "D", "960"),
        ];
        let out = normalize(rows, &QuerySpec::default(), noon(2025, 3, 16)).unwrap();
        let districts: Vec<&str> = out.iter().map(|r| r.district.as_str()).collect();
        // B and D tie on 15/03 and must keep their source order.
        assert_eq!(districts, ["B", "D", "C", "A"]);
        for pair in out.windows(2) {
            assert!(pair[0].arrival_date >= pair[1].arrival_date);
        }
    }

    #[test]
    fn today_window_keeps_only_today() {
        let rows = vec![
            raw("14/03/2025", "Wheat", "yesterday", "2200"),
            raw("15/03/2025", "Wheat", "today", "2210"),
            raw("16/03/2025", "Wheat", "tomorrow", "2220"),
        ];
        let spec = QuerySpec {
            window: Window::Today,
            ..QuerySpec::default()
        };
        let out = normalize(rows, &spec, noon(2025, 3, 15)).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].district, "today");
    }

    #[test]
    fn last_n_days_boundary_is_a_timestamp_comparison() {
        let spec = QuerySpec {
            window: Window::LastNDays(7),
            ..QuerySpec::default()
        };

        // Clock at midnight: a record dated exactly 7 days ago sits exactly on
        // the cutoff and is included; 8 days ago is out.
        let rows = vec![
            raw("08/03/2025", "Rice", "on-cutoff", "3100"),
            raw("07/03/2025", "Rice", "before-cutoff", "3100"),
        ];
        let out = normalize(rows, &spec, midnight(2025, 3, 15)).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].district, "on-cutoff");

        // Clock at noon: the same 7-days-ago record (midnight timestamp) now
        // falls before the cutoff and is excluded.
        let rows = vec![
            raw("08/03/2025", "Rice", "on-cutoff", "3100"),
            raw("09/03/2025", "Rice", "inside", "3100"),
        ];
        let out = normalize(rows, &spec, noon(2025, 3, 15)).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].district, "inside");
    }

    #[test]
    fn empty_source_is_no_records() {
        let err = normalize(Vec::new(), &QuerySpec::default(), noon(2025, 3, 15)).unwrap_err();
        assert_eq!(err, FetchError::NoRecords);
    }

    #[test]
    fn fully_excluded_window_is_no_match() {
        let rows = vec![raw("01/01/2025", "Onion", "A", "900")];
        let spec = QuerySpec {
            window: Window::Today,
            ..QuerySpec::default()
        };
        let err = normalize(rows, &spec, noon(2025, 3, 15)).unwrap_err();
        assert_eq!(err, FetchError::NoMatch);
    }

    #[test]
    fn attribute_filters_are_case_insensitive() {
        let rows = vec![
            raw("15/03/2025", "TOMATO", "match", "1500"),
            raw("15/03/2025", "Onion", "other", "900"),
        ];
        let spec = QuerySpec {
            commodity: Some("tomato".to_string()),
            ..QuerySpec::default()
        };
        let out = normalize(rows, &spec, noon(2025, 3, 15)).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].district, "match");
    }

    #[test]
    fn prices_are_best_effort_not_zeroed() {
        let mut row = raw("15/03/2025", "Tomato", "Pune", "abc");
        row.min_price = None;
        row.max_price = Some("NR".to_string());
        let out = normalize(vec![row], &QuerySpec::default(), noon(2025, 3, 15)).unwrap();
        assert_eq!(out[0].min_price, None);
        assert_eq!(out[0].max_price, None);
        assert_eq!(out[0].modal_price, None);
    }

    #[test]
    fn renormalizing_normalized_output_is_idempotent() {
        let rows = vec![
            raw("13/03/2025", "Onion", "A", "900"),
            raw("15/03/2025", "Onion", "B", "950.5"),
            raw("15/03/2025", "Onion", "C", "960"),
            raw("bad-date", "Onion", "dropped", "0"),
        ];
        let spec = QuerySpec::default();
        let now = noon(2025, 3, 16);

        let first = normalize(rows, &spec, now).unwrap();

        // Re-serialize the normalized output back into source shape.
        let reraw: Vec<RawPriceRecord> = first
            .iter()
            .map(|r| RawPriceRecord {
                arrival_date: Some(r.arrival_date.format("%d/%m/%Y").to_string()),
                state: Some(r.state.clone()),
                district: Some(r.district.clone()),
                market: Some(r.market.clone()),
                commodity: Some(r.commodity.clone()),
                min_price: r.min_price.map(|v| v.to_string()),
                max_price: r.max_price.map(|v| v.to_string()),
                modal_price: r.modal_price.map(|v| v.to_string()),
            })
            .collect();

        let second = normalize(reraw, &spec, now).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn records_key_may_be_absent_from_response() {
        let body: RecordsResponse = serde_json::from_str(r#"{"status": "ok"}"#).unwrap();
        assert!(body.records.is_empty());
    }
}
