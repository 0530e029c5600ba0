//! Terminal formatting for price tables and diagnosis output.
//!
//! Formatting lives in one place so:
//! - the fetch/parse code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

use crate::domain::{DiagnosisRecord, NormalizedPriceRecord, QuerySpec, Window};

/// One-line summary above the table: record count, window, and date range.
pub fn format_fetch_summary(spec: &QuerySpec, records: &[NormalizedPriceRecord]) -> String {
    let mut out = format!(
        "Found {} record(s) | window: {}",
        records.len(),
        window_label(spec.window)
    );
    if let Some(commodity) = &spec.commodity {
        out.push_str(&format!(" | commodity: {commodity}"));
    }
    if let Some(state) = &spec.state {
        out.push_str(&format!(" | state: {state}"));
    }
    if let Some(market) = &spec.market {
        out.push_str(&format!(" | market: {market}"));
    }
    // Output is sorted descending, so newest is first.
    if let (Some(newest), Some(oldest)) = (records.first(), records.last()) {
        out.push_str(&format!(
            " | dates: {}..{}",
            oldest.arrival_date, newest.arrival_date
        ));
    }
    out
}

pub fn window_label(window: Window) -> String {
    match window {
        Window::Today => "today".to_string(),
        Window::LastNDays(n) => format!("last {n} days"),
        Window::All => "all".to_string(),
    }
}

/// Fixed-width table of normalized records, newest first.
pub fn format_price_table(records: &[NormalizedPriceRecord]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<12} {:<14} {:<16} {:<24} {:<18} {:>9} {:>9} {:>9}\n",
        "Arrival", "State", "District", "Market", "Commodity", "Min", "Max", "Modal"
    ));
    out.push_str(&"-".repeat(118));
    out.push('\n');

    for r in records {
        out.push_str(&format!(
            "{:<12} {:<14} {:<16} {:<24} {:<18} {:>9} {:>9} {:>9}\n",
            r.arrival_date.to_string(),
            clip(&r.state, 14),
            clip(&r.district, 16),
            clip(&r.market, 24),
            clip(&r.commodity, 18),
            fmt_price(r.min_price),
            fmt_price(r.max_price),
            fmt_price(r.modal_price),
        ));
    }
    out
}

/// Readable block for one diagnosis record.
pub fn format_diagnosis(record: &DiagnosisRecord) -> String {
    let mut out = String::new();
    out.push_str(&format!("Disease    : {}\n", record.disease));
    out.push_str(&format!("Confidence : {:.3}\n", record.confidence));
    out.push_str(&format!("Severity   : {}\n", record.severity.display_name()));
    out.push_str(&format!("Advice     : {}\n", record.advice));
    out.push_str(&format!("Precautions: {}", record.precautions));
    out
}

fn fmt_price(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.2}"),
        _ => "-".to_string(),
    }
}

fn clip(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        s.chars().take(width.saturating_sub(1)).chain(['…']).collect()
    }
}
