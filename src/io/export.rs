//! Export normalized price records to JSON or CSV.
//!
//! Exports are meant to be easy to consume in spreadsheets or downstream
//! scripts; the JSON shape is exactly the serialized `NormalizedPriceRecord`.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::NormalizedPriceRecord;
use crate::error::AppError;

/// Write records as pretty-printed JSON.
pub fn write_records_json(path: &Path, records: &[NormalizedPriceRecord]) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to create export JSON '{}': {e}", path.display()),
        )
    })?;

    serde_json::to_writer_pretty(file, records)
        .map_err(|e| AppError::new(2, format!("Failed to write export JSON: {e}")))?;

    Ok(())
}

/// Write records as CSV, one row per record, ISO dates.
pub fn write_records_csv(path: &Path, records: &[NormalizedPriceRecord]) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to create export CSV '{}': {e}", path.display()),
        )
    })?;

    writeln!(
        file,
        "arrival_date,state,district,market,commodity,min_price,max_price,modal_price"
    )
    .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for r in records {
        writeln!(
            file,
            "{},{},{},{},{},{},{},{}",
            r.arrival_date,
            csv_field(&r.state),
            csv_field(&r.district),
            csv_field(&r.market),
            csv_field(&r.commodity),
            fmt_opt(r.min_price),
            fmt_opt(r.max_price),
            fmt_opt(r.modal_price),
        )
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    Ok(())
}

/// Market names occasionally contain commas; quote when needed.
fn csv_field(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.2}")).unwrap_or_default()
}
