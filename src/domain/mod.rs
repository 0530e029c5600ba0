//! Domain types used throughout the pipelines.
//!
//! This module defines:
//!
//! - the query shape for price fetches (`QuerySpec`, `Window`)
//! - the raw/normalized split for price records
//! - the fixed diagnosis schema (`DiagnosisRecord`, `Severity`)

pub mod types;

pub use types::*;
