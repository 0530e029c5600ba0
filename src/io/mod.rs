//! Input/output helpers.
//!
//! - normalized-record exports (JSON/CSV) (`export`)

pub mod export;

pub use export::*;
