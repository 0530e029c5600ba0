//! `mandi-pulse` library crate.
//!
//! The binary (`mandi`) is a thin wrapper around this library so that:
//!
//! - the normalization pipelines are testable without spawning processes
//! - modules are reusable (e.g., future web front-end, notebooks, etc.)
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod diagnose;
pub mod domain;
pub mod error;
pub mod io;
pub mod report;
