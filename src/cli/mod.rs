//! Command-line parsing.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the fetch/normalize/parse code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "mandi",
    version,
    about = "Mandi price tracker and leaf-diagnosis helper"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch commodity prices from data.gov.in, filter by recency, print a table.
    Prices(PricesArgs),
    /// Diagnose a leaf photo via the hosted vision model, or parse a saved reply.
    Diagnose(DiagnoseArgs),
}

/// Options for the price query.
#[derive(Debug, Parser, Clone)]
pub struct PricesArgs {
    /// Commodity filter (exact name, case-insensitive).
    #[arg(short = 'c', long)]
    pub commodity: Option<String>,

    /// State filter (exact name, case-insensitive).
    #[arg(short = 's', long)]
    pub state: Option<String>,

    /// Market filter (exact name, case-insensitive).
    #[arg(short = 'm', long)]
    pub market: Option<String>,

    /// Keep only records that arrived today.
    #[arg(long, conflicts_with = "days")]
    pub today: bool,

    /// Keep records from the last N days.
    #[arg(short = 'd', long, value_name = "N")]
    pub days: Option<u32>,

    /// Maximum records to request from the source (pre-filter).
    #[arg(short = 'l', long, default_value_t = 1000)]
    pub limit: usize,

    /// Export normalized records to JSON.
    #[arg(long = "export-json", value_name = "PATH")]
    pub export_json: Option<PathBuf>,

    /// Export normalized records to CSV.
    #[arg(long = "export-csv", value_name = "PATH")]
    pub export_csv: Option<PathBuf>,
}

/// Options for the diagnosis command.
#[derive(Debug, Parser, Clone)]
pub struct DiagnoseArgs {
    /// Leaf photo to analyze (re-encoded to JPEG before upload).
    #[arg(short = 'i', long, conflicts_with = "reply")]
    pub image: Option<PathBuf>,

    /// Parse a saved model reply instead of calling the vision model.
    #[arg(long, value_name = "PATH")]
    pub reply: Option<PathBuf>,

    /// Print the diagnosis as JSON instead of the readable layout.
    #[arg(long)]
    pub json: bool,
}
