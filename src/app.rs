//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads configuration from the environment
//! - runs the requested pipeline
//! - prints reports and writes optional exports

use clap::Parser;

use crate::cli::{Cli, Command, DiagnoseArgs, PricesArgs};
use crate::config::{PriceSourceConfig, VisionConfig};
use crate::data::{PriceClient, VisionClient};
use crate::domain::{QuerySpec, Window};
use crate::error::AppError;

/// Entry point for the `mandi` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    match cli.command {
        Command::Prices(args) => handle_prices(args),
        Command::Diagnose(args) => handle_diagnose(args),
    }
}

fn handle_prices(args: PricesArgs) -> Result<(), AppError> {
    let spec = query_spec_from_args(&args);
    let config = PriceSourceConfig::from_env()?;
    let client = PriceClient::new(config)?;
    let records = client.fetch(&spec)?;

    println!("{}", crate::report::format_fetch_summary(&spec, &records));
    println!("{}", crate::report::format_price_table(&records));

    if let Some(path) = &args.export_json {
        crate::io::export::write_records_json(path, &records)?;
    }
    if let Some(path) = &args.export_csv {
        crate::io::export::write_records_csv(path, &records)?;
    }

    Ok(())
}

fn handle_diagnose(args: DiagnoseArgs) -> Result<(), AppError> {
    let record = if let Some(path) = &args.reply {
        let text = std::fs::read_to_string(path).map_err(|e| {
            AppError::new(2, format!("Failed to read reply '{}': {e}", path.display()))
        })?;
        crate::diagnose::parse(&text)
    } else if let Some(path) = &args.image {
        let bytes = std::fs::read(path).map_err(|e| {
            AppError::new(2, format!("Failed to read image '{}': {e}", path.display()))
        })?;
        let client = VisionClient::new(VisionConfig::from_env()?)?;
        client.diagnose_image(&bytes)?
    } else {
        return Err(AppError::new(2, "Provide either --image or --reply."));
    };

    if args.json {
        let json = serde_json::to_string_pretty(&record)
            .map_err(|e| AppError::new(2, format!("Failed to serialize diagnosis: {e}")))?;
        println!("{json}");
    } else {
        println!("{}", crate::report::format_diagnosis(&record));
    }

    Ok(())
}

pub fn query_spec_from_args(args: &PricesArgs) -> QuerySpec {
    let window = if args.today {
        Window::Today
    } else if let Some(n) = args.days {
        Window::LastNDays(n)
    } else {
        Window::All
    };

    QuerySpec {
        commodity: args.commodity.clone(),
        state: args.state.clone(),
        market: args.market.clone(),
        window,
        // `limit` is an invariant-positive request bound.
        limit: args.limit.max(1),
    }
}
