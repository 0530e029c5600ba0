//! Process configuration, loaded once at startup.
//!
//! Keys, endpoints, and timeouts live in explicit structs that get passed into
//! the clients, never in ambient globals, so each component stays testable
//! with fake configuration. A local `.env` file is honored via `dotenvy`.

use std::time::Duration;

use crate::error::AppError;

pub const DEFAULT_PRICE_BASE_URL: &str = "https://api.data.gov.in/resource";
/// Current-daily-prices resource on data.gov.in.
pub const DEFAULT_PRICE_RESOURCE_ID: &str = "35985678-0d79-46b4-9ed6-6f13308a1d24";

pub const DEFAULT_VISION_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_VISION_MODEL: &str = "gemini-1.5-flash";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for the commodity price source.
#[derive(Debug, Clone)]
pub struct PriceSourceConfig {
    pub base_url: String,
    pub resource_id: String,
    pub api_key: String,
    /// Applied to the whole request; a hanging source eventually surfaces as
    /// `FetchError::SourceUnavailable`.
    pub timeout: Duration,
}

impl PriceSourceConfig {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let api_key = std::env::var("DATA_GOV_API_KEY")
            .map_err(|_| AppError::new(2, "Missing DATA_GOV_API_KEY in environment (.env)."))?;
        Ok(Self {
            base_url: env_or("MANDI_PRICE_BASE_URL", DEFAULT_PRICE_BASE_URL),
            resource_id: env_or("MANDI_PRICE_RESOURCE_ID", DEFAULT_PRICE_RESOURCE_ID),
            api_key: api_key.trim().to_string(),
            timeout: timeout_from_env("MANDI_TIMEOUT_SECS")?,
        })
    }
}

/// Configuration for the hosted vision model.
#[derive(Debug, Clone)]
pub struct VisionConfig {
    pub base_url: String,
    pub model_id: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl VisionConfig {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| AppError::new(2, "Missing GEMINI_API_KEY in environment (.env)."))?;
        Ok(Self {
            base_url: env_or("MANDI_VISION_BASE_URL", DEFAULT_VISION_BASE_URL),
            model_id: env_or("MANDI_VISION_MODEL", DEFAULT_VISION_MODEL),
            api_key: api_key.trim().to_string(),
            timeout: timeout_from_env("MANDI_TIMEOUT_SECS")?,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => value.trim().to_string(),
        _ => default.to_string(),
    }
}

fn timeout_from_env(key: &str) -> Result<Duration, AppError> {
    match std::env::var(key) {
        Err(_) => Ok(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        Ok(raw) => {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                AppError::new(2, format!("Invalid {key} '{raw}': expected whole seconds."))
            })?;
            if secs == 0 {
                return Err(AppError::new(2, format!("{key} must be > 0.")));
            }
            Ok(Duration::from_secs(secs))
        }
    }
}
