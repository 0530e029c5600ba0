//! Error types shared across the crate.
//!
//! `AppError` is what the binary sees: a message plus a process exit code.
//! `FetchError` is the typed outcome of the price pipeline; the distinction
//! between its variants is user-visible (retry vs "no data" vs "widen the
//! window"), so it is kept as an enum rather than flattened into a string.
//!
//! Exit-code conventions: 2 = input/config, 3 = empty result, 4 = network or
//! upstream data.

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Outcome taxonomy for `PriceClient::fetch`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Transport failure, non-2xx status, or a malformed top-level response.
    ///
    /// Retrying is the caller's decision; `detail` carries the underlying
    /// cause so that decision is an informed one.
    SourceUnavailable { detail: String },
    /// The source answered but had no records for the requested filters.
    NoRecords,
    /// The source had records, but the recency window (or local filters)
    /// excluded all of them.
    NoMatch,
}

impl FetchError {
    pub fn exit_code(&self) -> u8 {
        match self {
            FetchError::SourceUnavailable { .. } => 4,
            FetchError::NoRecords | FetchError::NoMatch => 3,
        }
    }
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::SourceUnavailable { detail } => {
                write!(f, "Price source unavailable: {detail}")
            }
            FetchError::NoRecords => write!(f, "No records found for the given filters."),
            FetchError::NoMatch => write!(
                f,
                "Records exist, but none match the requested window/filters. Try widening the window."
            ),
        }
    }
}

impl std::error::Error for FetchError {}

impl From<FetchError> for AppError {
    fn from(err: FetchError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}
