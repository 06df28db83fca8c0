//! Failures while acquiring prices or fundamentals.

use thiserror::Error;

/// Result alias for acquisition calls.
pub type Result<T> = std::result::Result<T, DataError>;

/// Why a fetch produced no data.
///
/// The dashboard never aborts on these; it records the message and renders
/// without the affected section.
#[derive(Debug, Error)]
pub enum DataError {
    /// The ticker was rejected before any request was made
    #[error("invalid ticker symbol: {0}")]
    InvalidSymbol(String),

    /// A lookback of zero years
    #[error("lookback must cover at least one year, got {0}")]
    InvalidLookback(u32),

    /// Start of a requested range lies after its end
    #[error("requested range starts at {start}, after its end {end}")]
    InvalidDateRange {
        /// Requested start (RFC 3339)
        start: String,
        /// Requested end (RFC 3339)
        end: String,
    },

    /// A timestamp could not be represented
    #[error("time conversion failed: {0}")]
    TimeConversion(String),

    /// Transport failure talking to Yahoo
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// Yahoo answered with a non-success status and no error payload
    #[error("unexpected HTTP status {0}")]
    Http(String),

    /// Yahoo reported an error for the request
    #[error("Yahoo Finance: {0}")]
    YahooApi(String),

    /// The response was well-formed but held nothing usable
    #[error("no data for {symbol}: {reason}")]
    MissingData {
        /// Requested symbol
        symbol: String,
        /// What was missing
        reason: String,
    },

    /// A response field had an unexpected shape
    #[error("malformed response: {0}")]
    Parse(String),

    /// Frame construction or column access failed
    #[error("dataframe error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),
}

impl From<yahoo_finance_api::YahooError> for DataError {
    fn from(err: yahoo_finance_api::YahooError) -> Self {
        Self::YahooApi(err.to_string())
    }
}
