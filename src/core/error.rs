//! Error types for fetching market data and allocating portfolios

use rust_decimal::Decimal;
use thiserror::Error;

/// Failures raised by market data providers and the fetch pipeline.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("Invalid symbol '{0}'")]
    InvalidSymbol(String),

    #[error("No historical data for '{0}'")]
    NoHistory(String),

    #[error("Request error for '{symbol}': {detail}")]
    Request { symbol: String, detail: String },

    #[error("HTTP error: {status} for '{symbol}'")]
    Status { symbol: String, status: u16 },

    #[error("Failed to parse response for '{symbol}': {detail}")]
    Decode { symbol: String, detail: String },

    #[error("Unable to fetch data for '{symbol}' after {attempts} attempts. Details: {detail}")]
    Exhausted {
        symbol: String,
        attempts: u32,
        detail: String,
    },
}

impl FetchError {
    pub(crate) fn request(symbol: &str, err: reqwest::Error) -> Self {
        FetchError::Request {
            symbol: symbol.to_string(),
            detail: err.to_string(),
        }
    }

    pub(crate) fn decode(symbol: &str, err: impl std::fmt::Display) -> Self {
        FetchError::Decode {
            symbol: symbol.to_string(),
            detail: err.to_string(),
        }
    }
}

/// Failures of a single allocation request. None of these are fatal to the
/// process.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AllocationError {
    #[error("Investment amount must be at least ${minimum} USD.")]
    AmountTooLow { amount: Decimal, minimum: Decimal },

    #[error("Invalid or no strategy selected: '{0}'.")]
    UnknownStrategy(String),

    #[error("Invalid price {price} for '{symbol}'.")]
    InvalidPrice { symbol: String, price: Decimal },

    #[error("Amount {amount} is too large to allocate to '{symbol}'.")]
    AmountOutOfRange { symbol: String, amount: Decimal },

    #[error("Failed to fetch '{symbol}': {source}")]
    Fetch {
        symbol: String,
        #[source]
        source: FetchError,
    },

    #[error("Please enter a dollar amount.")]
    MissingAmount,

    #[error("Please enter a valid dollar amount: '{0}'.")]
    InvalidAmountFormat(String),

    #[error("Please select one investment strategy.")]
    MissingStrategy,
}
