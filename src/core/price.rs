//! Pricing abstractions and core types

use crate::core::error::FetchError;
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Number of trading days kept in a [`PricePoint`] history.
pub const HISTORY_DAYS: usize = 5;

/// Calendar days looked back when requesting history, wide enough to absorb
/// weekends and market holidays.
pub const LOOKBACK_DAYS: i64 = 10;

/// Normalized market data for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub symbol: String,
    pub current_price: Decimal,
    pub previous_close: Decimal,
    /// Daily closes keyed by trading date, oldest first.
    pub history: BTreeMap<NaiveDate, Decimal>,
}

impl PricePoint {
    /// Builds a price point from a provider's daily closes.
    ///
    /// Only the last [`HISTORY_DAYS`] closes are kept. The previous close is
    /// the second-to-last bar of the window, or the current price when the
    /// window holds a single bar.
    pub fn from_daily_closes(
        symbol: &str,
        current_price: Decimal,
        closes: BTreeMap<NaiveDate, Decimal>,
    ) -> Result<Self, FetchError> {
        if closes.is_empty() {
            return Err(FetchError::NoHistory(symbol.to_string()));
        }

        let previous_close = closes
            .values()
            .rev()
            .nth(1)
            .copied()
            .unwrap_or(current_price);

        let skip = closes.len().saturating_sub(HISTORY_DAYS);
        let history = closes.into_iter().skip(skip).collect();

        Ok(PricePoint {
            symbol: symbol.to_string(),
            current_price,
            previous_close,
            history,
        })
    }
}

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn fetch_quote(&self, symbol: &str) -> Result<PricePoint, FetchError>;
}
