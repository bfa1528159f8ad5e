//! Splits a cash amount across a strategy's basket in whole shares.
use crate::core::error::AllocationError;
use crate::core::price::{MarketDataProvider, PricePoint};
use crate::core::strategy::{BASKET_SIZE, StrategyName, StrategyRegistry};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, error, instrument};

/// Position bought in a single security.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Allocation {
    pub symbol: String,
    pub shares: u64,
    pub allocated_amount: Decimal,
    pub current_price: Decimal,
    pub previous_close: Decimal,
    pub value_change: Decimal,
    pub percentage_change: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioReport {
    pub strategy: StrategyName,
    pub description: String,
    pub amount: Decimal,
    pub amount_per_security: Decimal,
    /// One entry per ticker, in strategy order
    pub allocations: Vec<Allocation>,
    pub current_value: Decimal,
    pub total_value_change: Decimal,
    /// Cash left over after buying whole shares
    pub uninvested: Decimal,
    /// Aggregate holding value per trading day, oldest first
    pub trend: Vec<TrendPoint>,
}

/// Buys as many whole shares of one security as the budget allows.
pub fn allocate_security(
    point: &PricePoint,
    amount_per_security: Decimal,
) -> Result<Allocation, AllocationError> {
    let price = point.current_price;
    let invalid_price = || AllocationError::InvalidPrice {
        symbol: point.symbol.clone(),
        price,
    };

    if price <= Decimal::ZERO {
        return Err(invalid_price());
    }
    let out_of_range = || AllocationError::AmountOutOfRange {
        symbol: point.symbol.clone(),
        amount: amount_per_security,
    };
    let shares = amount_per_security
        .checked_div(price)
        .and_then(|units| units.floor().to_u64())
        .ok_or_else(out_of_range)?;

    let held = Decimal::from(shares);
    let allocated_amount = held.checked_mul(price).ok_or_else(out_of_range)?;
    let change = price - point.previous_close;
    let value_change = change.checked_mul(held).ok_or_else(out_of_range)?;
    let percentage_change = if point.previous_close.is_zero() {
        Decimal::ZERO
    } else {
        change / point.previous_close * Decimal::ONE_HUNDRED
    };

    Ok(Allocation {
        symbol: point.symbol.clone(),
        shares,
        allocated_amount,
        current_price: price,
        previous_close: point.previous_close,
        value_change,
        percentage_change,
    })
}

/// Sums the value of every holding on each trading day.
///
/// Days are the union of all histories; a security without a close on a
/// given day contributes nothing to it.
pub fn aggregate_trend<'a>(
    holdings: impl IntoIterator<Item = (u64, &'a PricePoint)>,
) -> Vec<TrendPoint> {
    let mut totals: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    for (shares, point) in holdings {
        let held = Decimal::from(shares);
        for (date, close) in &point.history {
            *totals.entry(*date).or_default() += held * *close;
        }
    }

    totals
        .into_iter()
        .map(|(date, value)| TrendPoint { date, value })
        .collect()
}

pub struct AllocationEngine {
    provider: Arc<dyn MarketDataProvider>,
    registry: StrategyRegistry,
    minimum_amount: Decimal,
}

impl AllocationEngine {
    pub const DEFAULT_MINIMUM_AMOUNT: Decimal = Decimal::from_parts(5000, 0, 0, false, 0);

    pub fn new(provider: Arc<dyn MarketDataProvider>) -> Self {
        Self {
            provider,
            registry: StrategyRegistry,
            minimum_amount: Self::DEFAULT_MINIMUM_AMOUNT,
        }
    }

    pub fn with_minimum_amount(mut self, minimum_amount: Decimal) -> Self {
        self.minimum_amount = minimum_amount;
        self
    }

    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }

    pub fn minimum_amount(&self) -> Decimal {
        self.minimum_amount
    }

    /// Allocates `amount` equally across the strategy's securities.
    ///
    /// Securities are fetched one at a time in strategy order and the first
    /// failure aborts the request; a report never covers a partial basket.
    #[instrument(skip(self))]
    pub async fn allocate(
        &self,
        amount: Decimal,
        strategy: &str,
    ) -> Result<PortfolioReport, AllocationError> {
        if amount < self.minimum_amount {
            return Err(AllocationError::AmountTooLow {
                amount,
                minimum: self.minimum_amount,
            });
        }

        let Some(strategy) = self.registry.get(strategy) else {
            error!("Invalid strategy: {}", strategy);
            return Err(AllocationError::UnknownStrategy(strategy.to_string()));
        };
        debug!(
            "Processing securities for strategy {}: {:?}",
            strategy.name, strategy.tickers
        );

        let mut points = Vec::with_capacity(BASKET_SIZE);
        for symbol in strategy.tickers {
            let point = self
                .provider
                .fetch_quote(symbol)
                .await
                .map_err(|source| AllocationError::Fetch {
                    symbol: symbol.to_string(),
                    source,
                })?;
            points.push(point);
        }

        let amount_per_security = amount / Decimal::from(BASKET_SIZE);
        let allocations = points
            .iter()
            .map(|point| allocate_security(point, amount_per_security))
            .collect::<Result<Vec<_>, _>>()?;

        let current_value: Decimal = allocations.iter().map(|a| a.allocated_amount).sum();
        let total_value_change: Decimal = allocations.iter().map(|a| a.value_change).sum();
        let trend = aggregate_trend(allocations.iter().map(|a| a.shares).zip(&points));

        Ok(PortfolioReport {
            strategy: strategy.name,
            description: strategy.description.to_string(),
            amount,
            amount_per_security,
            allocations,
            current_value,
            total_value_change,
            uninvested: amount - current_value,
            trend,
        })
    }
}
