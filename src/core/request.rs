//! Validation of raw user input ahead of an allocation.

use crate::core::allocation::{AllocationEngine, PortfolioReport};
use crate::core::error::AllocationError;
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::{debug, error};

/// Parses a dollar amount such as `9000`, `$12,500.50` or ` 5000 `.
pub fn parse_amount(raw: &str) -> Result<Decimal, AllocationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AllocationError::MissingAmount);
    }

    let digits: String = trimmed
        .strip_prefix('$')
        .unwrap_or(trimmed)
        .chars()
        .filter(|c| *c != ',')
        .collect();

    Decimal::from_str(digits.trim()).map_err(|e| {
        error!("Invalid amount entered: {}", e);
        AllocationError::InvalidAmountFormat(raw.to_string())
    })
}

/// Validates raw form input and runs the allocation.
pub async fn handle_allocation_request(
    engine: &AllocationEngine,
    amount: &str,
    strategy: &str,
) -> Result<PortfolioReport, AllocationError> {
    let amount = parse_amount(amount)?;
    let strategy = strategy.trim();
    if strategy.is_empty() {
        return Err(AllocationError::MissingStrategy);
    }

    debug!("Received request: amount={}, strategy={}", amount, strategy);
    engine.allocate(amount, strategy).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FetchError, MarketDataProvider, PricePoint};
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    struct FixedPrice;

    #[async_trait]
    impl MarketDataProvider for FixedPrice {
        async fn fetch_quote(&self, symbol: &str) -> Result<PricePoint, FetchError> {
            PricePoint::from_daily_closes(
                symbol,
                dec!(100),
                BTreeMap::from([(chrono::NaiveDate::MIN, dec!(100))]),
            )
        }
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("9000").unwrap(), dec!(9000));
        assert_eq!(parse_amount(" $12,500.50 ").unwrap(), dec!(12500.50));
        assert_eq!(parse_amount("4999.99").unwrap(), dec!(4999.99));
    }

    #[test]
    fn test_parse_amount_errors() {
        assert_eq!(parse_amount("  "), Err(AllocationError::MissingAmount));
        assert_eq!(
            parse_amount("ten thousand"),
            Err(AllocationError::InvalidAmountFormat(
                "ten thousand".to_string()
            ))
        );
        assert!(matches!(
            parse_amount("$"),
            Err(AllocationError::InvalidAmountFormat(_))
        ));
    }

    #[tokio::test]
    async fn test_handle_request() {
        let engine = AllocationEngine::new(Arc::new(FixedPrice));

        let report = handle_allocation_request(&engine, "$9,000", " value ")
            .await
            .unwrap();
        assert_eq!(report.current_value, dec!(9000));

        assert_eq!(
            handle_allocation_request(&engine, "9000", "").await,
            Err(AllocationError::MissingStrategy)
        );
        assert!(matches!(
            handle_allocation_request(&engine, "abc", "value").await,
            Err(AllocationError::InvalidAmountFormat(_))
        ));
        assert!(matches!(
            handle_allocation_request(&engine, "4999", "value").await,
            Err(AllocationError::AmountTooLow { .. })
        ));
    }
}
