use super::util::{build_client, first_resolved, get_json};
use crate::core::config::YahooProviderConfig;
use crate::core::error::FetchError;
use crate::core::price::{LOOKBACK_DAYS, MarketDataProvider, PricePoint};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

fn extract_daily_closes(chart_item: &PriceChartItem) -> BTreeMap<NaiveDate, Decimal> {
    let (Some(timestamps), Some(closes)) = (
        chart_item.timestamp.as_ref(),
        chart_item
            .indicators
            .as_ref()
            .and_then(|inds| inds.quote.first())
            .and_then(|q| q.close.as_ref()),
    ) else {
        return BTreeMap::new();
    };

    timestamps
        .iter()
        .zip(closes)
        .filter_map(|(ts, close)| {
            let date = Utc.timestamp_opt(*ts, 0).single()?.date_naive();
            close.map(|c| (date, c))
        })
        .collect()
}

pub struct YahooFinanceProvider {
    base_url: String,
    symbol_suffixes: Vec<String>,
    client: reqwest::Client,
}

impl YahooFinanceProvider {
    pub fn new(config: &YahooProviderConfig, timeout: std::time::Duration) -> Result<Self> {
        Ok(YahooFinanceProvider {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            symbol_suffixes: config.symbol_suffixes.clone(),
            client: build_client(timeout)?,
        })
    }

    async fn fetch_ticker(&self, symbol: &str, ticker: &str) -> Result<PricePoint, FetchError> {
        let end = Utc::now();
        let start = end - Duration::days(LOOKBACK_DAYS);
        let url = format!(
            "{}/v8/finance/chart/{}?period1={}&period2={}&interval=1d",
            self.base_url,
            ticker,
            start.timestamp(),
            end.timestamp()
        );
        debug!("Requesting price data from {}", url);

        let data: YahooPriceResponse = get_json(self.client.get(&url), ticker).await?;
        let item = data
            .chart
            .result
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| FetchError::InvalidSymbol(ticker.to_string()))?;

        let current_price = item
            .meta
            .regular_market_price
            .filter(|p| *p > Decimal::ZERO)
            .ok_or_else(|| FetchError::InvalidSymbol(ticker.to_string()))?;

        PricePoint::from_daily_closes(symbol, current_price, extract_daily_closes(&item))
    }
}

#[derive(Deserialize, Debug)]
struct YahooPriceResponse {
    chart: PriceChartResult,
}

#[derive(Deserialize, Debug)]
struct PriceChartResult {
    result: Option<Vec<PriceChartItem>>,
}

#[derive(Deserialize, Debug)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Deserialize, Debug)]
struct Quote {
    close: Option<Vec<Option<Decimal>>>,
}

#[derive(Deserialize, Debug)]
struct PriceChartItem {
    meta: PriceChartMeta,
    timestamp: Option<Vec<i64>>,
    indicators: Option<Indicators>,
}

#[derive(Deserialize, Debug)]
struct PriceChartMeta {
    #[serde(alias = "regularMarketPrice")]
    regular_market_price: Option<Decimal>,
}

#[async_trait]
impl MarketDataProvider for YahooFinanceProvider {
    #[instrument(name = "YahooPriceFetch", skip(self), fields(symbol = %symbol))]
    async fn fetch_quote(&self, symbol: &str) -> Result<PricePoint, FetchError> {
        first_resolved(symbol, &self.symbol_suffixes, move |ticker| async move {
            self.fetch_ticker(symbol, &ticker).await
        })
        .await
    }
}
