use super::util::{build_client, first_resolved, get_json};
use crate::core::config::TiingoProviderConfig;
use crate::core::error::FetchError;
use crate::core::price::{LOOKBACK_DAYS, MarketDataProvider, PricePoint};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

pub struct TiingoProvider {
    base_url: String,
    api_key: Option<String>,
    symbol_suffixes: Vec<String>,
    client: reqwest::Client,
}

impl TiingoProvider {
    pub fn new(config: &TiingoProviderConfig, timeout: std::time::Duration) -> Result<Self> {
        Ok(TiingoProvider {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            symbol_suffixes: config.symbol_suffixes.clone(),
            client: build_client(timeout)?,
        })
    }

    fn request(&self, url: &str) -> reqwest::RequestBuilder {
        let request = self.client.get(url);
        match &self.api_key {
            Some(key) => request.header("Authorization", format!("Token {key}")),
            None => request,
        }
    }

    async fn fetch_ticker(&self, symbol: &str, ticker: &str) -> Result<PricePoint, FetchError> {
        let url = format!("{}/tiingo/daily/{}/prices", self.base_url, ticker);
        debug!("Requesting latest price from {}", url);

        let quote: Vec<TiingoPrice> = get_json(self.request(&url), ticker).await?;
        let current_price = quote
            .first()
            .and_then(|q| q.close)
            .filter(|p| *p > Decimal::ZERO)
            .ok_or_else(|| FetchError::InvalidSymbol(ticker.to_string()))?;

        let end_date = Utc::now().date_naive();
        let start_date = end_date - Duration::days(LOOKBACK_DAYS);
        let url = format!(
            "{}/tiingo/daily/{}/prices?startDate={}&endDate={}&resampleFreq=daily",
            self.base_url,
            ticker,
            start_date.format("%Y-%m-%d"),
            end_date.format("%Y-%m-%d"),
        );
        debug!("Requesting price history from {}", url);

        let bars: Vec<TiingoPrice> = get_json(self.request(&url), ticker).await?;
        let closes: BTreeMap<_, _> = bars
            .into_iter()
            .filter_map(|bar| bar.close.map(|close| (bar.date.date_naive(), close)))
            .collect();

        PricePoint::from_daily_closes(symbol, current_price, closes)
    }
}

#[derive(Deserialize, Debug)]
struct TiingoPrice {
    date: DateTime<Utc>,
    close: Option<Decimal>,
}

#[async_trait]
impl MarketDataProvider for TiingoProvider {
    #[instrument(name = "TiingoFetch", skip(self), fields(symbol = %symbol))]
    async fn fetch_quote(&self, symbol: &str) -> Result<PricePoint, FetchError> {
        let point = first_resolved(symbol, &self.symbol_suffixes, move |ticker| async move {
            self.fetch_ticker(symbol, &ticker).await
        })
        .await?;

        debug!(
            "Data fetched for {}: price={}, previous_close={}, history={:?}",
            symbol, point.current_price, point.previous_close, point.history
        );
        Ok(point)
    }
}
