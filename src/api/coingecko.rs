use super::{MarketDataError, MarketDataProvider};
use crate::config::Config;
use crate::models::{HistoricalSeries, PricePoint};
use anyhow::Context;
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;

const HISTORICAL: &str = "market_chart";
const SPOT: &str = "simple_price";

/// CoinGecko market data client.
///
/// One plain GET per call: no retries, caching or rate limiting.
/// A failed call only aborts the tick that made it.
#[derive(Clone)]
pub struct CoinGeckoClient {
    client: Client,
    historical_url: String,
    spot_url: String,
    coin_id: String,
    vs_currency: String,
}

/// Response from /market_chart endpoint
#[derive(Debug, Deserialize)]
struct MarketChartResponse {
    prices: Vec<[f64; 2]>, // [timestamp_ms, price]
}

/// Response from /simple/price endpoint: coin_id -> vs_currency -> price
type SimplePriceResponse = HashMap<String, HashMap<String, f64>>;

impl CoinGeckoClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let base_url = &config.settings.coingecko_base_url;
        reqwest::Url::parse(base_url)
            .with_context(|| format!("Invalid CoinGecko base URL {:?}", base_url))?;

        let client = Client::builder()
            .timeout(config.settings.request_timeout())
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            historical_url: config.historical_url().to_string(),
            spot_url: config.spot_url().to_string(),
            coin_id: config.settings.coin_id.clone(),
            vs_currency: config.settings.vs_currency.clone(),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        endpoint: &'static str,
    ) -> Result<T, MarketDataError> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|source| MarketDataError::Http { endpoint, source })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| MarketDataError::Http { endpoint, source })?;

        if !status.is_success() {
            return Err(MarketDataError::Status {
                endpoint,
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|source| MarketDataError::Parse { endpoint, source })
    }
}

#[async_trait]
impl MarketDataProvider for CoinGeckoClient {
    async fn fetch_historical_series(&self) -> Result<HistoricalSeries, MarketDataError> {
        let data: MarketChartResponse = self.get_json(&self.historical_url, HISTORICAL).await?;

        let mut points: Vec<PricePoint> = data
            .prices
            .iter()
            .map(|[ts, price]| PricePoint::new(*ts as i64, *price))
            .collect();

        // Latest point is the still-open day
        points.pop();

        let series = HistoricalSeries::new(points);
        match series.date_range() {
            Some((first, last)) => tracing::debug!(
                "Fetched {} completed price points for {} ({} to {})",
                series.len(),
                self.coin_id,
                first.format("%Y-%m-%d"),
                last.format("%Y-%m-%d")
            ),
            None => tracing::debug!("Fetched no completed price points for {}", self.coin_id),
        }

        Ok(series)
    }

    async fn fetch_current_price(&self) -> Result<f64, MarketDataError> {
        let data: SimplePriceResponse = self.get_json(&self.spot_url, SPOT).await?;

        data.get(&self.coin_id)
            .and_then(|prices| prices.get(&self.vs_currency))
            .copied()
            .ok_or_else(|| MarketDataError::MissingPrice {
                coin_id: self.coin_id.clone(),
                vs_currency: self.vs_currency.clone(),
            })
    }
}
