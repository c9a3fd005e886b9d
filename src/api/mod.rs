pub mod coingecko;

pub use coingecko::CoinGeckoClient;

use crate::models::HistoricalSeries;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("request to {endpoint} endpoint failed: {source}")]
    Http {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} endpoint returned HTTP {status}: {body}")]
    Status {
        endpoint: &'static str,
        status: u16,
        body: String,
    },

    #[error("unexpected {endpoint} response shape: {source}")]
    Parse {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("spot response has no {vs_currency} price for {coin_id}")]
    MissingPrice {
        coin_id: String,
        vs_currency: String,
    },
}

/// Source of the price history and spot price for the traded asset
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Completed daily points, oldest first, without the in-progress period
    async fn fetch_historical_series(&self) -> Result<HistoricalSeries, MarketDataError>;

    async fn fetch_current_price(&self) -> Result<f64, MarketDataError>;
}
