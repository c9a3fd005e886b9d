// Order submission: exchange capability and its implementations
pub mod binance;
pub mod paper;

pub use binance::BinanceClient;
pub use paper::PaperExchange;

use crate::models::{OrderConfirmation, OrderRequest};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("exchange request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("exchange rejected order (HTTP {status}, code {code}): {msg}")]
    Rejected { status: u16, code: i64, msg: String },

    #[error("unexpected exchange response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to sign request: {0}")]
    Signing(String),

    #[error("unsupported order: {0}")]
    Unsupported(String),
}

/// Places bracketed orders on an exchange
#[async_trait]
pub trait ExchangeClient: Send + Sync {
    async fn create_order(&self, request: &OrderRequest)
        -> Result<OrderConfirmation, ExchangeError>;
}
