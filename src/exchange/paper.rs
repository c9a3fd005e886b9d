use super::{ExchangeClient, ExchangeError};
use crate::models::{OrderConfirmation, OrderRequest};
use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

/// Dry-run exchange: accepts every order without touching the network
#[derive(Debug, Clone, Default)]
pub struct PaperExchange;

impl PaperExchange {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ExchangeClient for PaperExchange {
    async fn create_order(
        &self,
        request: &OrderRequest,
    ) -> Result<OrderConfirmation, ExchangeError> {
        let id = Uuid::new_v4();

        tracing::info!(
            symbol = %request.symbol,
            amount = %request.amount,
            "📝 [DRY RUN] Would submit {:?} {:?} order",
            request.side,
            request.order_type
        );

        let raw = serde_json::json!({
            "paper": true,
            "id": id.to_string(),
            "symbol": request.symbol,
            "side": request.side,
            "type": request.order_type,
            "amount": request.amount,
            "price": request.price,
            "params": request.params,
            "timestamp": Utc::now().timestamp_millis(),
        });

        Ok(OrderConfirmation {
            id: id.to_string(),
            client_order_id: id.simple().to_string(),
            status: "PAPER".to_string(),
            leg_order_ids: Vec::new(),
            raw,
        })
    }
}
