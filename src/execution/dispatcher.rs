use std::sync::Arc;

use crate::exchange::ExchangeClient;
use crate::models::{OrderConfirmation, OrderRequest, OrderTemplate};

#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionAction {
    Execute(OrderRequest),
    Skip,
}

#[derive(Debug, Clone)]
pub struct ExecutionDecision {
    pub action: ExecutionAction,
    pub reason: String,
}

/// How a tick ended once the decision was made
#[derive(Debug)]
pub enum DispatchOutcome {
    Placed(OrderConfirmation),
    Skipped,
    Failed(String),
}

/// Compares the current price to the moving average and places a
/// bracketed buy when momentum is up.
pub struct OrderDispatcher {
    exchange: Arc<dyn ExchangeClient>,
    template: OrderTemplate,
}

impl OrderDispatcher {
    pub fn new(exchange: Arc<dyn ExchangeClient>, template: OrderTemplate) -> Self {
        Self { exchange, template }
    }

    /// Buy iff current > average (equal prices do not trade)
    pub fn decide(&self, current_price: f64, average_price: f64) -> ExecutionDecision {
        if current_price > average_price {
            ExecutionDecision {
                action: ExecutionAction::Execute(OrderRequest::bracket(
                    &self.template,
                    current_price,
                )),
                reason: format!(
                    "Current price {:.4} is above the moving average {:.4}",
                    current_price, average_price
                ),
            }
        } else {
            ExecutionDecision {
                action: ExecutionAction::Skip,
                reason: "Current price is not above the moving average. No order placed."
                    .to_string(),
            }
        }
    }

    /// Decide and, if triggered, submit once. Submission errors are logged
    /// and reported in the outcome, never returned.
    pub async fn evaluate_and_dispatch(
        &self,
        current_price: f64,
        average_price: f64,
    ) -> DispatchOutcome {
        let decision = self.decide(current_price, average_price);

        let order = match decision.action {
            ExecutionAction::Execute(order) => order,
            ExecutionAction::Skip => {
                tracing::info!("{}", decision.reason);
                return DispatchOutcome::Skipped;
            }
        };

        tracing::debug!("{}", decision.reason);

        match self.exchange.create_order(&order).await {
            Ok(confirmation) => {
                tracing::info!(
                    order_id = %confirmation.id,
                    "Buy order created: {} {} - Limit @ {} - Take profit @ {} - Stop loss @ {}",
                    order.amount,
                    order.symbol,
                    order.price,
                    order.take_profit(),
                    order.stop_loss()
                );
                tracing::info!("{}", confirmation.raw);
                DispatchOutcome::Placed(confirmation)
            }
            Err(e) => {
                tracing::error!("Error placing order: {}", e);
                DispatchOutcome::Failed(e.to_string())
            }
        }
    }
}
