use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Limit entry is placed this far above the current price
pub const ENTRY_MARKUP: f64 = 1.02;
/// Stop-loss trigger relative to the current price (-10%)
pub const STOP_LOSS_RATIO: f64 = 0.9;
/// Take-profit trigger relative to the current price (+30%)
pub const TAKE_PROFIT_RATIO: f64 = 1.3;

/// A single point of a provider price series
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PricePoint {
    pub timestamp_ms: i64,
    pub price: f64,
}

impl PricePoint {
    pub fn new(timestamp_ms: i64, price: f64) -> Self {
        Self {
            timestamp_ms,
            price,
        }
    }

    /// Timestamp as a UTC datetime (None if out of chrono's range)
    pub fn time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp_ms)
    }
}

/// Completed daily price points, oldest first.
/// Built fresh every tick and thrown away after averaging.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoricalSeries {
    points: Vec<PricePoint>,
}

impl HistoricalSeries {
    pub fn new(points: Vec<PricePoint>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn prices(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.price)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Times of the oldest and newest points, for logging
    pub fn date_range(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let first = self.points.first()?.time()?;
        let last = self.points.last()?.time()?;
        Some((first, last))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn opposite(self) -> Self {
        match self {
            OrderSide::Buy => OrderSide::Sell,
            OrderSide::Sell => OrderSide::Buy,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSide::Buy => "BUY",
            OrderSide::Sell => "SELL",
        }
    }
}

/// Entry order types that can carry an attached bracket
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    Limit,
    LimitMaker,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Limit => "LIMIT",
            OrderType::LimitMaker => "LIMIT_MAKER",
        }
    }
}

/// The static part of every order: what to trade and how much
#[derive(Debug, Clone, PartialEq)]
pub struct OrderTemplate {
    pub symbol: String,
    pub order_type: OrderType,
    pub side: OrderSide,
    pub amount: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TriggerPrice {
    pub trigger_price: f64,
}

/// Conditional exits submitted together with the entry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BracketParams {
    pub stop_loss: TriggerPrice,
    pub take_profit: TriggerPrice,
}

/// Bracketed order ready for submission
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRequest {
    pub symbol: String,
    pub order_type: OrderType,
    pub side: OrderSide,
    pub amount: f64,
    pub price: f64,
    pub params: BracketParams,
}

impl OrderRequest {
    /// Entry at +2%, stop-loss at -10%, take-profit at +30% of `current_price`
    pub fn bracket(template: &OrderTemplate, current_price: f64) -> Self {
        Self {
            symbol: template.symbol.clone(),
            order_type: template.order_type,
            side: template.side,
            amount: template.amount,
            price: current_price * ENTRY_MARKUP,
            params: BracketParams {
                stop_loss: TriggerPrice {
                    trigger_price: current_price * STOP_LOSS_RATIO,
                },
                take_profit: TriggerPrice {
                    trigger_price: current_price * TAKE_PROFIT_RATIO,
                },
            },
        }
    }

    pub fn stop_loss(&self) -> f64 {
        self.params.stop_loss.trigger_price
    }

    pub fn take_profit(&self) -> f64 {
        self.params.take_profit.trigger_price
    }
}

/// What the exchange handed back after accepting an order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderConfirmation {
    pub id: String,
    pub client_order_id: String,
    pub status: String,
    pub leg_order_ids: Vec<String>,
    pub raw: serde_json::Value,
}
