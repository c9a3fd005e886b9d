//! Stub collaborators shared by the execution tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use super::{OrderDispatcher, TradingPipeline};
use crate::api::{MarketDataError, MarketDataProvider};
use crate::exchange::{ExchangeClient, ExchangeError};
use crate::models::{
    HistoricalSeries, OrderConfirmation, OrderRequest, OrderSide, OrderTemplate, OrderType,
    PricePoint,
};

enum History {
    Prices(Vec<f64>),
    Fail,
    Panic,
}

pub struct StubMarketData {
    history: History,
    current: f64,
    history_calls: AtomicUsize,
    spot_calls: AtomicUsize,
}

impl StubMarketData {
    fn with(history: History, current: f64) -> Self {
        Self {
            history,
            current,
            history_calls: AtomicUsize::new(0),
            spot_calls: AtomicUsize::new(0),
        }
    }

    pub fn prices(history: &[f64], current: f64) -> Self {
        Self::with(History::Prices(history.to_vec()), current)
    }

    pub fn failing() -> Self {
        Self::with(History::Fail, 0.0)
    }

    pub fn panicking() -> Self {
        Self::with(History::Panic, 0.0)
    }

    pub fn history_calls(&self) -> usize {
        self.history_calls.load(Ordering::SeqCst)
    }

    pub fn spot_calls(&self) -> usize {
        self.spot_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MarketDataProvider for StubMarketData {
    async fn fetch_historical_series(&self) -> Result<HistoricalSeries, MarketDataError> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        match &self.history {
            History::Prices(prices) => Ok(HistoricalSeries::new(
                prices
                    .iter()
                    .enumerate()
                    .map(|(i, p)| PricePoint::new(i as i64 * 86_400_000, *p))
                    .collect(),
            )),
            History::Fail => Err(MarketDataError::Status {
                endpoint: "market_chart",
                status: 500,
                body: "boom".to_string(),
            }),
            History::Panic => panic!("market data stub exploded"),
        }
    }

    async fn fetch_current_price(&self) -> Result<f64, MarketDataError> {
        self.spot_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.current)
    }
}

#[derive(Default)]
pub struct CountingExchange {
    calls: AtomicUsize,
}

impl CountingExchange {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExchangeClient for CountingExchange {
    async fn create_order(
        &self,
        _request: &OrderRequest,
    ) -> Result<OrderConfirmation, ExchangeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(OrderConfirmation {
            id: "7".to_string(),
            client_order_id: "c7".to_string(),
            status: "EXECUTING".to_string(),
            leg_order_ids: Vec::new(),
            raw: serde_json::Value::Null,
        })
    }
}

pub fn pipeline(market: Arc<StubMarketData>, exchange: Arc<CountingExchange>) -> TradingPipeline {
    let template = OrderTemplate {
        symbol: "SOL/USDT".to_string(),
        order_type: OrderType::Limit,
        side: OrderSide::Buy,
        amount: 5.0,
    };
    TradingPipeline::new(market, OrderDispatcher::new(exchange, template))
}
