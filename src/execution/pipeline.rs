use std::sync::Arc;

use anyhow::Context;

use super::dispatcher::{DispatchOutcome, OrderDispatcher};
use crate::api::MarketDataProvider;
use crate::indicators::compute_average;

/// One tick: fetch history, average it, fetch spot, decide and dispatch.
/// Nothing is carried from one tick to the next.
pub struct TradingPipeline {
    market_data: Arc<dyn MarketDataProvider>,
    dispatcher: OrderDispatcher,
}

impl TradingPipeline {
    pub fn new(market_data: Arc<dyn MarketDataProvider>, dispatcher: OrderDispatcher) -> Self {
        Self {
            market_data,
            dispatcher,
        }
    }

    /// Any fetch or averaging failure aborts the tick before dispatch
    pub async fn run_tick(&self) -> anyhow::Result<DispatchOutcome> {
        let series = self
            .market_data
            .fetch_historical_series()
            .await
            .context("Error fetching historical data")?;

        let average = compute_average(&series).context("Error computing moving average")?;
        tracing::info!(
            average = %average,
            points = series.len(),
            "{}-day Moving Average: {:.4}",
            series.len(),
            average
        );

        let current = self
            .market_data
            .fetch_current_price()
            .await
            .context("Error fetching current price")?;
        tracing::info!(price = %current, "Current Price: {:.4}", current);

        Ok(self.dispatcher.evaluate_and_dispatch(current, average).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::testing::{pipeline, CountingExchange, StubMarketData};

    #[tokio::test]
    async fn test_tick_places_order_above_average() {
        let market = Arc::new(StubMarketData::prices(&[100.0, 200.0, 300.0], 250.0));
        let exchange = Arc::new(CountingExchange::default());

        let outcome = pipeline(market, exchange.clone()).run_tick().await.unwrap();

        assert!(matches!(outcome, DispatchOutcome::Placed(_)));
        assert_eq!(exchange.calls(), 1);
    }

    #[tokio::test]
    async fn test_tick_skips_at_average() {
        let market = Arc::new(StubMarketData::prices(&[100.0, 200.0, 300.0], 200.0));
        let exchange = Arc::new(CountingExchange::default());

        let outcome = pipeline(market, exchange.clone()).run_tick().await.unwrap();

        assert!(matches!(outcome, DispatchOutcome::Skipped));
        assert_eq!(exchange.calls(), 0);
    }

    #[tokio::test]
    async fn test_history_failure_prevents_dispatch() {
        let market = Arc::new(StubMarketData::failing());
        let exchange = Arc::new(CountingExchange::default());

        let err = pipeline(market.clone(), exchange.clone())
            .run_tick()
            .await
            .unwrap_err();

        assert!(err.to_string().contains("historical data"));
        assert_eq!(market.spot_calls(), 0);
        assert_eq!(exchange.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_history_is_an_error() {
        let market = Arc::new(StubMarketData::prices(&[], 1_000.0));
        let exchange = Arc::new(CountingExchange::default());

        let err = pipeline(market, exchange.clone())
            .run_tick()
            .await
            .unwrap_err();

        assert!(err.to_string().contains("moving average"));
        assert_eq!(exchange.calls(), 0);
    }
}
