use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use tokio::task::JoinError;
use tokio::time::{interval_at, Duration, Instant, MissedTickBehavior};

use super::dispatcher::DispatchOutcome;
use super::pipeline::TradingPipeline;

/// Runs the pipeline once immediately, then every `interval`, until shutdown.
///
/// Ticks never overlap: the next deadline is only awaited after the current
/// tick finishes, and deadlines missed by a slow tick are skipped.
pub struct Scheduler {
    interval: Duration,
}

impl Scheduler {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// Returns the number of ticks started. A tick that errors or panics is
    /// logged and the loop keeps going; only `shutdown` ends it.
    pub async fn run<F>(&self, pipeline: Arc<TradingPipeline>, shutdown: F) -> u64
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        let mut ticker = interval_at(Instant::now(), self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut tick_count = 0u64;

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("Shutdown requested, scheduler stopping");
                    break;
                }
                _ = ticker.tick() => {}
            }

            tick_count += 1;
            tracing::info!(
                tick = tick_count,
                "🔄 [TICK] Starting at {}",
                Utc::now().format("%Y-%m-%d %H:%M:%S")
            );

            // Own task so a panic surfaces as a JoinError instead of unwinding the loop
            let pipeline = pipeline.clone();
            let mut handle = tokio::spawn(async move { pipeline.run_tick().await });

            tokio::select! {
                joined = &mut handle => report_tick(tick_count, joined),
                _ = &mut shutdown => {
                    handle.abort();
                    tracing::warn!(tick = tick_count, "Shutdown requested mid-tick, abandoning it");
                    break;
                }
            }
        }

        tick_count
    }
}

fn report_tick(tick: u64, joined: Result<anyhow::Result<DispatchOutcome>, JoinError>) {
    match joined {
        Ok(Ok(DispatchOutcome::Placed(confirmation))) => {
            tracing::info!(tick, order_id = %confirmation.id, "✓ Tick complete: order placed");
        }
        Ok(Ok(DispatchOutcome::Skipped)) => {
            tracing::info!(tick, "✓ Tick complete: no order");
        }
        Ok(Ok(DispatchOutcome::Failed(_))) => {
            tracing::warn!(tick, "Tick complete: order submission failed");
        }
        Ok(Err(e)) => {
            tracing::error!(tick, "Error in run execution: {:#}", e);
        }
        Err(e) => {
            tracing::error!(tick, "Tick aborted unexpectedly: {}", e);
        }
    }
}
