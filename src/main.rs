use solbot::api::{CoinGeckoClient, MarketDataProvider};
use solbot::config::{Config, Credentials, Settings};
use solbot::exchange::{BinanceClient, ExchangeClient, PaperExchange};
use solbot::execution::{OrderDispatcher, Scheduler, TradingPipeline};
use solbot::logging;
use solbot::Result;
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            // Configured log location is unknown, fall back to the default file
            let log_guard = logging::setup_logging(&Settings::default());
            exit_with_error(log_guard, e);
        }
    };
    let log_guard = logging::setup_logging(&settings);

    // Fail fast: no client is built until every credential is present
    let credentials = match Credentials::from_env() {
        Ok(credentials) => credentials,
        Err(e) => exit_with_error(log_guard, e),
    };
    let config = Config::new(settings, credentials);

    tracing::info!("🚀 SolBot starting");
    log_configuration(&config);

    let pipeline = match build_pipeline(&config) {
        Ok(pipeline) => Arc::new(pipeline),
        Err(e) => exit_with_error(log_guard, format!("{:#}", e)),
    };
    let scheduler = Scheduler::new(config.settings.interval());

    tracing::info!("Press Ctrl+C to stop...");

    let ticks = scheduler.run(pipeline, shutdown_signal()).await;

    tracing::info!("👋 SolBot stopped after {} ticks", ticks);
    drop(log_guard);
    Ok(())
}

fn build_pipeline(config: &Config) -> anyhow::Result<TradingPipeline> {
    let market_data: Arc<dyn MarketDataProvider> = Arc::new(CoinGeckoClient::new(config)?);
    let exchange: Arc<dyn ExchangeClient> = if config.settings.dry_run {
        tracing::warn!("Dry run enabled: orders are logged, not sent to Binance");
        Arc::new(PaperExchange::new())
    } else {
        Arc::new(BinanceClient::new(config)?)
    };

    let dispatcher = OrderDispatcher::new(exchange, config.settings.order_template());
    Ok(TradingPipeline::new(market_data, dispatcher))
}

fn log_configuration(config: &Config) {
    let s = &config.settings;
    tracing::info!("📊 Configuration:");
    tracing::info!("  Symbol: {} ({:?} {:?})", s.symbol, s.order_side, s.order_type);
    tracing::info!("  Amount: {}", s.amount);
    tracing::info!("  Moving average: {} days of {}/{}", s.history_days, s.coin_id, s.vs_currency);
    tracing::info!("  Interval: {}s", s.interval_secs);
    tracing::info!("  Log file: {}", logging::log_file_path(s).display());
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl+C ({}), running until killed", e);
        std::future::pending::<()>().await;
    }
}

/// Log, flush the file sink, and exit with status 1
fn exit_with_error(log_guard: WorkerGuard, error: impl std::fmt::Display) -> ! {
    tracing::error!("{}", error);
    drop(log_guard);
    std::process::exit(1);
}
