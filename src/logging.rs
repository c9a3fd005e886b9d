use crate::config::Settings;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Console + append-only file logging.
///
/// The returned guard flushes the file writer when dropped, so `main`
/// must hold it for the lifetime of the process.
pub fn setup_logging(settings: &Settings) -> WorkerGuard {
    let file_appender = tracing_appender::rolling::never(&settings.log_dir, &settings.log_file);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(env_filter(&settings.log_level))
        .with(fmt::layer().with_target(false))
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(file_writer),
        )
        .init();

    guard
}

/// `RUST_LOG` wins when set, otherwise the configured level
fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

pub fn log_file_path(settings: &Settings) -> PathBuf {
    PathBuf::from(&settings.log_dir).join(&settings.log_file)
}
