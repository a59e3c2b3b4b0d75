use crate::error::ConfigError;
use crate::settings::LoggingConfig;
use std::path::Path;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

/// Events emitted under this target form the trade journal.
pub const TRADE_LOG_TARGET: &str = "trades";

/// Installs the global subscriber: a console layer filtered by `RUST_LOG` (falling back to
/// the configured level) and a file layer that only receives trade-journal events.
///
/// The returned guard flushes the journal when dropped; hold it for the life of the process.
pub fn init_tracing(config: &LoggingConfig) -> Result<WorkerGuard, ConfigError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_str()));

    let path = Path::new(&config.trade_log_path);
    let file_name = path.file_name().ok_or_else(|| {
        ConfigError::Logging(format!("'{}' is not a file path", config.trade_log_path))
    })?;
    let directory = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(directory, file_name));

    let journal = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .with_filter(Targets::new().with_target(TRADE_LOG_TARGET, Level::INFO));

    tracing_subscriber::registry()
        .with(fmt::layer().with_filter(env_filter))
        .with(journal)
        .try_init()
        .map_err(|e| ConfigError::Logging(e.to_string()))?;

    Ok(guard)
}
