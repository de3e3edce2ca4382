use crate::error::ConfigError;
use crate::settings::LoggingConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs the global tracing subscriber, logging to stderr.
///
/// `RUST_LOG` wins over `logging.level`. When `logging.directory` is set, a second layer writes
/// to a daily rolling `pulse.log`; the returned guard must be kept alive for the file writer to
/// flush.
pub fn init_tracing(logging: &LoggingConfig) -> Result<Option<WorkerGuard>, ConfigError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .map_err(|e| ConfigError::Logging(e.to_string()))?;

    let console_layer = fmt::layer().with_target(true).with_writer(std::io::stderr);

    match &logging.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, "pulse.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(console_layer)
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .try_init()
                .map_err(|e| ConfigError::Logging(e.to_string()))?;
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(console_layer)
                .try_init()
                .map_err(|e| ConfigError::Logging(e.to_string()))?;
            Ok(None)
        }
    }
}
