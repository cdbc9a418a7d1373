//! Structured logging system for Vigil.
//!
//! Provides configurable logging with support for:
//! - JSON, pretty and compact formats
//! - Multiple output targets (stdout, file)
//! - Log rotation
//! - `RUST_LOG` overriding the configured level
//! - Masking of credentials in every output

mod config;
mod writer;

pub use config::{LogConfig, LogFormat, LogOutput, RotationConfig};
pub use writer::{MaskingMakeWriter, MaskingWriter};

use crate::masking::SensitiveDataMasker;
use std::sync::Arc;
pub use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt, fmt::MakeWriter, layer::SubscriberExt,
    util::SubscriberInitExt,
};

const LOG_FILE_NAME: &str = "vigil.log";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Initialize the logging system with the given configuration.
///
/// Returns guards that must be kept alive for the duration of the program
/// to ensure all file logs are flushed.
///
/// ```no_run
/// use vigil_telemetry::logging::{init_logging, LogConfig};
///
/// let config = LogConfig::default();
/// let _guards = init_logging(&config).expect("Failed to initialize logging");
/// ```
pub fn init_logging(config: &LogConfig) -> Result<Vec<WorkerGuard>, LoggingError> {
    let mut guards = Vec::new();
    let masker = Arc::new(SensitiveDataMasker::new());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| LoggingError::InvalidConfig(format!("level '{}': {e}", config.level)))?;

    let mut layers: Vec<BoxedLayer> = Vec::new();

    for output in &config.outputs {
        match output {
            LogOutput::Stdout => {
                let writer = MaskingMakeWriter::new(std::io::stdout, Arc::clone(&masker));
                layers.push(create_layer(config, config.format, writer, true));
            }
            LogOutput::File { path, rotation } => {
                std::fs::create_dir_all(path)?;
                let appender = match rotation.unwrap_or_default() {
                    RotationConfig::Hourly => tracing_appender::rolling::hourly(path, LOG_FILE_NAME),
                    RotationConfig::Daily => tracing_appender::rolling::daily(path, LOG_FILE_NAME),
                    RotationConfig::Never => tracing_appender::rolling::never(path, LOG_FILE_NAME),
                };
                let (non_blocking, guard) = tracing_appender::non_blocking(appender);
                let writer = MaskingMakeWriter::new(non_blocking, Arc::clone(&masker));
                layers.push(create_layer(config, LogFormat::Json, writer, false));
                guards.push(guard);
            }
        }
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .try_init()
        .map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))?;

    Ok(guards)
}

fn create_layer<W>(config: &LogConfig, format: LogFormat, writer: W, ansi: bool) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(true)
        .with_thread_ids(config.include_thread_id)
        .with_file(config.include_file_info)
        .with_line_number(config.include_file_info);

    match format {
        LogFormat::Json => layer.json().flatten_event(true).boxed(),
        LogFormat::Pretty => layer.pretty().boxed(),
        LogFormat::Compact => layer.compact().boxed(),
    }
}

/// Errors that can occur during logging initialization.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// Failed to create log directory
    #[error("Failed to create log directory: {0}")]
    DirectoryCreation(#[from] std::io::Error),

    /// Invalid configuration
    #[error("Invalid logging configuration: {0}")]
    InvalidConfig(String),

    /// A global subscriber is already installed
    #[error("Logging already initialized: {0}")]
    AlreadyInitialized(String),
}
