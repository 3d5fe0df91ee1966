//! Structured logging and tracing for Spotova
//!
//! Console and daily-rotated file layers on top of `tracing-subscriber`, plus a
//! small component-scoped logger used by the coordinator and the web server.

use crate::config::LoggingConfig;
use crate::error::{Result, SpotovaError};
use once_cell::sync::OnceCell;
use std::path::Path;
use std::sync::Once;
use tracing::{Level, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

mod level;
mod structured;

pub use level::{level_rank, min_level, parse_log_level};
pub use structured::{LogContext, StructuredLogger, get_logger, get_logger_with_context};

// Keeps the non-blocking file writer flushing for the life of the process
static LOG_GUARD: OnceCell<WorkerGuard> = OnceCell::new();
static INIT_ONCE: Once = Once::new();
static INIT_ERROR: OnceCell<String> = OnceCell::new();

/// Environment variable forcing console-only logging
pub const DISABLE_FILE_LOG_ENV: &str = "SPOTOVA_DISABLE_FILE_LOG";

/// Initialize logging system based on configuration
///
/// Safe to call more than once; only the first call installs a subscriber and
/// its outcome is returned to every later caller.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    INIT_ONCE.call_once(|| {
        let init_result = (|| -> Result<()> {
            let base_level = parse_log_level(&config.level)?;
            let console_level = config
                .console_level
                .as_deref()
                .and_then(|s| parse_log_level(s).ok())
                .unwrap_or(base_level);
            let file_level = config
                .file_level
                .as_deref()
                .and_then(|s| parse_log_level(s).ok())
                .unwrap_or(base_level);

            let filter = build_env_filter(min_level(console_level, file_level));

            if should_use_console_only(config) {
                init_console_only_logging(filter, config.json_format, console_level);
                return Ok(());
            }

            init_file_logging(config, filter, console_level, file_level)
        })();

        if let Err(e) = init_result {
            let _ = INIT_ERROR.set(e.to_string());
        }
    });

    if let Some(err) = INIT_ERROR.get() {
        return Err(SpotovaError::config(err.clone()));
    }
    Ok(())
}

fn build_env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("spotova={},tower_http=info", level).into())
}

fn should_use_console_only(config: &LoggingConfig) -> bool {
    cfg!(test) || config.file.trim().is_empty() || std::env::var_os(DISABLE_FILE_LOG_ENV).is_some()
}

fn console_layer<S>(json_format: bool, level: Level) -> Box<dyn Layer<S> + Send + Sync>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a> + 'static,
{
    let base = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false);
    if json_format {
        base.json()
            .with_filter(LevelFilter::from_level(level))
            .boxed()
    } else {
        base.with_filter(LevelFilter::from_level(level)).boxed()
    }
}

fn init_console_only_logging(filter: EnvFilter, json_format: bool, console_level: Level) {
    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer(json_format, console_level))
        .init();

    info!(
        "Logging initialized - console_level: {:?}, console-only",
        console_level
    );
}

fn init_file_logging(
    config: &LoggingConfig,
    filter: EnvFilter,
    console_level: Level,
    file_level: Level,
) -> Result<()> {
    // A path with an extension names the file; otherwise it is the directory
    let path = Path::new(&config.file);
    let (dir, prefix) = if path.extension().is_some() {
        (
            path.parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new(".")),
            path.file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("spotova"),
        )
    } else {
        (path, "spotova")
    };

    let file_appender = rolling::Builder::new()
        .rotation(rolling::Rotation::DAILY)
        .filename_prefix(prefix)
        .filename_suffix("log")
        .max_log_files(config.backup_count.max(1) as usize)
        .build(dir)
        .map_err(|e| SpotovaError::io(format!("Failed to create log file appender: {}", e)))?;

    let (non_blocking_appender, guard) = non_blocking(file_appender);
    let _ = LOG_GUARD.set(guard);

    let file_layer = {
        let base = fmt::layer()
            .with_writer(non_blocking_appender)
            .with_ansi(false)
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false);
        if config.json_format {
            base.json()
                .with_filter(LevelFilter::from_level(file_level))
                .boxed()
        } else {
            base.with_filter(LevelFilter::from_level(file_level))
                .boxed()
        }
    };

    let subscriber = tracing_subscriber::registry().with(filter).with(file_layer);

    if config.console_output {
        subscriber
            .with(console_layer(config.json_format, console_level))
            .init();
    } else {
        subscriber.init();
    }

    info!(
        "Logging initialized - console_level: {:?}, file_level: {:?}, file: {}",
        console_level, file_level, config.file
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        let config = LoggingConfig::default();
        assert!(init_logging(&config).is_ok());
        assert!(init_logging(&config).is_ok());
    }

    #[test]
    fn test_structured_logger_does_not_panic() {
        let _ = init_logging(&LoggingConfig::default());
        let logger = get_logger("test_component");
        logger.info("Test info message");
        logger.debug("Test debug message");
        logger.warn("Test warning message");
        logger.error("Test error message");
    }
}
