//! # Structured Logging
//!
//! The wrapper crates only emit `tracing` events. A host installs one
//! subscriber for the process with [`init_logging`]; tests use
//! [`init_test_logging`], which routes output through the libtest capture.
//!
//! Filtering follows `RUST_LOG` when it is set, then the host's directive,
//! then [`DEFAULT_LOG_FILTER`].

use thiserror::Error;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::DEFAULT_LOG_FILTER;

/// Environment variable read by [`LogFormat::from_env`].
pub const LOG_FORMAT_ENV: &str = "WRAPPER_LOG_FORMAT";

/// Where and how wrapper events are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines on stderr with file and line.
    Pretty,
    /// One JSON object per event on stderr.
    Json,
    /// Compact lines written through the libtest capture.
    Test,
}

impl LogFormat {
    /// `"json"` and `"test"` in any case; anything else is `Pretty`.
    pub fn from_str_lossy(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => LogFormat::Json,
            "test" => LogFormat::Test,
            _ => LogFormat::Pretty,
        }
    }

    /// Format named by [`LOG_FORMAT_ENV`], `Pretty` when unset.
    pub fn from_env() -> Self {
        std::env::var(LOG_FORMAT_ENV)
            .map(|s| Self::from_str_lossy(&s))
            .unwrap_or(LogFormat::Pretty)
    }
}

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log filter: {0}")]
    InvalidFilter(#[from] ParseError),

    #[error("a global subscriber is already installed: {0}")]
    AlreadyInstalled(#[from] TryInitError),
}

/// Builds the event filter: `RUST_LOG`, else `directives`, else the crate
/// default.
fn build_filter(directives: Option<&str>) -> Result<EnvFilter, LoggingError> {
    let from_env = std::env::var(EnvFilter::DEFAULT_ENV)
        .ok()
        .filter(|s| !s.trim().is_empty());
    let directives = from_env
        .as_deref()
        .or(directives)
        .unwrap_or(DEFAULT_LOG_FILTER);
    Ok(EnvFilter::try_new(directives)?)
}

/// Installs the process-wide subscriber.
///
/// # Errors
///
/// [`LoggingError::InvalidFilter`] if the chosen directives do not parse,
/// [`LoggingError::AlreadyInstalled`] if a subscriber is already set. The
/// existing subscriber stays in place either way.
pub fn init_logging(directives: Option<&str>, format: LogFormat) -> Result<(), LoggingError> {
    let filter = build_filter(directives)?;
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .try_init()?,
        LogFormat::Json => registry
            .with(fmt::layer().json().with_target(true))
            .try_init()?,
        LogFormat::Test => registry
            .with(fmt::layer().with_test_writer().with_target(true))
            .try_init()?,
    }

    tracing::debug!(?format, "logging installed");
    Ok(())
}

/// Installs the test subscriber once per test binary; later calls are no-ops.
pub fn init_test_logging() {
    let _ = init_logging(None, LogFormat::Test);
}
