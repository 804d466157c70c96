//! Telemetry error types.

use thiserror::Error;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::util::TryInitError;

/// Errors that can occur while installing the log subscriber.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The level string is not a valid filter.
    #[error("invalid log filter `{directives}`: {source}")]
    InvalidFilter {
        /// The directives as written in the configuration.
        directives: String,
        /// Parser error.
        #[source]
        source: ParseError,
    },

    /// Another global subscriber was installed first.
    #[error("log subscriber already installed: {0}")]
    AlreadyInstalled(#[from] TryInitError),
}
