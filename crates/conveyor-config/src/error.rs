//! Configuration error types.

use std::fmt::Display;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building a [`ConveyorConfig`](crate::ConveyorConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A configuration file could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Read {
        /// File that was requested.
        path: PathBuf,
        /// I/O failure, `NotFound` for a missing file.
        #[source]
        source: io::Error,
    },

    /// Neither TOML nor JSON.
    #[error("unsupported configuration format `{0}`, expected `toml` or `json`")]
    UnsupportedFormat(String),

    /// A layer is malformed or names a key that does not exist.
    #[error("invalid configuration in {origin}: {message}")]
    Parse {
        /// Where the layer came from, a path or `"toml string"`.
        origin: String,
        /// Parser or schema message.
        message: String,
    },

    /// An environment override could not be applied.
    #[error("{var}={value:?} rejected: {reason}")]
    Env {
        /// Variable name.
        var: String,
        /// Raw value.
        value: String,
        /// What was expected.
        reason: String,
    },

    /// A `.env` file exists but is malformed.
    #[error("cannot load .env file: {0}")]
    Dotenv(#[from] dotenvy::Error),

    /// The merged configuration failed validation.
    #[error("`{field}` {reason}")]
    Invalid {
        /// Dotted path of the offending setting.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn parse(origin: impl Into<String>, err: impl Display) -> Self {
        Self::Parse {
            origin: origin.into(),
            message: err.to_string(),
        }
    }

    pub(crate) fn env(var: &str, value: &str, reason: impl Into<String>) -> Self {
        Self::Env {
            var: var.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}
