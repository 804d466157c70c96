//! Pipeline error types.

use thiserror::Error;

/// A boxed error raised from inside a middleware.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Errors that can occur while executing a pipeline.
///
/// Only [`PipelineError::DuplicateAdvance`] is raised by the runner itself.
/// The other variants are produced by middleware and propagate out of
/// [`Pipeline::execute`](crate::Pipeline::execute) unchanged, aborting the
/// remaining chain.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A continuation was invoked more than once for the same position.
    #[error("next() called multiple times by middleware `{middleware}` at position {index}")]
    DuplicateAdvance {
        /// Position of the middleware that invoked its continuation twice.
        index: usize,
        /// Name of that middleware.
        middleware: String,
    },

    /// A middleware failed with an underlying error.
    #[error("middleware `{name}` failed: {source}")]
    Middleware {
        /// Name of the failing middleware.
        name: String,
        /// Underlying error.
        #[source]
        source: BoxError,
    },

    /// A middleware aborted the run with a message.
    #[error("pipeline halted: {reason}")]
    Halted {
        /// Why the run was aborted.
        reason: String,
    },
}

impl PipelineError {
    /// Create a middleware failure wrapping any error type.
    pub fn middleware(name: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Middleware {
            name: name.into(),
            source: source.into(),
        }
    }

    /// Create a halted error.
    pub fn halted(reason: impl Into<String>) -> Self {
        Self::Halted {
            reason: reason.into(),
        }
    }

    /// Returns `true` if this is a duplicate continuation error.
    #[must_use]
    pub fn is_duplicate_advance(&self) -> bool {
        matches!(self, Self::DuplicateAdvance { .. })
    }
}
