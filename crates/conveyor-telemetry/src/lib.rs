//! Structured logging for Conveyor.
//!
//! The library crates only emit `tracing` events and never install a
//! subscriber themselves. Applications call [`init_logging`] once at startup,
//! usually with the `[logging]` table of their configuration.
//!
//! # Events
//!
//! | Level          | Target               | Message                             |
//! |----------------|----------------------|-------------------------------------|
//! | configurable   | `conveyor_pipeline`  | `dispatching middleware`            |
//! | `debug`        | `conveyor_pipeline`  | `pipeline completed`                |
//! | `debug`        | `conveyor_pipeline`  | `pipeline short-circuited`          |
//! | `warn`         | `conveyor_pipeline`  | `next() called multiple times`      |
//! | `info`         | `conveyor_mediator`  | `message sent` / `message received` |
//!
//! The level of `dispatching middleware` comes from the pipeline's
//! `step_logging` setting.

#![warn(missing_docs)]

pub mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{init_logging, LogConfig, LogFormat};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
