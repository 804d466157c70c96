//! Configuration for Conveyor.
//!
//! Typed settings for pipelines and logging, loaded in layers from presets,
//! TOML or JSON files, and environment variables.
//!
//! # Example
//!
//! ```
//! use conveyor_config::ConfigLoader;
//! use conveyor_pipeline::StepLogging;
//!
//! let config = ConfigLoader::new()
//!     .with_production()
//!     .with_string(
//!         r#"
//!         [pipeline]
//!         name = "orders"
//!
//!         [logging]
//!         level = "warn"
//!         "#,
//!         "toml",
//!     )
//!     .unwrap()
//!     .load()
//!     .unwrap();
//!
//! assert_eq!(config.pipeline.name, "orders");
//! // Keys the string did not mention keep the preset's values.
//! assert_eq!(config.pipeline.step_logging, StepLogging::Off);
//! ```

#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;

pub use config::ConveyorConfig;
pub use error::ConfigError;
pub use loader::{ConfigLoader, Format};
