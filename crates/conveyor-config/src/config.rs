//! Top-level Conveyor configuration.

use conveyor_pipeline::{Pipeline, PipelineSettings, StepLogging};
use conveyor_telemetry::LogConfig;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Complete configuration for a Conveyor application.
///
/// `[pipeline]` maps onto [`PipelineSettings`] and `[logging]` onto
/// [`LogConfig`]. Missing tables and keys keep their defaults; unknown keys
/// are rejected.
///
/// # Example
///
/// ```
/// use conveyor_config::ConveyorConfig;
///
/// let config = ConveyorConfig::default();
/// assert_eq!(config.pipeline.name, "pipeline");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConveyorConfig {
    /// Pipeline settings.
    pub pipeline: PipelineSettings,

    /// Log subscriber settings.
    pub logging: LogConfig,
}

impl ConveyorConfig {
    /// Pretty logs at `debug` with each dispatch logged at `debug`.
    #[must_use]
    pub fn development() -> Self {
        Self {
            pipeline: PipelineSettings {
                step_logging: StepLogging::Debug,
                ..PipelineSettings::default()
            },
            logging: LogConfig::development(),
        }
    }

    /// JSON logs at `info` without per-step events.
    #[must_use]
    pub fn production() -> Self {
        Self {
            pipeline: PipelineSettings {
                step_logging: StepLogging::Off,
                ..PipelineSettings::default()
            },
            logging: LogConfig::default(),
        }
    }

    /// Checks the values serde cannot.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for an empty pipeline name or a log
    /// level that is not a valid filter.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pipeline.name.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "pipeline.name",
                reason: "must not be empty".to_string(),
            });
        }

        self.logging.filter().map_err(|err| ConfigError::Invalid {
            field: "logging.level",
            reason: err.to_string(),
        })?;

        Ok(())
    }

    /// An empty pipeline carrying these pipeline settings.
    #[must_use]
    pub fn build_pipeline<C: Send + 'static>(&self) -> Pipeline<C> {
        Pipeline::with_settings(self.pipeline.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conveyor_telemetry::LogFormat;

    #[test]
    fn test_default_config() {
        let config = ConveyorConfig::default();
        assert_eq!(config.pipeline, PipelineSettings::default());
        assert_eq!(config.pipeline.step_logging, StepLogging::Trace);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_validate_empty_pipeline_name() {
        let mut config = ConveyorConfig::default();
        config.pipeline.name = "   ".to_string();

        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "pipeline.name", .. }));
    }

    #[test]
    fn test_validate_rejects_bad_filter() {
        let mut config = ConveyorConfig::default();
        config.logging.level = "conveyor_pipeline=verbose".to_string();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().starts_with("`logging.level`"));
        assert!(err.to_string().contains("conveyor_pipeline=verbose"));
    }

    #[test]
    fn test_validate_accepts_directives() {
        let mut config = ConveyorConfig::default();
        config.logging.level = "warn,conveyor_pipeline=trace".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_presets() {
        let development = ConveyorConfig::development();
        assert_eq!(development.pipeline.step_logging, StepLogging::Debug);
        assert_eq!(development.logging.format, LogFormat::Pretty);
        assert!(development.validate().is_ok());

        let production = ConveyorConfig::production();
        assert_eq!(production.pipeline.step_logging, StepLogging::Off);
        assert_eq!(production.logging.format, LogFormat::Json);
        assert!(production.validate().is_ok());
    }

    #[test]
    fn test_build_pipeline_uses_settings() {
        let mut config = ConveyorConfig::production();
        config.pipeline.name = "orders".to_string();

        let pipeline = config.build_pipeline::<Vec<u8>>();
        assert_eq!(pipeline.settings(), &config.pipeline);
        assert!(pipeline.is_empty());
    }

    #[test]
    fn test_toml_tables() {
        let config: ConveyorConfig = toml::from_str(
            r#"
            [pipeline]
            name = "ingest"
            step_logging = "info"

            [logging]
            format = "compact"
            "#,
        )
        .unwrap();

        assert_eq!(config.pipeline.name, "ingest");
        assert_eq!(config.pipeline.step_logging, StepLogging::Info);
        assert_eq!(config.logging.format, LogFormat::Compact);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(toml::from_str::<ConveyorConfig>("[pipeline]\nretries = 3").is_err());
        assert!(toml::from_str::<ConveyorConfig>("[metrics]\nenabled = true").is_err());
    }
}
