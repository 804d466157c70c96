//! Layered configuration loader.
//!
//! Every layer is parsed into a JSON tree and merged key by key over the
//! configuration built so far, so a file only names what it changes.
//! Environment overrides are applied last, when the configuration is loaded.

use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde_json::Value;

use crate::{ConfigError, ConveyorConfig};

/// Configuration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// TOML.
    Toml,
    /// JSON.
    Json,
}

impl Format {
    /// Picks the format from a file extension.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnsupportedFormat`] for any other extension.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        path.extension()
            .and_then(|extension| extension.to_str())
            .unwrap_or_default()
            .parse()
    }

    fn read_tree(self, text: &str, origin: &str) -> Result<Value, ConfigError> {
        match self {
            Self::Toml => toml::from_str(text).map_err(|err| ConfigError::parse(origin, err)),
            Self::Json => {
                serde_json::from_str(text).map_err(|err| ConfigError::parse(origin, err))
            }
        }
    }
}

impl FromStr for Format {
    type Err = ConfigError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.to_ascii_lowercase().as_str() {
            "toml" => Ok(Self::Toml),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::UnsupportedFormat(name.to_string())),
        }
    }
}

/// Builds a [`ConveyorConfig`] from layered sources.
///
/// # Example
///
/// ```no_run
/// use conveyor_config::ConfigLoader;
///
/// # fn main() -> Result<(), conveyor_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_defaults()
///     .with_optional_file("conveyor.toml")?
///     .with_env_prefix("CONVEYOR")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ConfigLoader {
    config: ConveyorConfig,
    env_prefix: Option<String>,
}

impl ConfigLoader {
    /// Starts from [`ConveyorConfig::default`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Discards every layer applied so far.
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        self.config = ConveyorConfig::default();
        self
    }

    /// Replaces the current configuration with the development preset.
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = ConveyorConfig::development();
        self
    }

    /// Replaces the current configuration with the production preset.
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = ConveyorConfig::production();
        self
    }

    /// Merges a `.toml` or `.json` file over the current configuration.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::UnsupportedFormat`] for other extensions.
    /// - [`ConfigError::Read`] if the file is missing or unreadable.
    /// - [`ConfigError::Parse`] for malformed content or unknown keys.
    pub fn with_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let format = Format::from_path(path)?;
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let origin = path.display().to_string();
        let layer = format.read_tree(&text, &origin)?;
        self.merge(layer, &origin)
    }

    /// Like [`with_file`](Self::with_file), but a missing file is skipped.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be used.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Merges configuration text in the named format (`"toml"` or `"json"`).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for an unknown format, malformed text or
    /// unknown keys.
    ///
    /// # Example
    ///
    /// ```
    /// use conveyor_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_development()
    ///     .with_string(r#"{"logging": {"level": "trace"}}"#, "json")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.logging.level, "trace");
    /// assert!(config.logging.include_location);
    /// ```
    pub fn with_string(self, text: &str, format: &str) -> Result<Self, ConfigError> {
        let format: Format = format.parse()?;
        let origin = match format {
            Format::Toml => "toml string",
            Format::Json => "json string",
        };
        let layer = format.read_tree(text, origin)?;
        self.merge(layer, origin)
    }

    /// Enables overrides from variables named `PREFIX__TABLE__KEY`, for
    /// example `CONVEYOR__PIPELINE__STEP_LOGGING=debug`.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Loads a `.env` file into the process environment, if there is one.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Dotenv`] if the file exists but is malformed.
    pub fn with_dotenv(self) -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(_) => Ok(self),
            Err(err) if err.not_found() => Ok(self),
            Err(err) => Err(err.into()),
        }
    }

    /// Applies environment overrides, validates and returns the result.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an override is rejected or validation fails.
    pub fn load(mut self) -> Result<ConveyorConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            self.apply_env(&prefix, env::vars())?;
        }

        self.config.validate()?;
        Ok(self.config)
    }

    /// Returns the merged layers without environment overrides or validation.
    #[must_use]
    pub fn load_unvalidated(self) -> ConveyorConfig {
        self.config
    }

    fn tree(&self) -> Result<Value, ConfigError> {
        serde_json::to_value(&self.config).map_err(|err| ConfigError::parse("defaults", err))
    }

    fn merge(mut self, layer: Value, origin: &str) -> Result<Self, ConfigError> {
        let mut tree = self.tree()?;
        merge_values(&mut tree, layer);
        self.config =
            serde_json::from_value(tree).map_err(|err| ConfigError::parse(origin, err))?;
        Ok(self)
    }

    /// Applies `PREFIX__A__B=value` pairs in name order. Each value is read
    /// as the type the setting already has; names that match no setting are
    /// ignored.
    fn apply_env<I>(&mut self, prefix: &str, vars: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut overrides: Vec<(String, String, String)> = vars
            .into_iter()
            .filter_map(|(var, value)| {
                let path = var
                    .strip_prefix(prefix)?
                    .strip_prefix("__")?
                    .to_ascii_lowercase();
                Some((var, path, value))
            })
            .collect();
        overrides.sort();

        for (var, path, value) in overrides {
            let mut tree = self.tree()?;
            let Some(slot) = path
                .split("__")
                .try_fold(&mut tree, |node, key| node.get_mut(key))
            else {
                continue;
            };

            let coerced =
                coerce(slot, &value).map_err(|reason| ConfigError::env(&var, &value, reason))?;
            *slot = coerced;
            self.config = serde_json::from_value(tree)
                .map_err(|err| ConfigError::env(&var, &value, err.to_string()))?;
        }

        Ok(())
    }
}

fn merge_values(base: &mut Value, layer: Value) {
    match (base, layer) {
        (Value::Object(base), Value::Object(layer)) => {
            for (key, value) in layer {
                match base.get_mut(&key) {
                    Some(slot) => merge_values(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (slot, layer) => *slot = layer,
    }
}

fn coerce(current: &Value, raw: &str) -> Result<Value, &'static str> {
    match current {
        Value::Bool(_) => parse_bool(raw).map(Value::Bool).ok_or("expected a boolean"),
        Value::Number(_) => raw
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| "expected an integer"),
        Value::String(_) | Value::Null => Ok(Value::String(raw.to_string())),
        Value::Array(_) | Value::Object(_) => Err("names a table, not a setting"),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
