//! Configuration loader supporting YAML, TOML and JSON formats.

use super::traits::{Configurable, Validatable};
use crate::error::ConfigError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;

/// Supported configuration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfigFormat {
    /// YAML format (.yaml, .yml)
    #[default]
    Yaml,
    /// TOML format (.toml)
    Toml,
    /// JSON format (.json)
    Json,
}

impl ConfigFormat {
    /// Detects the format from a file extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "yaml" | "yml" => Some(Self::Yaml),
                "toml" => Some(Self::Toml),
                "json" => Some(Self::Json),
                _ => None,
            })
    }
}

/// Configuration loader with format detection, environment overrides and
/// validation.
///
/// ```rust,ignore
/// use vigil_core::config::{ConfigLoader, VigilConfig};
///
/// let config: VigilConfig = ConfigLoader::new()
///     .with_env_prefix("VIGIL")
///     .load_or_default("vigil.toml")?;
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    env_prefix: Option<String>,
    validate: bool,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Creates a loader that validates but applies no environment overrides.
    #[must_use]
    pub fn new() -> Self {
        Self {
            env_prefix: None,
            validate: true,
        }
    }

    /// Sets the environment variable prefix for overrides (e.g. `VIGIL`).
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Sets whether to validate the configuration after loading.
    #[must_use]
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    /// Returns the environment variable prefix, if set.
    #[must_use]
    pub fn env_prefix(&self) -> Option<&str> {
        self.env_prefix.as_deref()
    }

    /// Parses a configuration file; the format comes from the extension.
    pub fn load_file<T, P>(&self, path: P) -> Result<T, ConfigError>
    where
        T: DeserializeOwned,
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path).ok_or_else(|| ConfigError::InvalidFormat {
            path: path.display().to_string(),
            reason: "Unrecognized file extension. Supported: .yaml, .yml, .toml, .json".to_string(),
        })?;

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileReadError {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        self.load_str(&content, format).map_err(|e| match e {
            ConfigError::InvalidFormat { reason, .. } => ConfigError::InvalidFormat {
                path: path.display().to_string(),
                reason,
            },
            other => other,
        })
    }

    /// Parses configuration content in the given format.
    pub fn load_str<T>(&self, content: &str, format: ConfigFormat) -> Result<T, ConfigError>
    where
        T: DeserializeOwned,
    {
        let parsed = match format {
            ConfigFormat::Yaml => serde_yaml::from_str(content).map_err(|e| format!("YAML parse error: {e}")),
            ConfigFormat::Toml => toml::from_str(content).map_err(|e| format!("TOML parse error: {e}")),
            ConfigFormat::Json => serde_json::from_str(content).map_err(|e| format!("JSON parse error: {e}")),
        };

        parsed.map_err(|reason| ConfigError::InvalidFormat {
            path: "<string>".to_string(),
            reason,
        })
    }

    /// Serializes a configuration in the given format.
    pub fn serialize<T: Serialize>(config: &T, format: ConfigFormat) -> Result<String, ConfigError> {
        let rendered = match format {
            ConfigFormat::Yaml => serde_yaml::to_string(config).map_err(|e| e.to_string()),
            ConfigFormat::Toml => toml::to_string_pretty(config).map_err(|e| e.to_string()),
            ConfigFormat::Json => serde_json::to_string_pretty(config).map_err(|e| e.to_string()),
        };

        rendered.map_err(|reason| ConfigError::InvalidFormat {
            path: "<serialize>".to_string(),
            reason,
        })
    }

    /// Loads `path` if it exists, otherwise starts from `T::default()`.
    ///
    /// Environment overrides are applied afterwards when a prefix is set,
    /// then the result is validated unless validation was disabled.
    pub fn load_or_default<T, P>(&self, path: P) -> Result<T, ConfigError>
    where
        T: DeserializeOwned + Default + Configurable + Validatable,
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let mut config: T = if path.exists() {
            self.load_file(path)?
        } else {
            T::default()
        };

        if let Some(prefix) = &self.env_prefix {
            config.apply_env_overrides(prefix);
        }

        if self.validate {
            config.validate()?;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Deserialize)]
    struct TestConfig {
        host: String,
        port: u16,
        #[serde(default)]
        debug: bool,
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(
            ConfigFormat::from_path(Path::new("vigil.yaml")),
            Some(ConfigFormat::Yaml)
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("vigil.YML")),
            Some(ConfigFormat::Yaml)
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("vigil.toml")),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("vigil.json")),
            Some(ConfigFormat::Json)
        );
        assert_eq!(ConfigFormat::from_path(Path::new("vigil.txt")), None);
    }

    #[test]
    fn test_load_yaml() {
        let yaml = "host: localhost\nport: 8000\ndebug: true\n";
        let config: TestConfig = ConfigLoader::new()
            .load_str(yaml, ConfigFormat::Yaml)
            .unwrap();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 8000);
        assert!(config.debug);
    }

    #[test]
    fn test_load_toml() {
        let toml = "host = \"localhost\"\nport = 8000\n";
        let config: TestConfig = ConfigLoader::new()
            .load_str(toml, ConfigFormat::Toml)
            .unwrap();
        assert_eq!(config.port, 8000);
        assert!(!config.debug);
    }

    #[test]
    fn test_load_invalid_json() {
        let result: Result<TestConfig, _> =
            ConfigLoader::new().load_str("{not json", ConfigFormat::Json);
        assert!(matches!(result, Err(ConfigError::InvalidFormat { .. })));
    }

    #[test]
    fn test_load_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.yaml");
        std::fs::write(&path, "host: [unclosed").unwrap();

        let result: Result<TestConfig, _> = ConfigLoader::new().load_file(&path);
        match result {
            Err(ConfigError::InvalidFormat { path: reported, .. }) => {
                assert!(reported.ends_with("broken.yaml"));
            }
            other => panic!("expected InvalidFormat, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_extension() {
        let result: Result<TestConfig, _> = ConfigLoader::new().load_file("vigil.ini");
        assert!(matches!(result, Err(ConfigError::InvalidFormat { .. })));
    }
}
