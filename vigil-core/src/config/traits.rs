//! Configuration traits.

use crate::error::ConfigError;

/// Trait for configuration types that can be validated after loading.
///
/// ```rust
/// use vigil_core::config::Validatable;
/// use vigil_core::error::ConfigError;
///
/// struct Endpoint {
///     url: String,
/// }
///
/// impl Validatable for Endpoint {
///     fn validate(&self) -> Result<(), ConfigError> {
///         if self.url.is_empty() {
///             return Err(ConfigError::missing_field("url"));
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Validatable {
    /// Returns `Ok(())` if the configuration is valid.
    fn validate(&self) -> Result<(), ConfigError>;
}

/// Trait for configuration types that accept environment variable overrides.
pub trait Configurable {
    /// Applies overrides from variables named `{prefix}_*`.
    fn apply_env_overrides(&mut self, prefix: &str);
}
