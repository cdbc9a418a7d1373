//! Configuration validation utilities.

use crate::error::ConfigError;

/// Result type for validation operations.
pub type ValidationResult = Result<(), ConfigError>;

/// Tracks the current path in the configuration tree for error messages.
#[derive(Debug, Clone, Default)]
pub struct ValidationContext {
    path: Vec<String>,
    errors: Vec<ConfigError>,
}

impl ValidationContext {
    /// Creates a new validation context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enters a section.
    pub fn enter(&mut self, section: impl Into<String>) {
        self.path.push(section.into());
    }

    /// Exits the current section.
    pub fn exit(&mut self) {
        self.path.pop();
    }

    /// Returns the current path as a dot-separated string.
    #[must_use]
    pub fn current_path(&self) -> String {
        self.path.join(".")
    }

    /// Adds a validation error.
    pub fn add_error(&mut self, error: ConfigError) {
        self.errors.push(error);
    }

    /// Returns true if no errors were collected.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the collected errors.
    #[must_use]
    pub fn errors(&self) -> &[ConfigError] {
        &self.errors
    }

    /// Consumes the context and returns the first error, if any.
    pub fn into_result(self) -> ValidationResult {
        self.errors.into_iter().next().map_or(Ok(()), Err)
    }

    /// Creates a missing field error for the current section.
    #[must_use]
    pub fn missing_field(&self, field: impl Into<String>) -> ConfigError {
        let section = if self.path.is_empty() {
            None
        } else {
            Some(self.current_path())
        };
        ConfigError::MissingField {
            field: field.into(),
            section,
        }
    }

    /// Creates an invalid value error qualified with the current path.
    #[must_use]
    pub fn invalid_value(&self, field: impl Into<String>, reason: impl Into<String>) -> ConfigError {
        let field = field.into();
        let field = if self.path.is_empty() {
            field
        } else {
            format!("{}.{}", self.current_path(), field)
        };
        ConfigError::InvalidValue {
            field,
            reason: reason.into(),
        }
    }
}

/// Fluent field validator writing into a [`ValidationContext`].
#[derive(Debug)]
pub struct Validator<'a> {
    ctx: &'a mut ValidationContext,
}

impl<'a> Validator<'a> {
    /// Creates a validator over the given context.
    pub fn new(ctx: &'a mut ValidationContext) -> Self {
        Self { ctx }
    }

    /// Validates that a string field is not empty.
    pub fn require_non_empty(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.ctx.add_error(self.ctx.missing_field(field));
        }
        self
    }

    /// Validates that a numeric value is strictly positive.
    pub fn positive(&mut self, field: &str, value: u64) -> &mut Self {
        if value == 0 {
            self.ctx
                .add_error(self.ctx.invalid_value(field, "must be greater than 0"));
        }
        self
    }

    /// Validates that `value` parses as an absolute URL with one of `schemes`.
    ///
    /// Empty values are skipped; combine with [`Self::require_non_empty`].
    pub fn url_with_scheme(&mut self, field: &str, value: &str, schemes: &[&str]) -> &mut Self {
        if value.trim().is_empty() {
            return self;
        }
        match url::Url::parse(value) {
            Ok(parsed) if schemes.contains(&parsed.scheme()) => {}
            Ok(parsed) => {
                let reason = format!(
                    "scheme '{}' not allowed, expected one of: {}",
                    parsed.scheme(),
                    schemes.join(", ")
                );
                self.ctx.add_error(self.ctx.invalid_value(field, reason));
            }
            Err(e) => {
                self.ctx
                    .add_error(self.ctx.invalid_value(field, format!("invalid URL: {e}")));
            }
        }
        self
    }
}

/// Helpers for applying environment variable overrides.
///
/// ```
/// use vigil_core::config::validation::EnvOverride;
///
/// let mut value = "default".to_string();
/// EnvOverride::apply_string("VIGIL_DOC_UNSET_VARIABLE", &mut value);
/// assert_eq!(value, "default");
/// ```
pub struct EnvOverride;

impl EnvOverride {
    /// Overrides a string value.
    pub fn apply_string(var_name: &str, target: &mut String) {
        if let Ok(value) = std::env::var(var_name) {
            *target = value;
        }
    }

    /// Overrides an optional string value.
    pub fn apply_optional_string(var_name: &str, target: &mut Option<String>) {
        if let Ok(value) = std::env::var(var_name) {
            *target = Some(value);
        }
    }

    /// Overrides a numeric value; unparsable values are ignored.
    pub fn apply_number<T: std::str::FromStr>(var_name: &str, target: &mut T) {
        if let Ok(value) = std::env::var(var_name)
            && let Ok(parsed) = value.parse()
        {
            *target = parsed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_paths() {
        let mut ctx = ValidationContext::new();
        ctx.enter("relay");
        let error = ctx.invalid_value("url", "bad");
        assert_eq!(
            error,
            ConfigError::InvalidValue {
                field: "relay.url".to_string(),
                reason: "bad".to_string(),
            }
        );
        ctx.exit();
        assert_eq!(ctx.current_path(), "");
    }

    #[test]
    fn test_url_scheme_validation() {
        let mut ctx = ValidationContext::new();
        Validator::new(&mut ctx)
            .url_with_scheme("ok", "wss://relay.example.com/ws", &["ws", "wss"])
            .url_with_scheme("wrong", "https://relay.example.com", &["ws", "wss"])
            .url_with_scheme("broken", "not a url", &["ws", "wss"]);
        assert_eq!(ctx.errors().len(), 2);
    }

    #[test]
    fn test_positive() {
        let mut ctx = ValidationContext::new();
        Validator::new(&mut ctx).positive("timeout_ms", 0);
        assert!(!ctx.is_valid());
    }

    #[test]
    fn test_env_override_missing_var_keeps_value() {
        let mut value = 10u64;
        EnvOverride::apply_number("VIGIL_TEST_NONEXISTENT_VAR_12345", &mut value);
        assert_eq!(value, 10);
    }
}
