//! Configuration management module.
//!
//! - YAML, TOML and JSON configuration files
//! - Validation with descriptive error messages
//! - Environment variable overrides (`VIGIL_*`)
//!
//! ```rust,ignore
//! use vigil_core::config::{ConfigLoader, VigilConfig};
//!
//! let config: VigilConfig = ConfigLoader::new()
//!     .with_env_prefix("VIGIL")
//!     .load_or_default("vigil.yaml")?;
//! ```

mod loader;
mod traits;
pub mod validation;
mod vigil_config;

pub use loader::{ConfigFormat, ConfigLoader};
pub use traits::{Configurable, Validatable};
pub use validation::{EnvOverride, ValidationContext, Validator};
pub use vigil_config::{ApiConfig, LoggingConfig, OAuthConfig, RelayConfig, VigilConfig};
