//! Configuration module for the model proxy
//!
//! Configuration comes either from a YAML file with `${VAR}` interpolation or
//! straight from the process environment. Both paths end in the same
//! validation.

mod env;
mod error;
mod schema;
mod secrets;
mod validator;

pub use env::{config_from_env, config_from_lookup, interpolate_env_vars, interpolate_with};
pub use error::{ConfigError, ConfigResult, ValidationError, ValidationErrorKind};
pub use schema::{ConnectionConfig, ModelConfig, ProxyConfig, ServerConfig, StreamingConfig};
pub use secrets::SecretString;
pub use validator::ConfigValidator;

use std::fs;
use std::path::Path;

/// Load a configuration from a YAML file
pub fn load_from_yaml<P: AsRef<Path>>(path: P) -> ConfigResult<ProxyConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;

    // Interpolate environment variables before parsing
    let interpolated = env::interpolate_env_vars(&content)?;

    let config: ProxyConfig =
        serde_yaml::from_str(&interpolated).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            line: e.location().map(|l| l.line()),
            column: e.location().map(|l| l.column()),
            message: e.to_string(),
        })?;

    ConfigValidator::new().validate(&config)?;
    Ok(config)
}

/// Load a configuration from the process environment
pub fn load_from_env() -> ConfigResult<ProxyConfig> {
    let config = env::config_from_env()?;
    ConfigValidator::new().validate(&config)?;
    Ok(config)
}
