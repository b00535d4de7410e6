//! Configuration validation utilities

use super::error::ValidationError;
use super::schema::ProxyConfig;
use std::net::IpAddr;

/// Configuration validator with the proxy's consistency rules.
///
/// Backend locator syntax is checked by the adapter selector, not here.
#[derive(Debug, Default)]
pub struct ConfigValidator;

impl ConfigValidator {
    /// Create a new validator
    pub fn new() -> Self {
        Self
    }

    /// Validate a configuration
    pub fn validate(&self, config: &ProxyConfig) -> Result<(), ValidationError> {
        self.validate_server(config)?;
        self.validate_connection(config)?;
        self.validate_streaming(config)?;

        if config.model.max_new_tokens == 0 {
            return Err(ValidationError::out_of_range(
                "model.max_new_tokens",
                "must be greater than zero",
            ));
        }
        if config.model.openai_model.trim().is_empty() {
            return Err(ValidationError::malformed(
                "model.openai_model",
                "must not be empty",
            ));
        }
        Ok(())
    }

    fn validate_server(&self, config: &ProxyConfig) -> Result<(), ValidationError> {
        if config.server.bind_address.parse::<IpAddr>().is_err() {
            return Err(ValidationError::malformed(
                "server.bind_address",
                format!("'{}' is not an IP address", config.server.bind_address),
            ));
        }
        if config.server.port == 0 {
            return Err(ValidationError::out_of_range(
                "server.port",
                "must be between 1 and 65535",
            ));
        }
        Ok(())
    }

    fn validate_connection(&self, config: &ProxyConfig) -> Result<(), ValidationError> {
        if config.connection.connect_timeout_secs == 0 {
            return Err(ValidationError::out_of_range(
                "connection.connect_timeout_secs",
                "must be greater than zero",
            ));
        }
        if config.connection.request_timeout_secs == 0 {
            return Err(ValidationError::out_of_range(
                "connection.request_timeout_secs",
                "must be greater than zero",
            ));
        }
        Ok(())
    }

    fn validate_streaming(&self, config: &ProxyConfig) -> Result<(), ValidationError> {
        if config.streaming.channel_capacity == 0 {
            return Err(ValidationError::out_of_range(
                "streaming.channel_capacity",
                "must be greater than zero",
            ));
        }
        if config.streaming.idle_timeout_secs == Some(0) {
            return Err(ValidationError::out_of_range(
                "streaming.idle_timeout_secs",
                "must be greater than zero when set",
            ));
        }
        Ok(())
    }
}
