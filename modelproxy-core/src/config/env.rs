//! Environment variable handling for configuration
//!
//! Two entry points: `${VAR}` interpolation inside configuration files, and
//! building a whole [`ProxyConfig`] from the process environment.

use super::error::ConfigError;
use super::schema::ProxyConfig;
use super::secrets::SecretString;
use crate::decode::FrameFormat;
use regex::Regex;
use std::str::FromStr;
use std::sync::LazyLock;

static ENV_VAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("env var pattern is a valid regex")
});

/// Interpolate `${VAR}` references using the process environment
pub fn interpolate_env_vars(content: &str) -> Result<String, ConfigError> {
    interpolate_with(content, |name| std::env::var(name).ok())
}

/// Interpolate `${VAR}` references using an arbitrary lookup
pub fn interpolate_with<F>(content: &str, lookup: F) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut missing = None;
    let result = ENV_VAR_PATTERN.replace_all(content, |cap: &regex::Captures<'_>| {
        let name = &cap[1];
        match lookup(name) {
            Some(value) => value,
            None => {
                missing.get_or_insert_with(|| name.to_string());
                String::new()
            }
        }
    });

    // Report the first missing variable
    if let Some(var) = missing {
        return Err(ConfigError::MissingEnvVar { var });
    }
    Ok(result.into_owned())
}

/// Build a configuration from the process environment
pub fn config_from_env() -> Result<ProxyConfig, ConfigError> {
    config_from_lookup(|name| std::env::var(name).ok())
}

/// Build a configuration from `MODEL_PROXY_URL`, `MODEL_API_KEY`, `HF_API_KEY`,
/// `PORT` and friends. Unset variables keep their defaults; empty keys are
/// treated as unset.
pub fn config_from_lookup<F>(lookup: F) -> Result<ProxyConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = ProxyConfig::default();

    if let Some(url) = lookup("MODEL_PROXY_URL") {
        config.model.proxy_url = url;
    }
    config.model.api_key = non_empty(lookup("MODEL_API_KEY")).map(SecretString::from);
    config.model.hf_api_key = non_empty(lookup("HF_API_KEY")).map(SecretString::from);
    if let Some(model) = non_empty(lookup("OPENAI_MODEL")) {
        config.model.openai_model = model;
    }
    if let Some(tokens) = parse_var(&lookup, "MODEL_MAX_NEW_TOKENS")? {
        config.model.max_new_tokens = tokens;
    }

    if let Some(address) = non_empty(lookup("BIND_ADDRESS")) {
        config.server.bind_address = address;
    }
    if let Some(port) = parse_var(&lookup, "PORT")? {
        config.server.port = port;
    }

    if let Some(timeout) = parse_var(&lookup, "REQUEST_TIMEOUT_SECS")? {
        config.connection.request_timeout_secs = timeout;
    }
    if let Some(framing) = parse_var::<FrameFormat, _>(&lookup, "STREAM_FRAMING")? {
        config.streaming.framing = Some(framing);
    }
    if let Some(idle) = parse_var(&lookup, "STREAM_IDLE_TIMEOUT_SECS")? {
        config.streaming.idle_timeout_secs = Some(idle);
    }

    Ok(config)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_var<T, F>(lookup: &F, var: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match non_empty(lookup(var)) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::BadEnvValue {
                var: var.to_string(),
                value: raw.clone(),
                reason: e.to_string(),
            }),
    }
}
