//! Configuration schema structures with serde support

use super::secrets::SecretString;
use crate::decode::FrameFormat;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration structure for the model proxy
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProxyConfig {
    /// Which backend to talk to and how
    #[serde(default)]
    pub model: ModelConfig,

    /// Inbound HTTP listener
    #[serde(default)]
    pub server: ServerConfig,

    /// Outbound HTTP client settings
    #[serde(default)]
    pub connection: ConnectionConfig,

    /// Streaming session settings
    #[serde(default)]
    pub streaming: StreamingConfig,
}

/// Backend selection and request shaping
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ModelConfig {
    /// Backend locator, e.g. `tgi://http://tgi:8080/generate`.
    /// Resolved once at startup; an empty string selects the
    /// OpenAI-compatible adapter without an endpoint.
    #[serde(default)]
    pub proxy_url: String,

    /// Bearer token for the OpenAI-compatible backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<SecretString>,

    /// Bearer token for the HuggingFace inference API
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hf_api_key: Option<SecretString>,

    /// Generation budget sent to prompt-based backends
    #[serde(default = "default_max_new_tokens")]
    pub max_new_tokens: u32,

    /// Model name sent to the OpenAI-compatible backend
    #[serde(default = "default_openai_model")]
    pub openai_model: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            proxy_url: String::new(),
            api_key: None,
            hf_api_key: None,
            max_new_tokens: default_max_new_tokens(),
            openai_model: default_openai_model(),
        }
    }
}

/// Inbound listener settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

/// Outbound HTTP client settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectionConfig {
    /// TCP/TLS connect timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Total timeout for blocking calls in seconds.
    /// Streaming calls are bounded by the idle timeout instead.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Idle pooled connections kept per upstream host
    #[serde(default = "default_max_idle")]
    pub max_idle_per_host: usize,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: default_request_timeout(),
            max_idle_per_host: default_max_idle(),
        }
    }
}

impl ConnectionConfig {
    /// Connect timeout as a duration
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Blocking call timeout as a duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Streaming session settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StreamingConfig {
    /// Override the wire format of streaming backends
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub framing: Option<FrameFormat>,

    /// End a session with an error when upstream stays silent this long
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idle_timeout_secs: Option<u64>,

    /// Events buffered between the upstream reader and the downstream writer
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            framing: None,
            idle_timeout_secs: None,
            channel_capacity: default_channel_capacity(),
        }
    }
}

impl StreamingConfig {
    /// Idle timeout as a duration, if configured
    pub fn idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout_secs.map(Duration::from_secs)
    }
}

fn default_max_new_tokens() -> u32 {
    512
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    4000
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_request_timeout() -> u64 {
    120
}

fn default_max_idle() -> usize {
    10
}

fn default_channel_capacity() -> usize {
    16
}
