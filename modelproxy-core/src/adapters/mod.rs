//! Model backend adapters
//!
//! Each backend family gets one adapter that knows how to shape the outbound
//! payload, read a blocking answer and (when the backend can) stream deltas.
//! The set of backends is closed, so they are gathered in [`ModelAdapter`]
//! rather than handed around as trait objects.

pub mod error;
mod extract;
mod huggingface;
mod localai;
mod openai;
mod prompt;
mod selector;
mod tgi;

pub use error::{AdapterError, AdapterResult};
pub use extract::extract_generated_text;
pub use huggingface::HuggingFaceAdapter;
pub use localai::LocalAiAdapter;
pub use openai::OpenAiAdapter;
pub use prompt::build_prompt;
pub use selector::resolve;
pub use tgi::TgiAdapter;

use crate::config::{ProxyConfig, SecretString};
use crate::decode::FrameFormat;
use crate::http::HttpClient;
use crate::protocol::ChatRequest;
use crate::session::{self, DeltaSink, DeltaStream, TerminalSignal};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Common behaviour of every model backend
#[async_trait]
pub trait Adapter: Send + Sync {
    /// Identity and capabilities of this adapter
    fn descriptor(&self) -> AdapterDescriptor;

    /// Perform one blocking round trip and return the generated text
    async fn send_message(&self, request: &ChatRequest) -> AdapterResult<String>;

    /// Stream the answer into `sink`, ending it with exactly one terminal event.
    ///
    /// Adapters without streaming support end the session with an error
    /// straight away.
    async fn stream_message(&self, _request: &ChatRequest, sink: DeltaSink) {
        let err = AdapterError::StreamingUnsupported(self.descriptor().id().to_string());
        sink.finish(TerminalSignal::Error(err.to_string())).await;
    }
}

/// Backend family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdapterKind {
    #[serde(rename = "openai")]
    OpenAiCompatible,
    LocalAi,
    Tgi,
    HuggingFace,
}

impl AdapterKind {
    /// Stable identifier used in logs and errors
    pub fn id(&self) -> &'static str {
        match self {
            AdapterKind::OpenAiCompatible => "openai",
            AdapterKind::LocalAi => "localai",
            AdapterKind::Tgi => "tgi",
            AdapterKind::HuggingFace => "huggingface",
        }
    }
}

impl fmt::Display for AdapterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// What an adapter is and what it can do
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdapterDescriptor {
    pub kind: AdapterKind,
    pub endpoint: String,
    pub supports_streaming: bool,
}

impl AdapterDescriptor {
    pub fn id(&self) -> &'static str {
        self.kind.id()
    }
}

/// Request shaping shared by all adapters
#[derive(Debug, Clone)]
pub struct AdapterSettings {
    /// Generation budget for prompt-based backends
    pub max_new_tokens: u32,

    /// Model name for the OpenAI-compatible backend
    pub openai_model: String,

    /// Bearer token for the OpenAI-compatible backend
    pub api_key: Option<SecretString>,

    /// Bearer token for HuggingFace
    pub hf_api_key: Option<SecretString>,

    /// Overrides each streaming backend's native framing
    pub framing: Option<FrameFormat>,

    /// Idle limit for streaming sessions
    pub idle_timeout: Option<Duration>,
}

impl AdapterSettings {
    pub fn from_config(config: &ProxyConfig) -> Self {
        Self {
            max_new_tokens: config.model.max_new_tokens,
            openai_model: config.model.openai_model.clone(),
            api_key: config.model.api_key.clone(),
            hf_api_key: config.model.hf_api_key.clone(),
            framing: config.streaming.framing,
            idle_timeout: config.streaming.idle_timeout(),
        }
    }
}

impl Default for AdapterSettings {
    fn default() -> Self {
        Self::from_config(&ProxyConfig::default())
    }
}

/// The adapter chosen at startup
#[derive(Debug, Clone)]
pub enum ModelAdapter {
    OpenAiCompatible(OpenAiAdapter),
    LocalAi(LocalAiAdapter),
    Tgi(TgiAdapter),
    HuggingFace(HuggingFaceAdapter),
}

impl ModelAdapter {
    /// Build the HTTP client and resolve `model.proxy_url`
    pub fn from_config(config: &ProxyConfig) -> AdapterResult<Self> {
        let client = HttpClient::from_config(&config.connection)?;
        resolve(
            &config.model.proxy_url,
            &AdapterSettings::from_config(config),
            client,
        )
    }

    pub fn kind(&self) -> AdapterKind {
        match self {
            ModelAdapter::OpenAiCompatible(_) => AdapterKind::OpenAiCompatible,
            ModelAdapter::LocalAi(_) => AdapterKind::LocalAi,
            ModelAdapter::Tgi(_) => AdapterKind::Tgi,
            ModelAdapter::HuggingFace(_) => AdapterKind::HuggingFace,
        }
    }

    pub fn supports_streaming(&self) -> bool {
        self.descriptor().supports_streaming
    }

    /// Start a streaming session on its own task and return its event stream.
    ///
    /// Dropping the returned stream cancels the upstream request.
    pub fn open_session(&self, request: ChatRequest, capacity: usize) -> DeltaStream {
        let (sink, stream) = session::channel(capacity);
        debug!(
            "opening session {} on adapter {}",
            sink.id(),
            self.kind()
        );
        let adapter = self.clone();
        tokio::spawn(async move {
            adapter.stream_message(&request, sink).await;
        });
        stream
    }

    fn inner(&self) -> &dyn Adapter {
        match self {
            ModelAdapter::OpenAiCompatible(adapter) => adapter,
            ModelAdapter::LocalAi(adapter) => adapter,
            ModelAdapter::Tgi(adapter) => adapter,
            ModelAdapter::HuggingFace(adapter) => adapter,
        }
    }
}

#[async_trait]
impl Adapter for ModelAdapter {
    fn descriptor(&self) -> AdapterDescriptor {
        self.inner().descriptor()
    }

    async fn send_message(&self, request: &ChatRequest) -> AdapterResult<String> {
        self.inner().send_message(request).await
    }

    async fn stream_message(&self, request: &ChatRequest, sink: DeltaSink) {
        self.inner().stream_message(request, sink).await
    }
}
