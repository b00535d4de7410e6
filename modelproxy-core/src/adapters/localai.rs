//! LocalAI backend
//!
//! Completions go to `<base>/v1/generate`. With `stream: true` the server
//! answers with SSE-style blocks, which are decoded as they arrive.

use super::{
    build_prompt, extract_generated_text, Adapter, AdapterDescriptor, AdapterKind,
    AdapterResult, AdapterSettings,
};
use crate::decode::FrameFormat;
use crate::http::HttpClient;
use crate::protocol::ChatRequest;
use crate::session::{DeltaSink, StreamSession};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

const GENERATE_PATH: &str = "/v1/generate";

#[derive(Debug, Clone)]
pub struct LocalAiAdapter {
    base_url: String,
    max_new_tokens: u32,
    framing: FrameFormat,
    idle_timeout: Option<Duration>,
    client: HttpClient,
}

impl LocalAiAdapter {
    /// `base_url` is the server root without a trailing slash
    pub fn new(base_url: impl Into<String>, settings: &AdapterSettings, client: HttpClient) -> Self {
        Self {
            base_url: base_url.into(),
            max_new_tokens: settings.max_new_tokens,
            framing: settings.framing.unwrap_or(FrameFormat::Sse),
            idle_timeout: settings.idle_timeout,
            client,
        }
    }

    fn generate_url(&self) -> String {
        format!("{}{}", self.base_url, GENERATE_PATH)
    }

    fn payload(&self, request: &ChatRequest, stream: bool) -> Value {
        let mut body = json!({
            "prompt": build_prompt(&request.messages),
            "max_new_tokens": self.max_new_tokens,
        });
        if stream {
            body["stream"] = Value::Bool(true);
        }
        body
    }
}

#[async_trait]
impl Adapter for LocalAiAdapter {
    fn descriptor(&self) -> AdapterDescriptor {
        AdapterDescriptor {
            kind: AdapterKind::LocalAi,
            endpoint: self.generate_url(),
            supports_streaming: true,
        }
    }

    async fn send_message(&self, request: &ChatRequest) -> AdapterResult<String> {
        let response = self
            .client
            .post_json(&self.generate_url(), &self.payload(request, false), None)
            .await?;
        Ok(extract_generated_text(&response))
    }

    async fn stream_message(&self, request: &ChatRequest, sink: DeltaSink) {
        let url = self.generate_url();
        let body = self.payload(request, true);
        StreamSession::new(self.framing, sink)
            .with_idle_timeout(self.idle_timeout)
            .run(self.client.open_stream(&url, &body, None))
            .await;
    }
}
