//! text-generation-inference backend
//!
//! TGI streams newline-delimited JSON objects on the same endpoint that
//! serves blocking calls.

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

#[derive(Debug, Clone)]
pub struct TgiAdapter {
    endpoint: String,
    max_new_tokens: u32,
    framing: FrameFormat,
    idle_timeout: Option<Duration>,
    client: HttpClient,
}

impl TgiAdapter {
    pub fn new(endpoint: impl Into<String>, settings: &AdapterSettings, client: HttpClient) -> Self {
        Self {
            endpoint: endpoint.into(),
            max_new_tokens: settings.max_new_tokens,
            framing: settings.framing.unwrap_or(FrameFormat::Ndjson),
            idle_timeout: settings.idle_timeout,
            client,
        }
    }

    fn payload(&self, request: &ChatRequest, stream: bool) -> Value {
        let mut body = json!({
            "inputs": build_prompt(&request.messages),
            "parameters": { "max_new_tokens": self.max_new_tokens },
        });
        if stream {
            body["stream"] = Value::Bool(true);
        }
        body
    }
}

#[async_trait]
impl Adapter for TgiAdapter {
    fn descriptor(&self) -> AdapterDescriptor {
        AdapterDescriptor {
            kind: AdapterKind::Tgi,
            endpoint: self.endpoint.clone(),
            supports_streaming: true,
        }
    }

    async fn send_message(&self, request: &ChatRequest) -> AdapterResult<String> {
        let response = self
            .client
            .post_json(&self.endpoint, &self.payload(request, false), None)
            .await?;
        Ok(extract_generated_text(&response))
    }

    async fn stream_message(&self, request: &ChatRequest, sink: DeltaSink) {
        let body = self.payload(request, true);
        StreamSession::new(self.framing, sink)
            .with_idle_timeout(self.idle_timeout)
            .run(self.client.open_stream(&self.endpoint, &body, None))
            .await;
    }
}
