//! OpenAI-compatible chat completion backend

use super::{
    extract_generated_text, Adapter, AdapterDescriptor, AdapterKind, AdapterResult,
    AdapterSettings,
};
use crate::config::SecretString;
use crate::http::HttpClient;
use crate::protocol::ChatRequest;
use async_trait::async_trait;
use serde_json::{json, Value};

/// Forwards the message list unchanged to a chat-completions endpoint.
/// Blocking only.
#[derive(Debug, Clone)]
pub struct OpenAiAdapter {
    endpoint: String,
    model: String,
    api_key: Option<SecretString>,
    client: HttpClient,
}

impl OpenAiAdapter {
    pub fn new(endpoint: impl Into<String>, settings: &AdapterSettings, client: HttpClient) -> Self {
        Self {
            endpoint: endpoint.into(),
            model: settings.openai_model.clone(),
            api_key: settings.api_key.clone(),
            client,
        }
    }

    fn payload(&self, request: &ChatRequest) -> Value {
        json!({
            "model": self.model,
            "messages": request.messages,
        })
    }
}

#[async_trait]
impl Adapter for OpenAiAdapter {
    fn descriptor(&self) -> AdapterDescriptor {
        AdapterDescriptor {
            kind: AdapterKind::OpenAiCompatible,
            endpoint: self.endpoint.clone(),
            supports_streaming: false,
        }
    }

    async fn send_message(&self, request: &ChatRequest) -> AdapterResult<String> {
        let response = self
            .client
            .post_json(&self.endpoint, &self.payload(request), self.api_key.as_ref())
            .await?;
        Ok(extract_generated_text(&response))
    }
}
