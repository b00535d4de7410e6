//! HuggingFace inference API backend

use super::{
    build_prompt, extract_generated_text, Adapter, AdapterDescriptor, AdapterKind,
    AdapterResult, AdapterSettings,
};
use crate::config::SecretString;
use crate::http::HttpClient;
use crate::protocol::ChatRequest;
use async_trait::async_trait;
use serde_json::{json, Value};

/// Blocking-only adapter for hosted inference endpoints
#[derive(Debug, Clone)]
pub struct HuggingFaceAdapter {
    endpoint: String,
    max_new_tokens: u32,
    api_key: Option<SecretString>,
    client: HttpClient,
}

impl HuggingFaceAdapter {
    pub fn new(endpoint: impl Into<String>, settings: &AdapterSettings, client: HttpClient) -> Self {
        Self {
            endpoint: endpoint.into(),
            max_new_tokens: settings.max_new_tokens,
            api_key: settings.hf_api_key.clone(),
            client,
        }
    }

    fn payload(&self, request: &ChatRequest) -> Value {
        json!({
            "inputs": build_prompt(&request.messages),
            "parameters": { "max_new_tokens": self.max_new_tokens },
        })
    }
}

#[async_trait]
impl Adapter for HuggingFaceAdapter {
    fn descriptor(&self) -> AdapterDescriptor {
        AdapterDescriptor {
            kind: AdapterKind::HuggingFace,
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
