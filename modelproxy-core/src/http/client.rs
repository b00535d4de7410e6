//! HTTP client implementation using reqwest

use crate::adapters::error::{AdapterError, AdapterResult};
use crate::config::{ConnectionConfig, SecretString};
use reqwest::{Client, ClientBuilder, RequestBuilder, Response};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Maximum blocking response size (10MB)
const MAX_RESPONSE_SIZE: usize = 10 * 1024 * 1024;

/// Default user agent
const USER_AGENT: &str = concat!("modelproxy/", env!("CARGO_PKG_VERSION"));

/// Shared HTTP client with connection pooling.
///
/// Holds no per-call state, so one instance serves every concurrent request.
#[derive(Debug, Clone)]
pub struct HttpClient {
    /// The underlying reqwest client
    client: Arc<Client>,

    /// Total timeout applied to blocking calls only
    request_timeout: Duration,

    /// Maximum response size to prevent OOM
    max_response_size: usize,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> AdapterResult<Self> {
        Self::from_config(&ConnectionConfig::default())
    }

    /// Create a client from connection settings
    pub fn from_config(config: &ConnectionConfig) -> AdapterResult<Self> {
        Self::with_config(
            config.connect_timeout(),
            config.request_timeout(),
            config.max_idle_per_host,
        )
    }

    /// Create a new HTTP client with custom configuration.
    ///
    /// No client-wide total timeout is set: it would cut long-lived streams.
    pub fn with_config(
        connect_timeout: Duration,
        request_timeout: Duration,
        max_idle_per_host: usize,
    ) -> AdapterResult<Self> {
        let client = ClientBuilder::new()
            .pool_max_idle_per_host(max_idle_per_host)
            .pool_idle_timeout(Duration::from_secs(90))
            .connect_timeout(connect_timeout)
            .user_agent(USER_AGENT)
            .gzip(true)
            .build()
            .map_err(|e| {
                AdapterError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client: Arc::new(client),
            request_timeout,
            max_response_size: MAX_RESPONSE_SIZE,
        })
    }

    /// POST a JSON body and return the JSON response of a successful call.
    ///
    /// A non-2xx status becomes [`AdapterError::UpstreamHttp`] without the
    /// body ever being parsed.
    pub async fn post_json(
        &self,
        url: &str,
        body: &Value,
        auth: Option<&SecretString>,
    ) -> AdapterResult<Value> {
        let request_id = Uuid::new_v4();
        info!("POST {} [request_id: {}]", url, request_id);

        let request = self.build(url, body, auth, request_id)?.timeout(self.request_timeout);
        let response = send(request, request_id).await?;
        let mut response = check_status(response, request_id).await?;

        if let Some(content_length) = response.content_length() {
            if content_length as usize > self.max_response_size {
                return Err(self.too_large(content_length as usize, request_id));
            }
        }

        // Chunked bodies carry no length up front, so the cap is enforced as we read.
        let mut received = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| {
            AdapterError::UpstreamTransport(format!(
                "Failed to read response body: {} [request_id: {}]",
                e, request_id
            ))
        })? {
            if received.len() + chunk.len() > self.max_response_size {
                return Err(self.too_large(received.len() + chunk.len(), request_id));
            }
            received.extend_from_slice(&chunk);
        }

        serde_json::from_slice(&received).map_err(|e| {
            error!("Failed to parse response [request_id: {}]: {}", request_id, e);
            AdapterError::Parse(format!(
                "Invalid response format: {} [request_id: {}]",
                e, request_id
            ))
        })
    }

    /// Cap the size of blocking response bodies
    pub fn with_max_response_size(mut self, limit: usize) -> Self {
        self.max_response_size = limit;
        self
    }

    fn too_large(&self, size: usize, request_id: Uuid) -> AdapterError {
        warn!(
            "Response body over {} bytes [request_id: {}]",
            self.max_response_size, request_id
        );
        AdapterError::Parse(format!(
            "Response size {} exceeds maximum {} [request_id: {}]",
            size, self.max_response_size, request_id
        ))
    }

    /// POST a JSON body and hand back the live response of a successful call
    /// so its body can be consumed as a byte stream.
    pub async fn open_stream(
        &self,
        url: &str,
        body: &Value,
        auth: Option<&SecretString>,
    ) -> AdapterResult<Response> {
        let request_id = Uuid::new_v4();
        info!("POST {} (streaming) [request_id: {}]", url, request_id);

        let request = self.build(url, body, auth, request_id)?;
        let response = send(request, request_id).await?;
        check_status(response, request_id).await
    }

    fn build(
        &self,
        url: &str,
        body: &Value,
        auth: Option<&SecretString>,
        request_id: Uuid,
    ) -> AdapterResult<RequestBuilder> {
        if url.trim().is_empty() {
            return Err(AdapterError::Configuration(
                "No upstream endpoint configured".to_string(),
            ));
        }

        let mut builder = self
            .client
            .post(url)
            .header("X-Request-ID", request_id.to_string())
            .json(body);
        if let Some(bearer) = auth.and_then(SecretString::bearer) {
            builder = builder.header("Authorization", bearer);
        }
        Ok(builder)
    }
}

async fn send(request: RequestBuilder, request_id: Uuid) -> AdapterResult<Response> {
    request.send().await.map_err(|e| {
        if e.is_timeout() {
            warn!("Request timeout [request_id: {}]", request_id);
        } else {
            error!("Request error [request_id: {}]: {}", request_id, e);
        }
        AdapterError::from(e)
    })
}

async fn check_status(response: Response, request_id: Uuid) -> AdapterResult<Response> {
    let status = response.status();
    debug!("Response status: {} [request_id: {}]", status, request_id);
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    warn!(
        "Request failed with status {} [request_id: {}]",
        status, request_id
    );
    Err(AdapterError::UpstreamHttp {
        status: status.as_u16(),
        body,
    })
}
