//! HTTP front end of the model proxy
//!
//! Exposes one configured model backend to callers:
//! - `POST /api/model`: blocking call, answers `{"text": …}`
//! - `POST /api/model/stream`: `text/event-stream` of normalized deltas
//! - `GET /health`: liveness probe

pub mod collaborators;
pub mod error;
pub mod routes;

pub use collaborators::{
    AuthGate, BearerPresenceGate, MemorySink, PersistenceError, PersistenceSink, TracingSink,
};
pub use error::ApiError;

use axum::routing::{get, post};
use axum::Router;
use modelproxy_core::ModelAdapter;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

const DEFAULT_CHANNEL_CAPACITY: usize = 16;

/// Shared state of every route
#[derive(Clone)]
pub struct AppState {
    pub adapter: Arc<ModelAdapter>,
    pub auth: Arc<dyn AuthGate>,
    pub persistence: Arc<dyn PersistenceSink>,
    /// Events buffered per streaming session
    pub channel_capacity: usize,
}

impl AppState {
    /// State with bearer-presence auth and log-only persistence
    pub fn new(adapter: ModelAdapter) -> Self {
        Self {
            adapter: Arc::new(adapter),
            auth: Arc::new(BearerPresenceGate),
            persistence: Arc::new(TracingSink),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }

    pub fn with_auth(mut self, auth: Arc<dyn AuthGate>) -> Self {
        self.auth = auth;
        self
    }

    pub fn with_persistence(mut self, persistence: Arc<dyn PersistenceSink>) -> Self {
        self.persistence = persistence;
        self
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }
}

/// Build the router with tracing and CORS layers
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/api/model", post(routes::send_message))
        .route("/api/model/stream", post(routes::stream_message))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}
