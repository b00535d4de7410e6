//! Services the routes depend on but do not own: caller authorization and
//! storage of finished answers.

use crate::error::ApiError;
use async_trait::async_trait;
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use std::sync::Mutex;
use thiserror::Error;
use tracing::info;

/// Decides whether a caller may start a model request
pub trait AuthGate: Send + Sync {
    fn authorize(&self, headers: &HeaderMap) -> Result<(), ApiError>;
}

/// Accepts any well-formed `Authorization: Bearer <token>` header.
///
/// Token verification happens upstream of this service.
#[derive(Debug, Default, Clone, Copy)]
pub struct BearerPresenceGate;

impl AuthGate for BearerPresenceGate {
    fn authorize(&self, headers: &HeaderMap) -> Result<(), ApiError> {
        let value = headers
            .get(AUTHORIZATION)
            .ok_or(ApiError::MissingAuthorization)?
            .to_str()
            .map_err(|_| ApiError::InvalidAuthorization)?;

        let mut parts = value.split(' ');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(scheme), Some(token), None)
                if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() =>
            {
                Ok(())
            }
            _ => Err(ApiError::InvalidAuthorization),
        }
    }
}

#[derive(Debug, Error)]
#[error("{0}")]
pub struct PersistenceError(pub String);

impl From<PersistenceError> for ApiError {
    fn from(err: PersistenceError) -> Self {
        ApiError::Persistence(err.0)
    }
}

/// Receives the final text of a completed answer.
/// Never sees partial deltas or failed sessions.
#[async_trait]
pub trait PersistenceSink: Send + Sync {
    async fn store_answer(&self, project_id: i64, text: String) -> Result<(), PersistenceError>;
}

/// Records answers in the log only
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

#[async_trait]
impl PersistenceSink for TracingSink {
    async fn store_answer(&self, project_id: i64, text: String) -> Result<(), PersistenceError> {
        info!(
            "assistant answer for project {} ({} chars)",
            project_id,
            text.chars().count()
        );
        Ok(())
    }
}

/// Keeps answers in memory, in arrival order
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<(i64, String)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<(i64, String)> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl PersistenceSink for MemorySink {
    async fn store_answer(&self, project_id: i64, text: String) -> Result<(), PersistenceError> {
        self.records
            .lock()
            .map_err(|e| PersistenceError(e.to_string()))?
            .push((project_id, text));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_gate() {
        let gate = BearerPresenceGate;
        assert!(gate.authorize(&headers("Bearer abc")).is_ok());
        assert!(gate.authorize(&headers("bearer abc")).is_ok());
        assert!(matches!(
            gate.authorize(&HeaderMap::new()),
            Err(ApiError::MissingAuthorization)
        ));
        assert!(matches!(
            gate.authorize(&headers("abc")),
            Err(ApiError::InvalidAuthorization)
        ));
        assert!(matches!(
            gate.authorize(&headers("Basic abc")),
            Err(ApiError::InvalidAuthorization)
        ));
        assert!(matches!(
            gate.authorize(&headers("Bearer a b")),
            Err(ApiError::InvalidAuthorization)
        ));
    }

    #[tokio::test]
    async fn test_memory_sink_keeps_order() {
        let sink = MemorySink::new();
        sink.store_answer(1, "a".into()).await.unwrap();
        sink.store_answer(2, "b".into()).await.unwrap();
        assert_eq!(sink.records(), vec![(1, "a".into()), (2, "b".into())]);
    }
}
