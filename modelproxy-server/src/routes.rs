//! Route handlers

use crate::error::ApiError;
use crate::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::sse::{Event, Sse};
use axum::Json;
use futures::{Stream, StreamExt};
use modelproxy_core::{Adapter, ChatRequest, ChatResponse, SessionPublisher};
use serde_json::{json, Value};
use std::convert::Infallible;
use tracing::{debug, error};

pub async fn health() -> Json<Value> {
    Json(json!({ "ok": true }))
}

/// `POST /api/model`: one blocking round trip
pub async fn send_message(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    state.auth.authorize(&headers)?;
    let Json(request) = body.map_err(|e| ApiError::InvalidBody(e.body_text()))?;
    debug!("blocking request with {} messages", request.messages.len());

    let text = state.adapter.send_message(&request).await?;
    if let Some(project_id) = request.project_id {
        state
            .persistence
            .store_answer(project_id, text.clone())
            .await?;
    }
    Ok(Json(ChatResponse::new(text)))
}

/// `POST /api/model/stream`: relay the answer as server-sent events
pub async fn stream_message(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    state.auth.authorize(&headers)?;
    let Json(request) = body.map_err(|e| ApiError::InvalidBody(e.body_text()))?;
    if !state.adapter.supports_streaming() {
        return Err(ApiError::StreamingUnsupported);
    }

    let project_id = request.project_id;
    let events = state
        .adapter
        .open_session(request, state.channel_capacity);
    debug!("streaming session {} opened", events.id());

    let mut publisher = SessionPublisher::new(events);
    if let Some(project_id) = project_id {
        let persistence = state.persistence.clone();
        publisher = publisher.on_complete(move |text| {
            tokio::spawn(async move {
                if let Err(e) = persistence.store_answer(project_id, text).await {
                    error!("failed to store streamed answer for project {}: {}", project_id, e);
                }
            });
        });
    }

    let frames = publisher
        .frames()
        .map(|frame| Ok::<_, Infallible>(Event::default().data(frame.data())));
    Ok(Sse::new(frames))
}
