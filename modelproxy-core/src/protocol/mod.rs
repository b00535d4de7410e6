//! Protocol module for chat request/response structures
//!
//! These are the backend-agnostic shapes exchanged with the downstream caller.
//! Backend payloads are built from them by each adapter.

pub mod types;

pub use types::{ChatRequest, ChatResponse, Message, MessageRole};
