//! HTTP client module for talking to model backends
//!
//! This module implements the outbound HTTP layer, handling:
//! - Connection pooling and client management
//! - Status checks before any body is interpreted
//! - Error mapping into [`AdapterError`](crate::adapters::AdapterError)
//! - Request ID generation and correlation in logs

pub mod client;

pub use client::HttpClient;
