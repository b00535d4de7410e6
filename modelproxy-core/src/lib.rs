//! Model Proxy Core Library
//!
//! Uniform access to interchangeable text-generation backends, either as one
//! blocking call or as a live, normalized stream of text deltas.
//!
//! The pieces, leaves first:
//! - [`decode`]: chunk-boundary invariant frame decoders (SSE, NDJSON, raw)
//! - [`adapters`]: one adapter per backend family plus the startup selector
//! - [`session`]: the per-request delta channel with its single terminal event
//! - [`publisher`]: re-frames a session for the downstream HTTP response
//! - [`consumer`]: the caller-side reducer folding deltas into a message

pub mod adapters;
pub mod config;
pub mod consumer;
pub mod decode;
pub mod http;
pub mod protocol;
pub mod publisher;
pub mod session;

pub use adapters::{
    resolve, Adapter, AdapterDescriptor, AdapterError, AdapterKind, AdapterResult,
    AdapterSettings, ModelAdapter,
};
pub use config::ProxyConfig;
pub use consumer::{ClientEvent, ClientStreamConsumer};
pub use decode::{FrameDecoder, FrameFormat};
pub use protocol::{ChatRequest, ChatResponse, Message, MessageRole};
pub use publisher::{Frame, SessionPublisher};
pub use session::{DeltaSink, DeltaStream, SessionState, StreamEvent, TerminalSignal};

/// Returns the version of the Model Proxy Core library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
