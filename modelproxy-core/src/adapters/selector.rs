//! Startup selection of the model adapter
//!
//! The configured locator is matched against a fixed priority list:
//!
//! | Priority | Matches | Adapter | Endpoint |
//! |---|---|---|---|
//! | 1 | `localai://…` or contains `localai` | LocalAI | prefix and one trailing `/` stripped |
//! | 2 | `tgi://…` or contains `/v1/models/` | TGI | prefix stripped |
//! | 3 | `hf://…` or contains `huggingface.co` | HuggingFace | prefix stripped |
//! | 4 | anything else | OpenAI-compatible | the string itself |
//!
//! An empty locator selects the OpenAI-compatible adapter without an endpoint;
//! calls then fail with a configuration error.

use super::{
    AdapterError, AdapterResult, AdapterSettings, HuggingFaceAdapter, LocalAiAdapter,
    ModelAdapter, OpenAiAdapter, TgiAdapter,
};
use crate::http::HttpClient;
use tracing::{info, warn};
use url::Url;

const LOCALAI_SCHEME: &str = "localai://";
const TGI_SCHEME: &str = "tgi://";
const HF_SCHEME: &str = "hf://";

/// Resolve a backend locator into a ready-to-use adapter.
///
/// Fails with [`AdapterError::Selection`] when the endpoint that remains after
/// stripping the scheme prefix is missing, unparseable or not http(s).
pub fn resolve(
    locator: &str,
    settings: &AdapterSettings,
    client: HttpClient,
) -> AdapterResult<ModelAdapter> {
    let target = locator.trim();

    let adapter = if target.starts_with(LOCALAI_SCHEME) || target.contains("localai") {
        let base = target.strip_prefix(LOCALAI_SCHEME).unwrap_or(target);
        let base = base.strip_suffix('/').unwrap_or(base);
        let base = validate_endpoint(target, base)?;
        ModelAdapter::LocalAi(LocalAiAdapter::new(base, settings, client))
    } else if target.starts_with(TGI_SCHEME) || target.contains("/v1/models/") {
        let endpoint = target.strip_prefix(TGI_SCHEME).unwrap_or(target);
        let endpoint = validate_endpoint(target, endpoint)?;
        ModelAdapter::Tgi(TgiAdapter::new(endpoint, settings, client))
    } else if target.starts_with(HF_SCHEME) || target.contains("huggingface.co") {
        let endpoint = target.strip_prefix(HF_SCHEME).unwrap_or(target);
        let endpoint = validate_endpoint(target, endpoint)?;
        ModelAdapter::HuggingFace(HuggingFaceAdapter::new(endpoint, settings, client))
    } else if target.is_empty() {
        warn!("No model endpoint configured; blocking calls will fail");
        ModelAdapter::OpenAiCompatible(OpenAiAdapter::new("", settings, client))
    } else {
        let endpoint = validate_endpoint(target, target)?;
        ModelAdapter::OpenAiCompatible(OpenAiAdapter::new(endpoint, settings, client))
    };

    info!(
        "Selected {} adapter (streaming: {})",
        adapter.kind(),
        adapter.supports_streaming()
    );
    Ok(adapter)
}

fn validate_endpoint(locator: &str, endpoint: &str) -> AdapterResult<String> {
    if endpoint.is_empty() {
        return Err(AdapterError::selection(
            locator,
            "no endpoint after the scheme prefix",
        ));
    }

    let url = Url::parse(endpoint).map_err(|e| {
        AdapterError::selection(locator, format!("invalid endpoint URL '{}': {}", endpoint, e))
    })?;

    match url.scheme() {
        "http" | "https" => Ok(endpoint.to_string()),
        other => Err(AdapterError::selection(
            locator,
            format!("unsupported URL scheme '{}'", other),
        )),
    }
}
