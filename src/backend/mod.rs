pub mod direct;
pub mod prompts;
pub mod proxy;

pub use direct::DirectBackend;
pub use proxy::ProxyBackend;

use crate::config::{BackendMode, Config};
use crate::draft::ScoreCard;
use crate::error::BackendError;
use crate::models::ModelDescriptor;
use crate::params::{EmailParameters, OutputFormat};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// A content-preserving-intent rewrite dimension.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RefinementKind {
    Professional,
    Shorter,
    Personalized,
    Improvement,
}

/// Inputs for a refinement call.
#[derive(Debug, Clone)]
pub struct RefineRequest<'a> {
    pub content: &'a str,
    pub kind: RefinementKind,
    /// Scorer suggestions; present for [`RefinementKind::Improvement`] only.
    pub suggestions: Option<&'a str>,
    pub model: &'a str,
    pub output_format: OutputFormat,
    pub temperature: f64,
}

/// Strategy seam to the AI generation service.
///
/// One engine drives either the companion REST proxy or a provider called
/// directly with hand-built prompts; the implementation is chosen at
/// configuration time via [`create_backend`].
#[async_trait]
pub trait Backend: Send + Sync {
    async fn list_models(&self) -> Result<Vec<ModelDescriptor>, BackendError>;

    async fn generate(&self, params: &EmailParameters) -> Result<String, BackendError>;

    async fn refine(&self, request: RefineRequest<'_>) -> Result<String, BackendError>;

    async fn score(
        &self,
        content: &str,
        model: &str,
        format: OutputFormat,
        temperature: f64,
    ) -> Result<ScoreCard, BackendError>;

    async fn convert(
        &self,
        content: &str,
        from: OutputFormat,
        to: OutputFormat,
        model: &str,
    ) -> Result<String, BackendError>;
}

/// Build the configured backend strategy.
pub fn create_backend(config: &Config) -> anyhow::Result<Box<dyn Backend>> {
    match config.backend.mode {
        BackendMode::Proxy => Ok(Box::new(ProxyBackend::new(&config.backend.proxy_url))),
        BackendMode::Direct => {
            let api_key = resolve_api_key(config.api_key.as_deref());
            Ok(Box::new(DirectBackend::new(
                &config.backend.provider_url,
                api_key.as_deref(),
                &config.backend.model,
            )))
        }
    }
}

/// Resolve the provider credential for direct mode.
///
/// Resolution order:
/// 1. Explicit `api_key` from the config file (trimmed, skipped if empty)
/// 2. `MAILFORGE_API_KEY`
/// 3. `OPENAI_API_KEY`
///
/// The credential is never baked into the binary; direct mode without any of
/// these simply sends unauthenticated requests (valid for local providers).
fn resolve_api_key(explicit: Option<&str>) -> Option<String> {
    if let Some(key) = explicit.map(str::trim).filter(|k| !k.is_empty()) {
        return Some(key.to_string());
    }

    for env_var in ["MAILFORGE_API_KEY", "OPENAI_API_KEY"] {
        if let Ok(value) = std::env::var(env_var) {
            let value = value.trim();
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }

    None
}

/// Decode a non-2xx response into [`BackendError::Status`], surfacing the
/// server's `detail` message verbatim. Responses without a JSON `detail`
/// body fall back to the raw text.
pub(crate) async fn status_error(response: reqwest::Response) -> BackendError {
    #[derive(Deserialize)]
    struct ErrorBody {
        detail: String,
    }

    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<ErrorBody>(&body)
        .map(|b| b.detail)
        .unwrap_or(body);
    BackendError::Status { status, detail }
}
