use crate::error::IndexError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::{Mutex, Once, OnceLock};
use std::time::Duration;
use tracing::warn;
use url::Url;

/// Credential sources checked in order; the first non-empty value wins.
pub const DEFAULT_KEY_SOURCES: [&str; 2] = ["EMBEDDINGS_API_KEY", "OPENAI_API_KEY"];

pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = 256;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const DIAGNOSTIC_MAX_CHARS: usize = 200;

static MISSING_CREDENTIAL_WARNING: Once = Once::new();
static LOGGED_FAILURE_CAUSES: OnceLock<Mutex<HashSet<String>>> = OnceLock::new();

/// Produces an embedding vector for a piece of text.
///
/// `None` means the provider is unavailable or returned nothing usable.
/// Callers treat the absence of an embedding as an expected outcome and
/// degrade; implementations never surface provider failures as errors.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> Option<Vec<f32>>;
}

#[async_trait]
impl<P: EmbeddingProvider + ?Sized> EmbeddingProvider for std::sync::Arc<P> {
    async fn embed(&self, text: &str) -> Option<Vec<f32>> {
        (**self).embed(text).await
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// Client for an OpenAI-style `/embeddings` endpoint.
///
/// Every request carries a bounded timeout; timeouts, transport errors,
/// non-success statuses, and empty result sets all collapse to `None` with a
/// warning logged once per distinct failure cause.
pub struct HttpEmbeddingClient {
    client: reqwest::Client,
    endpoint: Url,
    model: String,
    key_sources: Vec<String>,
}

impl HttpEmbeddingClient {
    pub fn new(endpoint: &str, model: impl Into<String>) -> Result<Self, IndexError> {
        let endpoint = Url::parse(endpoint)?;
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            endpoint,
            model: model.into(),
            key_sources: DEFAULT_KEY_SOURCES
                .iter()
                .map(|name| (*name).to_string())
                .collect(),
        })
    }

    /// Replaces the ordered list of environment variables checked for the
    /// provider credential.
    pub fn with_key_sources(mut self, sources: impl IntoIterator<Item = String>) -> Self {
        self.key_sources = sources.into_iter().collect();
        self
    }

    fn resolve_credential(&self) -> Option<String> {
        resolve_credential_from(&self.key_sources)
    }
}

pub(crate) fn resolve_credential_from(sources: &[String]) -> Option<String> {
    sources.iter().find_map(|name| {
        std::env::var(name)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    })
}

fn warn_once_per_cause(cause: &str, detail: &str) {
    let seen = LOGGED_FAILURE_CAUSES.get_or_init(|| Mutex::new(HashSet::new()));
    let mut guard = seen.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if guard.insert(cause.to_string()) {
        warn!(
            cause,
            detail = %truncate(detail),
            "embedding provider degraded; returning no embedding"
        );
    }
}

fn truncate(detail: &str) -> String {
    if detail.chars().count() <= DIAGNOSTIC_MAX_CHARS {
        return detail.to_string();
    }
    detail.chars().take(DIAGNOSTIC_MAX_CHARS).collect()
}

#[async_trait]
impl EmbeddingProvider for HttpEmbeddingClient {
    async fn embed(&self, text: &str) -> Option<Vec<f32>> {
        let credential = match self.resolve_credential() {
            Some(credential) => credential,
            None => {
                // Warned at most once per process; later calls skip the
                // network entirely.
                MISSING_CREDENTIAL_WARNING.call_once(|| {
                    warn!(
                        sources = ?self.key_sources,
                        "no embedding credential configured; semantic search is disabled"
                    );
                });
                return None;
            }
        };

        let body = EmbeddingRequest {
            model: &self.model,
            input: text,
        };

        let response = match self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(credential)
            .json(&body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(error) => {
                warn_once_per_cause("request_error", &error.to_string());
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn_once_per_cause(&format!("http_status_{}", status.as_u16()), &detail);
            return None;
        }

        let raw = match response.text().await {
            Ok(raw) => raw,
            Err(error) => {
                warn_once_per_cause("body_read_error", &error.to_string());
                return None;
            }
        };

        let parsed: EmbeddingResponse = match serde_json::from_str(&raw) {
            Ok(parsed) => parsed,
            Err(error) => {
                warn_once_per_cause("invalid_json", &format!("{error}; body: {raw}"));
                return None;
            }
        };

        let vector = parsed.data.into_iter().next().map(|item| item.embedding);
        match vector {
            Some(vector) if !vector.is_empty() => Some(vector),
            _ => {
                // A successful call with an empty result set is still "no
                // embedding" to everything downstream.
                warn_once_per_cause("empty_result", "provider returned no vectors");
                None
            }
        }
    }
}

/// Deterministic offline embedder: hashed character trigram counts,
/// L2-normalized. Stands in for the remote provider in the CLI and in tests.
#[derive(Debug, Clone, Copy)]
pub struct HashEmbedder {
    pub dimensions: usize,
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self {
            dimensions: DEFAULT_EMBEDDING_DIMENSIONS,
        }
    }
}

impl HashEmbedder {
    fn embed_sync(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0f32; self.dimensions.max(1)];
        let chars: Vec<char> = text.to_lowercase().chars().collect();

        for window in chars.windows(3) {
            let bucket = (fnv1a(window) % vector.len() as u64) as usize;
            vector[bucket] += 1.0;
        }

        let magnitude = vector.iter().map(|value| value * value).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for value in &mut vector {
                *value /= magnitude;
            }
        }

        vector
    }
}

fn fnv1a(window: &[char]) -> u64 {
    let mut hash = 0xcbf29ce484222325u64;
    for ch in window {
        let mut buffer = [0u8; 4];
        for byte in ch.encode_utf8(&mut buffer).bytes() {
            hash ^= u64::from(byte);
            hash = hash.wrapping_mul(0x100000001b3);
        }
    }
    hash
}

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    async fn embed(&self, text: &str) -> Option<Vec<f32>> {
        Some(self.embed_sync(text))
    }
}
