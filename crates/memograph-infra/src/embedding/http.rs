//! HttpEmbedder -- concrete [`Embedder`] implementation over HTTP.
//!
//! Talks to an Ollama-style endpoint: `POST {base_url}/api/embeddings` with
//! a model name and a prompt, returning one fixed-length vector. An optional
//! bearer token is wrapped in [`secrecy::SecretString`] and never logged.
//!
//! The provider has its own startup lifecycle: it may need to be launched,
//! and a named model may be materialized lazily on first use. Both are
//! handled once before serving via [`HttpEmbedder::wait_until_ready`] and
//! [`HttpEmbedder::warm_model`] -- never per call.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use memograph_core::memory::embedder::Embedder;
use memograph_types::config::EmbeddingConfig;
use memograph_types::error::EmbedderError;

/// HTTP embedding provider adapter.
pub struct HttpEmbedder {
    client: reqwest::Client,
    base_url: String,
    model: String,
    dimension: usize,
    api_key: Option<SecretString>,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

impl HttpEmbedder {
    /// Readiness poll: 1-second interval, 30 attempts, then permanent
    /// failure for that call.
    const READY_ATTEMPTS: u32 = 30;
    const READY_INTERVAL: Duration = Duration::from_secs(1);

    pub fn new(config: &EmbeddingConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("failed to create reqwest client");

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            dimension: config.dimension,
            api_key: None,
        }
    }

    /// Override the base URL (useful for testing or proxies).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Attach a bearer token for providers that require one.
    pub fn with_api_key(mut self, api_key: SecretString) -> Self {
        self.api_key = Some(api_key);
        self
    }

    /// Poll the provider's version endpoint until it responds, at 1-second
    /// intervals for up to 30 attempts.
    pub async fn wait_until_ready(&self) -> Result<(), EmbedderError> {
        let url = format!("{}/api/version", self.base_url);
        for attempt in 1..=Self::READY_ATTEMPTS {
            match self.client.get(&url).send().await {
                Ok(response) if response.status().is_success() => {
                    debug!(attempt, "embedding provider ready");
                    return Ok(());
                }
                Ok(response) => {
                    debug!(attempt, status = %response.status(), "embedding provider not ready");
                }
                Err(e) => {
                    debug!(attempt, error = %e, "embedding provider unreachable");
                }
            }
            if attempt < Self::READY_ATTEMPTS {
                tokio::time::sleep(Self::READY_INTERVAL).await;
            }
        }
        Err(EmbedderError::Unavailable(format!(
            "provider at {} not ready after {} attempts",
            self.base_url,
            Self::READY_ATTEMPTS
        )))
    }

    /// Run one throwaway embedding so a lazily-pulled model is materialized
    /// before the first real request.
    pub async fn warm_model(&self) -> Result<(), EmbedderError> {
        self.embed_text("warmup").await.map(|_| ())
    }

    async fn embed_text(&self, text: &str) -> Result<Vec<f32>, EmbedderError> {
        let url = format!("{}/api/embeddings", self.base_url);
        let mut request = self.client.post(&url).json(&EmbeddingRequest {
            model: &self.model,
            prompt: text,
        });
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key.expose_secret());
        }

        let response = request
            .send()
            .await
            .map_err(|e| EmbedderError::Unavailable(e.to_string()))?;
        if !response.status().is_success() {
            return Err(EmbedderError::Http(format!(
                "provider returned {}",
                response.status()
            )));
        }

        let body: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| EmbedderError::Http(e.to_string()))?;

        if body.embedding.len() != self.dimension {
            return Err(EmbedderError::Dimension {
                expected: self.dimension,
                actual: body.embedding.len(),
            });
        }
        Ok(body.embedding)
    }
}

impl Embedder for HttpEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedderError> {
        // The provider takes one prompt per request.
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed_text(text).await?);
        }
        Ok(vectors)
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> EmbeddingConfig {
        EmbeddingConfig {
            base_url: "http://localhost:11434/".to_string(),
            model: "nomic-embed-text".to_string(),
            dimension: 768,
            enabled: true,
        }
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let embedder = HttpEmbedder::new(&config());
        assert_eq!(embedder.base_url, "http://localhost:11434");

        let overridden =
            embedder.with_base_url("http://embedder.internal:8080///".to_string());
        assert_eq!(overridden.base_url, "http://embedder.internal:8080");
    }

    #[test]
    fn test_model_and_dimension_exposed() {
        let embedder = HttpEmbedder::new(&config());
        assert_eq!(embedder.model_name(), "nomic-embed-text");
        assert_eq!(embedder.dimension(), 768);
    }

    #[test]
    fn test_request_serialization() {
        let request = EmbeddingRequest {
            model: "nomic-embed-text",
            prompt: "hello",
        };
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(json, r#"{"model":"nomic-embed-text","prompt":"hello"}"#);
    }

    #[test]
    fn test_response_deserialization() {
        let body: EmbeddingResponse =
            serde_json::from_str(r#"{"embedding":[0.1,0.2,0.3]}"#).unwrap();
        assert_eq!(body.embedding, vec![0.1, 0.2, 0.3]);
    }
}
