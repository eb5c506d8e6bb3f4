
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::config::OpenAiConfig;
use crate::{ChatError, Result};

const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Client for an OpenAI-compatible embeddings endpoint.
#[derive(Debug, Clone)]
pub struct EmbeddingClient {
    api_base: Url,
    api_key: String,
    model: String,
    batch_size: usize,
    agent: ureq::Agent,
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    data: Vec<EmbedData>,
}

#[derive(Debug, Deserialize)]
struct EmbedData {
    index: usize,
    embedding: Vec<f32>,
}

impl EmbeddingClient {
    #[inline]
    pub fn new(config: &OpenAiConfig, api_key: String) -> Result<Self> {
        let api_base = config
            .api_base_url()
            .map_err(|e| ChatError::Config(e.to_string()))?;

        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT_SECONDS)))
            .build()
            .into();

        Ok(Self {
            api_base,
            api_key,
            model: config.embedding_model.clone(),
            batch_size: config.batch_size as usize,
            agent,
        })
    }

    #[inline]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        self
    }

    /// Embed a single text (a one-item batch). Used for queries.
    #[inline]
    pub fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        let input = [text.to_string()];
        let mut vectors = self.embed_single_batch(&input)?;
        vectors
            .pop()
            .ok_or_else(|| ChatError::Embedding("Service returned no embedding".to_string()))
    }

    /// Embed an ordered sequence of texts, preserving exact 1:1 order
    /// correspondence between inputs and output vectors. The input is
    /// partitioned into contiguous chunks of at most the configured batch
    /// size; a failed chunk aborts the whole operation with no partial
    /// result. `on_progress` receives the completed fraction after each
    /// chunk, monotonically non-decreasing and reaching 1.0 on completion.
    #[inline]
    pub fn embed_batches(
        &self,
        texts: &[String],
        mut on_progress: impl FnMut(f32),
    ) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            on_progress(1.0);
            return Ok(Vec::new());
        }

        debug!("Generating embeddings for {} texts", texts.len());

        let total = texts.len();
        let mut matrix = Vec::with_capacity(total);

        for chunk in texts.chunks(self.batch_size) {
            let vectors = self.embed_single_batch(chunk)?;
            matrix.extend(vectors);
            on_progress(matrix.len() as f32 / total as f32);
        }

        info!("Generated {} embeddings total", matrix.len());
        Ok(matrix)
    }

    fn embed_single_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let request = EmbedRequest {
            model: &self.model,
            input: texts,
        };

        let url = self.endpoint("embeddings");
        let request_json = serde_json::to_string(&request)
            .map_err(|e| ChatError::Embedding(format!("Failed to serialize request: {}", e)))?;

        debug!("Requesting embeddings for batch of {} texts", texts.len());

        let response_text = self
            .agent
            .post(&url)
            .header("Authorization", &format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .send(&request_json)
            .and_then(|mut resp| resp.body_mut().read_to_string())
            .map_err(|e| ChatError::Embedding(format!("Request to {} failed: {}", url, e)))?;

        let response: EmbedResponse = serde_json::from_str(&response_text)
            .map_err(|e| ChatError::Embedding(format!("Failed to parse response: {}", e)))?;

        if response.data.len() != texts.len() {
            return Err(ChatError::Embedding(format!(
                "Mismatch between request and response counts: {} vs {}",
                texts.len(),
                response.data.len()
            )));
        }

        // The service tags each vector with its input index; re-sort so a
        // reordering upstream can never break row/text alignment.
        let mut data = response.data;
        data.sort_by_key(|d| d.index);
        for (expected, entry) in data.iter().enumerate() {
            if entry.index != expected {
                return Err(ChatError::Embedding(format!(
                    "Response indices are not a permutation of inputs (missing index {})",
                    expected
                )));
            }
        }

        Ok(data.into_iter().map(|d| d.embedding).collect())
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base.as_str().trim_end_matches('/'), path)
    }
}
