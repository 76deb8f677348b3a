use crate::config::{GoogleConfig, DEFAULT_API_BASE, DEFAULT_EMBEDDING_DIMENSIONS};
use crate::error::{PolymathError, Result};
use crate::llm::gemini::{http_client, model_endpoint, read_capped_error_body};
use crate::types::{Embedding, GeneratedContent};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

/// Service for generating text embeddings
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    /// Generate embedding for a single text.
    async fn embed(&self, text: &str) -> Result<Embedding>;

    /// Embedding dimension for the current model.
    fn dimension(&self) -> usize;

    /// Model identifier string.
    fn model_name(&self) -> &str;
}

#[derive(Debug, Deserialize)]
struct EmbedContentResponse {
    embedding: Option<ContentEmbedding>,
}

#[derive(Debug, Deserialize)]
struct ContentEmbedding {
    #[serde(default)]
    values: Vec<f32>,
}

/// Gemini `embedContent` client with a reduced output dimensionality.
#[derive(Debug, Clone)]
pub struct GeminiEmbedder {
    http: reqwest::Client,
    api_key: String,
    api_base: String,
    model: String,
    dimension: usize,
}

impl GeminiEmbedder {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        Ok(Self {
            http: http_client()?,
            api_key: api_key.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            model: model.into(),
            dimension: DEFAULT_EMBEDDING_DIMENSIONS as usize,
        })
    }

    pub fn from_config(config: &GoogleConfig) -> Result<Self> {
        Ok(Self::new(&config.api_key, &config.embedding_model)?
            .with_api_base(&config.api_base)
            .with_dimension(config.embedding_dimensions as usize))
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }
}

#[async_trait]
impl EmbeddingService for GeminiEmbedder {
    async fn embed(&self, text: &str) -> Result<Embedding> {
        let url = model_endpoint(&self.api_base, &self.model, "embedContent");
        let body = json!({
            "model": format!("models/{}", self.model),
            "content": { "parts": [{ "text": text }] },
            "outputDimensionality": self.dimension,
        });

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| PolymathError::Generation(format!("Embedding request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = read_capped_error_body(response).await;
            return Err(PolymathError::Generation(format!(
                "Embedding model {} returned {}: {}",
                self.model, status, error_text
            )));
        }

        let parsed: EmbedContentResponse = response
            .json()
            .await
            .map_err(|e| PolymathError::Generation(format!("Undecodable embedding response: {}", e)))?;

        let values = parsed.embedding.map(|e| e.values).unwrap_or_default();
        if values.is_empty() {
            return Err(PolymathError::Generation("No embedding generated".to_string()));
        }
        if values.len() != self.dimension {
            log::warn!(
                "Embedding from {} has {} dimensions, expected {}",
                self.model,
                values.len(),
                self.dimension
            );
        }
        Ok(values)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Generate the embedding input text for a piece of generated content
pub fn embedding_input(content: &GeneratedContent) -> String {
    let mut experts = content.primary_expert_name.clone();
    if let Some(secondary) = &content.secondary_expert_name {
        experts.push_str(" vs ");
        experts.push_str(secondary);
    }
    format!(
        "{}: {}\n{}\n{}",
        content.content_type, content.title_or_topic, experts, content.content
    )
}
