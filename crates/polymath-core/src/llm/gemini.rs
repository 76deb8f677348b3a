use crate::config::{GoogleConfig, DEFAULT_API_BASE};
use crate::error::{PolymathError, Result};
use crate::llm::envelope::GenerateContentResponse;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Duration;

/// Longest error body kept for diagnostics.
const MAX_ERROR_BODY: usize = 2048;

/// A remote text-generation model: one prompt in, one response envelope out.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<GenerateContentResponse>;

    /// Model identifier string.
    fn model_name(&self) -> &str;
}

/// Optional sampling controls. Unset values are left to the model defaults.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SafetySetting {
    pub category: String,
    pub threshold: String,
}

/// Block medium-and-above probability in the four standard harm categories.
pub fn default_safety_settings() -> Vec<SafetySetting> {
    [
        "HARM_CATEGORY_HARASSMENT",
        "HARM_CATEGORY_HATE_SPEECH",
        "HARM_CATEGORY_SEXUALLY_EXPLICIT",
        "HARM_CATEGORY_DANGEROUS_CONTENT",
    ]
    .into_iter()
    .map(|category| SafetySetting {
        category: category.to_string(),
        threshold: "BLOCK_MEDIUM_AND_ABOVE".to_string(),
    })
    .collect()
}

/// Shared HTTP client construction. Only the connect phase is bounded.
pub(crate) fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .build()
        .map_err(|e| PolymathError::Configuration(format!("HTTP client: {}", e)))
}

pub(crate) async fn read_capped_error_body(response: reqwest::Response) -> String {
    let body = response.text().await.unwrap_or_default();
    if body.chars().count() <= MAX_ERROR_BODY {
        body
    } else {
        format!("{}…", body.chars().take(MAX_ERROR_BODY).collect::<String>())
    }
}

pub(crate) fn model_endpoint(api_base: &str, model: &str, method: &str) -> String {
    format!("{}/models/{}:{}", api_base.trim_end_matches('/'), model, method)
}

/// Non-streaming client for the Gemini `generateContent` endpoint.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    api_base: String,
    model: String,
    settings: Option<GenerationSettings>,
    safety: Vec<SafetySetting>,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        Ok(Self {
            http: http_client()?,
            api_key: api_key.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            model: model.into(),
            settings: None,
            safety: Vec::new(),
        })
    }

    pub fn from_config(config: &GoogleConfig) -> Result<Self> {
        Ok(Self::new(&config.api_key, &config.llm_model)?.with_api_base(&config.api_base))
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn with_generation_settings(mut self, settings: GenerationSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn with_safety_settings(mut self, safety: Vec<SafetySetting>) -> Self {
        self.safety = safety;
        self
    }

    fn request_body(&self, prompt: &str) -> Value {
        let mut body = json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": prompt }]
            }]
        });
        if let Some(settings) = &self.settings {
            body["generationConfig"] = json!(settings);
        }
        if !self.safety.is_empty() {
            body["safetySettings"] = json!(self.safety);
        }
        body
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<GenerateContentResponse> {
        let url = model_endpoint(&self.api_base, &self.model, "generateContent");

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&self.request_body(prompt))
            .send()
            .await
            .map_err(|e| PolymathError::Generation(format!("request to {} failed: {}", self.model, e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = read_capped_error_body(response).await;
            return Err(PolymathError::Generation(format!(
                "{} returned {}: {}",
                self.model, status, error_text
            )));
        }

        response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|e| PolymathError::Generation(format!("undecodable response: {}", e)))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
