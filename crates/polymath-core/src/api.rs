//! Application-level entry points.
//!
//! [`AppContext`] owns the long-lived clients for one process.
//! [`Composer`] turns a field (or two) into stored, optionally embedded content.

use crate::config::Config;
use crate::embedding::{embedding_input, EmbeddingService, GeminiEmbedder};
use crate::error::{PolymathError, Result};
use crate::llm::{GeminiClient, GenerationGateway, TextGenerator};
use crate::storage::{Store, SurrealStore};
use crate::types::{Expert, FieldOfExpertise, GeneratedContent, LlmTopicSuggestion};
use rand::seq::SliceRandom;
use std::sync::Arc;

/// Shared clients, built once at process start and passed explicitly.
#[derive(Clone)]
pub struct AppContext {
    pub store: Arc<dyn Store>,
    pub generator: Arc<dyn TextGenerator>,
    pub embedder: Arc<dyn EmbeddingService>,
}

impl AppContext {
    pub fn new(
        store: Arc<dyn Store>,
        generator: Arc<dyn TextGenerator>,
        embedder: Arc<dyn EmbeddingService>,
    ) -> Self {
        Self {
            store,
            generator,
            embedder,
        }
    }

    /// Connect to the store and build the Gemini clients.
    pub async fn connect(config: &Config) -> Result<Self> {
        let store = SurrealStore::connect(&config.surreal).await?;
        let generator = GeminiClient::from_config(&config.google)?;
        let embedder = GeminiEmbedder::from_config(&config.google)?;
        log::info!(
            "Using LLM {} and embedding model {}",
            generator.model_name(),
            embedder.model_name()
        );
        Ok(Self::new(Arc::new(store), Arc::new(generator), Arc::new(embedder)))
    }

    pub fn gateway(&self) -> GenerationGateway {
        GenerationGateway::new(self.generator.clone())
    }

    pub fn composer(&self) -> Composer {
        Composer::new(self.clone())
    }
}

#[derive(Debug, Clone, Default)]
pub struct EssayRequest {
    pub field: String,
    /// Picked at random from the field when unset.
    pub expert: Option<String>,
    /// Taken from the first model suggestion when unset.
    pub topic: Option<String>,
    pub embed: bool,
}

#[derive(Debug, Clone, Default)]
pub struct DebateRequest {
    pub field_1: String,
    pub field_2: String,
    pub expert_1: Option<String>,
    pub expert_2: Option<String>,
    pub title: Option<String>,
    pub embed: bool,
}

/// A persisted essay or debate.
#[derive(Debug, Clone)]
pub struct ComposedContent {
    pub id: String,
    pub content: GeneratedContent,
    pub embedded: bool,
}

pub struct Composer {
    ctx: AppContext,
    gateway: GenerationGateway,
}

impl Composer {
    pub fn new(ctx: AppContext) -> Self {
        let gateway = ctx.gateway();
        Self { ctx, gateway }
    }

    /// Topic suggestions for a field, from the named or a random expert.
    pub async fn suggest_topics(
        &self,
        field_name: &str,
        expert_name: Option<&str>,
    ) -> Result<(Expert, Vec<LlmTopicSuggestion>)> {
        let field = self.resolve_field(field_name).await?;
        let expert = self.resolve_expert(&field, expert_name, None).await?;
        let topics = self
            .gateway
            .suggest_essay_topics(&field, &expert)
            .await
            .ok_or_else(|| PolymathError::Generation("no essay topics could be suggested".into()))?;
        Ok((expert, topics))
    }

    pub async fn compose_essay(&self, request: EssayRequest) -> Result<ComposedContent> {
        let field = self.resolve_field(&request.field).await?;
        let expert = self
            .resolve_expert(&field, request.expert.as_deref(), None)
            .await?;

        let topic = match request.topic {
            Some(topic) => topic,
            None => self
                .gateway
                .suggest_essay_topics(&field, &expert)
                .await
                .and_then(|topics| topics.into_iter().next())
                .map(|suggestion| suggestion.topic)
                .ok_or_else(|| PolymathError::Generation("no essay topic could be suggested".into()))?,
        };

        let text = self
            .gateway
            .write_essay(&topic, &field, &expert)
            .await
            .ok_or_else(|| PolymathError::Generation(format!("essay on \"{}\" was not written", topic)))?;

        let content = GeneratedContent::essay(topic, text, &field, &expert);
        self.persist(content, request.embed).await
    }

    pub async fn compose_debate(&self, request: DebateRequest) -> Result<ComposedContent> {
        let field_1 = self.resolve_field(&request.field_1).await?;
        let field_2 = self.resolve_field(&request.field_2).await?;
        let expert_1 = self
            .resolve_expert(&field_1, request.expert_1.as_deref(), request.expert_2.as_deref())
            .await?;
        let expert_2 = self
            .resolve_expert(&field_2, request.expert_2.as_deref(), Some(&expert_1.name))
            .await?;

        let title = match request.title {
            Some(title) => title,
            None => self
                .gateway
                .suggest_debate_topic(&field_1, &expert_1, &field_2, &expert_2)
                .await
                .map(|suggestion| suggestion.title)
                .ok_or_else(|| PolymathError::Generation("no debate title could be suggested".into()))?,
        };

        let text = self
            .gateway
            .write_debate(&title, &field_1, &expert_1, &field_2, &expert_2)
            .await
            .ok_or_else(|| PolymathError::Generation(format!("debate \"{}\" was not written", title)))?;

        let content =
            GeneratedContent::debate(title, text, (&field_1, &expert_1), (&field_2, &expert_2));
        self.persist(content, request.embed).await
    }

    /// Compute and attach an embedding to stored content. Returns the vector length.
    pub async fn embed_content(&self, id: &str) -> Result<usize> {
        let content = self
            .ctx
            .store
            .get_generated_content(id)
            .await?
            .ok_or_else(|| PolymathError::Validation(format!("No content with id {}", id)))?;
        let vector = self.embed_saved(id, &content).await?;
        log::info!("Attached {}-dimensional embedding to {}", vector.len(), id);
        Ok(vector.len())
    }

    async fn persist(&self, mut content: GeneratedContent, embed: bool) -> Result<ComposedContent> {
        let id = self.ctx.store.save_generated_content(&content).await?;
        log::info!("Saved {} \"{}\" as {}", content.content_type, content.title_or_topic, id);
        content.id = Some(id.clone());

        let mut embedded = false;
        if embed {
            match self.embed_saved(&id, &content).await {
                Ok(vector) => {
                    content.vector_embedding = Some(vector);
                    embedded = true;
                }
                Err(e) => log::warn!("Content {} saved without embedding: {}", id, e),
            }
        }

        Ok(ComposedContent {
            id,
            content,
            embedded,
        })
    }

    async fn embed_saved(&self, id: &str, content: &GeneratedContent) -> Result<Vec<f32>> {
        let vector = self.ctx.embedder.embed(&embedding_input(content)).await?;
        self.ctx.store.update_content_embedding(id, &vector).await?;
        Ok(vector)
    }

    async fn resolve_field(&self, name: &str) -> Result<FieldOfExpertise> {
        self.ctx
            .store
            .find_field(name)
            .await?
            .ok_or_else(|| PolymathError::Validation(format!("Unknown field of expertise: {}", name)))
    }

    /// The named expert, or a random expert of `field` other than `exclude`.
    async fn resolve_expert(
        &self,
        field: &FieldOfExpertise,
        name: Option<&str>,
        exclude: Option<&str>,
    ) -> Result<Expert> {
        if let Some(name) = name {
            if exclude == Some(name) {
                return Err(PolymathError::Validation(format!(
                    "{} cannot debate themselves",
                    name
                )));
            }
            let expert = self
                .ctx
                .store
                .find_expert(name)
                .await?
                .ok_or_else(|| PolymathError::Validation(format!("Unknown expert: {}", name)))?;
            if expert.expertise.field_name != field.name {
                return Err(PolymathError::Validation(format!(
                    "{} is an expert in {}, not {}",
                    expert.name, expert.expertise.field_name, field.name
                )));
            }
            return Ok(expert);
        }

        let candidates: Vec<Expert> = self
            .ctx
            .store
            .try_list_experts_by_field(&field.name)
            .await?
            .into_iter()
            .filter(|e| Some(e.name.as_str()) != exclude)
            .collect();
        pick_random(&candidates)
            .ok_or_else(|| PolymathError::Validation(format!("No available experts in {}", field.name)))
    }
}

fn pick_random(experts: &[Expert]) -> Option<Expert> {
    experts.choose(&mut rand::thread_rng()).cloned()
}
