//! Example: seed an in-memory store and compose a debate without network access
//!
//! Run with: cargo run -p polymath-core --example offline_debate --features mem

use async_trait::async_trait;
use polymath_core::*;
use std::sync::Arc;

/// Answers every title request with the same title and every debate request with a stub.
struct OfflineModel;

#[async_trait]
impl TextGenerator for OfflineModel {
    async fn generate(&self, prompt: &str) -> Result<GenerateContentResponse> {
        let text = if prompt.contains("\"title\"") {
            "```json\n{\"title\": \"Is the unconscious a theological category?\"}\n```".to_string()
        } else {
            format!("(debate text for a {}-character prompt)", prompt.len())
        };
        Ok(serde_json::from_value(serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": text }] } }]
        }))?)
    }

    fn model_name(&self) -> &str {
        "offline"
    }
}

struct ZeroEmbedder;

#[async_trait]
impl EmbeddingService for ZeroEmbedder {
    async fn embed(&self, _text: &str) -> Result<Embedding> {
        Ok(vec![0.0; 8])
    }

    fn dimension(&self) -> usize {
        8
    }

    fn model_name(&self) -> &str {
        "zero"
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    let store = SurrealStore::in_memory("polymath", "demo").await?;
    let data_dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data");
    let report = seed_from_files(
        &store,
        data_dir.join("fields_of_expertise.json"),
        data_dir.join("experts.json"),
    )
    .await?;
    println!(
        "Seeded {} fields and {} experts",
        report.fields_inserted, report.experts_inserted
    );

    let ctx = AppContext::new(Arc::new(store), Arc::new(OfflineModel), Arc::new(ZeroEmbedder));
    let composed = ctx
        .composer()
        .compose_debate(DebateRequest {
            field_1: "psychology".into(),
            field_2: "theology".into(),
            embed: true,
            ..Default::default()
        })
        .await?;

    let content = &composed.content;
    println!("{} ({})", content.title_or_topic, composed.id);
    println!(
        "{} vs {}",
        content.primary_expert_name,
        content.secondary_expert_name.as_deref().unwrap_or("?")
    );
    println!("{}", content.content);
    Ok(())
}
