use async_trait::async_trait;
use polymath_core::*;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Replays canned model replies in order.
struct CannedModel {
    replies: Mutex<VecDeque<String>>,
}

impl CannedModel {
    fn new(replies: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
        })
    }
}

#[async_trait]
impl TextGenerator for CannedModel {
    async fn generate(&self, _prompt: &str) -> polymath_core::Result<GenerateContentResponse> {
        let Some(text) = self.replies.lock().unwrap().pop_front() else {
            return Err(PolymathError::Generation("HTTP 500".into()));
        };
        Ok(serde_json::from_value(serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": text }] }, "finishReason": "STOP" }]
        }))
        .unwrap())
    }

    fn model_name(&self) -> &str {
        "canned"
    }
}

struct UnitEmbedder;

#[async_trait]
impl EmbeddingService for UnitEmbedder {
    async fn embed(&self, text: &str) -> polymath_core::Result<Embedding> {
        Ok(vec![text.len() as f32, 1.0, 0.0, 0.0])
    }

    fn dimension(&self) -> usize {
        4
    }

    fn model_name(&self) -> &str {
        "unit"
    }
}

fn data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data")
}

async fn seeded_store() -> Arc<SurrealStore> {
    let store = SurrealStore::in_memory("polymath", "integration").await.unwrap();
    let report = seed_from_files(
        &store,
        data_dir().join("fields_of_expertise.json"),
        data_dir().join("experts.json"),
    )
    .await
    .unwrap();
    assert!(report.is_clean());
    Arc::new(store)
}

// ── Seeding ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_seed_bundled_data() {
    let store = seeded_store().await;

    let fields = store.list_fields_of_expertise().await;
    assert_eq!(fields.len(), 6);
    assert!(fields.iter().all(|f| f.id.is_some()));

    let philosophers = store.list_experts_by_field("philosophy").await;
    let mut names: Vec<_> = philosophers.iter().map(|e| e.name.as_str()).collect();
    names.sort();
    assert_eq!(names, vec!["Judith Butler", "Simone de Beauvoir"]);

    let jung = store.find_expert("Carl Jung").await.unwrap().unwrap();
    assert_eq!(jung.expertise.field_name, "psychology");
    assert!(!jung.also_interested_in.is_empty());
}

#[tokio::test]
async fn test_reseeding_replaces_collections() {
    let store = seeded_store().await;
    seed_from_files(
        store.as_ref(),
        data_dir().join("fields_of_expertise.json"),
        data_dir().join("experts.json"),
    )
    .await
    .unwrap();

    assert_eq!(store.count(Collection::FieldOfExpertise).await.unwrap(), 6);
    assert_eq!(store.count(Collection::Expert).await.unwrap(), 5);
}

// ── Composition ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_essay_then_debate_pipeline() {
    let store = seeded_store().await;
    let model = CannedModel::new(&[
        "Sure! ```json\n[{\"topic\": \"Ritual and the moving image\", \"brief_description\": \"Film as trance.\"}]\n```",
        "Maya Deren's essay on ritual, rhythm and the camera as an instrument of possession.",
        "```json\n{\"title\": \"Can grace be performed?\", \"perspective_1_summary\": \"Butler\", \"perspective_2_summary\": \"Aquinas\"}\n```",
        "1. Introduction. 2. Butler. 3. Aquinas. 4. Rebuttals. 5. Conclusion, at some length.",
    ]);
    let ctx = AppContext::new(store.clone(), model, Arc::new(UnitEmbedder));
    let composer = ctx.composer();

    let essay = composer
        .compose_essay(EssayRequest {
            field: "cinematography".into(),
            embed: true,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(essay.content.primary_expert_name, "Maya Deren");
    assert_eq!(essay.content.title_or_topic, "Ritual and the moving image");
    assert!(essay.embedded);

    let debate = composer
        .compose_debate(DebateRequest {
            field_1: "philosophy".into(),
            field_2: "theology".into(),
            expert_1: Some("Judith Butler".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(debate.content.secondary_expert_name.as_deref(), Some("Thomas Aquinas"));
    assert!(!debate.embedded);

    let listed = store.list_generated_content(10).await.unwrap();
    assert_eq!(listed.len(), 2);
    for item in &listed {
        item.validate().unwrap();
    }
    let stored_essay = listed
        .iter()
        .find(|c| c.content_type == ContentType::Essay)
        .unwrap();
    assert_eq!(stored_essay.vector_embedding.as_ref().map(|v| v.len()), Some(4));
}

#[tokio::test]
async fn test_model_failure_surfaces_as_generation_error() {
    let store = seeded_store().await;
    let ctx = AppContext::new(store.clone(), CannedModel::new(&[]), Arc::new(UnitEmbedder));

    let err = ctx
        .composer()
        .compose_essay(EssayRequest {
            field: "psychology".into(),
            topic: Some("Synchronicity".into()),
            ..Default::default()
        })
        .await
        .unwrap_err();

    assert!(matches!(err, PolymathError::Generation(_)));
    assert_eq!(store.count(Collection::GeneratedContent).await.unwrap(), 0);
}

// ── Binary ───────────────────────────────────────────────────────────────────

#[test]
fn test_binary_is_named_polymath() {
    let output = std::process::Command::new(env!("CARGO_BIN_EXE_polymath"))
        .arg("--version")
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("polymath "), "unexpected version line: {stdout}");
}
