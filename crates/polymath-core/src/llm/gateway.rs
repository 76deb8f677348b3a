use crate::llm::gemini::TextGenerator;
use crate::llm::prompts;
use crate::normalize::{extract_response_text, recover_json_value};
use crate::types::{Expert, FieldOfExpertise, LlmDebateTitleSuggestion, LlmTopicSuggestion};
use std::sync::Arc;

/// Generated text this short is logged as suspicious (but still returned).
pub const MIN_PLAUSIBLE_LENGTH: usize = 50;

/// Prompt-level operations over a [`TextGenerator`].
///
/// Every operation returns `None` instead of an error. The cause is logged here.
#[derive(Clone)]
pub struct GenerationGateway {
    generator: Arc<dyn TextGenerator>,
}

impl GenerationGateway {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    pub fn model_name(&self) -> &str {
        self.generator.model_name()
    }

    async fn generate_text(&self, prompt: &str, purpose: &str) -> Option<String> {
        match self.generator.generate(prompt).await {
            Ok(response) => extract_response_text(Some(&response)),
            Err(e) => {
                log::error!("Error {} from LLM: {}", purpose, e);
                None
            }
        }
    }

    pub async fn suggest_essay_topics(
        &self,
        field: &FieldOfExpertise,
        expert: &Expert,
    ) -> Option<Vec<LlmTopicSuggestion>> {
        log::info!("Requesting essay topics for {} / {}...", field.name, expert.name);
        let prompt = prompts::essay_topics(field, expert);
        let text = self.generate_text(&prompt, "getting essay topic suggestions").await?;

        let value = recover_json_value(Some(&text))?;
        if !value.is_array() {
            log::error!("Parsed response for essay topics is not an array: {}", value);
            log::error!("Original text: {}", text);
            return None;
        }

        match serde_json::from_value::<Vec<LlmTopicSuggestion>>(value) {
            Ok(suggestions) => {
                log::info!("Received {} essay topic suggestions.", suggestions.len());
                Some(suggestions)
            }
            Err(e) => {
                log::error!("Essay topic suggestions have an unexpected shape: {}", e);
                log::error!("Original text: {}", text);
                None
            }
        }
    }

    pub async fn suggest_debate_topic(
        &self,
        field_1: &FieldOfExpertise,
        expert_1: &Expert,
        field_2: &FieldOfExpertise,
        expert_2: &Expert,
    ) -> Option<LlmDebateTitleSuggestion> {
        log::info!(
            "Requesting debate topic for {} vs {}...",
            expert_1.name,
            expert_2.name
        );
        let prompt = prompts::debate_topic(field_1, expert_1, field_2, expert_2);
        let text = self.generate_text(&prompt, "getting debate topic").await?;

        let value = recover_json_value(Some(&text))?;
        let has_title = value
            .get("title")
            .and_then(|t| t.as_str())
            .is_some_and(|t| !t.is_empty());
        if !has_title {
            log::error!("Parsed response for debate topic lacks a title: {}", value);
            log::error!("Original text: {}", text);
            return None;
        }

        match serde_json::from_value::<LlmDebateTitleSuggestion>(value) {
            Ok(suggestion) => {
                log::info!("Received debate title: {}", suggestion.title);
                Some(suggestion)
            }
            Err(e) => {
                log::error!("Debate topic has an unexpected shape: {}", e);
                None
            }
        }
    }

    pub async fn write_essay(
        &self,
        topic: &str,
        field: &FieldOfExpertise,
        expert: &Expert,
    ) -> Option<String> {
        log::info!("Generating essay on \"{}\" from {}'s perspective...", topic, expert.name);
        let prompt = prompts::essay(topic, field, expert);
        let Some(text) = self.generate_text(&prompt, "generating essay").await else {
            log::error!("Failed to generate essay text or received empty/blocked response.");
            return None;
        };
        log_length("essay", &text);
        Some(text)
    }

    pub async fn write_debate(
        &self,
        title: &str,
        field_1: &FieldOfExpertise,
        expert_1: &Expert,
        field_2: &FieldOfExpertise,
        expert_2: &Expert,
    ) -> Option<String> {
        log::info!(
            "Generating debate for \"{}\" ({} vs {})...",
            title,
            expert_1.name,
            expert_2.name
        );
        let prompt = prompts::debate(title, field_1, expert_1, field_2, expert_2);
        let Some(text) = self.generate_text(&prompt, "generating debate").await else {
            log::error!("Failed to generate debate text or received empty/blocked response.");
            return None;
        };
        log_length("debate", &text);
        Some(text)
    }
}

fn log_length(kind: &str, text: &str) {
    let length = text.chars().count();
    if length > MIN_PLAUSIBLE_LENGTH {
        log::info!("Generated {} successfully (length: {}).", kind, length);
    } else {
        log::warn!("Generated {} seems very short (length: {}). Might be an issue.", kind, length);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::{PolymathError, Result};
    use crate::llm::envelope::GenerateContentResponse;
    use crate::types::ExpertiseRef;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned outcomes in order and records the prompts it was given.
    pub(crate) struct ScriptedGenerator {
        replies: Mutex<VecDeque<Result<GenerateContentResponse>>>,
        pub(crate) prompts: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        pub(crate) fn new(replies: Vec<Result<GenerateContentResponse>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, prompt: &str) -> Result<GenerateContentResponse> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(PolymathError::Generation("no scripted reply".into())))
        }

        fn model_name(&self) -> &str {
            "scripted"
        }
    }

    pub(crate) fn text_reply(text: &str) -> Result<GenerateContentResponse> {
        Ok(serde_json::from_value(json!({
            "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] }, "finishReason": "STOP" }]
        }))
        .unwrap())
    }

    pub(crate) fn blocked_reply() -> Result<GenerateContentResponse> {
        Ok(serde_json::from_value(json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        }))
        .unwrap())
    }

    fn jung() -> (FieldOfExpertise, Expert) {
        (
            FieldOfExpertise::new("psychology", vec!["Psychoanalysis".into()]),
            Expert::new("Carl Jung", ExpertiseRef::new("psychology", "Psychoanalysis")),
        )
    }

    fn aquinas() -> (FieldOfExpertise, Expert) {
        (
            FieldOfExpertise::new("theology", vec!["Systematic Theology".into()]),
            Expert::new("Thomas Aquinas", ExpertiseRef::new("theology", "Systematic Theology")),
        )
    }

    #[tokio::test]
    async fn test_essay_topics_from_fenced_array() {
        let generator = ScriptedGenerator::new(vec![text_reply(
            "```json\n[{\"topic\": \"Shadow work\", \"brief_description\": \"Why it matters.\"}, {\"topic\": \"Dreams\"}]\n```",
        )]);
        let gateway = GenerationGateway::new(generator.clone());
        let (field, expert) = jung();

        let topics = gateway.suggest_essay_topics(&field, &expert).await.unwrap();

        assert_eq!(topics.len(), 2);
        assert_eq!(topics[0].topic, "Shadow work");
        assert_eq!(topics[1].brief_description, None);
        assert!(generator.prompts.lock().unwrap()[0].contains("Carl Jung"));
    }

    #[tokio::test]
    async fn test_essay_topics_not_array() {
        let generator = ScriptedGenerator::new(vec![text_reply("{\"topic\": \"Only one\"}")]);
        let gateway = GenerationGateway::new(generator);
        let (field, expert) = jung();

        assert!(gateway.suggest_essay_topics(&field, &expert).await.is_none());
    }

    #[tokio::test]
    async fn test_essay_topics_call_failure() {
        init_logs();
        let generator = ScriptedGenerator::new(vec![Err(PolymathError::Generation("boom".into()))]);
        let gateway = GenerationGateway::new(generator);
        let (field, expert) = jung();

        assert!(gateway.suggest_essay_topics(&field, &expert).await.is_none());
    }

    #[tokio::test]
    async fn test_debate_topic_requires_title() {
        let generator = ScriptedGenerator::new(vec![
            text_reply("{\"title\": \"\", \"perspective_1_summary\": \"x\"}"),
            text_reply("{\"perspective_1_summary\": \"x\"}"),
            text_reply("```json\n{\"title\": \"Reason or revelation?\", \"perspective_2_summary\": \"Faith.\"}\n```"),
        ]);
        let gateway = GenerationGateway::new(generator);
        let (f1, e1) = jung();
        let (f2, e2) = aquinas();

        assert!(gateway.suggest_debate_topic(&f1, &e1, &f2, &e2).await.is_none());
        assert!(gateway.suggest_debate_topic(&f1, &e1, &f2, &e2).await.is_none());

        let suggestion = gateway.suggest_debate_topic(&f1, &e1, &f2, &e2).await.unwrap();
        assert_eq!(suggestion.title, "Reason or revelation?");
        assert_eq!(suggestion.perspective_1_summary, None);
        assert_eq!(suggestion.perspective_2_summary.as_deref(), Some("Faith."));
    }

    #[tokio::test]
    async fn test_debate_topic_keeps_whitespace_title() {
        let generator = ScriptedGenerator::new(vec![text_reply("{\"title\": \" \"}")]);
        let gateway = GenerationGateway::new(generator);
        let (f1, e1) = jung();
        let (f2, e2) = aquinas();

        let suggestion = gateway.suggest_debate_topic(&f1, &e1, &f2, &e2).await.unwrap();
        assert_eq!(suggestion.title, " ");
    }

    #[tokio::test]
    async fn test_short_essay_still_returned() {
        let generator = ScriptedGenerator::new(vec![text_reply("Too short.")]);
        let gateway = GenerationGateway::new(generator);
        let (field, expert) = jung();

        let essay = gateway.write_essay("Shadow work", &field, &expert).await;
        assert_eq!(essay.as_deref(), Some("Too short."));
    }

    fn init_logs() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[tokio::test]
    async fn test_blocked_response_is_none_everywhere() {
        init_logs();
        let generator = ScriptedGenerator::new(vec![
            blocked_reply(),
            blocked_reply(),
            blocked_reply(),
            blocked_reply(),
        ]);
        let gateway = GenerationGateway::new(generator);
        let (f1, e1) = jung();
        let (f2, e2) = aquinas();

        assert!(gateway.suggest_essay_topics(&f1, &e1).await.is_none());
        assert!(gateway.suggest_debate_topic(&f1, &e1, &f2, &e2).await.is_none());
        assert!(gateway.write_essay("t", &f1, &e1).await.is_none());
        assert!(gateway.write_debate("t", &f1, &e1, &f2, &e2).await.is_none());
    }

    #[tokio::test]
    async fn test_write_debate_returns_text() {
        let body = "Introduction. ".repeat(10);
        let generator = ScriptedGenerator::new(vec![text_reply(&body)]);
        let gateway = GenerationGateway::new(generator.clone());
        let (f1, e1) = jung();
        let (f2, e2) = aquinas();

        let debate = gateway.write_debate("Reason or revelation?", &f1, &e1, &f2, &e2).await;
        assert_eq!(debate.as_deref(), Some(body.as_str()));
        assert!(generator.prompts.lock().unwrap()[0].contains("Thomas Aquinas"));
    }
}
