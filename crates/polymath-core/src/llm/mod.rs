pub mod envelope;
pub mod gateway;
pub mod gemini;
pub mod prompts;

pub use envelope::GenerateContentResponse;
pub use gateway::GenerationGateway;
pub use gemini::{default_safety_settings, GeminiClient, GenerationSettings, SafetySetting, TextGenerator};
