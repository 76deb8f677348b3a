pub mod types;
pub mod storage;
pub mod error;
pub mod config;
pub mod llm;
pub mod normalize;
pub mod embedding;
pub mod seed;
pub mod api;

pub use error::{PolymathError, Result};
pub use types::*;
pub use config::{Config, GoogleConfig, Protocol, SurrealConfig};
pub use storage::{Collection, NewRecord, Store, SurrealStore};
pub use llm::{
    GeminiClient, GenerateContentResponse, GenerationGateway, GenerationSettings, TextGenerator,
};
pub use normalize::{extract_response_text, recover_json};
pub use embedding::{embedding_input, EmbeddingService, GeminiEmbedder};
pub use seed::{seed, seed_from_files, SeedData, SeedFailure, SeedReport};
pub use api::{AppContext, ComposedContent, Composer, DebateRequest, EssayRequest};
