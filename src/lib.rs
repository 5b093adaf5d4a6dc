pub mod dialect;
pub mod error;
pub mod extract;
pub mod generator;
pub mod llm;
pub mod prompt;
pub mod schema;
pub mod validate;

pub use dialect::Dialect;
pub use error::{Result, Text2SqlError};
pub use generator::{GenerationRequest, GenerationResult, SqlGenerator};
pub use llm::{ChatModel, LlmClient, ModelConfig, PromptMessage};
pub use schema::{ConnectionParams, SchemaInspector, SchemaMap, SqlxInspector};
