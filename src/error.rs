use thiserror::Error;

use crate::validate::ValidationError;

#[derive(Error, Debug)]
pub enum Text2SqlError {
    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Unsupported database type for introspection: {0}")]
    UnsupportedDatabase(String),

    #[error("Unsupported SQL dialect: {0}")]
    UnsupportedDialect(String),

    #[error("Schema contains no tables; nothing to ground a query against")]
    EmptySchema,

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Generated SQL failed validation: {0}")]
    Validation(#[from] ValidationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Text2SqlError>;
