//! The constrained SQL generator: prompt assembly, one model call,
//! extraction, validation. Strict sequence, no retries, no regeneration.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::dialect::Dialect;
use crate::error::Result;
use crate::extract::extract_sql;
use crate::llm::{ChatModel, ModelConfig};
use crate::prompt::build_prompt_messages;
use crate::schema::SchemaMap;
use crate::validate::validate_statement;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub dialect: Dialect,
    pub user_query: String,
    pub schema: SchemaMap,
    pub model: ModelConfig,
}

/// Either a validated SELECT statement or the empty string meaning the
/// model's reply carried no extractable SQL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub sql: String,
}

impl GenerationResult {
    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }
}

pub struct SqlGenerator<M: ChatModel> {
    model: M,
}

impl<M: ChatModel> SqlGenerator<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }

    /// Run one generation. An extraction miss (no fenced SQL in the reply)
    /// is not an error and yields an empty result; an extracted statement
    /// that violates the safety rules is a `Validation` error.
    pub async fn generate(&self, request: GenerationRequest) -> Result<GenerationResult> {
        let messages = build_prompt_messages(&request)?;

        info!(
            "Generating {} SQL for request: {}",
            request.dialect, request.user_query
        );
        let reply = self.model.chat(&request.model, &messages).await?;

        let sql = extract_sql(&reply);
        if sql.is_empty() {
            warn!("Model reply contained no fenced SQL block");
            return Ok(GenerationResult { sql });
        }

        validate_statement(&sql, request.dialect, &request.schema)?;
        info!("Generated SQL: {}", sql);
        Ok(GenerationResult { sql })
    }
}
