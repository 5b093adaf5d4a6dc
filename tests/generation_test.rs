//! End-to-end generation scenarios driven through a canned model, no live
//! database or model provider required.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use text2sql::generator::{GenerationRequest, SqlGenerator};
use text2sql::llm::{ChatModel, ModelConfig, PromptMessage, Role};
use text2sql::prompt::build_prompt_messages;
use text2sql::schema::SchemaMap;
use text2sql::{Dialect, Text2SqlError};

struct CannedModel {
    reply: String,
    seen: Arc<Mutex<Vec<PromptMessage>>>,
}

impl CannedModel {
    fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl ChatModel for CannedModel {
    async fn chat(
        &self,
        _config: &ModelConfig,
        messages: &[PromptMessage],
    ) -> text2sql::Result<String> {
        self.seen.lock().unwrap().extend_from_slice(messages);
        Ok(self.reply.clone())
    }
}

fn orders_schema() -> SchemaMap {
    let mut schema = SchemaMap::new();
    schema.insert(
        "orders".to_string(),
        "CREATE TABLE orders (\n  id INT,\n  created_at DATETIME,\n  amount DECIMAL\n);"
            .to_string(),
    );
    schema
}

fn request(dialect: Dialect, query: &str) -> GenerationRequest {
    GenerationRequest {
        dialect,
        user_query: query.to_string(),
        schema: orders_schema(),
        model: ModelConfig::new("openai", "gpt-4", "test-key"),
    }
}

#[test]
fn mysql_stated_quantity_becomes_limit_5() {
    let req = request(Dialect::MySql, "show the 5 most recent orders");
    let messages = build_prompt_messages(&req).unwrap();
    assert!(messages[0].content.contains("use: LIMIT 5"));
    assert!(!messages[0].content.contains("use: LIMIT 100"));
}

#[test]
fn postgres_defaults_to_fetch_first_100() {
    let req = request(Dialect::PostgreSql, "show recent orders");
    let messages = build_prompt_messages(&req).unwrap();
    assert!(messages[0]
        .content
        .contains("use: FETCH FIRST 100 ROWS ONLY"));
}

#[test]
fn prompt_embeds_schema_and_tags_roles() {
    let req = request(Dialect::MySql, "total order amount");
    let messages = build_prompt_messages(&req).unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, Role::System);
    assert_eq!(messages[1].role, Role::User);
    assert!(messages[0]
        .content
        .contains("CREATE TABLE orders (\n  id INT,\n  created_at DATETIME,\n  amount DECIMAL\n);"));
    assert!(messages[1].content.contains("total order amount"));
}

#[test]
fn unsupported_dialect_string_is_rejected() {
    let err = "db2".parse::<Dialect>().unwrap_err();
    assert!(matches!(err, Text2SqlError::UnsupportedDialect(ref s) if s == "db2"));
}

#[tokio::test]
async fn full_pipeline_returns_validated_statement() {
    let model = CannedModel::new(
        "```sql\nSELECT id, amount FROM orders ORDER BY created_at DESC LIMIT 5\n```",
    );
    let generator = SqlGenerator::new(model);
    let result = generator
        .generate(request(Dialect::MySql, "show the 5 most recent orders"))
        .await
        .unwrap();
    assert_eq!(
        result.sql,
        "SELECT id, amount FROM orders ORDER BY created_at DESC LIMIT 5"
    );
}

#[tokio::test]
async fn commentary_around_fence_is_stripped() {
    let model = CannedModel::new(
        "Sure! Here is the query you asked for:\n```sql\nSELECT id FROM orders LIMIT 10\n```\nLet me know if you need anything else.",
    );
    let generator = SqlGenerator::new(model);
    let result = generator
        .generate(request(Dialect::MySql, "first 10 order ids"))
        .await
        .unwrap();
    assert_eq!(result.sql, "SELECT id FROM orders LIMIT 10");
}

#[tokio::test]
async fn reply_without_fence_yields_empty_result() {
    let model = CannedModel::new("I am unable to produce that query.");
    let generator = SqlGenerator::new(model);
    let result = generator
        .generate(request(Dialect::MySql, "recent orders"))
        .await
        .unwrap();
    assert!(result.is_empty());
}

#[tokio::test]
async fn unbounded_statement_is_a_validation_error() {
    let model = CannedModel::new("```sql\nSELECT id, amount FROM orders\n```");
    let generator = SqlGenerator::new(model);
    let err = generator
        .generate(request(Dialect::MySql, "all orders"))
        .await
        .unwrap_err();
    assert!(matches!(err, Text2SqlError::Validation(_)));
}

#[tokio::test]
async fn statement_over_undeclared_table_is_a_validation_error() {
    let model = CannedModel::new("```sql\nSELECT id FROM invoices LIMIT 10\n```");
    let generator = SqlGenerator::new(model);
    let err = generator
        .generate(request(Dialect::MySql, "recent invoices"))
        .await
        .unwrap_err();
    assert!(matches!(err, Text2SqlError::Validation(_)));
}

#[tokio::test]
async fn undeclared_table_in_where_subquery_is_a_validation_error() {
    let model = CannedModel::new(
        "```sql\nSELECT id FROM orders WHERE customer_id IN (SELECT id FROM archived_users) LIMIT 5\n```",
    );
    let generator = SqlGenerator::new(model);
    let err = generator
        .generate(request(Dialect::MySql, "orders from archived customers"))
        .await
        .unwrap_err();
    assert!(matches!(err, Text2SqlError::Validation(_)));
}

#[tokio::test]
async fn empty_schema_never_reaches_the_model() {
    let model = CannedModel::new("```sql\nSELECT 1\n```");
    let seen = Arc::clone(&model.seen);
    let generator = SqlGenerator::new(model);
    let mut req = request(Dialect::MySql, "anything");
    req.schema = SchemaMap::new();
    let err = generator.generate(req).await.unwrap_err();
    assert!(matches!(err, Text2SqlError::EmptySchema));
    assert!(seen.lock().unwrap().is_empty());
}
