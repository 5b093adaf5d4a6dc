//! Prompt assembly for constrained SQL generation.
//!
//! The system message embeds the full schema verbatim and spells out the
//! output rules (single SELECT, mandatory bounding clause, no wildcard
//! projection, inner joins only, dialect-appropriate date functions, reply
//! is one ```sql fenced block and nothing else). The user message carries
//! the dialect name and the raw request.

use itertools::Itertools;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::dialect::Dialect;
use crate::error::{Result, Text2SqlError};
use crate::generator::GenerationRequest;
use crate::llm::PromptMessage;

pub const DEFAULT_ROW_LIMIT: u32 = 100;

lazy_static! {
    static ref QUANTITY_RE: Regex = Regex::new(r"\b(\d{1,7})\b").unwrap();
}

/// First explicit positive integer in the user query, if any. "show the 5
/// most recent orders" -> Some(5). Years and other large numbers are still
/// treated as quantities; the model sees the raw request alongside this and
/// the bound is a ceiling, not a target.
pub fn requested_row_limit(user_query: &str) -> Option<u32> {
    QUANTITY_RE
        .captures(user_query)
        .and_then(|caps| caps[1].parse::<u32>().ok())
        .filter(|n| *n > 0)
}

pub fn resolve_row_limit(user_query: &str) -> u32 {
    requested_row_limit(user_query).unwrap_or(DEFAULT_ROW_LIMIT)
}

/// Build the two role-tagged messages for one generation call.
pub fn build_prompt_messages(request: &GenerationRequest) -> Result<Vec<PromptMessage>> {
    if request.schema.is_empty() {
        return Err(Text2SqlError::EmptySchema);
    }

    let limit = resolve_row_limit(&request.user_query);
    debug!(
        "Assembling prompt: dialect={}, tables={}, row_limit={}",
        request.dialect,
        request.schema.len(),
        limit
    );

    let system = build_system_prompt(request.dialect, &request.schema, limit);
    let user = format!(
        "The database dialect is {}. The data request is: {}",
        request.dialect, request.user_query
    );

    Ok(vec![
        PromptMessage::system(system),
        PromptMessage::user(user),
    ])
}

fn build_system_prompt(
    dialect: Dialect,
    schema: &crate::schema::SchemaMap,
    limit: u32,
) -> String {
    let policy = dialect.policy();
    let ddl = schema.values().join("\n\n");
    let bounding = dialect.bounding_clause(limit);

    format!(
        r#"You are a senior database engineer and SQL optimization expert with over ten years of DBA experience. Given the database dialect, the DDL metadata below, and a natural-language data request, produce one enterprise-grade SQL statement.

## Database schema (DDL metadata)

{ddl}

## Hard requirements

1. Reference only tables and fields declared in the DDL metadata above. Never invent tables or fields.
2. Return exactly one SELECT statement. INSERT, UPDATE, DELETE and all other DML or DDL are forbidden.
3. A row-bounding clause is mandatory to limit the result size. For {dialect} use: {bounding}
4. Do not use wildcard projection (SELECT *). Project only the fields the request needs.
5. Date and time expressions must use {dialect} functions: {date_fn} for the current date, {ts_fn} for the current timestamp.
6. When joining tables, use INNER JOIN only. LEFT and RIGHT joins are forbidden.
7. Prefer an index-friendly query shape: {index_guidance}.
8. Identifiers follow {dialect} quoting conventions ({quote}).

## Response format

Reply with the SQL statement inside a single ```sql fenced block and nothing else. No commentary, no DDL echo, no escape characters, no text before or after the block.

## Output example ({dialect})

{example}"#,
        ddl = ddl,
        dialect = dialect,
        bounding = bounding,
        date_fn = policy.current_date_fn,
        ts_fn = policy.current_timestamp_fn,
        index_guidance = policy.index_guidance,
        quote = policy.identifier_quote,
        example = output_example(dialect),
    )
}

fn output_example(dialect: Dialect) -> &'static str {
    match dialect {
        Dialect::MySql => {
            r#"```sql
SELECT
    o.`order_id`,
    o.`amount` * 1.05 AS amount_with_tax
FROM
    `orders` o
INNER JOIN
    `customers` c ON o.`customer_id` = c.`id`
WHERE
    o.`status` = 'paid'
    AND c.`region` = 'Asia'
    AND o.`created_at` BETWEEN '2025-01-01' AND CURDATE()
LIMIT 100;
```"#
        }
        Dialect::PostgreSql => {
            r#"```sql
SELECT
    o."order_id",
    o."amount" * 1.05 AS amount_with_tax
FROM
    "orders" o
INNER JOIN
    "customers" c ON o."customer_id" = c."id"
WHERE
    o."status" = 'paid'
    AND c."region" = 'Asia'
    AND o."created_at" BETWEEN '2025-01-01' AND CURRENT_DATE
FETCH FIRST 100 ROWS ONLY;
```"#
        }
        Dialect::Oracle => {
            r#"```sql
SELECT
    o."order_id",
    o."amount" * 1.05 AS amount_with_tax
FROM
    "orders" o
INNER JOIN
    "customers" c ON o."customer_id" = c."id"
WHERE
    o."status" = 'paid'
    AND c."region" = 'Asia'
    AND o."created_at" BETWEEN DATE '2025-01-01' AND SYSDATE
    AND ROWNUM <= 100;
```"#
        }
        Dialect::SqlServer => {
            r#"```sql
SELECT TOP 100
    o."order_id",
    o."amount" * 1.05 AS amount_with_tax
FROM
    "orders" o
INNER JOIN
    "customers" c ON o."customer_id" = c."id"
WHERE
    o."status" = 'paid'
    AND c."region" = 'Asia'
    AND o."created_at" BETWEEN '2025-01-01' AND GETDATE();
```"#
        }
    }
}
