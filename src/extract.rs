//! Best-effort extraction of the SQL text from a raw model reply.
//!
//! The contract with the model is one ```sql fenced block and nothing else.
//! Extraction takes the first such block, trimmed; anything else yields the
//! empty string. No bare-SELECT fallback: a reply without the fence is
//! indistinguishable from a refusal and is treated as "no extractable SQL".

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref SQL_FENCE_RE: Regex =
        Regex::new(r"(?s)```sql\s*(.*?)\s*```").unwrap();
}

/// First ```sql fenced block in `text`, whitespace-trimmed; empty string if
/// no fence is present. Purely syntactic and idempotent.
pub fn extract_sql(text: &str) -> String {
    SQL_FENCE_RE
        .captures(text)
        .map(|caps| caps[1].trim().to_string())
        .unwrap_or_default()
}
