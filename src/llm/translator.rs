//! Natural-language-to-SQL translation.
//!
//! Asks the model for a single SQLite SELECT statement and vets the reply
//! before anything reaches the database. A refusal, an empty reply, or a
//! reply that is not a SQL statement all resolve to `None` so the caller can
//! fall back to a general answer.

use tracing::debug;

use crate::classify::{classify, StatementKind};
use crate::llm::prompt;
use crate::llm::LlmClient;

/// Removes a surrounding markdown code fence from a model reply.
///
/// Handles both bare and language-tagged fences. Text without a leading
/// fence is returned trimmed.
pub fn strip_code_fences(text: &str) -> String {
    let cleaned = text.trim();
    if !cleaned.starts_with("```") {
        return cleaned.to_string();
    }

    let mut lines: Vec<&str> = cleaned.lines().collect();
    if lines.first().is_some_and(|l| l.starts_with("```")) {
        lines.remove(0);
    }
    if lines.last().is_some_and(|l| l.trim() == "```") {
        lines.pop();
    }
    lines.join("\n").trim().to_string()
}

/// Translates a natural-language request into a vetted SQL statement.
///
/// Returns the statement and its kind, or `None` when the model refuses,
/// replies with something other than SQL, or cannot be reached.
pub async fn translate_to_sql(
    client: &dyn LlmClient,
    user_prompt: &str,
    db_schema: &str,
) -> Option<(String, StatementKind)> {
    let messages = prompt::translate_messages(user_prompt, db_schema);
    let reply = match client
        .complete(&messages, prompt::TRANSLATE_TEMPERATURE)
        .await
    {
        Ok(reply) => reply,
        Err(e) => {
            debug!("SQL translation request failed: {}", e);
            return None;
        }
    };

    let sql = strip_code_fences(&reply);
    if sql.is_empty() {
        return None;
    }
    if sql.to_uppercase() == "CANNOT_CONVERT" {
        debug!("Model declined to translate the request");
        return None;
    }

    match classify(&sql) {
        Some(kind) => Some((sql, kind)),
        None => {
            debug!("Translated reply is not a SQL statement: {}", sql);
            None
        }
    }
}
