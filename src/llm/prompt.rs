//! Prompt construction for the three model calls the service makes.
//!
//! Each call pairs a fixed system prompt with a purpose-specific sampling
//! temperature: deterministic for SQL translation, nearly deterministic for
//! result refinement, slightly creative for general answers.

use crate::llm::types::Message;

/// System prompt for natural-language-to-SQL translation.
pub const TRANSLATE_SYSTEM_PROMPT: &str = "Convert the user request into a single SQLite SELECT query using only the provided schema. \
    Output only SQL, no explanation, no markdown, no backticks. \
    If impossible, output exactly: CANNOT_CONVERT";

/// System prompt for general oceanography questions.
pub const GENERAL_SYSTEM_PROMPT: &str = "You are an oceanographic assistant for ARGO projects. \
    Answer clearly in markdown with short sections. \
    If the user asks a general concept question, answer directly without SQL.";

/// System prompt for formatting SQL results into sectioned markdown.
pub const REFINE_SYSTEM_PROMPT: &str = "You are a SQL result formatter for an ocean data assistant. \
    Output markdown with exactly these sections: \
    ## Summary, ## Executed SQL, ## Data. \
    In Data section, include the SQL output exactly as provided. \
    Do not invent rows, values, or metrics. Keep all numbers unchanged.";

/// Sampling temperature for SQL translation.
pub const TRANSLATE_TEMPERATURE: f32 = 0.0;

/// Sampling temperature for result refinement.
pub const REFINE_TEMPERATURE: f32 = 0.2;

/// Sampling temperature for general answers.
pub const GENERAL_TEMPERATURE: f32 = 0.3;

/// Builds the message list for translating a request into SQL.
pub fn translate_messages(user_prompt: &str, db_schema: &str) -> Vec<Message> {
    vec![
        Message::system(TRANSLATE_SYSTEM_PROMPT),
        Message::user(format!(
            "Schema:\n{}\n\nRequest:\n{}",
            db_schema, user_prompt
        )),
    ]
}

/// Builds the message list for a general oceanography answer.
pub fn general_messages(user_prompt: &str) -> Vec<Message> {
    vec![
        Message::system(GENERAL_SYSTEM_PROMPT),
        Message::user(user_prompt),
    ]
}

/// Builds the message list for refining raw SQL output into markdown.
pub fn refine_messages(sql_query: &str, sql_output: &str) -> Vec<Message> {
    vec![
        Message::system(REFINE_SYSTEM_PROMPT),
        Message::user(format!(
            "SQL Query:\n{}\n\nSQL Output:\n{}",
            sql_query, sql_output
        )),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::types::Role;

    #[test]
    fn test_translate_messages_include_schema_and_request() {
        let messages = translate_messages("nearest float to 15N 90E", "traj_rel(latitude)");

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert!(messages[0].content.contains("CANNOT_CONVERT"));
        assert_eq!(messages[1].role, Role::User);
        assert!(messages[1].content.starts_with("Schema:\ntraj_rel(latitude)"));
        assert!(messages[1].content.contains("Request:\nnearest float to 15N 90E"));
    }

    #[test]
    fn test_general_messages_pass_prompt_through() {
        let messages = general_messages("what is an argo float?");

        assert_eq!(messages.len(), 2);
        assert!(messages[0].content.contains("oceanographic assistant"));
        assert_eq!(messages[1].content, "what is an argo float?");
    }

    #[test]
    fn test_refine_messages_include_sql_and_output() {
        let messages = refine_messages("SELECT 1;", "| 1 |");

        assert_eq!(messages.len(), 2);
        assert!(messages[0].content.contains("## Summary"));
        assert!(messages[1].content.contains("SQL Query:\nSELECT 1;"));
        assert!(messages[1].content.contains("SQL Output:\n| 1 |"));
    }

    #[test]
    fn test_temperatures_ordered_by_creativity() {
        assert_eq!(TRANSLATE_TEMPERATURE, 0.0);
        assert!(REFINE_TEMPERATURE < GENERAL_TEMPERATURE);
    }
}
