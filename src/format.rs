//! Markdown rendering for query results and model replies.
//!
//! Everything the caller reads in the `result` field is assembled here,
//! so the exact wording of sentinels and notes lives in one place. The
//! frontend renders this text as markdown verbatim.

use crate::db::{ResultSet, Value};
use regex::Regex;

/// Escapes one cell so it cannot break the table structure.
///
/// Pipes are backslash-escaped and newlines collapse to a space; NULL
/// renders as the literal `NULL` marker.
pub fn escape_markdown_cell(value: &Value) -> String {
    value
        .to_display_string()
        .replace('|', "\\|")
        .replace('\n', " ")
}

/// Renders a result set as a markdown table.
///
/// Zero rows renders a fixed sentence instead of an empty table.
pub fn format_markdown_table(result: &ResultSet) -> String {
    if result.is_empty() {
        return "Query executed successfully. No rows returned.".to_string();
    }

    let header = format!("| {} |", result.columns.join(" | "));
    let divider = format!("| {} |", vec!["---"; result.columns.len()].join(" | "));
    let mut lines = vec![header, divider];
    for row in &result.rows {
        let cells = row
            .iter()
            .map(escape_markdown_cell)
            .collect::<Vec<_>>()
            .join(" | ");
        lines.push(format!("| {cells} |"));
    }
    lines.join("\n")
}

/// Renders the table plus the rows-returned note handed to refinement.
pub fn render_result(result: &ResultSet, max_rows: usize) -> String {
    let mut text = format_markdown_table(result);
    text.push_str(&format!("\n\nRows returned: {}", result.row_count()));
    if result.truncated {
        text.push_str(&format!(" (capped at {max_rows})"));
    }
    text
}

/// The sentence reported for a successful mutation or DDL statement.
pub fn format_mutation_result(rows_affected: u64) -> String {
    format!("Statement executed successfully. Rows affected: {rows_affected}.")
}

/// Guarantees the text starts with a `## ` section heading.
///
/// Model replies are free-form; downstream consumers rely on a sectioned
/// envelope, so a missing heading gets the default title prepended and an
/// empty reply becomes a placeholder section.
pub fn ensure_sectioned_markdown(text: &str, default_title: &str) -> String {
    let cleaned = text.trim();
    if cleaned.is_empty() {
        return format!("## {default_title}\n\nNo content returned.");
    }
    if cleaned.starts_with("## ") {
        return cleaned.to_string();
    }
    format!("## {default_title}\n\n{cleaned}")
}

/// Deterministic three-section rendering used when no model refines the
/// result. Produces the same `## Summary` / `## Executed SQL` / `## Data`
/// layout the refiner is instructed to emit.
pub fn format_sql_response_local(sql: &str, sql_output: &str) -> String {
    let summary = Regex::new(r"Rows returned:\s*(\d+)")
        .ok()
        .and_then(|re| {
            re.captures(sql_output)
                .map(|caps| format!("Query executed successfully. Rows returned: {}.", &caps[1]))
        })
        .unwrap_or_else(|| "Query executed successfully.".to_string());

    format!(
        "## Summary\n\n{summary}\n\n## Executed SQL\n\n```sql\n{sql}\n```\n\n## Data\n\n{sql_output}"
    )
}
