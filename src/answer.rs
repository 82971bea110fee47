//! General-question answering.
//!
//! Questions that resolve to neither SQL nor the nearest-float heuristic get
//! a prose answer: from the model when one is reachable, otherwise from a
//! small set of canned local answers so the endpoint never comes back empty.

use tracing::debug;

use crate::format::ensure_sectioned_markdown;
use crate::llm::{general_messages, LlmClient, GENERAL_TEMPERATURE};

const ABOUT_PROJECT_ANSWER: &str = "## About This Project\n\n\
    This project is an ocean-data assistant for ARGO research. It combines:\n\
    - A relational SQLite database of ARGO observations\n\
    - Natural-language query handling for researchers\n\
    - SQL-based data retrieval and formatted result summaries\n\
    - A frontend chat/dashboard for exploration and analysis\n\n\
    The goal is to let users ask oceanographic questions and get reliable, data-backed responses.";

const EXPLAIN_ARGO_ANSWER: &str = "## ARGO In Simple Terms\n\n\
    ARGO is a global ocean observing system made of autonomous profiling floats. \
    These floats drift in the ocean, dive and rise on cycles, measure temperature/salinity \
    (and sometimes biogeochemical parameters), and transmit data via satellite when they surface.";

const WHAT_IS_FLOAT_ANSWER: &str = "## What Is an Argo Float?\n\n\
    An Argo float is an autonomous ocean instrument that drifts at depth, \
    then periodically dives and rises to measure seawater properties such as \
    temperature and salinity. It sends profiles to satellites when it surfaces, \
    helping scientists monitor ocean conditions and climate change.";

const GENERIC_FALLBACK_ANSWER: &str = "## General Answer\n\n\
    I could not reach the external model right now, but your request is treated as a \
    normal question (not SQL). Please retry once, or ask a data question with location/time \
    details so I can run database-backed analysis.";

/// Asks the model for a general oceanography answer.
///
/// Returns the answer wrapped in sectioned markdown, or `None` when the
/// model is unreachable or replies with nothing.
pub async fn model_general_answer(client: &dyn LlmClient, user_prompt: &str) -> Option<String> {
    let messages = general_messages(user_prompt);
    match client.complete(&messages, GENERAL_TEMPERATURE).await {
        Ok(reply) if !reply.is_empty() => Some(ensure_sectioned_markdown(&reply, "Answer")),
        Ok(_) => None,
        Err(e) => {
            debug!("General answer request failed: {}", e);
            None
        }
    }
}

/// Answers a general question without the model.
///
/// A few common questions about the project and ARGO floats get canned
/// answers; everything else gets a retry hint.
pub fn local_general_answer(user_prompt: &str) -> String {
    let prompt = user_prompt.trim().to_lowercase();

    if prompt.contains("project") && (prompt.contains("about") || prompt.contains("what is this")) {
        return ABOUT_PROJECT_ANSWER.to_string();
    }
    if prompt.contains("argo") && prompt.contains("explain") {
        return EXPLAIN_ARGO_ANSWER.to_string();
    }
    if prompt.contains("argo float") && (prompt.contains("what is") || prompt.contains("what's")) {
        return WHAT_IS_FLOAT_ANSWER.to_string();
    }

    GENERIC_FALLBACK_ANSWER.to_string()
}
