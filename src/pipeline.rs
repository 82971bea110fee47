//! Request pipeline behind `POST /query`.
//!
//! Resolution order: passthrough SQL first, then the nearest-float
//! heuristic, then model translation. Requests that produce no statement
//! are answered as general questions. Database and model failures never
//! escape as errors; they collapse into a payload the frontend can render.

use serde::Serialize;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

use crate::answer::{local_general_answer, model_general_answer};
use crate::cache::AnswerCache;
use crate::classify::{classify, StatementKind};
use crate::config::Config;
use crate::db::{ExecutionOutcome, SqliteStore, StoreSession};
use crate::error::Result;
use crate::format::{
    ensure_sectioned_markdown, format_mutation_result, format_sql_response_local, render_result,
};
use crate::heuristic::nearest_float_statement;
use crate::llm::{refine_messages, translate_to_sql, LlmClient, REFINE_TEMPERATURE};

/// Response body for `POST /query`.
#[derive(Debug, Clone, Serialize)]
pub struct ResponsePayload {
    /// The request text, echoed back trimmed.
    pub query: String,
    /// The SQL that ran; absent for general answers and errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executed_sql: Option<String>,
    /// Markdown result, or an error sentence.
    pub result: String,
    /// Set only on general answers. Values are kept stable for existing
    /// frontends.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl ResponsePayload {
    fn statement(query: &str, sql: String, result: String) -> Self {
        Self {
            query: query.to_string(),
            executed_sql: Some(sql),
            result,
            source: None,
        }
    }

    fn general(query: &str, result: String, source: AnswerSource) -> Self {
        Self {
            query: query.to_string(),
            executed_sql: None,
            result,
            source: Some(source.as_str().to_string()),
        }
    }

    fn error(query: &str, message: String) -> Self {
        Self {
            query: query.to_string(),
            executed_sql: None,
            result: message,
            source: None,
        }
    }
}

/// Where a general answer came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerSource {
    /// The external model answered.
    ModelGeneral,
    /// A canned local answer was used.
    LocalFallback,
}

impl AnswerSource {
    /// Wire name for the payload's `source` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ModelGeneral => "grok_general",
            Self::LocalFallback => "local_general_fallback",
        }
    }
}

/// How the executed statement was obtained. Logged, never sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatementOrigin {
    Passthrough,
    Heuristic,
    Translated,
}

impl StatementOrigin {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Passthrough => "passthrough",
            Self::Heuristic => "heuristic",
            Self::Translated => "translated",
        }
    }
}

enum Resolution {
    Statement {
        sql: String,
        kind: StatementKind,
        origin: StatementOrigin,
    },
    General,
}

/// Shared pipeline state for all requests.
pub struct QueryPipeline {
    store: SqliteStore,
    max_rows: usize,
    llm: Option<Arc<dyn LlmClient>>,
    llm_configured: bool,
    cache: Mutex<AnswerCache>,
}

impl QueryPipeline {
    /// Creates the pipeline from configuration and an optional model client.
    pub fn new(config: &Config, llm: Option<Arc<dyn LlmClient>>) -> Self {
        Self {
            store: SqliteStore::new(config),
            max_rows: config.max_rows,
            llm,
            llm_configured: config.llm.is_configured(),
            cache: Mutex::new(AnswerCache::default()),
        }
    }

    /// Answers one trimmed, non-empty request.
    ///
    /// Never fails: database and model errors are absorbed into the
    /// payload's `result` field.
    pub async fn respond(&self, user_query: &str) -> ResponsePayload {
        match self.process(user_query).await {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Request failed ({}): {}", e.category(), e);
                ResponsePayload::error(user_query, e.payload_message())
            }
        }
    }

    async fn process(&self, user_query: &str) -> Result<ResponsePayload> {
        let mut session = self.store.open_session().await?;

        match self.resolve(&mut session, user_query).await? {
            Resolution::Statement { sql, kind, origin } => {
                debug!(
                    "Executing {} statement resolved by {}",
                    kind.keyword(),
                    origin.as_str()
                );
                let result = match session.execute(&sql, kind).await? {
                    ExecutionOutcome::Rows(result_set) => {
                        let raw = render_result(&result_set, self.max_rows);
                        self.refine(&sql, &raw).await
                    }
                    ExecutionOutcome::Mutation { rows_affected } => {
                        format_mutation_result(rows_affected)
                    }
                };
                Ok(ResponsePayload::statement(user_query, sql, result))
            }
            Resolution::General => {
                let (result, source) = self.answer_general(user_query).await;
                debug!("Answered as general question ({})", source.as_str());
                Ok(ResponsePayload::general(user_query, result, source))
            }
        }
    }

    /// Walks the strategy chain until one produces a statement.
    async fn resolve(
        &self,
        session: &mut StoreSession,
        user_query: &str,
    ) -> Result<Resolution> {
        if let Some(kind) = classify(user_query) {
            return Ok(Resolution::Statement {
                sql: user_query.to_string(),
                kind,
                origin: StatementOrigin::Passthrough,
            });
        }

        if let Some(sql) = nearest_float_statement(session, user_query).await? {
            return Ok(Resolution::Statement {
                sql,
                kind: StatementKind::Select,
                origin: StatementOrigin::Heuristic,
            });
        }

        if let Some(client) = self.active_llm() {
            // The schema is only introspected once translation is actually
            // attempted.
            let schema = session.introspect_schema().await?;
            if let Some((sql, kind)) =
                translate_to_sql(client, user_query, &schema.format_for_prompt()).await
            {
                return Ok(Resolution::Statement {
                    sql,
                    kind,
                    origin: StatementOrigin::Translated,
                });
            }
        }

        Ok(Resolution::General)
    }

    /// Refines raw SQL output into sectioned markdown, falling back to the
    /// local formatter when the model is unavailable or declines.
    async fn refine(&self, sql: &str, raw_output: &str) -> String {
        if let Some(client) = self.active_llm() {
            let messages = refine_messages(sql, raw_output);
            match client.complete(&messages, REFINE_TEMPERATURE).await {
                Ok(refined) if !refined.is_empty() => {
                    return ensure_sectioned_markdown(&refined, "SQL Result");
                }
                Ok(_) => debug!("Refinement returned nothing, formatting locally"),
                Err(e) => debug!("Refinement request failed: {}", e),
            }
        }
        format_sql_response_local(sql, raw_output)
    }

    /// Produces a general answer, consulting the answer cache first.
    ///
    /// Only model answers enter the cache; local fallbacks are recomputed
    /// every time, so the model takes over again on the first request after
    /// it recovers.
    async fn answer_general(&self, user_query: &str) -> (String, AnswerSource) {
        if let Some(client) = self.active_llm() {
            let key = user_query.trim();
            if let Some(hit) = self.cached_answer(key) {
                debug!("General answer served from cache");
                return (hit, AnswerSource::ModelGeneral);
            }
            if let Some(answer) = model_general_answer(client, user_query).await {
                self.store_answer(key.to_string(), answer.clone());
                return (answer, AnswerSource::ModelGeneral);
            }
        }
        (local_general_answer(user_query), AnswerSource::LocalFallback)
    }

    /// The model client, present only when a credential is configured and
    /// a provider was resolved.
    fn active_llm(&self) -> Option<&dyn LlmClient> {
        if !self.llm_configured {
            return None;
        }
        self.llm.as_deref()
    }

    fn cached_answer(&self, key: &str) -> Option<String> {
        self.cache.lock().ok().and_then(|mut cache| cache.get(key))
    }

    fn store_answer(&self, key: String, answer: String) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.put(key, answer);
        }
    }
}
