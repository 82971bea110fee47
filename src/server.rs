//! HTTP surface: `POST /query` and `GET /health`.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::db::SqliteStore;
use crate::error::{BlueQueryError, Result};
use crate::llm::{build_client, resolve_provider, ActiveProvider, LlmClient};
use crate::pipeline::{QueryPipeline, ResponsePayload};

/// State shared by all request handlers.
pub struct AppState {
    config: Config,
    store: SqliteStore,
    provider: Option<ActiveProvider>,
    pipeline: QueryPipeline,
}

impl AppState {
    /// Resolves the provider, builds the model client, and assembles the
    /// request pipeline.
    pub fn new(config: Config) -> Result<Self> {
        let provider = resolve_provider(&config.llm);
        let llm: Option<Arc<dyn LlmClient>> = match provider {
            Some(p) => Some(Arc::new(build_client(p, &config.llm)?)),
            None => None,
        };

        let store = SqliteStore::new(&config);
        let pipeline = QueryPipeline::new(&config, llm);

        Ok(Self {
            config,
            store,
            provider,
            pipeline,
        })
    }

    /// The provider name reported by `GET /health`.
    pub fn provider_name(&self) -> &'static str {
        self.provider.map(|p| p.as_str()).unwrap_or("none")
    }

    /// The model name reported by `GET /health`.
    ///
    /// Without an active Groq provider this reports the Grok model, even
    /// when no provider is active at all.
    pub fn model_name(&self) -> &str {
        match self.provider {
            Some(ActiveProvider::Groq) => &self.config.llm.groq.model,
            _ => &self.config.llm.grok.model,
        }
    }
}

/// Builds the application router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/query", post(handle_query))
        .route("/health", get(handle_health))
        .with_state(state)
}

/// Binds the listener and serves requests until shutdown.
pub async fn serve(state: Arc<AppState>, bind: SocketAddr) -> Result<()> {
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|e| BlueQueryError::internal(format!("Failed to bind {}: {}", bind, e)))?;

    info!("Listening on http://{}", bind);
    axum::serve(listener, app)
        .await
        .map_err(|e| BlueQueryError::internal(format!("Server error: {}", e)))
}

#[derive(Debug, Deserialize)]
struct QueryRequest {
    query: String,
}

async fn handle_query(
    State(state): State<Arc<AppState>>,
    Json(request): Json<QueryRequest>,
) -> std::result::Result<Json<ResponsePayload>, (StatusCode, Json<Value>)> {
    let user_query = request.query.trim().to_string();
    if user_query.is_empty() {
        return Err(detail(StatusCode::BAD_REQUEST, "Empty query".to_string()));
    }

    if !state.store.exists() {
        return Err(detail(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!(
                "Database file not found at ARGO_DB_PATH={}",
                state.store.path().display()
            ),
        ));
    }

    Ok(Json(state.pipeline.respond(&user_query).await))
}

async fn handle_health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "db_exists": state.store.exists(),
        "llm_configured": state.config.llm.is_configured(),
        "llm_provider": state.provider_name(),
        "llm_model": state.model_name(),
    }))
}

/// Error body shape kept stable for existing frontends.
fn detail(status: StatusCode, message: String) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "detail": message })))
}
