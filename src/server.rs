//! HTTP surface.
//!
//! `/api/gpt` is the chat proxy: one narrative completion, then (in
//! simulation mode) one trait estimation, then classification. The other
//! routes expose classification directly and the server-side session state.

use crate::archetype::{classify, share_text, ArchetypeResult};
use crate::config::Config;
use crate::db::{Session, Store, TranscriptLine};
use crate::error::{CompletionError, StoreError, TraitError};
use crate::logging;
use crate::openai::{ChatMessage, CompletionBackend};
use crate::profiler::TraitProfiler;
use crate::prompts::narrative_system_prompt;
use crate::traits::TraitVector;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

/// Shared across all requests.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub backend: Arc<dyn CompletionBackend>,
    pub store: Arc<Store>,
}

impl AppState {
    pub fn new(config: Config, backend: Arc<dyn CompletionBackend>, store: Store) -> Self {
        Self {
            config: Arc::new(config),
            backend,
            store: Arc::new(store),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    InvalidTraits(#[from] TraitError),

    #[error("Upstream completion failed: {0}")]
    Upstream(#[from] CompletionError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidTraits(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/gpt", post(gpt_handler))
        .route("/api/archetype", post(archetype_handler))
        .route("/api/session", post(create_session))
        .route("/api/session/:id", get(get_session).delete(delete_session))
        .route("/api/session/:id/share", get(share_session))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

// ============ Chat proxy ============

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GptRequest {
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub riddle_stage: u32,
    #[serde(default)]
    pub simulation_mode: bool,
    #[serde(default)]
    pub format_style: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GptResponse {
    pub content: String,
    pub ocean: Option<TraitVector>,
    pub archetype: Option<ArchetypeResult>,
    pub commentary: Option<&'static str>,
    pub riddle_stage: u32,
}

async fn gpt_handler(
    State(state): State<AppState>,
    payload: Result<Json<GptRequest>, JsonRejection>,
) -> Result<Json<GptResponse>, ApiError> {
    let Json(request) = payload?;
    if request.messages.is_empty() {
        return Err(ApiError::BadRequest("messages must not be empty".to_string()));
    }

    let session_id = request.session_id.as_deref();
    let config = &state.config;

    // Primary narrative call
    let system_prompt = narrative_system_prompt(
        request.simulation_mode,
        &request.format_style,
        request.riddle_stage,
    );
    let mut messages = vec![ChatMessage::system(system_prompt)];
    messages.extend(request.messages.iter().cloned());

    let content = match state.backend.chat_completion(messages, config.narrative_temperature).await {
        Ok(content) => content,
        Err(e) => {
            logging::log_error(session_id, &format!("Narrative completion failed: {}", e));
            return Err(ApiError::Upstream(e));
        }
    };
    logging::log_narrative(
        session_id,
        &format!("Stage {} reply, {} chars", request.riddle_stage, content.chars().count()),
    );

    // Trait estimation, simulation mode only
    let ocean = if request.simulation_mode {
        let profiler = TraitProfiler::new(
            &*state.backend,
            config.profiler_temperature,
            config.profiler_window,
        );
        profiler.estimate(&request.messages, session_id).await
    } else {
        None
    };

    let archetype = ocean.as_ref().map(classify);
    if let Some(result) = &archetype {
        logging::log_archetype(session_id, &format!("Classified as {}", result.label));
    }

    let next_stage = request.riddle_stage.saturating_add(1);
    let riddle_stage = match session_id {
        Some(id) => persist_turn(
            &state.store,
            id,
            &request.messages,
            &content,
            ocean.as_ref(),
            archetype.as_ref(),
        )
        .unwrap_or(next_stage),
        None => next_stage,
    };

    Ok(Json(GptResponse {
        content,
        commentary: archetype.as_ref().map(|a| a.commentary),
        ocean,
        archetype,
        riddle_stage,
    }))
}

/// Persist the exchange. Failures are logged and reported as `None`.
fn persist_turn(
    store: &Store,
    session_id: &str,
    messages: &[ChatMessage],
    reply: &str,
    traits: Option<&TraitVector>,
    archetype: Option<&ArchetypeResult>,
) -> Option<u32> {
    let last_input = messages.iter().rev().find(|m| m.is_user()).map(|m| m.content.as_str());

    let stage = match store.append_turn(session_id, last_input, reply) {
        Ok(stage) => stage,
        Err(e) => {
            logging::log_error(Some(session_id), &format!("Failed to save turn: {}", e));
            return None;
        }
    };

    if let (Some(traits), Some(result)) = (traits, archetype) {
        if let Err(e) = store.save_profile(session_id, traits, result) {
            logging::log_error(Some(session_id), &format!("Failed to save profile: {}", e));
        }
    }

    logging::log_session(Some(session_id), &format!("Turn saved, riddle stage now {}", stage));
    Some(stage)
}

// ============ Direct classification ============

async fn archetype_handler(
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ArchetypeResult>, ApiError> {
    let Json(body) = payload?;
    let traits = TraitVector::from_json(&body)?;
    Ok(Json(classify(&traits)))
}

// ============ Sessions ============

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub traits: TraitVector,
    pub archetype: ArchetypeResult,
    pub updated_at: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    #[serde(flatten)]
    pub session: Session,
    pub history: Vec<String>,
    pub profile: Option<ProfileView>,
}

async fn create_session(State(state): State<AppState>) -> Result<(StatusCode, Json<Session>), ApiError> {
    let id = Uuid::new_v4().to_string();
    let session = state.store.create_session(&id)?;
    logging::log_session(Some(&id), "Session created");
    Ok((StatusCode::CREATED, Json(session)))
}

fn load_profile(store: &Store, id: &str) -> Result<Option<ProfileView>, ApiError> {
    Ok(store.get_profile(id)?.map(|p| ProfileView {
        archetype: classify(&p.traits),
        traits: p.traits,
        updated_at: p.updated_at,
    }))
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    let session = state.store
        .get_session(&id)?
        .ok_or_else(|| ApiError::NotFound(format!("Session '{}' not found", id)))?;

    let history = state.store
        .get_transcript(&id)?
        .iter()
        .map(TranscriptLine::display)
        .collect();

    let profile = load_profile(&state.store, &id)?;

    Ok(Json(SessionView { session, history, profile }))
}

async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.store.delete_session(&id)? {
        logging::log_session(Some(&id), "Session deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Session '{}' not found", id)))
    }
}

async fn share_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let profile = load_profile(&state.store, &id)?
        .ok_or_else(|| ApiError::NotFound(format!("No archetype yet for session '{}'", id)))?;

    Ok(Json(json!({ "text": share_text(&profile.archetype) })))
}

/// Bind and serve until the process is stopped.
pub async fn serve(state: AppState) -> std::io::Result<()> {
    let bind = state.config.bind;
    let listener = tokio::net::TcpListener::bind(bind).await?;
    logging::log_session(None, &format!("PromptQuest listening on {}", bind));
    axum::serve(listener, create_router(state)).await
}
