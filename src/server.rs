use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::error::{HistoryError, IdeaError};
use crate::history::{HistoryStore, SavedIdea};
use crate::idea::{IdeaRequest, IdeaResult};
use crate::pipeline::IdeaPipeline;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<IdeaPipeline>,
    pub history: Arc<dyn HistoryStore>,
}

/// Body of `POST /api/generate`. Blank selectors mean "Any".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub genre: String,
    #[serde(default)]
    pub tone: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Idea(#[from] IdeaError),

    #[error(transparent)]
    History(#[from] HistoryError),

    #[error("invalid request body: {0}")]
    BadRequest(#[from] JsonRejection),

    #[error("history task failed: {0}")]
    Blocking(#[from] tokio::task::JoinError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::Idea(e) => {
                let status = if e.is_user_error() {
                    StatusCode::BAD_REQUEST
                } else {
                    StatusCode::INTERNAL_SERVER_ERROR
                };
                let body = ErrorBody {
                    error: e.user_message(),
                    raw: e.raw_text().map(str::to_string),
                };
                (status, body)
            }
            ApiError::BadRequest(rejection) => {
                let body = ErrorBody {
                    error: format!("Invalid request body: {}", rejection.body_text()),
                    raw: None,
                };
                (StatusCode::BAD_REQUEST, body)
            }
            ApiError::History(_) | ApiError::Blocking(_) => {
                error!(error = %self, "history store failed");
                let body = ErrorBody {
                    error: "Could not access saved ideas.".to_string(),
                    raw: None,
                };
                (StatusCode::INTERNAL_SERVER_ERROR, body)
            }
        };
        (status, Json(body)).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/generate", post(generate))
        .route(
            "/api/history",
            get(list_history).post(save_history).delete(clear_history),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// File-backed stores block; keep them off the async workers.
async fn with_history<T, F>(history: Arc<dyn HistoryStore>, op: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&dyn HistoryStore) -> Result<T, HistoryError> + Send + 'static,
{
    Ok(tokio::task::spawn_blocking(move || op(history.as_ref())).await??)
}

async fn generate(
    State(state): State<AppState>,
    body: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<IdeaResult>, ApiError> {
    let Json(body) = body?;
    let request = IdeaRequest::from_selectors(&body.prompt, &body.genre, &body.tone)?;
    let idea = state.pipeline.generate(&request).await?;
    Ok(Json(idea))
}

async fn list_history(State(state): State<AppState>) -> Result<Json<Vec<SavedIdea>>, ApiError> {
    let saved = with_history(state.history, |h| h.load()).await?;
    Ok(Json(saved))
}

async fn save_history(
    State(state): State<AppState>,
    body: Result<Json<IdeaResult>, JsonRejection>,
) -> Result<(StatusCode, Json<SavedIdea>), ApiError> {
    let Json(idea) = body?;
    let saved = with_history(state.history, move |h| h.save(idea)).await?;
    info!(id = %saved.id, "saved idea");
    Ok((StatusCode::CREATED, Json(saved)))
}

async fn clear_history(State(state): State<AppState>) -> Result<StatusCode, ApiError> {
    with_history(state.history, |h| h.clear()).await?;
    info!("cleared history");
    Ok(StatusCode::NO_CONTENT)
}
