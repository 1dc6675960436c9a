//! API Handlers
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use lingo_core::{Agent, CoordError, CoordinationOutcome, Intent, Request, LINGO_VERSION};
use lingo_engine::PlanDecision;
use serde_json::{json, Value};
use tracing::error;

use crate::AppState;

/// A `CoordError` rendered as `{ "error", "code" }`
pub struct ApiError(pub CoordError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            CoordError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (
            status,
            Json(json!({ "error": self.0.to_string(), "code": self.0.code() })),
        )
            .into_response()
    }
}

impl From<CoordError> for ApiError {
    fn from(e: CoordError) -> Self {
        ApiError(e)
    }
}

pub async fn coordinate(
    State(state): State<AppState>,
    Json(request): Json<Request>,
) -> Result<Json<CoordinationOutcome>, ApiError> {
    match state.engine.coordinate(&request).await {
        Ok(outcome) => {
            state.metrics.observe(&outcome.result);
            Ok(Json(outcome))
        }
        Err(e) => {
            state.metrics.reject();
            Err(e.into())
        }
    }
}

pub async fn classify(State(state): State<AppState>, Json(request): Json<Request>) -> Json<Intent> {
    Json(state.engine.classify_intent(&request).await)
}

pub async fn plan(State(state): State<AppState>, Json(request): Json<Request>) -> Json<PlanDecision> {
    Json(state.engine.plan(&request).await)
}

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let registry = state.engine.registry();
    let providers: serde_json::Map<String, Value> = [
        Agent::Summarizer,
        Agent::Translator,
        Agent::Writer,
        Agent::ResearchProvider,
    ]
    .into_iter()
    .map(|agent| (agent.as_str().to_string(), Value::Bool(registry.has(agent))))
    .collect();

    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "version": LINGO_VERSION, "providers": providers })),
    )
}

pub async fn metrics(State(state): State<AppState>) -> Response {
    match state.metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "failed to encode metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
