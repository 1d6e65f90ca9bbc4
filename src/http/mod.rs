//! HTTP surface: health, list endpoints and quiz generation.

use axum::{
    Json, Router,
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;
use tracing::{Instrument, error};

use crate::{
    engine::{QuizConfig, QuizRequest, QuizResult},
    entity::{Club, Season},
    runtime::{QuizServiceHandle, ServiceError},
};

/// Routes are served both at the root and under `/api`.
pub fn build_router(service: QuizServiceHandle) -> Router {
    let api = Router::new()
        .route("/health/", get(health))
        .route("/clubs/", get(list_clubs))
        .route("/seasons/", get(list_seasons))
        .route("/quizzes/generate/", post(generate_quiz));

    Router::new()
        .merge(api.clone())
        .nest("/api", api)
        .layer(middleware::from_fn(request_tracing))
        .with_state(service)
}

/// Failure of a request after it reached the quiz service.
pub struct ApiError(ServiceError);

impl From<ServiceError> for ApiError {
    fn from(value: ServiceError) -> Self {
        Self(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            ServiceError::ChannelClosed => StatusCode::SERVICE_UNAVAILABLE,
            ServiceError::Store(_) | ServiceError::Import(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        error!(err = %self.0, %status, "request failed");
        (status, Json(json!({"error": self.0.to_string()}))).into_response()
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({"status": "ok"}))
}

async fn list_clubs(State(service): State<QuizServiceHandle>) -> Result<Json<Vec<Club>>, ApiError> {
    Ok(Json(service.list_clubs().await?))
}

async fn list_seasons(
    State(service): State<QuizServiceHandle>,
) -> Result<Json<Vec<Season>>, ApiError> {
    Ok(Json(service.list_seasons().await?))
}

async fn generate_quiz(
    State(service): State<QuizServiceHandle>,
    Json(request): Json<QuizRequest>,
) -> Result<Json<QuizResult>, ApiError> {
    let config = QuizConfig::from(request);
    Ok(Json(service.generate_quiz(config).await?))
}

async fn request_tracing(request: Request<Body>, next: Next) -> Response {
    let span = tracing::info_span!(
        "http.request",
        method = %request.method(),
        route = %request.uri().path(),
    );
    let response = next.run(request).instrument(span.clone()).await;
    span.in_scope(|| tracing::debug!(status = %response.status(), "request finished"));
    response
}
