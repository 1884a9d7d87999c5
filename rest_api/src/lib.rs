use std::future::Future;
use std::sync::Arc;

use anyhow::{Context, Error as AnyhowError};
use axum::{
    body::Bytes,
    extract::State,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use log::{debug, error, info};
use models::{validate_batch, ValidationErrors};
use readmission::{score_encounters, BinaryClassifier, ModelError, Scores};
use serde_json::{json, Value};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower_http::cors::{Any, CorsLayer};

pub mod config;

use crate::config::RestApiConfig;

// Define the REST API error enum
#[derive(Debug, Error)]
pub enum RestApiError {
    #[error("Request validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("Model error: {0}")]
    Model(#[from] ModelError),
    #[error("Scoring task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

// Implement IntoResponse for RestApiError to convert it into an HTTP response
impl IntoResponse for RestApiError {
    fn into_response(self) -> Response {
        match self {
            RestApiError::Validation(errors) => {
                debug!("Rejecting request: {}", errors);
                let body = Json(json!({
                    "status": "error",
                    "message": errors.to_string(),
                    "detail": errors,
                }));
                (StatusCode::UNPROCESSABLE_ENTITY, body).into_response()
            }
            RestApiError::Model(e) => {
                error!("Model invocation failed: {}", e);
                internal_error(format!("Model invocation failed: {}", e))
            }
            RestApiError::Join(e) => {
                error!("Scoring task failed: {}", e);
                internal_error("Scoring task failed".to_string())
            }
        }
    }
}

fn internal_error(message: String) -> Response {
    let body = Json(json!({
        "status": "error",
        "message": message,
    }));
    (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
}

/// Shared state for the Axum application. The model is loaded once and only read afterwards.
#[derive(Clone)]
pub struct AppState {
    pub model: Arc<dyn BinaryClassifier>,
}

impl AppState {
    pub fn new(model: Arc<dyn BinaryClassifier>) -> Self {
        AppState { model }
    }
}

// Handler for the /health endpoint. Never touches the model.
async fn health_check_handler() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "Ok" })))
}

// Handler for the /predict endpoint
async fn predict_handler(State(state): State<AppState>, body: Bytes) -> Result<Json<Scores>, RestApiError> {
    let encounters = validate_batch(&body)?;
    debug!("Scoring batch of {} encounters", encounters.len());

    let model = Arc::clone(&state.model);
    let scores = tokio::task::spawn_blocking(move || score_encounters(model.as_ref(), &encounters)).await??;
    Ok(Json(scores))
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_origin(Any);

    Router::new()
        .route("/health", get(health_check_handler))
        .route("/predict", post(predict_handler))
        .with_state(state)
        .layer(cors)
}

/// Serves on an already bound listener until `shutdown` resolves.
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), AnyhowError> {
    let app = create_router(state);
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown)
        .await
        .context("REST API server failed to start or run")
}

// Main function to start the REST API server
pub async fn start_server(
    config: &RestApiConfig,
    model: Arc<dyn BinaryClassifier>,
    shutdown_rx: oneshot::Receiver<()>,
) -> Result<(), AnyhowError> {
    let addr = config.bind_address();
    let listener = TcpListener::bind((config.host.as_str(), config.port))
        .await
        .with_context(|| format!("Failed to bind to address: {}", addr))?;
    info!("REST API server listening on {}", addr);

    let shutdown = async {
        if shutdown_rx.await.is_ok() {
            info!("Received shutdown signal.");
        }
    };
    serve(listener, AppState::new(model), shutdown).await?;

    info!("REST API server stopped.");
    Ok(())
}
