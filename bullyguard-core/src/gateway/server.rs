//! HTTP gateway server built on axum.

use super::GatewayConfig;
use super::error::ApiError;
use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::HeaderValue,
    routing::{get, post},
};
use bullyguard_ml::{ComparisonOrchestrator, DatasetId, ModelKey};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    orchestrator: Arc<ComparisonOrchestrator>,
    started_at: Instant,
}

impl AppState {
    pub fn new(orchestrator: Arc<ComparisonOrchestrator>) -> Self {
        Self {
            orchestrator,
            started_at: Instant::now(),
        }
    }

    pub fn orchestrator(&self) -> &Arc<ComparisonOrchestrator> {
        &self.orchestrator
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

fn default_dataset_id() -> String {
    DatasetId::default().as_str().to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrainRequest {
    pub model_key: String,
    #[serde(default = "default_dataset_id")]
    pub dataset_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrainAllRequest {
    #[serde(default = "default_dataset_id")]
    pub dataset_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PredictRequest {
    pub text: String,
    pub model_key: String,
}

/// Build the axum Router with every API route.
pub fn router(state: AppState, config: &GatewayConfig) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/datasets", get(datasets_handler))
        .route("/api/models", get(models_handler))
        .route("/api/train", post(train_handler))
        .route("/api/train-all", post(train_all_handler))
        .route("/api/predict", post(predict_handler))
        .route("/api/results", get(results_handler))
        .layer(cors_layer(&config.cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Run `task` on its own Tokio task so a disconnecting client does not cancel it.
async fn detached<F, T>(task: F) -> Result<T, ApiError>
where
    F: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    tokio::spawn(task)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::InvalidBody(rejection.body_text()))
}

/// Health check endpoint.
async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "uptime_secs": state.uptime_secs(),
        "cached_results": state.orchestrator.cached_len().await,
    }))
}

async fn datasets_handler(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let orchestrator = Arc::clone(&state.orchestrator);
    let datasets = detached(async move { orchestrator.dataset_stats().await }).await??;
    Ok(Json(json!({ "datasets": datasets })))
}

async fn models_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "models": state.orchestrator.available_models().await }))
}

async fn train_handler(
    State(state): State<AppState>,
    payload: Result<Json<TrainRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let req = body(payload)?;
    let key = ModelKey::from(req.model_key);
    let dataset_id: DatasetId = req
        .dataset_id
        .parse()
        .map_err(bullyguard_ml::ComparisonError::from)?;

    let orchestrator = Arc::clone(&state.orchestrator);
    let result = detached(async move { orchestrator.train_one(&key, dataset_id).await }).await??;
    Ok(Json(json!({ "result": result })))
}

async fn train_all_handler(
    State(state): State<AppState>,
    payload: Result<Json<TrainAllRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let req = body(payload)?;
    let dataset_id: DatasetId = req
        .dataset_id
        .parse()
        .map_err(bullyguard_ml::ComparisonError::from)?;

    let orchestrator = Arc::clone(&state.orchestrator);
    let leaderboard = detached(async move { orchestrator.train_all(dataset_id).await }).await??;
    Ok(Json(json!(leaderboard)))
}

async fn predict_handler(
    State(state): State<AppState>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let req = body(payload)?;
    let key = ModelKey::from(req.model_key);
    let prediction = state.orchestrator.predict(&req.text, &key).await?;
    Ok(Json(json!({ "prediction": prediction })))
}

async fn results_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!(state.orchestrator.cached_results().await))
}

/// Serve the API on the configured address until Ctrl-C.
pub async fn run(state: AppState, config: &GatewayConfig) -> Result<(), std::io::Error> {
    let app = router(state, config);
    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Gateway listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for Ctrl-C; shutting down");
    }
}
