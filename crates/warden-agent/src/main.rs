//! Warden Agent — per-node pod manager HTTP service.
//!
//! # HTTP Endpoints
//!
//! ## Health
//! - `GET /health` - Health check
//!
//! ## Pod management
//! - `POST /v1/pods` - Accept a pod descriptor and fork its initd
//! - `DELETE /v1/pods/:pod_id` - Terminate a pod (stub)
//! - `GET /v1/pods/:pod_id` - Snapshot a pod's current state
//! - `GET /v1/pods` - List known pod ids

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use warden_agent::{AgentConfig, AgentError, NoopTaskManager, PodManager, RealProcessLauncher};
use warden_core::PodDescriptor;

#[derive(Clone)]
struct AppState {
    manager: Arc<PodManager>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
}

async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        service: "warden-agent",
    })
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    code: u16,
}

impl ErrorResponse {
    fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            code,
        }
    }
}

fn error_response(e: &AgentError) -> axum::response::Response {
    let code = e.http_status_code();
    (
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(ErrorResponse::new(e.to_string(), code)),
    )
        .into_response()
}

#[derive(Debug, Deserialize)]
struct RunPodRequest {
    pod_id: String,
    desc: PodDescriptor,
}

async fn run_pod_handler(
    State(state): State<AppState>,
    Json(req): Json<RunPodRequest>,
) -> impl IntoResponse {
    match state.manager.run(&req.pod_id, req.desc) {
        Ok(()) => {
            tracing::info!(pod_id = %req.pod_id, "pod accepted via HTTP API");
            StatusCode::ACCEPTED.into_response()
        }
        Err(e) => {
            tracing::warn!(pod_id = %req.pod_id, error = %e, "failed to accept pod");
            error_response(&e)
        }
    }
}

async fn kill_pod_handler(
    State(state): State<AppState>,
    Path(pod_id): Path<String>,
) -> impl IntoResponse {
    state.manager.kill(&pod_id);
    StatusCode::ACCEPTED
}

async fn query_pod_handler(
    State(state): State<AppState>,
    Path(pod_id): Path<String>,
) -> impl IntoResponse {
    match state.manager.query(&pod_id) {
        Ok(info) => Json(info).into_response(),
        Err(e) => error_response(&e),
    }
}

#[derive(Serialize)]
struct ListPodsResponse {
    pod_ids: Vec<String>,
}

async fn list_pods_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(ListPodsResponse {
        pod_ids: state.manager.list(),
    })
}

fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/v1/pods", post(run_pod_handler).get(list_pods_handler))
        .route(
            "/v1/pods/:pod_id",
            get(query_pod_handler).delete(kill_pod_handler),
        )
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,warden=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("starting warden-agent");

    let listen_addr = std::env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8081".to_string());
    let config = AgentConfig::from_env();
    tracing::info!(
        gce_work_dir = %config.gce_work_dir,
        agent_initd_bin = %config.agent_initd_bin,
        "loaded agent configuration"
    );

    let manager = Arc::new(PodManager::new(Arc::new(RealProcessLauncher), config));

    warden_agent::pod_manager::spawn_monitor_loop(Arc::clone(&manager), Arc::new(NoopTaskManager));
    tracing::info!("started pod monitor loop");

    let state = AppState { manager };
    let app = create_router(state);

    tracing::info!(listen_addr = %listen_addr, "starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
