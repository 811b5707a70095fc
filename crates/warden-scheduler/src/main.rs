//! Warden Scheduler — cluster placement engine HTTP service.
//!
//! # HTTP Endpoints
//!
//! ## Health
//! - `GET /health` - Health check
//!
//! ## Snapshot ingestion
//! - `POST /v1/resources` - Replace the resource snapshot
//! - `POST /v1/jobs/overview` - Replace the job-overview table
//! - `POST /v1/agents/:endpoint` - Replace a single agent's record
//!
//! ## Scheduling
//! - `POST /v1/schedule/scale-up` - Run a scale-up pass
//! - `POST /v1/schedule/scale-down` - Run a scale-down pass
//! - `POST /v1/schedule/overload` - Run an overload-preemption pass

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use warden_core::{AgentInfo, Endpoint, JobInfo, JobOverview, ScheduleInfo};
use warden_scheduler::{PlacementEngine, SchedulerConfig};

#[derive(Clone)]
struct AppState {
    engine: Arc<PlacementEngine>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
}

async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        service: "warden-scheduler",
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

async fn sync_resources_handler(
    State(state): State<AppState>,
    Json(agents): Json<Vec<AgentInfo>>,
) -> impl IntoResponse {
    let count = agents.len();
    state.engine.sync_resources(agents);
    tracing::info!(agent_count = count, "synced resource snapshot");
    StatusCode::NO_CONTENT
}

async fn sync_job_overview_handler(
    State(state): State<AppState>,
    Json(overview): Json<Vec<JobOverview>>,
) -> impl IntoResponse {
    let count = overview.len();
    state.engine.sync_job_overview(overview);
    tracing::info!(job_count = count, "synced job overview");
    StatusCode::NO_CONTENT
}

async fn update_agent_handler(
    State(state): State<AppState>,
    Path(endpoint): Path<String>,
    Json(agent): Json<AgentInfo>,
) -> impl IntoResponse {
    if agent.endpoint != Endpoint::from(endpoint.as_str()) {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("path endpoint does not match body", 400)),
        )
            .into_response();
    }
    let replaced = state.engine.update_agent(agent);
    if replaced {
        StatusCode::OK.into_response()
    } else {
        (StatusCode::CREATED, Json(())).into_response()
    }
}

#[derive(Serialize)]
struct ProposalsResponse {
    proposals: Vec<ScheduleInfo>,
}

async fn scale_up_handler(
    State(state): State<AppState>,
    Json(jobs): Json<Vec<JobInfo>>,
) -> impl IntoResponse {
    let proposals = state.engine.schedule_scale_up(&jobs);
    tracing::info!(count = proposals.len(), "scale-up pass complete");
    Json(ProposalsResponse { proposals })
}

async fn scale_down_handler(
    State(state): State<AppState>,
    Json(jobs): Json<Vec<JobInfo>>,
) -> impl IntoResponse {
    let proposals = state.engine.schedule_scale_down(&jobs);
    tracing::info!(count = proposals.len(), "scale-down pass complete");
    Json(ProposalsResponse { proposals })
}

async fn overload_handler(State(state): State<AppState>) -> impl IntoResponse {
    let proposals = state.engine.schedule_agent_overload();
    if !proposals.is_empty() {
        tracing::warn!(count = proposals.len(), "overload preemption proposed");
    }
    Json(ProposalsResponse { proposals })
}

fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/v1/resources", post(sync_resources_handler))
        .route("/v1/jobs/overview", post(sync_job_overview_handler))
        .route("/v1/agents/:endpoint", post(update_agent_handler))
        .route("/v1/schedule/scale-up", post(scale_up_handler))
        .route("/v1/schedule/scale-down", post(scale_down_handler))
        .route("/v1/schedule/overload", post(overload_handler))
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

    tracing::info!("starting warden-scheduler");

    let listen_addr = std::env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let config = SchedulerConfig::from_env();
    tracing::info!(?config, "loaded scheduler configuration");

    let engine = Arc::new(PlacementEngine::new(config));
    let state = AppState { engine };
    let app = create_router(state);

    tracing::info!(listen_addr = %listen_addr, "starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
