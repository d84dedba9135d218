use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::engine::ReconciliationEngine;
use crate::snapshot::RepositoryStore;
use crate::types::{InstructorSummary, MajorSummary, RepositoryReport, StudentSummary};

#[derive(Clone)]
struct ApiState {
    engine: Arc<ReconciliationEngine>,
    db_path: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct ApiResponse<T: Serialize> {
    ok: bool,
    data: T,
}

#[derive(Debug, Serialize)]
struct ApiErrorBody {
    ok: bool,
    error: String,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    fn internal(error: impl std::fmt::Display) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: error.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ApiErrorBody {
            ok: false,
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<ApiResponse<T>>, ApiError>;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

fn router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/v1/report", get(report))
        .route("/v1/students", get(students))
        .route("/v1/instructors", get(instructors))
        .route("/v1/instructors/db", get(instructors_from_db))
        .route("/v1/majors", get(majors))
        .layer(cors)
        .with_state(state)
}

pub async fn run_server(
    engine: ReconciliationEngine,
    db_path: Option<PathBuf>,
    bind: SocketAddr,
) -> Result<()> {
    let state = ApiState {
        engine: Arc::new(engine),
        db_path,
    };
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("REST API listening on http://{bind}");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn health() -> Json<ApiResponse<HealthResponse>> {
    ok(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn report(State(state): State<ApiState>) -> Json<ApiResponse<RepositoryReport>> {
    ok(state.engine.report())
}

async fn students(State(state): State<ApiState>) -> Json<ApiResponse<Vec<StudentSummary>>> {
    ok(state.engine.student_summaries().collect())
}

async fn instructors(State(state): State<ApiState>) -> Json<ApiResponse<Vec<InstructorSummary>>> {
    ok(state.engine.instructor_summaries().collect())
}

async fn majors(State(state): State<ApiState>) -> Json<ApiResponse<Vec<MajorSummary>>> {
    ok(state.engine.major_summaries().collect())
}

async fn instructors_from_db(State(state): State<ApiState>) -> ApiResult<Vec<InstructorSummary>> {
    let Some(db_path) = state.db_path.as_ref() else {
        return Err(ApiError::not_found("no repository store configured"));
    };
    if !db_path.exists() {
        return Err(ApiError::not_found(format!(
            "repository store not found: {}",
            db_path.display()
        )));
    }
    let db_path = db_path.clone();
    let rows = tokio::task::spawn_blocking(move || {
        RepositoryStore::open(&db_path)?.instructor_summary()
    })
    .await
    .map_err(ApiError::internal)?
    .map_err(ApiError::internal)?;
    Ok(ok(rows))
}

fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse { ok: true, data })
}
