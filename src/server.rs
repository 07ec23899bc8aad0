use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use log::{error, info};
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::data::{
    RegistrationInput, RegistrationOutput, RegistrationRequest, RequestOutcome, Student,
    StudentId,
};
use crate::error::ScheduleError;
use crate::report::{self, StudentReport};
use crate::solver::{self, FallbackPolicy, Registrar, SharedRegistrar};

type ApiError = (StatusCode, String);

#[derive(Clone)]
struct AppState {
    registrar: SharedRegistrar,
    fallback: FallbackPolicy,
}

/// Students to register and requests to queue on the shared registrar.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    #[serde(default)]
    pub students: Vec<Student>,
    pub requests: Vec<RegistrationRequest>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    pub queued: usize,
}

fn schedule_error(err: ScheduleError) -> ApiError {
    let status = match err {
        ScheduleError::Poisoned => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_REQUEST,
    };
    (status, err.to_string())
}

async fn solve_handler(
    State(state): State<AppState>,
    Json(input): Json<RegistrationInput>,
) -> Result<Json<RegistrationOutput>, ApiError> {
    match solver::solve(&input, state.fallback) {
        Ok(output) => Ok(Json(output)),
        Err(e) => Err((StatusCode::BAD_REQUEST, e.to_string())),
    }
}

async fn submit_handler(
    State(state): State<AppState>,
    Json(submission): Json<Submission>,
) -> Result<Json<SubmissionReceipt>, ApiError> {
    let queued = state
        .registrar
        .lock()
        .map_err(schedule_error)?
        .submit_batch(submission.students, submission.requests)
        .map_err(schedule_error)?;
    Ok(Json(SubmissionReceipt { queued }))
}

async fn process_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<RequestOutcome>>, ApiError> {
    let outcomes = state.registrar.process_pending().map_err(schedule_error)?;
    Ok(Json(outcomes))
}

async fn schedule_handler(
    State(state): State<AppState>,
    Path(student): Path<StudentId>,
) -> Result<Json<StudentReport>, ApiError> {
    let registrar = state.registrar.lock().map_err(schedule_error)?;
    report::student_report(registrar.optimizer(), student)
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, format!("unknown student {student}")))
}

pub fn router(registrar: SharedRegistrar, fallback: FallbackPolicy) -> Router {
    Router::new()
        .route("/v1/registration/solve", post(solve_handler))
        .route("/v1/registration/requests", post(submit_handler))
        .route("/v1/registration/process", post(process_handler))
        .route("/v1/students/:id/schedule", get(schedule_handler))
        .with_state(AppState {
            registrar,
            fallback,
        })
}

pub async fn run_server(bind_address: &str, fallback: FallbackPolicy) -> std::io::Result<()> {
    let registrar = SharedRegistrar::new(Registrar::new(Catalog::standard(), fallback));
    let app = router(registrar, fallback);

    let listener = tokio::net::TcpListener::bind(bind_address).await?;
    info!("Server running at http://{}", listener.local_addr()?);

    axum::serve(listener, app).await.inspect_err(|e| error!("Server stopped: {e}"))
}
