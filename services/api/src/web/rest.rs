//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the problem REST endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::{DateTime, Utc};
use fill_blank_core::domain::{parse_problem_id, Problem, ProblemInput};
use fill_blank_core::ports::PortError;
use fill_blank_core::validation::validate_problem;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        list_problems_handler,
        create_problem_handler,
        update_problem_handler,
        delete_problem_handler,
    ),
    components(
        schemas(
            ProblemResponse,
            ProblemPayload,
            CreatedProblemResponse,
            SuccessResponse,
            ErrorResponse
        )
    ),
    tags(
        (name = "Fill-in-the-Blank API", description = "Manage fill-in-the-blank practice problems.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// A stored problem as returned by `GET /api/problems`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProblemResponse {
    pub id: Uuid,
    pub text: String,
    pub answers: Vec<String>,
    pub blanks: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<Problem> for ProblemResponse {
    fn from(problem: Problem) -> Self {
        Self {
            id: problem.id,
            text: problem.text,
            answers: problem.answers,
            blanks: problem.blanks,
            created_at: problem.created_at,
            updated_at: problem.updated_at,
        }
    }
}

impl ProblemResponse {
    pub fn into_domain(self) -> Problem {
        Problem {
            id: self.id,
            text: self.text,
            answers: self.answers,
            blanks: self.blanks,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// The body of create and update requests.
///
/// `blanks` is accepted for compatibility but the server stores the count it
/// derives from `text`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProblemPayload {
    pub text: String,
    pub answers: Vec<String>,
    #[serde(default)]
    pub blanks: usize,
}

impl From<ProblemInput> for ProblemPayload {
    fn from(input: ProblemInput) -> Self {
        Self {
            text: input.text,
            answers: input.answers,
            blanks: input.blanks,
        }
    }
}

/// The response payload sent after successfully creating a problem.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreatedProblemResponse {
    pub id: Uuid,
    pub text: String,
    pub answers: Vec<String>,
    pub blanks: usize,
}

impl CreatedProblemResponse {
    pub fn into_domain(self) -> Problem {
        Problem {
            id: self.id,
            text: self.text,
            answers: self.answers,
            blanks: self.blanks,
            created_at: None,
            updated_at: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
}

/// The uniform error body of every failed request.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

type HandlerError = (StatusCode, Json<ErrorResponse>);

/// Logs a port failure and converts it into the uniform error response.
///
/// Validation failures are the caller's fault (400); everything else, including a
/// malformed identifier, is reported as a 500.
fn port_failure(action: &str, e: PortError) -> HandlerError {
    error!("Failed to {}: {:?}", action, e);
    let status = match e {
        PortError::Validation(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(ErrorResponse { error: e.to_string() }))
}

/// Unwraps a JSON body, turning an unreadable one into a 400 with the uniform body.
fn read_payload(
    action: &str,
    payload: Result<Json<ProblemPayload>, JsonRejection>,
) -> Result<ProblemPayload, HandlerError> {
    payload.map(|Json(payload)| payload).map_err(|rejection| {
        error!("Failed to {}: {}", action, rejection.body_text());
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: rejection.body_text(),
            }),
        )
    })
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// List every stored problem.
#[utoipa::path(
    get,
    path = "/api/problems",
    responses(
        (status = 200, description = "All problems", body = [ProblemResponse]),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
pub async fn list_problems_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<ProblemResponse>>, HandlerError> {
    let problems = app_state
        .repo
        .list_problems()
        .await
        .map_err(|e| port_failure("list problems", e))?;

    Ok(Json(problems.into_iter().map(ProblemResponse::from).collect()))
}

/// Create a new problem.
#[utoipa::path(
    post,
    path = "/api/problems",
    request_body = ProblemPayload,
    responses(
        (status = 201, description = "Problem created successfully", body = CreatedProblemResponse),
        (status = 400, description = "Unreadable body, or blank markers and answers do not match", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
pub async fn create_problem_handler(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<ProblemPayload>, JsonRejection>,
) -> Result<impl IntoResponse, HandlerError> {
    let payload = read_payload("create problem", payload)?;
    let input = validate_problem(&payload.text, &payload.answers)
        .map_err(|e| port_failure("create problem", e.into()))?;

    let problem = app_state
        .repo
        .create_problem(input)
        .await
        .map_err(|e| port_failure("create problem", e))?;
    info!("Created problem {}", problem.id);

    let response = CreatedProblemResponse {
        id: problem.id,
        text: problem.text,
        answers: problem.answers,
        blanks: problem.blanks,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// Overwrite a problem's text and answers.
///
/// Reports success even when no problem has the given id.
#[utoipa::path(
    put,
    path = "/api/problems/{id}",
    request_body = ProblemPayload,
    responses(
        (status = 200, description = "Update applied", body = SuccessResponse),
        (status = 400, description = "Unreadable body, or blank markers and answers do not match", body = ErrorResponse),
        (status = 500, description = "Malformed id or storage failure", body = ErrorResponse)
    ),
    params(
        ("id" = String, Path, description = "The problem id.")
    )
)]
pub async fn update_problem_handler(
    State(app_state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
    payload: Result<Json<ProblemPayload>, JsonRejection>,
) -> Result<Json<SuccessResponse>, HandlerError> {
    let id = parse_problem_id(&raw_id).map_err(|e| port_failure("update problem", e))?;
    let payload = read_payload("update problem", payload)?;
    let input = validate_problem(&payload.text, &payload.answers)
        .map_err(|e| port_failure("update problem", e.into()))?;

    app_state
        .repo
        .update_problem(id, input)
        .await
        .map_err(|e| port_failure("update problem", e))?;
    info!("Updated problem {}", id);

    Ok(Json(SuccessResponse { success: true }))
}

/// Delete a problem.
///
/// Reports success even when no problem has the given id.
#[utoipa::path(
    delete,
    path = "/api/problems/{id}",
    responses(
        (status = 200, description = "Delete applied", body = SuccessResponse),
        (status = 500, description = "Malformed id or storage failure", body = ErrorResponse)
    ),
    params(
        ("id" = String, Path, description = "The problem id.")
    )
)]
pub async fn delete_problem_handler(
    State(app_state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<Json<SuccessResponse>, HandlerError> {
    let id = parse_problem_id(&raw_id).map_err(|e| port_failure("delete problem", e))?;

    app_state
        .repo
        .delete_problem(id)
        .await
        .map_err(|e| port_failure("delete problem", e))?;
    info!("Deleted problem {}", id);

    Ok(Json(SuccessResponse { success: true }))
}
