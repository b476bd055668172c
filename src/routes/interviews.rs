use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use validator::Validate;

use crate::dto::interview_dto::{
    CreateInterviewPayload, InterviewSessionDetail, UpdateScoresPayload,
};
use crate::error::Result;
use crate::models::actor::Actor;
use crate::models::interview_response::InterviewResponse;
use crate::models::interview_session::InterviewSession;
use crate::routes::json_body;
use crate::AppState;

#[utoipa::path(
    post,
    path = "/api/interviews",
    request_body = CreateInterviewPayload,
    responses(
        (status = 201, description = "Interview session created", body = InterviewSessionDetail),
        (status = 400, description = "Invalid payload or template without questions"),
        (status = 403, description = "Role cannot create sessions"),
        (status = 404, description = "Template not found")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn create_interview(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    payload: std::result::Result<Json<CreateInterviewPayload>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let payload = json_body(payload)?;
    payload.validate()?;
    let session = state.interview_service.create(payload, &actor).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

#[utoipa::path(
    get,
    path = "/api/interviews",
    responses(
        (status = 200, description = "Visible interview sessions, newest first", body = [InterviewSessionDetail])
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn list_interviews(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<impl IntoResponse> {
    let sessions = state.interview_service.find_all(&actor).await?;
    Ok(Json(sessions))
}

#[utoipa::path(
    get,
    path = "/api/interviews/{id}",
    params(
        ("id" = i64, Path, description = "Interview session ID")
    ),
    responses(
        (status = 200, description = "Interview session", body = InterviewSessionDetail),
        (status = 403, description = "Session belongs to another tenant"),
        (status = 404, description = "Interview session not found")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn get_interview(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    let session = state.interview_service.find_one(id, &actor).await?;
    Ok(Json(session))
}

#[utoipa::path(
    get,
    path = "/api/interviews/{id}/responses",
    params(
        ("id" = i64, Path, description = "Interview session ID")
    ),
    responses(
        (status = 200, description = "Stored responses ordered by id", body = [InterviewResponse]),
        (status = 403, description = "Session belongs to another tenant"),
        (status = 404, description = "Interview session not found")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn get_interview_responses(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    let responses = state.interview_service.get_responses(id, &actor).await?;
    Ok(Json(responses))
}

#[utoipa::path(
    patch,
    path = "/api/interviews/{id}/score",
    params(
        ("id" = i64, Path, description = "Interview session ID")
    ),
    request_body = UpdateScoresPayload,
    responses(
        (status = 200, description = "Rescored session", body = InterviewSession),
        (status = 400, description = "Invalid payload"),
        (status = 403, description = "Role or tenant cannot correct this session"),
        (status = 404, description = "Session or response not found")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn update_interview_scores(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
    payload: std::result::Result<Json<UpdateScoresPayload>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let payload = json_body(payload)?;
    payload.validate()?;
    let session = state
        .interview_service
        .update_scores(id, payload, &actor)
        .await?;
    Ok(Json(session))
}

#[utoipa::path(
    delete,
    path = "/api/interviews/{id}",
    params(
        ("id" = i64, Path, description = "Interview session ID")
    ),
    responses(
        (status = 200, description = "Session expired", body = InterviewSession),
        (status = 400, description = "Session already completed"),
        (status = 403, description = "Role or tenant cannot cancel this session"),
        (status = 404, description = "Interview session not found")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn cancel_interview(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    let session = state.interview_service.cancel(id, &actor).await?;
    Ok(Json(session))
}
