use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::{IntoResponse, Json},
};
use validator::Validate;

use crate::dto::interview_dto::{
    PublicInterviewForm, SubmitInterviewRequest, SubmitInterviewResponse,
};
use crate::error::Result;
use crate::routes::json_body;
use crate::AppState;

#[utoipa::path(
    get,
    path = "/api/public/interviews/{token}",
    params(
        ("token" = String, Path, description = "Interview link token")
    ),
    responses(
        (status = 200, description = "Interview form", body = PublicInterviewForm),
        (status = 400, description = "Link expired or interview already completed"),
        (status = 404, description = "Unknown token")
    )
)]
#[axum::debug_handler]
pub async fn get_interview_by_token(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse> {
    let form = state.interview_service.get_by_token(&token).await?;
    Ok(Json(form))
}

#[utoipa::path(
    post,
    path = "/api/public/interviews/{token}/submit",
    params(
        ("token" = String, Path, description = "Interview link token")
    ),
    request_body = SubmitInterviewRequest,
    responses(
        (status = 200, description = "Interview submitted", body = SubmitInterviewResponse),
        (status = 400, description = "Invalid payload, link expired or already submitted"),
        (status = 404, description = "Unknown token")
    )
)]
#[axum::debug_handler]
pub async fn submit_interview(
    State(state): State<AppState>,
    Path(token): Path<String>,
    payload: std::result::Result<Json<SubmitInterviewRequest>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let payload = json_body(payload)?;
    payload.validate()?;
    let result = state
        .interview_service
        .submit_by_token(&token, payload)
        .await?;
    Ok(Json(result))
}
