use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::{IntoResponse, Json},
    Extension,
};
use validator::Validate;

use crate::dto::question_dto::QuestionQuery;
use crate::error::{Error, Result};
use crate::models::actor::Actor;
use crate::models::competency_question::CompetencyQuestion;
use crate::AppState;

#[utoipa::path(
    get,
    path = "/api/questions",
    params(QuestionQuery),
    responses(
        (status = 200, description = "Visible question bank entries", body = [CompetencyQuestion]),
        (status = 400, description = "Invalid filter")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn list_questions(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    query: std::result::Result<Query<QuestionQuery>, QueryRejection>,
) -> Result<impl IntoResponse> {
    let Query(query) = query.map_err(|e| Error::BadRequest(e.body_text()))?;
    query.validate()?;
    let questions = state
        .question_service
        .list_questions(&actor, query.into())
        .await?;
    Ok(Json(questions))
}
