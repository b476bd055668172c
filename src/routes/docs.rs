use axum::{response::IntoResponse, Json};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::dto::interview_dto::{
    CreateInterviewPayload, InterviewSessionDetail, InterviewerSummary, PublicInterviewForm,
    PublicTemplateSummary, ResponseItem, ScoreCorrection, SubmitInterviewRequest,
    SubmitInterviewResponse, UpdateScoresPayload,
};
use crate::models::candidate::Candidate;
use crate::models::competency_question::CompetencyQuestion;
use crate::models::interview_response::{BehavioralFlags, InterviewResponse};
use crate::models::interview_session::{InterviewSession, QuestionSnapshot, SessionStatus};
use crate::models::record_status::RecordStatus;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health::health,
        crate::routes::public::get_interview_by_token,
        crate::routes::public::submit_interview,
        crate::routes::interviews::create_interview,
        crate::routes::interviews::list_interviews,
        crate::routes::interviews::get_interview,
        crate::routes::interviews::get_interview_responses,
        crate::routes::interviews::update_interview_scores,
        crate::routes::interviews::cancel_interview,
        crate::routes::questions::list_questions,
    ),
    components(schemas(
        Candidate,
        CompetencyQuestion,
        RecordStatus,
        InterviewSession,
        InterviewSessionDetail,
        SessionStatus,
        QuestionSnapshot,
        InterviewResponse,
        BehavioralFlags,
        CreateInterviewPayload,
        ResponseItem,
        SubmitInterviewRequest,
        SubmitInterviewResponse,
        ScoreCorrection,
        UpdateScoresPayload,
        PublicInterviewForm,
        PublicTemplateSummary,
        InterviewerSummary,
    )),
    modifiers(&BearerAuth),
    tags((name = "interviews", description = "Competency-based interview sessions"))
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

pub async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}
