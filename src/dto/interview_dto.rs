use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::candidate::Candidate;
use crate::models::interview_response::{BehavioralFlags, NewInterviewResponse};
use crate::models::interview_session::{InterviewSession, QuestionSnapshot, SessionStatus};

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateInterviewPayload {
    pub candidate_id: i64,
    pub cbi_template_id: i64,
    pub interviewer_id: i64,
    #[validate(range(
        min = 1,
        max = 720,
        message = "Link expiry must be between 1 and 720 hours"
    ))]
    pub expires_in_hours: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ResponseItem {
    pub question_id: i64,
    pub competency_id: i64,
    #[validate(range(min = 0, max = 5, message = "Rating must be between 0 and 5"))]
    pub rating: Option<i32>,
    pub notes: Option<String>,
    pub behavioral_flags: Option<BehavioralFlags>,
}

impl From<ResponseItem> for NewInterviewResponse {
    fn from(item: ResponseItem) -> Self {
        Self {
            question_id: item.question_id,
            competency_id: item.competency_id,
            rating: item.rating.unwrap_or(0),
            notes: item.notes,
            behavioral_flags: item.behavioral_flags,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct SubmitInterviewRequest {
    #[validate(nested)]
    pub responses: Vec<ResponseItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubmitInterviewResponse {
    pub message: String,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ScoreCorrection {
    pub response_id: i64,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateScoresPayload {
    #[validate(length(min = 1, message = "At least one score is required"), nested)]
    pub scores: Vec<ScoreCorrection>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PublicTemplateSummary {
    pub cbi_template_id: i64,
    pub template_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InterviewerSummary {
    pub name: String,
    pub surname: String,
}

/// Session row together with the candidate, template and interviewer it
/// refers to. Relations that no longer exist are `null`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InterviewSessionDetail {
    #[serde(flatten)]
    pub session: InterviewSession,
    pub candidate: Option<Candidate>,
    pub template: Option<PublicTemplateSummary>,
    pub interviewer: Option<InterviewerSummary>,
}

/// What the candidate sees when opening their link.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PublicInterviewForm {
    pub session_id: i64,
    pub candidate: Option<Candidate>,
    pub template: PublicTemplateSummary,
    pub questions: Vec<QuestionSnapshot>,
    pub interviewer: Option<InterviewerSummary>,
    pub status: SessionStatus,
    pub expires_at: DateTime<Utc>,
}
