use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::record_status::RecordStatus;
use crate::models::scope::Scope;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CompetencyQuestion {
    #[serde(rename = "competency_question_id")]
    pub id: i64,
    pub competency_id: i64,
    /// Joined from the competency taxonomy; `None` when the link dangles.
    pub competency_name: Option<String>,
    pub level: i32,
    pub question: String,
    #[serde(rename = "client_id")]
    #[schema(value_type = i64)]
    pub scope: Scope,
    pub status: RecordStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct QuestionFilter {
    pub competency_id: Option<i64>,
    pub level: Option<i32>,
}
