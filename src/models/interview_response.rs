use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Client-side telemetry captured while the candidate answered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BehavioralFlags {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paste_detected: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_spent_seconds: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keystroke_count: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focus_lost_count: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InterviewResponse {
    #[serde(rename = "response_id")]
    pub id: i64,
    pub session_id: i64,
    pub question_id: i64,
    pub competency_id: i64,
    pub rating: i32,
    pub notes: Option<String>,
    pub behavioral_flags: Option<BehavioralFlags>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewInterviewResponse {
    pub question_id: i64,
    pub competency_id: i64,
    pub rating: i32,
    pub notes: Option<String>,
    pub behavioral_flags: Option<BehavioralFlags>,
}
