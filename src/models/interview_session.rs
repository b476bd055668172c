use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::models::scope::Scope;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum SessionStatus {
    Pending,
    InProgress,
    Completed,
    Expired,
}

/// Things that can happen to a session. Every status change goes through
/// [`SessionStatus::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// The candidate opened the public form.
    Open,
    /// The candidate submitted their answers.
    Submit,
    /// An access observed `now > expires_at`.
    Lapse,
    /// Staff withdrew the link.
    Cancel,
    /// Staff corrected ratings; scoring finalizes the session.
    Finalize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("This interview link has expired")]
    Expired,
    #[error("This interview has already been completed")]
    AlreadyCompleted,
    #[error("Cannot cancel a completed session")]
    CannotCancelCompleted,
}

impl SessionStatus {
    pub fn apply(self, event: SessionEvent) -> Result<SessionStatus, TransitionError> {
        use SessionEvent::*;
        use SessionStatus::*;

        match (self, event) {
            (Pending | InProgress, Open) => Ok(InProgress),
            (Pending | InProgress, Submit) => Ok(Completed),
            (Pending | InProgress | Expired, Lapse | Cancel) => Ok(Expired),
            (_, Finalize) => Ok(Completed),

            (Completed, Cancel) => Err(TransitionError::CannotCancelCompleted),
            (Completed, Open | Submit | Lapse) => Err(TransitionError::AlreadyCompleted),
            (Expired, Open | Submit) => Err(TransitionError::Expired),
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Expired)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::Pending => "Pending",
            SessionStatus::InProgress => "InProgress",
            SessionStatus::Completed => "Completed",
            SessionStatus::Expired => "Expired",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(SessionStatus::Pending),
            "InProgress" => Ok(SessionStatus::InProgress),
            "Completed" => Ok(SessionStatus::Completed),
            "Expired" => Ok(SessionStatus::Expired),
            other => Err(format!("unknown session status: {}", other)),
        }
    }
}

/// Frozen copy of a question as it looked when the session was issued.
/// Field set is the wire contract of the public form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct QuestionSnapshot {
    pub question_id: i64,
    pub competency_id: i64,
    pub question_text: String,
    pub competency_name: String,
    pub level: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InterviewSession {
    #[serde(rename = "session_id")]
    pub id: i64,
    pub candidate_id: i64,
    #[serde(rename = "cbi_template_id")]
    pub template_id: i64,
    pub interviewer_id: i64,
    pub token: String,
    pub questions: Vec<QuestionSnapshot>,
    pub status: SessionStatus,
    pub expires_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub total_score: Option<i32>,
    pub max_possible_score: Option<i32>,
    pub percentage: Option<f64>,
    #[serde(rename = "client_id")]
    #[schema(value_type = i64)]
    pub scope: Scope,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InterviewSession {
    /// Completed sessions never lapse.
    pub fn has_lapsed(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at && self.status != SessionStatus::Completed
    }
}

#[derive(Debug, Clone)]
pub struct NewInterviewSession {
    pub candidate_id: i64,
    pub template_id: i64,
    pub interviewer_id: i64,
    pub token: String,
    pub questions: Vec<QuestionSnapshot>,
    pub expires_at: DateTime<Utc>,
    pub scope: Scope,
    pub created_at: DateTime<Utc>,
}
