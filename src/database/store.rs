//! Persistence seams of the interview engine.
//!
//! The engine only reads from the catalogue (templates, question bank,
//! candidates, users), owns the session/response tables, and hands
//! notifications to a dispatcher it never waits on for correctness.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::candidate::Candidate;
use crate::models::cbi_template::CbiTemplate;
use crate::models::competency_question::{CompetencyQuestion, QuestionFilter};
use crate::models::interview_response::{InterviewResponse, NewInterviewResponse};
use crate::models::interview_session::{InterviewSession, NewInterviewSession, SessionStatus};
use crate::models::notification::{NewNotification, Notification};
use crate::models::scope::{Scope, Visibility};
use crate::models::user::User;
use crate::services::scoring::ScoreSummary;

#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn find_template(&self, id: i64) -> Result<Option<CbiTemplate>>;

    /// Rows for the given ids in storage order, regardless of status.
    async fn find_questions_by_ids(&self, ids: &[i64]) -> Result<Vec<CompetencyQuestion>>;

    /// Active questions for one competency/level pair, ordered by id.
    async fn find_active_questions(
        &self,
        competency_id: i64,
        level: i32,
        visibility: Visibility,
    ) -> Result<Vec<CompetencyQuestion>>;

    /// Active and inactive questions, ordered by id.
    async fn list_questions(
        &self,
        filter: QuestionFilter,
        visibility: Visibility,
    ) -> Result<Vec<CompetencyQuestion>>;

    async fn find_candidate(&self, id: i64) -> Result<Option<Candidate>>;

    async fn find_user(&self, id: i64) -> Result<Option<User>>;
}

#[async_trait]
pub trait InterviewStore: Send + Sync {
    async fn insert_session(&self, session: NewInterviewSession) -> Result<InterviewSession>;

    async fn find_session(&self, id: i64) -> Result<Option<InterviewSession>>;

    async fn find_session_by_token(&self, token: &str) -> Result<Option<InterviewSession>>;

    /// Newest first. `None` lists every owner.
    async fn list_sessions(&self, owner: Option<Scope>) -> Result<Vec<InterviewSession>>;

    /// Compare-and-set on status. Returns `None` when the stored status no
    /// longer equals `from`.
    async fn transition(
        &self,
        id: i64,
        from: SessionStatus,
        to: SessionStatus,
    ) -> Result<Option<InterviewSession>>;

    /// Atomically claims the session for completion (guarded by `from`),
    /// stores the responses and writes the score recomputed from every stored
    /// response. Returns `None`, writing nothing, when the guard fails.
    async fn complete_submission(
        &self,
        id: i64,
        from: SessionStatus,
        responses: Vec<NewInterviewResponse>,
        completed_at: DateTime<Utc>,
    ) -> Result<Option<InterviewSession>>;

    /// Ordered by response id.
    async fn list_responses(&self, session_id: i64) -> Result<Vec<InterviewResponse>>;

    /// Matches on both ids. Returns whether a row was updated.
    async fn update_response_rating(
        &self,
        session_id: i64,
        response_id: i64,
        rating: i32,
    ) -> Result<bool>;

    async fn save_score(
        &self,
        session_id: i64,
        score: ScoreSummary,
        status: SessionStatus,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<InterviewSession>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn create(&self, notification: NewNotification) -> Result<Notification>;
}
