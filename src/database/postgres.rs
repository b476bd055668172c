use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};

use crate::database::store::{CatalogStore, InterviewStore, NotificationDispatcher};
use crate::error::{Error, Result};
use crate::models::actor::Role;
use crate::models::candidate::Candidate;
use crate::models::cbi_template::{CbiTemplate, TemplateCompetency};
use crate::models::competency_question::{CompetencyQuestion, QuestionFilter};
use crate::models::interview_response::{
    BehavioralFlags, InterviewResponse, NewInterviewResponse,
};
use crate::models::interview_session::{
    InterviewSession, NewInterviewSession, QuestionSnapshot, SessionStatus,
};
use crate::models::notification::{NewNotification, Notification};
use crate::models::scope::{Scope, Visibility};
use crate::models::user::User;
use crate::services::scoring::ScoreSummary;

const QUESTION_COLUMNS: &str = r#"
    q.competency_question_id, q.competency_id, c.competency AS competency_name,
    q.level, q.question, q.client_id, q.status, q.created_at, q.updated_at
"#;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn corrupt(column: &str, err: String) -> Error {
    Error::Internal(format!("Corrupt {} value: {}", column, err))
}

#[derive(FromRow)]
struct TemplateRow {
    cbi_template_id: i64,
    template_name: String,
    description: Option<String>,
    questions: Option<Json<Vec<i64>>>,
    competencies: Option<Json<Vec<TemplateCompetency>>>,
    client_id: i64,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TemplateRow> for CbiTemplate {
    type Error = Error;

    fn try_from(row: TemplateRow) -> Result<Self> {
        Ok(Self {
            id: row.cbi_template_id,
            name: row.template_name,
            description: row.description,
            questions: row.questions.map(|j| j.0).unwrap_or_default(),
            competencies: row.competencies.map(|j| j.0).unwrap_or_default(),
            scope: Scope::from_client_id(row.client_id),
            status: row.status.parse().map_err(|e| corrupt("template status", e))?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct QuestionRow {
    competency_question_id: i64,
    competency_id: i64,
    competency_name: Option<String>,
    level: i32,
    question: String,
    client_id: i64,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<QuestionRow> for CompetencyQuestion {
    type Error = Error;

    fn try_from(row: QuestionRow) -> Result<Self> {
        Ok(Self {
            id: row.competency_question_id,
            competency_id: row.competency_id,
            competency_name: row.competency_name,
            level: row.level,
            question: row.question,
            scope: Scope::from_client_id(row.client_id),
            status: row.status.parse().map_err(|e| corrupt("question status", e))?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct CandidateRow {
    candidate_id: i64,
    name: String,
    surname: String,
    email: Option<String>,
    phone: Option<String>,
    client_id: i64,
    created_at: DateTime<Utc>,
}

impl From<CandidateRow> for Candidate {
    fn from(row: CandidateRow) -> Self {
        Self {
            id: row.candidate_id,
            name: row.name,
            surname: row.surname,
            email: row.email,
            phone: row.phone,
            scope: Scope::from_client_id(row.client_id),
            created_at: row.created_at,
        }
    }
}

#[derive(FromRow)]
struct UserRow {
    user_id: i64,
    name: String,
    surname: String,
    email: String,
    role: String,
    client_id: i64,
}

impl TryFrom<UserRow> for User {
    type Error = Error;

    fn try_from(row: UserRow) -> Result<Self> {
        Ok(Self {
            id: row.user_id,
            name: row.name,
            surname: row.surname,
            email: row.email,
            role: row.role.parse::<Role>().map_err(|e| corrupt("user role", e))?,
            scope: Scope::from_client_id(row.client_id),
        })
    }
}

#[derive(FromRow)]
struct SessionRow {
    session_id: i64,
    candidate_id: i64,
    cbi_template_id: i64,
    interviewer_id: i64,
    token: String,
    questions: Json<Vec<QuestionSnapshot>>,
    status: String,
    expires_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    total_score: Option<i32>,
    max_possible_score: Option<i32>,
    percentage: Option<f64>,
    client_id: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SessionRow> for InterviewSession {
    type Error = Error;

    fn try_from(row: SessionRow) -> Result<Self> {
        Ok(Self {
            id: row.session_id,
            candidate_id: row.candidate_id,
            template_id: row.cbi_template_id,
            interviewer_id: row.interviewer_id,
            token: row.token,
            questions: row.questions.0,
            status: row.status.parse().map_err(|e| corrupt("session status", e))?,
            expires_at: row.expires_at,
            completed_at: row.completed_at,
            total_score: row.total_score,
            max_possible_score: row.max_possible_score,
            percentage: row.percentage,
            scope: Scope::from_client_id(row.client_id),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct ResponseRow {
    response_id: i64,
    session_id: i64,
    question_id: i64,
    competency_id: i64,
    rating: i32,
    notes: Option<String>,
    behavioral_flags: Option<Json<BehavioralFlags>>,
    created_at: DateTime<Utc>,
}

impl From<ResponseRow> for InterviewResponse {
    fn from(row: ResponseRow) -> Self {
        Self {
            id: row.response_id,
            session_id: row.session_id,
            question_id: row.question_id,
            competency_id: row.competency_id,
            rating: row.rating,
            notes: row.notes,
            behavioral_flags: row.behavioral_flags.map(|j| j.0),
            created_at: row.created_at,
        }
    }
}

#[derive(FromRow)]
struct NotificationRow {
    notification_id: i64,
    user_id: i64,
    #[sqlx(rename = "type")]
    kind: String,
    title: String,
    message: String,
    is_read: bool,
    reference_type: Option<String>,
    reference_id: Option<i64>,
    client_id: i64,
    created_at: DateTime<Utc>,
}

impl TryFrom<NotificationRow> for Notification {
    type Error = Error;

    fn try_from(row: NotificationRow) -> Result<Self> {
        Ok(Self {
            id: row.notification_id,
            user_id: row.user_id,
            kind: row.kind.parse().map_err(|e| corrupt("notification type", e))?,
            title: row.title,
            message: row.message,
            is_read: row.is_read,
            reference_type: row.reference_type,
            reference_id: row.reference_id,
            scope: Scope::from_client_id(row.client_id),
            created_at: row.created_at,
        })
    }
}

fn into_questions(rows: Vec<QuestionRow>) -> Result<Vec<CompetencyQuestion>> {
    rows.into_iter().map(CompetencyQuestion::try_from).collect()
}

fn into_sessions(rows: Vec<SessionRow>) -> Result<Vec<InterviewSession>> {
    rows.into_iter().map(InterviewSession::try_from).collect()
}

#[async_trait]
impl CatalogStore for PgStore {
    async fn find_template(&self, id: i64) -> Result<Option<CbiTemplate>> {
        let row = sqlx::query_as::<_, TemplateRow>(
            r#"SELECT cbi_template_id, template_name, description, questions, competencies,
                      client_id, status, created_at, updated_at
               FROM cbi_templates WHERE cbi_template_id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(CbiTemplate::try_from).transpose()
    }

    async fn find_questions_by_ids(&self, ids: &[i64]) -> Result<Vec<CompetencyQuestion>> {
        let sql = format!(
            r#"SELECT {QUESTION_COLUMNS}
               FROM competency_questions q
               LEFT JOIN competencies c ON c.competency_id = q.competency_id
               WHERE q.competency_question_id = ANY($1)
               ORDER BY q.competency_question_id"#
        );
        let rows = sqlx::query_as::<_, QuestionRow>(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        into_questions(rows)
    }

    async fn find_active_questions(
        &self,
        competency_id: i64,
        level: i32,
        visibility: Visibility,
    ) -> Result<Vec<CompetencyQuestion>> {
        let sql = format!(
            r#"SELECT {QUESTION_COLUMNS}
               FROM competency_questions q
               LEFT JOIN competencies c ON c.competency_id = q.competency_id
               WHERE q.competency_id = $1
                 AND q.level = $2
                 AND q.status = 'Active'
                 AND ($3::BIGINT IS NULL OR q.client_id IN ($4, $3))
               ORDER BY q.competency_question_id"#
        );
        let rows = sqlx::query_as::<_, QuestionRow>(&sql)
            .bind(competency_id)
            .bind(level)
            .bind(visibility.tenant_filter())
            .bind(Scope::Global.client_id())
            .fetch_all(&self.pool)
            .await?;
        into_questions(rows)
    }

    async fn list_questions(
        &self,
        filter: QuestionFilter,
        visibility: Visibility,
    ) -> Result<Vec<CompetencyQuestion>> {
        let sql = format!(
            r#"SELECT {QUESTION_COLUMNS}
               FROM competency_questions q
               LEFT JOIN competencies c ON c.competency_id = q.competency_id
               WHERE q.status IN ('Active', 'Inactive')
                 AND ($1::BIGINT IS NULL OR q.competency_id = $1)
                 AND ($2::INT IS NULL OR q.level = $2)
                 AND ($3::BIGINT IS NULL OR q.client_id IN ($4, $3))
               ORDER BY q.competency_question_id"#
        );
        let rows = sqlx::query_as::<_, QuestionRow>(&sql)
            .bind(filter.competency_id)
            .bind(filter.level)
            .bind(visibility.tenant_filter())
            .bind(Scope::Global.client_id())
            .fetch_all(&self.pool)
            .await?;
        into_questions(rows)
    }

    async fn find_candidate(&self, id: i64) -> Result<Option<Candidate>> {
        let row = sqlx::query_as::<_, CandidateRow>(
            r#"SELECT candidate_id, name, surname, email, phone, client_id, created_at
               FROM candidates WHERE candidate_id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Candidate::from))
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"SELECT user_id, name, surname, email, role, client_id
               FROM users WHERE user_id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(User::try_from).transpose()
    }
}

#[async_trait]
impl InterviewStore for PgStore {
    async fn insert_session(&self, new: NewInterviewSession) -> Result<InterviewSession> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            INSERT INTO interview_sessions (
                candidate_id, cbi_template_id, interviewer_id, token, questions,
                status, expires_at, client_id, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
            RETURNING *
            "#,
        )
        .bind(new.candidate_id)
        .bind(new.template_id)
        .bind(new.interviewer_id)
        .bind(&new.token)
        .bind(Json(&new.questions))
        .bind(SessionStatus::Pending.as_str())
        .bind(new.expires_at)
        .bind(new.scope.client_id())
        .bind(new.created_at)
        .fetch_one(&self.pool)
        .await?;
        row.try_into()
    }

    async fn find_session(&self, id: i64) -> Result<Option<InterviewSession>> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"SELECT * FROM interview_sessions WHERE session_id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(InterviewSession::try_from).transpose()
    }

    async fn find_session_by_token(&self, token: &str) -> Result<Option<InterviewSession>> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"SELECT * FROM interview_sessions WHERE token = $1"#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        row.map(InterviewSession::try_from).transpose()
    }

    async fn list_sessions(&self, owner: Option<Scope>) -> Result<Vec<InterviewSession>> {
        let rows = sqlx::query_as::<_, SessionRow>(
            r#"SELECT * FROM interview_sessions
               WHERE ($1::BIGINT IS NULL OR client_id = $1)
               ORDER BY created_at DESC, session_id DESC"#,
        )
        .bind(owner.map(Scope::client_id))
        .fetch_all(&self.pool)
        .await?;
        into_sessions(rows)
    }

    async fn transition(
        &self,
        id: i64,
        from: SessionStatus,
        to: SessionStatus,
    ) -> Result<Option<InterviewSession>> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"UPDATE interview_sessions
               SET status = $3, updated_at = NOW()
               WHERE session_id = $1 AND status = $2
               RETURNING *"#,
        )
        .bind(id)
        .bind(from.as_str())
        .bind(to.as_str())
        .fetch_optional(&self.pool)
        .await?;
        row.map(InterviewSession::try_from).transpose()
    }

    async fn complete_submission(
        &self,
        id: i64,
        from: SessionStatus,
        responses: Vec<NewInterviewResponse>,
        completed_at: DateTime<Utc>,
    ) -> Result<Option<InterviewSession>> {
        let mut tx = self.pool.begin().await?;

        // Row lock taken here serializes concurrent submissions; the loser
        // re-evaluates the guard after the winner commits and matches nothing.
        let claimed: Option<i64> = sqlx::query_scalar(
            r#"UPDATE interview_sessions
               SET status = $3, completed_at = $4, updated_at = NOW()
               WHERE session_id = $1 AND status = $2
               RETURNING session_id"#,
        )
        .bind(id)
        .bind(from.as_str())
        .bind(SessionStatus::Completed.as_str())
        .bind(completed_at)
        .fetch_optional(&mut *tx)
        .await?;

        if claimed.is_none() {
            tx.rollback().await?;
            return Ok(None);
        }

        for response in &responses {
            sqlx::query(
                r#"INSERT INTO interview_responses
                       (session_id, question_id, competency_id, rating, notes, behavioral_flags, created_at)
                   VALUES ($1, $2, $3, $4, $5, $6, $7)"#,
            )
            .bind(id)
            .bind(response.question_id)
            .bind(response.competency_id)
            .bind(response.rating)
            .bind(response.notes.as_deref())
            .bind(response.behavioral_flags.as_ref().map(Json))
            .bind(completed_at)
            .execute(&mut *tx)
            .await?;
        }

        let ratings: Vec<i32> =
            sqlx::query_scalar(r#"SELECT rating FROM interview_responses WHERE session_id = $1"#)
                .bind(id)
                .fetch_all(&mut *tx)
                .await?;
        let score = ScoreSummary::from_ratings(ratings);

        let row = sqlx::query_as::<_, SessionRow>(
            r#"UPDATE interview_sessions
               SET total_score = $2, max_possible_score = $3, percentage = $4
               WHERE session_id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(score.total_score)
        .bind(score.max_possible_score)
        .bind(score.percentage)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        InterviewSession::try_from(row).map(Some)
    }

    async fn list_responses(&self, session_id: i64) -> Result<Vec<InterviewResponse>> {
        let rows = sqlx::query_as::<_, ResponseRow>(
            r#"SELECT response_id, session_id, question_id, competency_id, rating, notes,
                      behavioral_flags, created_at
               FROM interview_responses
               WHERE session_id = $1
               ORDER BY response_id ASC"#,
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(InterviewResponse::from).collect())
    }

    async fn update_response_rating(
        &self,
        session_id: i64,
        response_id: i64,
        rating: i32,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"UPDATE interview_responses SET rating = $3
               WHERE response_id = $1 AND session_id = $2"#,
        )
        .bind(response_id)
        .bind(session_id)
        .bind(rating)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn save_score(
        &self,
        session_id: i64,
        score: ScoreSummary,
        status: SessionStatus,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<InterviewSession> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"UPDATE interview_sessions
               SET total_score = $2, max_possible_score = $3, percentage = $4,
                   status = $5, completed_at = $6, updated_at = NOW()
               WHERE session_id = $1
               RETURNING *"#,
        )
        .bind(session_id)
        .bind(score.total_score)
        .bind(score.max_possible_score)
        .bind(score.percentage)
        .bind(status.as_str())
        .bind(completed_at)
        .fetch_one(&self.pool)
        .await?;
        row.try_into()
    }
}

#[async_trait]
impl NotificationDispatcher for PgStore {
    async fn create(&self, new: NewNotification) -> Result<Notification> {
        let row = sqlx::query_as::<_, NotificationRow>(
            r#"
            INSERT INTO notifications (user_id, type, title, message, reference_type, reference_id, client_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING notification_id, user_id, type, title, message, is_read,
                      reference_type, reference_id, client_id, created_at
            "#,
        )
        .bind(new.user_id)
        .bind(new.kind.as_str())
        .bind(&new.title)
        .bind(&new.message)
        .bind(new.reference_type.as_deref())
        .bind(new.reference_id)
        .bind(new.scope.client_id())
        .fetch_one(&self.pool)
        .await?;
        row.try_into()
    }
}
