//! In-process store used by tests and local runs without PostgreSQL.
//!
//! A single mutex guards all tables, so every trait method is atomic with
//! respect to the others, including the completion compare-and-set.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::database::store::{CatalogStore, InterviewStore, NotificationDispatcher};
use crate::error::{Error, Result};
use crate::models::candidate::Candidate;
use crate::models::cbi_template::CbiTemplate;
use crate::models::competency_question::{CompetencyQuestion, QuestionFilter};
use crate::models::interview_response::{InterviewResponse, NewInterviewResponse};
use crate::models::interview_session::{InterviewSession, NewInterviewSession, SessionStatus};
use crate::models::notification::{NewNotification, Notification};
use crate::models::record_status::RecordStatus;
use crate::models::scope::{Scope, Visibility};
use crate::models::user::User;
use crate::services::scoring::ScoreSummary;

#[derive(Default)]
struct Tables {
    templates: BTreeMap<i64, CbiTemplate>,
    questions: BTreeMap<i64, CompetencyQuestion>,
    candidates: BTreeMap<i64, Candidate>,
    users: BTreeMap<i64, User>,
    sessions: BTreeMap<i64, InterviewSession>,
    responses: BTreeMap<i64, InterviewResponse>,
    notifications: Vec<Notification>,
    last_session_id: i64,
    last_response_id: i64,
}

impl Tables {
    fn session_mut(&mut self, id: i64) -> Result<&mut InterviewSession> {
        self.sessions
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound("Interview session not found".to_string()))
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn insert_template(&self, template: CbiTemplate) {
        self.lock().templates.insert(template.id, template);
    }

    pub fn insert_question(&self, question: CompetencyQuestion) {
        self.lock().questions.insert(question.id, question);
    }

    pub fn insert_candidate(&self, candidate: Candidate) {
        self.lock().candidates.insert(candidate.id, candidate);
    }

    pub fn insert_user(&self, user: User) {
        self.lock().users.insert(user.id, user);
    }

    /// Stands in for catalogue edits made after sessions were issued.
    pub fn update_question_text(&self, id: i64, text: &str) -> bool {
        match self.lock().questions.get_mut(&id) {
            Some(question) => {
                question.question = text.to_string();
                true
            }
            None => false,
        }
    }

    pub fn remove_template(&self, id: i64) -> Option<CbiTemplate> {
        self.lock().templates.remove(&id)
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.lock().notifications.clone()
    }

    pub fn response_count(&self, session_id: i64) -> usize {
        self.lock()
            .responses
            .values()
            .filter(|r| r.session_id == session_id)
            .count()
    }
}

fn ratings_of(tables: &Tables, session_id: i64) -> Vec<i32> {
    tables
        .responses
        .values()
        .filter(|r| r.session_id == session_id)
        .map(|r| r.rating)
        .collect()
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn find_template(&self, id: i64) -> Result<Option<CbiTemplate>> {
        Ok(self.lock().templates.get(&id).cloned())
    }

    async fn find_questions_by_ids(&self, ids: &[i64]) -> Result<Vec<CompetencyQuestion>> {
        Ok(self
            .lock()
            .questions
            .values()
            .filter(|q| ids.contains(&q.id))
            .cloned()
            .collect())
    }

    async fn find_active_questions(
        &self,
        competency_id: i64,
        level: i32,
        visibility: Visibility,
    ) -> Result<Vec<CompetencyQuestion>> {
        Ok(self
            .lock()
            .questions
            .values()
            .filter(|q| {
                q.competency_id == competency_id
                    && q.level == level
                    && q.status == RecordStatus::Active
                    && visibility.admits(q.scope)
            })
            .cloned()
            .collect())
    }

    async fn list_questions(
        &self,
        filter: QuestionFilter,
        visibility: Visibility,
    ) -> Result<Vec<CompetencyQuestion>> {
        Ok(self
            .lock()
            .questions
            .values()
            .filter(|q| q.status != RecordStatus::Deleted && visibility.admits(q.scope))
            .filter(|q| filter.competency_id.map_or(true, |id| q.competency_id == id))
            .filter(|q| filter.level.map_or(true, |level| q.level == level))
            .cloned()
            .collect())
    }

    async fn find_candidate(&self, id: i64) -> Result<Option<Candidate>> {
        Ok(self.lock().candidates.get(&id).cloned())
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>> {
        Ok(self.lock().users.get(&id).cloned())
    }
}

#[async_trait]
impl InterviewStore for MemoryStore {
    async fn insert_session(&self, new: NewInterviewSession) -> Result<InterviewSession> {
        let mut tables = self.lock();
        if tables.sessions.values().any(|s| s.token == new.token) {
            return Err(Error::Internal("duplicate session token".to_string()));
        }
        tables.last_session_id += 1;
        let session = InterviewSession {
            id: tables.last_session_id,
            candidate_id: new.candidate_id,
            template_id: new.template_id,
            interviewer_id: new.interviewer_id,
            token: new.token,
            questions: new.questions,
            status: SessionStatus::Pending,
            expires_at: new.expires_at,
            completed_at: None,
            total_score: None,
            max_possible_score: None,
            percentage: None,
            scope: new.scope,
            created_at: new.created_at,
            updated_at: new.created_at,
        };
        tables.sessions.insert(session.id, session.clone());
        Ok(session)
    }

    async fn find_session(&self, id: i64) -> Result<Option<InterviewSession>> {
        Ok(self.lock().sessions.get(&id).cloned())
    }

    async fn find_session_by_token(&self, token: &str) -> Result<Option<InterviewSession>> {
        Ok(self
            .lock()
            .sessions
            .values()
            .find(|s| s.token == token)
            .cloned())
    }

    async fn list_sessions(&self, owner: Option<Scope>) -> Result<Vec<InterviewSession>> {
        let mut sessions: Vec<InterviewSession> = self
            .lock()
            .sessions
            .values()
            .filter(|s| owner.map_or(true, |scope| s.scope == scope))
            .cloned()
            .collect();
        sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(sessions)
    }

    async fn transition(
        &self,
        id: i64,
        from: SessionStatus,
        to: SessionStatus,
    ) -> Result<Option<InterviewSession>> {
        let mut tables = self.lock();
        let Some(session) = tables.sessions.get_mut(&id) else {
            return Ok(None);
        };
        if session.status != from {
            return Ok(None);
        }
        session.status = to;
        session.updated_at = Utc::now();
        Ok(Some(session.clone()))
    }

    async fn complete_submission(
        &self,
        id: i64,
        from: SessionStatus,
        responses: Vec<NewInterviewResponse>,
        completed_at: DateTime<Utc>,
    ) -> Result<Option<InterviewSession>> {
        let mut tables = self.lock();
        match tables.sessions.get(&id) {
            Some(session) if session.status == from => {}
            _ => return Ok(None),
        }

        for response in responses {
            tables.last_response_id += 1;
            let row = InterviewResponse {
                id: tables.last_response_id,
                session_id: id,
                question_id: response.question_id,
                competency_id: response.competency_id,
                rating: response.rating,
                notes: response.notes,
                behavioral_flags: response.behavioral_flags,
                created_at: completed_at,
            };
            tables.responses.insert(row.id, row);
        }

        let score = ScoreSummary::from_ratings(ratings_of(&tables, id));
        let session = tables.session_mut(id)?;
        session.status = SessionStatus::Completed;
        session.completed_at = Some(completed_at);
        session.total_score = Some(score.total_score);
        session.max_possible_score = Some(score.max_possible_score);
        session.percentage = Some(score.percentage);
        session.updated_at = completed_at;
        Ok(Some(session.clone()))
    }

    async fn list_responses(&self, session_id: i64) -> Result<Vec<InterviewResponse>> {
        Ok(self
            .lock()
            .responses
            .values()
            .filter(|r| r.session_id == session_id)
            .cloned()
            .collect())
    }

    async fn update_response_rating(
        &self,
        session_id: i64,
        response_id: i64,
        rating: i32,
    ) -> Result<bool> {
        let mut tables = self.lock();
        match tables.responses.get_mut(&response_id) {
            Some(response) if response.session_id == session_id => {
                response.rating = rating;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn save_score(
        &self,
        session_id: i64,
        score: ScoreSummary,
        status: SessionStatus,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<InterviewSession> {
        let mut tables = self.lock();
        let session = tables.session_mut(session_id)?;
        session.total_score = Some(score.total_score);
        session.max_possible_score = Some(score.max_possible_score);
        session.percentage = Some(score.percentage);
        session.status = status;
        session.completed_at = completed_at;
        session.updated_at = Utc::now();
        Ok(session.clone())
    }
}

#[async_trait]
impl NotificationDispatcher for MemoryStore {
    async fn create(&self, new: NewNotification) -> Result<Notification> {
        let mut tables = self.lock();
        let notification = Notification {
            id: tables.notifications.len() as i64 + 1,
            user_id: new.user_id,
            kind: new.kind,
            title: new.title,
            message: new.message,
            is_read: false,
            reference_type: new.reference_type,
            reference_id: new.reference_id,
            scope: new.scope,
            created_at: Utc::now(),
        };
        tables.notifications.push(notification.clone());
        Ok(notification)
    }
}
