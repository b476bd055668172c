use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::database::store::{CatalogStore, InterviewStore, NotificationDispatcher};
use crate::dto::interview_dto::{
    CreateInterviewPayload, InterviewSessionDetail, InterviewerSummary, PublicInterviewForm,
    PublicTemplateSummary, SubmitInterviewRequest, SubmitInterviewResponse, UpdateScoresPayload,
};
use crate::error::{Error, Result};
use crate::models::actor::Actor;
use crate::models::candidate::Candidate;
use crate::models::cbi_template::CbiTemplate;
use crate::models::interview_response::{InterviewResponse, NewInterviewResponse};
use crate::models::interview_session::{
    InterviewSession, NewInterviewSession, QuestionSnapshot, SessionEvent, TransitionError,
};
use crate::services::access;
use crate::services::notification_service::NotificationService;
use crate::services::scoring::ScoringService;
use crate::services::snapshot::build_snapshot;
use crate::services::template_resolver::TemplateResolver;
use crate::utils::time::{hours_from, Clock};
use crate::utils::token::generate_session_token;

pub const SUBMITTED_MESSAGE: &str = "Interview submitted successfully";
const FALLBACK_TEMPLATE_NAME: &str = "Interview";

/// A lost compare-and-set is re-evaluated against the reloaded row once.
const STATUS_WRITE_ATTEMPTS: usize = 2;

#[derive(Clone)]
pub struct InterviewService {
    catalog: Arc<dyn CatalogStore>,
    interviews: Arc<dyn InterviewStore>,
    resolver: TemplateResolver,
    scoring: ScoringService,
    notifications: NotificationService,
    clock: Arc<dyn Clock>,
    default_expiry_hours: i64,
}

impl InterviewService {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        interviews: Arc<dyn InterviewStore>,
        dispatcher: Arc<dyn NotificationDispatcher>,
        clock: Arc<dyn Clock>,
        default_expiry_hours: i64,
    ) -> Self {
        Self {
            resolver: TemplateResolver::new(catalog.clone()),
            scoring: ScoringService::new(interviews.clone()),
            notifications: NotificationService::new(dispatcher),
            catalog,
            interviews,
            clock,
            default_expiry_hours,
        }
    }

    pub async fn create(
        &self,
        payload: CreateInterviewPayload,
        actor: &Actor,
    ) -> Result<InterviewSessionDetail> {
        access::ensure_can_manage_sessions(actor)?;

        let template = self
            .catalog
            .find_template(payload.cbi_template_id)
            .await?
            .ok_or_else(|| Error::NotFound("Template not found".to_string()))?;
        let questions = build_snapshot(&self.resolver.resolve(&template, actor).await?);

        let now = self.clock.now();
        let hours = payload
            .expires_in_hours
            .unwrap_or(self.default_expiry_hours);
        let session = self
            .interviews
            .insert_session(NewInterviewSession {
                candidate_id: payload.candidate_id,
                template_id: template.id,
                interviewer_id: payload.interviewer_id,
                token: generate_session_token(),
                questions,
                expires_at: hours_from(now, hours),
                scope: access::owner_for_new_session(actor),
                created_at: now,
            })
            .await?;

        tracing::info!(
            session_id = session.id,
            template_id = template.id,
            questions = session.questions.len(),
            expires_at = %session.expires_at,
            "Interview session created"
        );

        self.notifications.interview_assigned(&session).await;
        self.with_relations(session).await
    }

    pub async fn find_all(&self, actor: &Actor) -> Result<Vec<InterviewSessionDetail>> {
        let sessions = self
            .interviews
            .list_sessions(access::session_list_owner(actor))
            .await?;
        let mut detailed = Vec::with_capacity(sessions.len());
        for session in sessions {
            detailed.push(self.with_relations(session).await?);
        }
        Ok(detailed)
    }

    pub async fn find_one(&self, id: i64, actor: &Actor) -> Result<InterviewSessionDetail> {
        let session = self.load_visible(id, actor).await?;
        self.with_relations(session).await
    }

    pub async fn get_responses(&self, id: i64, actor: &Actor) -> Result<Vec<InterviewResponse>> {
        let session = self.load_visible(id, actor).await?;
        self.interviews.list_responses(session.id).await
    }

    /// Withdraws the link regardless of its expiry time.
    pub async fn cancel(&self, id: i64, actor: &Actor) -> Result<InterviewSession> {
        access::ensure_can_manage_sessions(actor)?;
        let session = self.load_visible(id, actor).await?;
        let session = self.advance(session, SessionEvent::Cancel).await?;
        tracing::info!(session_id = session.id, "Interview session cancelled");
        Ok(session)
    }

    pub async fn update_scores(
        &self,
        id: i64,
        payload: UpdateScoresPayload,
        actor: &Actor,
    ) -> Result<InterviewSession> {
        access::ensure_can_manage_sessions(actor)?;
        let session = self.load_visible(id, actor).await?;
        self.scoring
            .apply_corrections(session, &payload.scores, self.clock.now())
            .await
    }

    /// Opens the public form, moving a Pending session to InProgress.
    pub async fn get_by_token(&self, token: &str) -> Result<PublicInterviewForm> {
        let now = self.clock.now();
        let session = self.load_by_token(token).await?;
        let session = self.reject_if_lapsed(session, now).await?;
        let session = self.advance(session, SessionEvent::Open).await?;

        let candidate = self.catalog.find_candidate(session.candidate_id).await?;
        let interviewer = self.interviewer_summary(session.interviewer_id).await?;
        let template = self.catalog.find_template(session.template_id).await?;

        let questions = if session.questions.is_empty() {
            self.legacy_questions(template.as_ref().map(|t| t.questions.as_slice()))
                .await?
        } else {
            session.questions.clone()
        };

        tracing::info!(session_id = session.id, "Interview form opened");

        Ok(PublicInterviewForm {
            session_id: session.id,
            candidate,
            template: template
                .map(template_summary)
                .unwrap_or_else(|| PublicTemplateSummary {
                    cbi_template_id: 0,
                    template_name: FALLBACK_TEMPLATE_NAME.to_string(),
                }),
            questions,
            interviewer,
            status: session.status,
            expires_at: session.expires_at,
        })
    }

    /// One-shot submission. Responses, score and completion are written
    /// together or not at all.
    pub async fn submit_by_token(
        &self,
        token: &str,
        request: SubmitInterviewRequest,
    ) -> Result<SubmitInterviewResponse> {
        let now = self.clock.now();
        let session = self.load_by_token(token).await?;
        let mut session = self.reject_if_lapsed(session, now).await?;
        let responses: Vec<NewInterviewResponse> =
            request.responses.into_iter().map(Into::into).collect();

        let mut completed = None;
        for _ in 0..STATUS_WRITE_ATTEMPTS {
            session.status.apply(SessionEvent::Submit)?;
            match self
                .interviews
                .complete_submission(session.id, session.status, responses.clone(), now)
                .await?
            {
                Some(done) => {
                    completed = Some(done);
                    break;
                }
                None => session = self.load(session.id).await?,
            }
        }
        let completed = completed.ok_or(TransitionError::AlreadyCompleted)?;

        tracing::info!(
            session_id = completed.id,
            responses = responses.len(),
            percentage = completed.percentage.unwrap_or(0.0),
            "Interview submitted"
        );

        let candidate = self.candidate_for_notice(completed.candidate_id).await;
        self.notifications
            .interview_completed(&completed, candidate.as_ref())
            .await;

        Ok(SubmitInterviewResponse {
            message: SUBMITTED_MESSAGE.to_string(),
            percentage: completed.percentage.unwrap_or(0.0),
        })
    }

    async fn load(&self, id: i64) -> Result<InterviewSession> {
        self.interviews
            .find_session(id)
            .await?
            .ok_or_else(|| Error::NotFound("Interview session not found".to_string()))
    }

    async fn load_visible(&self, id: i64, actor: &Actor) -> Result<InterviewSession> {
        let session = self.load(id).await?;
        if !access::can_view(actor, session.scope) {
            return Err(Error::Forbidden(
                "You do not have access to this interview session".to_string(),
            ));
        }
        Ok(session)
    }

    async fn with_relations(&self, session: InterviewSession) -> Result<InterviewSessionDetail> {
        let candidate = self.catalog.find_candidate(session.candidate_id).await?;
        let template = self
            .catalog
            .find_template(session.template_id)
            .await?
            .map(template_summary);
        let interviewer = self.interviewer_summary(session.interviewer_id).await?;
        Ok(InterviewSessionDetail {
            session,
            candidate,
            template,
            interviewer,
        })
    }

    async fn interviewer_summary(&self, user_id: i64) -> Result<Option<InterviewerSummary>> {
        Ok(self
            .catalog
            .find_user(user_id)
            .await?
            .map(|u| InterviewerSummary {
                name: u.name,
                surname: u.surname,
            }))
    }

    async fn load_by_token(&self, token: &str) -> Result<InterviewSession> {
        self.interviews
            .find_session_by_token(token)
            .await?
            .ok_or_else(|| Error::NotFound("Interview not found".to_string()))
    }

    /// Persists Expired for a lapsed session, then rejects the access.
    async fn reject_if_lapsed(
        &self,
        session: InterviewSession,
        now: DateTime<Utc>,
    ) -> Result<InterviewSession> {
        if !session.has_lapsed(now) {
            return Ok(session);
        }
        let expired = self.advance(session, SessionEvent::Lapse).await?;
        tracing::info!(
            session_id = expired.id,
            expires_at = %expired.expires_at,
            "Interview link expired"
        );
        Err(TransitionError::Expired.into())
    }

    /// Applies `event` and persists the result with a compare-and-set on the
    /// status it was computed from.
    async fn advance(
        &self,
        mut session: InterviewSession,
        event: SessionEvent,
    ) -> Result<InterviewSession> {
        for _ in 0..STATUS_WRITE_ATTEMPTS {
            let next = session.status.apply(event)?;
            if next == session.status {
                return Ok(session);
            }
            match self
                .interviews
                .transition(session.id, session.status, next)
                .await?
            {
                Some(updated) => return Ok(updated),
                None => session = self.load(session.id).await?,
            }
        }
        Err(Error::Internal(format!(
            "Interview session {} kept changing during {:?}",
            session.id, event
        )))
    }

    /// Sessions issued before snapshots existed carry no questions; rebuild
    /// them from the template's explicit list when it has one.
    async fn legacy_questions(&self, explicit: Option<&[i64]>) -> Result<Vec<QuestionSnapshot>> {
        match explicit {
            Some(ids) if !ids.is_empty() => {
                Ok(build_snapshot(&self.resolver.resolve_explicit(ids).await?))
            }
            _ => Ok(Vec::new()),
        }
    }

    async fn candidate_for_notice(&self, candidate_id: i64) -> Option<Candidate> {
        match self.catalog.find_candidate(candidate_id).await {
            Ok(candidate) => candidate,
            Err(e) => {
                tracing::warn!(candidate_id, "Failed to load candidate for notification: {}", e);
                None
            }
        }
    }
}

fn template_summary(template: CbiTemplate) -> PublicTemplateSummary {
    PublicTemplateSummary {
        cbi_template_id: template.id,
        template_name: template.name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::store::MockNotificationDispatcher;
    use crate::database::MemoryStore;
    use crate::models::actor::Role;
    use crate::models::cbi_template::CbiTemplate;
    use crate::models::competency_question::CompetencyQuestion;
    use crate::models::interview_session::SessionStatus;
    use crate::models::record_status::RecordStatus;
    use crate::models::scope::Scope;
    use crate::utils::time::ManualClock;

    fn seeded_store() -> MemoryStore {
        let store = MemoryStore::new();
        let now = Utc::now();
        store.insert_question(CompetencyQuestion {
            id: 1,
            competency_id: 10,
            competency_name: Some("Teamwork".to_string()),
            level: 3,
            question: "Describe a conflict you resolved.".to_string(),
            scope: Scope::Global,
            status: RecordStatus::Active,
            created_at: now,
            updated_at: now,
        });
        store.insert_template(CbiTemplate {
            id: 1,
            name: "Team lead".to_string(),
            description: None,
            questions: vec![1],
            competencies: Vec::new(),
            scope: Scope::Global,
            status: RecordStatus::Active,
            created_at: now,
            updated_at: now,
        });
        store
    }

    fn service(store: &MemoryStore, dispatcher: MockNotificationDispatcher) -> InterviewService {
        let store = Arc::new(store.clone());
        InterviewService::new(
            store.clone(),
            store,
            Arc::new(dispatcher),
            Arc::new(ManualClock::new(Utc::now())),
            48,
        )
    }

    fn payload() -> CreateInterviewPayload {
        CreateInterviewPayload {
            candidate_id: 5,
            cbi_template_id: 1,
            interviewer_id: 11,
            expires_in_hours: None,
        }
    }

    #[tokio::test]
    async fn create_succeeds_when_notification_fails() {
        let store = seeded_store();
        let mut dispatcher = MockNotificationDispatcher::new();
        dispatcher
            .expect_create()
            .times(1)
            .returning(|_| Err(Error::Internal("dispatcher unavailable".to_string())));
        let service = service(&store, dispatcher);
        let manager = Actor::new(2, Role::OfficeManager, Scope::Tenant(4));

        let session = service.create(payload(), &manager).await.unwrap().session;

        assert_eq!(session.status, SessionStatus::Pending);
        assert_eq!(session.scope, Scope::Tenant(4));
        assert_eq!(session.questions.len(), 1);
        assert_eq!(session.expires_at, hours_from(session.created_at, 48));
    }

    #[tokio::test]
    async fn office_users_cannot_create_sessions() {
        let store = seeded_store();
        let mut dispatcher = MockNotificationDispatcher::new();
        dispatcher.expect_create().times(0);
        let service = service(&store, dispatcher);
        let user = Actor::new(3, Role::OfficeUser, Scope::Tenant(4));

        let err = service.create(payload(), &user).await.unwrap_err();

        assert!(matches!(err, Error::Forbidden(_)));
    }

    #[tokio::test]
    async fn missing_template_is_not_found() {
        let store = seeded_store();
        let mut dispatcher = MockNotificationDispatcher::new();
        dispatcher.expect_create().times(0);
        let service = service(&store, dispatcher);
        let admin = Actor::new(1, Role::Admin, Scope::Global);
        let mut request = payload();
        request.cbi_template_id = 404;

        let err = service.create(request, &admin).await.unwrap_err();

        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn expiry_override_is_honoured() {
        let store = seeded_store();
        let mut dispatcher = MockNotificationDispatcher::new();
        dispatcher.expect_create().returning(|_| {
            Err(Error::Internal("dispatcher unavailable".to_string()))
        });
        let service = service(&store, dispatcher);
        let admin = Actor::new(1, Role::Admin, Scope::Global);
        let mut request = payload();
        request.expires_in_hours = Some(2);

        let session = service.create(request, &admin).await.unwrap().session;

        assert_eq!(session.scope, Scope::Global);
        assert_eq!(session.expires_at, hours_from(session.created_at, 2));
    }
}
