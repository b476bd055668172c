use std::sync::Arc;

use crate::database::store::NotificationDispatcher;
use crate::models::candidate::Candidate;
use crate::models::interview_session::InterviewSession;
use crate::models::notification::{NewNotification, NotificationType};

pub const SESSION_REFERENCE: &str = "interview_session";

/// Best-effort notifications about interview sessions. Delivery failures are
/// logged and never reach the caller.
#[derive(Clone)]
pub struct NotificationService {
    dispatcher: Arc<dyn NotificationDispatcher>,
}

impl NotificationService {
    pub fn new(dispatcher: Arc<dyn NotificationDispatcher>) -> Self {
        Self { dispatcher }
    }

    pub async fn interview_assigned(&self, session: &InterviewSession) {
        self.send(NewNotification {
            user_id: session.interviewer_id,
            kind: NotificationType::InterviewAssigned,
            title: "Interview Assigned".to_string(),
            message: "You have been assigned a new interview session.".to_string(),
            reference_type: Some(SESSION_REFERENCE.to_string()),
            reference_id: Some(session.id),
            scope: session.scope,
        })
        .await
    }

    pub async fn interview_completed(
        &self,
        session: &InterviewSession,
        candidate: Option<&Candidate>,
    ) {
        let who = candidate
            .map(Candidate::full_name)
            .unwrap_or_else(|| format!("candidate #{}", session.candidate_id));
        let score = session.percentage.unwrap_or(0.0);
        self.send(NewNotification {
            user_id: session.interviewer_id,
            kind: NotificationType::InterviewCompleted,
            title: "Interview Completed".to_string(),
            message: format!(
                "Interview for {} has been completed. Score: {}%",
                who, score
            ),
            reference_type: Some(SESSION_REFERENCE.to_string()),
            reference_id: Some(session.id),
            scope: session.scope,
        })
        .await
    }

    async fn send(&self, notification: NewNotification) {
        let kind = notification.kind;
        let user_id = notification.user_id;
        if let Err(e) = self.dispatcher.create(notification).await {
            tracing::warn!(
                user_id,
                kind = %kind,
                "Failed to create notification: {}",
                e
            );
        }
    }
}
