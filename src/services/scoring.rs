use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::database::store::InterviewStore;
use crate::dto::interview_dto::ScoreCorrection;
use crate::error::{Error, Result};
use crate::models::interview_session::{InterviewSession, SessionEvent, SessionStatus};

pub const MAX_RATING: i32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreSummary {
    pub total_score: i32,
    pub max_possible_score: i32,
    pub percentage: f64,
}

impl ScoreSummary {
    /// Score of a set of ratings. Each answered question is worth `MAX_RATING`.
    pub fn from_ratings<I>(ratings: I) -> Self
    where
        I: IntoIterator<Item = i32>,
    {
        let (total_score, answered) = ratings
            .into_iter()
            .fold((0, 0), |(total, count), rating| (total + rating, count + 1));
        let max_possible_score = answered * MAX_RATING;
        let percentage = if max_possible_score > 0 {
            round2(f64::from(total_score) / f64::from(max_possible_score) * 100.0)
        } else {
            0.0
        };

        Self {
            total_score,
            max_possible_score,
            percentage,
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Recomputes session scores from stored responses; never keeps running totals.
#[derive(Clone)]
pub struct ScoringService {
    interviews: Arc<dyn InterviewStore>,
}

impl ScoringService {
    pub fn new(interviews: Arc<dyn InterviewStore>) -> Self {
        Self { interviews }
    }

    pub async fn recompute_from_responses(&self, session_id: i64) -> Result<ScoreSummary> {
        let responses = self.interviews.list_responses(session_id).await?;
        Ok(ScoreSummary::from_ratings(
            responses.iter().map(|r| r.rating),
        ))
    }

    /// Overwrites ratings of responses that belong to `session`, rescores it and
    /// finalizes it as Completed. The caller has already checked access.
    pub async fn apply_corrections(
        &self,
        session: InterviewSession,
        corrections: &[ScoreCorrection],
        now: DateTime<Utc>,
    ) -> Result<InterviewSession> {
        let owned: HashSet<i64> = self
            .interviews
            .list_responses(session.id)
            .await?
            .into_iter()
            .map(|r| r.id)
            .collect();
        if let Some(stray) = corrections.iter().find(|c| !owned.contains(&c.response_id)) {
            return Err(Error::NotFound(format!(
                "Response {} not found in interview session {}",
                stray.response_id, session.id
            )));
        }

        for correction in corrections {
            let updated = self
                .interviews
                .update_response_rating(session.id, correction.response_id, correction.rating)
                .await?;
            if !updated {
                return Err(Error::NotFound(format!(
                    "Response {} not found in interview session {}",
                    correction.response_id, session.id
                )));
            }
        }

        let score = self.recompute_from_responses(session.id).await?;
        let status = session.status.apply(SessionEvent::Finalize)?;
        let completed_at = match session.status {
            SessionStatus::Completed => session.completed_at,
            _ => Some(now),
        };

        tracing::info!(
            session_id = session.id,
            corrections = corrections.len(),
            percentage = score.percentage,
            previous_status = %session.status,
            "Interview scores corrected"
        );

        self.interviews
            .save_score(session.id, score, status, completed_at)
            .await
    }
}
