use crate::models::competency_question::CompetencyQuestion;
use crate::models::interview_session::QuestionSnapshot;

pub const UNKNOWN_COMPETENCY: &str = "Unknown";

/// Freezes resolved questions for a session. A dangling competency link never
/// fails: the name falls back to [`UNKNOWN_COMPETENCY`].
pub fn build_snapshot(questions: &[CompetencyQuestion]) -> Vec<QuestionSnapshot> {
    questions
        .iter()
        .map(|q| QuestionSnapshot {
            question_id: q.id,
            competency_id: q.competency_id,
            question_text: q.question.clone(),
            competency_name: q
                .competency_name
                .clone()
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN_COMPETENCY.to_string()),
            level: q.level,
        })
        .collect()
}
