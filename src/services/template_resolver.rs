use std::sync::Arc;

use crate::database::store::CatalogStore;
use crate::error::Result;
use crate::models::actor::Actor;
use crate::models::cbi_template::CbiTemplate;
use crate::models::competency_question::CompetencyQuestion;
use crate::services::access;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("Template has no questions or competencies defined.")]
    InvalidTemplate,
    #[error(
        "Could not find any valid questions for this template. Please ensure the template has competencies with active questions."
    )]
    NoQuestionsAvailable,
}

/// Turns a template into the concrete questions a session will ask.
#[derive(Clone)]
pub struct TemplateResolver {
    catalog: Arc<dyn CatalogStore>,
}

impl TemplateResolver {
    pub fn new(catalog: Arc<dyn CatalogStore>) -> Self {
        Self { catalog }
    }

    /// An explicit question list wins over competency matching. The result is
    /// never empty.
    pub async fn resolve(
        &self,
        template: &CbiTemplate,
        actor: &Actor,
    ) -> Result<Vec<CompetencyQuestion>> {
        let questions = if !template.questions.is_empty() {
            self.resolve_explicit(&template.questions).await?
        } else if !template.competencies.is_empty() {
            self.resolve_competencies(template, actor).await?
        } else {
            return Err(ResolveError::InvalidTemplate.into());
        };

        if questions.is_empty() {
            return Err(ResolveError::NoQuestionsAvailable.into());
        }
        Ok(questions)
    }

    /// Rows for the listed ids in list order. Unknown ids are skipped and no
    /// status filter is applied.
    pub async fn resolve_explicit(&self, ids: &[i64]) -> Result<Vec<CompetencyQuestion>> {
        let found = self.catalog.find_questions_by_ids(ids).await?;
        Ok(ids
            .iter()
            .filter_map(|id| found.iter().find(|q| q.id == *id).cloned())
            .collect())
    }

    async fn resolve_competencies(
        &self,
        template: &CbiTemplate,
        actor: &Actor,
    ) -> Result<Vec<CompetencyQuestion>> {
        let visibility = access::question_visibility(actor);
        let mut questions = Vec::new();
        for requirement in &template.competencies {
            let matches = self
                .catalog
                .find_active_questions(requirement.competency_id, requirement.level, visibility)
                .await?;
            tracing::debug!(
                template_id = template.id,
                competency_id = requirement.competency_id,
                level = requirement.level,
                matches = matches.len(),
                "Resolved competency requirement"
            );
            questions.extend(matches);
        }
        Ok(questions)
    }
}
