use std::sync::Arc;

use crate::database::store::CatalogStore;
use crate::error::Result;
use crate::models::actor::Actor;
use crate::models::competency_question::{CompetencyQuestion, QuestionFilter};
use crate::services::access;

/// Read-only view of the question bank for staff.
#[derive(Clone)]
pub struct QuestionService {
    catalog: Arc<dyn CatalogStore>,
}

impl QuestionService {
    pub fn new(catalog: Arc<dyn CatalogStore>) -> Self {
        Self { catalog }
    }

    pub async fn list_questions(
        &self,
        actor: &Actor,
        filter: QuestionFilter,
    ) -> Result<Vec<CompetencyQuestion>> {
        self.catalog
            .list_questions(filter, access::question_visibility(actor))
            .await
    }
}
