use serde::Deserialize;
use utoipa::IntoParams;
use validator::Validate;

use crate::models::competency_question::QuestionFilter;

#[derive(Debug, Clone, Default, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct QuestionQuery {
    pub competency_id: Option<i64>,
    #[validate(range(min = 1, max = 5))]
    pub level: Option<i32>,
}

impl From<QuestionQuery> for QuestionFilter {
    fn from(query: QuestionQuery) -> Self {
        Self {
            competency_id: query.competency_id,
            level: query.level,
        }
    }
}
