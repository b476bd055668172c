use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::scope::Scope;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Candidate {
    #[serde(rename = "candidate_id")]
    pub id: i64,
    pub name: String,
    pub surname: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(rename = "client_id")]
    #[schema(value_type = i64)]
    pub scope: Scope,
    pub created_at: DateTime<Utc>,
}

impl Candidate {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.name, self.surname).trim().to_string()
    }
}
