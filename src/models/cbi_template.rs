use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::record_status::RecordStatus;
use crate::models::scope::Scope;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TemplateCompetency {
    pub competency_id: i64,
    pub level: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CbiTemplate {
    #[serde(rename = "cbi_template_id")]
    pub id: i64,
    #[serde(rename = "template_name")]
    pub name: String,
    pub description: Option<String>,
    /// Explicit question selection; takes precedence over `competencies`.
    #[serde(default)]
    pub questions: Vec<i64>,
    #[serde(default)]
    pub competencies: Vec<TemplateCompetency>,
    #[serde(rename = "client_id")]
    #[schema(value_type = i64)]
    pub scope: Scope,
    pub status: RecordStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
