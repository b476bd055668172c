use serde::{Deserialize, Serialize};

use crate::models::actor::Role;
use crate::models::scope::Scope;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "user_id")]
    pub id: i64,
    pub name: String,
    pub surname: String,
    pub email: String,
    pub role: Role,
    #[serde(rename = "client_id")]
    pub scope: Scope,
}
