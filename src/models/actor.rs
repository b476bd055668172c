use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::scope::Scope;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    OfficeManager,
    OfficeUser,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::OfficeManager => "OFFICE_MANAGER",
            Role::OfficeUser => "OFFICE_USER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(Role::Admin),
            "OFFICE_MANAGER" => Ok(Role::OfficeManager),
            "OFFICE_USER" => Ok(Role::OfficeUser),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// Authenticated caller, resolved once per request from the bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: i64,
    pub role: Role,
    pub scope: Scope,
}

impl Actor {
    pub fn new(user_id: i64, role: Role, scope: Scope) -> Self {
        Self {
            user_id,
            role,
            scope,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
