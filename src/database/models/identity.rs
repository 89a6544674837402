use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::auth::Role;

/// Core account record every token is issued against.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Identity {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl Identity {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone)]
pub struct NewIdentity {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
    pub role: Role,
    pub is_verified: bool,
}

/// Mutable identity fields. `role` is deliberately absent.
#[derive(Debug, Clone, Default)]
pub struct IdentityPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub is_verified: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct IdentityFilter {
    pub role: Option<Role>,
    pub is_verified: Option<bool>,
    /// When set, newest first and truncated to this many rows.
    pub recent: Option<i64>,
}
