use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// One per agent identity, created at profile completion. Properties,
/// inquiries, conversations and visits hang off `AgentProfile::id`.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AgentProfile {
    pub id: i64,
    pub identity_id: i64,
    pub license_number: String,
    pub agency_id: Option<i64>,
    pub bio: Option<String>,
    pub rating: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAgentProfile {
    pub identity_id: i64,
    pub license_number: String,
    pub agency_id: Option<i64>,
    pub bio: Option<String>,
    pub rating: Option<i32>,
}

#[derive(Debug, Clone, Default)]
pub struct AgentProfilePatch {
    pub license_number: Option<String>,
    pub agency_id: Option<i64>,
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserProfile {
    pub id: i64,
    pub identity_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Agency {
    pub id: i64,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub founded_year: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewAgency {
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub founded_year: Option<String>,
}
