use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use super::text_enum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InquiryStatus {
    New,
    Read,
    Responded,
}

text_enum!(InquiryStatus, "inquiry status", {
    New => "new",
    Read => "read",
    Responded => "responded",
});

/// A user's question about a listing, addressed to the listing's agent.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Inquiry {
    pub id: i64,
    pub user_id: i64,
    pub agent_profile_id: i64,
    pub property_id: i64,
    pub message: String,
    #[sqlx(try_from = "String")]
    pub status: InquiryStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewInquiry {
    pub user_id: i64,
    pub agent_profile_id: i64,
    pub property_id: i64,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Conversation {
    pub id: i64,
    pub user_id: i64,
    pub agent_profile_id: i64,
    pub property_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewConversation {
    pub user_id: i64,
    pub agent_profile_id: i64,
    pub property_id: i64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Message {
    pub id: i64,
    pub conversation_id: i64,
    pub sender_id: i64,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewMessage {
    pub conversation_id: i64,
    pub sender_id: i64,
    pub body: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VisitStatus {
    Pending,
    Completed,
    Canceled,
}

text_enum!(VisitStatus, "visit status", {
    Pending => "pending",
    Completed => "completed",
    Canceled => "canceled",
});

/// A scheduled viewing. `agent_profile_id` is copied from the property when
/// the visit is booked.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Visit {
    pub id: i64,
    pub user_id: i64,
    pub agent_profile_id: i64,
    pub property_id: i64,
    pub scheduled_time: DateTime<Utc>,
    #[sqlx(try_from = "String")]
    pub status: VisitStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewVisit {
    pub user_id: i64,
    pub agent_profile_id: i64,
    pub property_id: i64,
    pub scheduled_time: DateTime<Utc>,
}

/// Saved listing, keyed on the identity id.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Favorite {
    pub id: i64,
    pub user_id: i64,
    pub property_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Selects rows by whichever owner link is set. Both unset means all rows.
#[derive(Debug, Clone, Default)]
pub struct OwnedFilter {
    pub user_id: Option<i64>,
    pub agent_profile_id: Option<i64>,
    pub property_id: Option<i64>,
    pub status: Option<String>,
    /// When set, newest first and truncated to this many rows.
    pub recent: Option<i64>,
}

impl OwnedFilter {
    pub fn user(user_id: i64) -> Self {
        Self {
            user_id: Some(user_id),
            ..Default::default()
        }
    }

    pub fn agent(agent_profile_id: i64) -> Self {
        Self {
            agent_profile_id: Some(agent_profile_id),
            ..Default::default()
        }
    }

    pub fn property(mut self, property_id: i64) -> Self {
        self.property_id = Some(property_id);
        self
    }

    pub fn recent(mut self, limit: i64) -> Self {
        self.recent = Some(limit);
        self
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }
}
