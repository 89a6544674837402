use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use super::text_enum;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Subscription {
    pub id: i64,
    pub user_id: i64,
    pub plan: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewSubscription {
    pub user_id: i64,
    pub plan: String,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Complete,
}

text_enum!(PaymentStatus, "payment status", {
    Pending => "pending",
    Complete => "complete",
});

/// Payment record. Processing happens elsewhere; this is bookkeeping only.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Payment {
    pub id: i64,
    pub user_id: i64,
    pub agent_profile_id: Option<i64>,
    pub amount: i64,
    pub payment_method: String,
    #[sqlx(try_from = "String")]
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPayment {
    pub user_id: i64,
    pub agent_profile_id: Option<i64>,
    pub amount: i64,
    pub payment_method: String,
    pub status: PaymentStatus,
}

#[derive(Debug, Clone, Default)]
pub struct PaymentFilter {
    pub user_id: Option<i64>,
    pub agent_profile_id: Option<i64>,
    pub status: Option<PaymentStatus>,
    pub since: Option<DateTime<Utc>>,
}
