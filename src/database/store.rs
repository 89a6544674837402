//! The persistence seam.
//!
//! Everything above this trait (role gate, ownership resolver, handlers)
//! talks to storage only through find-by-id, find-owned, insert, update and
//! delete shaped calls. Mutations of owned rows take an [`OwnerGuard`] that
//! the backend applies atomically with the write, so an ownership check can
//! never be invalidated between the check and the mutation.

use async_trait::async_trait;
use thiserror::Error;

use crate::auth::Role;
use crate::database::models::*;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write; carries the field name.
    #[error("{0} already taken")]
    Conflict(&'static str),

    /// A referenced row (foreign key) does not exist.
    #[error("referenced {0} does not exist")]
    MissingReference(&'static str),

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Owner predicate applied to a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerGuard {
    /// Admin bypass.
    Any,
    /// Row's `user_id` must equal this identity id.
    Identity(i64),
    /// Row's `agent_profile_id` must equal this profile id.
    AgentProfile(i64),
}

impl OwnerGuard {
    pub fn permits(&self, user_id: Option<i64>, agent_profile_id: Option<i64>) -> bool {
        match self {
            OwnerGuard::Any => true,
            OwnerGuard::Identity(id) => user_id == Some(*id),
            OwnerGuard::AgentProfile(id) => agent_profile_id == Some(*id),
        }
    }

    /// `(user_id, agent_profile_id)` values for a SQL predicate of the form
    /// `($n IS NULL OR column = $n)`.
    pub fn predicate(&self) -> (Option<i64>, Option<i64>) {
        match self {
            OwnerGuard::Any => (None, None),
            OwnerGuard::Identity(id) => (Some(*id), None),
            OwnerGuard::AgentProfile(id) => (None, Some(*id)),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait Store: Send + Sync {
    async fn ping(&self) -> StoreResult<()>;

    // ── Identities ─────────────────────────────────────────────────────
    async fn insert_identity(&self, new: NewIdentity) -> StoreResult<Identity>;
    async fn find_identity(&self, id: i64) -> StoreResult<Option<Identity>>;
    async fn find_identity_by_email(&self, email: &str) -> StoreResult<Option<Identity>>;
    async fn list_identities(&self, filter: IdentityFilter) -> StoreResult<Vec<Identity>>;
    async fn count_identities(&self, role: Option<Role>) -> StoreResult<i64>;
    async fn update_identity(&self, id: i64, patch: IdentityPatch) -> StoreResult<Option<Identity>>;

    // ── Profiles and agencies ──────────────────────────────────────────
    async fn insert_agency(&self, new: NewAgency) -> StoreResult<Agency>;
    async fn insert_agent_profile(&self, new: NewAgentProfile) -> StoreResult<AgentProfile>;
    async fn find_agent_profile(&self, id: i64) -> StoreResult<Option<AgentProfile>>;
    async fn find_agent_profile_by_identity(&self, identity_id: i64) -> StoreResult<Option<AgentProfile>>;
    async fn update_agent_profile(&self, id: i64, patch: AgentProfilePatch) -> StoreResult<Option<AgentProfile>>;
    async fn insert_user_profile(&self, identity_id: i64) -> StoreResult<UserProfile>;
    async fn find_user_profile_by_identity(&self, identity_id: i64) -> StoreResult<Option<UserProfile>>;

    // ── Properties ─────────────────────────────────────────────────────
    async fn insert_property_type(&self, name: &str) -> StoreResult<PropertyType>;
    async fn find_property_type(&self, id: i64) -> StoreResult<Option<PropertyType>>;
    async fn insert_property(&self, new: NewProperty) -> StoreResult<Property>;
    async fn find_property(&self, id: i64) -> StoreResult<Option<Property>>;
    async fn list_properties(&self, filter: PropertyFilter) -> StoreResult<Vec<Property>>;
    async fn count_properties(&self) -> StoreResult<i64>;
    async fn property_media(&self, property_id: i64) -> StoreResult<PropertyMedia>;
    /// `None` when the row is missing or the guard rejects it.
    async fn update_property(&self, id: i64, guard: OwnerGuard, patch: PropertyPatch) -> StoreResult<Option<Property>>;
    /// `false` when the row is missing or the guard rejects it; nothing changes then.
    async fn replace_property_media(&self, id: i64, guard: OwnerGuard, change: MediaChange) -> StoreResult<bool>;
    /// Removes the property and everything hanging off it. `false` when the
    /// row is missing or the guard rejects it.
    async fn delete_property(&self, id: i64, guard: OwnerGuard) -> StoreResult<bool>;

    // ── Inquiries ──────────────────────────────────────────────────────
    async fn insert_inquiry(&self, new: NewInquiry) -> StoreResult<Inquiry>;
    async fn find_inquiry(&self, id: i64) -> StoreResult<Option<Inquiry>>;
    async fn list_inquiries(&self, filter: OwnedFilter) -> StoreResult<Vec<Inquiry>>;
    async fn update_inquiry_status(&self, id: i64, guard: OwnerGuard, status: InquiryStatus) -> StoreResult<Option<Inquiry>>;

    // ── Conversations ──────────────────────────────────────────────────
    async fn insert_conversation(&self, new: NewConversation) -> StoreResult<Conversation>;
    async fn find_conversation(&self, id: i64) -> StoreResult<Option<Conversation>>;
    async fn list_conversations(&self, filter: OwnedFilter) -> StoreResult<Vec<Conversation>>;
    async fn insert_message(&self, new: NewMessage) -> StoreResult<Message>;
    async fn list_messages(&self, conversation_id: i64) -> StoreResult<Vec<Message>>;

    // ── Visits ─────────────────────────────────────────────────────────
    async fn insert_visit(&self, new: NewVisit) -> StoreResult<Visit>;
    async fn find_visit(&self, id: i64) -> StoreResult<Option<Visit>>;
    async fn list_visits(&self, filter: OwnedFilter) -> StoreResult<Vec<Visit>>;
    async fn update_visit_status(&self, id: i64, guard: OwnerGuard, status: VisitStatus) -> StoreResult<Option<Visit>>;

    // ── Favorites ──────────────────────────────────────────────────────
    async fn find_favorite(&self, user_id: i64, property_id: i64) -> StoreResult<Option<Favorite>>;
    async fn insert_favorite(&self, user_id: i64, property_id: i64) -> StoreResult<Favorite>;
    async fn delete_favorite(&self, id: i64, guard: OwnerGuard) -> StoreResult<bool>;
    async fn list_favorites(&self, user_id: i64) -> StoreResult<Vec<Favorite>>;

    // ── Billing records ────────────────────────────────────────────────
    async fn insert_subscription(&self, new: NewSubscription) -> StoreResult<Subscription>;
    async fn list_subscriptions(&self, user_id: i64) -> StoreResult<Vec<Subscription>>;
    async fn insert_payment(&self, new: NewPayment) -> StoreResult<Payment>;
    async fn list_payments(&self, filter: PaymentFilter) -> StoreResult<Vec<Payment>>;
    async fn sum_payments(&self, filter: PaymentFilter) -> StoreResult<i64>;
}
