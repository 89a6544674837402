//! Ownership resolver: decides whether a verified actor may act on a
//! particular row.
//!
//! Admins see everything. Agents own rows through their `AgentProfile`,
//! users through their identity id. A denial is reported exactly like a
//! missing row so non-owners cannot probe for existence.

use thiserror::Error;
use tracing::{debug, warn};

use crate::auth::{Actor, Role};
use crate::database::models::*;
use crate::database::{OwnerGuard, Store, StoreError};
use crate::error::ApiError;

/// Anything with an ownership chain back to an identity or agent profile.
pub trait OwnedResource {
    const KIND: &'static str;

    fn owning_identity(&self) -> Option<i64>;
    fn owning_agent_profile(&self) -> Option<i64>;
}

impl OwnedResource for Property {
    const KIND: &'static str = "property";

    fn owning_identity(&self) -> Option<i64> {
        None
    }

    fn owning_agent_profile(&self) -> Option<i64> {
        Some(self.agent_profile_id)
    }
}

/// Rows shared between a user and the agent they contacted.
macro_rules! user_and_agent_owned {
    ($($ty:ty => $kind:literal),+ $(,)?) => {
        $(
            impl OwnedResource for $ty {
                const KIND: &'static str = $kind;

                fn owning_identity(&self) -> Option<i64> {
                    Some(self.user_id)
                }

                fn owning_agent_profile(&self) -> Option<i64> {
                    Some(self.agent_profile_id)
                }
            }
        )+
    };
}

user_and_agent_owned!(Inquiry => "inquiry", Conversation => "conversation", Visit => "visit");

impl OwnedResource for Favorite {
    const KIND: &'static str = "favorite";

    fn owning_identity(&self) -> Option<i64> {
        Some(self.user_id)
    }

    fn owning_agent_profile(&self) -> Option<i64> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Update,
    Delete,
}

/// What an actor owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerScope {
    /// Admin bypass.
    Everything,
    Identity(i64),
    AgentProfile(i64),
    /// Agent without a profile yet: owns nothing, lists are empty.
    Nothing,
}

impl OwnerScope {
    pub fn permits<R: OwnedResource>(&self, resource: &R) -> bool {
        match self {
            OwnerScope::Everything => true,
            OwnerScope::Identity(id) => resource.owning_identity() == Some(*id),
            OwnerScope::AgentProfile(id) => resource.owning_agent_profile() == Some(*id),
            OwnerScope::Nothing => false,
        }
    }

    pub fn guard(&self) -> Option<OwnerGuard> {
        match self {
            OwnerScope::Everything => Some(OwnerGuard::Any),
            OwnerScope::Identity(id) => Some(OwnerGuard::Identity(*id)),
            OwnerScope::AgentProfile(id) => Some(OwnerGuard::AgentProfile(*id)),
            OwnerScope::Nothing => None,
        }
    }

    /// Listing filter for this scope; `None` means the result is empty.
    pub fn owned_filter(&self) -> Option<OwnedFilter> {
        match self {
            OwnerScope::Everything => Some(OwnedFilter::default()),
            OwnerScope::Identity(id) => Some(OwnedFilter::user(*id)),
            OwnerScope::AgentProfile(id) => Some(OwnedFilter::agent(*id)),
            OwnerScope::Nothing => None,
        }
    }

    pub fn agent_profile_id(&self) -> Option<i64> {
        match self {
            OwnerScope::AgentProfile(id) => Some(*id),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum OwnershipError {
    /// Missing or not owned; the two are indistinguishable to the caller.
    #[error("resource not found")]
    Denied,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<OwnershipError> for ApiError {
    fn from(err: OwnershipError) -> Self {
        match err {
            OwnershipError::Denied => ApiError::resource_not_found(),
            OwnershipError::Store(e) => e.into(),
        }
    }
}

/// A resource the actor may act on, with the guard to pass to the mutation.
#[derive(Debug)]
pub struct Authorized<R> {
    pub resource: R,
    pub guard: OwnerGuard,
}

pub struct OwnershipResolver<'a> {
    store: &'a dyn Store,
}

impl<'a> OwnershipResolver<'a> {
    pub fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    pub async fn scope(&self, actor: &Actor) -> Result<OwnerScope, StoreError> {
        Ok(match actor.role {
            Role::Admin => OwnerScope::Everything,
            Role::User => OwnerScope::Identity(actor.subject_id),
            Role::Agent => match self.store.find_agent_profile_by_identity(actor.subject_id).await? {
                Some(profile) => OwnerScope::AgentProfile(profile.id),
                None => {
                    debug!(subject_id = actor.subject_id, "Agent has no profile; owns nothing");
                    OwnerScope::Nothing
                }
            },
        })
    }

    /// Check `resource` (as fetched by id) against the actor's scope.
    pub async fn authorize<R: OwnedResource>(
        &self,
        actor: &Actor,
        action: Action,
        resource: Option<R>,
    ) -> Result<Authorized<R>, OwnershipError> {
        let Some(resource) = resource else {
            return Err(OwnershipError::Denied);
        };

        let scope = self.scope(actor).await?;
        match scope.guard() {
            Some(guard) if scope.permits(&resource) => Ok(Authorized { resource, guard }),
            _ => {
                warn!(
                    subject_id = actor.subject_id,
                    role = %actor.role,
                    kind = R::KIND,
                    action = ?action,
                    "Ownership check denied"
                );
                Err(OwnershipError::Denied)
            }
        }
    }
}
