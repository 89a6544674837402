use axum::extract::State;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::Role;
use crate::database::models::{AgentProfile, Identity, IdentityFilter, IdentityPatch};
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

const RECENT_USERS: i64 = 10;

#[derive(Debug, Serialize)]
pub struct PendingAgent {
    #[serde(flatten)]
    pub identity: Identity,
    pub profile: Option<AgentProfile>,
}

#[derive(Debug, Deserialize)]
pub struct ApproveRequest {
    pub is_verified: Option<bool>,
}

/// GET /admin/users
pub async fn user_list(State(state): State<AppState>) -> ApiResult<Vec<Identity>> {
    let users = state.store().list_identities(IdentityFilter::default()).await?;
    Ok(ApiResponse::success(users))
}

/// GET /admin/users/recent - newest signups
pub async fn user_recent(State(state): State<AppState>) -> ApiResult<Vec<Identity>> {
    let users = state
        .store()
        .list_identities(IdentityFilter {
            recent: Some(RECENT_USERS),
            ..Default::default()
        })
        .await?;
    Ok(ApiResponse::success(users))
}

/// GET /admin/agents/pending - agents awaiting approval
pub async fn agent_pending(State(state): State<AppState>) -> ApiResult<Vec<PendingAgent>> {
    let store = state.store();
    let agents = store
        .list_identities(IdentityFilter {
            role: Some(Role::Agent),
            is_verified: Some(false),
            recent: None,
        })
        .await?;

    let mut pending = Vec::with_capacity(agents.len());
    for identity in agents {
        let profile = store.find_agent_profile_by_identity(identity.id).await?;
        pending.push(PendingAgent { identity, profile });
    }
    Ok(ApiResponse::success(pending))
}

/// PATCH /admin/approve/:id - set an agent's verification flag
pub async fn agent_approve(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(body): ApiJson<ApproveRequest>,
) -> ApiResult<Identity> {
    let store = state.store();
    match store.find_identity(id).await? {
        Some(identity) if identity.role == Role::Agent => {}
        _ => return Err(ApiError::not_found("Agent not found")),
    }

    let is_verified = body
        .is_verified
        .ok_or_else(|| ApiError::missing_fields(&["is_verified"]))?;

    let agent = store
        .update_identity(
            id,
            IdentityPatch {
                is_verified: Some(is_verified),
                ..Default::default()
            },
        )
        .await?
        .ok_or_else(|| ApiError::not_found("Agent not found"))?;

    info!(agent_id = id, is_verified, "Agent verification updated");
    Ok(ApiResponse::success(agent))
}
