use axum::{extract::State, Extension};
use serde::Serialize;

use crate::auth::{Actor, Role};
use crate::database::models::Identity;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct Me {
    #[serde(flatten)]
    pub identity: Identity,
    pub agent_profile_id: Option<i64>,
    pub user_profile_id: Option<i64>,
}

/// GET /me - the verified caller
pub async fn me(State(state): State<AppState>, Extension(actor): Extension<Actor>) -> ApiResult<Me> {
    let store = state.store();
    let identity = store
        .find_identity(actor.subject_id)
        .await?
        .ok_or_else(ApiError::resource_not_found)?;

    let (agent_profile_id, user_profile_id) = match identity.role {
        Role::Agent => (store.find_agent_profile_by_identity(identity.id).await?.map(|p| p.id), None),
        Role::User => (None, store.find_user_profile_by_identity(identity.id).await?.map(|p| p.id)),
        Role::Admin => (None, None),
    };

    Ok(ApiResponse::success(Me {
        identity,
        agent_profile_id,
        user_profile_id,
    }))
}
