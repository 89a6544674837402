use axum::{extract::State, Extension};
use serde::{Deserialize, Serialize};

use crate::auth::{Actor, Role};
use crate::database::models::{Identity, IdentityPatch};
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::handlers::present;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct UserProfileView {
    #[serde(flatten)]
    pub identity: Identity,
    pub user_profile_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    /// Accepted only when it names a role the caller may become.
    pub role: Option<Role>,
}

async fn view(state: &AppState, identity: Identity) -> Result<UserProfileView, ApiError> {
    let user_profile_id = state
        .store()
        .find_user_profile_by_identity(identity.id)
        .await?
        .map(|p| p.id);
    Ok(UserProfileView {
        identity,
        user_profile_id,
    })
}

/// GET /user/profile
pub async fn profile_get(State(state): State<AppState>, Extension(actor): Extension<Actor>) -> ApiResult<UserProfileView> {
    let identity = state
        .store()
        .find_identity(actor.subject_id)
        .await?
        .ok_or_else(ApiError::resource_not_found)?;
    Ok(ApiResponse::success(view(&state, identity).await?))
}

/// PUT /user/profile - names and phone; email and role are fixed
pub async fn profile_put(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiJson(body): ApiJson<UpdateProfileRequest>,
) -> ApiResult<UserProfileView> {
    if let Some(target) = body.role {
        if !actor.role.can_become(target) {
            return Err(ApiError::forbidden("Role cannot be changed"));
        }
    }

    let patch = IdentityPatch {
        first_name: present(body.first_name),
        last_name: present(body.last_name),
        phone: present(body.phone),
        is_verified: None,
    };

    let identity = state
        .store()
        .update_identity(actor.subject_id, patch)
        .await?
        .ok_or_else(ApiError::resource_not_found)?;
    Ok(ApiResponse::success(view(&state, identity).await?))
}
