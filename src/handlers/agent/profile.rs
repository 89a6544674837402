use axum::{extract::State, http::StatusCode, Extension};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::Actor;
use crate::database::models::{AgentProfile, AgentProfilePatch, Identity, NewAgentProfile};
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::handlers::present;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

use super::PROFILE_NOT_FOUND;

#[derive(Debug, Serialize)]
pub struct AgentProfileView {
    pub identity: Identity,
    pub profile: AgentProfile,
}

#[derive(Debug, Deserialize)]
pub struct ProfileRequest {
    pub license_number: Option<String>,
    pub bio: Option<String>,
    pub agency_id: Option<i64>,
}

/// GET /agent/profile
pub async fn profile_get(State(state): State<AppState>, Extension(actor): Extension<Actor>) -> ApiResult<AgentProfileView> {
    let store = state.store();
    let identity = store
        .find_identity(actor.subject_id)
        .await?
        .ok_or_else(ApiError::resource_not_found)?;
    let profile = store
        .find_agent_profile_by_identity(actor.subject_id)
        .await?
        .ok_or_else(|| ApiError::not_found(PROFILE_NOT_FOUND))?;

    Ok(ApiResponse::success(AgentProfileView { identity, profile }))
}

/// PUT /agent/profile - complete (201) or update (200) the caller's profile
pub async fn profile_put(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiJson(body): ApiJson<ProfileRequest>,
) -> ApiResult<AgentProfileView> {
    let store = state.store();
    let identity = store
        .find_identity(actor.subject_id)
        .await?
        .ok_or_else(ApiError::resource_not_found)?;

    let license_number = present(body.license_number);
    let bio = present(body.bio);

    match store.find_agent_profile_by_identity(actor.subject_id).await? {
        None => {
            let license_number = license_number.ok_or_else(|| ApiError::missing_fields(&["license_number"]))?;
            let profile = store
                .insert_agent_profile(NewAgentProfile {
                    identity_id: actor.subject_id,
                    license_number,
                    agency_id: body.agency_id,
                    bio,
                    rating: None,
                })
                .await?;

            info!(identity_id = actor.subject_id, agent_profile_id = profile.id, "Agent profile completed");
            Ok(ApiResponse::with_status(
                AgentProfileView { identity, profile },
                StatusCode::CREATED,
            ))
        }
        Some(existing) => {
            let profile = store
                .update_agent_profile(
                    existing.id,
                    AgentProfilePatch {
                        license_number,
                        agency_id: body.agency_id,
                        bio,
                    },
                )
                .await?
                .ok_or_else(|| ApiError::not_found(PROFILE_NOT_FOUND))?;

            Ok(ApiResponse::success(AgentProfileView { identity, profile }))
        }
    }
}
