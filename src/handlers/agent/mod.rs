pub mod profile;
pub mod properties;
pub mod stats;

use crate::auth::Actor;
use crate::error::ApiError;
use crate::state::AppState;

pub(crate) const PROFILE_NOT_FOUND: &str = "Agent profile not found";

/// Profile id the agent's listings hang off; agents must finish their
/// profile before creating anything.
pub(crate) async fn require_profile_id(state: &AppState, actor: &Actor) -> Result<i64, ApiError> {
    state
        .resolver()
        .scope(actor)
        .await?
        .agent_profile_id()
        .ok_or_else(|| ApiError::not_found(PROFILE_NOT_FOUND))
}
