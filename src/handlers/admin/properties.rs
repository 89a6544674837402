use axum::{extract::State, Extension};
use tracing::info;

use crate::auth::Actor;
use crate::error::ApiError;
use crate::extract::ApiPath;
use crate::handlers::views::{self, Deleted, PropertyDetail, PropertySummary};
use crate::middleware::{ApiResponse, ApiResult};
use crate::ownership::{Action, Authorized};
use crate::state::AppState;

/// GET /admin/properties
pub async fn property_list(State(state): State<AppState>) -> ApiResult<Vec<PropertySummary>> {
    let store = state.store();
    let properties = store.list_properties(Default::default()).await?;
    Ok(ApiResponse::success(views::property_summaries(store, properties).await?))
}

/// GET /admin/properties/:id
pub async fn property_get(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<PropertyDetail> {
    let store = state.store();
    let Authorized { resource, .. } = state
        .resolver()
        .authorize(&actor, Action::Read, store.find_property(id).await?)
        .await?;
    Ok(ApiResponse::success(views::property_detail(store, resource).await?))
}

/// DELETE /admin/properties/:id - moderation removal of any listing
pub async fn property_delete(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Deleted> {
    let store = state.store();
    let Authorized { guard, .. } = state
        .resolver()
        .authorize(&actor, Action::Delete, store.find_property(id).await?)
        .await?;

    if !store.delete_property(id, guard).await? {
        return Err(ApiError::resource_not_found());
    }

    info!(property_id = id, admin_id = actor.subject_id, "Property removed by admin");
    Ok(ApiResponse::success(Deleted { id, deleted: true }))
}
