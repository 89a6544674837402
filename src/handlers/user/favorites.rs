use axum::{extract::State, Extension};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::auth::Actor;
use crate::database::StoreError;
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::handlers::views::{self, PropertySummary};
use crate::middleware::{ApiResponse, ApiResult};
use crate::ownership::{Action, Authorized};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    pub property_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ToggleResult {
    pub property_id: i64,
    pub is_favorited: bool,
}

/// GET /user/favorites - saved listings
pub async fn favorite_list(State(state): State<AppState>, Extension(actor): Extension<Actor>) -> ApiResult<Vec<PropertySummary>> {
    let store = state.store();
    let mut saved = Vec::new();
    for favorite in store.list_favorites(actor.subject_id).await? {
        if let Some(property) = store.find_property(favorite.property_id).await? {
            saved.push(views::property_summary(store, property).await?);
        }
    }
    Ok(ApiResponse::success(saved))
}

/// POST /user/favorites/toggle - save or unsave a listing
pub async fn favorite_toggle(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiJson(body): ApiJson<ToggleRequest>,
) -> ApiResult<ToggleResult> {
    let property_id = body
        .property_id
        .ok_or_else(|| ApiError::missing_fields(&["property_id"]))?;

    let store = state.store();
    if store.find_property(property_id).await?.is_none() {
        return Err(ApiError::not_found("Property not found"));
    }

    let is_favorited = match store.find_favorite(actor.subject_id, property_id).await? {
        Some(existing) => {
            let Authorized { resource, guard } = state
                .resolver()
                .authorize(&actor, Action::Delete, Some(existing))
                .await?;
            store.delete_favorite(resource.id, guard).await?;
            false
        }
        None => match store.insert_favorite(actor.subject_id, property_id).await {
            Ok(_) => true,
            // A concurrent toggle saved it first.
            Err(StoreError::Conflict(_)) => {
                debug!(property_id, user_id = actor.subject_id, "Favorite already present");
                true
            }
            Err(e) => return Err(e.into()),
        },
    };

    Ok(ApiResponse::success(ToggleResult {
        property_id,
        is_favorited,
    }))
}
