use axum::extract::State;

use crate::error::ApiError;
use crate::extract::ApiPath;
use crate::handlers::views::{self, PropertyDetail, PropertySummary};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /properties - every listing with its primary image and location
pub async fn property_list(State(state): State<AppState>) -> ApiResult<Vec<PropertySummary>> {
    let store = state.store();
    let properties = store.list_properties(Default::default()).await?;
    Ok(ApiResponse::success(views::property_summaries(store, properties).await?))
}

/// GET /properties/:id - full listing detail
pub async fn property_get(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> ApiResult<PropertyDetail> {
    let store = state.store();
    let property = store
        .find_property(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Property not found"))?;
    Ok(ApiResponse::success(views::property_detail(store, property).await?))
}
