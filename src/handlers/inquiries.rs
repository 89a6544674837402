use axum::{
    extract::{Query, State},
    Extension,
};
use serde::Deserialize;
use tracing::info;

use crate::auth::Actor;
use crate::database::models::{Inquiry, InquiryStatus, NewInquiry};
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath};
use crate::handlers::{missing, present, ListQuery};
use crate::middleware::{ApiResponse, ApiResult};
use crate::ownership::{Action, Authorized};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateInquiryRequest {
    pub property_id: Option<i64>,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct InquiryStatusRequest {
    pub status: Option<String>,
}

/// GET /agent/inquiries, GET /user/inquiries - newest first
pub async fn inquiry_list(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<Inquiry>> {
    let scope = state.resolver().scope(&actor).await?;
    let Some(filter) = scope.owned_filter() else {
        return Ok(ApiResponse::success(Vec::new()));
    };

    let inquiries = state
        .store()
        .list_inquiries(filter.recent(query.history_limit(&state.config)))
        .await?;
    Ok(ApiResponse::success(inquiries))
}

/// GET /agent/inquiries/:id, GET /user/inquiries/:id
pub async fn inquiry_get(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Inquiry> {
    let inquiry = state.store().find_inquiry(id).await?;
    let Authorized { resource, .. } = state.resolver().authorize(&actor, Action::Read, inquiry).await?;
    Ok(ApiResponse::success(resource))
}

/// POST /user/inquiries - ask the listing agent about a property
pub async fn inquiry_create(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiJson(body): ApiJson<CreateInquiryRequest>,
) -> ApiResult<Inquiry> {
    let message = present(body.message);
    let (Some(property_id), Some(message)) = (body.property_id, message.clone()) else {
        let absent = missing(&[("property_id", body.property_id.is_none()), ("message", message.is_none())]);
        return Err(ApiError::missing_fields(&absent));
    };

    let store = state.store();
    let property = store
        .find_property(property_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Property not found"))?;

    let inquiry = store
        .insert_inquiry(NewInquiry {
            user_id: actor.subject_id,
            agent_profile_id: property.agent_profile_id,
            property_id: property.id,
            message,
        })
        .await?;

    info!(inquiry_id = inquiry.id, property_id, user_id = actor.subject_id, "Inquiry sent");
    Ok(ApiResponse::created(inquiry))
}

/// PATCH /agent/inquiries/:id - mark read or responded
pub async fn inquiry_update_status(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(body): ApiJson<InquiryStatusRequest>,
) -> ApiResult<Inquiry> {
    let store = state.store();
    let Authorized { guard, .. } = state
        .resolver()
        .authorize(&actor, Action::Update, store.find_inquiry(id).await?)
        .await?;

    let status = present(body.status)
        .ok_or_else(|| ApiError::missing_fields(&["status"]))?
        .parse::<InquiryStatus>()
        .map_err(|_| ApiError::invalid_field("status", "Status must be one of new, read, responded"))?;

    let inquiry = store
        .update_inquiry_status(id, guard, status)
        .await?
        .ok_or_else(ApiError::resource_not_found)?;
    Ok(ApiResponse::success(inquiry))
}
