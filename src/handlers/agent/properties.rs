use axum::{
    extract::{Query, State},
    Extension,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::Actor;
use crate::database::models::*;
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath};
use crate::handlers::views::{self, Deleted, PropertyDetail, PropertySummary};
use crate::handlers::{missing, present, ListQuery};
use crate::middleware::{ApiResponse, ApiResult};
use crate::ownership::{Action, Authorized};
use crate::state::AppState;

use super::require_profile_id;

const DEFAULT_CURRENCY: &str = "Ksh";

#[derive(Debug, Deserialize)]
pub struct ImageInput {
    pub url: String,
    pub caption: Option<String>,
    #[serde(default)]
    pub is_primary: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreatePropertyRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub property_type_id: Option<i64>,
    pub price: Option<i64>,
    pub currency: Option<String>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub area_size: Option<i32>,
    pub area_unit: Option<String>,
    pub listing_type: Option<String>,
    pub status: Option<String>,
    pub country: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub neighborhood: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    #[serde(default)]
    pub images: Vec<ImageInput>,
    #[serde(default)]
    pub videos: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdatePropertyRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub property_type_id: Option<i64>,
    pub price: Option<i64>,
    pub currency: Option<String>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub area_size: Option<i32>,
    pub area_unit: Option<String>,
    pub listing_type: Option<String>,
    pub status: Option<String>,
    /// New images appended to the listing.
    pub images: Option<Vec<ImageInput>>,
    pub videos: Option<Vec<String>>,
    /// Existing media to retain; anything of that kind not listed is removed.
    pub keep_image_ids: Option<Vec<i64>>,
    pub keep_video_ids: Option<Vec<i64>>,
}

/// A listing as its agent sees it, with engagement counts.
#[derive(Debug, Serialize)]
pub struct AgentListing {
    #[serde(flatten)]
    pub summary: PropertySummary,
    pub views: usize,
    pub inquiries: usize,
}

fn parse_status(value: Option<String>) -> Result<Option<ListingStatus>, ApiError> {
    present(value)
        .map(|s| {
            s.parse::<ListingStatus>()
                .map_err(|_| ApiError::invalid_field("status", "Status must be one of onsale, onrent, lease"))
        })
        .transpose()
}

fn check_price(price: Option<i64>) -> Result<(), ApiError> {
    match price {
        Some(p) if p < 0 => Err(ApiError::invalid_field("price", "Price cannot be negative")),
        _ => Ok(()),
    }
}

fn new_images(inputs: Vec<ImageInput>) -> Vec<NewImage> {
    inputs
        .into_iter()
        .filter(|image| !image.url.trim().is_empty())
        .map(|image| NewImage {
            url: image.url,
            caption: image.caption,
            is_primary: image.is_primary,
        })
        .collect()
}

fn new_videos(urls: Vec<String>) -> Vec<String> {
    urls.into_iter().filter(|v| !v.trim().is_empty()).collect()
}

async fn check_property_type(state: &AppState, property_type_id: Option<i64>) -> Result<(), ApiError> {
    if let Some(id) = property_type_id {
        if state.store().find_property_type(id).await?.is_none() {
            return Err(ApiError::invalid_field("property_type_id", "Unknown property type"));
        }
    }
    Ok(())
}

/// GET /agent/properties - the caller's most recent listings
pub async fn property_list(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<AgentListing>> {
    let store = state.store();
    let scope = state.resolver().scope(&actor).await?;
    let Some(agent_profile_id) = scope.agent_profile_id() else {
        return Ok(ApiResponse::success(Vec::new()));
    };

    let properties = store
        .list_properties(PropertyFilter {
            agent_profile_id: Some(agent_profile_id),
            recent: Some(state.config.list_limit(query.limit)),
        })
        .await?;

    let mut listings = Vec::with_capacity(properties.len());
    for property in properties {
        let by_property = OwnedFilter::agent(agent_profile_id).property(property.id);
        let views = store.list_visits(by_property.clone()).await?.len();
        let inquiries = store.list_inquiries(by_property).await?.len();
        listings.push(AgentListing {
            summary: views::property_summary(store, property).await?,
            views,
            inquiries,
        });
    }

    Ok(ApiResponse::success(listings))
}

/// POST /agent/properties - create a listing owned by the caller's profile
pub async fn property_create(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiJson(body): ApiJson<CreatePropertyRequest>,
) -> ApiResult<PropertyDetail> {
    let agent_profile_id = require_profile_id(&state, &actor).await?;

    let title = present(body.title);
    let listing_type = present(body.listing_type);

    let absent = missing(&[
        ("title", title.is_none()),
        ("price", body.price.is_none()),
        ("listing_type", listing_type.is_none()),
        ("property_type_id", body.property_type_id.is_none()),
    ]);

    let (Some(title), Some(price), Some(listing_type), Some(property_type_id)) =
        (title, body.price, listing_type, body.property_type_id)
    else {
        return Err(ApiError::missing_fields(&absent));
    };

    check_price(Some(price))?;
    let status = parse_status(body.status)?.unwrap_or(ListingStatus::OnSale);
    check_property_type(&state, Some(property_type_id)).await?;

    let mut images = new_images(body.images);
    if !images.iter().any(|image| image.is_primary) {
        if let Some(first) = images.first_mut() {
            first.is_primary = true;
        }
    }

    let location = NewLocation {
        country: present(body.country),
        state: present(body.state),
        city: present(body.city),
        neighborhood: present(body.neighborhood),
        latitude: present(body.latitude),
        longitude: present(body.longitude),
    };
    let has_location = location.country.is_some()
        || location.state.is_some()
        || location.city.is_some()
        || location.neighborhood.is_some()
        || location.latitude.is_some()
        || location.longitude.is_some();

    let now = Utc::now();
    let store = state.store();
    let property = store
        .insert_property(NewProperty {
            agent_profile_id,
            title,
            description: present(body.description),
            property_type_id,
            price,
            currency: present(body.currency).unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            bedrooms: body.bedrooms,
            bathrooms: body.bathrooms,
            area_size: body.area_size,
            area_unit: present(body.area_unit),
            listing_type,
            status,
            listing_date: now,
            images,
            videos: new_videos(body.videos),
            location: has_location.then_some(location),
        })
        .await?;

    info!(property_id = property.id, agent_profile_id, "Property listed");
    Ok(ApiResponse::created(views::property_detail(store, property).await?))
}

/// GET /agent/properties/:id
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

/// PUT /agent/properties/:id - partial update of fields and media; ownership is not patchable
pub async fn property_update(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(body): ApiJson<UpdatePropertyRequest>,
) -> ApiResult<PropertyDetail> {
    let store = state.store();
    let Authorized { guard, .. } = state
        .resolver()
        .authorize(&actor, Action::Update, store.find_property(id).await?)
        .await?;

    check_price(body.price)?;
    let status = parse_status(body.status)?;
    check_property_type(&state, body.property_type_id).await?;

    let patch = PropertyPatch {
        title: present(body.title),
        description: present(body.description),
        property_type_id: body.property_type_id,
        price: body.price,
        currency: present(body.currency),
        bedrooms: body.bedrooms,
        bathrooms: body.bathrooms,
        area_size: body.area_size,
        area_unit: present(body.area_unit),
        listing_type: present(body.listing_type),
        status,
    };

    let media = MediaChange {
        keep_image_ids: body.keep_image_ids,
        keep_video_ids: body.keep_video_ids,
        add_images: body.images.map(new_images).unwrap_or_default(),
        add_videos: body.videos.map(new_videos).unwrap_or_default(),
    };

    let property = store
        .update_property(id, guard, patch)
        .await?
        .ok_or_else(ApiError::resource_not_found)?;

    if !media.is_empty() {
        if !store.replace_property_media(id, guard, media).await? {
            return Err(ApiError::resource_not_found());
        }
        info!(property_id = id, "Property media updated");
    }

    Ok(ApiResponse::success(views::property_detail(store, property).await?))
}

/// DELETE /agent/properties/:id - removes the listing and everything attached
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

    info!(property_id = id, subject_id = actor.subject_id, "Property deleted");
    Ok(ApiResponse::success(Deleted { id, deleted: true }))
}
