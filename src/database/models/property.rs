use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use super::text_enum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    OnSale,
    OnRent,
    Lease,
}

text_enum!(ListingStatus, "listing status", {
    OnSale => "onsale",
    OnRent => "onrent",
    Lease => "lease",
});

/// A listing. `agent_profile_id` is stamped at creation and never changes.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Property {
    pub id: i64,
    pub agent_profile_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub property_type_id: i64,
    pub price: i64,
    pub currency: String,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub area_size: Option<i32>,
    pub area_unit: Option<String>,
    pub listing_type: String,
    #[sqlx(try_from = "String")]
    pub status: ListingStatus,
    pub listing_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PropertyImage {
    pub id: i64,
    pub property_id: i64,
    pub url: String,
    pub caption: Option<String>,
    pub is_primary: bool,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PropertyVideo {
    pub id: i64,
    pub property_id: i64,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Location {
    pub id: i64,
    pub property_id: i64,
    pub country: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub neighborhood: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
}

impl Location {
    /// Short label for list views: neighborhood, else city.
    pub fn label(&self) -> Option<String> {
        self.neighborhood.clone().or_else(|| self.city.clone())
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PropertyType {
    pub id: i64,
    pub name: String,
}

/// Images, videos and location attached to a property.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PropertyMedia {
    pub images: Vec<PropertyImage>,
    pub videos: Vec<PropertyVideo>,
    pub location: Option<Location>,
}

impl PropertyMedia {
    pub fn primary_image(&self) -> Option<&PropertyImage> {
        self.images.iter().find(|image| image.is_primary)
    }
}

#[derive(Debug, Clone)]
pub struct NewImage {
    pub url: String,
    pub caption: Option<String>,
    pub is_primary: bool,
}

#[derive(Debug, Clone, Default)]
pub struct NewLocation {
    pub country: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub neighborhood: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewProperty {
    pub agent_profile_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub property_type_id: i64,
    pub price: i64,
    pub currency: String,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub area_size: Option<i32>,
    pub area_unit: Option<String>,
    pub listing_type: String,
    pub status: ListingStatus,
    pub listing_date: DateTime<Utc>,
    pub images: Vec<NewImage>,
    pub videos: Vec<String>,
    pub location: Option<NewLocation>,
}

/// Partial update. Ownership (`agent_profile_id`) is not patchable.
#[derive(Debug, Clone, Default)]
pub struct PropertyPatch {
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
    pub status: Option<ListingStatus>,
}

impl PropertyPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.property_type_id.is_none()
            && self.price.is_none()
            && self.currency.is_none()
            && self.bedrooms.is_none()
            && self.bathrooms.is_none()
            && self.area_size.is_none()
            && self.area_unit.is_none()
            && self.listing_type.is_none()
            && self.status.is_none()
    }
}

/// Edits a listing's media. A `keep_*` list prunes every row of that kind
/// not named in it; `None` leaves existing rows alone. Additions are applied
/// after pruning, then the oldest image is promoted if none is primary.
#[derive(Debug, Clone, Default)]
pub struct MediaChange {
    pub keep_image_ids: Option<Vec<i64>>,
    pub keep_video_ids: Option<Vec<i64>>,
    pub add_images: Vec<NewImage>,
    pub add_videos: Vec<String>,
}

impl MediaChange {
    pub fn is_empty(&self) -> bool {
        self.keep_image_ids.is_none()
            && self.keep_video_ids.is_none()
            && self.add_images.is_empty()
            && self.add_videos.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct PropertyFilter {
    pub agent_profile_id: Option<i64>,
    /// When set, newest first and truncated to this many rows.
    pub recent: Option<i64>,
}
