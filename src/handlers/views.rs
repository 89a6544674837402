//! Response shapes assembled from several store rows.

use serde::Serialize;

use crate::database::models::*;
use crate::database::{Store, StoreError};

#[derive(Debug, Serialize)]
pub struct PropertySummary {
    #[serde(flatten)]
    pub property: Property,
    pub property_type: Option<String>,
    pub primary_image: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PropertyDetail {
    #[serde(flatten)]
    pub property: Property,
    pub property_type: Option<String>,
    pub images: Vec<PropertyImage>,
    pub videos: Vec<PropertyVideo>,
    pub location: Option<Location>,
    pub agent: Option<AgentCard>,
}

/// Public contact details of the listing agent.
#[derive(Debug, Serialize)]
pub struct AgentCard {
    pub agent_profile_id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub license_number: String,
    pub is_verified: bool,
}

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub id: i64,
    pub deleted: bool,
}

/// Conversation with its messages in send order.
#[derive(Debug, Serialize)]
pub struct Thread {
    #[serde(flatten)]
    pub conversation: Conversation,
    pub messages: Vec<Message>,
}

async fn type_name(store: &dyn Store, property_type_id: i64) -> Result<Option<String>, StoreError> {
    Ok(store.find_property_type(property_type_id).await?.map(|t| t.name))
}

pub async fn property_summary(store: &dyn Store, property: Property) -> Result<PropertySummary, StoreError> {
    let media = store.property_media(property.id).await?;
    Ok(PropertySummary {
        property_type: type_name(store, property.property_type_id).await?,
        primary_image: media
            .primary_image()
            .or_else(|| media.images.first())
            .map(|image| image.url.clone()),
        location: media.location.as_ref().and_then(Location::label),
        property,
    })
}

pub async fn property_summaries(store: &dyn Store, properties: Vec<Property>) -> Result<Vec<PropertySummary>, StoreError> {
    let mut summaries = Vec::with_capacity(properties.len());
    for property in properties {
        summaries.push(property_summary(store, property).await?);
    }
    Ok(summaries)
}

pub async fn property_detail(store: &dyn Store, property: Property) -> Result<PropertyDetail, StoreError> {
    let media = store.property_media(property.id).await?;
    let agent = agent_card(store, property.agent_profile_id).await?;
    Ok(PropertyDetail {
        property_type: type_name(store, property.property_type_id).await?,
        images: media.images,
        videos: media.videos,
        location: media.location,
        agent,
        property,
    })
}

async fn agent_card(store: &dyn Store, agent_profile_id: i64) -> Result<Option<AgentCard>, StoreError> {
    let Some(profile) = store.find_agent_profile(agent_profile_id).await? else {
        return Ok(None);
    };
    let Some(identity) = store.find_identity(profile.identity_id).await? else {
        return Ok(None);
    };
    Ok(Some(AgentCard {
        agent_profile_id: profile.id,
        name: identity.full_name(),
        email: identity.email,
        phone: identity.phone,
        license_number: profile.license_number,
        is_verified: identity.is_verified,
    }))
}

pub async fn thread(store: &dyn Store, conversation: Conversation) -> Result<Thread, StoreError> {
    let messages = store.list_messages(conversation.id).await?;
    Ok(Thread { conversation, messages })
}
