//! In-process store backed by `BTreeMap` tables behind a tokio `RwLock`.
//!
//! Used when no `DATABASE_URL` is configured and by the test suite. Enforces
//! the same uniqueness, reference and cascade rules as the Postgres schema.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::auth::Role;
use crate::database::models::*;
use crate::database::store::{OwnerGuard, Store, StoreError, StoreResult};

#[derive(Default)]
struct Tables {
    sequences: HashMap<&'static str, i64>,
    identities: BTreeMap<i64, Identity>,
    agencies: BTreeMap<i64, Agency>,
    agent_profiles: BTreeMap<i64, AgentProfile>,
    user_profiles: BTreeMap<i64, UserProfile>,
    property_types: BTreeMap<i64, PropertyType>,
    properties: BTreeMap<i64, Property>,
    images: BTreeMap<i64, PropertyImage>,
    videos: BTreeMap<i64, PropertyVideo>,
    locations: BTreeMap<i64, Location>,
    inquiries: BTreeMap<i64, Inquiry>,
    conversations: BTreeMap<i64, Conversation>,
    messages: BTreeMap<i64, Message>,
    visits: BTreeMap<i64, Visit>,
    favorites: BTreeMap<i64, Favorite>,
    subscriptions: BTreeMap<i64, Subscription>,
    payments: BTreeMap<i64, Payment>,
}

impl Tables {
    fn next_id(&mut self, table: &'static str) -> i64 {
        let seq = self.sequences.entry(table).or_insert(0);
        *seq += 1;
        *seq
    }

    fn require_identity(&self, id: i64) -> StoreResult<()> {
        if self.identities.contains_key(&id) {
            Ok(())
        } else {
            Err(StoreError::MissingReference("identity"))
        }
    }

    fn require_agent_profile(&self, id: i64) -> StoreResult<()> {
        if self.agent_profiles.contains_key(&id) {
            Ok(())
        } else {
            Err(StoreError::MissingReference("agent profile"))
        }
    }

    fn require_property(&self, id: i64) -> StoreResult<()> {
        if self.properties.contains_key(&id) {
            Ok(())
        } else {
            Err(StoreError::MissingReference("property"))
        }
    }
}

/// Rows come out of the maps in id order; `recent` flips to newest first.
fn take_recent<T>(mut rows: Vec<T>, recent: Option<i64>) -> Vec<T> {
    if let Some(limit) = recent {
        rows.reverse();
        rows.truncate(limit.max(0) as usize);
    }
    rows
}

fn owned_match(filter: &OwnedFilter, user_id: i64, agent_profile_id: i64, property_id: i64, status: &str) -> bool {
    filter.user_id.map_or(true, |id| id == user_id)
        && filter.agent_profile_id.map_or(true, |id| id == agent_profile_id)
        && filter.property_id.map_or(true, |id| id == property_id)
        && filter.status.as_deref().map_or(true, |s| s == status)
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn insert_identity(&self, new: NewIdentity) -> StoreResult<Identity> {
        let mut t = self.tables.write().await;
        if t.identities.values().any(|i| i.email == new.email) {
            return Err(StoreError::Conflict("email"));
        }
        if t.identities.values().any(|i| i.phone == new.phone) {
            return Err(StoreError::Conflict("phone"));
        }
        let id = t.next_id("identities");
        let identity = Identity {
            id,
            first_name: new.first_name,
            last_name: new.last_name,
            email: new.email,
            phone: new.phone,
            password_hash: new.password_hash,
            role: new.role,
            is_verified: new.is_verified,
            created_at: Utc::now(),
        };
        t.identities.insert(id, identity.clone());
        Ok(identity)
    }

    async fn find_identity(&self, id: i64) -> StoreResult<Option<Identity>> {
        Ok(self.tables.read().await.identities.get(&id).cloned())
    }

    async fn find_identity_by_email(&self, email: &str) -> StoreResult<Option<Identity>> {
        let t = self.tables.read().await;
        Ok(t.identities.values().find(|i| i.email == email).cloned())
    }

    async fn list_identities(&self, filter: IdentityFilter) -> StoreResult<Vec<Identity>> {
        let t = self.tables.read().await;
        let rows = t
            .identities
            .values()
            .filter(|i| filter.role.map_or(true, |r| i.role == r))
            .filter(|i| filter.is_verified.map_or(true, |v| i.is_verified == v))
            .cloned()
            .collect();
        Ok(take_recent(rows, filter.recent))
    }

    async fn count_identities(&self, role: Option<Role>) -> StoreResult<i64> {
        let t = self.tables.read().await;
        Ok(t.identities.values().filter(|i| role.map_or(true, |r| i.role == r)).count() as i64)
    }

    async fn update_identity(&self, id: i64, patch: IdentityPatch) -> StoreResult<Option<Identity>> {
        let mut t = self.tables.write().await;
        if let Some(phone) = &patch.phone {
            if t.identities.values().any(|i| i.id != id && &i.phone == phone) {
                return Err(StoreError::Conflict("phone"));
            }
        }
        let Some(identity) = t.identities.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(v) = patch.first_name {
            identity.first_name = v;
        }
        if let Some(v) = patch.last_name {
            identity.last_name = v;
        }
        if let Some(v) = patch.phone {
            identity.phone = v;
        }
        if let Some(v) = patch.is_verified {
            identity.is_verified = v;
        }
        Ok(Some(identity.clone()))
    }

    async fn insert_agency(&self, new: NewAgency) -> StoreResult<Agency> {
        let mut t = self.tables.write().await;
        let id = t.next_id("agencies");
        let agency = Agency {
            id,
            name: new.name,
            address: new.address,
            phone: new.phone,
            founded_year: new.founded_year,
        };
        t.agencies.insert(id, agency.clone());
        Ok(agency)
    }

    async fn insert_agent_profile(&self, new: NewAgentProfile) -> StoreResult<AgentProfile> {
        let mut t = self.tables.write().await;
        t.require_identity(new.identity_id)?;
        if t.agent_profiles.values().any(|p| p.identity_id == new.identity_id) {
            return Err(StoreError::Conflict("agent profile"));
        }
        if t.agent_profiles.values().any(|p| p.license_number == new.license_number) {
            return Err(StoreError::Conflict("license_number"));
        }
        if let Some(agency_id) = new.agency_id {
            if !t.agencies.contains_key(&agency_id) {
                return Err(StoreError::MissingReference("agency"));
            }
        }
        let id = t.next_id("agent_profiles");
        let profile = AgentProfile {
            id,
            identity_id: new.identity_id,
            license_number: new.license_number,
            agency_id: new.agency_id,
            bio: new.bio,
            rating: new.rating,
            created_at: Utc::now(),
        };
        t.agent_profiles.insert(id, profile.clone());
        Ok(profile)
    }

    async fn find_agent_profile(&self, id: i64) -> StoreResult<Option<AgentProfile>> {
        Ok(self.tables.read().await.agent_profiles.get(&id).cloned())
    }

    async fn find_agent_profile_by_identity(&self, identity_id: i64) -> StoreResult<Option<AgentProfile>> {
        let t = self.tables.read().await;
        Ok(t.agent_profiles.values().find(|p| p.identity_id == identity_id).cloned())
    }

    async fn update_agent_profile(&self, id: i64, patch: AgentProfilePatch) -> StoreResult<Option<AgentProfile>> {
        let mut t = self.tables.write().await;
        if let Some(license) = &patch.license_number {
            if t.agent_profiles.values().any(|p| p.id != id && &p.license_number == license) {
                return Err(StoreError::Conflict("license_number"));
            }
        }
        if let Some(agency_id) = patch.agency_id {
            if !t.agencies.contains_key(&agency_id) {
                return Err(StoreError::MissingReference("agency"));
            }
        }
        let Some(profile) = t.agent_profiles.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(v) = patch.license_number {
            profile.license_number = v;
        }
        if let Some(v) = patch.agency_id {
            profile.agency_id = Some(v);
        }
        if let Some(v) = patch.bio {
            profile.bio = Some(v);
        }
        Ok(Some(profile.clone()))
    }

    async fn insert_user_profile(&self, identity_id: i64) -> StoreResult<UserProfile> {
        let mut t = self.tables.write().await;
        t.require_identity(identity_id)?;
        if t.user_profiles.values().any(|p| p.identity_id == identity_id) {
            return Err(StoreError::Conflict("user profile"));
        }
        let id = t.next_id("user_profiles");
        let profile = UserProfile {
            id,
            identity_id,
            created_at: Utc::now(),
        };
        t.user_profiles.insert(id, profile.clone());
        Ok(profile)
    }

    async fn find_user_profile_by_identity(&self, identity_id: i64) -> StoreResult<Option<UserProfile>> {
        let t = self.tables.read().await;
        Ok(t.user_profiles.values().find(|p| p.identity_id == identity_id).cloned())
    }

    async fn insert_property_type(&self, name: &str) -> StoreResult<PropertyType> {
        let mut t = self.tables.write().await;
        if t.property_types.values().any(|pt| pt.name == name) {
            return Err(StoreError::Conflict("property type"));
        }
        let id = t.next_id("property_types");
        let property_type = PropertyType {
            id,
            name: name.to_string(),
        };
        t.property_types.insert(id, property_type.clone());
        Ok(property_type)
    }

    async fn find_property_type(&self, id: i64) -> StoreResult<Option<PropertyType>> {
        Ok(self.tables.read().await.property_types.get(&id).cloned())
    }

    async fn insert_property(&self, new: NewProperty) -> StoreResult<Property> {
        let mut t = self.tables.write().await;
        t.require_agent_profile(new.agent_profile_id)?;
        if !t.property_types.contains_key(&new.property_type_id) {
            return Err(StoreError::MissingReference("property type"));
        }

        let id = t.next_id("properties");
        let now = Utc::now();
        let property = Property {
            id,
            agent_profile_id: new.agent_profile_id,
            title: new.title,
            description: new.description,
            property_type_id: new.property_type_id,
            price: new.price,
            currency: new.currency,
            bedrooms: new.bedrooms,
            bathrooms: new.bathrooms,
            area_size: new.area_size,
            area_unit: new.area_unit,
            listing_type: new.listing_type,
            status: new.status,
            listing_date: new.listing_date,
            created_at: now,
        };
        t.properties.insert(id, property.clone());

        for image in new.images {
            let image_id = t.next_id("property_images");
            t.images.insert(
                image_id,
                PropertyImage {
                    id: image_id,
                    property_id: id,
                    url: image.url,
                    caption: image.caption,
                    is_primary: image.is_primary,
                },
            );
        }
        for url in new.videos {
            let video_id = t.next_id("property_videos");
            t.videos.insert(
                video_id,
                PropertyVideo {
                    id: video_id,
                    property_id: id,
                    url,
                },
            );
        }
        if let Some(location) = new.location {
            let location_id = t.next_id("locations");
            t.locations.insert(
                location_id,
                Location {
                    id: location_id,
                    property_id: id,
                    country: location.country,
                    state: location.state,
                    city: location.city,
                    neighborhood: location.neighborhood,
                    latitude: location.latitude,
                    longitude: location.longitude,
                },
            );
        }

        Ok(property)
    }

    async fn find_property(&self, id: i64) -> StoreResult<Option<Property>> {
        Ok(self.tables.read().await.properties.get(&id).cloned())
    }

    async fn list_properties(&self, filter: PropertyFilter) -> StoreResult<Vec<Property>> {
        let t = self.tables.read().await;
        let rows = t
            .properties
            .values()
            .filter(|p| filter.agent_profile_id.map_or(true, |id| p.agent_profile_id == id))
            .cloned()
            .collect();
        Ok(take_recent(rows, filter.recent))
    }

    async fn count_properties(&self) -> StoreResult<i64> {
        Ok(self.tables.read().await.properties.len() as i64)
    }

    async fn property_media(&self, property_id: i64) -> StoreResult<PropertyMedia> {
        let t = self.tables.read().await;
        Ok(PropertyMedia {
            images: t.images.values().filter(|i| i.property_id == property_id).cloned().collect(),
            videos: t.videos.values().filter(|v| v.property_id == property_id).cloned().collect(),
            location: t.locations.values().find(|l| l.property_id == property_id).cloned(),
        })
    }

    async fn update_property(&self, id: i64, guard: OwnerGuard, patch: PropertyPatch) -> StoreResult<Option<Property>> {
        let mut t = self.tables.write().await;
        if let Some(type_id) = patch.property_type_id {
            if !t.property_types.contains_key(&type_id) {
                return Err(StoreError::MissingReference("property type"));
            }
        }
        let Some(property) = t.properties.get_mut(&id) else {
            return Ok(None);
        };
        if !guard.permits(None, Some(property.agent_profile_id)) {
            return Ok(None);
        }

        if let Some(v) = patch.title {
            property.title = v;
        }
        if let Some(v) = patch.description {
            property.description = Some(v);
        }
        if let Some(v) = patch.property_type_id {
            property.property_type_id = v;
        }
        if let Some(v) = patch.price {
            property.price = v;
        }
        if let Some(v) = patch.currency {
            property.currency = v;
        }
        if let Some(v) = patch.bedrooms {
            property.bedrooms = Some(v);
        }
        if let Some(v) = patch.bathrooms {
            property.bathrooms = Some(v);
        }
        if let Some(v) = patch.area_size {
            property.area_size = Some(v);
        }
        if let Some(v) = patch.area_unit {
            property.area_unit = Some(v);
        }
        if let Some(v) = patch.listing_type {
            property.listing_type = v;
        }
        if let Some(v) = patch.status {
            property.status = v;
        }
        Ok(Some(property.clone()))
    }

    async fn replace_property_media(&self, id: i64, guard: OwnerGuard, change: MediaChange) -> StoreResult<bool> {
        let mut t = self.tables.write().await;
        let permitted = t
            .properties
            .get(&id)
            .is_some_and(|p| guard.permits(None, Some(p.agent_profile_id)));
        if !permitted {
            return Ok(false);
        }

        if let Some(keep) = &change.keep_image_ids {
            t.images.retain(|image_id, i| i.property_id != id || keep.contains(image_id));
        }
        if let Some(keep) = &change.keep_video_ids {
            t.videos.retain(|video_id, v| v.property_id != id || keep.contains(video_id));
        }
        for image in change.add_images {
            let image_id = t.next_id("property_images");
            t.images.insert(
                image_id,
                PropertyImage {
                    id: image_id,
                    property_id: id,
                    url: image.url,
                    caption: image.caption,
                    is_primary: image.is_primary,
                },
            );
        }
        for url in change.add_videos {
            let video_id = t.next_id("property_videos");
            t.videos.insert(
                video_id,
                PropertyVideo {
                    id: video_id,
                    property_id: id,
                    url,
                },
            );
        }

        if !t.images.values().any(|i| i.property_id == id && i.is_primary) {
            if let Some(first) = t.images.values_mut().find(|i| i.property_id == id) {
                first.is_primary = true;
            }
        }
        Ok(true)
    }

    async fn delete_property(&self, id: i64, guard: OwnerGuard) -> StoreResult<bool> {
        let mut t = self.tables.write().await;
        let permitted = t
            .properties
            .get(&id)
            .is_some_and(|p| guard.permits(None, Some(p.agent_profile_id)));
        if !permitted {
            return Ok(false);
        }

        t.properties.remove(&id);
        t.images.retain(|_, i| i.property_id != id);
        t.videos.retain(|_, v| v.property_id != id);
        t.locations.retain(|_, l| l.property_id != id);
        t.inquiries.retain(|_, i| i.property_id != id);
        t.visits.retain(|_, v| v.property_id != id);
        t.favorites.retain(|_, f| f.property_id != id);

        let dropped: Vec<i64> = t
            .conversations
            .values()
            .filter(|c| c.property_id == id)
            .map(|c| c.id)
            .collect();
        t.conversations.retain(|_, c| c.property_id != id);
        t.messages.retain(|_, m| !dropped.contains(&m.conversation_id));

        Ok(true)
    }

    async fn insert_inquiry(&self, new: NewInquiry) -> StoreResult<Inquiry> {
        let mut t = self.tables.write().await;
        t.require_identity(new.user_id)?;
        t.require_agent_profile(new.agent_profile_id)?;
        t.require_property(new.property_id)?;
        let id = t.next_id("inquiries");
        let inquiry = Inquiry {
            id,
            user_id: new.user_id,
            agent_profile_id: new.agent_profile_id,
            property_id: new.property_id,
            message: new.message,
            status: InquiryStatus::New,
            created_at: Utc::now(),
        };
        t.inquiries.insert(id, inquiry.clone());
        Ok(inquiry)
    }

    async fn find_inquiry(&self, id: i64) -> StoreResult<Option<Inquiry>> {
        Ok(self.tables.read().await.inquiries.get(&id).cloned())
    }

    async fn list_inquiries(&self, filter: OwnedFilter) -> StoreResult<Vec<Inquiry>> {
        let t = self.tables.read().await;
        let rows = t
            .inquiries
            .values()
            .filter(|i| owned_match(&filter, i.user_id, i.agent_profile_id, i.property_id, i.status.as_str()))
            .cloned()
            .collect();
        Ok(take_recent(rows, filter.recent))
    }

    async fn update_inquiry_status(&self, id: i64, guard: OwnerGuard, status: InquiryStatus) -> StoreResult<Option<Inquiry>> {
        let mut t = self.tables.write().await;
        match t.inquiries.get_mut(&id) {
            Some(inquiry) if guard.permits(Some(inquiry.user_id), Some(inquiry.agent_profile_id)) => {
                inquiry.status = status;
                Ok(Some(inquiry.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn insert_conversation(&self, new: NewConversation) -> StoreResult<Conversation> {
        let mut t = self.tables.write().await;
        t.require_identity(new.user_id)?;
        t.require_agent_profile(new.agent_profile_id)?;
        t.require_property(new.property_id)?;
        let id = t.next_id("conversations");
        let conversation = Conversation {
            id,
            user_id: new.user_id,
            agent_profile_id: new.agent_profile_id,
            property_id: new.property_id,
            created_at: Utc::now(),
        };
        t.conversations.insert(id, conversation.clone());
        Ok(conversation)
    }

    async fn find_conversation(&self, id: i64) -> StoreResult<Option<Conversation>> {
        Ok(self.tables.read().await.conversations.get(&id).cloned())
    }

    async fn list_conversations(&self, filter: OwnedFilter) -> StoreResult<Vec<Conversation>> {
        let t = self.tables.read().await;
        let rows = t
            .conversations
            .values()
            .filter(|c| owned_match(&filter, c.user_id, c.agent_profile_id, c.property_id, ""))
            .cloned()
            .collect();
        Ok(take_recent(rows, filter.recent))
    }

    async fn insert_message(&self, new: NewMessage) -> StoreResult<Message> {
        let mut t = self.tables.write().await;
        if !t.conversations.contains_key(&new.conversation_id) {
            return Err(StoreError::MissingReference("conversation"));
        }
        t.require_identity(new.sender_id)?;
        let id = t.next_id("messages");
        let message = Message {
            id,
            conversation_id: new.conversation_id,
            sender_id: new.sender_id,
            body: new.body,
            created_at: Utc::now(),
        };
        t.messages.insert(id, message.clone());
        Ok(message)
    }

    async fn list_messages(&self, conversation_id: i64) -> StoreResult<Vec<Message>> {
        let t = self.tables.read().await;
        Ok(t.messages
            .values()
            .filter(|m| m.conversation_id == conversation_id)
            .cloned()
            .collect())
    }

    async fn insert_visit(&self, new: NewVisit) -> StoreResult<Visit> {
        let mut t = self.tables.write().await;
        t.require_identity(new.user_id)?;
        t.require_agent_profile(new.agent_profile_id)?;
        t.require_property(new.property_id)?;
        let id = t.next_id("visits");
        let visit = Visit {
            id,
            user_id: new.user_id,
            agent_profile_id: new.agent_profile_id,
            property_id: new.property_id,
            scheduled_time: new.scheduled_time,
            status: VisitStatus::Pending,
            created_at: Utc::now(),
        };
        t.visits.insert(id, visit.clone());
        Ok(visit)
    }

    async fn find_visit(&self, id: i64) -> StoreResult<Option<Visit>> {
        Ok(self.tables.read().await.visits.get(&id).cloned())
    }

    async fn list_visits(&self, filter: OwnedFilter) -> StoreResult<Vec<Visit>> {
        let t = self.tables.read().await;
        let rows = t
            .visits
            .values()
            .filter(|v| owned_match(&filter, v.user_id, v.agent_profile_id, v.property_id, v.status.as_str()))
            .cloned()
            .collect();
        Ok(take_recent(rows, filter.recent))
    }

    async fn update_visit_status(&self, id: i64, guard: OwnerGuard, status: VisitStatus) -> StoreResult<Option<Visit>> {
        let mut t = self.tables.write().await;
        match t.visits.get_mut(&id) {
            Some(visit) if guard.permits(Some(visit.user_id), Some(visit.agent_profile_id)) => {
                visit.status = status;
                Ok(Some(visit.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn find_favorite(&self, user_id: i64, property_id: i64) -> StoreResult<Option<Favorite>> {
        let t = self.tables.read().await;
        Ok(t.favorites
            .values()
            .find(|f| f.user_id == user_id && f.property_id == property_id)
            .cloned())
    }

    async fn insert_favorite(&self, user_id: i64, property_id: i64) -> StoreResult<Favorite> {
        let mut t = self.tables.write().await;
        t.require_identity(user_id)?;
        t.require_property(property_id)?;
        if t.favorites.values().any(|f| f.user_id == user_id && f.property_id == property_id) {
            return Err(StoreError::Conflict("favorite"));
        }
        let id = t.next_id("favorites");
        let favorite = Favorite {
            id,
            user_id,
            property_id,
            created_at: Utc::now(),
        };
        t.favorites.insert(id, favorite.clone());
        Ok(favorite)
    }

    async fn delete_favorite(&self, id: i64, guard: OwnerGuard) -> StoreResult<bool> {
        let mut t = self.tables.write().await;
        let permitted = t.favorites.get(&id).is_some_and(|f| guard.permits(Some(f.user_id), None));
        if permitted {
            t.favorites.remove(&id);
        }
        Ok(permitted)
    }

    async fn list_favorites(&self, user_id: i64) -> StoreResult<Vec<Favorite>> {
        let t = self.tables.read().await;
        Ok(t.favorites.values().filter(|f| f.user_id == user_id).cloned().collect())
    }

    async fn insert_subscription(&self, new: NewSubscription) -> StoreResult<Subscription> {
        let mut t = self.tables.write().await;
        t.require_identity(new.user_id)?;
        let id = t.next_id("subscriptions");
        let subscription = Subscription {
            id,
            user_id: new.user_id,
            plan: new.plan,
            expires_at: new.expires_at,
            created_at: Utc::now(),
        };
        t.subscriptions.insert(id, subscription.clone());
        Ok(subscription)
    }

    async fn list_subscriptions(&self, user_id: i64) -> StoreResult<Vec<Subscription>> {
        let t = self.tables.read().await;
        Ok(t.subscriptions.values().filter(|s| s.user_id == user_id).cloned().collect())
    }

    async fn insert_payment(&self, new: NewPayment) -> StoreResult<Payment> {
        let mut t = self.tables.write().await;
        t.require_identity(new.user_id)?;
        if let Some(agent_profile_id) = new.agent_profile_id {
            t.require_agent_profile(agent_profile_id)?;
        }
        let id = t.next_id("payments");
        let payment = Payment {
            id,
            user_id: new.user_id,
            agent_profile_id: new.agent_profile_id,
            amount: new.amount,
            payment_method: new.payment_method,
            status: new.status,
            created_at: Utc::now(),
        };
        t.payments.insert(id, payment.clone());
        Ok(payment)
    }

    async fn list_payments(&self, filter: PaymentFilter) -> StoreResult<Vec<Payment>> {
        let t = self.tables.read().await;
        Ok(t.payments
            .values()
            .filter(|p| payment_match(&filter, p))
            .cloned()
            .collect())
    }

    async fn sum_payments(&self, filter: PaymentFilter) -> StoreResult<i64> {
        let t = self.tables.read().await;
        Ok(t.payments
            .values()
            .filter(|p| payment_match(&filter, p))
            .map(|p| p.amount)
            .sum())
    }
}

fn payment_match(filter: &PaymentFilter, payment: &Payment) -> bool {
    filter.user_id.map_or(true, |id| payment.user_id == id)
        && filter
            .agent_profile_id
            .map_or(true, |id| payment.agent_profile_id == Some(id))
        && filter.status.map_or(true, |s| payment.status == s)
        && filter.since.map_or(true, |since| payment.created_at >= since)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_identity(email: &str, phone: &str, role: Role) -> NewIdentity {
        NewIdentity {
            first_name: "Test".to_string(),
            last_name: "Person".to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            password_hash: "hash".to_string(),
            role,
            is_verified: false,
        }
    }

    fn new_property(agent_profile_id: i64, property_type_id: i64) -> NewProperty {
        NewProperty {
            agent_profile_id,
            title: "Garden flat".to_string(),
            description: None,
            property_type_id,
            price: 120_000,
            currency: "Ksh".to_string(),
            bedrooms: Some(2),
            bathrooms: Some(1),
            area_size: None,
            area_unit: None,
            listing_type: "sale".to_string(),
            status: ListingStatus::OnSale,
            listing_date: Utc::now(),
            images: vec![NewImage {
                url: "https://img.test/1.jpg".to_string(),
                caption: None,
                is_primary: true,
            }],
            videos: vec!["https://vid.test/1.mp4".to_string()],
            location: Some(NewLocation {
                city: Some("Nairobi".to_string()),
                ..Default::default()
            }),
        }
    }

    /// Store with one agent (profile 1) owning one property, plus a user.
    async fn seeded() -> (MemoryStore, Identity, AgentProfile, Property) {
        let store = MemoryStore::new();
        let agent = store.insert_identity(new_identity("a@test", "1", Role::Agent)).await.unwrap();
        let user = store.insert_identity(new_identity("u@test", "2", Role::User)).await.unwrap();
        let profile = store
            .insert_agent_profile(NewAgentProfile {
                identity_id: agent.id,
                license_number: "LIC-1".to_string(),
                agency_id: None,
                bio: None,
                rating: None,
            })
            .await
            .unwrap();
        let house = store.insert_property_type("House").await.unwrap();
        let property = store.insert_property(new_property(profile.id, house.id)).await.unwrap();
        (store, user, profile, property)
    }

    #[tokio::test]
    async fn duplicate_email_and_phone_conflict() {
        let store = MemoryStore::new();
        store.insert_identity(new_identity("x@test", "100", Role::User)).await.unwrap();

        let err = store.insert_identity(new_identity("x@test", "101", Role::User)).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict("email")));

        let err = store.insert_identity(new_identity("y@test", "100", Role::User)).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict("phone")));
    }

    #[tokio::test]
    async fn guarded_update_rejects_other_agent() {
        let (store, _, profile, property) = seeded().await;
        let patch = PropertyPatch {
            title: Some("Renamed".to_string()),
            ..Default::default()
        };

        let denied = store
            .update_property(property.id, OwnerGuard::AgentProfile(profile.id + 1), patch.clone())
            .await
            .unwrap();
        assert!(denied.is_none());
        assert_eq!(store.find_property(property.id).await.unwrap().unwrap().title, "Garden flat");

        let updated = store
            .update_property(property.id, OwnerGuard::AgentProfile(profile.id), patch)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.agent_profile_id, profile.id);
    }

    #[tokio::test]
    async fn media_change_prunes_adds_and_promotes() {
        let (store, _, profile, property) = seeded().await;
        let change = MediaChange {
            keep_image_ids: Some(Vec::new()),
            keep_video_ids: None,
            add_images: vec![NewImage {
                url: "https://img.test/2.jpg".to_string(),
                caption: None,
                is_primary: false,
            }],
            add_videos: vec!["https://vid.test/2.mp4".to_string()],
        };

        assert!(!store
            .replace_property_media(property.id, OwnerGuard::AgentProfile(profile.id + 1), change.clone())
            .await
            .unwrap());
        assert_eq!(store.property_media(property.id).await.unwrap().images[0].url, "https://img.test/1.jpg");

        assert!(store
            .replace_property_media(property.id, OwnerGuard::AgentProfile(profile.id), change)
            .await
            .unwrap());
        let media = store.property_media(property.id).await.unwrap();
        assert_eq!(media.images.len(), 1);
        assert_eq!(media.primary_image().map(|i| i.url.as_str()), Some("https://img.test/2.jpg"));
        assert_eq!(media.videos.len(), 2);
    }

    #[tokio::test]
    async fn identity_guard_never_matches_a_property() {
        let (store, user, _, property) = seeded().await;
        assert!(!store.delete_property(property.id, OwnerGuard::Identity(user.id)).await.unwrap());
        assert!(store.find_property(property.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn delete_property_cascades() {
        let (store, user, profile, property) = seeded().await;
        store
            .insert_inquiry(NewInquiry {
                user_id: user.id,
                agent_profile_id: profile.id,
                property_id: property.id,
                message: "Is it available?".to_string(),
            })
            .await
            .unwrap();
        let conversation = store
            .insert_conversation(NewConversation {
                user_id: user.id,
                agent_profile_id: profile.id,
                property_id: property.id,
            })
            .await
            .unwrap();
        store
            .insert_message(NewMessage {
                conversation_id: conversation.id,
                sender_id: user.id,
                body: "hello".to_string(),
            })
            .await
            .unwrap();
        store.insert_favorite(user.id, property.id).await.unwrap();

        assert!(store.delete_property(property.id, OwnerGuard::Any).await.unwrap());

        assert!(store.find_property(property.id).await.unwrap().is_none());
        assert!(store.list_inquiries(OwnedFilter::default()).await.unwrap().is_empty());
        assert!(store.list_conversations(OwnedFilter::default()).await.unwrap().is_empty());
        assert!(store.list_messages(conversation.id).await.unwrap().is_empty());
        assert!(store.list_favorites(user.id).await.unwrap().is_empty());
        let media = store.property_media(property.id).await.unwrap();
        assert!(media.images.is_empty() && media.videos.is_empty() && media.location.is_none());
    }

    #[tokio::test]
    async fn favorites_are_unique_per_user_and_property() {
        let (store, user, _, property) = seeded().await;
        let favorite = store.insert_favorite(user.id, property.id).await.unwrap();
        assert!(matches!(
            store.insert_favorite(user.id, property.id).await,
            Err(StoreError::Conflict("favorite"))
        ));
        assert!(!store.delete_favorite(favorite.id, OwnerGuard::Identity(user.id + 99)).await.unwrap());
        assert!(store.delete_favorite(favorite.id, OwnerGuard::Identity(user.id)).await.unwrap());
    }

    #[tokio::test]
    async fn recent_is_newest_first_and_truncated() {
        let (store, _, profile, property) = seeded().await;
        let second = store
            .insert_property(new_property(profile.id, property.property_type_id))
            .await
            .unwrap();
        let rows = store
            .list_properties(PropertyFilter {
                agent_profile_id: Some(profile.id),
                recent: Some(1),
            })
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, second.id);
    }

    #[tokio::test]
    async fn missing_references_are_rejected() {
        let (store, user, profile, _) = seeded().await;
        let err = store
            .insert_inquiry(NewInquiry {
                user_id: user.id,
                agent_profile_id: profile.id,
                property_id: 9999,
                message: "?".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::MissingReference("property")));
    }
}
