//! Postgres-backed [`Store`].
//!
//! Owner guards are folded into the `WHERE` clause of each mutation as
//! `($n::BIGINT IS NULL OR <owner column> = $n)`, so the check and the write
//! happen in a single statement.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::info;

use crate::auth::Role;
use crate::config::DatabaseConfig;
use crate::database::models::*;
use crate::database::store::{OwnerGuard, Store, StoreError, StoreResult};

const SCHEMA: &str = include_str!("schema.sql");

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.is_unique_violation() {
                return StoreError::Conflict(unique_field(db.constraint()));
            }
            if db.is_foreign_key_violation() {
                return StoreError::MissingReference(reference_name(db.constraint()));
            }
        }
        StoreError::Backend(err.to_string())
    }
}

fn unique_field(constraint: Option<&str>) -> &'static str {
    match constraint {
        Some("identities_email_key") => "email",
        Some("identities_phone_key") => "phone",
        Some("agent_profiles_license_number_key") => "license_number",
        Some("agent_profiles_identity_id_key") => "agent profile",
        Some("user_profiles_identity_id_key") => "user profile",
        Some("property_types_name_key") => "property type",
        Some("favorites_user_id_property_id_key") => "favorite",
        _ => "record",
    }
}

fn reference_name(constraint: Option<&str>) -> &'static str {
    let Some(name) = constraint else {
        return "record";
    };
    if name.ends_with("property_type_id_fkey") {
        "property type"
    } else if name.ends_with("agent_profile_id_fkey") {
        "agent profile"
    } else if name.ends_with("property_id_fkey") {
        "property"
    } else if name.ends_with("conversation_id_fkey") {
        "conversation"
    } else if name.ends_with("agency_id_fkey") {
        "agency"
    } else {
        "identity"
    }
}

fn order_clause(recent: Option<i64>) -> &'static str {
    if recent.is_some() {
        "ORDER BY created_at DESC, id DESC"
    } else {
        "ORDER BY id"
    }
}

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(url: &str, config: &DatabaseConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;

        info!(max_connections = config.max_connections, "Connected to Postgres");
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create any missing tables.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        for statement in SCHEMA.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        info!("Schema is up to date");
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn insert_identity(&self, new: NewIdentity) -> StoreResult<Identity> {
        Ok(sqlx::query_as::<_, Identity>(
            "INSERT INTO identities (first_name, last_name, email, phone, password_hash, role, is_verified)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING *",
        )
        .bind(new.first_name)
        .bind(new.last_name)
        .bind(new.email)
        .bind(new.phone)
        .bind(new.password_hash)
        .bind(new.role.as_str())
        .bind(new.is_verified)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn find_identity(&self, id: i64) -> StoreResult<Option<Identity>> {
        Ok(sqlx::query_as::<_, Identity>("SELECT * FROM identities WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_identity_by_email(&self, email: &str) -> StoreResult<Option<Identity>> {
        Ok(sqlx::query_as::<_, Identity>("SELECT * FROM identities WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_identities(&self, filter: IdentityFilter) -> StoreResult<Vec<Identity>> {
        let sql = format!(
            "SELECT * FROM identities
             WHERE ($1::TEXT IS NULL OR role = $1)
               AND ($2::BOOLEAN IS NULL OR is_verified = $2)
             {} LIMIT $3",
            order_clause(filter.recent)
        );
        Ok(sqlx::query_as::<_, Identity>(&sql)
            .bind(filter.role.map(|r| r.as_str()))
            .bind(filter.is_verified)
            .bind(filter.recent)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn count_identities(&self, role: Option<Role>) -> StoreResult<i64> {
        Ok(
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM identities WHERE ($1::TEXT IS NULL OR role = $1)")
                .bind(role.map(|r| r.as_str()))
                .fetch_one(&self.pool)
                .await?,
        )
    }

    async fn update_identity(&self, id: i64, patch: IdentityPatch) -> StoreResult<Option<Identity>> {
        Ok(sqlx::query_as::<_, Identity>(
            "UPDATE identities SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                phone = COALESCE($4, phone),
                is_verified = COALESCE($5, is_verified)
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(patch.first_name)
        .bind(patch.last_name)
        .bind(patch.phone)
        .bind(patch.is_verified)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn insert_agency(&self, new: NewAgency) -> StoreResult<Agency> {
        Ok(sqlx::query_as::<_, Agency>(
            "INSERT INTO agencies (name, address, phone, founded_year) VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(new.name)
        .bind(new.address)
        .bind(new.phone)
        .bind(new.founded_year)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn insert_agent_profile(&self, new: NewAgentProfile) -> StoreResult<AgentProfile> {
        Ok(sqlx::query_as::<_, AgentProfile>(
            "INSERT INTO agent_profiles (identity_id, license_number, agency_id, bio, rating)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING *",
        )
        .bind(new.identity_id)
        .bind(new.license_number)
        .bind(new.agency_id)
        .bind(new.bio)
        .bind(new.rating)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn find_agent_profile(&self, id: i64) -> StoreResult<Option<AgentProfile>> {
        Ok(sqlx::query_as::<_, AgentProfile>("SELECT * FROM agent_profiles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_agent_profile_by_identity(&self, identity_id: i64) -> StoreResult<Option<AgentProfile>> {
        Ok(sqlx::query_as::<_, AgentProfile>("SELECT * FROM agent_profiles WHERE identity_id = $1")
            .bind(identity_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn update_agent_profile(&self, id: i64, patch: AgentProfilePatch) -> StoreResult<Option<AgentProfile>> {
        Ok(sqlx::query_as::<_, AgentProfile>(
            "UPDATE agent_profiles SET
                license_number = COALESCE($2, license_number),
                agency_id = COALESCE($3, agency_id),
                bio = COALESCE($4, bio)
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(patch.license_number)
        .bind(patch.agency_id)
        .bind(patch.bio)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn insert_user_profile(&self, identity_id: i64) -> StoreResult<UserProfile> {
        Ok(
            sqlx::query_as::<_, UserProfile>("INSERT INTO user_profiles (identity_id) VALUES ($1) RETURNING *")
                .bind(identity_id)
                .fetch_one(&self.pool)
                .await?,
        )
    }

    async fn find_user_profile_by_identity(&self, identity_id: i64) -> StoreResult<Option<UserProfile>> {
        Ok(sqlx::query_as::<_, UserProfile>("SELECT * FROM user_profiles WHERE identity_id = $1")
            .bind(identity_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn insert_property_type(&self, name: &str) -> StoreResult<PropertyType> {
        Ok(
            sqlx::query_as::<_, PropertyType>("INSERT INTO property_types (name) VALUES ($1) RETURNING *")
                .bind(name)
                .fetch_one(&self.pool)
                .await?,
        )
    }

    async fn find_property_type(&self, id: i64) -> StoreResult<Option<PropertyType>> {
        Ok(sqlx::query_as::<_, PropertyType>("SELECT * FROM property_types WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn insert_property(&self, new: NewProperty) -> StoreResult<Property> {
        let mut tx = self.pool.begin().await?;

        let property = sqlx::query_as::<_, Property>(
            "INSERT INTO properties (agent_profile_id, title, description, property_type_id, price, currency,
                                     bedrooms, bathrooms, area_size, area_unit, listing_type, status, listing_date)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
             RETURNING *",
        )
        .bind(new.agent_profile_id)
        .bind(new.title)
        .bind(new.description)
        .bind(new.property_type_id)
        .bind(new.price)
        .bind(new.currency)
        .bind(new.bedrooms)
        .bind(new.bathrooms)
        .bind(new.area_size)
        .bind(new.area_unit)
        .bind(new.listing_type)
        .bind(new.status.as_str())
        .bind(new.listing_date)
        .fetch_one(&mut *tx)
        .await?;

        for image in new.images {
            sqlx::query("INSERT INTO property_images (property_id, url, caption, is_primary) VALUES ($1, $2, $3, $4)")
                .bind(property.id)
                .bind(image.url)
                .bind(image.caption)
                .bind(image.is_primary)
                .execute(&mut *tx)
                .await?;
        }
        for url in new.videos {
            sqlx::query("INSERT INTO property_videos (property_id, url) VALUES ($1, $2)")
                .bind(property.id)
                .bind(url)
                .execute(&mut *tx)
                .await?;
        }
        if let Some(location) = new.location {
            sqlx::query(
                "INSERT INTO locations (property_id, country, state, city, neighborhood, latitude, longitude)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
            .bind(property.id)
            .bind(location.country)
            .bind(location.state)
            .bind(location.city)
            .bind(location.neighborhood)
            .bind(location.latitude)
            .bind(location.longitude)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(property)
    }

    async fn find_property(&self, id: i64) -> StoreResult<Option<Property>> {
        Ok(sqlx::query_as::<_, Property>("SELECT * FROM properties WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_properties(&self, filter: PropertyFilter) -> StoreResult<Vec<Property>> {
        let sql = format!(
            "SELECT * FROM properties WHERE ($1::BIGINT IS NULL OR agent_profile_id = $1) {} LIMIT $2",
            order_clause(filter.recent)
        );
        Ok(sqlx::query_as::<_, Property>(&sql)
            .bind(filter.agent_profile_id)
            .bind(filter.recent)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn count_properties(&self) -> StoreResult<i64> {
        Ok(sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM properties")
            .fetch_one(&self.pool)
            .await?)
    }

    async fn property_media(&self, property_id: i64) -> StoreResult<PropertyMedia> {
        let images = sqlx::query_as::<_, PropertyImage>("SELECT * FROM property_images WHERE property_id = $1 ORDER BY id")
            .bind(property_id)
            .fetch_all(&self.pool)
            .await?;
        let videos = sqlx::query_as::<_, PropertyVideo>("SELECT * FROM property_videos WHERE property_id = $1 ORDER BY id")
            .bind(property_id)
            .fetch_all(&self.pool)
            .await?;
        let location = sqlx::query_as::<_, Location>("SELECT * FROM locations WHERE property_id = $1")
            .bind(property_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(PropertyMedia { images, videos, location })
    }

    async fn update_property(&self, id: i64, guard: OwnerGuard, patch: PropertyPatch) -> StoreResult<Option<Property>> {
        // Properties have no user owner; an identity guard can never match.
        if let OwnerGuard::Identity(_) = guard {
            return Ok(None);
        }
        let (_, agent_profile_id) = guard.predicate();

        Ok(sqlx::query_as::<_, Property>(
            "UPDATE properties SET
                title = COALESCE($3, title),
                description = COALESCE($4, description),
                property_type_id = COALESCE($5, property_type_id),
                price = COALESCE($6, price),
                currency = COALESCE($7, currency),
                bedrooms = COALESCE($8, bedrooms),
                bathrooms = COALESCE($9, bathrooms),
                area_size = COALESCE($10, area_size),
                area_unit = COALESCE($11, area_unit),
                listing_type = COALESCE($12, listing_type),
                status = COALESCE($13, status)
             WHERE id = $1 AND ($2::BIGINT IS NULL OR agent_profile_id = $2)
             RETURNING *",
        )
        .bind(id)
        .bind(agent_profile_id)
        .bind(patch.title)
        .bind(patch.description)
        .bind(patch.property_type_id)
        .bind(patch.price)
        .bind(patch.currency)
        .bind(patch.bedrooms)
        .bind(patch.bathrooms)
        .bind(patch.area_size)
        .bind(patch.area_unit)
        .bind(patch.listing_type)
        .bind(patch.status.map(|s| s.as_str()))
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn replace_property_media(&self, id: i64, guard: OwnerGuard, change: MediaChange) -> StoreResult<bool> {
        if let OwnerGuard::Identity(_) = guard {
            return Ok(false);
        }
        let (_, agent_profile_id) = guard.predicate();
        let mut tx = self.pool.begin().await?;

        // Row lock holds the ownership check for the rest of the transaction.
        let owned = sqlx::query_scalar::<_, i64>(
            "SELECT id FROM properties WHERE id = $1 AND ($2::BIGINT IS NULL OR agent_profile_id = $2) FOR UPDATE",
        )
        .bind(id)
        .bind(agent_profile_id)
        .fetch_optional(&mut *tx)
        .await?;
        if owned.is_none() {
            return Ok(false);
        }

        if let Some(keep) = change.keep_image_ids {
            sqlx::query("DELETE FROM property_images WHERE property_id = $1 AND id <> ALL($2)")
                .bind(id)
                .bind(keep)
                .execute(&mut *tx)
                .await?;
        }
        if let Some(keep) = change.keep_video_ids {
            sqlx::query("DELETE FROM property_videos WHERE property_id = $1 AND id <> ALL($2)")
                .bind(id)
                .bind(keep)
                .execute(&mut *tx)
                .await?;
        }
        for image in change.add_images {
            sqlx::query("INSERT INTO property_images (property_id, url, caption, is_primary) VALUES ($1, $2, $3, $4)")
                .bind(id)
                .bind(image.url)
                .bind(image.caption)
                .bind(image.is_primary)
                .execute(&mut *tx)
                .await?;
        }
        for url in change.add_videos {
            sqlx::query("INSERT INTO property_videos (property_id, url) VALUES ($1, $2)")
                .bind(id)
                .bind(url)
                .execute(&mut *tx)
                .await?;
        }
        sqlx::query(
            "UPDATE property_images SET is_primary = TRUE
             WHERE id = (SELECT MIN(id) FROM property_images WHERE property_id = $1)
               AND NOT EXISTS (SELECT 1 FROM property_images WHERE property_id = $1 AND is_primary)",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn delete_property(&self, id: i64, guard: OwnerGuard) -> StoreResult<bool> {
        if let OwnerGuard::Identity(_) = guard {
            return Ok(false);
        }
        let (_, agent_profile_id) = guard.predicate();

        // Media, inquiries, conversations, visits and favorites go via ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM properties WHERE id = $1 AND ($2::BIGINT IS NULL OR agent_profile_id = $2)")
            .bind(id)
            .bind(agent_profile_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_inquiry(&self, new: NewInquiry) -> StoreResult<Inquiry> {
        Ok(sqlx::query_as::<_, Inquiry>(
            "INSERT INTO inquiries (user_id, agent_profile_id, property_id, message)
             VALUES ($1, $2, $3, $4)
             RETURNING *",
        )
        .bind(new.user_id)
        .bind(new.agent_profile_id)
        .bind(new.property_id)
        .bind(new.message)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn find_inquiry(&self, id: i64) -> StoreResult<Option<Inquiry>> {
        Ok(sqlx::query_as::<_, Inquiry>("SELECT * FROM inquiries WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_inquiries(&self, filter: OwnedFilter) -> StoreResult<Vec<Inquiry>> {
        let sql = format!(
            "SELECT * FROM inquiries
             WHERE ($1::BIGINT IS NULL OR user_id = $1)
               AND ($2::BIGINT IS NULL OR agent_profile_id = $2)
               AND ($3::BIGINT IS NULL OR property_id = $3)
               AND ($4::TEXT IS NULL OR status = $4)
             {} LIMIT $5",
            order_clause(filter.recent)
        );
        Ok(sqlx::query_as::<_, Inquiry>(&sql)
            .bind(filter.user_id)
            .bind(filter.agent_profile_id)
            .bind(filter.property_id)
            .bind(filter.status)
            .bind(filter.recent)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn update_inquiry_status(&self, id: i64, guard: OwnerGuard, status: InquiryStatus) -> StoreResult<Option<Inquiry>> {
        let (user_id, agent_profile_id) = guard.predicate();
        Ok(sqlx::query_as::<_, Inquiry>(
            "UPDATE inquiries SET status = $4
             WHERE id = $1
               AND ($2::BIGINT IS NULL OR user_id = $2)
               AND ($3::BIGINT IS NULL OR agent_profile_id = $3)
             RETURNING *",
        )
        .bind(id)
        .bind(user_id)
        .bind(agent_profile_id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn insert_conversation(&self, new: NewConversation) -> StoreResult<Conversation> {
        Ok(sqlx::query_as::<_, Conversation>(
            "INSERT INTO conversations (user_id, agent_profile_id, property_id) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(new.user_id)
        .bind(new.agent_profile_id)
        .bind(new.property_id)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn find_conversation(&self, id: i64) -> StoreResult<Option<Conversation>> {
        Ok(sqlx::query_as::<_, Conversation>("SELECT * FROM conversations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_conversations(&self, filter: OwnedFilter) -> StoreResult<Vec<Conversation>> {
        let sql = format!(
            "SELECT * FROM conversations
             WHERE ($1::BIGINT IS NULL OR user_id = $1)
               AND ($2::BIGINT IS NULL OR agent_profile_id = $2)
               AND ($3::BIGINT IS NULL OR property_id = $3)
             {} LIMIT $4",
            order_clause(filter.recent)
        );
        Ok(sqlx::query_as::<_, Conversation>(&sql)
            .bind(filter.user_id)
            .bind(filter.agent_profile_id)
            .bind(filter.property_id)
            .bind(filter.recent)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn insert_message(&self, new: NewMessage) -> StoreResult<Message> {
        Ok(sqlx::query_as::<_, Message>(
            "INSERT INTO messages (conversation_id, sender_id, body) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(new.conversation_id)
        .bind(new.sender_id)
        .bind(new.body)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn list_messages(&self, conversation_id: i64) -> StoreResult<Vec<Message>> {
        Ok(sqlx::query_as::<_, Message>("SELECT * FROM messages WHERE conversation_id = $1 ORDER BY id")
            .bind(conversation_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn insert_visit(&self, new: NewVisit) -> StoreResult<Visit> {
        Ok(sqlx::query_as::<_, Visit>(
            "INSERT INTO visits (user_id, agent_profile_id, property_id, scheduled_time)
             VALUES ($1, $2, $3, $4)
             RETURNING *",
        )
        .bind(new.user_id)
        .bind(new.agent_profile_id)
        .bind(new.property_id)
        .bind(new.scheduled_time)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn find_visit(&self, id: i64) -> StoreResult<Option<Visit>> {
        Ok(sqlx::query_as::<_, Visit>("SELECT * FROM visits WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_visits(&self, filter: OwnedFilter) -> StoreResult<Vec<Visit>> {
        let sql = format!(
            "SELECT * FROM visits
             WHERE ($1::BIGINT IS NULL OR user_id = $1)
               AND ($2::BIGINT IS NULL OR agent_profile_id = $2)
               AND ($3::BIGINT IS NULL OR property_id = $3)
               AND ($4::TEXT IS NULL OR status = $4)
             {} LIMIT $5",
            order_clause(filter.recent)
        );
        Ok(sqlx::query_as::<_, Visit>(&sql)
            .bind(filter.user_id)
            .bind(filter.agent_profile_id)
            .bind(filter.property_id)
            .bind(filter.status)
            .bind(filter.recent)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn update_visit_status(&self, id: i64, guard: OwnerGuard, status: VisitStatus) -> StoreResult<Option<Visit>> {
        let (user_id, agent_profile_id) = guard.predicate();
        Ok(sqlx::query_as::<_, Visit>(
            "UPDATE visits SET status = $4
             WHERE id = $1
               AND ($2::BIGINT IS NULL OR user_id = $2)
               AND ($3::BIGINT IS NULL OR agent_profile_id = $3)
             RETURNING *",
        )
        .bind(id)
        .bind(user_id)
        .bind(agent_profile_id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn find_favorite(&self, user_id: i64, property_id: i64) -> StoreResult<Option<Favorite>> {
        Ok(sqlx::query_as::<_, Favorite>("SELECT * FROM favorites WHERE user_id = $1 AND property_id = $2")
            .bind(user_id)
            .bind(property_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn insert_favorite(&self, user_id: i64, property_id: i64) -> StoreResult<Favorite> {
        Ok(
            sqlx::query_as::<_, Favorite>("INSERT INTO favorites (user_id, property_id) VALUES ($1, $2) RETURNING *")
                .bind(user_id)
                .bind(property_id)
                .fetch_one(&self.pool)
                .await?,
        )
    }

    async fn delete_favorite(&self, id: i64, guard: OwnerGuard) -> StoreResult<bool> {
        if let OwnerGuard::AgentProfile(_) = guard {
            return Ok(false);
        }
        let (user_id, _) = guard.predicate();
        let result = sqlx::query("DELETE FROM favorites WHERE id = $1 AND ($2::BIGINT IS NULL OR user_id = $2)")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_favorites(&self, user_id: i64) -> StoreResult<Vec<Favorite>> {
        Ok(sqlx::query_as::<_, Favorite>("SELECT * FROM favorites WHERE user_id = $1 ORDER BY id")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn insert_subscription(&self, new: NewSubscription) -> StoreResult<Subscription> {
        Ok(sqlx::query_as::<_, Subscription>(
            "INSERT INTO subscriptions (user_id, plan, expires_at) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(new.user_id)
        .bind(new.plan)
        .bind(new.expires_at)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn list_subscriptions(&self, user_id: i64) -> StoreResult<Vec<Subscription>> {
        Ok(sqlx::query_as::<_, Subscription>("SELECT * FROM subscriptions WHERE user_id = $1 ORDER BY id")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn insert_payment(&self, new: NewPayment) -> StoreResult<Payment> {
        Ok(sqlx::query_as::<_, Payment>(
            "INSERT INTO payments (user_id, agent_profile_id, amount, payment_method, status)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING *",
        )
        .bind(new.user_id)
        .bind(new.agent_profile_id)
        .bind(new.amount)
        .bind(new.payment_method)
        .bind(new.status.as_str())
        .fetch_one(&self.pool)
        .await?)
    }

    async fn list_payments(&self, filter: PaymentFilter) -> StoreResult<Vec<Payment>> {
        Ok(sqlx::query_as::<_, Payment>(
            "SELECT * FROM payments
             WHERE ($1::BIGINT IS NULL OR user_id = $1)
               AND ($2::BIGINT IS NULL OR agent_profile_id = $2)
               AND ($3::TEXT IS NULL OR status = $3)
               AND ($4::TIMESTAMPTZ IS NULL OR created_at >= $4)
             ORDER BY id",
        )
        .bind(filter.user_id)
        .bind(filter.agent_profile_id)
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.since)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn sum_payments(&self, filter: PaymentFilter) -> StoreResult<i64> {
        Ok(sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(amount), 0)::BIGINT FROM payments
             WHERE ($1::BIGINT IS NULL OR user_id = $1)
               AND ($2::BIGINT IS NULL OR agent_profile_id = $2)
               AND ($3::TEXT IS NULL OR status = $3)
               AND ($4::TIMESTAMPTZ IS NULL OR created_at >= $4)",
        )
        .bind(filter.user_id)
        .bind(filter.agent_profile_id)
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.since)
        .fetch_one(&self.pool)
        .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_unique_constraints_to_fields() {
        assert_eq!(unique_field(Some("identities_email_key")), "email");
        assert_eq!(unique_field(Some("agent_profiles_license_number_key")), "license_number");
        assert_eq!(unique_field(None), "record");
    }

    #[test]
    fn maps_foreign_keys_to_references() {
        assert_eq!(reference_name(Some("properties_property_type_id_fkey")), "property type");
        assert_eq!(reference_name(Some("inquiries_property_id_fkey")), "property");
        assert_eq!(reference_name(Some("visits_agent_profile_id_fkey")), "agent profile");
        assert_eq!(reference_name(Some("messages_sender_id_fkey")), "identity");
    }

    #[test]
    fn schema_has_every_table() {
        for table in [
            "identities",
            "agent_profiles",
            "user_profiles",
            "properties",
            "locations",
            "inquiries",
            "conversations",
            "messages",
            "visits",
            "favorites",
            "subscriptions",
            "payments",
        ] {
            assert!(SCHEMA.contains(&format!("CREATE TABLE IF NOT EXISTS {table} (")), "{table}");
        }
    }
}
