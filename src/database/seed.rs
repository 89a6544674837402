//! Demo data for a fresh store: one account per role, an agency, the
//! property-type catalogue and a handful of Nairobi listings.

use chrono::{Duration, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::auth::password::{hash_password, PasswordError};
use crate::auth::Role;
use crate::database::models::{
    ListingStatus, NewAgency, NewAgentProfile, NewIdentity, NewImage, NewLocation, NewPayment, NewProperty,
    NewSubscription, PaymentStatus,
};
use crate::database::{Store, StoreError};

pub const PROPERTY_TYPES: [&str; 7] = ["Apartment", "Villa", "Bungalow", "Mansion", "House", "Maisonette", "Commercial"];

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("store already contains identities; refusing to seed")]
    NotEmpty,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Password(#[from] PasswordError),
}

#[derive(Debug, Clone, Serialize)]
pub struct SeedSummary {
    pub identities: usize,
    pub property_types: usize,
    pub properties: usize,
    pub admin_email: String,
    pub agent_email: String,
    pub user_email: String,
}

struct Account {
    first_name: &'static str,
    last_name: &'static str,
    email: &'static str,
    phone: &'static str,
    password: &'static str,
    role: Role,
}

const ACCOUNTS: [Account; 3] = [
    Account {
        first_name: "System",
        last_name: "Admin",
        email: "admin@example.com",
        phone: "0700000000",
        password: "admin123",
        role: Role::Admin,
    },
    Account {
        first_name: "John",
        last_name: "Agent",
        email: "agent@example.com",
        phone: "0711111111",
        password: "agent123",
        role: Role::Agent,
    },
    Account {
        first_name: "Jane",
        last_name: "Buyer",
        email: "user@example.com",
        phone: "0722222222",
        password: "user123",
        role: Role::User,
    },
];

struct Listing {
    title: &'static str,
    description: &'static str,
    property_type: &'static str,
    price: i64,
    bedrooms: i32,
    bathrooms: i32,
    area_size: i32,
    status: ListingStatus,
    neighborhood: &'static str,
    latitude: &'static str,
    longitude: &'static str,
}

impl Listing {
    fn listing_type(&self) -> &'static str {
        match self.status {
            ListingStatus::OnSale => "sale",
            ListingStatus::OnRent => "rent",
            ListingStatus::Lease => "lease",
        }
    }
}

const LISTINGS: [Listing; 8] = [
    Listing {
        title: "Modern 2 Bedroom Apartment",
        description: "Spacious apartment with parking",
        property_type: "Apartment",
        price: 8_500_000,
        bedrooms: 2,
        bathrooms: 2,
        area_size: 120,
        status: ListingStatus::OnSale,
        neighborhood: "Westlands",
        latitude: "-1.268",
        longitude: "36.811",
    },
    Listing {
        title: "4 Bedroom Bungalow for Sale",
        description: "Spacious home with garden",
        property_type: "Bungalow",
        price: 25_000_000,
        bedrooms: 4,
        bathrooms: 3,
        area_size: 200,
        status: ListingStatus::OnSale,
        neighborhood: "Karen",
        latitude: "-1.318",
        longitude: "36.751",
    },
    Listing {
        title: "Studio Apartment for Rent",
        description: "Ideal for singles, secure estate",
        property_type: "Apartment",
        price: 25_000,
        bedrooms: 1,
        bathrooms: 1,
        area_size: 45,
        status: ListingStatus::OnRent,
        neighborhood: "Upper Hill",
        latitude: "-1.300",
        longitude: "36.820",
    },
    Listing {
        title: "5 Bedroom Mansion for Sale",
        description: "Luxury living with compound",
        property_type: "Mansion",
        price: 45_000_000,
        bedrooms: 5,
        bathrooms: 4,
        area_size: 400,
        status: ListingStatus::OnSale,
        neighborhood: "Runda",
        latitude: "-1.230",
        longitude: "36.830",
    },
    Listing {
        title: "3 Bedroom House for Rent",
        description: "Family home, pet-friendly",
        property_type: "House",
        price: 60_000,
        bedrooms: 3,
        bathrooms: 2,
        area_size: 150,
        status: ListingStatus::OnRent,
        neighborhood: "Langata",
        latitude: "-1.360",
        longitude: "36.740",
    },
    Listing {
        title: "1 Bedroom Apartment for Sale",
        description: "Affordable entry-level investment",
        property_type: "Apartment",
        price: 4_800_000,
        bedrooms: 1,
        bathrooms: 1,
        area_size: 50,
        status: ListingStatus::OnSale,
        neighborhood: "Ngong Road",
        latitude: "-1.320",
        longitude: "36.780",
    },
    Listing {
        title: "Office Space for Rent",
        description: "Prime business location",
        property_type: "Commercial",
        price: 80_000,
        bedrooms: 0,
        bathrooms: 2,
        area_size: 100,
        status: ListingStatus::OnRent,
        neighborhood: "CBD",
        latitude: "-1.283",
        longitude: "36.820",
    },
    Listing {
        title: "2 Bedroom Maisonette for Sale",
        description: "Dual-key property, ideal for rental",
        property_type: "Maisonette",
        price: 8_500_000,
        bedrooms: 2,
        bathrooms: 2,
        area_size: 90,
        status: ListingStatus::OnSale,
        neighborhood: "South C",
        latitude: "-1.320",
        longitude: "36.850",
    },
];

/// Populate an empty store. Refuses to run when any identity exists so a
/// second invocation cannot trip uniqueness constraints half way through.
pub async fn seed(store: &dyn Store) -> Result<SeedSummary, SeedError> {
    if store.count_identities(None).await? > 0 {
        return Err(SeedError::NotEmpty);
    }

    let mut ids = Vec::with_capacity(ACCOUNTS.len());
    for account in &ACCOUNTS {
        let identity = store
            .insert_identity(NewIdentity {
                first_name: account.first_name.to_string(),
                last_name: account.last_name.to_string(),
                email: account.email.to_string(),
                phone: account.phone.to_string(),
                password_hash: hash_password(account.password)?,
                role: account.role,
                is_verified: true,
            })
            .await?;
        ids.push(identity.id);
    }
    let (agent_identity, user_identity) = (ids[1], ids[2]);

    let agency = store
        .insert_agency(NewAgency {
            name: "Prime Realtors".to_string(),
            address: Some("Nairobi CBD".to_string()),
            phone: Some("0733333333".to_string()),
            founded_year: Some("2015".to_string()),
        })
        .await?;

    let agent = store
        .insert_agent_profile(NewAgentProfile {
            identity_id: agent_identity,
            license_number: "LIC-001".to_string(),
            agency_id: Some(agency.id),
            bio: Some("Experienced real estate agent".to_string()),
            rating: Some(5),
        })
        .await?;
    store.insert_user_profile(user_identity).await?;

    let mut types = Vec::with_capacity(PROPERTY_TYPES.len());
    for name in PROPERTY_TYPES {
        types.push(store.insert_property_type(name).await?);
    }

    let mut first_property = None;
    for (index, listing) in LISTINGS.iter().enumerate() {
        let property_type_id = types
            .iter()
            .find(|t| t.name == listing.property_type)
            .map(|t| t.id)
            .ok_or(StoreError::MissingReference("property type"))?;

        let property = store
            .insert_property(NewProperty {
                agent_profile_id: agent.id,
                title: listing.title.to_string(),
                description: Some(listing.description.to_string()),
                property_type_id,
                price: listing.price,
                currency: "KES".to_string(),
                bedrooms: Some(listing.bedrooms),
                bathrooms: Some(listing.bathrooms),
                area_size: Some(listing.area_size),
                area_unit: Some("sqm".to_string()),
                listing_type: listing.listing_type().to_string(),
                status: listing.status,
                listing_date: Utc::now(),
                images: vec![NewImage {
                    url: format!("https://example.com/property{}.jpg", index + 1),
                    caption: None,
                    is_primary: true,
                }],
                videos: Vec::new(),
                location: Some(NewLocation {
                    country: Some("Kenya".to_string()),
                    state: Some("Nairobi".to_string()),
                    city: Some("Nairobi".to_string()),
                    neighborhood: Some(listing.neighborhood.to_string()),
                    latitude: Some(listing.latitude.to_string()),
                    longitude: Some(listing.longitude.to_string()),
                }),
            })
            .await?;
        first_property.get_or_insert(property.id);
    }

    store
        .insert_subscription(NewSubscription {
            user_id: user_identity,
            plan: "Premium".to_string(),
            expires_at: Some(Utc::now() + Duration::days(30)),
        })
        .await?;
    store
        .insert_payment(NewPayment {
            user_id: user_identity,
            agent_profile_id: Some(agent.id),
            amount: 5000,
            payment_method: "M-Pesa".to_string(),
            status: PaymentStatus::Complete,
        })
        .await?;
    if let Some(property_id) = first_property {
        store.insert_favorite(user_identity, property_id).await?;
    }

    info!(properties = LISTINGS.len(), "seeded demo data");

    Ok(SeedSummary {
        identities: ACCOUNTS.len(),
        property_types: PROPERTY_TYPES.len(),
        properties: LISTINGS.len(),
        admin_email: ACCOUNTS[0].email.to_string(),
        agent_email: ACCOUNTS[1].email.to_string(),
        user_email: ACCOUNTS[2].email.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::verify_password;
    use crate::database::models::{PaymentFilter, PropertyFilter};
    use crate::database::MemoryStore;

    #[tokio::test]
    async fn seeds_every_role_and_listing() {
        let store = MemoryStore::new();
        let summary = seed(&store).await.unwrap();
        assert_eq!(summary.properties, 8);

        assert_eq!(store.count_identities(None).await.unwrap(), 3);
        assert_eq!(store.count_identities(Some(Role::Agent)).await.unwrap(), 1);

        let agent = store.find_identity_by_email("agent@example.com").await.unwrap().unwrap();
        assert!(verify_password("agent123", &agent.password_hash).unwrap());
        let profile = store.find_agent_profile_by_identity(agent.id).await.unwrap().unwrap();
        assert_eq!(profile.license_number, "LIC-001");

        let listings = store
            .list_properties(PropertyFilter { agent_profile_id: Some(profile.id), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(listings.len(), 8);

        let media = store.property_media(listings[0].id).await.unwrap();
        assert!(media.primary_image().is_some());
        assert_eq!(media.location.and_then(|l| l.country).as_deref(), Some("Kenya"));

        let user = store.find_identity_by_email("user@example.com").await.unwrap().unwrap();
        assert_eq!(store.list_favorites(user.id).await.unwrap().len(), 1);
        assert_eq!(store.sum_payments(PaymentFilter::default()).await.unwrap(), 5000);
    }

    #[tokio::test]
    async fn refuses_a_populated_store() {
        let store = MemoryStore::new();
        seed(&store).await.unwrap();
        assert!(matches!(seed(&store).await, Err(SeedError::NotEmpty)));
    }
}
