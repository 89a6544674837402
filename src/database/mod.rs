pub mod memory;
pub mod models;
pub mod postgres;
pub mod seed;
pub mod store;

use std::sync::Arc;

use tracing::warn;

use crate::config::AppConfig;

pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use store::{OwnerGuard, Store, StoreError, StoreResult};

/// Postgres when `DATABASE_URL` is configured, otherwise the in-memory store.
pub async fn connect(config: &AppConfig) -> Result<Arc<dyn Store>, StoreError> {
    match &config.database.url {
        Some(url) => {
            let store = PgStore::connect(url, &config.database).await?;
            store.migrate().await?;
            Ok(Arc::new(store))
        }
        None => {
            warn!("DATABASE_URL not set; using the in-memory store (data is lost on exit)");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
