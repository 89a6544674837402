use std::sync::Arc;

use crate::auth::TokenAuthority;
use crate::config::AppConfig;
use crate::database::Store;
use crate::ownership::OwnershipResolver;

/// Per-process state cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub tokens: Arc<TokenAuthority>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: AppConfig) -> Self {
        let tokens = TokenAuthority::new(&config.security.jwt_secret, config.security.jwt_expiry_hours);
        Self {
            store,
            tokens: Arc::new(tokens),
            config: Arc::new(config),
        }
    }

    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    pub fn resolver(&self) -> OwnershipResolver<'_> {
        OwnershipResolver::new(self.store.as_ref())
    }
}
