use std::sync::Arc;

use crate::api::auth::SessionConfig;
use crate::services::{AccountService, CatalogAdmin, CatalogQuery, EventSink, LogoLibrary};
use crate::store::CatalogStore;

/// Shared application state; cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub query: CatalogQuery,
    pub admin: CatalogAdmin,
    pub accounts: AccountService,
    pub logos: LogoLibrary,
    pub session: Arc<SessionConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn CatalogStore>, events: EventSink, logos: LogoLibrary, session: SessionConfig) -> Self {
        Self {
            query: CatalogQuery::new(store.clone()),
            admin: CatalogAdmin::new(store.clone(), events),
            accounts: AccountService::new(store),
            logos,
            session: Arc::new(session),
        }
    }
}
