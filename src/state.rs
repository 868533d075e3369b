use std::sync::Arc;

use crate::auth::{IdentityResolver, SessionKeys, SessionResolver};
use crate::config::AppConfig;
use crate::database::Store;
use crate::services::uploads::UploadStore;
use crate::services::video::VideoHost;

/// Everything a handler needs, passed explicitly through the router
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn Store>,
    pub identity: Arc<dyn IdentityResolver>,
    pub sessions: SessionKeys,
    pub video: Arc<dyn VideoHost>,
    pub uploads: UploadStore,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn Store>, video: Arc<dyn VideoHost>) -> Self {
        let sessions = SessionKeys::from_config(&config.security);
        let identity: Arc<dyn IdentityResolver> =
            Arc::new(SessionResolver::new(sessions.clone(), store.clone()));
        let uploads = UploadStore::new(
            config.server.uploads_dir.clone(),
            config.server.public_base_url.clone(),
        );

        Self {
            config: Arc::new(config),
            store,
            identity,
            sessions,
            video,
            uploads,
        }
    }
}
