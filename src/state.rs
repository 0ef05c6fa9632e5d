//! Shared application state for all routes.

use crate::config::AppConfig;
use crate::store::{CarStore, IdentityProvider};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CarStore>,
    pub identity: Arc<dyn IdentityProvider>,
    pub config: Arc<AppConfig>,
}
