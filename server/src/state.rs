use std::sync::Arc;

use crate::config::Config;
use crate::store::EventStore;

/// Shared application state available to all handlers via `State<AppState>`.
///
/// Cheap to clone: both fields are behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EventStore>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<dyn EventStore>, config: Config) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }
}
