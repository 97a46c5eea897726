use std::sync::Arc;

use crate::{config::AppConfig, notify::Notifier, store::JsonStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<JsonStore>,
    pub config: Arc<AppConfig>,
    pub notifier: Arc<dyn Notifier>,
}

impl AppState {
    pub fn new(store: JsonStore, config: AppConfig, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            store: Arc::new(store),
            config: Arc::new(config),
            notifier,
        }
    }
}
