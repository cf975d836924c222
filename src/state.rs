use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;

use crate::{
    config::Config,
    store::{Store, StoreError},
};

/// Shared application state, handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub config: Arc<Config>,
    pub key: Key,
}

impl AppState {
    pub fn new(config: Config, key: Key) -> Result<Self, StoreError> {
        let store = Store::open(&config.data_dir)?;
        std::fs::create_dir_all(config.upload_dir()).map_err(|source| {
            StoreError::Io {
                path: config.upload_dir(),
                source,
            }
        })?;

        Ok(Self {
            store: Arc::new(store),
            config: Arc::new(config),
            key,
        })
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.key.clone()
    }
}
