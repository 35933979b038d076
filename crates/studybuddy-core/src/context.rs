use std::sync::Arc;
use studybuddy_config::{AppwriteConfig, DEFAULT_PLAYLISTS_COLLECTION, DEFAULT_VIDEOS_COLLECTION};
use studybuddy_store::{AccountProvider, DocumentStore};
use tracing::error;
use crate::error::{RepositoryError, Result};

/// Collection ids the repositories read and write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collections {
    pub playlists: String,
    pub videos: String,
}

impl Default for Collections {
    fn default() -> Self {
        Self {
            playlists: DEFAULT_PLAYLISTS_COLLECTION.to_string(),
            videos: DEFAULT_VIDEOS_COLLECTION.to_string(),
        }
    }
}

impl Collections {
    pub fn from_config(config: &AppwriteConfig) -> Self {
        Self {
            playlists: config.playlists_collection_id.clone(),
            videos: config.videos_collection_id.clone(),
        }
    }
}

/// Log a repository failure at the point it is surfaced
pub(crate) fn failed(operation: &str, err: impl Into<RepositoryError>) -> RepositoryError {
    let err = err.into();
    error!(operation, error = %err, "Repository operation failed");
    err
}

/// Store handle, identity source and collection names shared by the repositories
#[derive(Clone)]
pub struct StoreContext {
    pub store: Arc<dyn DocumentStore>,
    pub account: Arc<dyn AccountProvider>,
    pub collections: Collections,
}

impl StoreContext {
    pub fn new(store: Arc<dyn DocumentStore>, account: Arc<dyn AccountProvider>, collections: Collections) -> Self {
        Self {
            store,
            account,
            collections,
        }
    }

    /// Current user id, or `NotAuthenticated`
    pub(crate) async fn require_user(&self, operation: &str) -> Result<String> {
        match self.account.current_user_id().await {
            Ok(Some(user_id)) => Ok(user_id),
            Ok(None) => {
                error!(operation, "No authenticated user");
                Err(RepositoryError::NotAuthenticated)
            }
            Err(e) => {
                error!(operation, error = %e, "Failed to resolve current user");
                Err(e.into())
            }
        }
    }
}
