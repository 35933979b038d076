//! Wiring from config files to the library and companion client.

use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::path::PathBuf;
use std::sync::Arc;
use studybuddy_config::{Config, CredentialStore, PathManager};
use studybuddy_core::{Collections, Library, StoreContext};
use studybuddy_store::{AppwriteStore, CompanionClient, MemoryStore, StaticAccount};
use tracing::{debug, info};

/// User id owning everything in the offline store
pub const OFFLINE_USER: &str = "offline-user";

/// Config file contents, or defaults when none was written yet
pub fn load_config(path_manager: &PathManager) -> Result<Config> {
    let config_file = path_manager.config_file();
    Config::load_or_default(&config_file)
        .map_err(|e| eyre!("Failed to load config from {}: {}", config_file.display(), e))
}

pub fn companion_client() -> Result<CompanionClient> {
    let config = load_config(&PathManager::default())?;
    Ok(CompanionClient::from_config(&config.companion)?)
}

/// A library plus, in offline mode, the snapshot it has to be written back to
pub struct Session {
    pub library: Library,
    offline: Option<(Arc<MemoryStore>, PathBuf)>,
}

impl Session {
    pub fn open(offline: bool) -> Result<Self> {
        let path_manager = PathManager::default();
        let config = load_config(&path_manager)?;

        if offline {
            let snapshot = path_manager.offline_store_file();
            let store = Arc::new(MemoryStore::load_snapshot("offline", &snapshot)?);
            let collections = config
                .appwrite
                .as_ref()
                .map(Collections::from_config)
                .unwrap_or_default();
            let ctx = StoreContext::new(store.clone(), Arc::new(StaticAccount::new(OFFLINE_USER)), collections);
            info!(operation = "session_open", mode = "offline", snapshot = %snapshot.display(), "Using offline store");
            return Ok(Self {
                library: Library::new(ctx),
                offline: Some((store, snapshot)),
            });
        }

        let appwrite = config
            .appwrite
            .as_ref()
            .filter(|_| config.is_appwrite_configured())
            .ok_or_else(|| eyre!("Appwrite is not configured. Run 'studybuddy config appwrite' or pass --offline"))?;
        config
            .validate()
            .map_err(|e| eyre!("Invalid configuration: {}", e))?;

        let credentials_file = path_manager.credentials_file();
        let mut credentials = CredentialStore::new(credentials_file.clone());
        credentials
            .load()
            .map_err(|e| eyre!("Failed to load credentials from {}: {}", credentials_file.display(), e))?;

        let store = Arc::new(AppwriteStore::from_config(appwrite, &credentials)?);
        let ctx = StoreContext::new(store.clone(), store, Collections::from_config(appwrite));
        info!(operation = "session_open", mode = "appwrite", endpoint = %appwrite.endpoint, "Connected to document store");
        Ok(Self {
            library: Library::new(ctx),
            offline: None,
        })
    }

    pub fn is_offline(&self) -> bool {
        self.offline.is_some()
    }

    /// Write the offline store back to disk; a no-op against Appwrite
    pub fn persist(&self) -> Result<()> {
        if let Some((store, path)) = &self.offline {
            store.save_snapshot(path)?;
            debug!("Offline store saved to {}", path.display());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The only test in this crate that touches STUDYBUDDY_BASE_PATH
    #[tokio::test]
    async fn test_offline_session_persists_between_runs() {
        let dir = tempfile::tempdir().unwrap();
        std::env::set_var("STUDYBUDDY_BASE_PATH", dir.path());

        let mut session = Session::open(true).unwrap();
        assert!(session.is_offline());
        let playlist = session.library.create_playlist("Algebra", None).await.unwrap();
        session.persist().unwrap();

        let mut reopened = Session::open(true).unwrap();
        let playlists = reopened.library.playlists().await.unwrap();
        assert_eq!(playlists.len(), 1);
        assert_eq!(playlists[0].id, playlist.id);
        assert_eq!(playlists[0].user_id, OFFLINE_USER);

        std::env::remove_var("STUDYBUDDY_BASE_PATH");
    }
}
