pub mod config;
pub mod credentials;
pub mod paths;

pub use config::{AppwriteConfig, CompanionConfig, Config, LoggingConfig, DEFAULT_PLAYLISTS_COLLECTION, DEFAULT_VIDEOS_COLLECTION};
pub use credentials::CredentialStore;
pub use paths::{PathManager, container_base_path};
