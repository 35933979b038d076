use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_PLAYLISTS_COLLECTION: &str = "playlists";
pub const DEFAULT_VIDEOS_COLLECTION: &str = "videos";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub appwrite: Option<AppwriteConfig>,
    #[serde(default)]
    pub companion: CompanionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Document store connection settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppwriteConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    pub project_id: String,
    pub database_id: String,
    #[serde(default = "default_playlists_collection")]
    pub playlists_collection_id: String,
    #[serde(default = "default_videos_collection")]
    pub videos_collection_id: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// AI summarizer / distraction detector backend
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CompanionConfig {
    #[serde(default = "default_companion_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_endpoint() -> String {
    "https://cloud.appwrite.io/v1".to_string()
}

fn default_playlists_collection() -> String {
    std::env::var("STUDYBUDDY_PLAYLISTS_COLLECTION_ID")
        .unwrap_or_else(|_| DEFAULT_PLAYLISTS_COLLECTION.to_string())
}

fn default_videos_collection() -> String {
    std::env::var("STUDYBUDDY_VIDEOS_COLLECTION_ID")
        .unwrap_or_else(|_| DEFAULT_VIDEOS_COLLECTION.to_string())
}

fn default_companion_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for CompanionConfig {
    fn default() -> Self {
        Self {
            base_url: default_companion_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            appwrite: None,
            companion: CompanionConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppwriteConfig {
    pub fn new(project_id: String, database_id: String) -> Self {
        Self {
            endpoint: default_endpoint(),
            project_id,
            database_id,
            playlists_collection_id: default_playlists_collection(),
            videos_collection_id: default_videos_collection(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Config {
    pub fn load_from_file(path: &PathBuf) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load the config file, falling back to defaults when it does not exist yet
    pub fn load_or_default(path: &PathBuf) -> anyhow::Result<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to_file(&self, path: &PathBuf) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if let Some(appwrite) = &self.appwrite {
            if !appwrite.endpoint.starts_with("http://") && !appwrite.endpoint.starts_with("https://") {
                return Err(anyhow::anyhow!("appwrite.endpoint must be an http(s) URL: {}", appwrite.endpoint));
            }
            if appwrite.project_id.is_empty() || appwrite.project_id == "YOUR_PROJECT_ID" {
                return Err(anyhow::anyhow!("appwrite.project_id is not configured"));
            }
            if appwrite.database_id.is_empty() || appwrite.database_id == "YOUR_DATABASE_ID" {
                return Err(anyhow::anyhow!("appwrite.database_id is not configured"));
            }
            if appwrite.playlists_collection_id.is_empty() || appwrite.videos_collection_id.is_empty() {
                return Err(anyhow::anyhow!("collection ids cannot be empty"));
            }
            if appwrite.playlists_collection_id == appwrite.videos_collection_id {
                return Err(anyhow::anyhow!("playlists and videos must live in different collections"));
            }
        }

        if !self.companion.base_url.starts_with("http://") && !self.companion.base_url.starts_with("https://") {
            return Err(anyhow::anyhow!("companion.base_url must be an http(s) URL: {}", self.companion.base_url));
        }
        if self.companion.timeout_secs == 0 {
            return Err(anyhow::anyhow!("companion.timeout_secs must be positive"));
        }

        Ok(())
    }

    pub fn is_appwrite_configured(&self) -> bool {
        self.appwrite
            .as_ref()
            .map(|a| {
                !a.project_id.is_empty()
                    && a.project_id != "YOUR_PROJECT_ID"
                    && !a.database_id.is_empty()
                    && a.database_id != "YOUR_DATABASE_ID"
            })
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn appwrite(project: &str, database: &str) -> AppwriteConfig {
        AppwriteConfig {
            endpoint: "https://cloud.appwrite.io/v1".to_string(),
            project_id: project.to_string(),
            database_id: database.to_string(),
            playlists_collection_id: "playlists".to_string(),
            videos_collection_id: "videos".to_string(),
            timeout_secs: 30,
        }
    }

    #[test]
    fn test_config_load_and_save() {
        let file = NamedTempFile::new().unwrap();
        let config = Config {
            appwrite: Some(appwrite("proj", "db")),
            companion: CompanionConfig {
                base_url: "http://localhost:5001".to_string(),
                timeout_secs: 10,
            },
            logging: LoggingConfig::default(),
        };

        let path = file.path().to_path_buf();
        config.save_to_file(&path).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded.appwrite.as_ref().unwrap().project_id, "proj");
        assert_eq!(loaded.appwrite.as_ref().unwrap().database_id, "db");
        assert_eq!(loaded.companion.base_url, "http://localhost:5001");
        assert_eq!(loaded.companion.timeout_secs, 10);
    }

    #[test]
    fn test_config_defaults_from_minimal_toml() {
        let config: Config = toml::from_str(
            r#"
            [appwrite]
            project_id = "proj"
            database_id = "db"
            "#,
        )
        .unwrap();
        let appwrite = config.appwrite.as_ref().unwrap();
        assert_eq!(appwrite.endpoint, "https://cloud.appwrite.io/v1");
        assert_eq!(appwrite.timeout_secs, 30);
        assert_eq!(config.companion.base_url, "http://localhost:5000");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_config_validate() {
        let mut config = Config {
            appwrite: Some(appwrite("YOUR_PROJECT_ID", "db")),
            ..Config::default()
        };
        assert!(config.validate().is_err());
        assert!(!config.is_appwrite_configured());

        config.appwrite = Some(appwrite("proj", "db"));
        assert!(config.validate().is_ok());
        assert!(config.is_appwrite_configured());

        let mut same_collection = appwrite("proj", "db");
        same_collection.videos_collection_id = "playlists".to_string();
        config.appwrite = Some(same_collection);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_companion_url() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());
        config.companion.base_url = "localhost:5000".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(&dir.path().join("missing.toml")).unwrap();
        assert!(config.appwrite.is_none());
    }
}
