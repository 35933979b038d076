use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Debug, Serialize, Deserialize, Default)]
struct CredentialsData {
    #[serde(flatten)]
    data: HashMap<String, String>,
}

pub struct CredentialStore {
    path: PathBuf,
    credentials: HashMap<String, String>,
}

impl CredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            credentials: HashMap::new(),
        }
    }

    pub fn load(&mut self) -> Result<()> {
        if self.path.exists() {
            let content = std::fs::read_to_string(&self.path)?;
            let creds_data: CredentialsData = toml::from_str(&content)?;
            self.credentials = creds_data.data;
        }
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let creds_data = CredentialsData {
            data: self.credentials.clone(),
        };
        let content = toml::to_string_pretty(&creds_data)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&String> {
        self.credentials.get(key)
    }

    pub fn set(&mut self, key: String, value: String) {
        self.credentials.insert(key, value);
    }

    pub fn remove(&mut self, key: &str) {
        self.credentials.remove(key);
    }

    /// Server API key; grants access to every document in the project
    pub fn get_appwrite_api_key(&self) -> Option<&String> {
        self.get("appwrite_api_key")
    }

    pub fn set_appwrite_api_key(&mut self, key: String) {
        self.set("appwrite_api_key".to_string(), key);
    }

    /// Short-lived user session token
    pub fn get_appwrite_jwt(&self) -> Option<&String> {
        self.get("appwrite_jwt")
    }

    pub fn set_appwrite_jwt(&mut self, jwt: String) {
        self.set("appwrite_jwt".to_string(), jwt);
    }

    pub fn get_appwrite_jwt_expires(&self) -> Option<DateTime<Utc>> {
        self.get("appwrite_jwt_expires")
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }

    pub fn set_appwrite_jwt_expires(&mut self, expires: DateTime<Utc>) {
        self.set("appwrite_jwt_expires".to_string(), expires.to_rfc3339());
    }

    pub fn clear_appwrite_jwt(&mut self) {
        self.remove("appwrite_jwt");
        self.remove("appwrite_jwt_expires");
    }

    /// A JWT without a recorded expiry is treated as valid
    pub fn is_jwt_expired(&self) -> bool {
        self.get_appwrite_jwt_expires()
            .map(|expires| expires <= Utc::now())
            .unwrap_or(false)
    }

    /// User the CLI acts on behalf of when authenticating with a server key
    pub fn get_user_id(&self) -> Option<&String> {
        self.get("user_id")
    }

    pub fn set_user_id(&mut self, user_id: String) {
        self.set("user_id".to_string(), user_id);
    }

    pub fn get_all_keys(&self) -> Vec<String> {
        self.credentials.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_credential_store_load_and_save() {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_path_buf();

        let mut store = CredentialStore::new(path.clone());
        store.set_appwrite_api_key("secret".to_string());
        store.set_user_id("user-1".to_string());
        store.save().unwrap();

        let mut loaded_store = CredentialStore::new(path);
        loaded_store.load().unwrap();
        assert_eq!(loaded_store.get_appwrite_api_key(), Some(&"secret".to_string()));
        assert_eq!(loaded_store.get_user_id(), Some(&"user-1".to_string()));
    }

    #[test]
    fn test_jwt_expiry() {
        let mut store = CredentialStore::new(PathBuf::from("/tmp/test"));
        store.set_appwrite_jwt("jwt".to_string());
        assert!(!store.is_jwt_expired());

        store.set_appwrite_jwt_expires(Utc::now() - chrono::Duration::minutes(1));
        assert!(store.is_jwt_expired());

        store.set_appwrite_jwt_expires(Utc::now() + chrono::Duration::hours(1));
        assert!(!store.is_jwt_expired());

        store.clear_appwrite_jwt();
        assert_eq!(store.get_appwrite_jwt(), None);
        assert_eq!(store.get_appwrite_jwt_expires(), None);
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = CredentialStore::new(dir.path().join("credentials.toml"));
        store.load().unwrap();
        assert!(store.get_all_keys().is_empty());
        assert_eq!(store.get_appwrite_api_key(), None);
    }

    #[test]
    fn test_switching_to_api_key_drops_session() {
        let mut store = CredentialStore::new(PathBuf::from("/tmp/test"));
        store.set_appwrite_jwt("jwt".to_string());
        store.set_appwrite_jwt_expires(Utc::now());
        store.set_appwrite_api_key("key".to_string());
        store.clear_appwrite_jwt();

        let mut keys = store.get_all_keys();
        keys.sort();
        assert_eq!(keys, vec!["appwrite_api_key".to_string()]);
    }
}
