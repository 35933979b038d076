use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use std::time::Duration;
use studybuddy_config::CredentialStore;
use crate::error::StoreError;

/// How requests to the document store are authorized
#[derive(Debug, Clone)]
pub enum AppwriteCredentials {
    /// Server key acting on behalf of a configured user
    ApiKey { key: String, user_id: Option<String> },
    /// Session JWT of a signed-in user
    Jwt(String),
}

impl AppwriteCredentials {
    /// Prefer a live user session, fall back to the server key
    pub fn from_store(credentials: &CredentialStore) -> Result<Self, StoreError> {
        if let Some(jwt) = credentials.get_appwrite_jwt().filter(|j| !j.is_empty()) {
            if !credentials.is_jwt_expired() {
                return Ok(AppwriteCredentials::Jwt(jwt.clone()));
            }
        }

        if let Some(key) = credentials.get_appwrite_api_key().filter(|k| !k.is_empty()) {
            return Ok(AppwriteCredentials::ApiKey {
                key: key.clone(),
                user_id: credentials.get_user_id().cloned(),
            });
        }

        Err(StoreError::Unauthorized(
            "no Appwrite API key or unexpired JWT configured; run `studybuddy config appwrite`".to_string(),
        ))
    }
}

fn header_value(value: &str) -> Result<HeaderValue, StoreError> {
    HeaderValue::from_str(value)
        .map_err(|_| StoreError::InvalidConfig(format!("value is not a valid header: {:?}", value)))
}

/// HTTP client with project and authorization headers preset
pub fn create_appwrite_client(
    project_id: &str,
    credentials: &AppwriteCredentials,
    timeout: Duration,
) -> Result<Client, StoreError> {
    let mut headers = HeaderMap::new();
    headers.insert("X-Appwrite-Project", header_value(project_id)?);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    match credentials {
        AppwriteCredentials::ApiKey { key, .. } => {
            headers.insert("X-Appwrite-Key", header_value(key)?);
        }
        AppwriteCredentials::Jwt(jwt) => {
            headers.insert("X-Appwrite-JWT", header_value(jwt)?);
        }
    }

    Ok(Client::builder()
        .user_agent(concat!("studybuddy/", env!("CARGO_PKG_VERSION")))
        .default_headers(headers)
        .timeout(timeout)
        .build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_prefers_unexpired_jwt() {
        let mut store = CredentialStore::new(PathBuf::from("/tmp/unused"));
        store.set_appwrite_api_key("key".to_string());
        store.set_appwrite_jwt("jwt".to_string());
        assert!(matches!(AppwriteCredentials::from_store(&store), Ok(AppwriteCredentials::Jwt(_))));

        store.set_appwrite_jwt_expires(chrono::Utc::now() - chrono::Duration::minutes(5));
        match AppwriteCredentials::from_store(&store) {
            Ok(AppwriteCredentials::ApiKey { key, user_id }) => {
                assert_eq!(key, "key");
                assert_eq!(user_id, None);
            }
            other => panic!("expected api key credentials, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_credentials() {
        let store = CredentialStore::new(PathBuf::from("/tmp/unused"));
        assert!(matches!(AppwriteCredentials::from_store(&store), Err(StoreError::Unauthorized(_))));
    }
}
