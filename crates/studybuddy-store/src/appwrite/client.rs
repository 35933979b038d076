use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use studybuddy_config::{AppwriteConfig, CredentialStore};
use tracing::{debug, info};
use crate::appwrite::api;
use crate::appwrite::auth::{create_appwrite_client, AppwriteCredentials};
use crate::document::{Document, DocumentData, DocumentId, DocumentList};
use crate::error::StoreError;
use crate::query::{Bounds, Query};
use crate::traits::{AccountProvider, DocumentStore};

/// Document store backed by the Appwrite REST API
#[derive(Clone)]
pub struct AppwriteStore {
    client: Arc<Client>,
    endpoint: String,
    database_id: String,
    credentials: AppwriteCredentials,
}

impl AppwriteStore {
    pub fn new(
        endpoint: impl Into<String>,
        project_id: &str,
        database_id: impl Into<String>,
        credentials: AppwriteCredentials,
        timeout: Duration,
    ) -> Result<Self, StoreError> {
        let endpoint = endpoint.into();
        if endpoint.is_empty() {
            return Err(StoreError::InvalidConfig("endpoint cannot be empty".to_string()));
        }
        if project_id.is_empty() {
            return Err(StoreError::InvalidConfig("project id cannot be empty".to_string()));
        }

        let client = create_appwrite_client(project_id, &credentials, timeout)?;
        Ok(Self {
            client: Arc::new(client),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            database_id: database_id.into(),
            credentials,
        })
    }

    pub fn from_config(config: &AppwriteConfig, credentials: &CredentialStore) -> Result<Self, StoreError> {
        let creds = AppwriteCredentials::from_store(credentials)?;
        let mode = match &creds {
            AppwriteCredentials::ApiKey { .. } => "api_key",
            AppwriteCredentials::Jwt(_) => "jwt",
        };
        info!(
            operation = "store_connect",
            endpoint = %config.endpoint,
            database = %config.database_id,
            auth = mode,
            "Using Appwrite document store"
        );
        Self::new(
            config.endpoint.clone(),
            &config.project_id,
            config.database_id.clone(),
            creds,
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn database_id(&self) -> &str {
        &self.database_id
    }
}

#[async_trait]
impl DocumentStore for AppwriteStore {
    fn store_name(&self) -> &str {
        "appwrite"
    }

    async fn list_documents(&self, collection: &str, queries: &[Query]) -> Result<DocumentList, StoreError> {
        debug!("list {} ({} queries)", collection, queries.len());
        api::list_documents(&self.client, &self.endpoint, &self.database_id, collection, queries).await
    }

    async fn get_document(&self, collection: &str, document_id: &str) -> Result<Document, StoreError> {
        debug!("get {}/{}", collection, document_id);
        api::get_document(&self.client, &self.endpoint, &self.database_id, collection, document_id).await
    }

    async fn create_document(
        &self,
        collection: &str,
        document_id: DocumentId,
        data: DocumentData,
    ) -> Result<Document, StoreError> {
        debug!("create {}/{}", collection, document_id.as_str());
        api::create_document(&self.client, &self.endpoint, &self.database_id, collection, &document_id, &data).await
    }

    async fn update_document(
        &self,
        collection: &str,
        document_id: &str,
        data: DocumentData,
    ) -> Result<Document, StoreError> {
        debug!("update {}/{}", collection, document_id);
        api::update_document(&self.client, &self.endpoint, &self.database_id, collection, document_id, &data).await
    }

    async fn delete_document(&self, collection: &str, document_id: &str) -> Result<(), StoreError> {
        debug!("delete {}/{}", collection, document_id);
        api::delete_document(&self.client, &self.endpoint, &self.database_id, collection, document_id).await
    }

    async fn increment_field(
        &self,
        collection: &str,
        document_id: &str,
        field: &str,
        delta: i64,
        bounds: Bounds,
    ) -> Result<Document, StoreError> {
        debug!("increment {}/{}.{} by {}", collection, document_id, field, delta);
        api::increment_field(
            &self.client,
            &self.endpoint,
            &self.database_id,
            collection,
            document_id,
            field,
            delta,
            bounds,
        )
        .await
    }
}

#[async_trait]
impl AccountProvider for AppwriteStore {
    async fn current_user_id(&self) -> Result<Option<String>, StoreError> {
        match &self.credentials {
            // A server key has no session; it acts for the configured user
            AppwriteCredentials::ApiKey { user_id, .. } => Ok(user_id.clone()),
            AppwriteCredentials::Jwt(_) => api::get_account_id(&self.client, &self.endpoint).await,
        }
    }
}
