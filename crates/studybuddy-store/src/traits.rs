use async_trait::async_trait;
use tracing::debug;
use crate::document::{Document, DocumentData, DocumentId, DocumentList};
use crate::error::StoreError;
use crate::query::{Bounds, Query};

/// Page size used by [`list_all`]
pub const PAGE_SIZE: u32 = 100;

/// Remote collection-oriented database. The database is fixed per instance,
/// collections are named per call.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    // Store metadata
    fn store_name(&self) -> &str;

    // Data retrieval
    async fn list_documents(&self, collection: &str, queries: &[Query]) -> Result<DocumentList, StoreError>;
    async fn get_document(&self, collection: &str, document_id: &str) -> Result<Document, StoreError>;

    // Data modification
    async fn create_document(
        &self,
        collection: &str,
        document_id: DocumentId,
        data: DocumentData,
    ) -> Result<Document, StoreError>;

    /// Overwrites the given fields, leaving the others untouched
    async fn update_document(
        &self,
        collection: &str,
        document_id: &str,
        data: DocumentData,
    ) -> Result<Document, StoreError>;

    async fn delete_document(&self, collection: &str, document_id: &str) -> Result<(), StoreError>;

    /// Atomically add `delta` to a numeric field.
    ///
    /// Fails with [`StoreError::BoundExceeded`] and leaves the document
    /// unchanged if the result would fall outside `bounds`.
    async fn increment_field(
        &self,
        collection: &str,
        document_id: &str,
        field: &str,
        delta: i64,
        bounds: Bounds,
    ) -> Result<Document, StoreError>;
}

/// Resolves the user the current session belongs to
#[async_trait]
pub trait AccountProvider: Send + Sync {
    /// `None` when there is no authenticated user
    async fn current_user_id(&self) -> Result<Option<String>, StoreError>;
}

/// Fixed identity, used offline and in tests
#[derive(Debug, Clone, Default)]
pub struct StaticAccount {
    user_id: Option<String>,
}

impl StaticAccount {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self { user_id: Some(user_id.into()) }
    }

    pub fn anonymous() -> Self {
        Self { user_id: None }
    }
}

#[async_trait]
impl AccountProvider for StaticAccount {
    async fn current_user_id(&self) -> Result<Option<String>, StoreError> {
        Ok(self.user_id.clone())
    }
}

/// List every matching document, paging past the store's default page size.
///
/// Any limit/offset in `queries` is replaced by the paging predicates.
pub async fn list_all(
    store: &dyn DocumentStore,
    collection: &str,
    queries: &[Query],
) -> Result<DocumentList, StoreError> {
    let mut base: Vec<Query> = queries.iter().filter(|q| !q.is_paging()).cloned().collect();
    base.push(Query::Limit(PAGE_SIZE));

    let mut documents = Vec::new();
    let mut total;
    let mut offset = 0u32;

    loop {
        let mut page_queries = base.clone();
        page_queries.push(Query::Offset(offset));
        let page = store.list_documents(collection, &page_queries).await?;
        total = page.total;
        let fetched = page.documents.len();
        documents.extend(page.documents);

        debug!("Fetched page of {} documents from {} (offset {}, total {})", fetched, collection, offset, total);

        if fetched == 0 || documents.len() as u64 >= total {
            break;
        }
        offset += fetched as u32;
    }

    Ok(DocumentList { total, documents })
}
