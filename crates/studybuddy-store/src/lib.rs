pub mod appwrite;
pub mod companion;
pub mod document;
pub mod error;
pub mod memory;
pub mod query;
pub mod traits;

pub use appwrite::{AppwriteCredentials, AppwriteStore};
pub use companion::{CompanionClient, CompanionError, Feed};
pub use document::{iso_timestamp, Document, DocumentData, DocumentId, DocumentList};
pub use error::StoreError;
pub use memory::{CallCounts, MemoryStore, Operation};
pub use query::{Bounds, Query};
pub use traits::{list_all, AccountProvider, DocumentStore, StaticAccount, PAGE_SIZE};
