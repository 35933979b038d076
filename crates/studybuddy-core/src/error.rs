use studybuddy_models::InvalidVideoId;
use studybuddy_store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("No authenticated user; sign in or configure a user id")]
    NotAuthenticated,

    #[error(transparent)]
    InvalidVideoId(#[from] InvalidVideoId),

    #[error("Store operation failed: {0}")]
    Store(#[from] StoreError),

    /// A multi-step delete failed part way. `restored` of the `deleted`
    /// child documents were re-created before returning.
    #[error("Delete of playlist {playlist_id} failed after removing {deleted} videos ({restored} restored): {source}")]
    PartialDelete {
        playlist_id: String,
        deleted: usize,
        restored: usize,
        #[source]
        source: StoreError,
    },
}

impl RepositoryError {
    /// True when some child documents are gone for good
    pub fn is_unrecovered(&self) -> bool {
        matches!(self, RepositoryError::PartialDelete { deleted, restored, .. } if restored < deleted)
    }
}

pub type Result<T> = std::result::Result<T, RepositoryError>;
