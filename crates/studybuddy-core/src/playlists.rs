use chrono::Utc;
use serde_json::Value;
use std::collections::HashMap;
use studybuddy_models::{Playlist, PlaylistUpdate, PlaylistWithVideos, Video};
use studybuddy_store::{list_all, Document, DocumentData, DocumentId, Query, StoreError};
use tracing::{debug, error, info, warn};
use crate::context::{failed, StoreContext};
use crate::error::{RepositoryError, Result};
use crate::schema::{self, fields};
use crate::videos::list_videos;

#[derive(Clone)]
pub struct PlaylistRepository {
    ctx: StoreContext,
}

impl PlaylistRepository {
    pub fn new(ctx: StoreContext) -> Self {
        Self { ctx }
    }

    pub async fn create_playlist(&self, name: &str, description: Option<&str>) -> Result<Playlist> {
        const OP: &str = "create_playlist";
        let user_id = self.ctx.require_user(OP).await?;

        let data = schema::new_playlist_data(name, &user_id, description, Utc::now());
        let document = self
            .ctx
            .store
            .create_document(&self.ctx.collections.playlists, DocumentId::Unique, data)
            .await
            .map_err(|e| failed(OP, e))?;
        let playlist = schema::decode_playlist(&document).map_err(|e| failed(OP, e))?;

        info!(operation = OP, playlist_id = %playlist.id, name, "Created playlist");
        Ok(playlist)
    }

    /// The current user's playlists, most recently updated first
    pub async fn get_user_playlists(&self) -> Result<Vec<Playlist>> {
        const OP: &str = "get_user_playlists";
        let user_id = self.ctx.require_user(OP).await?;
        self.list_playlists(&user_id).await.map_err(|e| failed(OP, e))
    }

    /// A playlist and its videos, read one after the other
    pub async fn get_playlist_with_videos(&self, playlist_id: &str) -> Result<PlaylistWithVideos> {
        const OP: &str = "get_playlist_with_videos";
        let document = self
            .ctx
            .store
            .get_document(&self.ctx.collections.playlists, playlist_id)
            .await
            .map_err(|e| failed(OP, e))?;
        let playlist = schema::decode_playlist(&document).map_err(|e| failed(OP, e))?;

        let videos = list_videos(&self.ctx, vec![Query::equal(fields::PLAYLIST_ID, playlist_id)])
            .await
            .map_err(|e| failed(OP, e))?;

        debug!("Playlist {} has {} videos", playlist_id, videos.len());
        Ok(PlaylistWithVideos::new(playlist, videos))
    }

    /// Every playlist of the current user with its videos
    pub async fn get_user_playlists_with_videos(&self) -> Result<Vec<PlaylistWithVideos>> {
        const OP: &str = "get_user_playlists_with_videos";
        let user_id = self.ctx.require_user(OP).await?;

        let playlists = self.list_playlists(&user_id).await.map_err(|e| failed(OP, e))?;
        let videos = list_videos(&self.ctx, vec![Query::equal(fields::USER_ID, user_id.as_str())])
            .await
            .map_err(|e| failed(OP, e))?;

        let mut by_playlist: HashMap<String, Vec<Video>> = HashMap::new();
        for video in videos {
            by_playlist.entry(video.playlist_id.clone()).or_default().push(video);
        }

        let views: Vec<PlaylistWithVideos> = playlists
            .into_iter()
            .map(|playlist| {
                let videos = by_playlist.remove(&playlist.id).unwrap_or_default();
                PlaylistWithVideos::new(playlist, videos)
            })
            .collect();

        if !by_playlist.is_empty() {
            debug!("{} videos reference playlists that no longer exist", by_playlist.values().map(Vec::len).sum::<usize>());
        }
        Ok(views)
    }

    /// Overwrite the provided fields and bump `updatedAt`
    pub async fn update_playlist(&self, playlist_id: &str, update: &PlaylistUpdate) -> Result<Playlist> {
        const OP: &str = "update_playlist";
        let mut data = schema::touch(Utc::now());
        if let Some(name) = &update.name {
            data.insert(fields::NAME.to_string(), Value::from(name.as_str()));
        }
        if let Some(description) = &update.description {
            data.insert(fields::DESCRIPTION.to_string(), Value::from(description.as_str()));
        }

        let document = self
            .ctx
            .store
            .update_document(&self.ctx.collections.playlists, playlist_id, data)
            .await
            .map_err(|e| failed(OP, e))?;
        let playlist = schema::decode_playlist(&document).map_err(|e| failed(OP, e))?;

        info!(operation = OP, playlist_id, "Updated playlist");
        Ok(playlist)
    }

    /// Delete the playlist and its videos.
    ///
    /// Videos go first, then the playlist. If a delete fails after some
    /// videos are gone, those are re-created under their original ids and
    /// the failure is returned as [`RepositoryError::PartialDelete`].
    pub async fn delete_playlist(&self, playlist_id: &str) -> Result<()> {
        const OP: &str = "delete_playlist";
        let videos = list_all(
            self.ctx.store.as_ref(),
            &self.ctx.collections.videos,
            &[Query::equal(fields::PLAYLIST_ID, playlist_id)],
        )
        .await
        .map_err(|e| failed(OP, e))?
        .documents;

        let mut deleted: Vec<Document> = Vec::with_capacity(videos.len());
        for video in videos {
            if let Err(e) = self.ctx.store.delete_document(&self.ctx.collections.videos, &video.id).await {
                return Err(failed(OP, self.compensate(playlist_id, deleted, e).await));
            }
            deleted.push(video);
        }

        if let Err(e) = self.ctx.store.delete_document(&self.ctx.collections.playlists, playlist_id).await {
            return Err(failed(OP, self.compensate(playlist_id, deleted, e).await));
        }

        info!(operation = OP, playlist_id, videos = deleted.len(), "Deleted playlist");
        Ok(())
    }

    /// Recount the playlist's videos and overwrite `videoCount`
    pub async fn reconcile_video_count(&self, playlist_id: &str) -> Result<u32> {
        const OP: &str = "reconcile_video_count";
        let document = self
            .ctx
            .store
            .get_document(&self.ctx.collections.playlists, playlist_id)
            .await
            .map_err(|e| failed(OP, e))?;
        let playlist = schema::decode_playlist(&document).map_err(|e| failed(OP, e))?;

        // `total` ignores paging, so one single-item page is enough
        let actual = self
            .ctx
            .store
            .list_documents(
                &self.ctx.collections.videos,
                &[Query::equal(fields::PLAYLIST_ID, playlist_id), Query::Limit(1)],
            )
            .await
            .map_err(|e| failed(OP, e))?
            .total
            .min(u32::MAX as u64) as u32;

        if actual == playlist.video_count {
            debug!(playlist_id, count = actual, "Video count already correct");
            return Ok(actual);
        }

        let mut data = DocumentData::new();
        data.insert(fields::VIDEO_COUNT.to_string(), Value::from(actual));
        self.ctx
            .store
            .update_document(&self.ctx.collections.playlists, playlist_id, data)
            .await
            .map_err(|e| failed(OP, e))?;

        warn!(
            operation = OP,
            playlist_id,
            stored = playlist.video_count,
            actual,
            "Corrected drifted video count"
        );
        Ok(actual)
    }

    async fn list_playlists(&self, user_id: &str) -> std::result::Result<Vec<Playlist>, StoreError> {
        let list = list_all(
            self.ctx.store.as_ref(),
            &self.ctx.collections.playlists,
            &[Query::equal(fields::USER_ID, user_id), Query::order_desc(fields::UPDATED_AT)],
        )
        .await?;
        list.documents.iter().map(schema::decode_playlist).collect()
    }

    /// Re-create deleted videos, returning the error to report
    async fn compensate(&self, playlist_id: &str, deleted: Vec<Document>, source: StoreError) -> RepositoryError {
        if deleted.is_empty() {
            return source.into();
        }
        let count = deleted.len();
        warn!(playlist_id, deleted = count, error = %source, "Playlist delete failed, restoring videos");

        let mut restored = 0;
        for video in deleted {
            match self
                .ctx
                .store
                .create_document(
                    &self.ctx.collections.videos,
                    DocumentId::Custom(video.id.clone()),
                    video.user_fields(),
                )
                .await
            {
                Ok(_) => restored += 1,
                Err(e) => error!(playlist_id, video = %video.id, error = %e, "Failed to restore video"),
            }
        }

        RepositoryError::PartialDelete {
            playlist_id: playlist_id.to_string(),
            deleted: count,
            restored,
            source,
        }
    }
}
