use chrono::Utc;
use serde_json::Value;
use studybuddy_models::{Video, WatchProgress, YouTubeVideoId};
use studybuddy_store::{list_all, Bounds, DocumentId, Query, StoreError};
use tracing::{debug, info, warn};
use crate::context::{failed, StoreContext};
use crate::error::Result;
use crate::schema::{self, fields};

#[derive(Clone)]
pub struct VideoRepository {
    ctx: StoreContext,
}

impl VideoRepository {
    pub fn new(ctx: StoreContext) -> Self {
        Self { ctx }
    }

    /// Add a video and bump the playlist's counter.
    ///
    /// The id is validated before anything is written. If the counter update
    /// fails after the video was created the error is returned and the count
    /// stays one short until the playlist is reconciled.
    pub async fn add_video_to_playlist(&self, playlist_id: &str, video_id: &str, title: &str) -> Result<Video> {
        const OP: &str = "add_video_to_playlist";
        let video_id = YouTubeVideoId::parse(video_id).map_err(|e| failed(OP, e))?;
        let user_id = self.ctx.require_user(OP).await?;
        let now = Utc::now();

        let data = schema::new_video_data(video_id.as_str(), title, playlist_id, &user_id, now);
        let document = self
            .ctx
            .store
            .create_document(&self.ctx.collections.videos, DocumentId::Unique, data)
            .await
            .map_err(|e| failed(OP, e))?;
        let video = schema::decode_video(&document).map_err(|e| failed(OP, e))?;

        self.ctx
            .store
            .increment_field(&self.ctx.collections.playlists, playlist_id, fields::VIDEO_COUNT, 1, Bounds::NONE)
            .await
            .map_err(|e| {
                warn!(playlist_id, video = %video.id, "Video created but playlist count not updated");
                failed(OP, e)
            })?;
        self.touch_playlist(playlist_id, OP).await?;

        info!(
            operation = OP,
            playlist_id,
            video = %video.id,
            youtube_id = %video_id,
            "Added video to playlist"
        );
        Ok(video)
    }

    /// Overwrite a video's progress
    pub async fn update_video_progress(&self, video_id: &str, progress: WatchProgress) -> Result<Video> {
        const OP: &str = "update_video_progress";
        let now = Utc::now();
        let mut data = schema::touch(now);
        data.insert(fields::PROGRESS.to_string(), Value::from(progress.value()));

        let document = self
            .ctx
            .store
            .update_document(&self.ctx.collections.videos, video_id, data)
            .await
            .map_err(|e| failed(OP, e))?;
        let video = schema::decode_video(&document).map_err(|e| failed(OP, e))?;

        debug!(operation = OP, video = %video_id, progress = progress.value(), "Updated video progress");
        Ok(video)
    }

    /// Delete a video and lower the playlist's counter, never below zero
    pub async fn delete_video_from_playlist(&self, video_id: &str, playlist_id: &str) -> Result<()> {
        const OP: &str = "delete_video_from_playlist";
        self.ctx
            .store
            .delete_document(&self.ctx.collections.videos, video_id)
            .await
            .map_err(|e| failed(OP, e))?;

        match self
            .ctx
            .store
            .increment_field(
                &self.ctx.collections.playlists,
                playlist_id,
                fields::VIDEO_COUNT,
                -1,
                Bounds::floor(0),
            )
            .await
        {
            Ok(_) => {}
            Err(StoreError::BoundExceeded { .. }) => {
                warn!(playlist_id, "Playlist video count already at zero, leaving it");
            }
            Err(e) => return Err(failed(OP, e)),
        }
        self.touch_playlist(playlist_id, OP).await?;

        info!(operation = OP, playlist_id, video = %video_id, "Removed video from playlist");
        Ok(())
    }

    /// Videos of one playlist, oldest first
    pub async fn get_playlist_videos(&self, playlist_id: &str) -> Result<Vec<Video>> {
        list_videos(&self.ctx, vec![Query::equal(fields::PLAYLIST_ID, playlist_id)])
            .await
            .map_err(|e| failed("get_playlist_videos", e))
    }

    async fn touch_playlist(&self, playlist_id: &str, operation: &str) -> Result<()> {
        self.ctx
            .store
            .update_document(&self.ctx.collections.playlists, playlist_id, schema::touch(Utc::now()))
            .await
            .map_err(|e| failed(operation, e))?;
        Ok(())
    }
}

/// All videos matching `filters`, ordered by creation ascending
pub(crate) async fn list_videos(ctx: &StoreContext, mut filters: Vec<Query>) -> std::result::Result<Vec<Video>, StoreError> {
    filters.push(Query::order_asc(fields::CREATED_AT));
    let list = list_all(ctx.store.as_ref(), &ctx.collections.videos, &filters).await?;
    list.documents.iter().map(schema::decode_video).collect()
}
