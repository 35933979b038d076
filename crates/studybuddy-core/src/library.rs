//! Client-side view of the user's playlists.
//!
//! The library keeps the last fetched playlist list and per-playlist detail
//! views. Reads are served from the cache when present; every mutation goes
//! through the repositories and then drops exactly the entries it affected,
//! whether or not the mutation succeeded.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use studybuddy_models::{Playlist, PlaylistUpdate, PlaylistWithVideos, Video, WatchProgress};
use tracing::debug;
use crate::context::StoreContext;
use crate::error::Result;
use crate::playlists::PlaylistRepository;
use crate::videos::VideoRepository;

pub struct Library {
    playlists: PlaylistRepository,
    videos: VideoRepository,
    overview: Option<Vec<Playlist>>,
    details: HashMap<String, PlaylistWithVideos>,
}

impl Library {
    pub fn new(ctx: StoreContext) -> Self {
        Self {
            playlists: PlaylistRepository::new(ctx.clone()),
            videos: VideoRepository::new(ctx),
            overview: None,
            details: HashMap::new(),
        }
    }

    pub fn playlist_repository(&self) -> &PlaylistRepository {
        &self.playlists
    }

    pub fn video_repository(&self) -> &VideoRepository {
        &self.videos
    }

    pub fn cached_playlists(&self) -> Option<&[Playlist]> {
        self.overview.as_deref()
    }

    pub fn cached_playlist(&self, playlist_id: &str) -> Option<&PlaylistWithVideos> {
        self.details.get(playlist_id)
    }

    // Reads

    pub async fn refresh_playlists(&mut self) -> Result<&[Playlist]> {
        let playlists = self.playlists.get_user_playlists().await?;
        debug!("Cached {} playlists", playlists.len());
        let cached = self.overview.insert(playlists);
        Ok(cached.as_slice())
    }

    pub async fn playlists(&mut self) -> Result<&[Playlist]> {
        if self.overview.is_none() {
            self.refresh_playlists().await?;
        }
        Ok(self.overview.as_deref().unwrap_or_default())
    }

    pub async fn refresh_playlist(&mut self, playlist_id: &str) -> Result<&PlaylistWithVideos> {
        let view = self.playlists.get_playlist_with_videos(playlist_id).await?;
        debug!("Cached playlist {} with {} videos", playlist_id, view.videos.len());
        match self.details.entry(playlist_id.to_string()) {
            Entry::Occupied(mut entry) => {
                entry.insert(view);
                Ok(entry.into_mut())
            }
            Entry::Vacant(entry) => Ok(entry.insert(view)),
        }
    }

    pub async fn playlist(&mut self, playlist_id: &str) -> Result<&PlaylistWithVideos> {
        if !self.details.contains_key(playlist_id) {
            return self.refresh_playlist(playlist_id).await;
        }
        Ok(&self.details[playlist_id])
    }

    /// Dashboard view; also fills the overview and every detail entry
    pub async fn refresh_all(&mut self) -> Result<Vec<PlaylistWithVideos>> {
        let views = self.playlists.get_user_playlists_with_videos().await?;
        self.overview = Some(views.iter().map(|v| v.playlist.clone()).collect());
        self.details = views.iter().map(|v| (v.playlist.id.clone(), v.clone())).collect();
        Ok(views)
    }

    // Invalidation

    pub fn invalidate_playlists(&mut self) {
        self.overview = None;
    }

    pub fn invalidate_playlist(&mut self, playlist_id: &str) {
        self.details.remove(playlist_id);
    }

    // Mutations

    pub async fn create_playlist(&mut self, name: &str, description: Option<&str>) -> Result<Playlist> {
        let result = self.playlists.create_playlist(name, description).await;
        self.invalidate_playlists();
        result
    }

    pub async fn update_playlist(&mut self, playlist_id: &str, update: &PlaylistUpdate) -> Result<Playlist> {
        let result = self.playlists.update_playlist(playlist_id, update).await;
        self.invalidate_playlists();
        self.invalidate_playlist(playlist_id);
        result
    }

    pub async fn delete_playlist(&mut self, playlist_id: &str) -> Result<()> {
        let result = self.playlists.delete_playlist(playlist_id).await;
        self.invalidate_playlists();
        self.invalidate_playlist(playlist_id);
        result
    }

    pub async fn reconcile_video_count(&mut self, playlist_id: &str) -> Result<u32> {
        let result = self.playlists.reconcile_video_count(playlist_id).await;
        self.invalidate_playlists();
        self.invalidate_playlist(playlist_id);
        result
    }

    pub async fn add_video(&mut self, playlist_id: &str, video_id: &str, title: &str) -> Result<Video> {
        let result = self.videos.add_video_to_playlist(playlist_id, video_id, title).await;
        self.invalidate_playlists();
        self.invalidate_playlist(playlist_id);
        result
    }

    /// Progress does not show in the overview, so only the owning detail view is dropped
    pub async fn update_video_progress(&mut self, video_id: &str, progress: WatchProgress) -> Result<Video> {
        let result = self.videos.update_video_progress(video_id, progress).await;
        match &result {
            Ok(video) => self.invalidate_playlist(&video.playlist_id),
            Err(_) => {
                let owners: Vec<String> = self
                    .details
                    .iter()
                    .filter(|(_, view)| view.videos.iter().any(|v| v.id == video_id))
                    .map(|(id, _)| id.clone())
                    .collect();
                for id in owners {
                    self.invalidate_playlist(&id);
                }
            }
        }
        result
    }

    pub async fn remove_video(&mut self, video_id: &str, playlist_id: &str) -> Result<()> {
        let result = self.videos.delete_video_from_playlist(video_id, playlist_id).await;
        self.invalidate_playlists();
        self.invalidate_playlist(playlist_id);
        result
    }
}
