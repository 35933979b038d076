use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::video::Video;

/// A named, user-owned collection of videos.
///
/// `video_count` is denormalized: it is maintained by the repository on every
/// add/remove and may drift if a multi-step operation fails half way.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub video_count: u32,
}

/// Fields that may be overwritten by `update_playlist`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlaylistUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl PlaylistUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlaylistWithVideos {
    #[serde(flatten)]
    pub playlist: Playlist,
    /// Ordered by creation time, oldest first
    pub videos: Vec<Video>,
}

impl PlaylistWithVideos {
    pub fn new(playlist: Playlist, videos: Vec<Video>) -> Self {
        Self { playlist, videos }
    }

    /// Mean watch progress across all videos, 0 for an empty playlist
    pub fn average_progress(&self) -> f64 {
        if self.videos.is_empty() {
            return 0.0;
        }
        let total: f64 = self.videos.iter().map(|v| v.progress.value()).sum();
        total / self.videos.len() as f64
    }

    pub fn completed_videos(&self) -> usize {
        self.videos.iter().filter(|v| v.progress.is_complete()).count()
    }

    /// True when the stored counter disagrees with the videos actually read
    pub fn has_count_drift(&self) -> bool {
        self.playlist.video_count as usize != self.videos.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WatchProgress;

    fn playlist(count: u32) -> Playlist {
        Playlist {
            id: "p1".to_string(),
            name: "Rust".to_string(),
            user_id: "u1".to_string(),
            description: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            video_count: count,
        }
    }

    fn video(id: &str, progress: f64) -> Video {
        Video {
            id: id.to_string(),
            video_id: "dQw4w9WgXcQ".to_string(),
            title: id.to_string(),
            playlist_id: "p1".to_string(),
            user_id: "u1".to_string(),
            progress: WatchProgress::new(progress).unwrap(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_average_progress() {
        let pwv = PlaylistWithVideos::new(playlist(2), vec![video("a", 50.0), video("b", 100.0)]);
        assert_eq!(pwv.average_progress(), 75.0);
        assert_eq!(pwv.completed_videos(), 1);
        assert!(!pwv.has_count_drift());
    }

    #[test]
    fn test_empty_playlist_progress() {
        let pwv = PlaylistWithVideos::new(playlist(3), vec![]);
        assert_eq!(pwv.average_progress(), 0.0);
        assert!(pwv.has_count_drift());
    }

    #[test]
    fn test_playlist_update_is_empty() {
        assert!(PlaylistUpdate::default().is_empty());
        let update = PlaylistUpdate { name: Some("x".to_string()), description: None };
        assert!(!update.is_empty());
    }
}
