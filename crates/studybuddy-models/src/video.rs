use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::progress::WatchProgress;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Video {
    pub id: String,
    pub video_id: String, // YouTube video ID
    pub title: String,
    pub playlist_id: String,
    pub user_id: String,
    pub progress: WatchProgress,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Video {
    pub fn watch_url(&self) -> String {
        crate::youtube::watch_url(&self.video_id)
    }
}
