//! Wire shape of the stored documents and conversion to the domain models.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use studybuddy_models::{Playlist, Video, WatchProgress};
use studybuddy_store::{iso_timestamp, Document, DocumentData, StoreError};

pub mod fields {
    pub const NAME: &str = "name";
    pub const USER_ID: &str = "userId";
    pub const DESCRIPTION: &str = "description";
    pub const CREATED_AT: &str = "createdAt";
    pub const UPDATED_AT: &str = "updatedAt";
    pub const VIDEO_COUNT: &str = "videoCount";
    pub const VIDEO_ID: &str = "videoId";
    pub const TITLE: &str = "title";
    pub const PLAYLIST_ID: &str = "playlistId";
    pub const PROGRESS: &str = "progress";
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistDocument {
    #[serde(rename = "$id")]
    pub id: String,
    pub name: String,
    pub user_id: String,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub video_count: i64,
}

impl From<PlaylistDocument> for Playlist {
    fn from(doc: PlaylistDocument) -> Self {
        Playlist {
            id: doc.id,
            name: doc.name,
            user_id: doc.user_id,
            // Absent descriptions are stored as ""
            description: doc.description.filter(|d| !d.is_empty()),
            created_at: doc.created_at,
            updated_at: doc.updated_at,
            video_count: doc.video_count.clamp(0, u32::MAX as i64) as u32,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoDocument {
    #[serde(rename = "$id")]
    pub id: String,
    pub video_id: String,
    pub title: String,
    pub playlist_id: String,
    pub user_id: String,
    #[serde(default)]
    pub progress: WatchProgress,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<VideoDocument> for Video {
    fn from(doc: VideoDocument) -> Self {
        Video {
            id: doc.id,
            video_id: doc.video_id,
            title: doc.title,
            playlist_id: doc.playlist_id,
            user_id: doc.user_id,
            progress: doc.progress,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        }
    }
}

pub fn decode_playlist(document: &Document) -> Result<Playlist, StoreError> {
    Ok(document.decode::<PlaylistDocument>()?.into())
}

pub fn decode_video(document: &Document) -> Result<Video, StoreError> {
    Ok(document.decode::<VideoDocument>()?.into())
}

pub fn timestamp(at: DateTime<Utc>) -> Value {
    Value::String(iso_timestamp(at))
}

/// Fields of a freshly created playlist
pub fn new_playlist_data(name: &str, user_id: &str, description: Option<&str>, now: DateTime<Utc>) -> DocumentData {
    let mut data = DocumentData::new();
    data.insert(fields::NAME.to_string(), Value::from(name));
    data.insert(fields::USER_ID.to_string(), Value::from(user_id));
    data.insert(fields::DESCRIPTION.to_string(), Value::from(description.unwrap_or("")));
    data.insert(fields::CREATED_AT.to_string(), timestamp(now));
    data.insert(fields::UPDATED_AT.to_string(), timestamp(now));
    data.insert(fields::VIDEO_COUNT.to_string(), Value::from(0));
    data
}

/// Fields of a freshly added video
pub fn new_video_data(
    video_id: &str,
    title: &str,
    playlist_id: &str,
    user_id: &str,
    now: DateTime<Utc>,
) -> DocumentData {
    let mut data = DocumentData::new();
    data.insert(fields::VIDEO_ID.to_string(), Value::from(video_id));
    data.insert(fields::TITLE.to_string(), Value::from(title));
    data.insert(fields::PLAYLIST_ID.to_string(), Value::from(playlist_id));
    data.insert(fields::USER_ID.to_string(), Value::from(user_id));
    data.insert(fields::PROGRESS.to_string(), Value::from(0));
    data.insert(fields::CREATED_AT.to_string(), timestamp(now));
    data.insert(fields::UPDATED_AT.to_string(), timestamp(now));
    data
}

pub fn touch(now: DateTime<Utc>) -> DocumentData {
    let mut data = DocumentData::new();
    data.insert(fields::UPDATED_AT.to_string(), timestamp(now));
    data
}
