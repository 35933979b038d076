use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Shortest identifier accepted as "looks like a YouTube video ID"
pub const MIN_VIDEO_ID_LEN: usize = 10;

const VIDEO_ID_MARKERS: [&str; 3] = ["youtube.com/watch?v=", "youtu.be/", "youtube.com/embed/"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid YouTube video ID: {0:?}")]
pub struct InvalidVideoId(pub String);

/// External YouTube identifier. Only the length is checked.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YouTubeVideoId(String);

impl YouTubeVideoId {
    pub fn parse(raw: impl Into<String>) -> Result<Self, InvalidVideoId> {
        let raw = raw.into();
        if raw.chars().count() < MIN_VIDEO_ID_LEN {
            return Err(InvalidVideoId(raw));
        }
        Ok(Self(raw))
    }

    /// Accept either a bare ID or any supported YouTube URL
    pub fn from_url_or_id(input: &str) -> Result<Self, InvalidVideoId> {
        Self::parse(extract_video_id(input.trim()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn watch_url(&self) -> String {
        watch_url(&self.0)
    }
}

impl TryFrom<String> for YouTubeVideoId {
    type Error = InvalidVideoId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<YouTubeVideoId> for String {
    fn from(id: YouTubeVideoId) -> Self {
        id.0
    }
}

impl std::fmt::Display for YouTubeVideoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Pull the video ID out of a watch/short/embed URL.
///
/// Input that matches none of the known URL shapes is returned unchanged so
/// that bare IDs pass straight through.
pub fn extract_video_id(url: &str) -> String {
    for marker in VIDEO_ID_MARKERS {
        if let Some(start) = url.find(marker) {
            let rest = &url[start + marker.len()..];
            let id: String = rest
                .chars()
                .take_while(|c| !matches!(c, '&' | '\n' | '?' | '#'))
                .collect();
            if !id.is_empty() {
                return id;
            }
        }
    }
    url.to_string()
}

pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}
