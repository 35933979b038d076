pub mod focus;
pub mod playlist;
pub mod progress;
pub mod summary;
pub mod video;
pub mod youtube;

pub use focus::{FocusSample, FocusStatus};
pub use playlist::{Playlist, PlaylistUpdate, PlaylistWithVideos};
pub use progress::{InvalidProgress, WatchProgress};
pub use summary::{QuizItem, VideoSummary, WebSummary};
pub use video::Video;
pub use youtube::{extract_video_id, watch_url, InvalidVideoId, YouTubeVideoId};
