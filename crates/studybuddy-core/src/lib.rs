pub mod context;
pub mod error;
pub mod focus;
pub mod history;
pub mod library;
pub mod playlists;
pub mod quiz;
pub mod schema;
pub mod timer;
pub mod videos;

pub use context::{Collections, StoreContext};
pub use error::RepositoryError;
pub use focus::{ScoreWindow, FOCUS_WINDOW};
pub use history::{SummaryEntry, SummaryHistory, HISTORY_LIMIT};
pub use library::Library;
pub use playlists::PlaylistRepository;
pub use quiz::{AnswerOutcome, QuizSession};
pub use timer::{FocusTimer, Phase, TimerDurations};
pub use videos::VideoRepository;
