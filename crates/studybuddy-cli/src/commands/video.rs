use super::session::Session;
use crate::output::{progress_bar, Output};
use crate::VideoCommands;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use studybuddy_models::{WatchProgress, YouTubeVideoId};

pub async fn run_video(cmd: VideoCommands, offline: bool, output: &Output) -> Result<()> {
    let mut session = Session::open(offline)?;

    let result = match cmd {
        VideoCommands::Add { playlist, video, title } => add(&mut session, &playlist, &video, &title, output).await,
        VideoCommands::Progress { video, percent } => progress(&mut session, &video, &percent, output).await,
        VideoCommands::Remove { video, playlist } => remove(&mut session, &video, &playlist, output).await,
    };

    session.persist()?;
    result
}

async fn add(session: &mut Session, playlist_id: &str, input: &str, title: &str, output: &Output) -> Result<()> {
    let video_id = YouTubeVideoId::from_url_or_id(input)?;
    let title = if title.trim().is_empty() { video_id.as_str() } else { title.trim() };

    let video = session.library.add_video(playlist_id, video_id.as_str(), title).await?;
    output.data("video", &video);
    output.success(format!("Added '{}' ({})", video.title, video.watch_url()));
    Ok(())
}

async fn progress(session: &mut Session, video_id: &str, percent: &str, output: &Output) -> Result<()> {
    let progress: WatchProgress = percent.parse().map_err(|e: String| eyre!("Invalid progress: {}", e))?;

    let video = session.library.update_video_progress(video_id, progress).await?;
    output.data("video", &video);
    output.success(format!("'{}' {}", video.title, progress_bar(video.progress.value())));
    Ok(())
}

async fn remove(session: &mut Session, video_id: &str, playlist_id: &str, output: &Output) -> Result<()> {
    session.library.remove_video(video_id, playlist_id).await?;
    output.data("removed", &serde_json::json!({ "video_id": video_id, "playlist_id": playlist_id }));
    output.success(format!("Removed video {} from playlist {}", video_id, playlist_id));
    Ok(())
}
