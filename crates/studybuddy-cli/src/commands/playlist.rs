use super::prompts;
use super::session::Session;
use super::ui::Spinner;
use crate::output::{print_section_header, progress_bar, styled_table, Output};
use crate::PlaylistCommands;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::Cell;
use owo_colors::OwoColorize;
use studybuddy_core::RepositoryError;
use studybuddy_models::{Playlist, PlaylistUpdate, PlaylistWithVideos};

pub async fn run_playlist(cmd: PlaylistCommands, offline: bool, output: &Output) -> Result<()> {
    let mut session = Session::open(offline)?;

    let result = match cmd {
        PlaylistCommands::List => list(&mut session, output).await,
        PlaylistCommands::Show { id } => show(&mut session, &id, output).await,
        PlaylistCommands::Create { name, description } => {
            create(&mut session, &name, description.as_deref(), output).await
        }
        PlaylistCommands::Rename { id, name, description } => {
            rename(&mut session, &id, PlaylistUpdate { name, description }, output).await
        }
        PlaylistCommands::Delete { id, yes } => delete(&mut session, &id, yes, output).await,
        PlaylistCommands::Reconcile { id } => reconcile(&mut session, &id, output).await,
        PlaylistCommands::Dashboard => dashboard(&mut session, output).await,
    };

    // A failed delete may still have changed the store (restored videos)
    session.persist()?;
    result
}

async fn list(session: &mut Session, output: &Output) -> Result<()> {
    let playlists = session.library.playlists().await?;
    output.data("playlists", &playlists);

    if playlists.is_empty() {
        output.info("No playlists yet. Create one with 'studybuddy playlist create <name>'.");
        return Ok(());
    }

    let mut table = styled_table(&["Name", "Videos", "Description", "Updated", "ID"]);
    for playlist in playlists {
        table.add_row(vec![
            Cell::new(&playlist.name),
            Cell::new(playlist.video_count),
            Cell::new(playlist.description.as_deref().unwrap_or("")),
            Cell::new(playlist.updated_at.format("%Y-%m-%d %H:%M").to_string()),
            Cell::new(&playlist.id),
        ]);
    }
    output.table(&table);
    Ok(())
}

async fn show(session: &mut Session, id: &str, output: &Output) -> Result<()> {
    let view = session.library.playlist(id).await?;
    output.data("playlist", view);
    if output.is_human() {
        print_playlist(view, output);
    }
    Ok(())
}

async fn create(session: &mut Session, name: &str, description: Option<&str>, output: &Output) -> Result<()> {
    if name.trim().is_empty() {
        return Err(eyre!("Playlist name cannot be empty"));
    }
    let playlist = session.library.create_playlist(name.trim(), description).await?;
    output.data("playlist", &playlist);
    output.success(format!("Created playlist '{}' ({})", playlist.name, playlist.id));
    Ok(())
}

async fn rename(session: &mut Session, id: &str, update: PlaylistUpdate, output: &Output) -> Result<()> {
    if update.is_empty() {
        output.warn("Nothing to change. Use --name and/or --description");
        return Ok(());
    }
    if update.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(eyre!("Playlist name cannot be empty"));
    }
    let playlist = session.library.update_playlist(id, &update).await?;
    output.data("playlist", &playlist);
    output.success(format!("Updated playlist '{}'", playlist.name));
    Ok(())
}

async fn delete(session: &mut Session, id: &str, yes: bool, output: &Output) -> Result<()> {
    let view = session.library.playlist(id).await?;
    let (name, videos) = (view.playlist.name.clone(), view.videos.len());

    if !yes {
        let prompt = format!("Delete playlist '{}' and its {} video(s)?", name, videos);
        if !prompts::prompt_yes_no(&prompt, Some(false))? {
            output.info("Cancelled");
            return Ok(());
        }
    }

    let spinner = Spinner::start(format!("Deleting '{}'...", name));
    let result = session.library.delete_playlist(id).await;
    spinner.finish();

    match result {
        Ok(()) => {
            output.success(format!("Deleted playlist '{}' and {} video(s)", name, videos));
            Ok(())
        }
        Err(e) => {
            if let RepositoryError::PartialDelete { deleted, restored, .. } = &e {
                if e.is_unrecovered() {
                    output.warn(format!(
                        "Only {} of {} deleted videos could be restored; run 'studybuddy playlist reconcile {}'",
                        restored, deleted, id
                    ));
                } else {
                    output.info(format!("All {} deleted videos were restored", deleted));
                }
            }
            Err(e.into())
        }
    }
}

async fn reconcile(session: &mut Session, id: &str, output: &Output) -> Result<()> {
    let before = session.library.playlist(id).await?.playlist.video_count;
    let count = session.library.reconcile_video_count(id).await?;
    output.data("reconcile", &serde_json::json!({ "playlist_id": id, "before": before, "video_count": count }));

    if before == count {
        output.success(format!("Video count already correct ({})", count));
    } else {
        output.success(format!("Video count corrected from {} to {}", before, count));
    }
    Ok(())
}

async fn dashboard(session: &mut Session, output: &Output) -> Result<()> {
    let spinner = Spinner::start("Loading playlists...");
    let views = session.library.refresh_all().await;
    spinner.finish();
    let views = views?;

    output.data("dashboard", &views);
    if !output.is_human() {
        return Ok(());
    }
    if views.is_empty() {
        output.info("No playlists yet. Create one with 'studybuddy playlist create <name>'.");
        return Ok(());
    }

    let total_videos: usize = views.iter().map(|v| v.videos.len()).sum();
    let completed: usize = views.iter().map(PlaylistWithVideos::completed_videos).sum();

    let mut table = styled_table(&["Playlist", "Videos", "Completed", "Progress"]);
    for view in &views {
        table.add_row(vec![
            Cell::new(&view.playlist.name),
            Cell::new(view.videos.len()),
            Cell::new(view.completed_videos()),
            Cell::new(progress_bar(view.average_progress())),
        ]);
    }
    print_section_header("Study Dashboard", output);
    output.table(&table);
    output.println(format!(
        "{} playlists, {} videos, {} completed",
        views.len(),
        total_videos,
        completed
    ));

    for view in views.iter().filter(|v| v.has_count_drift()) {
        output.warn(drift_message(&view.playlist, view.videos.len()));
    }
    if session.is_offline() {
        output.println(format!("{}", "(offline store)".bright_black()));
    }
    Ok(())
}

fn print_playlist(view: &PlaylistWithVideos, output: &Output) {
    let playlist = &view.playlist;
    print_section_header(&playlist.name, output);
    if let Some(description) = &playlist.description {
        output.println(description);
    }
    output.println(format!(
        "{} video(s), {} completed, average {}",
        view.videos.len(),
        view.completed_videos(),
        progress_bar(view.average_progress())
    ));

    if !view.videos.is_empty() {
        let mut table = styled_table(&["#", "Title", "Progress", "URL", "ID"]);
        for (idx, video) in view.videos.iter().enumerate() {
            table.add_row(vec![
                Cell::new(idx + 1),
                Cell::new(&video.title),
                Cell::new(progress_bar(video.progress.value())),
                Cell::new(video.watch_url()),
                Cell::new(&video.id),
            ]);
        }
        output.table(&table);
    }

    if view.has_count_drift() {
        output.warn(drift_message(playlist, view.videos.len()));
    }
}

fn drift_message(playlist: &Playlist, actual: usize) -> String {
    format!(
        "'{}' records {} video(s) but has {}; run 'studybuddy playlist reconcile {}'",
        playlist.name, playlist.video_count, actual, playlist.id
    )
}
