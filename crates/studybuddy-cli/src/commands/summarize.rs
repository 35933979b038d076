use super::session::companion_client;
use super::ui::Spinner;
use crate::output::{print_section_header, styled_table, Output};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::Cell;
use std::path::Path;
use studybuddy_config::PathManager;
use studybuddy_core::{SummaryEntry, SummaryHistory};
use studybuddy_models::{VideoSummary, YouTubeVideoId};
use tracing::{debug, warn};

pub async fn run_summarize(url: &str, at: f64, output: &Output) -> Result<()> {
    let summary = fetch_video_summary(url, at).await?;
    output.data("summary", &summary);

    print_section_header("Summary", output);
    output.println(&summary.summary);
    if !summary.quiz.is_empty() {
        output.println("");
        output.info(format!(
            "{} quiz question(s) available: studybuddy quiz '{}' --at {}",
            summary.quiz.len(),
            url,
            at
        ));
    }
    Ok(())
}

/// Summary and quiz for a YouTube link, taken up to `at` seconds
pub async fn fetch_video_summary(url: &str, at: f64) -> Result<VideoSummary> {
    if !at.is_finite() || at < 0.0 {
        return Err(eyre!("--at must be a non-negative number of seconds"));
    }
    let video_id = YouTubeVideoId::from_url_or_id(url)?;
    let client = companion_client()?;

    let spinner = Spinner::start("Summarizing video...");
    let result = client.summarize(&video_id.watch_url(), at).await;
    spinner.finish();
    Ok(result?)
}

pub async fn run_web_summarize(url: Option<&str>, show_history: bool, output: &Output) -> Result<()> {
    let history_file = PathManager::default().summary_history_file();
    let mut history = load_history(&history_file);

    if show_history {
        print_history(&history, output);
        return Ok(());
    }

    let url = url.map(str::trim).filter(|u| !u.is_empty()).ok_or_else(|| eyre!("A URL is required"))?;
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(eyre!("Enter a full http(s) URL: {}", url));
    }

    let client = companion_client()?;
    let spinner = Spinner::start(format!("Summarizing {}...", url));
    let result = client.web_summarize(url).await;
    spinner.finish();
    let summary = result?;

    let entry = SummaryEntry::new(url, summary.summary);
    output.data("web_summary", &entry);
    print_section_header(&entry.title, output);
    output.println(&entry.summary);

    history.record(entry);
    if let Err(e) = save_history(&history_file, &history) {
        warn!("Failed to save summary history to {}: {}", history_file.display(), e);
    }
    Ok(())
}

fn load_history(path: &Path) -> SummaryHistory {
    let Ok(content) = std::fs::read_to_string(path) else {
        return SummaryHistory::new();
    };
    serde_json::from_str(&content).unwrap_or_else(|e| {
        warn!("Summary history at {} is corrupt ({}), starting fresh", path.display(), e);
        SummaryHistory::new()
    })
}

fn save_history(path: &Path, history: &SummaryHistory) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(history)?)?;
    debug!("Saved {} summaries to {}", history.len(), path.display());
    Ok(())
}

fn print_history(history: &SummaryHistory, output: &Output) {
    let entries: Vec<&SummaryEntry> = history.entries().collect();
    output.data("summary_history", &entries);
    if history.is_empty() {
        output.info("No summaries yet");
        return;
    }

    let mut table = styled_table(&["When", "Site", "Summary"]);
    for entry in entries {
        let preview: String = entry.summary.chars().take(80).collect();
        let preview = if preview.len() < entry.summary.len() { format!("{}…", preview) } else { preview };
        table.add_row(vec![
            Cell::new(entry.created_at.format("%Y-%m-%d %H:%M").to_string()),
            Cell::new(&entry.title),
            Cell::new(preview),
        ]);
    }
    output.table(&table);
}
