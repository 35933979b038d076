use super::session::companion_client;
use crate::output::Output;
use crate::FeedArg;
use color_eyre::Result;
use futures::StreamExt;
use owo_colors::OwoColorize;
use serde_json::json;
use studybuddy_core::ScoreWindow;
use studybuddy_models::{FocusSample, FocusStatus};
use studybuddy_store::{CompanionError, Feed};
use tracing::{info, warn};

pub async fn run_focus(feed: FeedArg, limit: Option<usize>, output: &Output) -> Result<()> {
    let feed = match feed {
        FeedArg::Distracted => Feed::Distracted,
        FeedArg::Score => Feed::Score,
    };
    let client = companion_client()?;
    let mut stream = client.feed(feed).await?;
    let camera = client.video_feed_url();
    output.data("focus_feed", &json!({ "feed": feed.path(), "camera_url": camera }));
    output.info(format!("Watching {} (Ctrl-C to stop)", feed.path()));
    output.info(format!("Camera preview: {}", camera));

    let mut window = ScoreWindow::default();
    let mut received = 0usize;
    while let Some(item) = stream.next().await {
        let score = match item {
            Ok(score) => score,
            Err(CompanionError::InvalidScore(raw)) => {
                warn!(operation = "focus_feed", raw = %raw, "Skipping unparseable feed sample");
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        window.push(FocusSample::now(score));
        received += 1;

        let status = match feed {
            Feed::Distracted => window.distraction_status().unwrap_or(FocusStatus::Focused),
            Feed::Score => FocusStatus::from_concentration(score),
        };
        let average = window.average().unwrap_or(score);
        report_sample(score, status, average, output);

        if limit.is_some_and(|limit| received >= limit) {
            break;
        }
    }

    info!(operation = "focus_feed", samples = received, "Feed finished");
    if let (Some(average), Some(min), Some(max)) = (window.average(), window.min(), window.max()) {
        output.data("focus_summary", &json!({ "samples": received, "average": average, "min": min, "max": max }));
        output.println(format!(
            "{} samples, last {} averaged {:.1} (min {:.1}, max {:.1})",
            received,
            window.len(),
            average,
            min,
            max
        ));
    } else {
        output.warn("The feed closed before sending any samples");
    }
    Ok(())
}

fn report_sample(score: f64, status: FocusStatus, average: f64, output: &Output) {
    output.data("focus_sample", &json!({ "score": score, "status": status, "average": average }));
    if !output.is_human() {
        return;
    }
    let label = match status {
        FocusStatus::Focused => status.label().green().to_string(),
        FocusStatus::MildDistraction => status.label().yellow().to_string(),
        FocusStatus::Distracted => status.label().red().to_string(),
    };
    output.println(format!(
        "{}  score {:>5.1}  avg {:>5.1}  {}",
        chrono::Local::now().format("%H:%M:%S").bright_black(),
        score,
        average,
        label
    ));
}
