use super::ui::is_interactive;
use crate::output::Output;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use std::time::Duration;
use studybuddy_core::{FocusTimer, Phase, TimerDurations};
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::info;

pub async fn run_timer(
    sessions: u32,
    focus_minutes: u64,
    break_minutes: u64,
    long_break_minutes: u64,
    output: &Output,
) -> Result<()> {
    if sessions == 0 {
        return Err(eyre!("--sessions must be at least 1"));
    }
    if focus_minutes == 0 || break_minutes == 0 || long_break_minutes == 0 {
        return Err(eyre!("Session and break lengths must be at least one minute"));
    }

    let durations = TimerDurations {
        focus: Duration::from_secs(focus_minutes * 60),
        short_break: Duration::from_secs(break_minutes * 60),
        long_break: Duration::from_secs(long_break_minutes * 60),
        ..TimerDurations::default()
    };
    let mut timer = FocusTimer::new(durations);
    timer.start();

    info!(operation = "timer", sessions, focus_minutes, break_minutes, long_break_minutes, "Timer started");
    output.success(format!("{} started ({} session(s) planned)", timer.phase().label(), sessions));
    let mut bar = phase_bar(&timer, &durations);

    let mut ticker = interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker.tick().await;
    let mut last = Instant::now();

    loop {
        ticker.tick().await;
        let now = Instant::now();
        let entered = timer.tick(now - last);
        last = now;

        let Some(phase) = entered else {
            bar.set_position(elapsed_in_phase(&timer, &durations));
            bar.set_message(timer.display());
            continue;
        };

        bar.finish_and_clear();
        info!(operation = "timer", phase = phase.label(), completed = timer.completed_sessions(), "Phase changed");
        output.data("timer_phase", &json!({ "phase": phase, "completed_sessions": timer.completed_sessions() }));

        if timer.completed_sessions() >= sessions {
            break;
        }
        output.success(format!(
            "{} started ({}/{} sessions done)",
            phase.label(),
            timer.completed_sessions(),
            sessions
        ));
        bar = phase_bar(&timer, &durations);
    }

    output.success(format!("Completed {} focus session(s). Nice work!", timer.completed_sessions()));
    Ok(())
}

fn phase_length(phase: Phase, durations: &TimerDurations) -> Duration {
    match phase {
        Phase::Focus => durations.focus,
        Phase::ShortBreak => durations.short_break,
        Phase::LongBreak => durations.long_break,
    }
}

fn elapsed_in_phase(timer: &FocusTimer, durations: &TimerDurations) -> u64 {
    phase_length(timer.phase(), durations)
        .saturating_sub(timer.remaining())
        .as_secs()
}

/// Countdown bar for the current phase; hidden without a terminal
fn phase_bar(timer: &FocusTimer, durations: &TimerDurations) -> ProgressBar {
    if !is_interactive() {
        return ProgressBar::hidden();
    }

    let bar = ProgressBar::new(phase_length(timer.phase(), durations).as_secs());
    let color = if timer.phase().is_break() { "green" } else { "cyan" };
    let template = format!("{{prefix:.bold}} [{{wide_bar:.{}/blue}}] {{msg}}", color);
    if let Ok(style) = ProgressStyle::default_bar().template(&template) {
        bar.set_style(style.progress_chars("█▉▊▋▌▍▎▏  "));
    }
    bar.set_prefix(timer.phase().label());
    bar.set_message(timer.display());
    bar
}
