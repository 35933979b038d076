use super::prompts;
use super::summarize::fetch_video_summary;
use super::ui::is_interactive;
use crate::output::{print_section_header, Output};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use owo_colors::OwoColorize;
use serde_json::json;
use studybuddy_core::{AnswerOutcome, QuizSession};
use tracing::info;

pub async fn run_quiz(url: &str, at: f64, output: &Output) -> Result<()> {
    let summary = fetch_video_summary(url, at).await?;
    if summary.quiz.is_empty() {
        output.warn("The backend returned no quiz for this video");
        return Ok(());
    }
    if !is_interactive() {
        return Err(eyre!("The quiz needs an interactive terminal; use 'studybuddy summarize' to fetch it as data"));
    }

    let mut session = QuizSession::new(summary.quiz);
    loop {
        take_quiz(&mut session, output)?;

        info!(operation = "quiz", score = session.score(), total = session.total(), "Quiz finished");
        output.data("quiz_result", &json!({ "score": session.score(), "total": session.total(), "percent": session.percent() }));
        print_section_header("Results", output);
        output.println(format!(
            "{}/{} correct ({}%)  {}",
            session.score(),
            session.total(),
            session.percent(),
            session.feedback().bold()
        ));

        if !prompts::prompt_yes_no("Try again?", Some(false))? {
            return Ok(());
        }
        session.restart();
    }
}

fn take_quiz(session: &mut QuizSession, output: &Output) -> Result<()> {
    while let Some(item) = session.current() {
        let prompt = format!("[{}/{}] {}", session.position(), session.total(), item.question);
        let options = item.options.clone();
        let choice = if options.is_empty() {
            prompts::prompt_string(&prompt, None)?.trim().to_string()
        } else {
            options[prompts::prompt_choice(&prompt, &options)?].clone()
        };

        match session.answer(&choice) {
            Some(AnswerOutcome::Correct) => output.success("Correct!"),
            Some(AnswerOutcome::Incorrect { answer }) => {
                output.println(format!("{} The answer was: {}", "✗".red(), answer));
            }
            None => break,
        }
    }
    Ok(())
}
