//! Client for the study companion backend: summaries, quizzes and the
//! distraction feeds produced by the vision service.

mod client;
mod error;
pub mod sse;

pub use client::{CompanionClient, Feed};
pub use error::CompanionError;
