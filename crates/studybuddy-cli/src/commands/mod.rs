pub mod clear;
pub mod config;
pub mod focus;
pub mod playlist;
pub mod prompts;
pub mod quiz;
pub mod session;
pub mod summarize;
pub mod timer;
pub mod ui;
pub mod video;
