use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuizItem {
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
}

impl QuizItem {
    pub fn is_correct(&self, choice: &str) -> bool {
        self.answer == choice
    }
}

/// Response of the summarize endpoint for a video
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct VideoSummary {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub quiz: Vec<QuizItem>,
}

/// Response of the web page summarize endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct WebSummary {
    #[serde(default)]
    pub summary: String,
}
