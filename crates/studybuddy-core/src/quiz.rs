use studybuddy_models::QuizItem;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerOutcome {
    Correct,
    Incorrect { answer: String },
}

/// One pass through a quiz, in order
#[derive(Debug, Clone)]
pub struct QuizSession {
    items: Vec<QuizItem>,
    index: usize,
    score: usize,
}

impl QuizSession {
    pub fn new(items: Vec<QuizItem>) -> Self {
        Self { items, index: 0, score: 0 }
    }

    pub fn current(&self) -> Option<&QuizItem> {
        self.items.get(self.index)
    }

    /// 1-based number of the current question
    pub fn position(&self) -> usize {
        (self.index + 1).min(self.items.len())
    }

    /// Answer the current question and move on; `None` once finished
    pub fn answer(&mut self, choice: &str) -> Option<AnswerOutcome> {
        let item = self.items.get(self.index)?;
        let outcome = if item.is_correct(choice) {
            self.score += 1;
            AnswerOutcome::Correct
        } else {
            AnswerOutcome::Incorrect {
                answer: item.answer.clone(),
            }
        };
        self.index += 1;
        Some(outcome)
    }

    pub fn is_finished(&self) -> bool {
        self.index >= self.items.len()
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn total(&self) -> usize {
        self.items.len()
    }

    pub fn percent(&self) -> u32 {
        if self.items.is_empty() {
            return 0;
        }
        (self.score as f64 / self.items.len() as f64 * 100.0).round() as u32
    }

    pub fn feedback(&self) -> &'static str {
        let total = self.items.len() as f64;
        let score = self.score as f64;
        if !self.items.is_empty() && self.score == self.items.len() {
            "Perfect score!"
        } else if !self.items.is_empty() && score >= total * 0.8 {
            "Great job!"
        } else if !self.items.is_empty() && score >= total * 0.6 {
            "Good effort!"
        } else {
            "Keep practicing!"
        }
    }

    pub fn restart(&mut self) {
        self.index = 0;
        self.score = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(answer: &str) -> QuizItem {
        QuizItem {
            question: "?".to_string(),
            options: vec!["a".to_string(), "b".to_string()],
            answer: answer.to_string(),
        }
    }

    fn session(n: usize) -> QuizSession {
        QuizSession::new((0..n).map(|_| item("a")).collect())
    }

    #[test]
    fn test_scoring_and_outcomes() {
        let mut quiz = session(2);
        assert_eq!(quiz.answer("a"), Some(AnswerOutcome::Correct));
        assert_eq!(
            quiz.answer("b"),
            Some(AnswerOutcome::Incorrect { answer: "a".to_string() })
        );
        assert!(quiz.is_finished());
        assert_eq!(quiz.answer("a"), None);
        assert_eq!(quiz.score(), 1);
        assert_eq!(quiz.percent(), 50);
    }

    #[test]
    fn test_feedback_thresholds() {
        let cases = [(5, 5, "Perfect score!"), (4, 5, "Great job!"), (3, 5, "Good effort!"), (2, 5, "Keep practicing!")];
        for (correct, total, expected) in cases {
            let mut quiz = session(total);
            for i in 0..total {
                quiz.answer(if i < correct { "a" } else { "b" });
            }
            assert_eq!(quiz.feedback(), expected, "{}/{}", correct, total);
        }
    }

    #[test]
    fn test_empty_quiz() {
        let quiz = session(0);
        assert!(quiz.is_finished());
        assert_eq!(quiz.percent(), 0);
        assert_eq!(quiz.feedback(), "Keep practicing!");
    }
}
