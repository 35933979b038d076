use std::collections::VecDeque;
use studybuddy_models::{FocusSample, FocusStatus};

/// Samples kept for the rolling view
pub const FOCUS_WINDOW: usize = 30;

/// Bounded window over the most recent feed samples, oldest dropped first
#[derive(Debug, Clone)]
pub struct ScoreWindow {
    samples: VecDeque<FocusSample>,
    capacity: usize,
}

impl Default for ScoreWindow {
    fn default() -> Self {
        Self::new(FOCUS_WINDOW)
    }
}

impl ScoreWindow {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, sample: FocusSample) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn latest(&self) -> Option<&FocusSample> {
        self.samples.back()
    }

    pub fn samples(&self) -> impl Iterator<Item = &FocusSample> {
        self.samples.iter()
    }

    pub fn average(&self) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        Some(self.samples.iter().map(|s| s.score).sum::<f64>() / self.samples.len() as f64)
    }

    pub fn min(&self) -> Option<f64> {
        self.samples.iter().map(|s| s.score).reduce(f64::min)
    }

    pub fn max(&self) -> Option<f64> {
        self.samples.iter().map(|s| s.score).reduce(f64::max)
    }

    /// Status of the latest distraction sample; the feed reports
    /// distraction, so attentiveness is its complement.
    pub fn distraction_status(&self) -> Option<FocusStatus> {
        self.latest().map(|s| FocusStatus::from_score(100.0 - s.score))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_drops_oldest() {
        let mut window = ScoreWindow::default();
        for i in 0..35 {
            window.push(FocusSample::now(i as f64));
        }
        assert_eq!(window.len(), FOCUS_WINDOW);
        assert_eq!(window.samples().next().map(|s| s.score), Some(5.0));
        assert_eq!(window.latest().map(|s| s.score), Some(34.0));
    }

    #[test]
    fn test_statistics() {
        let mut window = ScoreWindow::new(3);
        assert_eq!(window.average(), None);
        for score in [10.0, 20.0, 30.0, 90.0] {
            window.push(FocusSample::now(score));
        }
        assert_eq!(window.average(), Some((20.0 + 30.0 + 90.0) / 3.0));
        assert_eq!(window.min(), Some(20.0));
        assert_eq!(window.max(), Some(90.0));
    }

    #[test]
    fn test_distraction_status_is_complement() {
        let mut window = ScoreWindow::default();
        window.push(FocusSample::now(10.0));
        assert_eq!(window.distraction_status(), Some(FocusStatus::Focused));
        window.push(FocusSample::now(30.0));
        assert_eq!(window.distraction_status(), Some(FocusStatus::MildDistraction));
        window.push(FocusSample::now(75.0));
        assert_eq!(window.distraction_status(), Some(FocusStatus::Distracted));
    }
}
