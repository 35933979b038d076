use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Attentiveness classification derived from a 0-100 score
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FocusStatus {
    Focused,
    MildDistraction,
    Distracted,
}

impl FocusStatus {
    /// Three-band classification used for the distraction feed
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            FocusStatus::Focused
        } else if score >= 60.0 {
            FocusStatus::MildDistraction
        } else {
            FocusStatus::Distracted
        }
    }

    /// Two-band classification used for the concentration score feed
    pub fn from_concentration(score: f64) -> Self {
        if score <= 40.0 {
            FocusStatus::Distracted
        } else {
            FocusStatus::Focused
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FocusStatus::Focused => "Focused",
            FocusStatus::MildDistraction => "Mild Distraction",
            FocusStatus::Distracted => "Distracted",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FocusSample {
    pub score: f64,
    pub received_at: DateTime<Utc>,
}

impl FocusSample {
    pub fn now(score: f64) -> Self {
        Self { score, received_at: Utc::now() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_band_thresholds() {
        assert_eq!(FocusStatus::from_score(80.0), FocusStatus::Focused);
        assert_eq!(FocusStatus::from_score(79.9), FocusStatus::MildDistraction);
        assert_eq!(FocusStatus::from_score(60.0), FocusStatus::MildDistraction);
        assert_eq!(FocusStatus::from_score(59.0), FocusStatus::Distracted);
    }

    #[test]
    fn test_two_band_thresholds() {
        assert_eq!(FocusStatus::from_concentration(40.0), FocusStatus::Distracted);
        assert_eq!(FocusStatus::from_concentration(40.5), FocusStatus::Focused);
    }
}
