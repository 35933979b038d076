use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("watch progress must be between 0 and 100, got {0}")]
pub struct InvalidProgress(pub f64);

/// Percentage of a video that has been watched, always within `[0, 100]`
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize)]
#[serde(transparent)]
pub struct WatchProgress(f64);

impl WatchProgress {
    pub const ZERO: WatchProgress = WatchProgress(0.0);
    pub const COMPLETE: WatchProgress = WatchProgress(100.0);

    pub fn new(percent: f64) -> Result<Self, InvalidProgress> {
        if percent.is_nan() || !(0.0..=100.0).contains(&percent) {
            return Err(InvalidProgress(percent));
        }
        Ok(Self(percent))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn is_complete(&self) -> bool {
        self.0 >= 100.0
    }
}

impl std::fmt::Display for WatchProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0.round())
    }
}

impl std::str::FromStr for WatchProgress {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim().trim_end_matches('%');
        let value: f64 = raw.parse().map_err(|_| format!("not a number: {}", s))?;
        WatchProgress::new(value).map_err(|e| e.to_string())
    }
}

// Stored documents may carry a null or missing progress; both mean 0.
// Other writers do not bound progress, so stored values are clamped rather
// than rejected.
impl<'de> Deserialize<'de> for WatchProgress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0);
        if !raw.is_finite() {
            return Err(serde::de::Error::custom(InvalidProgress(raw)));
        }
        Ok(Self(raw.clamp(0.0, 100.0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_out_of_range() {
        assert!(WatchProgress::new(-1.0).is_err());
        assert!(WatchProgress::new(100.5).is_err());
        assert!(WatchProgress::new(f64::NAN).is_err());
        assert_eq!(WatchProgress::new(42.5).unwrap().value(), 42.5);
    }

    #[test]
    fn test_stored_value_out_of_range_is_clamped() {
        let over: WatchProgress = serde_json::from_str("100.4").unwrap();
        assert_eq!(over, WatchProgress::COMPLETE);
        let under: WatchProgress = serde_json::from_str("-2").unwrap();
        assert_eq!(under, WatchProgress::ZERO);
        let missing: WatchProgress = serde_json::from_str("null").unwrap();
        assert_eq!(missing, WatchProgress::ZERO);
        assert!(serde_json::from_str::<WatchProgress>("\"half\"").is_err());
        // Writes stay strict
        assert!(WatchProgress::new(100.4).is_err());
    }

    #[test]
    fn test_parse_with_percent_sign() {
        let p: WatchProgress = "75%".parse().unwrap();
        assert_eq!(p.value(), 75.0);
        assert!("abc".parse::<WatchProgress>().is_err());
        assert!("101".parse::<WatchProgress>().is_err());
    }
}
