use serde::{Serialize, Serializer};

use crate::error::{Result, ScoringError};
use crate::scoring::normalize::MAX_SCORE;

/// Livability tier of a composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    Excellent,
    Good,
    Average,
    BelowAverage,
    Poor,
}

impl Tier {
    pub const ALL: [Tier; 5] = [
        Tier::Excellent,
        Tier::Good,
        Tier::Average,
        Tier::BelowAverage,
        Tier::Poor,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Tier::Excellent => "Excellent",
            Tier::Good => "Good",
            Tier::Average => "Average",
            Tier::BelowAverage => "Below Average",
            Tier::Poor => "Poor",
        }
    }
}

impl Serialize for Tier {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Converts a composite score (0.0–10.0) into a tier.
///
/// | Range        | Tier          |
/// |--------------|---------------|
/// | [8.0, 10.0]  | Excellent     |
/// | [7.0, 8.0)   | Good          |
/// | [6.0, 7.0)   | Average       |
/// | [5.0, 6.0)   | Below Average |
/// | [0.0, 5.0)   | Poor          |
///
/// # Errors
///
/// Returns [`ScoringError::OutOfRange`] for scores outside [0, 10] or NaN.
pub fn classify(score: f64) -> Result<Tier> {
    if !(0.0..=MAX_SCORE).contains(&score) {
        return Err(ScoringError::OutOfRange {
            field: "composite_score".to_string(),
            value: score,
        });
    }

    Ok(match score {
        s if s >= 8.0 => Tier::Excellent,
        s if s >= 7.0 => Tier::Good,
        s if s >= 6.0 => Tier::Average,
        s if s >= 5.0 => Tier::BelowAverage,
        _ => Tier::Poor,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(classify(10.0).unwrap(), Tier::Excellent);
        assert_eq!(classify(8.0).unwrap(), Tier::Excellent);
        assert_eq!(classify(7.999).unwrap(), Tier::Good);
        assert_eq!(classify(7.0).unwrap(), Tier::Good);
        assert_eq!(classify(6.999).unwrap(), Tier::Average);
        assert_eq!(classify(6.0).unwrap(), Tier::Average);
        assert_eq!(classify(5.999).unwrap(), Tier::BelowAverage);
        assert_eq!(classify(5.0).unwrap(), Tier::BelowAverage);
        assert_eq!(classify(4.999).unwrap(), Tier::Poor);
        assert_eq!(classify(0.0).unwrap(), Tier::Poor);
    }

    #[test]
    fn test_out_of_range() {
        assert!(matches!(
            classify(10.5),
            Err(ScoringError::OutOfRange { .. })
        ));
        assert!(classify(-0.1).is_err());
        assert!(classify(f64::NAN).is_err());
    }

    #[test]
    fn test_labels() {
        assert_eq!(Tier::BelowAverage.label(), "Below Average");
        assert_eq!(
            serde_json::to_string(&Tier::BelowAverage).unwrap(),
            "\"Below Average\""
        );
    }
}
