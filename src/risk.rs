//! Maps a default probability onto a risk tier.

use crate::models::RiskTier;

/// Probabilities below this are low risk.
pub const MEDIUM_THRESHOLD: f64 = 0.30;

/// Probabilities at or above this are high risk.
pub const HIGH_THRESHOLD: f64 = 0.60;

/// Discretizes a probability of default.
///
/// Each band is closed on its lower bound: `0.30` is medium and `0.60` is
/// high.
pub fn tier(probability: f64) -> RiskTier {
    if probability < MEDIUM_THRESHOLD {
        RiskTier::Low
    } else if probability < HIGH_THRESHOLD {
        RiskTier::Medium
    } else {
        RiskTier::High
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bands() {
        assert_eq!(tier(0.0), RiskTier::Low);
        assert_eq!(tier(0.15), RiskTier::Low);
        assert_eq!(tier(0.45), RiskTier::Medium);
        assert_eq!(tier(0.75), RiskTier::High);
        assert_eq!(tier(1.0), RiskTier::High);
    }

    #[test]
    fn test_boundaries_belong_to_upper_tier() {
        assert_eq!(tier(0.30), RiskTier::Medium);
        assert_eq!(tier(0.60), RiskTier::High);
        assert_eq!(tier(0.299_999_999), RiskTier::Low);
        assert_eq!(tier(0.599_999_999), RiskTier::Medium);
    }
}
