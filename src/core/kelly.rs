//! Kelly Criterion Bet Sizing
//!
//! Stake sizing based on edge and odds using the Kelly criterion.
//!
//! The Kelly criterion formula:
//!     f* = (b*p - q) / b
//!
//! Where:
//!     f* = fraction of bankroll to bet
//!     b = odds - 1 (net odds)
//!     p = probability of winning
//!     q = 1 - p (probability of losing)
//!
//! Recommended stakes use half Kelly capped at 5% of bankroll.

use serde::{Deserialize, Serialize};

use crate::core::odds::{calc_ev, implied_probability};
use crate::error::{validate_odds, validate_probability, EdgeError};

/// Fraction of full Kelly used for recommendations
pub const HALF_KELLY: f64 = 0.5;

/// Largest fraction of bankroll ever recommended for a single bet
pub const MAX_STAKE_FRACTION: f64 = 0.05;

/// Bet sizing recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BetSizing {
    pub probability: f64,
    pub odds: f64,
    pub implied_probability: f64,
    pub expected_value: f64,       // p * odds - 1
    pub kelly_fraction: f64,       // Full Kelly, may be negative
    pub recommended_fraction: f64, // After multiplier and cap
}

impl BetSizing {
    /// Stake amount for a given bankroll
    pub fn stake_for(&self, bankroll: f64) -> f64 {
        bankroll * self.recommended_fraction
    }
}

/// Calculate the full Kelly fraction for a single bet
///
/// # Arguments
/// * `probability` - Estimated probability of winning (0-1)
/// * `odds` - Decimal odds (> 1.0)
///
/// # Returns
/// Kelly fraction (negative when EV < 0)
///
/// # Examples
/// ```
/// use edgefinder::core::kelly::kelly_fraction;
/// let kelly = kelly_fraction(0.5, 3.0).unwrap(); // (2 * 0.5 - 0.5) / 2
/// assert!((kelly - 0.25).abs() < 1e-12);
/// ```
pub fn kelly_fraction(probability: f64, odds: f64) -> Result<f64, EdgeError> {
    validate_probability(probability)?;
    validate_odds(odds)?;

    let b = odds - 1.0;
    let q = 1.0 - probability;
    Ok((b * probability - q) / b)
}

/// Recommended stake as a fraction of bankroll: half Kelly, clamped to [0, 0.05]
///
/// # Examples
/// ```
/// use edgefinder::core::kelly::kelly_stake;
/// // Full Kelly ≈ 0.123, half ≈ 0.0615, capped at 5%
/// assert_eq!(kelly_stake(0.54, 2.10).unwrap(), 0.05);
/// // No edge, no stake
/// assert_eq!(kelly_stake(0.40, 2.00).unwrap(), 0.0);
/// ```
pub fn kelly_stake(probability: f64, odds: f64) -> Result<f64, EdgeError> {
    let kelly = kelly_fraction(probability, odds)?;
    Ok(clamp_fraction(kelly * HALF_KELLY, MAX_STAKE_FRACTION))
}

fn clamp_fraction(fraction: f64, cap: f64) -> f64 {
    fraction.max(0.0).min(cap)
}

/// Kelly criterion calculator for bet sizing
///
/// Supports:
/// - Full Kelly (multiplier 1.0)
/// - Fractional Kelly (default half)
/// - A hard per-bet cap on the bankroll fraction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KellyCalculator {
    pub kelly_multiplier: f64,
    pub max_stake_fraction: f64,
}

impl KellyCalculator {
    /// Create a new Kelly calculator
    ///
    /// # Arguments
    /// * `kelly_multiplier` - Fraction of Kelly to use (0.5 = half Kelly)
    /// * `max_stake_fraction` - Maximum single bet as a fraction of bankroll
    pub fn new(kelly_multiplier: f64, max_stake_fraction: f64) -> Result<Self, EdgeError> {
        if !kelly_multiplier.is_finite() || kelly_multiplier <= 0.0 || kelly_multiplier > 1.0 {
            return Err(EdgeError::InvalidConfig(format!(
                "kelly_multiplier must be in (0, 1], got {}",
                kelly_multiplier
            )));
        }
        if !(0.0..=1.0).contains(&max_stake_fraction) {
            return Err(EdgeError::InvalidConfig(format!(
                "max_stake_fraction must be in [0, 1], got {}",
                max_stake_fraction
            )));
        }

        Ok(Self {
            kelly_multiplier,
            max_stake_fraction,
        })
    }

    /// Half Kelly capped at 5%, the dashboard's recommendation policy
    pub fn half_kelly() -> Self {
        Self {
            kelly_multiplier: HALF_KELLY,
            max_stake_fraction: MAX_STAKE_FRACTION,
        }
    }

    /// Calculate bet sizing for a single bet
    pub fn calculate_single(&self, probability: f64, odds: f64) -> Result<BetSizing, EdgeError> {
        let kelly = kelly_fraction(probability, odds)?;
        let recommended = clamp_fraction(kelly * self.kelly_multiplier, self.max_stake_fraction);

        Ok(BetSizing {
            probability,
            odds,
            implied_probability: implied_probability(odds)?,
            expected_value: calc_ev(probability, odds)?,
            kelly_fraction: kelly,
            recommended_fraction: recommended,
        })
    }

    /// Recommended stake fraction only
    pub fn stake_fraction(&self, probability: f64, odds: f64) -> Result<f64, EdgeError> {
        Ok(self.calculate_single(probability, odds)?.recommended_fraction)
    }

    /// Recommended stake amount for the given bankroll
    pub fn stake_amount(&self, probability: f64, odds: f64, bankroll: f64) -> Result<f64, EdgeError> {
        Ok(self.calculate_single(probability, odds)?.stake_for(bankroll))
    }
}

impl Default for KellyCalculator {
    fn default() -> Self {
        Self::half_kelly()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kelly_fraction_positive_ev() {
        // b = 1.10, q = 0.46: (1.10 * 0.54 - 0.46) / 1.10 ≈ 0.1218
        let kelly = kelly_fraction(0.54, 2.10).unwrap();
        assert!((kelly - 0.121818).abs() < 0.0001);
    }

    #[test]
    fn test_kelly_fraction_negative_ev() {
        let kelly = kelly_fraction(0.10, 5.0).unwrap();
        assert!(kelly < 0.0);
    }

    #[test]
    fn test_kelly_fraction_rejects_even_money_zero() {
        // b = 0 would divide by zero
        assert!(matches!(
            kelly_fraction(0.5, 1.0),
            Err(EdgeError::InvalidOdds(_))
        ));
    }

    #[test]
    fn test_kelly_stake_capped() {
        // half Kelly ≈ 0.0609 > 0.05
        let stake = kelly_stake(0.54, 2.10).unwrap();
        assert_eq!(stake, 0.05);
    }

    #[test]
    fn test_kelly_stake_below_cap() {
        // Full Kelly = (1.0 * 0.52 - 0.48) / 1.0 = 0.04, half = 0.02
        let stake = kelly_stake(0.52, 2.0).unwrap();
        assert!((stake - 0.02).abs() < 1e-12);
    }

    #[test]
    fn test_kelly_stake_never_negative() {
        assert_eq!(kelly_stake(0.10, 5.0).unwrap(), 0.0);
        assert_eq!(kelly_stake(0.0, 1.5).unwrap(), 0.0);
    }

    #[test]
    fn test_kelly_stake_bounds_at_extremes() {
        assert_eq!(kelly_stake(1.0, 100.0).unwrap(), MAX_STAKE_FRACTION);
        assert_eq!(kelly_stake(1.0, 1.0001).unwrap(), MAX_STAKE_FRACTION);
        assert_eq!(kelly_stake(0.0, 100.0).unwrap(), 0.0);
    }

    #[test]
    fn test_kelly_stake_monotonic_in_probability() {
        for &odds in &[1.3, 1.8, 2.1, 3.6, 10.0] {
            let mut previous = 0.0;
            for i in 0..=200 {
                let p = i as f64 / 200.0;
                let stake = kelly_stake(p, odds).unwrap();
                assert!((0.0..=MAX_STAKE_FRACTION).contains(&stake));
                assert!(stake >= previous, "p={} odds={}", p, odds);
                previous = stake;
            }
        }
    }

    #[test]
    fn test_calculator_single() {
        let calc = KellyCalculator::half_kelly();
        let sizing = calc.calculate_single(0.54, 2.10).unwrap();

        assert!((sizing.expected_value - 0.134).abs() < 1e-9);
        assert!((sizing.implied_probability - 1.0 / 2.10).abs() < 1e-12);
        assert!(sizing.kelly_fraction > 0.12);
        assert_eq!(sizing.recommended_fraction, 0.05);
        assert!((sizing.stake_for(1000.0) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_calculator_matches_kelly_stake() {
        let calc = KellyCalculator::default();
        for &(p, o) in &[(0.54, 2.10), (0.31, 3.60), (0.70, 1.55), (0.22, 5.20)] {
            assert_eq!(
                calc.stake_fraction(p, o).unwrap(),
                kelly_stake(p, o).unwrap()
            );
        }
    }

    #[test]
    fn test_calculator_full_kelly_uncapped() {
        let calc = KellyCalculator::new(1.0, 1.0).unwrap();
        let sizing = calc.calculate_single(0.5, 3.0).unwrap();
        assert!((sizing.recommended_fraction - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_calculator_new_rejects_bad_settings() {
        assert!(KellyCalculator::new(0.0, 0.05).is_err());
        assert!(KellyCalculator::new(1.5, 0.05).is_err());
        assert!(KellyCalculator::new(0.5, 1.2).is_err());
        assert!(KellyCalculator::new(0.25, 0.10).is_ok());
    }

    #[test]
    fn test_stake_amount() {
        let calc = KellyCalculator::half_kelly();
        let amount = calc.stake_amount(0.52, 2.0, 1000.0).unwrap();
        assert!((amount - 20.0).abs() < 1e-9);
    }
}
