//! Odds conversions and expected value
//!
//! Decimal odds include the returned stake: a winning 1.0 unit bet at
//! odds `o` pays back `o` units.
//!
//! ```text
//! implied probability = 1 / o
//! EV                  = p * o - 1
//! ```
//!
//! EV is expressed per unit staked, so 0.134 means a 13.4% edge.

use crate::error::{validate_odds, validate_probability, EdgeError};

/// Convert decimal odds to the probability the price encodes
///
/// The result includes the bookmaker margin, so implied probabilities of
/// all outcomes of one market sum to more than 1.
///
/// # Examples
/// ```
/// use edgefinder::core::odds::implied_probability;
/// let p = implied_probability(2.5).unwrap();
/// assert!((p - 0.4).abs() < 1e-12);
/// ```
pub fn implied_probability(decimal_odds: f64) -> Result<f64, EdgeError> {
    validate_odds(decimal_odds)?;
    Ok(1.0 / decimal_odds)
}

/// Expected value per unit staked
///
/// # Arguments
/// * `model_prob` - Model-estimated probability of winning (0-1)
/// * `decimal_odds` - Bookmaker decimal odds (> 1.0)
///
/// # Returns
/// EV; positive values are value bets
///
/// # Examples
/// ```
/// use edgefinder::core::odds::calc_ev;
/// let ev = calc_ev(0.54, 2.10).unwrap();
/// assert!((ev - 0.134).abs() < 1e-9);
/// ```
pub fn calc_ev(model_prob: f64, decimal_odds: f64) -> Result<f64, EdgeError> {
    validate_probability(model_prob)?;
    validate_odds(decimal_odds)?;
    Ok(model_prob * decimal_odds - 1.0)
}

/// True when the model probability beats the market-implied probability
pub fn is_value_bet(model_prob: f64, decimal_odds: f64) -> Result<bool, EdgeError> {
    Ok(calc_ev(model_prob, decimal_odds)? > 0.0)
}
