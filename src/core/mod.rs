//! Core betting math

pub mod kelly;
pub mod odds;

// Re-export commonly used types
pub use kelly::{kelly_fraction, kelly_stake, BetSizing, KellyCalculator};
pub use odds::{calc_ev, implied_probability, is_value_bet};
