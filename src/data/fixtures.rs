//! Demo data compiled into the binary
//!
//! 14 quoted lines across Bet365, Unibet and Betsson, and a 22-bet
//! backtest history from January and February 2026.

use super::loader::{parse_history, parse_quotes};
use crate::error::EdgeError;
use crate::models::{HistoricalBet, QuotedLine};

const QUOTES_JSON: &str = include_str!("../../data/quotes.json");
const HISTORY_JSON: &str = include_str!("../../data/backtest_history.json");

/// Bookmakers present in the demo quotes
pub const DEMO_BOOKMAKERS: [&str; 3] = ["Bet365", "Unibet", "Betsson"];

/// Demo quoted lines
pub fn demo_quotes() -> Result<Vec<QuotedLine>, EdgeError> {
    parse_quotes(QUOTES_JSON)
}

/// Demo backtest history, in date order
pub fn demo_history() -> Result<Vec<HistoricalBet>, EdgeError> {
    parse_history(HISTORY_JSON)
}
