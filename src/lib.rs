//! EdgeFinder - value bet detection for sports betting
//!
//! This library provides:
//! - Implied probability and expected value from decimal odds
//! - Half-Kelly stake sizing capped at 5% of bankroll
//! - Filtering and sorting of evaluated opportunities
//! - Bankroll backtests over historical bet series
//!
//! # Example
//!
//! ```
//! use edgefinder::core::{calc_ev, kelly_stake};
//! use edgefinder::backtesting::run_backtest;
//! use edgefinder::data::demo_history;
//!
//! let ev = calc_ev(0.54, 2.10).unwrap();
//! assert!(ev > 0.0);
//! assert_eq!(kelly_stake(0.54, 2.10).unwrap(), 0.05);
//!
//! let result = run_backtest(1000.0, &demo_history().unwrap()).unwrap();
//! println!("ROI: {:.1}%", result.summary.roi * 100.0);
//! ```

pub mod backtesting;
pub mod config;
pub mod core;
pub mod data;
pub mod error;
pub mod models;
pub mod scanner;

// Re-export commonly used types
pub use backtesting::{run_backtest, BacktestResult, BacktestSummary, StakePolicy};
pub use config::AppConfig;
pub use error::EdgeError;
pub use models::{EvaluatedOpportunity, HistoricalBet, QuotedLine, Sport};
pub use scanner::{apply_query, evaluate_all, OpportunityQuery, ScanSummary, SortDirection, SortKey};
