//! Backtesting engine for replaying historical bets

pub mod metrics;
pub mod simulator;

pub use metrics::{
    analyze_by_odds_range, analyze_by_sport, calculate_metrics, calculate_sharpe_ratio,
    BacktestMetrics, DimensionAnalysis,
};
pub use simulator::{
    run_backtest, BacktestConfig, BacktestResult, BacktestSimulator, BacktestSummary, SettledBet,
    StakePolicy, TrajectoryPoint, DEFAULT_STARTING_BANKROLL,
};
