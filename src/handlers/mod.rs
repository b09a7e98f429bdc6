pub mod backtest;
pub mod health;
pub mod opportunities;
