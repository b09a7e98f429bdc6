use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::AppState;
use edgefinder::backtesting::{
    analyze_by_sport, BacktestConfig, BacktestMetrics, BacktestSimulator, BacktestSummary,
    DimensionAnalysis, StakePolicy, TrajectoryPoint,
};
use edgefinder::{EdgeError, HistoricalBet};

/// Body for `POST /backtest`
#[derive(Debug, Deserialize)]
pub struct BacktestRequest {
    pub starting_bankroll: Option<f64>,
    pub records: Vec<HistoricalBet>,
    #[serde(default)]
    pub use_kelly: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BacktestResponse {
    pub summary: BacktestSummary,
    pub metrics: Option<BacktestMetrics>,
    pub trajectory: Vec<TrajectoryPoint>,
    pub by_sport: Vec<DimensionAnalysis>,
}

fn simulate(config: BacktestConfig, records: &[HistoricalBet]) -> Result<HttpResponse, EdgeError> {
    let result = BacktestSimulator::new(config).run(records)?;

    Ok(HttpResponse::Ok().json(BacktestResponse {
        trajectory: result.trajectory(),
        by_sport: analyze_by_sport(&result.bets),
        summary: result.summary,
        metrics: result.metrics,
    }))
}

/// Backtest the loaded history with the configured staking
pub async fn run_configured_backtest(
    state: web::Data<Arc<AppState>>,
) -> Result<HttpResponse, EdgeError> {
    simulate(state.config.backtest_config()?, &state.history)
}

/// Backtest a caller-supplied history
pub async fn run_custom_backtest(
    state: web::Data<Arc<AppState>>,
    req: web::Json<BacktestRequest>,
) -> Result<HttpResponse, EdgeError> {
    let stake_policy = if req.use_kelly {
        StakePolicy::Kelly(state.config.kelly_calculator()?)
    } else {
        StakePolicy::Recorded
    };
    let config = BacktestConfig {
        starting_bankroll: req
            .starting_bankroll
            .unwrap_or(state.config.bankroll.backtest_start),
        stake_policy,
    };

    simulate(config, &req.records)
}
