//! Backtest Simulator
//!
//! Replay historical bets against a bankroll, one bet at a time

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::metrics::{calculate_metrics, BacktestMetrics};
use crate::core::kelly::KellyCalculator;
use crate::error::{validate_bankroll, EdgeError};
use crate::models::{HistoricalBet, Sport};

/// Bankroll used by the demo backtest
pub const DEFAULT_STARTING_BANKROLL: f64 = 1000.0;

/// A historical bet after settlement against the running bankroll
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettledBet {
    pub index: usize, // 1-based position in the series
    pub date: NaiveDate,
    pub event: String,
    pub sport: Sport,
    pub odds: f64,
    pub model_prob: f64,
    pub stake_fraction: f64,
    pub stake: f64,
    pub profit: f64,
    pub bankroll: f64, // After settlement
    pub won: bool,
}

impl SettledBet {
    pub fn expected_value(&self) -> f64 {
        self.model_prob * self.odds - 1.0
    }
}

/// One point of the equity curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryPoint {
    pub index: usize,
    pub date: Option<NaiveDate>, // None for the starting point
    pub event: Option<String>,
    pub bankroll: f64,
    pub won: bool,
}

/// Headline backtest statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestSummary {
    pub starting_bankroll: f64,
    pub final_bankroll: f64,
    pub net_profit: f64,
    pub roi: f64,      // On starting bankroll
    pub win_rate: f64, // 0 for an empty series
    pub wins: usize,
    pub total_bets: usize,
    pub total_staked: f64,
}

/// Backtest result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    pub bets: Vec<SettledBet>,
    pub summary: BacktestSummary,
    pub metrics: Option<BacktestMetrics>,
}

impl BacktestResult {
    /// Equity curve: the starting point followed by one point per bet
    pub fn trajectory(&self) -> Vec<TrajectoryPoint> {
        let start = TrajectoryPoint {
            index: 0,
            date: None,
            event: None,
            bankroll: self.summary.starting_bankroll,
            won: false,
        };

        std::iter::once(start)
            .chain(self.bets.iter().map(|bet| TrajectoryPoint {
                index: bet.index,
                date: Some(bet.date),
                event: Some(bet.event.clone()),
                bankroll: bet.bankroll,
                won: bet.won,
            }))
            .collect()
    }

    /// Bankroll values only, starting value first
    pub fn bankroll_curve(&self) -> Vec<f64> {
        std::iter::once(self.summary.starting_bankroll)
            .chain(self.bets.iter().map(|b| b.bankroll))
            .collect()
    }

    pub fn finalize(&mut self) {
        self.metrics = Some(calculate_metrics(self));
    }
}

/// Where each bet's stake fraction comes from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StakePolicy {
    /// Use the fraction stored on each record
    #[default]
    Recorded,
    /// Derive the fraction from the record's odds and model probability
    Kelly(KellyCalculator),
}

impl StakePolicy {
    fn stake_fraction(&self, bet: &HistoricalBet) -> Result<f64, EdgeError> {
        match self {
            StakePolicy::Recorded => Ok(bet.stake_fraction),
            StakePolicy::Kelly(kelly) => kelly.stake_fraction(bet.model_prob, bet.odds),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            StakePolicy::Recorded => "recorded stake fractions".to_string(),
            StakePolicy::Kelly(k) => format!(
                "{:.2}x Kelly, capped at {:.1}%",
                k.kelly_multiplier,
                k.max_stake_fraction * 100.0
            ),
        }
    }
}

/// Backtest simulator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestConfig {
    pub starting_bankroll: f64,
    pub stake_policy: StakePolicy,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            starting_bankroll: DEFAULT_STARTING_BANKROLL,
            stake_policy: StakePolicy::Recorded,
        }
    }
}

/// Replay bets with their recorded stake fractions
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use edgefinder::backtesting::run_backtest;
/// use edgefinder::models::{HistoricalBet, Sport};
///
/// let bet = HistoricalBet {
///     date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
///     event: "Man City vs Liverpool".to_string(),
///     sport: Sport::Football,
///     odds: 2.0,
///     model_prob: 0.55,
///     stake_fraction: 0.02,
///     won: true,
/// };
/// let result = run_backtest(1000.0, &[bet]).unwrap();
/// assert!((result.summary.final_bankroll - 1020.0).abs() < 1e-9);
/// ```
pub fn run_backtest(
    starting_bankroll: f64,
    records: &[HistoricalBet],
) -> Result<BacktestResult, EdgeError> {
    simulate(starting_bankroll, StakePolicy::Recorded, records)
}

/// Validate everything, then fold the records into a bankroll path
fn simulate(
    starting_bankroll: f64,
    policy: StakePolicy,
    records: &[HistoricalBet],
) -> Result<BacktestResult, EdgeError> {
    validate_bankroll(starting_bankroll)?;

    // Resolve every stake fraction up front so a bad record rejects the whole input
    let fractions = records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            record
                .validate()
                .and_then(|_| policy.stake_fraction(record))
                .map_err(|e| EdgeError::InvalidRecord {
                    index: i + 1,
                    source: Box::new(e),
                })
        })
        .collect::<Result<Vec<f64>, _>>()?;

    let mut bankroll = starting_bankroll;
    let mut wins = 0usize;
    let mut total_staked = 0.0;
    let mut bets = Vec::with_capacity(records.len());

    for (i, (record, &fraction)) in records.iter().zip(&fractions).enumerate() {
        let stake = bankroll * fraction;
        let profit = if record.won {
            wins += 1;
            stake * (record.odds - 1.0)
        } else {
            -stake
        };
        bankroll += profit;
        total_staked += stake;

        debug!(
            "#{} {} {} stake {:.2} -> bankroll {:.2}",
            i + 1,
            record.date,
            if record.won { "won" } else { "lost" },
            stake,
            bankroll
        );

        bets.push(SettledBet {
            index: i + 1,
            date: record.date,
            event: record.event.clone(),
            sport: record.sport,
            odds: record.odds,
            model_prob: record.model_prob,
            stake_fraction: fraction,
            stake,
            profit,
            bankroll,
            won: record.won,
        });
    }

    let total_bets = bets.len();
    let net_profit = bankroll - starting_bankroll;
    let summary = BacktestSummary {
        starting_bankroll,
        final_bankroll: bankroll,
        net_profit,
        roi: net_profit / starting_bankroll,
        win_rate: if total_bets > 0 {
            wins as f64 / total_bets as f64
        } else {
            0.0
        },
        wins,
        total_bets,
        total_staked,
    };

    Ok(BacktestResult {
        bets,
        summary,
        metrics: None,
    })
}

/// Backtest simulator
pub struct BacktestSimulator {
    pub config: BacktestConfig,
}

impl BacktestSimulator {
    /// Create a new backtest simulator
    pub fn new(config: BacktestConfig) -> Self {
        Self { config }
    }

    /// Run the backtest and attach metrics
    pub fn run(&self, records: &[HistoricalBet]) -> Result<BacktestResult, EdgeError> {
        info!(
            "Backtesting {} bets from bankroll {:.2} using {}",
            records.len(),
            self.config.starting_bankroll,
            self.config.stake_policy.describe()
        );

        let mut result = simulate(
            self.config.starting_bankroll,
            self.config.stake_policy,
            records,
        )?;
        result.finalize();

        info!(
            "Final bankroll {:.2} (ROI {:+.1}%)",
            result.summary.final_bankroll,
            result.summary.roi * 100.0
        );
        Ok(result)
    }

    /// Print summary of backtest result
    pub fn print_summary(&self, result: &BacktestResult) {
        let s = &result.summary;

        println!("\n{}", "=".repeat(60));
        println!("BACKTEST RESULTS");
        println!("{}", "=".repeat(60));
        println!("Staking: {}", self.config.stake_policy.describe());
        println!("Starting bankroll: {:.2}", s.starting_bankroll);
        println!("{}", "-".repeat(60));
        println!("Total bets: {}", s.total_bets);
        println!("Winning bets: {}", s.wins);
        println!("Win rate: {:.1}%", s.win_rate * 100.0);
        println!("Total staked: {:.2}", s.total_staked);
        println!("{}", "-".repeat(60));
        println!("Final bankroll: {:.2}", s.final_bankroll);
        println!("Net profit: {:+.2}", s.net_profit);
        println!("ROI: {:+.1}%", s.roi * 100.0);

        if let Some(ref metrics) = result.metrics {
            println!("{}", "-".repeat(60));
            println!("Average odds: {:.2}", metrics.avg_odds);
            println!("Average EV: {:+.3}", metrics.avg_ev);
            match metrics.profit_factor {
                Some(pf) => println!("Profit factor: {:.2}", pf),
                None => println!("Profit factor: n/a (no losses)"),
            }
            println!(
                "Max drawdown: {:.2} ({:.1}%)",
                metrics.max_drawdown,
                metrics.max_drawdown_pct * 100.0
            );
            println!("Longest losing streak: {}", metrics.longest_losing_streak);
        }

        println!("{}", "=".repeat(60));
    }
}

impl Default for BacktestSimulator {
    fn default() -> Self {
        Self::new(BacktestConfig::default())
    }
}
