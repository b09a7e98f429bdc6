//! Backtest Metrics
//!
//! Calculate metrics such as hit rate, profit factor, drawdown, etc.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::simulator::{BacktestResult, SettledBet};

/// Backtest evaluation metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BacktestMetrics {
    // Basic metrics
    pub total_bets: usize,
    pub winning_bets: usize,
    pub hit_rate: f64,
    pub roi: f64,

    // Expected value related
    pub avg_ev: f64,
    pub avg_odds: f64,
    pub avg_probability: f64,

    // Risk metrics
    pub profit_factor: Option<f64>, // None when there are wins and no losses
    pub max_drawdown: f64,
    pub max_drawdown_pct: f64, // Of the peak bankroll
    pub longest_losing_streak: usize,

    // Win/Loss
    pub gross_profit: f64,
    pub gross_loss: f64,
    pub net_profit: f64,
}

/// Calculate metrics from a finished backtest
pub fn calculate_metrics(result: &BacktestResult) -> BacktestMetrics {
    let bets = &result.bets;
    if bets.is_empty() {
        return BacktestMetrics::default();
    }

    // Basic metrics
    let total_bets = bets.len();
    let winning_bets = bets.iter().filter(|b| b.won).count();
    let hit_rate = winning_bets as f64 / total_bets as f64;

    // Expected value related
    let avg_ev = bets.iter().map(|b| b.expected_value()).sum::<f64>() / total_bets as f64;
    let avg_odds = bets.iter().map(|b| b.odds).sum::<f64>() / total_bets as f64;
    let avg_probability = bets.iter().map(|b| b.model_prob).sum::<f64>() / total_bets as f64;

    // Profit/Loss calculation
    let gross_profit = bets
        .iter()
        .map(|b| b.profit)
        .filter(|&p| p > 0.0)
        .fold(0.0, |acc, p| acc + p);
    let gross_loss = bets
        .iter()
        .map(|b| b.profit)
        .filter(|&p| p < 0.0)
        .fold(0.0, |acc, p| acc - p);
    let net_profit = result.summary.net_profit;

    // Profit Factor
    let profit_factor = if gross_loss > 0.0 {
        Some(gross_profit / gross_loss)
    } else if gross_profit > 0.0 {
        None
    } else {
        Some(0.0)
    };

    // Drawdown over the bankroll curve, starting value included
    let mut peak = result.summary.starting_bankroll;
    let mut max_drawdown = 0.0;
    let mut max_drawdown_pct = 0.0;
    for value in result.bankroll_curve() {
        if value > peak {
            peak = value;
        }
        let drawdown = peak - value;
        if drawdown > max_drawdown {
            max_drawdown = drawdown;
            max_drawdown_pct = drawdown / peak;
        }
    }

    let mut longest_losing_streak = 0;
    let mut streak = 0;
    for bet in bets {
        if bet.won {
            streak = 0;
        } else {
            streak += 1;
            longest_losing_streak = longest_losing_streak.max(streak);
        }
    }

    BacktestMetrics {
        total_bets,
        winning_bets,
        hit_rate,
        roi: result.summary.roi,
        avg_ev,
        avg_odds,
        avg_probability,
        profit_factor,
        max_drawdown,
        max_drawdown_pct,
        longest_losing_streak,
        gross_profit,
        gross_loss,
        net_profit,
    }
}

/// Calculate Sharpe ratio from per-bet returns (profit / stake)
pub fn calculate_sharpe_ratio(bets: &[SettledBet], risk_free_rate: f64) -> f64 {
    let returns: Vec<f64> = bets
        .iter()
        .filter(|b| b.stake > 0.0)
        .map(|b| b.profit / b.stake)
        .collect();

    if returns.is_empty() {
        return 0.0;
    }

    let mean_return: f64 = returns.iter().sum::<f64>() / returns.len() as f64;

    let variance: f64 = returns
        .iter()
        .map(|r| (r - mean_return).powi(2))
        .sum::<f64>()
        / returns.len() as f64;

    let std_return = variance.sqrt();

    if std_return == 0.0 {
        return 0.0;
    }

    (mean_return - risk_free_rate) / std_return
}

/// Analysis results by dimension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionAnalysis {
    pub key: String,
    pub bets: usize,
    pub wins: usize,
    pub hit_rate: f64,
    pub stake: f64,
    pub profit: f64,
    pub roi: f64, // On amount staked
}

fn analyze_groups<K: Ord + ToString>(groups: BTreeMap<K, Vec<&SettledBet>>) -> Vec<DimensionAnalysis> {
    groups
        .into_iter()
        .map(|(key, group)| {
            let total = group.len();
            let wins = group.iter().filter(|b| b.won).count();
            let stake = group.iter().fold(0.0, |acc, b| acc + b.stake);
            let profit = group.iter().fold(0.0, |acc, b| acc + b.profit);

            DimensionAnalysis {
                key: key.to_string(),
                bets: total,
                wins,
                hit_rate: if total > 0 {
                    wins as f64 / total as f64
                } else {
                    0.0
                },
                stake,
                profit,
                roi: if stake > 0.0 { profit / stake } else { 0.0 },
            }
        })
        .collect()
}

/// Analyze bet results by sport
pub fn analyze_by_sport(bets: &[SettledBet]) -> Vec<DimensionAnalysis> {
    let mut grouped: BTreeMap<&str, Vec<&SettledBet>> = BTreeMap::new();
    for bet in bets {
        grouped.entry(bet.sport.name()).or_default().push(bet);
    }
    analyze_groups(grouped)
}

/// Odds band label for a decimal price
pub fn odds_band(odds: f64) -> &'static str {
    if odds < 1.80 {
        "favourite (<1.80)"
    } else if odds < 2.50 {
        "mid (1.80-2.49)"
    } else {
        "outsider (>=2.50)"
    }
}

/// Analyze bet results by odds range
pub fn analyze_by_odds_range(bets: &[SettledBet]) -> Vec<DimensionAnalysis> {
    let mut grouped: BTreeMap<&str, Vec<&SettledBet>> = BTreeMap::new();
    for bet in bets {
        grouped.entry(odds_band(bet.odds)).or_default().push(bet);
    }
    analyze_groups(grouped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backtesting::{run_backtest, BacktestSimulator};
    use crate::models::{HistoricalBet, Sport};
    use chrono::NaiveDate;

    fn record(day: u32, sport: Sport, odds: f64, won: bool) -> HistoricalBet {
        HistoricalBet {
            date: NaiveDate::from_ymd_opt(2026, 2, day).unwrap(),
            event: format!("Event {}", day),
            sport,
            odds,
            model_prob: 0.55,
            stake_fraction: 0.10,
            won,
        }
    }

    fn create_test_result() -> BacktestResult {
        let records = vec![
            record(1, Sport::Football, 2.0, true),  // 1000 -> 1100
            record(2, Sport::Tennis, 1.5, false),   // 1100 -> 990
            record(3, Sport::Tennis, 1.5, false),   // 990 -> 891
            record(4, Sport::Football, 3.0, true),  // 891 -> 1069.2
        ];
        run_backtest(1000.0, &records).unwrap()
    }

    #[test]
    fn test_calculate_metrics() {
        let result = create_test_result();
        let metrics = calculate_metrics(&result);

        assert_eq!(metrics.total_bets, 4);
        assert_eq!(metrics.winning_bets, 2);
        assert!((metrics.hit_rate - 0.5).abs() < 1e-12);
        // 100 + 178.2
        assert!((metrics.gross_profit - 278.2).abs() < 1e-6);
        // 110 + 99
        assert!((metrics.gross_loss - 209.0).abs() < 1e-6);
        assert!((metrics.net_profit - 69.2).abs() < 1e-6);
        assert!((metrics.profit_factor.unwrap() - 278.2 / 209.0).abs() < 1e-6);
        assert!((metrics.avg_odds - 2.0).abs() < 1e-12);
        assert_eq!(metrics.longest_losing_streak, 2);
    }

    #[test]
    fn test_max_drawdown() {
        let result = create_test_result();
        let metrics = calculate_metrics(&result);

        // Peak 1100, trough 891
        assert!((metrics.max_drawdown - 209.0).abs() < 1e-6);
        assert!((metrics.max_drawdown_pct - 0.19).abs() < 1e-9);
    }

    #[test]
    fn test_drawdown_from_starting_bankroll() {
        let result = run_backtest(1000.0, &[record(1, Sport::Tennis, 2.0, false)]).unwrap();
        let metrics = calculate_metrics(&result);

        assert!((metrics.max_drawdown - 100.0).abs() < 1e-9);
        assert!((metrics.max_drawdown_pct - 0.1).abs() < 1e-12);
        assert_eq!(metrics.profit_factor, Some(0.0));
    }

    #[test]
    fn test_profit_factor_without_losses() {
        let result = run_backtest(1000.0, &[record(1, Sport::Tennis, 2.0, true)]).unwrap();
        let metrics = calculate_metrics(&result);
        assert_eq!(metrics.profit_factor, None);
        assert_eq!(metrics.max_drawdown, 0.0);
    }

    #[test]
    fn test_all_wins_result_round_trips_through_json() {
        let records = vec![
            record(1, Sport::Tennis, 2.0, true),
            record(2, Sport::Football, 1.5, true),
        ];
        let result = BacktestSimulator::default().run(&records).unwrap();

        let json = serde_json::to_string(&result).unwrap();
        let parsed: BacktestResult = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.bets.len(), 2);
        assert!((parsed.summary.final_bankroll - 1155.0).abs() < 1e-9);
        assert!(json.contains("\"profit_factor\":null"));
        assert_eq!(parsed.metrics.unwrap().profit_factor, None);
    }

    #[test]
    fn test_wipe_out_has_no_negative_zero() {
        let mut bust = record(1, Sport::Tennis, 2.0, false);
        bust.stake_fraction = 1.0;
        let records = vec![bust, record(2, Sport::Football, 2.0, true)];
        let result = run_backtest(1000.0, &records).unwrap();
        let metrics = calculate_metrics(&result);

        assert_eq!(result.summary.final_bankroll, 0.0);
        assert!(metrics.gross_profit.is_sign_positive());
        assert_eq!(metrics.gross_loss, 1000.0);
        let pf = metrics.profit_factor.unwrap();
        assert!(pf == 0.0 && pf.is_sign_positive());
        assert_eq!(format!("{:.2}", pf), "0.00");

        let football = analyze_by_sport(&result.bets)
            .into_iter()
            .find(|a| a.key == "Football")
            .unwrap();
        assert!(football.profit.is_sign_positive());
    }

    #[test]
    fn test_calculate_metrics_empty() {
        let result = run_backtest(1000.0, &[]).unwrap();
        let metrics = calculate_metrics(&result);

        assert_eq!(metrics.total_bets, 0);
        assert_eq!(metrics.winning_bets, 0);
        assert_eq!(metrics.hit_rate, 0.0);
    }

    #[test]
    fn test_calculate_sharpe_ratio() {
        let result = create_test_result();
        let sharpe = calculate_sharpe_ratio(&result.bets, 0.0);

        // Returns: 1.0, -1.0, -1.0, 2.0 -> mean 0.25
        assert!(sharpe > 0.0);
        assert_eq!(calculate_sharpe_ratio(&[], 0.0), 0.0);
    }

    #[test]
    fn test_analyze_by_sport() {
        let result = create_test_result();
        let analysis = analyze_by_sport(&result.bets);

        assert_eq!(analysis.len(), 2);
        assert_eq!(analysis[0].key, "Football");
        assert_eq!(analysis[0].bets, 2);
        assert_eq!(analysis[0].wins, 2);

        let tennis = analysis.iter().find(|a| a.key == "Tennis").unwrap();
        assert_eq!(tennis.bets, 2);
        assert_eq!(tennis.wins, 0);
        assert!((tennis.roi + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_analyze_by_odds_range() {
        let result = create_test_result();
        let analysis = analyze_by_odds_range(&result.bets);

        // 2.0 (mid), 1.5 (favourite) x2, 3.0 (outsider)
        assert_eq!(analysis.len(), 3);
        let favourites = analysis.iter().find(|a| a.key.starts_with("favourite")).unwrap();
        assert_eq!(favourites.bets, 2);
        assert_eq!(odds_band(2.49), "mid (1.80-2.49)");
        assert_eq!(odds_band(2.50), "outsider (>=2.50)");
    }
}
