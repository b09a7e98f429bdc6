use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::kelly::KellyCalculator;
use crate::core::odds::{calc_ev, implied_probability};
use crate::error::{validate_odds, validate_probability, validate_stake_fraction, EdgeError};

/// Sport covered by the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Sport {
    #[serde(alias = "football")]
    Football,
    #[serde(alias = "tennis")]
    Tennis,
}

impl Sport {
    pub fn name(&self) -> &'static str {
        match self {
            Sport::Football => "Football",
            Sport::Tennis => "Tennis",
        }
    }
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Sport {
    type Err = EdgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "football" | "soccer" => Ok(Sport::Football),
            "tennis" => Ok(Sport::Tennis),
            _ => Err(EdgeError::InvalidConfig(format!("unknown sport '{}'", s))),
        }
    }
}

/// One bookmaker's price for one outcome of one event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotedLine {
    pub id: String,
    pub sport: Sport,
    pub league: String,
    pub event: String,
    pub market: String, // e.g. "Home Win", "Player 1 Win"
    pub bookmaker: String,
    pub odds: f64,       // Decimal odds offered
    pub model_prob: f64, // Model-estimated win probability
    pub kickoff: DateTime<Utc>,
}

impl QuotedLine {
    /// Check odds and probability without deriving anything
    pub fn validate(&self) -> Result<(), EdgeError> {
        validate_odds(self.odds)
            .and_then(|_| validate_probability(self.model_prob))
            .map_err(|e| EdgeError::InvalidQuote {
                id: self.id.clone(),
                source: Box::new(e),
            })
    }
}

/// A quoted line with its derived betting numbers
///
/// Derived fields are computed once from the owned line. There is no way
/// to change the line's odds or probability without building a new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluatedOpportunity {
    #[serde(flatten)]
    pub line: QuotedLine,
    pub implied_prob: f64,
    pub ev: f64,
    pub kelly: f64, // Recommended stake fraction
}

impl EvaluatedOpportunity {
    /// Evaluate with the default half-Kelly sizing
    pub fn evaluate(line: QuotedLine) -> Result<Self, EdgeError> {
        Self::evaluate_with(line, &KellyCalculator::half_kelly())
    }

    /// Evaluate with a custom Kelly calculator
    pub fn evaluate_with(line: QuotedLine, kelly: &KellyCalculator) -> Result<Self, EdgeError> {
        line.validate()?;

        let wrap = |e: EdgeError| EdgeError::InvalidQuote {
            id: line.id.clone(),
            source: Box::new(e),
        };
        let implied_prob = implied_probability(line.odds).map_err(wrap)?;
        let ev = calc_ev(line.model_prob, line.odds).map_err(wrap)?;
        let kelly = kelly.stake_fraction(line.model_prob, line.odds).map_err(wrap)?;

        Ok(Self {
            line,
            implied_prob,
            ev,
            kelly,
        })
    }

    pub fn is_value_bet(&self) -> bool {
        self.ev > 0.0
    }

    /// Recommended stake amount for the given bankroll
    pub fn stake_amount(&self, bankroll: f64) -> f64 {
        self.kelly * bankroll
    }
}

/// One realized wager in a backtest series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalBet {
    pub date: NaiveDate,
    pub event: String,
    pub sport: Sport,
    pub odds: f64,
    pub model_prob: f64,
    pub stake_fraction: f64, // Of bankroll at the time of the bet
    pub won: bool,
}

impl HistoricalBet {
    pub fn validate(&self) -> Result<(), EdgeError> {
        validate_odds(self.odds)?;
        validate_probability(self.model_prob)?;
        validate_stake_fraction(self.stake_fraction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn arsenal_line(odds: f64, model_prob: f64) -> QuotedLine {
        QuotedLine {
            id: "f1".to_string(),
            sport: Sport::Football,
            league: "Premier League".to_string(),
            event: "Arsenal vs Chelsea".to_string(),
            market: "Home Win".to_string(),
            bookmaker: "Bet365".to_string(),
            odds,
            model_prob,
            kickoff: Utc.with_ymd_and_hms(2026, 2, 22, 15, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_sport_from_str() {
        assert_eq!("Football".parse::<Sport>().unwrap(), Sport::Football);
        assert_eq!("tennis".parse::<Sport>().unwrap(), Sport::Tennis);
        assert!("cricket".parse::<Sport>().is_err());
    }

    #[test]
    fn test_evaluate_opportunity() {
        let opp = EvaluatedOpportunity::evaluate(arsenal_line(2.10, 0.54)).unwrap();

        assert!((opp.implied_prob - 0.47619).abs() < 0.0001);
        assert!((opp.ev - 0.134).abs() < 1e-9);
        assert_eq!(opp.kelly, 0.05);
        assert!(opp.is_value_bet());
        assert!((opp.stake_amount(1000.0) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_evaluate_rejects_invalid_line() {
        let err = EvaluatedOpportunity::evaluate(arsenal_line(1.0, 0.54)).unwrap_err();
        match err {
            EdgeError::InvalidQuote { id, source } => {
                assert_eq!(id, "f1");
                assert!(matches!(*source, EdgeError::InvalidOdds(_)));
            }
            other => panic!("unexpected error: {}", other),
        }

        assert!(EvaluatedOpportunity::evaluate(arsenal_line(2.0, 1.2)).is_err());
    }

    #[test]
    fn test_evaluated_serialization_is_flat() {
        let opp = EvaluatedOpportunity::evaluate(arsenal_line(2.10, 0.54)).unwrap();
        let json = serde_json::to_value(&opp).unwrap();

        assert_eq!(json["bookmaker"], "Bet365");
        assert_eq!(json["sport"], "Football");
        assert!(json.get("line").is_none());
        assert!(json["ev"].as_f64().unwrap() > 0.13);
    }

    #[test]
    fn test_historical_bet_validation() {
        let mut bet = HistoricalBet {
            date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
            event: "Man City vs Liverpool".to_string(),
            sport: Sport::Football,
            odds: 2.15,
            model_prob: 0.52,
            stake_fraction: 0.025,
            won: true,
        };
        assert!(bet.validate().is_ok());

        bet.stake_fraction = 1.5;
        assert!(matches!(
            bet.validate(),
            Err(EdgeError::InvalidStakeFraction(_))
        ));
    }

    #[test]
    fn test_historical_bet_deserialize() {
        let json = r#"{"date":"2026-01-07","event":"Djokovic vs Medvedev","sport":"Tennis",
            "odds":1.90,"model_prob":0.60,"stake_fraction":0.030,"won":true}"#;
        let bet: HistoricalBet = serde_json::from_str(json).unwrap();
        assert_eq!(bet.date, NaiveDate::from_ymd_opt(2026, 1, 7).unwrap());
        assert_eq!(bet.sport, Sport::Tennis);
        assert!(bet.won);
    }
}
