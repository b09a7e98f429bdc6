//! Opportunity scanning
//!
//! Evaluates quoted lines and applies an immutable filter/sort query. The
//! query is a plain value: callers that want to "toggle" a sort column build
//! a new query with [`OpportunityQuery::toggle_sort`].

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::core::kelly::KellyCalculator;
use crate::error::EdgeError;
use crate::models::{EvaluatedOpportunity, QuotedLine, Sport};

/// Column an opportunity list can be sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Id,
    Sport,
    League,
    Event,
    Market,
    Bookmaker,
    Odds,
    ModelProb,
    ImpliedProb,
    Ev,
    Kelly,
    Kickoff,
}

impl SortKey {
    pub fn name(&self) -> &'static str {
        match self {
            SortKey::Id => "id",
            SortKey::Sport => "sport",
            SortKey::League => "league",
            SortKey::Event => "event",
            SortKey::Market => "market",
            SortKey::Bookmaker => "bookmaker",
            SortKey::Odds => "odds",
            SortKey::ModelProb => "model_prob",
            SortKey::ImpliedProb => "implied_prob",
            SortKey::Ev => "ev",
            SortKey::Kelly => "kelly",
            SortKey::Kickoff => "kickoff",
        }
    }

    /// Ascending comparison of two opportunities on this column
    fn compare(&self, a: &EvaluatedOpportunity, b: &EvaluatedOpportunity) -> Ordering {
        match self {
            SortKey::Id => a.line.id.cmp(&b.line.id),
            SortKey::Sport => a.line.sport.name().cmp(b.line.sport.name()),
            SortKey::League => a.line.league.cmp(&b.line.league),
            SortKey::Event => a.line.event.cmp(&b.line.event),
            SortKey::Market => a.line.market.cmp(&b.line.market),
            SortKey::Bookmaker => a.line.bookmaker.cmp(&b.line.bookmaker),
            SortKey::Odds => a.line.odds.total_cmp(&b.line.odds),
            SortKey::ModelProb => a.line.model_prob.total_cmp(&b.line.model_prob),
            SortKey::ImpliedProb => a.implied_prob.total_cmp(&b.implied_prob),
            SortKey::Ev => a.ev.total_cmp(&b.ev),
            SortKey::Kelly => a.kelly.total_cmp(&b.kelly),
            SortKey::Kickoff => a.line.kickoff.cmp(&b.line.kickoff),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SortKey {
    type Err = EdgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = match s.to_lowercase().replace('-', "_").as_str() {
            "id" => SortKey::Id,
            "sport" => SortKey::Sport,
            "league" => SortKey::League,
            "event" => SortKey::Event,
            "market" => SortKey::Market,
            "bookmaker" => SortKey::Bookmaker,
            "odds" => SortKey::Odds,
            "model_prob" | "model" => SortKey::ModelProb,
            "implied_prob" | "implied" => SortKey::ImpliedProb,
            "ev" => SortKey::Ev,
            "kelly" | "stake" => SortKey::Kelly,
            "kickoff" => SortKey::Kickoff,
            _ => return Err(EdgeError::InvalidConfig(format!("unknown sort key '{}'", s))),
        };
        Ok(key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl FromStr for SortDirection {
    type Err = EdgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Asc),
            "desc" | "descending" => Ok(SortDirection::Desc),
            _ => Err(EdgeError::InvalidConfig(format!(
                "unknown sort direction '{}'",
                s
            ))),
        }
    }
}

/// Filter and sort settings for an opportunity list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpportunityQuery {
    pub sport: Option<Sport>,
    pub bookmaker: Option<String>,
    pub only_positive_ev: bool,
    pub sort_key: SortKey,
    pub sort_direction: SortDirection,
}

impl Default for OpportunityQuery {
    fn default() -> Self {
        Self {
            sport: None,
            bookmaker: None,
            only_positive_ev: false,
            sort_key: SortKey::Ev,
            sort_direction: SortDirection::Desc,
        }
    }
}

impl OpportunityQuery {
    /// Query with the sort column toggled
    ///
    /// Clicking the active column while descending switches to ascending;
    /// any other click selects that column descending.
    pub fn toggle_sort(&self, key: SortKey) -> Self {
        let sort_direction =
            if self.sort_key == key && self.sort_direction == SortDirection::Desc {
                SortDirection::Asc
            } else {
                SortDirection::Desc
            };

        Self {
            sort_key: key,
            sort_direction,
            ..self.clone()
        }
    }

    fn matches(&self, opp: &EvaluatedOpportunity) -> bool {
        if let Some(sport) = self.sport {
            if opp.line.sport != sport {
                return false;
            }
        }
        if let Some(ref bookmaker) = self.bookmaker {
            if !opp.line.bookmaker.eq_ignore_ascii_case(bookmaker) {
                return false;
            }
        }
        !self.only_positive_ev || opp.is_value_bet()
    }
}

/// Evaluate a single quoted line with half-Kelly sizing
pub fn evaluate(line: QuotedLine) -> Result<EvaluatedOpportunity, EdgeError> {
    EvaluatedOpportunity::evaluate(line)
}

/// Evaluate every line, failing on the first invalid one
pub fn evaluate_all(lines: &[QuotedLine]) -> Result<Vec<EvaluatedOpportunity>, EdgeError> {
    evaluate_all_with(lines, &KellyCalculator::half_kelly())
}

/// Evaluate every line with a custom Kelly calculator
pub fn evaluate_all_with(
    lines: &[QuotedLine],
    kelly: &KellyCalculator,
) -> Result<Vec<EvaluatedOpportunity>, EdgeError> {
    let opportunities = lines
        .iter()
        .cloned()
        .map(|line| EvaluatedOpportunity::evaluate_with(line, kelly))
        .collect::<Result<Vec<_>, _>>()?;

    debug!("Evaluated {} quoted lines", opportunities.len());
    Ok(opportunities)
}

/// Filter and sort opportunities, returning a new list
///
/// Sorting is stable, so ties keep their input order.
pub fn apply_query(
    opportunities: &[EvaluatedOpportunity],
    query: &OpportunityQuery,
) -> Vec<EvaluatedOpportunity> {
    let mut rows: Vec<EvaluatedOpportunity> = opportunities
        .iter()
        .filter(|opp| query.matches(opp))
        .cloned()
        .collect();

    rows.sort_by(|a, b| {
        let ord = query.sort_key.compare(a, b);
        match query.sort_direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });

    rows
}

/// Headline numbers for a scanned market list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanSummary {
    pub markets_scanned: usize,
    pub positive_ev: usize,
    pub avg_edge: f64,         // Mean EV over positive-EV markets
    pub max_stake_amount: f64, // Largest recommended stake for the bankroll
    pub bankroll: f64,
}

impl ScanSummary {
    pub fn from_opportunities(opportunities: &[EvaluatedOpportunity], bankroll: f64) -> Self {
        let positive: Vec<f64> = opportunities
            .iter()
            .filter(|o| o.is_value_bet())
            .map(|o| o.ev)
            .collect();

        let avg_edge = if positive.is_empty() {
            0.0
        } else {
            positive.iter().sum::<f64>() / positive.len() as f64
        };

        let max_stake_amount = opportunities
            .iter()
            .map(|o| o.stake_amount(bankroll))
            .fold(0.0, f64::max);

        Self {
            markets_scanned: opportunities.len(),
            positive_ev: positive.len(),
            avg_edge,
            max_stake_amount,
            bankroll,
        }
    }
}
