use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;

use crate::AppState;
use edgefinder::scanner::{apply_query, evaluate_all_with};
use edgefinder::{
    EdgeError, EvaluatedOpportunity, OpportunityQuery, QuotedLine, ScanSummary, SortDirection,
    SortKey, Sport,
};

/// Query string for `GET /opportunities`
#[derive(Debug, Default, Deserialize)]
pub struct OpportunityParams {
    pub sport: Option<String>,
    pub bookmaker: Option<String>,
    #[serde(default)]
    pub only_positive_ev: bool,
    pub sort: Option<SortKey>,
    pub dir: Option<SortDirection>,
}

/// Empty values and "All" mean no filter
fn filter_value(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
}

impl OpportunityParams {
    fn into_query(self) -> Result<OpportunityQuery, EdgeError> {
        let defaults = OpportunityQuery::default();
        let sport = filter_value(self.sport)
            .map(|s| Sport::from_str(&s))
            .transpose()?;

        Ok(OpportunityQuery {
            sport,
            bookmaker: filter_value(self.bookmaker),
            only_positive_ev: self.only_positive_ev,
            sort_key: self.sort.unwrap_or(defaults.sort_key),
            sort_direction: self.dir.unwrap_or(defaults.sort_direction),
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OpportunitiesResponse {
    pub summary: ScanSummary,
    pub query: OpportunityQuery,
    pub opportunities: Vec<EvaluatedOpportunity>,
}

/// List the loaded opportunities, filtered and sorted
pub async fn list_opportunities(
    state: web::Data<Arc<AppState>>,
    params: web::Query<OpportunityParams>,
) -> Result<HttpResponse, EdgeError> {
    let query = params.into_inner().into_query()?;
    let summary = ScanSummary::from_opportunities(&state.opportunities, state.config.bankroll.current);
    let opportunities = apply_query(&state.opportunities, &query);

    Ok(HttpResponse::Ok().json(OpportunitiesResponse {
        summary,
        query,
        opportunities,
    }))
}

/// Evaluate caller-supplied quoted lines, sorted by EV descending
pub async fn evaluate_opportunities(
    state: web::Data<Arc<AppState>>,
    req: web::Json<Vec<QuotedLine>>,
) -> Result<HttpResponse, EdgeError> {
    let kelly = state.config.kelly_calculator()?;
    let evaluated = evaluate_all_with(&req, &kelly)?;

    let query = OpportunityQuery::default();
    let summary = ScanSummary::from_opportunities(&evaluated, state.config.bankroll.current);
    let opportunities = apply_query(&evaluated, &query);

    Ok(HttpResponse::Ok().json(OpportunitiesResponse {
        summary,
        query,
        opportunities,
    }))
}
