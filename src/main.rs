use actix_web::{middleware, web, App, HttpServer};
use anyhow::Context;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod handlers;

use edgefinder::data::{demo_history, demo_quotes, load_history, load_quotes};
use edgefinder::{AppConfig, EvaluatedOpportunity, HistoricalBet, QuotedLine};
use handlers::{backtest, health, opportunities};

/// Application state shared across handlers
pub struct AppState {
    pub config: AppConfig,
    pub opportunities: Vec<EvaluatedOpportunity>,
    pub history: Vec<HistoricalBet>,
}

impl AppState {
    /// Build state from configuration, falling back to the demo fixtures
    pub fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let quotes: Vec<QuotedLine> = match config.data.quotes_path {
            Some(ref path) => {
                load_quotes(path).with_context(|| format!("Failed to load quotes from {}", path))?
            }
            None => {
                warn!("No quotes file configured, serving demo quotes");
                demo_quotes()?
            }
        };

        let history = match config.data.history_path {
            Some(ref path) => load_history(path)
                .with_context(|| format!("Failed to load history from {}", path))?,
            None => demo_history()?,
        };

        let kelly = config.kelly_calculator()?;
        let opportunities = edgefinder::scanner::evaluate_all_with(&quotes, &kelly)?;

        Ok(Self {
            config,
            opportunities,
            history,
        })
    }

    /// Demo state with default configuration
    #[cfg(test)]
    pub fn demo() -> Self {
        Self {
            config: AppConfig::default(),
            opportunities: edgefinder::evaluate_all(&demo_quotes().unwrap()).unwrap(),
            history: demo_history().unwrap(),
        }
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;
    let addr = format!("{}:{}", config.server.host, config.server.port);

    let app_state = Arc::new(AppState::from_config(config)?);
    info!(
        "Loaded {} quoted lines and {} historical bets",
        app_state.opportunities.len(),
        app_state.history.len()
    );

    info!("Starting EdgeFinder API server at http://{}", addr);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .wrap(middleware::Logger::default())
            .route("/health", web::get().to(health::health_check))
            .route("/opportunities", web::get().to(opportunities::list_opportunities))
            .route(
                "/opportunities/evaluate",
                web::post().to(opportunities::evaluate_opportunities),
            )
            .route("/backtest", web::get().to(backtest::run_configured_backtest))
            .route("/backtest", web::post().to(backtest::run_custom_backtest))
    })
    .bind(&addr)?
    .run()
    .await?;

    Ok(())
}
