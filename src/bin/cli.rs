//! EdgeFinder CLI - scan for value bets and backtest staking

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use edgefinder::backtesting::{
    analyze_by_odds_range, analyze_by_sport, calculate_sharpe_ratio, BacktestConfig,
    BacktestResult, BacktestSimulator, DimensionAnalysis, StakePolicy,
};
use edgefinder::core::KellyCalculator;
use edgefinder::data::{demo_history, demo_quotes, load_history, load_quotes};
use edgefinder::error::validate_bankroll;
use edgefinder::scanner::evaluate_all_with;
use edgefinder::{
    apply_query, AppConfig, EvaluatedOpportunity, HistoricalBet, OpportunityQuery, QuotedLine,
    ScanSummary, SortDirection, SortKey, Sport,
};

#[derive(Parser)]
#[command(name = "edgefinder")]
#[command(author, version, about = "Value bet detection CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Run in interactive mode
    #[arg(short, long)]
    interactive: bool,

    /// Config file stem (edgefinder.toml, edgefinder.json, ...)
    #[arg(long, default_value = "edgefinder")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate quoted lines and list value bets
    Scan {
        /// Only show this sport (football, tennis)
        #[arg(long)]
        sport: Option<Sport>,

        /// Only show this bookmaker
        #[arg(long)]
        bookmaker: Option<String>,

        /// Hide lines without positive EV
        #[arg(long)]
        positive_only: bool,

        /// Sort column (ev, odds, kelly, kickoff, bookmaker, ...)
        #[arg(long, default_value = "ev")]
        sort: SortKey,

        /// Sort ascending instead of descending
        #[arg(long)]
        asc: bool,

        /// Bankroll used for stake amounts
        #[arg(long)]
        bankroll: Option<f64>,

        /// JSON file of quoted lines (demo quotes if omitted)
        #[arg(long)]
        quotes: Option<PathBuf>,
    },

    /// Replay a bet history against a bankroll
    Backtest {
        /// Starting bankroll
        #[arg(long)]
        starting_bankroll: Option<f64>,

        /// JSON file of historical bets (demo history if omitted)
        #[arg(long)]
        history: Option<PathBuf>,

        /// Size stakes with Kelly instead of the recorded fractions
        #[arg(long)]
        kelly: bool,

        /// Print the bankroll after every bet
        #[arg(long)]
        curve: bool,

        /// Print results by sport and odds band
        #[arg(long)]
        breakdown: bool,
    },

    /// Size a single bet
    Stake {
        /// Model probability of winning (0-1)
        #[arg(short, long)]
        prob: f64,

        /// Decimal odds
        #[arg(short, long)]
        odds: f64,

        /// Bankroll used for the stake amount
        #[arg(long)]
        bankroll: Option<f64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let config = AppConfig::load_from(&cli.config).context("Failed to load configuration")?;

    println!("{}", format!("EdgeFinder CLI v{}", env!("CARGO_PKG_VERSION")).cyan().bold());
    println!();

    if cli.interactive {
        run_interactive(&config)?;
    } else if let Some(command) = cli.command {
        match command {
            Commands::Scan {
                sport,
                bookmaker,
                positive_only,
                sort,
                asc,
                bankroll,
                quotes,
            } => {
                let query = OpportunityQuery {
                    sport,
                    bookmaker,
                    only_positive_ev: positive_only,
                    sort_key: sort,
                    sort_direction: if asc {
                        SortDirection::Asc
                    } else {
                        SortDirection::Desc
                    },
                };
                let quotes_path = quotes.or_else(|| config.data.quotes_path.as_ref().map(PathBuf::from));
                run_scan(
                    &config,
                    quotes_path.as_deref(),
                    &query,
                    resolve_bankroll(bankroll, config.bankroll.current)?,
                )?;
            }
            Commands::Backtest {
                starting_bankroll,
                history,
                kelly,
                curve,
                breakdown,
            } => {
                let mut backtest = config.backtest_config()?;
                backtest.starting_bankroll =
                    resolve_bankroll(starting_bankroll, backtest.starting_bankroll)?;
                if kelly {
                    backtest.stake_policy = StakePolicy::Kelly(config.kelly_calculator()?);
                }
                let history_path =
                    history.or_else(|| config.data.history_path.as_ref().map(PathBuf::from));
                run_backtest(backtest, history_path.as_deref(), curve, breakdown)?;
            }
            Commands::Stake {
                prob,
                odds,
                bankroll,
            } => {
                size_stake(
                    &config.kelly_calculator()?,
                    prob,
                    odds,
                    resolve_bankroll(bankroll, config.bankroll.current)?,
                )?;
            }
        }
    } else {
        println!("Use --help for usage information or --interactive for interactive mode.");
    }

    Ok(())
}

/// Command-line bankroll override, or the configured value
fn resolve_bankroll(override_value: Option<f64>, configured: f64) -> Result<f64> {
    let bankroll = override_value.unwrap_or(configured);
    validate_bankroll(bankroll).context("Bankroll must be a positive amount")?;
    Ok(bankroll)
}

fn read_quotes(path: Option<&Path>) -> Result<Vec<QuotedLine>> {
    match path {
        Some(p) => load_quotes(p).with_context(|| format!("Failed to load quotes from {:?}", p)),
        None => Ok(demo_quotes()?),
    }
}

fn read_history(path: Option<&Path>) -> Result<Vec<HistoricalBet>> {
    match path {
        Some(p) => load_history(p).with_context(|| format!("Failed to load history from {:?}", p)),
        None => Ok(demo_history()?),
    }
}

fn run_scan(
    config: &AppConfig,
    quotes_path: Option<&Path>,
    query: &OpportunityQuery,
    bankroll: f64,
) -> Result<()> {
    let quotes = read_quotes(quotes_path)?;
    let kelly = config.kelly_calculator()?;
    let opportunities = evaluate_all_with(&quotes, &kelly)?;

    print_scan_summary(&ScanSummary::from_opportunities(&opportunities, bankroll));

    let rows = apply_query(&opportunities, query);
    print_opportunities(&rows, bankroll);

    println!(
        "{} market{} (sorted by {} {})",
        rows.len(),
        if rows.len() == 1 { "" } else { "s" },
        query.sort_key,
        match query.sort_direction {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    );
    Ok(())
}

fn print_scan_summary(summary: &ScanSummary) {
    println!("{}", "Scan Summary:".yellow().bold());
    println!("  Markets scanned:   {}", summary.markets_scanned);
    println!(
        "  +EV opportunities: {} of {}",
        summary.positive_ev.to_string().green(),
        summary.markets_scanned
    );
    println!("  Avg edge:          {:.1}%", summary.avg_edge * 100.0);
    println!(
        "  Max Kelly stake:   {:.0} (bankroll {:.0})",
        summary.max_stake_amount, summary.bankroll
    );
    println!();
}

/// Truncate a label to fit a table column
fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

fn print_opportunities(rows: &[EvaluatedOpportunity], bankroll: f64) {
    println!("{}", "Opportunities:".yellow().bold());

    if rows.is_empty() {
        println!("{}", "No markets match the current filters.".dimmed());
        println!();
        return;
    }

    println!(
        "{:<8} {:<24} {:<13} {:<8} {:>6} {:>7} {:>8} {:>8} {:>8}",
        "Sport", "Event", "Market", "Book", "Odds", "Model", "Implied", "EV", "Stake"
    );
    println!("{}", "-".repeat(98));

    for opp in rows {
        let ev_str = format!("{:+.1}%", opp.ev * 100.0);
        let ev_colored = if opp.is_value_bet() {
            ev_str.green()
        } else {
            ev_str.red()
        };
        let stake_str = if opp.kelly > 0.0 {
            format!("{:.0}", opp.stake_amount(bankroll))
        } else {
            "-".to_string()
        };

        println!(
            "{:<8} {:<24} {:<13} {:<8} {:>6.2} {:>6.1}% {:>7.1}% {:>8} {:>8}",
            opp.line.sport,
            truncate(&opp.line.event, 24),
            truncate(&opp.line.market, 13),
            truncate(&opp.line.bookmaker, 8),
            opp.line.odds,
            opp.line.model_prob * 100.0,
            opp.implied_prob * 100.0,
            ev_colored,
            stake_str
        );
    }
    println!();
}

fn run_backtest(
    config: BacktestConfig,
    history_path: Option<&Path>,
    curve: bool,
    breakdown: bool,
) -> Result<()> {
    let history = read_history(history_path)?;
    println!(
        "{}: {} bets from bankroll {:.0}",
        "Backtesting".green(),
        history.len(),
        config.starting_bankroll
    );

    let simulator = BacktestSimulator::new(config);
    let result = simulator.run(&history)?;

    if curve {
        print_curve(&result);
    }

    simulator.print_summary(&result);
    println!(
        "Sharpe (per bet): {:.2}",
        calculate_sharpe_ratio(&result.bets, 0.0)
    );

    if breakdown {
        println!();
        print_breakdown("By sport:", &analyze_by_sport(&result.bets));
        print_breakdown("By odds band:", &analyze_by_odds_range(&result.bets));
    }

    Ok(())
}

fn print_curve(result: &BacktestResult) {
    println!("{}", "Bankroll Curve:".yellow().bold());
    println!("{:>4} {:<11} {:<26} {:>10} {:>6}", "#", "Date", "Event", "Bankroll", "");
    println!("{}", "-".repeat(62));

    for point in result.trajectory() {
        let date = point
            .date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "Start".to_string());
        let event = point.event.as_deref().unwrap_or("-");
        let outcome = match (point.index, point.won) {
            (0, _) => "".normal(),
            (_, true) => "WON".green(),
            (_, false) => "LOST".red(),
        };

        println!(
            "{:>4} {:<11} {:<26} {:>10.2} {:>6}",
            point.index,
            date,
            truncate(event, 26),
            point.bankroll,
            outcome
        );
    }
}

fn print_breakdown(title: &str, rows: &[DimensionAnalysis]) {
    println!("{}", title.yellow().bold());
    println!(
        "{:<20} {:>5} {:>5} {:>8} {:>10} {:>10} {:>8}",
        "Key", "Bets", "Wins", "Hit", "Staked", "Profit", "ROI"
    );
    println!("{}", "-".repeat(72));
    for row in rows {
        let roi = format!("{:+.1}%", row.roi * 100.0);
        println!(
            "{:<20} {:>5} {:>5} {:>7.1}% {:>10.2} {:>+10.2} {:>8}",
            row.key,
            row.bets,
            row.wins,
            row.hit_rate * 100.0,
            row.stake,
            row.profit,
            if row.roi >= 0.0 { roi.green() } else { roi.red() }
        );
    }
    println!();
}

fn size_stake(kelly: &KellyCalculator, prob: f64, odds: f64, bankroll: f64) -> Result<()> {
    let sizing = kelly
        .calculate_single(prob, odds)
        .context("Cannot size this bet")?;

    println!("{}", "Bet Sizing:".yellow().bold());
    println!("  Odds:               {:.2}", sizing.odds);
    println!("  Model probability:  {:.1}%", sizing.probability * 100.0);
    println!("  Implied probability: {:.1}%", sizing.implied_probability * 100.0);

    let ev_str = format!("{:+.1}%", sizing.expected_value * 100.0);
    println!(
        "  Expected value:     {}",
        if sizing.expected_value > 0.0 {
            ev_str.green()
        } else {
            ev_str.red()
        }
    );
    println!("  Full Kelly:         {:.2}%", sizing.kelly_fraction * 100.0);
    println!(
        "  Recommended stake:  {:.2}% = {:.2}",
        sizing.recommended_fraction * 100.0,
        sizing.stake_for(bankroll)
    );

    if sizing.recommended_fraction == 0.0 {
        println!("{}", "  → No edge, no bet.".dimmed());
    }
    Ok(())
}

fn run_interactive(config: &AppConfig) -> Result<()> {
    let theme = ColorfulTheme::default();
    let mut query = OpportunityQuery::default();

    loop {
        let actions = [
            "Scan opportunities",
            "Change sort column",
            "Toggle +EV only",
            "Run backtest",
            "Size a stake",
            "Quit",
        ];
        let choice = Select::with_theme(&theme)
            .with_prompt("What would you like to do?")
            .items(&actions)
            .default(0)
            .interact()?;

        match choice {
            0 => {
                let quotes_path = config.data.quotes_path.as_ref().map(PathBuf::from);
                run_scan(config, quotes_path.as_deref(), &query, config.bankroll.current)?;
            }
            1 => {
                let keys = [
                    SortKey::Ev,
                    SortKey::Kelly,
                    SortKey::Odds,
                    SortKey::ModelProb,
                    SortKey::ImpliedProb,
                    SortKey::Kickoff,
                    SortKey::Bookmaker,
                    SortKey::Event,
                ];
                let names: Vec<&str> = keys.iter().map(|k| k.name()).collect();
                let idx = Select::with_theme(&theme)
                    .with_prompt("Sort by (choosing the current column flips direction)")
                    .items(&names)
                    .default(0)
                    .interact()?;
                query = query.toggle_sort(keys[idx]);
            }
            2 => {
                query.only_positive_ev = !query.only_positive_ev;
                println!(
                    "+EV only: {}",
                    if query.only_positive_ev { "on" } else { "off" }
                );
            }
            3 => {
                let mut backtest = config.backtest_config()?;
                let use_kelly = Confirm::with_theme(&theme)
                    .with_prompt("Size stakes with Kelly instead of recorded fractions?")
                    .default(false)
                    .interact()?;
                if use_kelly {
                    backtest.stake_policy = StakePolicy::Kelly(config.kelly_calculator()?);
                }
                let history_path = config.data.history_path.as_ref().map(PathBuf::from);
                run_backtest(backtest, history_path.as_deref(), true, true)?;
            }
            4 => {
                let prob: f64 = Input::with_theme(&theme)
                    .with_prompt("Model probability (0-1)")
                    .interact_text()?;
                let odds: f64 = Input::with_theme(&theme)
                    .with_prompt("Decimal odds")
                    .interact_text()?;
                if let Err(e) = size_stake(&config.kelly_calculator()?, prob, odds, config.bankroll.current) {
                    println!("{} {:#}", "Error:".red(), e);
                }
            }
            _ => break,
        }
        println!();
    }

    Ok(())
}
