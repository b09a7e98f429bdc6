//! Configuration for EdgeFinder.

use serde::{Deserialize, Serialize};

use crate::backtesting::{BacktestConfig, StakePolicy};
use crate::core::kelly::{KellyCalculator, HALF_KELLY, MAX_STAKE_FRACTION};
use crate::error::{validate_bankroll, EdgeError};

/// Environment variable prefix (EDGEFINDER_STAKING__KELLY_MULTIPLIER, etc.)
pub const ENV_PREFIX: &str = "EDGEFINDER";

/// Bankroll configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankrollConfig {
    /// Bankroll used to turn stake fractions into amounts
    #[serde(default = "default_bankroll")]
    pub current: f64,
    /// Bankroll a backtest starts from
    #[serde(default = "default_bankroll")]
    pub backtest_start: f64,
}

fn default_bankroll() -> f64 {
    1000.0
}

impl Default for BankrollConfig {
    fn default() -> Self {
        Self {
            current: default_bankroll(),
            backtest_start: default_bankroll(),
        }
    }
}

/// Staking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StakingConfig {
    #[serde(default = "default_kelly_multiplier")]
    pub kelly_multiplier: f64,
    #[serde(default = "default_max_stake_fraction")]
    pub max_stake_fraction: f64,
    /// Backtest with Kelly-derived stakes instead of recorded ones
    #[serde(default)]
    pub backtest_uses_kelly: bool,
}

fn default_kelly_multiplier() -> f64 {
    HALF_KELLY
}

fn default_max_stake_fraction() -> f64 {
    MAX_STAKE_FRACTION
}

impl Default for StakingConfig {
    fn default() -> Self {
        Self {
            kelly_multiplier: default_kelly_multiplier(),
            max_stake_fraction: default_max_stake_fraction(),
            backtest_uses_kelly: false,
        }
    }
}

/// Data source configuration; unset paths fall back to the demo fixtures
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default)]
    pub quotes_path: Option<String>,
    #[serde(default)]
    pub history_path: Option<String>,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// `EDGEFINDER_BANKROLL__CURRENT=2500` sets `bankroll.current`
fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub bankroll: BankrollConfig,
    #[serde(default)]
    pub staking: StakingConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl AppConfig {
    /// Load configuration from defaults, `edgefinder.toml` and the environment
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from("edgefinder")
    }

    /// Load with an explicit config file stem (extension is auto-detected)
    pub fn load_from(file_stem: &str) -> anyhow::Result<Self> {
        Self::load_with(file_stem, environment())
    }

    fn load_with(file_stem: &str, env: config::Environment) -> anyhow::Result<Self> {
        let config = config::Config::builder()
            // Start with defaults
            .add_source(config::Config::try_from(&AppConfig::default())?)
            // Add config file if exists
            .add_source(config::File::with_name(file_stem).required(false))
            // Override with environment variables
            .add_source(env)
            .build()?;

        let app: AppConfig = config.try_deserialize()?;
        app.validate()?;
        Ok(app)
    }

    pub fn validate(&self) -> Result<(), EdgeError> {
        validate_bankroll(self.bankroll.current)?;
        validate_bankroll(self.bankroll.backtest_start)?;
        self.kelly_calculator().map(|_| ())
    }

    /// Kelly calculator for the configured staking policy
    pub fn kelly_calculator(&self) -> Result<KellyCalculator, EdgeError> {
        KellyCalculator::new(
            self.staking.kelly_multiplier,
            self.staking.max_stake_fraction,
        )
    }

    /// Backtest settings derived from bankroll and staking sections
    pub fn backtest_config(&self) -> Result<BacktestConfig, EdgeError> {
        let stake_policy = if self.staking.backtest_uses_kelly {
            StakePolicy::Kelly(self.kelly_calculator()?)
        } else {
            StakePolicy::Recorded
        };

        Ok(BacktestConfig {
            starting_bankroll: self.bankroll.backtest_start,
            stake_policy,
        })
    }
}
