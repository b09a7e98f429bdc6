//! Validation and data errors shared by every public operation

use std::path::PathBuf;
use thiserror::Error;

/// Application error types
#[derive(Debug, Error)]
pub enum EdgeError {
    /// Decimal odds not finite or not above 1.0
    #[error("Decimal odds must be a finite number greater than 1.0, got {0}")]
    InvalidOdds(f64),

    /// Probability outside [0, 1]
    #[error("Probability must be between 0 and 1, got {0}")]
    InvalidProbability(f64),

    /// Stake fraction outside [0, 1]
    #[error("Stake fraction must be between 0 and 1, got {0}")]
    InvalidStakeFraction(f64),

    /// Starting bankroll not a positive finite amount
    #[error("Bankroll must be a finite amount greater than 0, got {0}")]
    InvalidBankroll(f64),

    /// A backtest record failed validation (1-based position in the input)
    #[error("Backtest record #{index} is invalid: {source}")]
    InvalidRecord {
        index: usize,
        #[source]
        source: Box<EdgeError>,
    },

    /// A quoted line failed validation
    #[error("Quote '{id}' is invalid: {source}")]
    InvalidQuote {
        id: String,
        #[source]
        source: Box<EdgeError>,
    },

    /// Configuration value out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl EdgeError {
    /// True for errors caused by caller-supplied values
    pub fn is_validation(&self) -> bool {
        !matches!(self, EdgeError::Io { .. })
    }
}

#[cfg(feature = "api")]
mod response {
    use super::EdgeError;
    use actix_web::{http::StatusCode, HttpResponse, ResponseError};
    use serde::Serialize;

    /// Error body returned by the HTTP API
    #[derive(Debug, Serialize)]
    struct ErrorResponse {
        error: String,
        message: String,
    }

    impl ResponseError for EdgeError {
        fn status_code(&self) -> StatusCode {
            if self.is_validation() {
                StatusCode::BAD_REQUEST
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }

        fn error_response(&self) -> HttpResponse {
            let error_code = if self.is_validation() {
                "validation_error"
            } else {
                "internal_error"
            };

            HttpResponse::build(self.status_code()).json(ErrorResponse {
                error: error_code.to_string(),
                message: self.to_string(),
            })
        }
    }
}

/// Validation functions
pub fn validate_odds(odds: f64) -> Result<(), EdgeError> {
    if !odds.is_finite() || odds <= 1.0 {
        return Err(EdgeError::InvalidOdds(odds));
    }
    Ok(())
}

pub fn validate_probability(prob: f64) -> Result<(), EdgeError> {
    if !(0.0..=1.0).contains(&prob) {
        return Err(EdgeError::InvalidProbability(prob));
    }
    Ok(())
}

pub fn validate_stake_fraction(fraction: f64) -> Result<(), EdgeError> {
    if !(0.0..=1.0).contains(&fraction) {
        return Err(EdgeError::InvalidStakeFraction(fraction));
    }
    Ok(())
}

pub fn validate_bankroll(bankroll: f64) -> Result<(), EdgeError> {
    if !bankroll.is_finite() || bankroll <= 0.0 {
        return Err(EdgeError::InvalidBankroll(bankroll));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_odds_valid() {
        assert!(validate_odds(1.01).is_ok());
        assert!(validate_odds(2.10).is_ok());
        assert!(validate_odds(100.0).is_ok());
    }

    #[test]
    fn test_validate_odds_invalid() {
        assert!(validate_odds(1.0).is_err());
        assert!(validate_odds(0.0).is_err());
        assert!(validate_odds(-2.0).is_err());
        assert!(validate_odds(f64::NAN).is_err());
        assert!(validate_odds(f64::INFINITY).is_err());
    }

    #[test]
    fn test_validate_probability_valid() {
        assert!(validate_probability(0.0).is_ok());
        assert!(validate_probability(0.5).is_ok());
        assert!(validate_probability(1.0).is_ok());
    }

    #[test]
    fn test_validate_probability_invalid() {
        assert!(validate_probability(-0.1).is_err());
        assert!(validate_probability(1.1).is_err());
        assert!(validate_probability(f64::NAN).is_err());
    }

    #[test]
    fn test_validate_stake_fraction() {
        assert!(validate_stake_fraction(0.0).is_ok());
        assert!(validate_stake_fraction(0.025).is_ok());
        assert!(validate_stake_fraction(1.0).is_ok());
        assert!(validate_stake_fraction(1.5).is_err());
        assert!(validate_stake_fraction(-0.01).is_err());
    }

    #[test]
    fn test_validate_bankroll() {
        assert!(validate_bankroll(1000.0).is_ok());
        assert!(validate_bankroll(0.0).is_err());
        assert!(validate_bankroll(-5.0).is_err());
        assert!(validate_bankroll(f64::INFINITY).is_err());
    }

    #[test]
    fn test_error_display() {
        let err = EdgeError::InvalidOdds(0.5);
        assert!(err.to_string().contains("greater than 1.0"));

        let err = EdgeError::InvalidRecord {
            index: 3,
            source: Box::new(EdgeError::InvalidStakeFraction(2.0)),
        };
        assert!(err.to_string().contains("#3"));
        assert!(err.to_string().contains("Stake fraction"));
    }

    #[test]
    fn test_io_is_not_validation() {
        let err = EdgeError::Io {
            path: PathBuf::from("missing.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(!err.is_validation());
        assert!(EdgeError::InvalidBankroll(0.0).is_validation());
    }

    #[cfg(feature = "api")]
    #[test]
    fn test_error_status_codes() {
        use actix_web::{http::StatusCode, ResponseError};

        assert_eq!(
            EdgeError::InvalidOdds(1.0).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            EdgeError::Io {
                path: PathBuf::from("x"),
                source: std::io::Error::new(std::io::ErrorKind::Other, "x"),
            }
            .status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
