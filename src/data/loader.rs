//! JSON loading for quoted lines and backtest history
//!
//! Both files are plain JSON arrays using the field names of
//! [`QuotedLine`] and [`HistoricalBet`].

use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::EdgeError;
use crate::models::{HistoricalBet, QuotedLine};

fn load_json<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<Vec<T>, EdgeError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| EdgeError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let rows: Vec<T> = serde_json::from_str(&content)?;
    debug!("Loaded {} rows from {:?}", rows.len(), path);
    Ok(rows)
}

/// Load quoted lines from a JSON file
///
/// Lines are validated on load so a bad price fails here rather than
/// during a later scan.
pub fn load_quotes<P: AsRef<Path>>(path: P) -> Result<Vec<QuotedLine>, EdgeError> {
    let quotes: Vec<QuotedLine> = load_json(path)?;
    for quote in &quotes {
        quote.validate()?;
    }
    Ok(quotes)
}

/// Load an ordered backtest history from a JSON file
///
/// Records are kept in file order; the simulator validates them.
pub fn load_history<P: AsRef<Path>>(path: P) -> Result<Vec<HistoricalBet>, EdgeError> {
    load_json(path)
}

/// Parse quoted lines from a JSON string
pub fn parse_quotes(json: &str) -> Result<Vec<QuotedLine>, EdgeError> {
    let quotes: Vec<QuotedLine> = serde_json::from_str(json)?;
    for quote in &quotes {
        quote.validate()?;
    }
    Ok(quotes)
}

/// Parse a backtest history from a JSON string
pub fn parse_history(json: &str) -> Result<Vec<HistoricalBet>, EdgeError> {
    Ok(serde_json::from_str(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const QUOTES: &str = r#"[
        {"id": "t3", "sport": "Tennis", "league": "WTA Doha", "event": "Swiatek vs Gauff",
         "market": "Player 1 Win", "bookmaker": "Unibet", "odds": 1.55, "model_prob": 0.70,
         "kickoff": "2026-02-23T11:00:00Z"}
    ]"#;

    #[test]
    fn test_load_quotes_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(QUOTES.as_bytes()).unwrap();

        let quotes = load_quotes(file.path()).unwrap();
        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].bookmaker, "Unibet");
        assert!((quotes[0].odds - 1.55).abs() < 1e-12);
    }

    #[test]
    fn test_load_history_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"[{{"date": "2026-02-19", "event": "Gauff vs Sabalenka", "sport": "Tennis",
                "odds": 2.20, "model_prob": 0.52, "stake_fraction": 0.021, "won": true}}]"#
        )
        .unwrap();

        let history = load_history(file.path()).unwrap();
        assert_eq!(history.len(), 1);
        assert!(history[0].won);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_quotes("/nonexistent/quotes.json").unwrap_err();
        assert!(matches!(err, EdgeError::Io { .. }));
    }

    #[test]
    fn test_parse_quotes_rejects_bad_odds() {
        let json = QUOTES.replace("1.55", "0.95");
        assert!(matches!(
            parse_quotes(&json),
            Err(EdgeError::InvalidQuote { .. })
        ));
    }

    #[test]
    fn test_parse_malformed_json() {
        assert!(matches!(parse_history("[{"), Err(EdgeError::Json(_))));
    }
}
