//! Demo fixtures and JSON loaders

pub mod fixtures;
pub mod loader;

// Re-export commonly used functions
pub use fixtures::{demo_history, demo_quotes, DEMO_BOOKMAKERS};
pub use loader::{load_history, load_quotes, parse_history, parse_quotes};
