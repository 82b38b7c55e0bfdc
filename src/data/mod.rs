//! Market data providers.
//!
//! The tree only needs an ordered list of `(date, implied rate)` quotes plus
//! the current target rate; where they come from is up to the provider.

use std::path::PathBuf;

use crate::domain::MarketSnapshot;
use crate::error::AppError;

pub mod http;
pub mod sample;

pub use http::HttpQuoteClient;
pub use sample::{SampleMarket, generate_sample};

/// A source of implied-rate quotes.
pub trait MarketDataProvider {
    fn fetch(&self) -> Result<MarketSnapshot, AppError>;
}

/// Quotes from a local CSV file.
///
/// The file carries no target rate; the first quote's implied rate stands in
/// for it unless the caller overrides it.
#[derive(Debug, Clone)]
pub struct CsvQuoteFile {
    pub path: PathBuf,
}

impl CsvQuoteFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl MarketDataProvider for CsvQuoteFile {
    fn fetch(&self) -> Result<MarketSnapshot, AppError> {
        let ingested = crate::io::ingest::load_quotes_csv(&self.path)?;
        let target_rate = ingested
            .quotes
            .first()
            .map(|q| q.implied_rate)
            .ok_or_else(|| AppError::new(3, "No valid quote rows found in CSV."))?;
        Ok(MarketSnapshot {
            target_rate,
            quotes: ingested.quotes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_provider_uses_first_quote_as_target() {
        let dir = std::env::temp_dir().join("ratepath_provider_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("quotes.csv");
        std::fs::write(&path, "date,implied_rate\n2024-01-02,5.33\n2024-01-31,5.31\n").unwrap();

        let snapshot = CsvQuoteFile::new(&path).fetch().unwrap();
        assert_eq!(snapshot.target_rate, 5.33);
        assert_eq!(snapshot.quotes.len(), 2);
    }

    #[test]
    fn missing_file_is_an_input_error() {
        let err = CsvQuoteFile::new("/nonexistent/ratepath/quotes.csv").fetch().unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
