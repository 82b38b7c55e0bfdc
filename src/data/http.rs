//! Implied-rate quotes from a JSON endpoint.
//!
//! Configuration comes from the environment (a `.env` file is honoured):
//!
//! - `RATEPATH_QUOTES_URL` (required)
//! - `RATEPATH_API_KEY` (optional, sent as a bearer token)
//!
//! Expected response:
//!
//! ```json
//! {"target_rate": 4.33, "quotes": [{"date": "2025-01-02", "rate": 4.33}, ...]}
//! ```

use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::info;

use crate::data::MarketDataProvider;
use crate::domain::{MarketSnapshot, RateQuote};
use crate::error::AppError;
use crate::io::ingest::parse_date;

const URL_VAR: &str = "RATEPATH_QUOTES_URL";
const KEY_VAR: &str = "RATEPATH_API_KEY";
const TIMEOUT: Duration = Duration::from_secs(30);

pub struct HttpQuoteClient {
    client: Client,
    url: String,
    api_key: Option<String>,
}

impl HttpQuoteClient {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let url = std::env::var(URL_VAR)
            .map_err(|_| AppError::new(2, format!("Missing {URL_VAR} in environment (.env).")))?;
        let api_key = std::env::var(KEY_VAR).ok().filter(|k| !k.trim().is_empty());
        let client = Client::builder()
            .timeout(TIMEOUT)
            .build()
            .map_err(|e| AppError::new(4, format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client, url, api_key })
    }
}

impl MarketDataProvider for HttpQuoteClient {
    fn fetch(&self) -> Result<MarketSnapshot, AppError> {
        let mut req = self.client.get(&self.url);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let resp = req
            .send()
            .map_err(|e| AppError::new(4, format!("Quote request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::new(
                4,
                format!("Quote request failed with status {}.", resp.status()),
            ));
        }

        let body: QuotesResponse = resp
            .json()
            .map_err(|e| AppError::new(4, format!("Failed to parse quote response: {e}")))?;

        let snapshot = snapshot_from_response(body)?;
        info!(url = %self.url, quotes = snapshot.quotes.len(), "quotes fetched");
        Ok(snapshot)
    }
}

#[derive(Debug, Deserialize)]
struct QuotesResponse {
    target_rate: f64,
    quotes: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    date: String,
    rate: f64,
}

fn snapshot_from_response(body: QuotesResponse) -> Result<MarketSnapshot, AppError> {
    if !body.target_rate.is_finite() {
        return Err(AppError::new(4, "Invalid target rate in quote response."));
    }
    let quotes = body
        .quotes
        .into_iter()
        .map(|q| {
            let date = parse_date(&q.date).map_err(|e| AppError::new(4, e))?;
            Ok(RateQuote::new(date, q.rate))
        })
        .collect::<Result<Vec<_>, AppError>>()?;
    Ok(MarketSnapshot {
        target_rate: body.target_rate,
        quotes,
    })
}
