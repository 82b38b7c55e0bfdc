//! Synthetic implied-rate paths for demos and offline runs.
//!
//! Decision dates are spaced six weeks apart (eight meetings a year). The
//! implied rate follows a seeded random walk, so the same seed always gives
//! the same quotes.

use chrono::Duration;
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::data::MarketDataProvider;
use crate::domain::{MarketSnapshot, RateQuote, SampleConfig};
use crate::error::AppError;

const MEETING_SPACING_DAYS: i64 = 42;
const QUOTE_DECIMALS: i32 = 4;

/// Provider wrapper around `generate_sample`.
#[derive(Debug, Clone)]
pub struct SampleMarket {
    pub config: SampleConfig,
}

impl MarketDataProvider for SampleMarket {
    fn fetch(&self) -> Result<MarketSnapshot, AppError> {
        generate_sample(&self.config)
    }
}

pub fn generate_sample(config: &SampleConfig) -> Result<MarketSnapshot, AppError> {
    if config.meetings == 0 {
        return Err(AppError::new(2, "Sample meetings must be > 0."));
    }
    if !config.target_rate.is_finite() {
        return Err(AppError::new(2, "Sample target rate must be finite."));
    }
    if !(config.drift_sd.is_finite() && config.drift_sd >= 0.0) {
        return Err(AppError::new(2, "Sample drift must be finite and >= 0."));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let drift = Normal::new(0.0, config.drift_sd)
        .map_err(|e| AppError::new(4, format!("Drift distribution error: {e}")))?;

    let scale = 10f64.powi(QUOTE_DECIMALS);
    let mut rate = config.target_rate;
    let mut quotes = Vec::with_capacity(config.meetings + 1);
    quotes.push(RateQuote::new(config.start_date, rate));

    for i in 1..=config.meetings {
        rate += drift.sample(&mut rng);
        let date = config.start_date + Duration::days(MEETING_SPACING_DAYS * i as i64);
        quotes.push(RateQuote::new(date, (rate * scale).round() / scale));
    }

    Ok(MarketSnapshot {
        target_rate: config.target_rate,
        quotes,
    })
}
