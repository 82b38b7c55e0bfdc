//! Raw delta view: implied rates with hike/cut step counts per meeting.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{DeltaRecord, RateQuote};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WirpRow {
    pub date: NaiveDate,
    pub implied_rate: f64,
    /// `None` for the base date.
    pub rate_change: Option<f64>,
    /// Cumulative hikes (+) / cuts (−) priced since the base date.
    pub step_count: f64,
    /// `None` for the base date.
    pub percent_step_change: Option<f64>,
}

/// One row per quote, base date first.
pub fn raw_delta_table(quotes: &[RateQuote], deltas: &[DeltaRecord]) -> Vec<WirpRow> {
    let mut rows = Vec::with_capacity(deltas.len() + 1);
    if let Some(base) = quotes.first() {
        rows.push(WirpRow {
            date: base.date,
            implied_rate: base.implied_rate,
            rate_change: None,
            step_count: 0.0,
            percent_step_change: None,
        });
    }
    rows.extend(deltas.iter().map(|d| WirpRow {
        date: d.date,
        implied_rate: d.implied_rate,
        rate_change: Some(d.rate_change),
        step_count: d.step_count,
        percent_step_change: Some(d.percent_step_change),
    }));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{StepSize, TreeConfig};
    use crate::tree::extract_deltas;

    #[test]
    fn base_row_has_no_changes() {
        let d0 = NaiveDate::from_ymd_opt(2022, 7, 1).unwrap();
        let d1 = NaiveDate::from_ymd_opt(2022, 7, 27).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2022, 9, 21).unwrap();
        let quotes = vec![
            RateQuote::new(d0, 1.5),
            RateQuote::new(d1, 2.25),
            RateQuote::new(d2, 2.875),
        ];
        let deltas = extract_deltas(&quotes, &TreeConfig::new(StepSize::new(0.25).unwrap())).unwrap();
        let rows = raw_delta_table(&quotes, &deltas);

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].rate_change, None);
        assert_eq!(rows[0].percent_step_change, None);
        assert_eq!(rows[0].step_count, 0.0);

        assert_eq!(rows[1].rate_change, Some(0.75));
        assert_eq!(rows[1].step_count, 3.0);
        assert_eq!(rows[1].percent_step_change, Some(300.0));

        assert_eq!(rows[2].step_count, 5.5);
        assert_eq!(rows[2].percent_step_change, Some(250.0));
        assert_eq!(rows[2].date, d2);
    }
}
