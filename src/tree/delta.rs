//! Delta extraction: implied rates -> branching parameters per decision date.
//!
//! For each date after the base date we compute:
//!
//! ```text
//! step_count[i]  = (rate[i] - rate[0]) / step
//! percent[i]     = 100 * (step_count[i] - step_count[i-1])
//! magnitude[i]   = |percent[i]| / 100
//! weight[i]      = magnitude[i] - floor(magnitude[i])
//! higher[i]      = direction * ceil(magnitude[i])
//! lower[i]       = higher[i] - direction
//! ```
//!
//! The tree then moves every level by `higher` steps with probability
//! `weight` and by `lower` steps otherwise. A whole-number magnitude has zero
//! weight, so all mass moves one step short of `magnitude`.

use crate::domain::{DeltaRecord, Direction, RateQuote, TreeConfig, ZeroChange};
use crate::error::TreeError;

/// Largest per-date move, in steps, that is still an exact integer as `f64`.
const MAX_STEPS_PER_DATE: f64 = 4_503_599_627_370_496.0;

/// Reject quote sequences the tree cannot be built from.
///
/// Quotes are never reordered: out-of-order dates are an error.
pub fn validate_quotes(quotes: &[RateQuote]) -> Result<(), TreeError> {
    if quotes.len() < 2 {
        return Err(TreeError::InsufficientQuotes {
            provided: quotes.len(),
        });
    }
    if let Some(index) = quotes.iter().position(|q| !q.implied_rate.is_finite()) {
        return Err(TreeError::NonFiniteRate { index });
    }
    for (i, pair) in quotes.windows(2).enumerate() {
        if pair[1].date <= pair[0].date {
            return Err(TreeError::NonMonotonicDate {
                index: i + 1,
                previous: pair[0].date,
                current: pair[1].date,
            });
        }
    }
    Ok(())
}

/// Build one `DeltaRecord` per quote after the first.
pub fn extract_deltas(quotes: &[RateQuote], config: &TreeConfig) -> Result<Vec<DeltaRecord>, TreeError> {
    validate_quotes(quotes)?;

    let step = config.step.value();
    let base = quotes[0].implied_rate;

    // The base date sits at zero steps, so the first record's percent change
    // is its drift from the base rather than a change-of-change.
    let mut prev_step_count = 0.0;
    let mut out = Vec::with_capacity(quotes.len() - 1);

    for (i, pair) in quotes.windows(2).enumerate() {
        let (prev, cur) = (pair[0], pair[1]);
        let step_count = (cur.implied_rate - base) / step;
        let percent_step_change = 100.0 * (step_count - prev_step_count);

        out.push(delta_record(
            i + 1,
            cur,
            cur.implied_rate - prev.implied_rate,
            step_count,
            percent_step_change,
            config,
        )?);
        prev_step_count = step_count;
    }

    Ok(out)
}

fn delta_record(
    index: usize,
    quote: RateQuote,
    rate_change: f64,
    step_count: f64,
    percent_step_change: f64,
    config: &TreeConfig,
) -> Result<DeltaRecord, TreeError> {
    let direction = direction_for(percent_step_change, config.zero_change);
    let magnitude = percent_step_change.abs() / 100.0;

    let ceiling = magnitude.ceil();
    if ceiling.is_nan() || ceiling > MAX_STEPS_PER_DATE {
        return Err(TreeError::StepCountOutOfRange { index, magnitude });
    }

    let (weight, lower_steps, higher_steps) = match direction {
        Direction::Flat => (0.0, 0, 0),
        Direction::Hike | Direction::Cut => {
            let higher_steps = direction.signed_steps(ceiling as i64);
            (
                (magnitude - magnitude.floor()).clamp(0.0, 1.0),
                higher_steps - direction.signed_steps(1),
                higher_steps,
            )
        }
    };

    let step = config.step.value();
    Ok(DeltaRecord {
        date: quote.date,
        implied_rate: quote.implied_rate,
        rate_change,
        step_count,
        percent_step_change,
        direction,
        magnitude,
        weight,
        lower_steps,
        higher_steps,
        lower_delta: lower_steps as f64 * step,
        higher_delta: higher_steps as f64 * step,
    })
}

fn direction_for(percent_step_change: f64, zero_change: ZeroChange) -> Direction {
    if percent_step_change > 0.0 {
        Direction::Hike
    } else if percent_step_change < 0.0 {
        Direction::Cut
    } else {
        match zero_change {
            ZeroChange::Hold => Direction::Flat,
            ZeroChange::Cut => Direction::Cut,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StepSize;
    use chrono::NaiveDate;

    fn quotes(rates: &[f64]) -> Vec<RateQuote> {
        let start = NaiveDate::from_ymd_opt(2022, 6, 15).unwrap();
        rates
            .iter()
            .enumerate()
            .map(|(i, &r)| RateQuote::new(start + chrono::Duration::days(42 * i as i64), r))
            .collect()
    }

    fn config(zero_change: ZeroChange) -> TreeConfig {
        TreeConfig {
            zero_change,
            ..TreeConfig::new(StepSize::new(0.25).unwrap())
        }
    }

    #[test]
    fn small_hike_splits_between_hold_and_one_step() {
        let deltas = extract_deltas(&quotes(&[0.0825, 0.0850, 0.0850, 0.0900]), &config(ZeroChange::Hold)).unwrap();
        assert_eq!(deltas.len(), 3);

        let d1 = &deltas[0];
        assert!((d1.step_count - 0.01).abs() < 1e-12);
        assert!((d1.percent_step_change - 1.0).abs() < 1e-9);
        assert_eq!(d1.direction, Direction::Hike);
        assert!((d1.weight - 0.01).abs() < 1e-9);
        assert_eq!((d1.lower_steps, d1.higher_steps), (0, 1));
        assert!((d1.higher_delta - 0.25).abs() < 1e-12);
        assert!(d1.lower_delta.abs() < 1e-12);
        assert!((d1.rate_change - 0.0025).abs() < 1e-12);

        let d3 = &deltas[2];
        assert!((d3.step_count - 0.03).abs() < 1e-12);
        assert!((d3.percent_step_change - 2.0).abs() < 1e-9);
        assert!((d3.weight - 0.02).abs() < 1e-9);
    }

    #[test]
    fn zero_change_under_hold_is_flat() {
        let deltas = extract_deltas(&quotes(&[0.0825, 0.0850, 0.0850]), &config(ZeroChange::Hold)).unwrap();
        let d2 = &deltas[1];
        assert_eq!(d2.percent_step_change, 0.0);
        assert_eq!(d2.direction, Direction::Flat);
        assert_eq!(d2.weight, 0.0);
        assert_eq!((d2.lower_steps, d2.higher_steps), (0, 0));
    }

    #[test]
    fn zero_change_under_cut_moves_all_weight_one_step_up() {
        let deltas = extract_deltas(&quotes(&[5.0, 5.0]), &config(ZeroChange::Cut)).unwrap();
        let d = &deltas[0];
        assert_eq!(d.direction, Direction::Cut);
        assert_eq!(d.magnitude, 0.0);
        assert_eq!(d.weight, 0.0);
        assert_eq!(d.higher_steps, 0);
        assert_eq!(d.lower_steps, 1);
        assert_eq!(d.lower_delta, 0.25);
        assert_eq!(d.higher_delta, 0.0);
    }

    #[test]
    fn cuts_use_negative_steps() {
        let deltas = extract_deltas(&quotes(&[5.25, 5.0, 4.625]), &config(ZeroChange::Hold)).unwrap();

        // Exactly one cut priced: higher candidate is the cut, but it carries
        // no weight, so all mass stays on the unchanged branch.
        let d1 = &deltas[0];
        assert_eq!(d1.direction, Direction::Cut);
        assert_eq!(d1.step_count, -1.0);
        assert_eq!(d1.magnitude, 1.0);
        assert_eq!(d1.weight, 0.0);
        assert_eq!((d1.lower_steps, d1.higher_steps), (0, -1));
        assert_eq!(d1.higher_delta, -0.25);
        assert_eq!(d1.lower_delta, 0.0);

        // One and a half cuts priced for the second meeting.
        let d2 = &deltas[1];
        assert_eq!(d2.step_count, -2.5);
        assert_eq!(d2.percent_step_change, -150.0);
        assert_eq!(d2.weight, 0.5);
        assert_eq!((d2.lower_steps, d2.higher_steps), (-1, -2));
        assert_eq!(d2.lower_delta, -0.25);
        assert_eq!(d2.higher_delta, -0.5);
    }

    #[test]
    fn whole_hikes_put_mass_one_step_short() {
        let deltas = extract_deltas(&quotes(&[4.0, 4.5]), &config(ZeroChange::Hold)).unwrap();
        let d = &deltas[0];
        assert_eq!(d.magnitude, 2.0);
        assert_eq!(d.weight, 0.0);
        assert_eq!((d.lower_steps, d.higher_steps), (1, 2));
    }

    #[test]
    fn huge_step_counts_are_rejected() {
        let config = TreeConfig::new(StepSize::new(1e-20).unwrap());
        let err = extract_deltas(&quotes(&[0.0, 1.0]), &config).unwrap_err();
        assert!(matches!(err, TreeError::StepCountOutOfRange { index: 1, .. }));

        let config = TreeConfig::new(StepSize::new(1e-300).unwrap());
        let err = extract_deltas(&quotes(&[0.0, 1e10]), &config).unwrap_err();
        assert!(matches!(err, TreeError::StepCountOutOfRange { index: 1, .. }));
    }

    #[test]
    fn candidate_deltas_differ_by_one_step() {
        let deltas = extract_deltas(
            &quotes(&[4.33, 4.41, 4.72, 4.55, 4.10, 4.11]),
            &config(ZeroChange::Hold),
        )
        .unwrap();
        for d in deltas {
            assert_eq!((d.higher_steps - d.lower_steps).abs(), 1);
            assert!((0.0..=1.0).contains(&d.weight));
            assert!(((d.higher_delta - d.lower_delta).abs() - 0.25).abs() < 1e-12);
        }
    }

    #[test]
    fn rejects_short_input() {
        let err = extract_deltas(&quotes(&[5.0]), &config(ZeroChange::Hold)).unwrap_err();
        assert_eq!(err, TreeError::InsufficientQuotes { provided: 1 });
    }

    #[test]
    fn rejects_out_of_order_dates() {
        let mut qs = quotes(&[5.0, 5.1, 5.2]);
        qs.swap(1, 2);
        let err = extract_deltas(&qs, &config(ZeroChange::Hold)).unwrap_err();
        assert!(matches!(err, TreeError::NonMonotonicDate { index: 1, .. }));
    }

    #[test]
    fn rejects_duplicate_dates() {
        let mut qs = quotes(&[5.0, 5.1]);
        qs[1].date = qs[0].date;
        assert!(matches!(
            validate_quotes(&qs),
            Err(TreeError::NonMonotonicDate { .. })
        ));
    }

    #[test]
    fn rejects_nan_rates() {
        let qs = quotes(&[5.0, f64::NAN]);
        assert_eq!(validate_quotes(&qs), Err(TreeError::NonFiniteRate { index: 1 }));
    }
}
