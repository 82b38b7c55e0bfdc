//! Recombining probability tree.
//!
//! Each decision date is one pure step: every level held in the current
//! snapshot splits its mass between `level + higher_steps` (with probability
//! `weight`) and `level + lower_steps`. Branches that land on the same level
//! are summed, so the number of levels grows linearly with the number of dates.
//!
//! Levels live in a `BTreeMap`, so merges always happen in ascending level
//! order and the floating-point sums are reproducible run to run.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::domain::{DeltaRecord, Direction, Lattice, MassConservationWarning, Snapshot};
use crate::error::TreeError;

/// Snapshots for every decision date plus any mass diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeOutput {
    pub lattice: Lattice,
    pub snapshots: Vec<Snapshot>,
    pub warnings: Vec<MassConservationWarning>,
}

/// Advance the tree by one decision date.
///
/// Fails only if a shifted level leaves the `i64` offset range.
pub fn step_snapshot(current: &Snapshot, record: &DeltaRecord) -> Result<Snapshot, TreeError> {
    let mut next = BTreeMap::new();
    let overflow = || TreeError::LevelOverflow { date: record.date };

    for (&level, &mass) in &current.masses {
        if record.direction == Direction::Flat {
            *next.entry(level).or_insert(0.0) += mass;
            continue;
        }

        let high = level.shifted(record.higher_steps).ok_or_else(overflow)?;
        let low = level.shifted(record.lower_steps).ok_or_else(overflow)?;
        *next.entry(high).or_insert(0.0) += mass * record.weight;
        *next.entry(low).or_insert(0.0) += mass * (1.0 - record.weight);
    }

    Ok(Snapshot {
        date: record.date,
        masses: next,
    })
}

/// Return a warning if the snapshot's total mass drifted from 1.0.
pub fn check_mass(snapshot: &Snapshot, tolerance: f64) -> Option<MassConservationWarning> {
    let total = snapshot.total_mass();
    if (total - 1.0).abs() > tolerance {
        Some(MassConservationWarning {
            date: snapshot.date,
            total,
        })
    } else {
        None
    }
}

/// Fold delta records into one snapshot per decision date.
///
/// The root holds all mass on `lattice.base_rate` at `base_date`; it is not
/// part of the output.
pub fn build_tree(
    lattice: Lattice,
    base_date: NaiveDate,
    deltas: &[DeltaRecord],
    mass_tolerance: f64,
) -> Result<TreeOutput, TreeError> {
    let mut snapshots: Vec<Snapshot> = Vec::with_capacity(deltas.len());
    let mut warnings = Vec::new();

    let mut current = Snapshot::root(base_date);
    for record in deltas {
        let next = step_snapshot(&current, record)?;
        debug!(date = %next.date, levels = next.masses.len(), "tree step");
        if let Some(w) = check_mass(&next, mass_tolerance) {
            warn!(date = %w.date, total = w.total, "probability mass drifted from 1.0");
            warnings.push(w);
        }
        snapshots.push(next.clone());
        current = next;
    }

    Ok(TreeOutput {
        lattice,
        snapshots,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RateLevel, RateQuote, StepSize, TreeConfig, ZeroChange};
    use crate::tree::extract_deltas;
    use chrono::Duration;
    use rand::prelude::*;
    use rand::rngs::StdRng;
    use rand_distr::Normal;

    fn date(i: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 31).unwrap() + Duration::days(42 * i)
    }

    fn quotes(rates: &[f64]) -> Vec<RateQuote> {
        rates
            .iter()
            .enumerate()
            .map(|(i, &r)| RateQuote::new(date(i as i64), r))
            .collect()
    }

    fn record(direction: Direction, weight: f64, lower_steps: i64, higher_steps: i64) -> DeltaRecord {
        DeltaRecord {
            date: date(1),
            implied_rate: 0.0,
            rate_change: 0.0,
            step_count: 0.0,
            percent_step_change: 0.0,
            direction,
            magnitude: 0.0,
            weight,
            lower_steps,
            higher_steps,
            lower_delta: lower_steps as f64 * 0.25,
            higher_delta: higher_steps as f64 * 0.25,
        }
    }

    fn run(rates: &[f64], zero_change: ZeroChange) -> TreeOutput {
        let config = TreeConfig {
            zero_change,
            ..TreeConfig::new(StepSize::new(0.25).unwrap())
        };
        let qs = quotes(rates);
        let deltas = extract_deltas(&qs, &config).unwrap();
        build_tree(
            Lattice::new(rates[0], config.step),
            qs[0].date,
            &deltas,
            config.mass_tolerance,
        )
        .unwrap()
    }

    #[test]
    fn first_date_splits_base_mass() {
        let out = run(&[0.0825, 0.0850, 0.0850, 0.0900], ZeroChange::Hold);
        assert_eq!(out.snapshots.len(), 3);

        let first = &out.snapshots[0];
        let nodes = first.nodes(&out.lattice);
        assert_eq!(nodes.len(), 2);
        assert!((nodes[0].rate - 0.0825).abs() < 1e-12);
        assert!((nodes[0].mass - 0.99).abs() < 1e-9);
        assert!((nodes[1].rate - 0.3325).abs() < 1e-12);
        assert!((nodes[1].mass - 0.01).abs() < 1e-9);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn flat_record_carries_every_level_unchanged() {
        let out = run(&[0.0825, 0.0850, 0.0850, 0.0900], ZeroChange::Hold);
        assert_eq!(out.snapshots[1].masses, out.snapshots[0].masses);
        assert_eq!(out.snapshots[1].date, date(2));
    }

    #[test]
    fn cut_convention_moves_unchanged_rate_one_step_up() {
        let out = run(&[5.0, 5.0], ZeroChange::Cut);
        let snap = &out.snapshots[0];
        assert_eq!(snap.mass_at(RateLevel::new(1)), 1.0);
        assert_eq!(snap.mass_at(RateLevel::BASE), 0.0);
        assert_eq!(snap.masses.len(), 2);
    }

    #[test]
    fn exactly_priced_cut_keeps_mass_at_base() {
        let out = run(&[5.25, 5.0], ZeroChange::Hold);
        let snap = &out.snapshots[0];
        assert_eq!(snap.mass_at(RateLevel::BASE), 1.0);
        assert_eq!(snap.mass_at(RateLevel::new(-1)), 0.0);
    }

    #[test]
    fn level_overflow_is_an_error() {
        let mut masses = BTreeMap::new();
        masses.insert(RateLevel::new(i64::MAX - 1), 1.0);
        let current = Snapshot { date: date(0), masses };
        let err = step_snapshot(&current, &record(Direction::Hike, 0.5, 1, 2)).unwrap_err();
        assert_eq!(err, TreeError::LevelOverflow { date: date(1) });
    }

    #[test]
    fn recombined_mass_is_exact_sum_of_branches() {
        let mut masses = BTreeMap::new();
        masses.insert(RateLevel::new(0), 0.4);
        masses.insert(RateLevel::new(1), 0.6);
        let current = Snapshot { date: date(0), masses };

        let next = step_snapshot(&current, &record(Direction::Hike, 0.3, 0, 1)).unwrap();

        // Level 1 is reached by 0 -> +1 and by 1 -> +0.
        let expected = 0.4 * 0.3 + 0.6 * (1.0 - 0.3);
        assert_eq!(next.mass_at(RateLevel::new(1)), expected);
        assert_eq!(next.mass_at(RateLevel::new(0)), 0.4 * (1.0 - 0.3));
        assert_eq!(next.mass_at(RateLevel::new(2)), 0.6 * 0.3);
        assert_eq!(next.masses.len(), 3);
    }

    #[test]
    fn step_does_not_mutate_input() {
        let current = Snapshot::root(date(0));
        let before = current.clone();
        let _ = step_snapshot(&current, &record(Direction::Cut, 0.5, -1, -2)).unwrap();
        assert_eq!(current, before);
    }

    #[test]
    fn check_mass_flags_drift() {
        let mut masses = BTreeMap::new();
        masses.insert(RateLevel::new(0), 0.5);
        masses.insert(RateLevel::new(1), 0.49);
        let snap = Snapshot { date: date(3), masses };
        let w = check_mass(&snap, 1e-6).unwrap();
        assert_eq!(w.date, date(3));
        assert!((w.total - 0.99).abs() < 1e-12);
        assert!(check_mass(&Snapshot::root(date(0)), 1e-6).is_none());
    }

    #[test]
    fn random_paths_conserve_mass_and_stay_linear() {
        let mut rng = StdRng::seed_from_u64(7);
        let drift = Normal::new(0.0, 0.2).unwrap();

        for _ in 0..200 {
            let mut rates = vec![4.5];
            for _ in 0..16 {
                let last = *rates.last().unwrap();
                rates.push(last + drift.sample(&mut rng));
            }
            let out = run(&rates, ZeroChange::Hold);

            assert!(out.warnings.is_empty());
            for (i, snap) in out.snapshots.iter().enumerate() {
                assert!((snap.total_mass() - 1.0).abs() < 1e-6);
                assert!(snap.masses.values().all(|m| *m >= 0.0));
                // Each date adds at most one new level.
                assert!(snap.masses.len() <= i + 2);
            }
        }
    }

    #[test]
    fn identical_inputs_give_identical_trees() {
        let rates = [5.33, 5.31, 5.12, 4.98, 4.71, 4.66];
        assert_eq!(run(&rates, ZeroChange::Hold), run(&rates, ZeroChange::Hold));
    }
}
