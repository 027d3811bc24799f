// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::detector::{cycle_lengths, detect_boundaries};
use resprep_core::{ColumnKey, PrepError, Series};

const DEFAULT_MAX_PASSES: usize = 10_000;

/// Configuration for [`CycleRepairer`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct CycleRepairConfig {
    /// Schedule column whose resets delimit cycles.
    pub ref_column: ColumnKey,
    /// Target number of rows per cycle.
    pub n_cycle: usize,
    /// Nominal spacing of the reconstructed time index.
    pub sampling_time: f64,
    /// Upper bound on detection passes before the repair is declared
    /// non-convergent.
    pub max_passes: usize,
}

impl CycleRepairConfig {
    pub fn new(ref_column: ColumnKey, n_cycle: usize, sampling_time: f64) -> Self {
        Self {
            ref_column,
            n_cycle,
            sampling_time,
            max_passes: DEFAULT_MAX_PASSES,
        }
    }

    fn validate(&self) -> Result<(), PrepError> {
        if self.n_cycle == 0 {
            return Err(PrepError::invalid_input(
                "CycleRepairConfig.n_cycle must be >= 1",
            ));
        }
        if !self.sampling_time.is_finite() || self.sampling_time <= 0.0 {
            return Err(PrepError::invalid_input(format!(
                "CycleRepairConfig.sampling_time must be finite and > 0; got {}",
                self.sampling_time
            )));
        }
        if self.max_passes == 0 {
            return Err(PrepError::invalid_input(
                "CycleRepairConfig.max_passes must be >= 1",
            ));
        }
        Ok(())
    }
}

/// Result of a repair run: the regularized series plus mutation counters for
/// the case report.
#[derive(Clone, Debug, PartialEq)]
pub struct RepairOutcome {
    pub series: Series,
    pub rows_inserted: usize,
    pub rows_deleted: usize,
    pub passes: usize,
}

/// Forces every detected cycle to exactly `n_cycle` rows.
///
/// Reference algorithm: rescan the whole series after each single mutation,
/// because a row insert or delete shifts every later boundary. Quadratic in
/// the number of repairs, which stays cheap at the tens-of-cycles scale this
/// data has.
#[derive(Clone, Debug)]
pub struct CycleRepairer {
    config: CycleRepairConfig,
}

impl CycleRepairer {
    pub fn new(config: CycleRepairConfig) -> Result<Self, PrepError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &CycleRepairConfig {
        &self.config
    }

    /// Returns a new series in which every cycle has `n_cycle` rows and the
    /// time index is `sampling_time * (i + 1)`.
    ///
    /// A series without any boundary is returned unchanged apart from the
    /// reconstructed index. Exhausting `max_passes` is a
    /// [`PrepError::NonConvergence`].
    pub fn repair(&self, series: &Series) -> Result<RepairOutcome, PrepError> {
        let ref_pos = series.column_position(&self.config.ref_column).ok_or_else(|| {
            PrepError::configuration(format!(
                "cycle reference column {} is not present",
                self.config.ref_column
            ))
        })?;

        // Work on a plain integer index; the real one is rebuilt at the end.
        let mut work = series.with_integer_index();
        let mut rows_inserted = 0usize;
        let mut rows_deleted = 0usize;
        let mut passes = 0usize;

        loop {
            if passes >= self.config.max_passes {
                return Err(PrepError::non_convergence(format!(
                    "cycle lengths still deviate from {} after {} passes",
                    self.config.n_cycle, passes
                )));
            }
            passes += 1;

            let reference = work.column_at(ref_pos);
            let boundaries = detect_boundaries(&reference);
            let lengths = cycle_lengths(&boundaries);

            let deviation = boundaries
                .iter()
                .zip(&lengths)
                .find(|(_, len)| **len != self.config.n_cycle);

            let Some((&boundary, &length)) = deviation else {
                break;
            };

            if length < self.config.n_cycle {
                // Fill the premature cycle with copies of its last valid row.
                let missing = self.config.n_cycle - length;
                let last_valid = work.row(boundary - 1).to_vec();
                for _ in 0..missing {
                    work = work.insert_row(boundary, &last_valid)?;
                }
                rows_inserted += missing;
            } else {
                // Drop the surplus rows immediately preceding the boundary.
                let surplus = length - self.config.n_cycle;
                work = work.remove_rows(boundary - surplus, boundary)?;
                rows_deleted += surplus;
            }
        }

        let series = work.with_uniform_index(self.config.sampling_time)?;
        Ok(RepairOutcome {
            series,
            rows_inserted,
            rows_deleted,
            passes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{CycleRepairConfig, CycleRepairer};
    use resprep_core::{ColumnKey, PrepError, Series, VarGroup};

    fn sp(i: u32) -> ColumnKey {
        ColumnKey::var(VarGroup::Sp, i)
    }

    fn schedule_series(values: &[f64], start: f64, step: f64) -> Series {
        let index = (0..values.len())
            .map(|i| start + i as f64 * step)
            .collect();
        Series::from_columns(vec![(sp(19), values.to_vec())], index).unwrap()
    }

    fn repairer(n_cycle: usize, sampling_time: f64) -> CycleRepairer {
        CycleRepairer::new(CycleRepairConfig::new(sp(19), n_cycle, sampling_time)).unwrap()
    }

    #[test]
    fn config_validation_rejects_degenerate_parameters() {
        assert!(CycleRepairer::new(CycleRepairConfig::new(sp(19), 0, 2.0)).is_err());
        assert!(CycleRepairer::new(CycleRepairConfig::new(sp(19), 4, 0.0)).is_err());
        assert!(CycleRepairer::new(CycleRepairConfig::new(sp(19), 4, f64::NAN)).is_err());
        let mut config = CycleRepairConfig::new(sp(19), 4, 2.0);
        config.max_passes = 0;
        assert!(CycleRepairer::new(config).is_err());
    }

    #[test]
    fn fills_premature_cycles_to_target_length() {
        let series = schedule_series(
            &[0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0],
            2.0,
            2.0,
        );
        let outcome = repairer(4, 2.0).repair(&series).expect("repair must succeed");

        assert_eq!(outcome.series.n_rows(), 14);
        assert_eq!(
            outcome.series.index(),
            &[2.0, 4.0, 6.0, 8.0, 10.0, 12.0, 14.0, 16.0, 18.0, 20.0, 22.0, 24.0, 26.0, 28.0]
        );
        assert_eq!(
            outcome.series.column(&sp(19)).unwrap(),
            vec![0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0]
        );
        assert_eq!(outcome.rows_inserted, 2);
        assert_eq!(outcome.rows_deleted, 0);
    }

    #[test]
    fn duplicated_rows_copy_every_column_of_the_last_valid_row() {
        let length = 14;
        let schedule = [
            0.0, 0.0, 1.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 1.0,
        ];
        let payload: Vec<f64> = (0..length).map(|i| 101.0 + i as f64).collect();
        let index = (0..length).map(|i| 3.0 + i as f64 * 3.0).collect();
        let series = Series::from_columns(
            vec![
                (sp(19), schedule.to_vec()),
                (ColumnKey::var(VarGroup::Xmeas, 1), payload),
            ],
            index,
        )
        .unwrap();

        let outcome = CycleRepairer::new(CycleRepairConfig::new(sp(19), 5, 3.0))
            .unwrap()
            .repair(&series)
            .expect("repair must succeed");

        assert_eq!(outcome.series.n_rows(), length + 3);
        assert_eq!(
            outcome.series.index(),
            &[3.0, 6.0, 9.0, 12.0, 15.0, 18.0, 21.0, 24.0, 27.0, 30.0, 33.0, 36.0, 39.0, 42.0, 45.0, 48.0, 51.0]
        );
        assert_eq!(
            outcome.series.column(&sp(19)).unwrap(),
            vec![0.0, 0.0, 1.0, 1.0, 1.0, 0.0, 0.0, 1.0, 1.0, 1.0, 0.0, 0.0, 1.0, 1.0, 1.0, 0.0, 1.0]
        );
        assert_eq!(
            outcome.series.column(&ColumnKey::var(VarGroup::Xmeas, 1)).unwrap(),
            vec![
                101.0, 102.0, 103.0, 104.0, 105.0, 106.0, 107.0, 108.0, 108.0, 108.0, 109.0,
                110.0, 111.0, 112.0, 112.0, 113.0, 114.0
            ]
        );
    }

    #[test]
    fn trims_cycles_that_run_long() {
        let series = schedule_series(
            &[0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0],
            2.0,
            2.0,
        );
        let outcome = repairer(4, 2.0).repair(&series).expect("repair must succeed");

        assert_eq!(outcome.series.n_rows(), 14);
        assert_eq!(
            outcome.series.column(&sp(19)).unwrap(),
            vec![0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0]
        );
        assert_eq!(outcome.rows_deleted, 2);
        assert_eq!(outcome.rows_inserted, 1);
    }

    #[test]
    fn boundary_free_series_only_gets_a_fresh_index() {
        let series = schedule_series(&[0.0, 0.0, 1.0, 1.0, 1.0], 7.0, 1.0);
        let outcome = repairer(4, 2.5).repair(&series).expect("repair must succeed");
        assert_eq!(outcome.series.column(&sp(19)).unwrap(), vec![0.0, 0.0, 1.0, 1.0, 1.0]);
        assert_eq!(outcome.series.index(), &[2.5, 5.0, 7.5, 10.0, 12.5]);
        assert_eq!(outcome.rows_inserted, 0);
        assert_eq!(outcome.rows_deleted, 0);
    }

    #[test]
    fn repair_is_idempotent() {
        let series = schedule_series(
            &[0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0],
            2.0,
            2.0,
        );
        let repairer = repairer(4, 2.0);
        let once = repairer.repair(&series).unwrap();
        let twice = repairer.repair(&once.series).unwrap();
        assert_eq!(once.series, twice.series);
        assert_eq!(twice.rows_inserted, 0);
        assert_eq!(twice.rows_deleted, 0);
    }

    #[test]
    fn missing_reference_column_is_a_configuration_error() {
        let series = schedule_series(&[0.0, 1.0, 0.0, 1.0], 1.0, 1.0);
        let err = CycleRepairer::new(CycleRepairConfig::new(sp(1), 2, 1.0))
            .unwrap()
            .repair(&series)
            .expect_err("missing column must fail");
        assert!(matches!(err, PrepError::Configuration(_)), "got {err:?}");
    }

    #[test]
    fn pass_budget_exhaustion_reports_non_convergence() {
        let series = schedule_series(
            &[0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0],
            2.0,
            2.0,
        );
        let mut config = CycleRepairConfig::new(sp(19), 4, 2.0);
        config.max_passes = 1;
        let err = CycleRepairer::new(config)
            .unwrap()
            .repair(&series)
            .expect_err("one pass cannot finish this repair");
        assert!(matches!(err, PrepError::NonConvergence(_)), "got {err:?}");
    }
}
