// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Emergency-shutdown (ESD) detection.
//!
//! A simulation that shuts down keeps emitting rows, but the affected signals
//! freeze: the trace shows an abnormally long run of exactly repeated values.
//! [`EsdDetector`] scans monitored columns for such runs and reports where
//! the frozen region starts, so callers can truncate the case (and its tandem
//! residual counterpart) to the region before it. An ESD event is a signal,
//! never an error.

use resprep_core::{ColumnKey, PrepError, Series};

/// Configuration for [`EsdDetector`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EsdConfig {
    /// Minimum number of consecutive exactly-equal samples that qualifies as
    /// a shutdown run.
    pub n_consecutive: usize,
}

impl EsdConfig {
    pub fn new(n_consecutive: usize) -> Self {
        Self { n_consecutive }
    }

    fn validate(&self) -> Result<(), PrepError> {
        if self.n_consecutive < 2 {
            return Err(PrepError::invalid_input(format!(
                "EsdConfig.n_consecutive must be >= 2; got {}",
                self.n_consecutive
            )));
        }
        Ok(())
    }
}

/// Outcome of scanning one column.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EsdReport {
    pub is_esd: bool,
    /// First sample of the first qualifying run, when `is_esd` is true.
    pub start_index: Option<usize>,
}

impl EsdReport {
    fn clear() -> Self {
        Self {
            is_esd: false,
            start_index: None,
        }
    }

    fn detected(start_index: usize) -> Self {
        Self {
            is_esd: true,
            start_index: Some(start_index),
        }
    }
}

/// Flags abnormal prolonged constant-value runs in monitored columns.
#[derive(Clone, Debug)]
pub struct EsdDetector {
    config: EsdConfig,
}

impl EsdDetector {
    pub fn new(config: EsdConfig) -> Result<Self, PrepError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EsdConfig {
        &self.config
    }

    /// Scans a single column for the first run of at least `n_consecutive`
    /// exactly-equal samples. Shorter runs never flag; `NaN` breaks a run
    /// because it compares unequal to everything, itself included.
    pub fn scan_column(&self, values: &[f64]) -> EsdReport {
        let n = values.len();
        if n == 0 {
            return EsdReport::clear();
        }

        let mut run_start = 0usize;
        for i in 1..=n {
            let run_broken = i == n || values[i] != values[i - 1];
            if !run_broken {
                continue;
            }
            if i - run_start >= self.config.n_consecutive {
                return EsdReport::detected(run_start);
            }
            run_start = i;
        }
        EsdReport::clear()
    }

    /// Scans each monitored column independently.
    pub fn scan_series(
        &self,
        series: &Series,
        monitored: &[ColumnKey],
    ) -> Result<Vec<(ColumnKey, EsdReport)>, PrepError> {
        let mut reports = Vec::with_capacity(monitored.len());
        for key in monitored {
            let values = series.column(key)?;
            reports.push((*key, self.scan_column(&values)));
        }
        Ok(reports)
    }

    /// The earliest qualifying run across the monitored set, if any.
    pub fn first_event(
        &self,
        series: &Series,
        monitored: &[ColumnKey],
    ) -> Result<Option<(ColumnKey, usize)>, PrepError> {
        let mut earliest: Option<(ColumnKey, usize)> = None;
        for (key, report) in self.scan_series(series, monitored)? {
            if let Some(start) = report.start_index {
                let replace = earliest.map_or(true, |(_, best)| start < best);
                if replace {
                    earliest = Some((key, start));
                }
            }
        }
        Ok(earliest)
    }
}

/// Keeps only the rows before the shutdown run, `[0, start_index)`.
pub fn truncate_before(series: &Series, start_index: usize) -> Series {
    series.truncate(start_index)
}

/// Trims `other` down to the row count of `reference`, as done when a plant
/// file must match its already-truncated residual counterpart. A shorter or
/// equal `other` is returned unchanged.
pub fn truncate_tandem(reference: &Series, other: &Series) -> Series {
    other.truncate(reference.n_rows())
}

#[cfg(test)]
mod tests {
    use super::{truncate_before, truncate_tandem, EsdConfig, EsdDetector, EsdReport};
    use resprep_core::{ColumnKey, Series, VarGroup};

    fn xmeas(i: u32) -> ColumnKey {
        ColumnKey::var(VarGroup::Xmeas, i)
    }

    fn detector(n_consecutive: usize) -> EsdDetector {
        EsdDetector::new(EsdConfig::new(n_consecutive)).expect("config must be valid")
    }

    fn one_column_series(values: &[f64]) -> Series {
        let index = (0..values.len()).map(|i| (i + 1) as f64).collect();
        Series::from_columns(vec![(xmeas(1), values.to_vec())], index).unwrap()
    }

    #[test]
    fn rejects_threshold_below_two() {
        assert!(EsdDetector::new(EsdConfig::new(0)).is_err());
        assert!(EsdDetector::new(EsdConfig::new(1)).is_err());
        assert!(EsdDetector::new(EsdConfig::new(2)).is_ok());
    }

    #[test]
    fn five_constants_with_threshold_four_flag_the_first_sample() {
        let values = [1.0, 2.0, 3.0, 7.0, 7.0, 7.0, 7.0, 7.0, 4.0];
        let report = detector(4).scan_column(&values);
        assert_eq!(report, EsdReport { is_esd: true, start_index: Some(3) });
    }

    #[test]
    fn three_constants_with_threshold_four_do_not_flag() {
        let values = [1.0, 2.0, 7.0, 7.0, 7.0, 4.0, 5.0];
        let report = detector(4).scan_column(&values);
        assert_eq!(report, EsdReport { is_esd: false, start_index: None });
    }

    #[test]
    fn run_of_exactly_the_threshold_flags() {
        let values = [1.0, 7.0, 7.0, 7.0, 7.0, 4.0];
        let report = detector(4).scan_column(&values);
        assert_eq!(report.start_index, Some(1));
    }

    #[test]
    fn frozen_tail_is_detected() {
        let values = [1.0, 2.0, 3.0, 9.0, 9.0, 9.0, 9.0];
        let report = detector(4).scan_column(&values);
        assert_eq!(report.start_index, Some(3));
    }

    #[test]
    fn first_of_multiple_qualifying_runs_wins() {
        let values = [5.0, 5.0, 5.0, 1.0, 8.0, 8.0, 8.0, 8.0];
        let report = detector(3).scan_column(&values);
        assert_eq!(report.start_index, Some(0));
    }

    #[test]
    fn nan_breaks_a_run() {
        let values = [7.0, 7.0, f64::NAN, 7.0, 7.0, 2.0];
        let report = detector(3).scan_column(&values);
        assert!(!report.is_esd);
    }

    #[test]
    fn empty_and_short_columns_never_flag() {
        assert!(!detector(2).scan_column(&[]).is_esd);
        assert!(!detector(2).scan_column(&[3.0]).is_esd);
    }

    #[test]
    fn first_event_picks_the_earliest_column_run() {
        let index: Vec<f64> = (1..=8).map(f64::from).collect();
        let series = Series::from_columns(
            vec![
                (xmeas(1), vec![1.0, 2.0, 3.0, 6.0, 6.0, 6.0, 6.0, 4.0]),
                (xmeas(2), vec![9.0, 9.0, 9.0, 9.0, 1.0, 2.0, 3.0, 4.0]),
            ],
            index,
        )
        .unwrap();
        let detector = detector(4);
        let event = detector
            .first_event(&series, &[xmeas(1), xmeas(2)])
            .expect("columns exist");
        assert_eq!(event, Some((xmeas(2), 0)));
    }

    #[test]
    fn truncation_keeps_only_the_region_before_the_run() {
        let series = one_column_series(&[1.0, 2.0, 3.0, 9.0, 9.0, 9.0, 9.0]);
        let report = detector(4).scan_column(&series.column(&xmeas(1)).unwrap());
        let truncated = truncate_before(&series, report.start_index.unwrap());
        assert_eq!(truncated.n_rows(), 3);
        assert_eq!(truncated.column(&xmeas(1)).unwrap(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn tandem_truncation_matches_the_reference_length() {
        let residual = one_column_series(&[1.0, 2.0, 3.0]);
        let plant = one_column_series(&[1.0, 2.0, 3.0, 9.0, 9.0]);
        let trimmed = truncate_tandem(&residual, &plant);
        assert_eq!(trimmed.n_rows(), 3);

        // An already-consistent pair is untouched.
        let same = truncate_tandem(&residual, &one_column_series(&[4.0, 5.0, 6.0]));
        assert_eq!(same.n_rows(), 3);
    }

    #[test]
    fn scan_series_reports_every_monitored_column() {
        let index: Vec<f64> = (1..=6).map(f64::from).collect();
        let series = Series::from_columns(
            vec![
                (xmeas(1), vec![1.0, 1.0, 1.0, 1.0, 2.0, 3.0]),
                (xmeas(2), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]),
            ],
            index,
        )
        .unwrap();
        let reports = detector(4)
            .scan_series(&series, &[xmeas(1), xmeas(2)])
            .expect("columns exist");
        assert!(reports[0].1.is_esd);
        assert!(!reports[1].1.is_esd);

        let err = detector(4).scan_series(&series, &[xmeas(9)]);
        assert!(err.is_err());
    }
}
