// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Start alignment for plant/model pairs.
//!
//! Both recordings open with a transient segment in which the reference
//! setpoint sits at its start value; the segment lengths differ between the
//! two simulators, so the transients are trimmed before the series can be
//! subtracted sample-for-sample. [`Aligner::even_lengths`] and
//! [`Aligner::reindex_pair`] then put both series on one synthetic clock.

use resprep_core::{ColumnKey, PrepError, Series};

/// What to do when the reference column does not start at the expected value.
///
/// The two behaviors both exist in historical tooling; the policy is explicit
/// and configurable here. `Warn` trims zero rows and records the anomaly.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StartPolicy {
    #[default]
    Warn,
    Fatal,
}

/// Configuration for [`Aligner`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct AlignConfig {
    /// Setpoint column that marks the start transient.
    pub ref_column: ColumnKey,
    /// Value the reference column holds during the transient.
    pub expected_start: f64,
    /// Absolute tolerance for matching `expected_start`.
    pub tolerance: f64,
    /// Policy for a first row that is already out of tolerance.
    pub start_policy: StartPolicy,
    /// Spacing of the synthetic time index.
    pub sampling_time: f64,
}

impl AlignConfig {
    pub fn new(ref_column: ColumnKey, expected_start: f64, sampling_time: f64) -> Self {
        Self {
            ref_column,
            expected_start,
            tolerance: 1e-6,
            start_policy: StartPolicy::default(),
            sampling_time,
        }
    }

    fn validate(&self) -> Result<(), PrepError> {
        if !self.expected_start.is_finite() {
            return Err(PrepError::invalid_input(format!(
                "AlignConfig.expected_start must be finite; got {}",
                self.expected_start
            )));
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(PrepError::invalid_input(format!(
                "AlignConfig.tolerance must be finite and >= 0; got {}",
                self.tolerance
            )));
        }
        if !self.sampling_time.is_finite() || self.sampling_time <= 0.0 {
            return Err(PrepError::invalid_input(format!(
                "AlignConfig.sampling_time must be finite and > 0; got {}",
                self.sampling_time
            )));
        }
        Ok(())
    }
}

/// A trimmed series plus what the trim did.
#[derive(Clone, Debug, PartialEq)]
pub struct TrimOutcome {
    pub series: Series,
    pub rows_trimmed: usize,
    pub warning: Option<String>,
}

/// Removes leading transients and aligns two series onto one clock.
#[derive(Clone, Debug)]
pub struct Aligner {
    config: AlignConfig,
}

impl Aligner {
    pub fn new(config: AlignConfig) -> Result<Self, PrepError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AlignConfig {
        &self.config
    }

    fn matches_start(&self, value: f64) -> bool {
        (value - self.config.expected_start).abs() <= self.config.tolerance
    }

    /// Drops leading rows while the reference column matches the expected
    /// start value; stops at the first non-matching row.
    ///
    /// A first row already out of tolerance is an anomaly unless the caller
    /// marks the case `exempt` (zero-disturbance whitelist): `Fatal` fails,
    /// `Warn` trims nothing and records a warning.
    pub fn trim_leading(&self, series: &Series, exempt: bool) -> Result<TrimOutcome, PrepError> {
        let reference = series.column(&self.config.ref_column)?;

        let rows_trimmed = reference
            .iter()
            .take_while(|v| self.matches_start(**v))
            .count();

        let mut warning = None;
        if rows_trimmed == 0 && !exempt {
            let found = reference.first().copied().unwrap_or(f64::NAN);
            let message = format!(
                "reference column {} starts at {found}, expected {} (tolerance {})",
                self.config.ref_column, self.config.expected_start, self.config.tolerance
            );
            match self.config.start_policy {
                StartPolicy::Fatal => return Err(PrepError::alignment(message)),
                StartPolicy::Warn => warning = Some(message),
            }
        }

        Ok(TrimOutcome {
            series: series.drop_leading(rows_trimmed)?,
            rows_trimmed,
            warning,
        })
    }

    /// Truncates both series to the shorter one's length, preserving row
    /// order from the start.
    pub fn even_lengths(a: Series, b: Series) -> (Series, Series) {
        let shared = a.n_rows().min(b.n_rows());
        (a.truncate(shared), b.truncate(shared))
    }

    /// Discards both original indices and assigns the synthetic uniform index
    /// `t_i = sampling_time * (i + 1)` to each series, so that row `i` of one
    /// corresponds to row `i` of the other.
    pub fn reindex_pair(&self, a: Series, b: Series) -> Result<(Series, Series), PrepError> {
        let step = self.config.sampling_time;
        Ok((a.with_uniform_index(step)?, b.with_uniform_index(step)?))
    }

    /// Verifies that the reference column of two series agrees over the first
    /// `head` rows within tolerance. Time misalignments accumulate later in a
    /// case, so only the head is comparable.
    pub fn check_alignment(&self, a: &Series, b: &Series, head: usize) -> Result<(), PrepError> {
        let col_a = a.column(&self.config.ref_column)?;
        let col_b = b.column(&self.config.ref_column)?;
        let head = head.min(col_a.len()).min(col_b.len());
        for row in 0..head {
            if (col_a[row] - col_b[row]).abs() > self.config.tolerance {
                return Err(PrepError::alignment(format!(
                    "reference column {} disagrees at row {row}: {} vs {}",
                    self.config.ref_column, col_a[row], col_b[row]
                )));
            }
        }
        Ok(())
    }
}
