// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use resprep_core::{ColumnKey, PrepError, Series, VarGroup};

/// Absolute tolerance for treating an indicator sample as "set".
const SET_TOLERANCE: f64 = 1e-6;

/// What to do with a row on which more than one indicator column is set.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AmbiguityPolicy {
    /// Fail the case with [`PrepError::AmbiguousLabel`].
    #[default]
    Reject,
    /// Label the row `0` and record it for the case report.
    Flag,
}

/// Per-row integer fault labels decoded from a one-hot indicator block.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DecodedLabels {
    pub labels: Vec<u32>,
    /// Rows with more than one indicator set, under [`AmbiguityPolicy::Flag`].
    pub ambiguous_rows: Vec<usize>,
}

impl DecodedLabels {
    /// The labels as an `f64` column ready to append to a [`Series`].
    pub fn as_f64(&self) -> Vec<f64> {
        self.labels.iter().map(|l| f64::from(*l)).collect()
    }
}

/// Collapses a block of one-hot indicator columns into one integer label per
/// row.
///
/// A row with no indicator set decodes to `0` (no active disturbance); a row
/// with exactly one set decodes to that column's numeric index. Indicator
/// values are matched against `1.0` within a small absolute tolerance, so a
/// file that stores the block as floats still decodes cleanly.
#[derive(Clone, Copy, Debug)]
pub struct LabelDecoder {
    group: VarGroup,
    policy: AmbiguityPolicy,
}

impl LabelDecoder {
    pub fn new(group: VarGroup, policy: AmbiguityPolicy) -> Self {
        Self { group, policy }
    }

    /// The indicator columns of `series`, in frame order.
    pub fn label_columns(&self, series: &Series) -> Vec<ColumnKey> {
        series
            .columns()
            .iter()
            .copied()
            .filter(|key| key.group() == Some(self.group) && !key.is_clean())
            .collect()
    }

    /// Decodes every row of `series`.
    pub fn decode(&self, series: &Series) -> Result<DecodedLabels, PrepError> {
        let keys = self.label_columns(series);
        if keys.is_empty() {
            return Err(PrepError::configuration(format!(
                "series has no {} indicator columns to decode labels from",
                ColumnKey::var(self.group, 0)
            )));
        }
        let positions: Vec<usize> = keys
            .iter()
            .map(|key| {
                series
                    .column_position(key)
                    .ok_or_else(|| PrepError::configuration(format!("missing column {key}")))
            })
            .collect::<Result<_, _>>()?;

        let mut labels = Vec::with_capacity(series.n_rows());
        let mut ambiguous_rows = Vec::new();
        for row in 0..series.n_rows() {
            let mut set = Vec::new();
            for (key, &pos) in keys.iter().zip(&positions) {
                if (series.value(row, pos) - 1.0).abs() <= SET_TOLERANCE {
                    set.push(*key);
                }
            }
            let label = match set.len() {
                0 => 0,
                1 => set[0].index().unwrap_or(0),
                _ => match self.policy {
                    AmbiguityPolicy::Reject => {
                        return Err(PrepError::AmbiguousLabel {
                            row,
                            set_columns: set,
                        })
                    }
                    AmbiguityPolicy::Flag => {
                        ambiguous_rows.push(row);
                        0
                    }
                },
            };
            labels.push(label);
        }

        Ok(DecodedLabels {
            labels,
            ambiguous_rows,
        })
    }
}
