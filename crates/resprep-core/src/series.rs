// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::column::ColumnKey;
use crate::error::PrepError;

/// Owned tabular time series: ordered column keys, a numeric time index, and
/// row-major `f64` values. Missing values are `f64::NAN`.
///
/// Every method below is a pure transformation: it borrows `self` and returns
/// a new `Series`, so pipeline stages cannot alias each other's data.
#[derive(Clone, Debug, PartialEq)]
pub struct Series {
    columns: Vec<ColumnKey>,
    index: Vec<f64>,
    values: Vec<f64>,
}

impl Series {
    /// Constructs a validated series. `values` is row-major with
    /// `index.len() * columns.len()` entries.
    pub fn new(
        columns: Vec<ColumnKey>,
        index: Vec<f64>,
        values: Vec<f64>,
    ) -> Result<Self, PrepError> {
        if columns.is_empty() {
            return Err(PrepError::invalid_input("series needs at least one column"));
        }
        for (pos, key) in columns.iter().enumerate() {
            if columns[..pos].contains(key) {
                return Err(PrepError::invalid_input(format!(
                    "duplicate column key {key} at position {pos}"
                )));
            }
        }
        let expected = index.len().checked_mul(columns.len()).ok_or_else(|| {
            PrepError::invalid_input("rows * columns overflow while validating shape")
        })?;
        if values.len() != expected {
            return Err(PrepError::invalid_input(format!(
                "value length mismatch: got {}, expected {} (rows={}, columns={})",
                values.len(),
                expected,
                index.len(),
                columns.len()
            )));
        }
        Ok(Self {
            columns,
            index,
            values,
        })
    }

    /// Convenience constructor from per-column vectors of equal length.
    pub fn from_columns(
        columns: Vec<(ColumnKey, Vec<f64>)>,
        index: Vec<f64>,
    ) -> Result<Self, PrepError> {
        let n = index.len();
        let mut keys = Vec::with_capacity(columns.len());
        for (key, data) in &columns {
            if data.len() != n {
                return Err(PrepError::invalid_input(format!(
                    "column {key} has {} rows, index has {n}",
                    data.len()
                )));
            }
            keys.push(*key);
        }
        let mut values = Vec::with_capacity(n * columns.len());
        for row in 0..n {
            for (_, data) in &columns {
                values.push(data[row]);
            }
        }
        Self::new(keys, index, values)
    }

    pub fn n_rows(&self) -> usize {
        self.index.len()
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[ColumnKey] {
        &self.columns
    }

    pub fn index(&self) -> &[f64] {
        &self.index
    }

    pub fn row(&self, row: usize) -> &[f64] {
        let d = self.n_cols();
        &self.values[row * d..(row + 1) * d]
    }

    pub fn value(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.n_cols() + col]
    }

    pub fn column_position(&self, key: &ColumnKey) -> Option<usize> {
        self.columns.iter().position(|c| c == key)
    }

    pub fn has_column(&self, key: &ColumnKey) -> bool {
        self.column_position(key).is_some()
    }

    /// Copies one column out of the frame.
    pub fn column(&self, key: &ColumnKey) -> Result<Vec<f64>, PrepError> {
        let pos = self.column_position(key).ok_or_else(|| {
            PrepError::configuration(format!("reference column {key} is not present"))
        })?;
        Ok(self.column_at(pos))
    }

    pub fn column_at(&self, pos: usize) -> Vec<f64> {
        let d = self.n_cols();
        (0..self.n_rows()).map(|r| self.values[r * d + pos]).collect()
    }

    /// Nominal index step, taken from the first two samples.
    pub fn index_step(&self) -> Result<f64, PrepError> {
        if self.n_rows() < 2 {
            return Err(PrepError::invalid_input(
                "index step is undefined for a series with fewer than 2 rows",
            ));
        }
        Ok(self.index[1] - self.index[0])
    }

    /// Inserts a row at position `pos`, keeping the time index a uniform
    /// arithmetic sequence: rows before `pos` are untouched, the new row
    /// takes the index value previously at `pos`, and every row from `pos`
    /// onward is shifted forward by one index step.
    pub fn insert_row(&self, pos: usize, row_values: &[f64]) -> Result<Self, PrepError> {
        if row_values.len() != self.n_cols() {
            return Err(PrepError::invalid_input(format!(
                "inserted row has {} values, series has {} columns",
                row_values.len(),
                self.n_cols()
            )));
        }
        if pos >= self.n_rows() {
            return Err(PrepError::invalid_input(format!(
                "insert position {pos} is out of bounds for {} rows",
                self.n_rows()
            )));
        }
        let step = self.index_step()?;

        let d = self.n_cols();
        let mut values = Vec::with_capacity(self.values.len() + d);
        values.extend_from_slice(&self.values[..pos * d]);
        values.extend_from_slice(row_values);
        values.extend_from_slice(&self.values[pos * d..]);

        let mut index = Vec::with_capacity(self.n_rows() + 1);
        index.extend_from_slice(&self.index[..pos]);
        index.push(self.index[pos]);
        index.extend(self.index[pos..].iter().map(|t| t + step));

        Ok(Self {
            columns: self.columns.clone(),
            index,
            values,
        })
    }

    /// Removes rows in `[start, end)` and renumbers the remaining index to a
    /// consecutive uniform sequence starting from the first retained sample's
    /// original offset.
    pub fn remove_rows(&self, start: usize, end: usize) -> Result<Self, PrepError> {
        if start >= end || end > self.n_rows() {
            return Err(PrepError::invalid_input(format!(
                "invalid removal range {start}..{end} for {} rows",
                self.n_rows()
            )));
        }
        if end - start == self.n_rows() {
            return Err(PrepError::invalid_input(
                "removal range would leave an empty series",
            ));
        }
        let step = self.index_step()?;
        let base = if start == 0 {
            self.index[end]
        } else {
            self.index[0]
        };

        let d = self.n_cols();
        let mut values = Vec::with_capacity(self.values.len() - (end - start) * d);
        values.extend_from_slice(&self.values[..start * d]);
        values.extend_from_slice(&self.values[end * d..]);

        let kept = self.n_rows() - (end - start);
        let index = (0..kept).map(|i| base + i as f64 * step).collect();

        Ok(Self {
            columns: self.columns.clone(),
            index,
            values,
        })
    }

    /// Drops the first `n` rows, keeping their original index values.
    pub fn drop_leading(&self, n: usize) -> Result<Self, PrepError> {
        if n > self.n_rows() {
            return Err(PrepError::invalid_input(format!(
                "cannot drop {n} leading rows from {} rows",
                self.n_rows()
            )));
        }
        let d = self.n_cols();
        Ok(Self {
            columns: self.columns.clone(),
            index: self.index[n..].to_vec(),
            values: self.values[n * d..].to_vec(),
        })
    }

    /// Keeps only the first `len` rows.
    pub fn truncate(&self, len: usize) -> Self {
        let len = len.min(self.n_rows());
        let d = self.n_cols();
        Self {
            columns: self.columns.clone(),
            index: self.index[..len].to_vec(),
            values: self.values[..len * d].to_vec(),
        }
    }

    /// Replaces the time index with consecutive integers `0, 1, ...`.
    pub fn with_integer_index(&self) -> Self {
        Self {
            columns: self.columns.clone(),
            index: (0..self.n_rows()).map(|i| i as f64).collect(),
            values: self.values.clone(),
        }
    }

    /// Replaces the time index with the synthetic uniform sequence
    /// `t_i = step * (i + 1)`.
    pub fn with_uniform_index(&self, step: f64) -> Result<Self, PrepError> {
        if !step.is_finite() || step <= 0.0 {
            return Err(PrepError::invalid_input(format!(
                "uniform index step must be finite and > 0, got {step}"
            )));
        }
        Ok(Self {
            columns: self.columns.clone(),
            index: (0..self.n_rows()).map(|i| step * (i + 1) as f64).collect(),
            values: self.values.clone(),
        })
    }

    /// Projects the frame onto `keys`, in the given order.
    pub fn select_columns(&self, keys: &[ColumnKey]) -> Result<Self, PrepError> {
        let mut positions = Vec::with_capacity(keys.len());
        for key in keys {
            let pos = self.column_position(key).ok_or_else(|| {
                PrepError::configuration(format!("cannot select missing column {key}"))
            })?;
            positions.push(pos);
        }
        let d = self.n_cols();
        let mut values = Vec::with_capacity(self.n_rows() * keys.len());
        for row in 0..self.n_rows() {
            for &pos in &positions {
                values.push(self.values[row * d + pos]);
            }
        }
        Self::new(keys.to_vec(), self.index.clone(), values)
    }

    /// Drops the listed columns; absent keys are ignored.
    pub fn drop_columns(&self, keys: &[ColumnKey]) -> Result<Self, PrepError> {
        let kept: Vec<ColumnKey> = self
            .columns
            .iter()
            .copied()
            .filter(|c| !keys.contains(c))
            .collect();
        self.select_columns(&kept)
    }

    /// Overwrites an existing column with new per-row values.
    pub fn with_column(&self, key: &ColumnKey, data: &[f64]) -> Result<Self, PrepError> {
        let pos = self.column_position(key).ok_or_else(|| {
            PrepError::configuration(format!("cannot overwrite missing column {key}"))
        })?;
        if data.len() != self.n_rows() {
            return Err(PrepError::invalid_input(format!(
                "replacement column {key} has {} rows, series has {}",
                data.len(),
                self.n_rows()
            )));
        }
        let d = self.n_cols();
        let mut values = self.values.clone();
        for (row, value) in data.iter().enumerate() {
            values[row * d + pos] = *value;
        }
        Ok(Self {
            columns: self.columns.clone(),
            index: self.index.clone(),
            values,
        })
    }

    /// Appends a new column as the last column of the frame.
    pub fn append_column(&self, key: ColumnKey, data: &[f64]) -> Result<Self, PrepError> {
        if self.has_column(&key) {
            return Err(PrepError::invalid_input(format!(
                "cannot append duplicate column {key}"
            )));
        }
        if data.len() != self.n_rows() {
            return Err(PrepError::invalid_input(format!(
                "appended column {key} has {} rows, series has {}",
                data.len(),
                self.n_rows()
            )));
        }
        let d = self.n_cols();
        let mut values = Vec::with_capacity(self.n_rows() * (d + 1));
        for row in 0..self.n_rows() {
            values.extend_from_slice(&self.values[row * d..(row + 1) * d]);
            values.push(data[row]);
        }
        let mut columns = self.columns.clone();
        columns.push(key);
        Ok(Self {
            columns,
            index: self.index.clone(),
            values,
        })
    }
}
