// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::column::ColumnKey;
use std::fmt;

/// Error taxonomy for the residual preparation engine.
///
/// Per-case failures are values, not aborts: a batch runner collects one
/// `PrepError` per failing case and keeps processing the rest. An ESD event
/// is deliberately absent here; it is a signal (`EsdReport`), not an error.
#[derive(Clone, Debug, PartialEq)]
pub enum PrepError {
    /// Malformed frame or out-of-range parameter.
    InvalidInput(String),
    /// Unrecognized variable group or missing reference column.
    Configuration(String),
    /// Schedule/setpoint column does not line up with expectations.
    Alignment(String),
    /// Plant and model feature-column sets differ; subtraction is undefined.
    DimensionMismatch(String),
    /// The cycle repair loop exhausted its pass budget.
    NonConvergence(String),
    /// More than one one-hot indicator column set on the same row.
    AmbiguousLabel {
        row: usize,
        set_columns: Vec<ColumnKey>,
    },
}

impl PrepError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn alignment(msg: impl Into<String>) -> Self {
        Self::Alignment(msg.into())
    }

    pub fn dimension_mismatch(msg: impl Into<String>) -> Self {
        Self::DimensionMismatch(msg.into())
    }

    pub fn non_convergence(msg: impl Into<String>) -> Self {
        Self::NonConvergence(msg.into())
    }
}

impl fmt::Display for PrepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            Self::Configuration(msg) => write!(f, "configuration error: {msg}"),
            Self::Alignment(msg) => write!(f, "alignment error: {msg}"),
            Self::DimensionMismatch(msg) => write!(f, "dimension mismatch: {msg}"),
            Self::NonConvergence(msg) => write!(f, "cycle repair did not converge: {msg}"),
            Self::AmbiguousLabel { row, set_columns } => {
                write!(
                    f,
                    "ambiguous fault label at row {row}: {} indicator columns set ({})",
                    set_columns.len(),
                    set_columns
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            }
        }
    }
}

impl std::error::Error for PrepError {}
