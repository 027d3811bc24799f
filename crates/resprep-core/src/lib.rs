// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Shared data model for the residual preparation engine.
//!
//! Plant and model recordings flow through the engine as [`Series`] values:
//! an ordered set of structured column keys, a numeric time index, and
//! row-major `f64` data. Every transformation in the downstream crates is a
//! pure function from one `Series` to another; file readers and writers live
//! outside this workspace.

mod column;
mod error;
mod report;
mod series;

pub use column::{ColumnKey, VarGroup};
pub use error::PrepError;
pub use report::CaseReport;
pub use series::Series;
