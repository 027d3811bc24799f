// SPDX-License-Identifier: MIT OR Apache-2.0

#![no_main]

use libfuzzer_sys::fuzz_target;
use resprep_core::{ColumnKey, Series, VarGroup};
use resprep_residual::{AmbiguityPolicy, LabelDecoder};

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }
    let n_cols = 1 + usize::from(data[0] % 8);
    let policy = if data[1] % 2 == 0 {
        AmbiguityPolicy::Reject
    } else {
        AmbiguityPolicy::Flag
    };

    let cells: Vec<f64> = data[2..]
        .iter()
        .take(n_cols * 64)
        .map(|b| match b % 5 {
            0 => 0.0,
            1 => 1.0,
            2 => f64::NAN,
            3 => 1.0 + f64::from(*b) * 1e-8,
            _ => f64::from(*b),
        })
        .collect();
    let n_rows = cells.len() / n_cols;
    if n_rows == 0 {
        return;
    }

    let columns: Vec<(ColumnKey, Vec<f64>)> = (0..n_cols)
        .map(|c| {
            let data = (0..n_rows).map(|r| cells[r * n_cols + c]).collect();
            (ColumnKey::var(VarGroup::Idv, c as u32), data)
        })
        .collect();
    let index: Vec<f64> = (0..n_rows).map(|i| (i + 1) as f64).collect();
    let series = match Series::from_columns(columns, index) {
        Ok(series) => series,
        Err(_) => return,
    };

    let _ = LabelDecoder::new(VarGroup::Idv, policy).decode(&series);
});
