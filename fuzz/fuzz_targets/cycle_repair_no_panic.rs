// SPDX-License-Identifier: MIT OR Apache-2.0

#![no_main]

use libfuzzer_sys::fuzz_target;
use resprep_core::{ColumnKey, Series, VarGroup};
use resprep_cycle::{CycleRepairConfig, CycleRepairer};

// Arbitrary schedules may legitimately fail to converge or be rejected as
// invalid input; only a panic is a bug.
fuzz_target!(|data: &[u8]| {
    if data.len() < 3 {
        return;
    }
    let n_cycle = 2 + usize::from(data[0] % 15);
    let max_passes = 1 + usize::from(data[1] % 64);

    let values: Vec<f64> = data[2..]
        .iter()
        .take(512)
        .map(|b| match b % 8 {
            0 => f64::NAN,
            v => f64::from(v % 4),
        })
        .collect();
    if values.is_empty() {
        return;
    }
    let index: Vec<f64> = (0..values.len()).map(|i| (i + 1) as f64).collect();

    let key = ColumnKey::var(VarGroup::Sp, 19);
    let series = match Series::from_columns(vec![(key, values)], index) {
        Ok(series) => series,
        Err(_) => return,
    };

    let mut config = CycleRepairConfig::new(key, n_cycle, 3.0);
    config.max_passes = max_passes;
    let repairer = match CycleRepairer::new(config) {
        Ok(repairer) => repairer,
        Err(_) => return,
    };

    let _ = repairer.repair(&series);
});
