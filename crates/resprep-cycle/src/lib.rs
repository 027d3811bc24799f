// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Cycle boundary detection and cycle-length repair.
//!
//! Simulation schedules are periodic, but a trace sometimes carries an extra
//! or a missing sample per cycle. [`detect_boundaries`] locates schedule
//! resets in a reference column; [`CycleRepairer`] forces every cycle to the
//! configured length by duplicating or deleting rows next to the offending
//! boundary.

mod detector;
mod repairer;

pub use detector::{cycle_lengths, detect_boundaries};
pub use repairer::{CycleRepairConfig, CycleRepairer, RepairOutcome};
