// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Residual generation for plant/model simulation pairs.
//!
//! A prepared case subtracts a faultless model simulation from the plant
//! recording sample-for-sample, leaving residual signals in which process
//! faults stand out against a near-zero baseline. [`ResidualGenerator`] does
//! the subtraction and fault-label decoding for one already-aligned pair;
//! [`CaseProcessor`] chains the full per-case pipeline (transient trim, cycle
//! repair, alignment check, generation) and [`CaseProcessor::run_batch`] runs
//! a queue of cases with per-case failure isolation.

mod generator;
mod label;
mod pipeline;

pub use generator::{AccumulateSpec, CaseOutput, ResidualConfig, ResidualGenerator};
pub use label::{AmbiguityPolicy, DecodedLabels, LabelDecoder};
pub use pipeline::{BatchReport, CaseInput, CaseOutcome, CaseProcessor, PipelineConfig};
