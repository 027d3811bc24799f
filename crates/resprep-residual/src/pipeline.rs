// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::generator::{CaseOutput, ResidualConfig, ResidualGenerator};
use resprep_align::{AlignConfig, Aligner};
use resprep_core::{PrepError, Series};
use resprep_cycle::{CycleRepairConfig, CycleRepairer};

const DEFAULT_ALIGNMENT_CHECK_LEN: usize = 10;

/// Configuration for [`CaseProcessor`]: one sub-config per pipeline stage.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct PipelineConfig {
    pub align: AlignConfig,
    pub repair: CycleRepairConfig,
    pub residual: ResidualConfig,
    /// Number of head rows compared when verifying that the repaired plant
    /// and the model run on the same schedule.
    pub alignment_check_len: usize,
}

impl PipelineConfig {
    pub fn new(align: AlignConfig, repair: CycleRepairConfig, residual: ResidualConfig) -> Self {
        Self {
            align,
            repair,
            residual,
            alignment_check_len: DEFAULT_ALIGNMENT_CHECK_LEN,
        }
    }
}

/// One plant/model pair queued for processing.
#[derive(Clone, Debug)]
pub struct CaseInput {
    pub case_id: String,
    pub plant: Series,
    pub model: Series,
    /// Skip the expected-start check on the plant side; some zero-disturbance
    /// recordings legitimately open past the transient.
    pub start_check_exempt: bool,
}

/// Runs one plant/model pair through trim, cycle repair, alignment check and
/// residual generation.
#[derive(Clone, Debug)]
pub struct CaseProcessor {
    aligner: Aligner,
    repairer: CycleRepairer,
    generator: ResidualGenerator,
    check_len: usize,
}

impl CaseProcessor {
    pub fn new(config: PipelineConfig) -> Result<Self, PrepError> {
        Ok(Self {
            aligner: Aligner::new(config.align)?,
            repairer: CycleRepairer::new(config.repair)?,
            generator: ResidualGenerator::new(config.residual)?,
            check_len: config.alignment_check_len,
        })
    }

    /// Processes a single case end to end.
    ///
    /// The model side never fails the start check: its transient length is
    /// what the trim discovers, not an expectation to enforce.
    pub fn process(&self, case: &CaseInput) -> Result<CaseOutput, PrepError> {
        let plant_trim = self
            .aligner
            .trim_leading(&case.plant, case.start_check_exempt)?;
        let model_trim = self.aligner.trim_leading(&case.model, true)?;

        let repaired = self.repairer.repair(&plant_trim.series)?;
        self.aligner
            .check_alignment(&repaired.series, &model_trim.series, self.check_len)?;

        let mut output = self.generator.generate(repaired.series, model_trim.series)?;
        output.report.rows_trimmed_plant = plant_trim.rows_trimmed;
        output.report.rows_trimmed_model = model_trim.rows_trimmed;
        output.report.rows_inserted = repaired.rows_inserted;
        output.report.rows_deleted = repaired.rows_deleted;
        output.report.repair_passes = repaired.passes;
        if let Some(warning) = plant_trim.warning {
            output.report.warn(warning);
        }
        Ok(output)
    }

    /// Processes a queue of cases, isolating failures: one bad case is
    /// recorded and the rest keep going. Cases for which `already_produced`
    /// returns true are skipped, which makes interrupted batch runs cheap to
    /// resume.
    pub fn run_batch<F>(&self, cases: &[CaseInput], already_produced: F) -> BatchReport
    where
        F: Fn(&str) -> bool,
    {
        let mut outcomes = Vec::with_capacity(cases.len());
        for case in cases {
            if already_produced(&case.case_id) {
                outcomes.push(CaseOutcome::Skipped {
                    case_id: case.case_id.clone(),
                });
                continue;
            }
            let outcome = match self.process(case) {
                Ok(output) => CaseOutcome::Completed {
                    case_id: case.case_id.clone(),
                    output,
                },
                Err(error) => CaseOutcome::Failed {
                    case_id: case.case_id.clone(),
                    error,
                },
            };
            outcomes.push(outcome);
        }
        BatchReport { outcomes }
    }
}

/// Per-case result of a batch run.
#[derive(Clone, Debug)]
pub enum CaseOutcome {
    Completed { case_id: String, output: CaseOutput },
    Skipped { case_id: String },
    Failed { case_id: String, error: PrepError },
}

impl CaseOutcome {
    pub fn case_id(&self) -> &str {
        match self {
            Self::Completed { case_id, .. }
            | Self::Skipped { case_id }
            | Self::Failed { case_id, .. } => case_id,
        }
    }
}

/// Everything a batch run produced, in input order.
#[derive(Clone, Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<CaseOutcome>,
}

impl BatchReport {
    pub fn n_completed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, CaseOutcome::Completed { .. }))
            .count()
    }

    pub fn n_skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, CaseOutcome::Skipped { .. }))
            .count()
    }

    pub fn n_failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, CaseOutcome::Failed { .. }))
            .count()
    }

    /// The failed cases with their errors, in input order.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &PrepError)> {
        self.outcomes.iter().filter_map(|o| match o {
            CaseOutcome::Failed { case_id, error } => Some((case_id.as_str(), error)),
            _ => None,
        })
    }
}
