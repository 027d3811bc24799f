// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::label::{AmbiguityPolicy, LabelDecoder};
use resprep_align::Aligner;
use resprep_core::{CaseReport, ColumnKey, PrepError, Series, VarGroup};

/// Folds a block of permuted source columns into one target column.
///
/// Some recordings shuffle one physical stream across several columns; the
/// per-row sum restores the stream. The target receives the sum and every
/// other source is overwritten with `NaN` so downstream consumers see the
/// columns as missing rather than silently stale.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct AccumulateSpec {
    pub target: ColumnKey,
    /// Columns summed per row; must include `target`.
    pub sources: Vec<ColumnKey>,
}

impl AccumulateSpec {
    fn validate(&self) -> Result<(), PrepError> {
        if self.target.is_clean() || self.target.group().is_none() {
            return Err(PrepError::invalid_input(format!(
                "AccumulateSpec.target must be a raw process variable; got {}",
                self.target
            )));
        }
        if !self.sources.contains(&self.target) {
            return Err(PrepError::invalid_input(format!(
                "AccumulateSpec.sources must include the target {}",
                self.target
            )));
        }
        for (pos, key) in self.sources.iter().enumerate() {
            if self.sources[..pos].contains(key) {
                return Err(PrepError::invalid_input(format!(
                    "duplicate accumulate source {key}"
                )));
            }
        }
        Ok(())
    }
}

/// Configuration for [`ResidualGenerator`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct ResidualConfig {
    /// Variable group holding the one-hot fault indicator block.
    pub label_group: VarGroup,
    pub ambiguity: AmbiguityPolicy,
    /// Spacing of the shared synthetic time index.
    pub sampling_time: f64,
    /// Rescale each model feature column to the plant column's mean and
    /// standard deviation before subtracting.
    pub scale_model: bool,
    /// Optional permuted-column repair applied to the plant side.
    pub accumulate: Option<AccumulateSpec>,
}

impl ResidualConfig {
    pub fn new(sampling_time: f64) -> Self {
        Self {
            label_group: VarGroup::Idv,
            ambiguity: AmbiguityPolicy::default(),
            sampling_time,
            scale_model: false,
            accumulate: None,
        }
    }

    fn validate(&self) -> Result<(), PrepError> {
        if !self.sampling_time.is_finite() || self.sampling_time <= 0.0 {
            return Err(PrepError::invalid_input(format!(
                "ResidualConfig.sampling_time must be finite and > 0; got {}",
                self.sampling_time
            )));
        }
        if let Some(spec) = &self.accumulate {
            spec.validate()?;
        }
        Ok(())
    }
}

/// The two frames a finished case yields, plus its run metadata.
#[derive(Clone, Debug, PartialEq)]
pub struct CaseOutput {
    /// Plant measurements with the indicator block replaced by the decoded
    /// `fault` column.
    pub plant: Series,
    /// Plant minus model over the shared feature columns, same `fault`
    /// column appended last.
    pub residual: Series,
    pub report: CaseReport,
}

/// Subtracts a model simulation from its plant counterpart sample-for-sample.
#[derive(Clone, Debug)]
pub struct ResidualGenerator {
    config: ResidualConfig,
}

impl ResidualGenerator {
    pub fn new(config: ResidualConfig) -> Result<Self, PrepError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ResidualConfig {
        &self.config
    }

    fn feature_columns(&self, series: &Series) -> Vec<ColumnKey> {
        series
            .columns()
            .iter()
            .copied()
            .filter(|key| *key != ColumnKey::Fault && key.group() != Some(self.config.label_group))
            .collect()
    }

    /// Produces the residual frame for one plant/model pair.
    ///
    /// Both inputs are truncated to the shorter one's length and moved onto
    /// the shared synthetic clock before subtracting, so row `i` of the
    /// residual is always plant row `i` minus model row `i`.
    pub fn generate(&self, plant: Series, model: Series) -> Result<CaseOutput, PrepError> {
        let mut report = CaseReport::default();

        let (plant, model) = Aligner::even_lengths(plant, model);
        let mut plant = plant.with_uniform_index(self.config.sampling_time)?;
        let mut model = model.with_uniform_index(self.config.sampling_time)?;

        let plant_features = self.feature_columns(&plant);
        let model_features = self.feature_columns(&model);
        self.check_feature_sets(&plant_features, &model_features)?;

        if self.config.scale_model {
            model = scale_to_reference(&model, &plant, &plant_features, &mut report)?;
        }
        if let Some(spec) = &self.config.accumulate {
            plant = self.apply_accumulate(plant, spec, &mut report)?;
        }

        let decoder = LabelDecoder::new(self.config.label_group, self.config.ambiguity);
        let decoded = decoder.decode(&plant)?;
        for &row in &decoded.ambiguous_rows {
            report.warn(format!(
                "row {row}: multiple fault indicators set, label defaulted to 0"
            ));
        }
        let labels = decoded.as_f64();

        let plant_positions: Vec<usize> = plant_features
            .iter()
            .filter_map(|key| plant.column_position(key))
            .collect();
        let model_positions: Vec<usize> = plant_features
            .iter()
            .filter_map(|key| model.column_position(key))
            .collect();

        let mut values = Vec::with_capacity(plant.n_rows() * plant_features.len());
        for row in 0..plant.n_rows() {
            for (&p, &m) in plant_positions.iter().zip(&model_positions) {
                values.push(plant.value(row, p) - model.value(row, m));
            }
        }
        let residual = Series::new(plant_features, plant.index().to_vec(), values)?
            .append_column(ColumnKey::Fault, &labels)?;

        let label_columns = decoder.label_columns(&plant);
        let plant = plant
            .drop_columns(&label_columns)?
            .append_column(ColumnKey::Fault, &labels)?;

        report.n_rows_out = plant.n_rows();
        Ok(CaseOutput {
            plant,
            residual,
            report,
        })
    }

    fn check_feature_sets(
        &self,
        plant_features: &[ColumnKey],
        model_features: &[ColumnKey],
    ) -> Result<(), PrepError> {
        let only_plant: Vec<String> = plant_features
            .iter()
            .filter(|key| !model_features.contains(key))
            .map(ToString::to_string)
            .collect();
        let only_model: Vec<String> = model_features
            .iter()
            .filter(|key| !plant_features.contains(key))
            .map(ToString::to_string)
            .collect();
        if only_plant.is_empty() && only_model.is_empty() {
            return Ok(());
        }
        Err(PrepError::dimension_mismatch(format!(
            "feature columns differ: plant-only [{}], model-only [{}]",
            only_plant.join(", "),
            only_model.join(", ")
        )))
    }

    fn apply_accumulate(
        &self,
        plant: Series,
        spec: &AccumulateSpec,
        report: &mut CaseReport,
    ) -> Result<Series, PrepError> {
        let mut plant = accumulate_into(&plant, &spec.target, &spec.sources)?;
        report.note(format!(
            "accumulated {} source columns into {}",
            spec.sources.len(),
            spec.target
        ));

        // The noise-free companion block is folded the same way, when the
        // frame carries a complete one.
        if let Some(clean_target) = spec.target.clean_companion() {
            let clean_sources: Vec<ColumnKey> = spec
                .sources
                .iter()
                .filter_map(|key| key.clean_companion())
                .collect();
            let complete = clean_sources.len() == spec.sources.len()
                && plant.has_column(&clean_target)
                && clean_sources.iter().all(|key| plant.has_column(key));
            if complete {
                plant = accumulate_into(&plant, &clean_target, &clean_sources)?;
            }
        }
        Ok(plant)
    }
}

/// Sums `sources` row-wise into `target` (skipping `NaN` samples) and blanks
/// every other source column.
fn accumulate_into(
    series: &Series,
    target: &ColumnKey,
    sources: &[ColumnKey],
) -> Result<Series, PrepError> {
    let positions: Vec<usize> = sources
        .iter()
        .map(|key| {
            series.column_position(key).ok_or_else(|| {
                PrepError::configuration(format!("accumulate source column {key} is not present"))
            })
        })
        .collect::<Result<_, _>>()?;

    let mut sums = Vec::with_capacity(series.n_rows());
    for row in 0..series.n_rows() {
        let sum = positions
            .iter()
            .map(|&pos| series.value(row, pos))
            .filter(|v| !v.is_nan())
            .sum();
        sums.push(sum);
    }

    let blank = vec![f64::NAN; series.n_rows()];
    let mut out = series.with_column(target, &sums)?;
    for source in sources.iter().filter(|key| *key != target) {
        out = out.with_column(source, &blank)?;
    }
    Ok(out)
}

/// Standardizes each model feature column and rescales it to the matching
/// plant column's mean and standard deviation. Columns with zero spread on
/// either side are left untouched.
fn scale_to_reference(
    model: &Series,
    plant: &Series,
    features: &[ColumnKey],
    report: &mut CaseReport,
) -> Result<Series, PrepError> {
    let mut out = model.clone();
    let mut scaled = 0usize;
    for key in features {
        let model_col = model.column(key)?;
        let plant_col = plant.column(key)?;
        let (m_mean, m_std) = moments(&model_col);
        let (p_mean, p_std) = moments(&plant_col);
        if !(m_std > 0.0) || !(p_std > 0.0) {
            report.note(format!("column {key} has zero spread, left unscaled"));
            continue;
        }
        let rescaled: Vec<f64> = model_col
            .iter()
            .map(|v| (v - m_mean) / m_std * p_std + p_mean)
            .collect();
        out = out.with_column(key, &rescaled)?;
        scaled += 1;
    }
    if scaled > 0 {
        report.note(format!("rescaled {scaled} model columns to plant statistics"));
    }
    Ok(out)
}

fn moments(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (f64::NAN, f64::NAN);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    (mean, var.sqrt())
}
