// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

/// Structured per-case run metadata, assembled while a plant/model pair moves
/// through the pipeline and attached to the final outputs.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CaseReport {
    pub rows_trimmed_plant: usize,
    pub rows_trimmed_model: usize,
    pub rows_inserted: usize,
    pub rows_deleted: usize,
    pub repair_passes: usize,
    pub n_rows_out: usize,
    pub notes: Vec<String>,
    pub warnings: Vec<String>,
}

impl CaseReport {
    pub fn note(&mut self, msg: impl Into<String>) {
        self.notes.push(msg.into());
    }

    pub fn warn(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }
}

#[cfg(test)]
mod tests {
    use super::CaseReport;

    #[test]
    fn default_report_is_empty() {
        let report = CaseReport::default();
        assert_eq!(report.rows_inserted, 0);
        assert_eq!(report.rows_deleted, 0);
        assert!(report.notes.is_empty());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn notes_and_warnings_accumulate_in_order() {
        let mut report = CaseReport::default();
        report.note("trimmed 12 leading rows");
        report.warn("start value out of tolerance");
        report.note("model column rescaled");
        assert_eq!(report.notes.len(), 2);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.notes[0], "trimmed 12 leading rows");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_roundtrip_preserves_all_fields() {
        let report = CaseReport {
            rows_trimmed_plant: 12,
            rows_trimmed_model: 12,
            rows_inserted: 3,
            rows_deleted: 1,
            repair_passes: 5,
            n_rows_out: 2_048,
            notes: vec!["model columns rescaled".to_string()],
            warnings: vec!["start value out of tolerance".to_string()],
        };
        let encoded = serde_json::to_string(&report).expect("report should serialize");
        let decoded: CaseReport = serde_json::from_str(&encoded).expect("report should deserialize");
        assert_eq!(decoded, report);
    }
}
