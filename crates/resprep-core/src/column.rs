// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::error::PrepError;
use std::fmt;
use std::str::FromStr;

/// Named signal groups of the simulated process.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VarGroup {
    /// Measured variable, `XMEAS(i)`.
    Xmeas,
    /// Manipulated variable, `XMV(i)`.
    Xmv,
    /// Setpoint / schedule signal, `SP(i)`.
    Sp,
    /// Molar hold-up, `UC(i)`.
    Uc,
    /// Molar flow, `FMOL(i)`.
    Fmol,
    /// One-hot input-disturbance indicator, `IDV(i)`.
    Idv,
}

impl VarGroup {
    fn tag(self) -> &'static str {
        match self {
            Self::Xmeas => "XMEAS",
            Self::Xmv => "XMV",
            Self::Sp => "SP",
            Self::Uc => "UC",
            Self::Fmol => "FMOL",
            Self::Idv => "IDV",
        }
    }

    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "XMEAS" => Some(Self::Xmeas),
            "XMV" => Some(Self::Xmv),
            "SP" => Some(Self::Sp),
            "UC" => Some(Self::Uc),
            "FMOL" => Some(Self::Fmol),
            "IDV" => Some(Self::Idv),
            _ => None,
        }
    }
}

/// Structured column identity: a (group, index) pair instead of a formatted
/// string. String formatting and parsing exist for the I/O boundary only.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ColumnKey {
    /// A numbered process variable, optionally its noise-free `_clean`
    /// companion.
    Var {
        group: VarGroup,
        index: u32,
        clean: bool,
    },
    /// The decoded integer fault label appended as the last output column.
    Fault,
}

impl ColumnKey {
    pub fn var(group: VarGroup, index: u32) -> Self {
        Self::Var {
            group,
            index,
            clean: false,
        }
    }

    pub fn clean_var(group: VarGroup, index: u32) -> Self {
        Self::Var {
            group,
            index,
            clean: true,
        }
    }

    pub fn group(&self) -> Option<VarGroup> {
        match self {
            Self::Var { group, .. } => Some(*group),
            Self::Fault => None,
        }
    }

    pub fn index(&self) -> Option<u32> {
        match self {
            Self::Var { index, .. } => Some(*index),
            Self::Fault => None,
        }
    }

    pub fn is_clean(&self) -> bool {
        matches!(self, Self::Var { clean: true, .. })
    }

    /// The `_clean` companion of a raw variable, if this key can have one.
    pub fn clean_companion(&self) -> Option<Self> {
        match self {
            Self::Var {
                group,
                index,
                clean: false,
            } => Some(Self::Var {
                group: *group,
                index: *index,
                clean: true,
            }),
            _ => None,
        }
    }
}

impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Var {
                group,
                index,
                clean,
            } => {
                write!(f, "{}({index})", group.tag())?;
                if *clean {
                    write!(f, "_clean")?;
                }
                Ok(())
            }
            Self::Fault => write!(f, "fault"),
        }
    }
}

impl FromStr for ColumnKey {
    type Err = PrepError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        if raw == "fault" {
            return Ok(Self::Fault);
        }

        let (body, clean) = match raw.strip_suffix("_clean") {
            Some(body) => (body, true),
            None => (raw, false),
        };

        let open = body.find('(').ok_or_else(|| {
            PrepError::configuration(format!("column name '{raw}' is not of the form TAG(i)"))
        })?;
        let close = body.strip_suffix(')').ok_or_else(|| {
            PrepError::configuration(format!("column name '{raw}' is missing a closing ')'"))
        })?;

        let group = VarGroup::from_tag(&body[..open]).ok_or_else(|| {
            PrepError::configuration(format!(
                "unrecognized variable group '{}' in column '{raw}'",
                &body[..open]
            ))
        })?;
        let index: u32 = close[open + 1..].parse().map_err(|_| {
            PrepError::configuration(format!("non-numeric index in column '{raw}'"))
        })?;

        Ok(Self::Var {
            group,
            index,
            clean,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{ColumnKey, VarGroup};
    use crate::error::PrepError;

    #[test]
    fn formats_raw_clean_and_fault_columns() {
        assert_eq!(ColumnKey::var(VarGroup::Xmeas, 3).to_string(), "XMEAS(3)");
        assert_eq!(ColumnKey::var(VarGroup::Sp, 19).to_string(), "SP(19)");
        assert_eq!(
            ColumnKey::clean_var(VarGroup::Xmeas, 7).to_string(),
            "XMEAS(7)_clean"
        );
        assert_eq!(ColumnKey::Fault.to_string(), "fault");
    }

    #[test]
    fn parses_every_formatted_group() {
        for key in [
            ColumnKey::var(VarGroup::Xmeas, 41),
            ColumnKey::var(VarGroup::Xmv, 11),
            ColumnKey::var(VarGroup::Sp, 1),
            ColumnKey::var(VarGroup::Uc, 6),
            ColumnKey::var(VarGroup::Fmol, 26),
            ColumnKey::var(VarGroup::Idv, 0),
            ColumnKey::clean_var(VarGroup::Xmeas, 3),
            ColumnKey::Fault,
        ] {
            let parsed: ColumnKey = key.to_string().parse().expect("formatted key must parse");
            assert_eq!(parsed, key);
        }
    }

    #[test]
    fn rejects_unknown_group_and_malformed_names() {
        for raw in ["XYZ(1)", "XMEAS", "XMEAS(a)", "XMEAS(1", "Time"] {
            let err = raw.parse::<ColumnKey>().expect_err("must reject");
            assert!(
                matches!(err, PrepError::Configuration(_)),
                "expected configuration error for '{raw}', got {err:?}"
            );
        }
    }

    #[test]
    fn clean_companion_only_exists_for_raw_vars() {
        let raw = ColumnKey::var(VarGroup::Xmeas, 3);
        assert_eq!(
            raw.clean_companion(),
            Some(ColumnKey::clean_var(VarGroup::Xmeas, 3))
        );
        assert_eq!(ColumnKey::clean_var(VarGroup::Xmeas, 3).clean_companion(), None);
        assert_eq!(ColumnKey::Fault.clean_companion(), None);
    }
}
