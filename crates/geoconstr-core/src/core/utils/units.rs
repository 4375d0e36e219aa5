use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Length of one bohr in Ångström.
pub const BOHR_TO_ANG: f64 = 0.529177249;

/// Number of bohr in one Ångström.
pub const ANG_TO_BOHR: f64 = 1.0 / BOHR_TO_ANG;

/// The length unit in which compiled coordinates and target values are expressed.
///
/// Constraint files always state lengths in Ångström. The compiler converts them
/// into this unit so that targets line up with the coordinate values an optimizer
/// computes from its own geometry representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LengthUnit {
    /// Atomic units; the working unit of most quantum chemistry backends.
    #[default]
    Bohr,
    /// Keep lengths as written in the constraint file.
    Angstrom,
}

impl LengthUnit {
    /// Multiplier that converts a length in Ångström into this unit.
    pub fn scale_from_angstrom(self) -> f64 {
        match self {
            LengthUnit::Bohr => ANG_TO_BOHR,
            LengthUnit::Angstrom => 1.0,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            LengthUnit::Bohr => "bohr",
            LengthUnit::Angstrom => "Å",
        }
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LengthUnit::Bohr => write!(f, "bohr"),
            LengthUnit::Angstrom => write!(f, "angstrom"),
        }
    }
}

impl FromStr for LengthUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bohr" | "au" | "a.u." => Ok(LengthUnit::Bohr),
            "angstrom" | "ang" | "a" => Ok(LengthUnit::Angstrom),
            other => Err(format!(
                "Unknown length unit '{}'. Expected 'bohr' or 'angstrom'.",
                other
            )),
        }
    }
}
