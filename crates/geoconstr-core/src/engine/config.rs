use crate::core::utils::units::LengthUnit;

/// Settings for one compilation.
///
/// The compiler keeps no global state; every unit decision for a call is made here.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CompilerConfig {
    /// Unit of compiled lengths, Cartesian/translation targets and rotation weights.
    pub length_unit: LengthUnit,
}

impl CompilerConfig {
    /// Factor converting Ångström, as written in constraint files, into the compiled unit.
    pub fn length_scale(&self) -> f64 {
        self.length_unit.scale_from_angstrom()
    }
}

#[derive(Default)]
pub struct CompilerConfigBuilder {
    length_unit: Option<LengthUnit>,
}

impl CompilerConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn length_unit(mut self, unit: LengthUnit) -> Self {
        self.length_unit = Some(unit);
        self
    }

    pub fn build(self) -> CompilerConfig {
        CompilerConfig {
            length_unit: self.length_unit.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::utils::units::ANG_TO_BOHR;

    #[test]
    fn default_compiles_to_bohr() {
        let config = CompilerConfig::default();
        assert_eq!(config.length_unit, LengthUnit::Bohr);
        assert_eq!(config.length_scale(), ANG_TO_BOHR);
    }

    #[test]
    fn builder_overrides_length_unit() {
        let config = CompilerConfigBuilder::new()
            .length_unit(LengthUnit::Angstrom)
            .build();
        assert_eq!(config.length_scale(), 1.0);
        assert_eq!(CompilerConfigBuilder::new().build(), CompilerConfig::default());
    }
}
