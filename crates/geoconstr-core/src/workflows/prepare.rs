use crate::core::coords::rotation::wrap_angle;
use crate::core::coords::{Coordinate, InternalCoordinate};
use crate::core::models::structure::Structure;
use crate::engine::compiler::{CompiledConstraints, ConstraintCompiler};
use crate::engine::config::CompilerConfig;
use crate::engine::error::ConstraintError;
use nalgebra::Point3;
use tracing::{debug, info, instrument};

/// Compiled constraints together with the geometry they were compiled against.
///
/// All values are in the compiled unit system: lengths in the configured
/// [`LengthUnit`](crate::core::utils::units::LengthUnit), angles in radians.
#[derive(Debug, Clone)]
pub struct ConstraintPlan {
    compiled: CompiledConstraints,
    config: CompilerConfig,
    current: Vec<f64>,
}

impl ConstraintPlan {
    pub fn compiled(&self) -> &CompiledConstraints {
        &self.compiled
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    pub fn coordinates(&self) -> &[Coordinate] {
        self.compiled.coordinates()
    }

    /// Value of each constrained coordinate at the input geometry.
    pub fn current_values(&self) -> &[f64] {
        &self.current
    }

    pub fn step_count(&self) -> usize {
        self.compiled.step_count()
    }

    /// Concrete targets for grid step `step`, with frozen coordinates held at their
    /// input values. Returns `None` past the last step.
    pub fn targets(&self, step: usize) -> Option<Vec<f64>> {
        let row = self.compiled.grid().get(step)?;
        Some(
            row.iter()
                .zip(&self.current)
                .map(|(target, &current)| target.unwrap_or(current))
                .collect(),
        )
    }

    /// Signed distance of each coordinate from its step target at geometry `xyz`
    /// (in the compiled unit). Dihedral differences are wrapped into `[-π, π)`.
    pub fn residuals(&self, step: usize, xyz: &[Point3<f64>]) -> Option<Vec<f64>> {
        let targets = self.targets(step)?;
        Some(
            self.coordinates()
                .iter()
                .zip(targets)
                .map(|(coord, target)| {
                    let diff = coord.value(xyz) - target;
                    if coord.is_periodic() {
                        wrap_angle(diff)
                    } else {
                        diff
                    }
                })
                .collect(),
        )
    }
}

/// Compiles `text` against `structure` and evaluates the result at the input geometry.
///
/// # Errors
///
/// Returns the first [`ConstraintError`] raised by the compiler.
#[instrument(skip_all, name = "prepare_workflow")]
pub fn run(
    structure: &Structure,
    text: &str,
    config: &CompilerConfig,
) -> Result<ConstraintPlan, ConstraintError> {
    info!(
        "Compiling constraints for a structure with {} atoms (lengths in {}).",
        structure.atom_count(),
        config.length_unit
    );
    let compiled = ConstraintCompiler::new(structure, *config).compile(text)?;

    let xyz = structure.scaled_positions(config.length_scale());
    let current: Vec<f64> = compiled
        .coordinates()
        .iter()
        .map(|coord| coord.value(&xyz))
        .collect();
    for (coord, value) in compiled.coordinates().iter().zip(&current) {
        debug!("Initial value of {}: {:.6}", coord, value);
    }

    info!(
        "Prepared {} constrained coordinate(s) over {} step(s).",
        current.len(),
        compiled.step_count()
    );
    Ok(ConstraintPlan {
        compiled,
        config: *config,
        current,
    })
}
