use crate::error::{CliError, Result};
use clap::ValueEnum;
use geoconstr::core::coords::rotation::wrap_angle;
use geoconstr::core::coords::{Coordinate, InternalCoordinate, ValueKind};
use geoconstr::engine::compiler::CompiledConstraints;
use geoconstr::engine::config::CompilerConfig;
use geoconstr::workflows::prepare::ConstraintPlan;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Aligned, human-readable tables.
    #[default]
    Text,
    /// A single JSON document.
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub precision: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            precision: 6,
        }
    }
}

/// Converts compiled values back to the units constraint files are written in:
/// lengths in Ångström, angles in degrees.
#[derive(Debug, Clone, Copy)]
struct DisplayUnits {
    length_scale: f64,
}

impl DisplayUnits {
    fn new(config: &CompilerConfig) -> Self {
        Self {
            length_scale: config.length_scale(),
        }
    }

    fn convert(&self, coord: &Coordinate, value: f64) -> f64 {
        match coord.value_kind() {
            ValueKind::Length => value / self.length_scale,
            ValueKind::Angle => value.to_degrees(),
        }
    }

    fn unit_label(coord: &Coordinate) -> &'static str {
        match coord.value_kind() {
            ValueKind::Length => "angstrom",
            ValueKind::Angle => "degree",
        }
    }
}

#[derive(Serialize)]
struct CoordinateEntry {
    index: usize,
    label: String,
    kind: String,
    atoms: Vec<usize>,
    unit: &'static str,
}

impl CoordinateEntry {
    fn new(index: usize, coord: &Coordinate) -> Self {
        Self {
            index,
            label: coord.to_string(),
            kind: coord.kind_name(),
            atoms: coord.atoms().iter().map(|a| a + 1).collect(),
            unit: DisplayUnits::unit_label(coord),
        }
    }
}

#[derive(Serialize)]
struct DeclarationEntry {
    line: usize,
    mode: String,
    keyword: String,
    first_coordinate: usize,
    coordinate_count: usize,
    steps: usize,
}

#[derive(Serialize)]
struct CompileReport {
    coordinates: Vec<CoordinateEntry>,
    declarations: Vec<DeclarationEntry>,
    /// `null` marks a coordinate held at its current value.
    grid: Vec<Vec<Option<f64>>>,
    options: Vec<String>,
    option_entries: Vec<OptionEntry>,
}

#[derive(Serialize)]
struct OptionEntry {
    key: String,
    value: String,
}

#[derive(Serialize)]
struct CheckRow {
    coordinate: CoordinateEntry,
    current: f64,
    target: f64,
    deviation: f64,
    frozen: bool,
}

#[derive(Serialize)]
struct CheckReport {
    step: usize,
    step_count: usize,
    rows: Vec<CheckRow>,
}

fn to_json<T: Serialize>(report: &T) -> Result<String> {
    serde_json::to_string_pretty(report)
        .map_err(|e| CliError::Other(anyhow::anyhow!("Failed to serialize report: {}", e)))
}

pub fn render_compiled(
    compiled: &CompiledConstraints,
    compiler: &CompilerConfig,
    output: &OutputConfig,
) -> Result<String> {
    let units = DisplayUnits::new(compiler);
    let coords = compiled.coordinates();
    let grid: Vec<Vec<Option<f64>>> = compiled
        .grid()
        .iter()
        .map(|row| {
            row.iter()
                .zip(coords)
                .map(|(value, coord)| value.map(|v| units.convert(coord, v)))
                .collect()
        })
        .collect();

    match output.format {
        OutputFormat::Json => to_json(&CompileReport {
            coordinates: coords
                .iter()
                .enumerate()
                .map(|(i, c)| CoordinateEntry::new(i, c))
                .collect(),
            declarations: compiled
                .declarations()
                .iter()
                .map(|d| DeclarationEntry {
                    line: d.line_number,
                    mode: d.mode.to_string(),
                    keyword: d.keyword.clone(),
                    first_coordinate: d.coordinates.start,
                    coordinate_count: d.coordinates.len(),
                    steps: d.steps,
                })
                .collect(),
            grid,
            options: compiled.options().lines().to_vec(),
            option_entries: compiled
                .options()
                .entries()
                .into_iter()
                .map(|(key, value)| OptionEntry { key, value })
                .collect(),
        }),
        OutputFormat::Text => {
            let mut out = String::new();
            writeln!(out, "Constrained coordinates ({}):", coords.len()).ok();
            for (i, coord) in coords.iter().enumerate() {
                writeln!(
                    out,
                    "  {:>4}  {:<28} [{}]",
                    i,
                    coord.to_string(),
                    DisplayUnits::unit_label(coord)
                )
                .ok();
            }
            writeln!(out).ok();
            writeln!(out, "Target grid ({} step(s)):", grid.len()).ok();
            let width = output.precision + 8;
            let mut header = format!("  {:>5}", "step");
            for i in 0..coords.len() {
                write!(header, " {:>width$}", i).ok();
            }
            writeln!(out, "{}", header).ok();
            for (k, row) in grid.iter().enumerate() {
                write!(out, "  {:>5}", k).ok();
                for value in row {
                    let _ = match value {
                        Some(v) => write!(out, " {:>width$.prec$}", v, prec = output.precision),
                        None => write!(out, " {:>width$}", "frozen"),
                    };
                }
                writeln!(out).ok();
            }
            if !compiled.options().is_empty() {
                writeln!(out).ok();
                writeln!(out, "Optimizer options:").ok();
                for (key, value) in compiled.options().entries() {
                    writeln!(out, "  {:<24} {}", key, value).ok();
                }
            }
            Ok(out)
        }
    }
}

pub fn render_check(plan: &ConstraintPlan, step: usize, output: &OutputConfig) -> Result<String> {
    let targets = plan.targets(step).ok_or_else(|| {
        CliError::Argument(format!(
            "Step {} is out of range; the grid has {} step(s).",
            step,
            plan.step_count()
        ))
    })?;
    let units = DisplayUnits::new(plan.config());
    let row = &plan.compiled().grid()[step];

    let rows: Vec<CheckRow> = plan
        .coordinates()
        .iter()
        .enumerate()
        .zip(plan.current_values().iter().zip(&targets))
        .zip(row)
        .map(|(((i, coord), (&current, &target)), explicit)| {
            let mut diff = current - target;
            if coord.is_periodic() {
                diff = wrap_angle(diff);
            }
            CheckRow {
                coordinate: CoordinateEntry::new(i, coord),
                current: units.convert(coord, current),
                target: units.convert(coord, target),
                deviation: units.convert(coord, diff),
                frozen: explicit.is_none(),
            }
        })
        .collect();

    match output.format {
        OutputFormat::Json => to_json(&CheckReport {
            step,
            step_count: plan.step_count(),
            rows,
        }),
        OutputFormat::Text => {
            let prec = output.precision;
            let width = prec + 8;
            let mut out = String::new();
            writeln!(out, "Step {} of {}:", step, plan.step_count()).ok();
            writeln!(
                out,
                "  {:<28} {:>width$} {:>width$} {:>width$}  {}",
                "coordinate", "current", "target", "deviation", "unit"
            )
            .ok();
            for r in &rows {
                writeln!(
                    out,
                    "  {:<28} {:>width$.prec$} {:>width$.prec$} {:>width$.prec$}  {}{}",
                    r.coordinate.label,
                    r.current,
                    r.target,
                    r.deviation,
                    r.coordinate.unit,
                    if r.frozen { " (frozen)" } else { "" }
                )
                .ok();
            }
            Ok(out)
        }
    }
}
