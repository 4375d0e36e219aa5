use super::catalog::{self, CatalogEntry, CoordinateClass, Family};
use super::config::CompilerConfig;
use super::error::{ConstraintError, LineErrorKind};
use super::grid::{Target, ValueGroup, cartesian_product, product_size};
use super::scan::{linspace, one_dimensional_scan};
use super::selector::{parse_atom_number, select_atoms, validate_indices};
use crate::core::coords::rotation::axis_angle_displacement;
use crate::core::coords::{
    Angle, Axis, CartesianAxis, Coordinate, Dihedral, Distance, RotationAxis, TranslationAxis,
};
use crate::core::models::structure::Structure;
use crate::core::utils::geometry::radius_of_gyration;
use nalgebra::{Point3, Unit, Vector3};
use std::fmt;
use std::ops::Range;
use std::str::FromStr;
use tracing::{debug, info, warn};

const OPTIONS_MARKER: &str = "$options";
const END_MARKER: &str = "$end";

/// What a declaration does with its coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Hold the coordinates at their current values.
    Freeze,
    /// Drive the coordinates to one target.
    Set,
    /// Walk the coordinates through evenly spaced targets.
    Scan,
}

impl Mode {
    pub fn name(self) -> &'static str {
        match self {
            Mode::Freeze => "freeze",
            Mode::Set => "set",
            Mode::Scan => "scan",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "freeze" => Ok(Mode::Freeze),
            "set" => Ok(Mode::Set),
            "scan" => Ok(Mode::Scan),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParserState {
    AwaitingMode,
    InMode(Mode),
    InOptions { resume: Option<Mode> },
}

impl ParserState {
    fn mode(self) -> Option<Mode> {
        match self {
            ParserState::AwaitingMode => None,
            ParserState::InMode(mode) => Some(mode),
            ParserState::InOptions { resume } => resume,
        }
    }

    fn resume(mode: Option<Mode>) -> Self {
        mode.map_or(ParserState::AwaitingMode, ParserState::InMode)
    }
}

/// Summary of one compiled declaration line.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub line_number: usize,
    pub mode: Mode,
    /// Normalized keyword, e.g. `xy` for `yx`.
    pub keyword: String,
    /// Positions of this declaration's coordinates in the flattened coordinate list.
    pub coordinates: Range<usize>,
    /// Number of steps this declaration contributes to the grid.
    pub steps: usize,
}

/// The verbatim contents of the `$options` … `$end` block.
///
/// The compiler does not interpret these lines; they belong to the optimizer driver.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionsBlock {
    lines: Vec<String>,
}

impl OptionsBlock {
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Splits each non-comment line into a key and the rest of the line.
    pub fn entries(&self) -> Vec<(String, String)> {
        self.lines
            .iter()
            .filter_map(|line| {
                let content = line.split('#').next().unwrap_or("").trim();
                if content.is_empty() {
                    return None;
                }
                let (key, value) = content
                    .split_once(char::is_whitespace)
                    .unwrap_or((content, ""));
                Some((key.to_string(), value.trim().to_string()))
            })
            .collect()
    }
}

/// The result of compiling a constraint text.
///
/// `grid()[k][i]` is the target of `coordinates()[i]` at step `k`; `None` means the
/// coordinate is frozen at whatever value it has when the step starts.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledConstraints {
    coordinates: Vec<Coordinate>,
    grid: Vec<Vec<Target>>,
    options: OptionsBlock,
    declarations: Vec<Declaration>,
}

impl CompiledConstraints {
    pub fn coordinates(&self) -> &[Coordinate] {
        &self.coordinates
    }

    pub fn grid(&self) -> &[Vec<Target>] {
        &self.grid
    }

    pub fn options(&self) -> &OptionsBlock {
        &self.options
    }

    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    /// Number of target snapshots the optimizer has to visit.
    pub fn step_count(&self) -> usize {
        self.grid.len()
    }

    /// True if at least one declaration scans, i.e. the grid has more than one row.
    pub fn is_scan(&self) -> bool {
        self.declarations.iter().any(|d| d.mode == Mode::Scan)
    }
}

/// Compiles constraint texts against one structure.
///
/// The compiler borrows the structure and may be reused for any number of inputs;
/// each call to [`compile`](Self::compile) is independent.
pub struct ConstraintCompiler<'a> {
    structure: &'a Structure,
    config: CompilerConfig,
    reference: Vec<Point3<f64>>,
}

impl<'a> ConstraintCompiler<'a> {
    pub fn new(structure: &'a Structure, config: CompilerConfig) -> Self {
        let reference = structure.scaled_positions(config.length_scale());
        Self {
            structure,
            config,
            reference,
        }
    }

    /// Compiles `text` into coordinates and a value grid.
    ///
    /// # Errors
    ///
    /// Returns [`ConstraintError::Line`] for the first line that cannot be compiled and
    /// [`ConstraintError::Internal`] if the accumulated groups are inconsistent.
    pub fn compile(&self, text: &str) -> Result<CompiledConstraints, ConstraintError> {
        let mut state = ParserState::AwaitingMode;
        let mut options = OptionsBlock::default();
        let mut coordinate_groups: Vec<Vec<Coordinate>> = Vec::new();
        let mut value_groups: Vec<ValueGroup> = Vec::new();
        let mut declarations = Vec::new();
        let mut offset = 0;

        for (index, raw) in text.lines().enumerate() {
            let line_number = index + 1;
            let lowered = raw.to_lowercase();

            if lowered.contains(OPTIONS_MARKER) && !matches!(state, ParserState::InOptions { .. }) {
                info!("-> Additional optimizer options provided in the constraints file:");
                state = ParserState::InOptions {
                    resume: state.mode(),
                };
            }
            if let ParserState::InOptions { resume } = state {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    info!("-> {}", trimmed);
                }
                let is_marker = lowered.contains(OPTIONS_MARKER) || lowered.contains(END_MARKER);
                if !is_marker && !trimmed.is_empty() {
                    options.lines.push(trimmed.to_string());
                }
                if lowered.contains(END_MARKER) {
                    state = ParserState::resume(resume);
                }
                continue;
            }

            let line = raw.split('#').next().unwrap_or("").trim().to_lowercase();
            if line.is_empty() {
                continue;
            }
            debug!("Constraint line {}: {}", line_number, line);

            if let Some(name) = line.strip_prefix('$') {
                let name = name.trim();
                state = if name == &END_MARKER[1..] {
                    ParserState::AwaitingMode
                } else {
                    let mode = Mode::from_str(name).map_err(|_| {
                        ConstraintError::at_line(
                            line_number,
                            &line,
                            LineErrorKind::UnknownMode(name.to_string()),
                        )
                    })?;
                    ParserState::InMode(mode)
                };
                continue;
            }

            let mode = state.mode().ok_or_else(|| {
                ConstraintError::at_line(line_number, &line, LineErrorKind::ModeNotSet)
            })?;
            let (keyword, coordinates, values) = self
                .compile_declaration(&line, mode)
                .map_err(|kind| ConstraintError::at_line(line_number, &line, kind))?;

            declarations.push(Declaration {
                line_number,
                mode,
                keyword,
                coordinates: offset..offset + coordinates.len(),
                steps: values.len(),
            });
            offset += coordinates.len();
            coordinate_groups.push(coordinates);
            value_groups.push(values);
        }

        if matches!(state, ParserState::InOptions { .. }) {
            warn!("The $options block was not closed with $end; it extends to the end of the input.");
        }

        check_groups(&coordinate_groups, &value_groups)?;

        debug!(
            "Expanding {} value group(s) into {} grid row(s).",
            value_groups.len(),
            product_size(&value_groups)
        );
        let grid = cartesian_product(&value_groups);
        let coordinates: Vec<Coordinate> = coordinate_groups.into_iter().flatten().collect();
        info!(
            "Compiled {} declaration(s) into {} coordinate(s) and {} grid step(s).",
            declarations.len(),
            coordinates.len(),
            grid.len()
        );

        Ok(CompiledConstraints {
            coordinates,
            grid,
            options,
            declarations,
        })
    }

    fn compile_declaration(
        &self,
        line: &str,
        mode: Mode,
    ) -> Result<(String, Vec<Coordinate>, ValueGroup), LineErrorKind> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let (keyword, entry) = catalog::resolve(tokens[0])
            .ok_or_else(|| LineErrorKind::UnknownKeyword(tokens[0].to_string()))?;

        let expected = 1
            + entry.atom_count
            + match mode {
                Mode::Freeze => 0,
                Mode::Set => entry.set_value_count(),
                Mode::Scan => entry.scan_value_count(),
            };
        if tokens.len() != expected {
            return Err(LineErrorKind::TokenCount {
                expected,
                actual: tokens.len(),
            });
        }

        let atom_tokens = &tokens[1..1 + entry.atom_count];
        let fields = &tokens[1 + entry.atom_count..];
        let (coordinates, values) = match entry.family {
            Family::Cartesian => self.cartesian(entry, atom_tokens[0], fields, mode)?,
            Family::Translation => self.translation(entry, atom_tokens[0], fields, mode)?,
            Family::Internal => self.internal(entry, atom_tokens, fields, mode)?,
            Family::Rotation => self.rotation(atom_tokens[0], fields, mode)?,
        };
        Ok((keyword, coordinates, values))
    }

    fn cartesian(
        &self,
        entry: &CatalogEntry,
        atom_token: &str,
        fields: &[&str],
        mode: Mode,
    ) -> Result<(Vec<Coordinate>, ValueGroup), LineErrorKind> {
        let atoms = select_atoms(atom_token, self.structure)?;
        let coordinates: Vec<Coordinate> = entry
            .classes
            .iter()
            .flat_map(|class| {
                let axis = class_axis(*class);
                atoms
                    .iter()
                    .map(move |&a| Coordinate::Cartesian(CartesianAxis::new(axis, a, 1.0)))
            })
            .collect();

        // Every atom of the group shares its class's target.
        let per_class = self.length_values(fields, entry.classes.len(), mode)?;
        let values: ValueGroup = per_class
            .into_iter()
            .map(|step| {
                step.into_iter()
                    .flat_map(|v| std::iter::repeat_n(v, atoms.len()))
                    .collect()
            })
            .collect();
        Ok((coordinates, values))
    }

    fn translation(
        &self,
        entry: &CatalogEntry,
        atom_token: &str,
        fields: &[&str],
        mode: Mode,
    ) -> Result<(Vec<Coordinate>, ValueGroup), LineErrorKind> {
        let atoms = select_atoms(atom_token, self.structure)?;
        let coordinates: Vec<Coordinate> = entry
            .classes
            .iter()
            .map(|class| {
                Coordinate::Translation(TranslationAxis::centroid(
                    class_axis(*class),
                    atoms.clone(),
                ))
            })
            .collect();
        let values = self.length_values(fields, entry.classes.len(), mode)?;
        Ok((coordinates, values))
    }

    fn internal(
        &self,
        entry: &CatalogEntry,
        atom_tokens: &[&str],
        fields: &[&str],
        mode: Mode,
    ) -> Result<(Vec<Coordinate>, ValueGroup), LineErrorKind> {
        let mut raw = atom_tokens
            .iter()
            .map(|t| parse_atom_number(t))
            .collect::<Result<Vec<i64>, _>>()?;

        let class = entry.classes[0];
        let reverse = match class {
            CoordinateClass::Distance => raw[0] > raw[1],
            CoordinateClass::Angle => raw[0] > raw[2],
            CoordinateClass::Dihedral => raw[1] > raw[2],
            _ => false,
        };
        if reverse {
            raw.reverse();
        }
        let atoms = validate_indices(&raw, self.structure.atom_count(), &atom_tokens.join(" "))?;

        let (coordinate, to_internal): (Coordinate, fn(f64, f64) -> f64) = match class {
            CoordinateClass::Distance => (
                Coordinate::Distance(Distance::new(atoms[0], atoms[1])),
                |v, scale| v * scale,
            ),
            CoordinateClass::Angle => (
                Coordinate::Angle(Angle::new(atoms[0], atoms[1], atoms[2])),
                |v, _| v.to_radians(),
            ),
            CoordinateClass::Dihedral => (
                Coordinate::Dihedral(Dihedral::new(atoms[0], atoms[1], atoms[2], atoms[3])),
                |v, _| v.to_radians(),
            ),
            other => unreachable!("catalog maps {other:?} to the internal family"),
        };

        let scale = self.config.length_scale();
        let values: ValueGroup = match mode {
            Mode::Freeze => vec![vec![None]],
            Mode::Set => vec![vec![Some(to_internal(parse_number(fields[0])?, scale))]],
            Mode::Scan => {
                let start = to_internal(parse_number(fields[0])?, scale);
                let stop = to_internal(parse_number(fields[1])?, scale);
                let steps = parse_steps(fields[2])?;
                linspace(start, stop, steps)
                    .into_iter()
                    .map(|v| vec![Some(v)])
                    .collect()
            }
        };
        Ok((vec![coordinate], values))
    }

    fn rotation(
        &self,
        atom_token: &str,
        fields: &[&str],
        mode: Mode,
    ) -> Result<(Vec<Coordinate>, ValueGroup), LineErrorKind> {
        let atoms = select_atoms(atom_token, self.structure)?;
        let reference: Vec<Point3<f64>> = atoms.iter().map(|&a| self.reference[a]).collect();
        let rg = radius_of_gyration(&reference).unwrap_or(0.0);
        debug!("Rotation group {} has radius of gyration {:.6}", atom_token, rg);

        let coordinates: Vec<Coordinate> = [Axis::X, Axis::Y, Axis::Z]
            .into_iter()
            .map(|component| {
                Coordinate::Rotation(RotationAxis::new(
                    component,
                    atoms.clone(),
                    reference.clone(),
                    rg,
                ))
            })
            .collect();

        let values: ValueGroup = match mode {
            Mode::Freeze => vec![vec![None; 3]],
            Mode::Set | Mode::Scan => {
                let axis = Vector3::new(
                    parse_number(fields[0])?,
                    parse_number(fields[1])?,
                    parse_number(fields[2])?,
                );
                if axis.norm() == 0.0 {
                    return Err(LineErrorKind::ZeroRotationAxis);
                }
                let axis = Unit::new_normalize(axis);
                let theta1 = parse_number(fields[3])?.to_radians();
                let angles = if mode == Mode::Set {
                    vec![theta1]
                } else {
                    let theta2 = parse_number(fields[4])?.to_radians();
                    linspace(theta1, theta2, parse_steps(fields[5])?)
                };
                angles
                    .into_iter()
                    .map(|theta| {
                        axis_angle_displacement(&axis, theta, rg)
                            .iter()
                            .map(|&v| Some(v))
                            .collect()
                    })
                    .collect()
            }
        };
        Ok((coordinates, values))
    }

    /// Per-class length targets for the Cartesian and translation families.
    fn length_values(
        &self,
        fields: &[&str],
        class_count: usize,
        mode: Mode,
    ) -> Result<ValueGroup, LineErrorKind> {
        let scale = self.config.length_scale();
        let parse_lengths = |tokens: &[&str]| -> Result<Vec<f64>, LineErrorKind> {
            tokens.iter().map(|t| Ok(parse_number(t)? * scale)).collect()
        };
        let group = match mode {
            Mode::Freeze => vec![vec![None; class_count]],
            Mode::Set => vec![
                parse_lengths(&fields[..class_count])?
                    .into_iter()
                    .map(Some)
                    .collect(),
            ],
            Mode::Scan => {
                let initial = parse_lengths(&fields[..class_count])?;
                let final_values = parse_lengths(&fields[class_count..2 * class_count])?;
                let steps = parse_steps(fields[2 * class_count])?;
                one_dimensional_scan(&initial, &final_values, steps)
                    .map_err(|e| match e {
                        ConstraintError::DimensionMismatch { initial, final_len } => {
                            LineErrorKind::DimensionMismatch { initial, final_len }
                        }
                        _ => LineErrorKind::DimensionMismatch {
                            initial: initial.len(),
                            final_len: final_values.len(),
                        },
                    })?
                    .into_iter()
                    .map(|step| step.into_iter().map(Some).collect())
                    .collect()
            }
        };
        Ok(group)
    }
}

/// Compiles a constraint text against `structure`.
///
/// This is a convenience wrapper around [`ConstraintCompiler`].
///
/// # Errors
///
/// See [`ConstraintCompiler::compile`].
pub fn parse_constraints(
    structure: &Structure,
    text: &str,
    config: &CompilerConfig,
) -> Result<CompiledConstraints, ConstraintError> {
    ConstraintCompiler::new(structure, *config).compile(text)
}

fn class_axis(class: CoordinateClass) -> Axis {
    class
        .axis()
        .unwrap_or_else(|| unreachable!("catalog maps axis-less {class:?} to an axis family"))
}

fn parse_number(token: &str) -> Result<f64, LineErrorKind> {
    token
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| LineErrorKind::InvalidNumber(token.to_string()))
}

fn parse_steps(token: &str) -> Result<usize, LineErrorKind> {
    match token.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(LineErrorKind::InvalidStepCount(token.to_string())),
    }
}

fn check_groups(
    coordinate_groups: &[Vec<Coordinate>],
    value_groups: &[ValueGroup],
) -> Result<(), ConstraintError> {
    if coordinate_groups.len() != value_groups.len() {
        return Err(ConstraintError::Internal(format!(
            "{} coordinate groups but {} value groups",
            coordinate_groups.len(),
            value_groups.len()
        )));
    }
    for (index, (coords, values)) in coordinate_groups.iter().zip(value_groups).enumerate() {
        if let Some(step) = values.iter().find(|step| step.len() != coords.len()) {
            return Err(ConstraintError::Internal(format!(
                "declaration {} has {} coordinates but a step with {} values",
                index + 1,
                coords.len(),
                step.len()
            )));
        }
    }
    Ok(())
}
