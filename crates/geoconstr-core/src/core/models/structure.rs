use super::element::same_element;
use nalgebra::Point3;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StructureError {
    #[error("Structure has {elements} element labels but {positions} positions")]
    LengthMismatch { elements: usize, positions: usize },
    #[error("Structure contains no atoms")]
    Empty,
}

/// A molecular structure reduced to what the constraint compiler needs: one element
/// symbol and one Cartesian position per atom.
///
/// Positions are stored in Ångström, the unit of the files the structure is read from.
#[derive(Debug, Clone, PartialEq)]
pub struct Structure {
    elements: Vec<String>,
    positions: Vec<Point3<f64>>,
}

impl Structure {
    /// Creates a structure from parallel element and position lists.
    ///
    /// # Errors
    ///
    /// Returns [`StructureError::LengthMismatch`] if the lists differ in length and
    /// [`StructureError::Empty`] if they contain no atoms.
    pub fn new(elements: Vec<String>, positions: Vec<Point3<f64>>) -> Result<Self, StructureError> {
        if elements.len() != positions.len() {
            return Err(StructureError::LengthMismatch {
                elements: elements.len(),
                positions: positions.len(),
            });
        }
        if elements.is_empty() {
            return Err(StructureError::Empty);
        }
        Ok(Self {
            elements,
            positions,
        })
    }

    pub fn atom_count(&self) -> usize {
        self.elements.len()
    }

    pub fn elements(&self) -> &[String] {
        &self.elements
    }

    pub fn element(&self, index: usize) -> Option<&str> {
        self.elements.get(index).map(String::as_str)
    }

    /// Positions in Ångström.
    pub fn positions(&self) -> &[Point3<f64>] {
        &self.positions
    }

    /// Positions multiplied by `scale`, e.g. [`ANG_TO_BOHR`](crate::core::utils::units::ANG_TO_BOHR).
    pub fn scaled_positions(&self, scale: f64) -> Vec<Point3<f64>> {
        self.positions.iter().map(|p| p * scale).collect()
    }

    /// Zero-based indices of every atom whose element matches `symbol`, ignoring case.
    pub fn indices_of_element(&self, symbol: &str) -> Vec<usize> {
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, e)| same_element(e, symbol))
            .map(|(i, _)| i)
            .collect()
    }
}
