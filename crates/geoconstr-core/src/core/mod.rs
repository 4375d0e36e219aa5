//! # Core Module
//!
//! Fundamental building blocks shared by the constraint compiler and its consumers.
//!
//! - **Molecular Representation** ([`models`]) - Element symbols and atomic positions
//! - **File I/O** ([`io`]) - Reading and writing XYZ structure files
//! - **Internal Coordinates** ([`coords`]) - Distances, angles, dihedrals, Cartesian
//!   and translational projections, and rigid-body rotation components
//! - **Utilities** ([`utils`]) - Unit conversion and small geometric helpers

pub mod coords;
pub mod io;
pub mod models;
pub mod utils;
