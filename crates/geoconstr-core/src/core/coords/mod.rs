//! # Internal Coordinates
//!
//! Scalar functions of a subset of atomic positions used to express geometric
//! constraints independently of the full Cartesian representation.
//!
//! - [`primitive`] - The coordinate kinds (distance, angle, dihedral, Cartesian axis,
//!   translation axis, rotation axis) behind the [`InternalCoordinate`] capability.
//! - [`rotation`] - Quaternion alignment and the exponential map that lets rigid-body
//!   rotations compose additively like the other coordinates.

pub mod primitive;
pub mod rotation;

pub use primitive::{
    Angle, Axis, CartesianAxis, Coordinate, Dihedral, Distance, InternalCoordinate,
    RotationAxis, TranslationAxis, ValueKind,
};
