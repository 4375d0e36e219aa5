//! Data structures describing the molecular structure that constraints refer to.

pub mod element;
pub mod structure;
