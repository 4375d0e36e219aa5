//! Provides input/output functionality for molecular structure files.
//!
//! The constraint compiler only needs element symbols and coordinates, so a single
//! plain-text format is supported behind a trait that other formats can implement.

pub mod traits;
pub mod xyz;
