//! # Engine Module
//!
//! The constraint compiler: everything that turns constraint text into coordinate
//! objects and a schedule of target values.
//!
//! - **Keyword Catalog** ([`catalog`]) - Keyword normalization and the registry of
//!   coordinate classes and atom counts per keyword
//! - **Atom Selection** ([`selector`]) - Index, range-list, and element-symbol tokens
//! - **Linear Scans** ([`scan`]) - Endpoint-inclusive interpolation between value vectors
//! - **Value Grids** ([`grid`]) - Cartesian-product composition of independent scans
//! - **Compiler** ([`compiler`]) - The line-oriented state machine tying it all together
//! - **Configuration** ([`config`]) - Per-invocation compiler settings
//! - **Error Handling** ([`error`]) - Compile errors carrying the offending line

pub mod catalog;
pub mod compiler;
pub mod config;
pub mod error;
pub mod grid;
pub mod scan;
pub mod selector;
