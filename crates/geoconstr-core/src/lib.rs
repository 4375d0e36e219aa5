//! # geoconstr Core Library
//!
//! A compiler for geometric constraint specifications on molecular structures. A short
//! text file declares which internal coordinates are frozen, set to a value, or scanned
//! over a range; the library turns it into a list of internal-coordinate objects and a
//! grid of target values that a constrained geometry optimizer walks through.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Structure`), XYZ input, unit
//!   conversion, and the internal-coordinate primitives with their quaternion and
//!   exponential-map mathematics.
//!
//! - **[`engine`]: The Compiler.** The keyword catalog, atom selection, linear scan
//!   generation, the line-oriented constraint compiler and the cartesian-product grid
//!   that composes independent scans into a multi-dimensional schedule.
//!
//! - **[`workflows`]: The Public API.** High-level entry points that tie a structure and
//!   a constraint text together and hand back everything an optimizer driver needs.

pub mod core;
pub mod engine;
pub mod workflows;
