//! # Workflows Module
//!
//! High-level entry points that take a structure and a constraint text and hand back
//! everything an optimizer driver needs.
//!
//! - **Prepare Workflow** ([`prepare`]) - Compiles the constraints, evaluates every
//!   constrained coordinate at the input geometry, and resolves frozen targets into
//!   concrete values for each grid step.

pub mod prepare;
