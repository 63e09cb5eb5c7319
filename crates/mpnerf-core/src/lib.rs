//! # MP-NeRF Core Library
//!
//! Parallel construction of protein Cartesian coordinates from internal coordinates
//! (bond lengths, bond angles, torsions), and the inverse measurement.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer layout:
//!
//! - **[`core`]: The Foundation.** Geometry primitives, the rigid-transform monoid and
//!   its scans, data models for internal and Cartesian coordinates, the side-chain
//!   topology table, and the execution backends.
//!
//! - **[`engine`]: The Pipeline.** Unit composition, backbone assembly, side-chain
//!   attachment and the inverse path, plus configuration, errors and progress events.
//!
//! - **[`workflows`]: The Public API.** End-to-end procedures: build one chain, measure
//!   one chain, or convert a padded batch of chains.

pub mod core;
pub mod engine;
pub mod workflows;
