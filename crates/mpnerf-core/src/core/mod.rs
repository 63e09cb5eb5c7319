//! # Core Module
//!
//! Stateless building blocks of the coordinate pipeline: data models, geometry
//! primitives, the side-chain topology table and the array-computation backends.
//!
//! ## Architecture
//!
//! - **Data Models** ([`models`]) - Residue types, internal coordinates, padded atom
//!   layouts, resolved chains and the rigid-transform monoid
//! - **Computation** ([`compute`]) - The [`compute::backend::Backend`] abstraction with
//!   serial and data-parallel implementations, and associative prefix scans
//! - **Structural Knowledge** ([`topology`]) - Built-in and user-supplied side-chain
//!   topology tables
//! - **Utilities** ([`utils`]) - Single-atom and batched NeRF placement, measurement,
//!   superposition and residue-code lookup tables
//!
//! Nothing in this layer logs progress or owns configuration; orchestration lives in
//! [`crate::engine`] and [`crate::workflows`].

pub mod compute;
pub mod models;
pub mod topology;
pub mod utils;
