//! # Engine Module
//!
//! The conversion pipeline that turns internal coordinates into Cartesian ones, and
//! back again.
//!
//! ## Overview
//!
//! The forward direction runs in three stages, each written once and generic over a
//! [`Backend`](crate::core::compute::backend::Backend):
//!
//! - **Unit composition** ([`composer`]) builds every residue's backbone in a local
//!   frame with no dependency on its neighbours beyond the previous residue's internals.
//! - **Backbone assembly** ([`assembler`]) solves one junction transform per residue
//!   boundary, composes them with a prefix scan, and docks every unit into the chain.
//! - **Side-chain attachment** ([`sidechain`]) places side-chain atoms slot by slot
//!   across all residues, driven by the topology table.
//!
//! The [`inverse`] module measures internal coordinates from placed atoms.
//!
//! Configuration lives in [`config`], failures in [`error`], and stage events in
//! [`progress`].

pub mod assembler;
pub mod composer;
pub mod config;
pub mod error;
pub mod inverse;
pub mod progress;
pub mod sidechain;
