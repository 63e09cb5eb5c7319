//! # Workflows Module
//!
//! Top-level entry points that tie the engine stages together.
//!
//! - **Build** ([`build`]) - internal coordinates of one chain to placed atoms.
//! - **Measure** ([`measure`]) - placed atoms of one chain back to internal coordinates.
//! - **Batch** ([`batch`]) - a padded batch of chains converted chain by chain, with
//!   failures isolated to the chain that caused them.
//!
//! Each workflow validates its input before any placement, reports stage events
//! through a [`ProgressReporter`](crate::engine::progress::ProgressReporter), and
//! dispatches on the configured [`BackendKind`](crate::core::compute::backend::BackendKind).

pub mod batch;
pub mod build;
pub mod measure;
