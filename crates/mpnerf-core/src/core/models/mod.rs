//! # Core Models Module
//!
//! Plain data types flowing through the coordinate pipeline.
//!
//! ## Key Components
//!
//! - [`residue`] - The 20 standard amino acids and their code lookups
//! - [`internal`] - Backbone and padded side-chain internal coordinates per residue and chain
//! - [`atom`] - Backbone atom roles and the padded 14-slot per-residue Cartesian layout
//! - [`chain`] - A fully resolved chain of Cartesian coordinates
//! - [`transform`] - Rigid transforms, the monoid composed along the chain
//!
//! ## Usage
//!
//! ```ignore
//! use mpnerf::core::models::internal::{BackboneInternals, ResidueInternals, SidechainInternals};
//! use mpnerf::core::models::residue::AminoAcid;
//!
//! let residue = ResidueInternals::new(
//!     AminoAcid::Glycine,
//!     BackboneInternals::extended(),
//!     SidechainInternals::empty(),
//! );
//! ```

pub mod atom;
pub mod chain;
pub mod internal;
pub mod residue;
pub mod transform;
