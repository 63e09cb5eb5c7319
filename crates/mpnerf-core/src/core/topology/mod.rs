//! # Topology Module
//!
//! Side-chain topology: for every residue type, the ordered heavy atoms of its side
//! chain, the three already-placed parents each atom is built from, its default
//! internal coordinate, and the chi torsion that drives it.
//!
//! ## Key Components
//!
//! - [`TopologyTable`] - Immutable residue type → [`SidechainTopology`] map, either the
//!   built-in table ([`TopologyTable::builtin`]) or loaded from TOML
//! - [`SidechainTopology`] - Validated atom list; parents always precede children
//! - [`AtomRef`] - Parent reference to a backbone atom or an earlier side-chain slot
//!
//! ## File Format
//!
//! ```toml
//! [SER]
//! atoms = [
//!     { name = "CB", parents = ["N", "C", "CA"], length = 1.52, angle = 109.5, torsion = 122.66 },
//!     { name = "OG", parents = ["N", "CA", "CB"], length = 1.417, angle = 110.77, torsion = -63.3, chi = 0 },
//! ]
//! ```
//!
//! Angles are given in degrees; `chi` is the 0-based index of the driving chi angle.

mod builtin;
pub mod registry;

pub use registry::{
    AtomRef, AtomSpec, ResidueSpec, SidechainAtom, SidechainTopology, TopologyError,
    TopologyLoadError, TopologyTable,
};
