use super::atom::{Atom, AtomRole, BackboneAtom, ResidueAtoms};
use super::residue::AminoAcid;
use crate::core::topology::TopologyTable;
use nalgebra::Point3;

const UNKNOWN_ATOM_NAME: &str = "?";

/// Cartesian coordinates of a whole chain in padded per-residue layout.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResolvedChain {
    pub residue_types: Vec<AminoAcid>,
    pub residues: Vec<ResidueAtoms>,
}

impl ResolvedChain {
    pub fn new(residue_types: Vec<AminoAcid>, residues: Vec<ResidueAtoms>) -> Self {
        Self {
            residue_types,
            residues,
        }
    }

    pub fn len(&self) -> usize {
        self.residues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.residues.is_empty()
    }

    /// `N, CA, C` of every residue, in chain order.
    pub fn backbone_trace(&self) -> Vec<Point3<f64>> {
        self.residues
            .iter()
            .flat_map(|r| {
                [BackboneAtom::N, BackboneAtom::CA, BackboneAtom::C].map(|atom| r.backbone(atom))
            })
            .collect()
    }

    pub fn ca_trace(&self) -> Vec<Point3<f64>> {
        self.residues
            .iter()
            .map(|r| r.backbone(BackboneAtom::CA))
            .collect()
    }

    pub fn atom_count(&self) -> usize {
        self.residues
            .iter()
            .map(|r| r.mask.iter().filter(|&&valid| valid).count())
            .sum()
    }

    /// Flattens the valid slots into named atoms. Side-chain names come from `table`.
    pub fn atoms<'a>(&'a self, table: &'a TopologyTable) -> Vec<Atom<'a>> {
        self.residues
            .iter()
            .zip(&self.residue_types)
            .enumerate()
            .flat_map(|(residue_index, (atoms, residue_type))| {
                let topology = table.get(*residue_type);
                atoms.iter().map(move |(role, position)| {
                    let name = match role {
                        AtomRole::Backbone(atom) => atom.name(),
                        AtomRole::Sidechain(slot) => topology
                            .and_then(|t| t.atoms().get(slot))
                            .map(|a| a.name.as_str())
                            .unwrap_or(UNKNOWN_ATOM_NAME),
                    };
                    Atom {
                        residue_index,
                        role,
                        name,
                        position,
                    }
                })
            })
            .collect()
    }
}
