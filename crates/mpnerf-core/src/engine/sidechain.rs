use super::error::EngineError;
use crate::core::compute::backend::Backend;
use crate::core::models::atom::{AtomRole, ResidueAtoms};
use crate::core::models::internal::{MAX_SIDECHAIN_ATOMS, ResidueInternals};
use crate::core::topology::{AtomRef, SidechainTopology, TopologyTable};
use crate::core::utils::geometry::{BatchPlacementError, place_batch};
use tracing::{debug, instrument};

impl From<AtomRef> for AtomRole {
    fn from(parent: AtomRef) -> Self {
        match parent {
            AtomRef::Backbone(atom) => AtomRole::Backbone(atom),
            AtomRef::Sidechain(slot) => AtomRole::Sidechain(slot),
        }
    }
}

/// Looks up one residue's topology and checks its side-chain mask against it.
pub(crate) fn resolve_topology<'t>(
    index: usize,
    residue: &ResidueInternals,
    table: &'t TopologyTable,
) -> Result<&'t SidechainTopology, EngineError> {
    let topology = table.get(residue.residue_type).ok_or_else(|| {
        EngineError::unknown_residue(index, residue.residue_type.three_letter_code())
    })?;
    let count = residue.sidechain.count();
    if count != topology.len() {
        return Err(EngineError::shape(
            index,
            format!(
                "{} expects {} side-chain atoms but the mask marks {}",
                residue.residue_type,
                topology.len(),
                count
            ),
        ));
    }
    if !residue.sidechain.is_prefix_mask() {
        return Err(EngineError::shape(
            index,
            "side-chain mask must mark a contiguous run of leading slots",
        ));
    }
    Ok(topology)
}

/// Looks up every residue's topology and checks its side-chain mask against it.
///
/// Runs before any placement so malformed residues are rejected without partial output.
pub fn resolve_topologies<'t>(
    residues: &[ResidueInternals],
    table: &'t TopologyTable,
) -> Result<Vec<&'t SidechainTopology>, EngineError> {
    residues
        .iter()
        .enumerate()
        .map(|(index, residue)| resolve_topology(index, residue, table))
        .collect()
}

/// Places every side-chain atom on an assembled backbone.
///
/// Work is slot-major: for slot `k`, all residues with a valid slot `k` are placed in
/// one batched call. Parents always precede children in a topology, so every parent is
/// in place by the time its slot is processed.
#[instrument(skip_all, name = "attach_sidechains", fields(residues = residues.len()))]
pub fn attach_sidechains<B: Backend>(
    backend: &B,
    residues: &[ResidueInternals],
    topologies: &[&SidechainTopology],
    mut atoms: Vec<ResidueAtoms>,
    epsilon: f64,
) -> Result<Vec<ResidueAtoms>, EngineError> {
    if residues.len() != atoms.len() || residues.len() != topologies.len() {
        return Err(EngineError::shape(
            residues.len().min(atoms.len()).min(topologies.len()),
            format!(
                "{} residues, {} topologies and {} backbone entries",
                residues.len(),
                topologies.len(),
                atoms.len()
            ),
        ));
    }

    let mut placed = 0usize;
    for slot in 0..MAX_SIDECHAIN_ATOMS {
        let active: Vec<usize> = (0..residues.len())
            .filter(|&r| slot < topologies[r].len() && residues[r].sidechain.mask[slot])
            .collect();
        if active.is_empty() {
            break;
        }

        let parent_positions = |which: usize| -> Vec<_> {
            active
                .iter()
                .map(|&r| {
                    let parent = topologies[r].atoms()[slot].parents[which];
                    atoms[r].positions[AtomRole::from(parent).slot()]
                })
                .collect()
        };
        let (a, b, c) = (parent_positions(0), parent_positions(1), parent_positions(2));
        let coords: Vec<_> = active
            .iter()
            .map(|&r| residues[r].sidechain.coords[slot])
            .collect();

        let positions = place_batch(backend, &a, &b, &c, &coords, epsilon).map_err(|e| match e {
            BatchPlacementError::Placement { index, source } => {
                let residue = active[index];
                EngineError::geometry(
                    residue,
                    topologies[residue].atoms()[slot].name.clone(),
                    Some(coords[index]),
                    source,
                )
            }
            BatchPlacementError::Shape { .. } => EngineError::shape(0, e.to_string()),
        })?;

        for (&r, position) in active.iter().zip(positions) {
            atoms[r].set(AtomRole::Sidechain(slot), position);
        }
        placed += active.len();
    }

    debug!(atoms = placed, "Attached side-chain atoms.");
    Ok(atoms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::compute::backend::Serial;
    use crate::core::models::atom::BackboneAtom;
    use crate::core::models::internal::{BackboneInternals, SidechainInternals};
    use crate::core::models::residue::AminoAcid;
    use crate::core::utils::geometry::{
        DEFAULT_DEGENERACY_EPSILON, InternalCoord, angle_difference, bond_angle, dihedral,
        distance,
    };
    use crate::engine::assembler::assemble;
    use crate::engine::composer::compose_units;
    use crate::engine::config::ConversionConfig;

    fn residues(sequence: &[AminoAcid]) -> Vec<ResidueInternals> {
        let table = TopologyTable::builtin();
        sequence
            .iter()
            .map(|&aa| {
                ResidueInternals::new(
                    aa,
                    BackboneInternals::ideal(-1.1, 2.4, std::f64::consts::PI),
                    SidechainInternals::from_topology(table.get(aa).unwrap(), &[]),
                )
            })
            .collect()
    }

    fn backbone_atoms(residues: &[ResidueInternals]) -> Vec<ResidueAtoms> {
        let backbone: Vec<_> = residues.iter().map(|r| r.backbone).collect();
        let units = compose_units(&Serial, &backbone, DEFAULT_DEGENERACY_EPSILON).unwrap();
        assemble(&Serial, &units, &ConversionConfig::default()).unwrap()
    }

    fn attach(residues: &[ResidueInternals]) -> Result<Vec<ResidueAtoms>, EngineError> {
        let table = TopologyTable::builtin();
        let topologies = resolve_topologies(residues, table)?;
        attach_sidechains(
            &Serial,
            residues,
            &topologies,
            backbone_atoms(residues),
            DEFAULT_DEGENERACY_EPSILON,
        )
    }

    #[test]
    fn mixed_glycine_tryptophan_chain_is_masked_per_residue() {
        use AminoAcid::{Glycine as G, Tryptophan as W};
        let sequence = [G, W, G, W, W, G];
        let chain = residues(&sequence);
        let atoms = attach(&chain).unwrap();

        for (residue, aa) in atoms.iter().zip(&sequence) {
            match aa {
                G => {
                    assert_eq!(residue.sidechain_count(), 0);
                    assert!(residue.positions[4..].iter().all(|p| *p == nalgebra::Point3::origin()));
                }
                _ => assert_eq!(residue.sidechain_count(), MAX_SIDECHAIN_ATOMS),
            }
            for atom in BackboneAtom::ALL {
                assert!(residue.get(AtomRole::Backbone(atom)).is_some());
            }
        }

        // Every tryptophan atom sits at its internal coordinate from its own parents.
        let trp = TopologyTable::builtin().get(W).unwrap();
        for (r, aa) in sequence.iter().enumerate() {
            if *aa != W {
                continue;
            }
            for (slot, atom) in trp.atoms().iter().enumerate() {
                let [pa, pb, pc] = atom.parents.map(|p| atoms[r].positions[AtomRole::from(p).slot()]);
                let d = atoms[r].sidechain(slot).unwrap();
                assert!((distance(&pc, &d) - atom.coord.length).abs() < 1e-9);
                assert!((bond_angle(&pb, &pc, &d) - atom.coord.angle).abs() < 1e-9);
                assert!(angle_difference(dihedral(&pa, &pb, &pc, &d), atom.coord.torsion).abs() < 1e-9);
            }
            // The ring stays attached to its own residue.
            let ca = atoms[r].backbone(BackboneAtom::CA);
            let ch2 = atoms[r].sidechain(trp.index_of("CH2").unwrap()).unwrap();
            assert!(distance(&ca, &ch2) < 7.0);
        }
    }

    #[test]
    fn every_builtin_residue_attaches() {
        let chain = residues(&AminoAcid::ALL);
        let atoms = attach(&chain).unwrap();
        let table = TopologyTable::builtin();
        for (residue, aa) in atoms.iter().zip(AminoAcid::ALL) {
            assert_eq!(residue.sidechain_count(), table.get(aa).unwrap().len());
        }
    }

    #[test]
    fn mask_mismatch_is_rejected_before_placement() {
        let mut chain = residues(&[AminoAcid::Serine, AminoAcid::Alanine]);
        chain[1].sidechain.mask[1] = true;
        match attach(&chain) {
            Err(EngineError::ShapeMismatch { residue, .. }) => assert_eq!(residue, 1),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn holes_in_the_mask_are_rejected() {
        let mut chain = residues(&[AminoAcid::Serine]);
        chain[0].sidechain.mask[0] = false;
        chain[0].sidechain.mask[2] = true;
        assert!(matches!(attach(&chain), Err(EngineError::ShapeMismatch { .. })));
    }

    #[test]
    fn missing_topology_is_an_unknown_residue_type() {
        let mut table = TopologyTable::default();
        table.insert(AminoAcid::Glycine, SidechainTopology::default());
        let chain = residues(&[AminoAcid::Glycine, AminoAcid::Valine]);
        match resolve_topologies(&chain, &table) {
            Err(EngineError::UnknownResidueType { residue, name, .. }) => {
                assert_eq!(residue, 1);
                assert_eq!(name, "VAL");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn invalid_side_chain_coordinate_reports_atom_name() {
        let mut chain = residues(&[AminoAcid::Glycine, AminoAcid::Leucine]);
        chain[1].sidechain.coords[2] = InternalCoord::new(1.5, 0.0, 0.0);
        match attach(&chain) {
            Err(EngineError::Geometry { residue, atom, .. }) => {
                assert_eq!(residue, 1);
                assert_eq!(atom, "CD1");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
