use super::error::EngineError;
use crate::core::compute::backend::Backend;
use crate::core::models::atom::{AtomRole, BackboneAtom, ResidueAtoms};
use crate::core::models::chain::ResolvedChain;
use crate::core::models::internal::{
    BackboneInternals, ChainInternals, ResidueInternals, SidechainInternals, TERMINAL_SENTINEL,
};
use crate::core::topology::{SidechainTopology, TopologyTable};
use crate::core::utils::geometry::{
    DEFAULT_DEGENERACY_EPSILON, GeometryError, InternalCoord, bond_angle, dihedral, distance,
    frame_basis, wrap_angle,
};
use nalgebra::Point3;
use std::f64::consts::PI;
use tracing::instrument;

fn backbone_of(residue: usize, atoms: &ResidueAtoms) -> Result<[Point3<f64>; 4], EngineError> {
    let mut out = [Point3::origin(); 4];
    for (slot, atom) in out.iter_mut().zip(BackboneAtom::ALL) {
        *slot = atoms
            .get(AtomRole::Backbone(atom))
            .ok_or_else(|| EngineError::shape(residue, format!("backbone atom {atom} is masked")))?;
    }
    Ok(out)
}

fn degenerate(residue: usize, atom: &str) -> EngineError {
    EngineError::geometry(residue, atom, None, GeometryError::Degenerate)
}

/// Angle at `b`, rejecting coincident neighbours.
fn measured_angle(
    residue: usize,
    atom: &str,
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
) -> Result<f64, EngineError> {
    if !(distance(a, b) > DEFAULT_DEGENERACY_EPSILON && distance(b, c) > DEFAULT_DEGENERACY_EPSILON)
    {
        return Err(degenerate(residue, atom));
    }
    Ok(bond_angle(a, b, c))
}

/// Dihedral `a-b-c-d`, rejecting collinear or coincident triples on either side.
fn measured_dihedral(
    residue: usize,
    atom: &str,
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
    d: &Point3<f64>,
) -> Result<f64, EngineError> {
    frame_basis(a, b, c, DEFAULT_DEGENERACY_EPSILON)
        .and_then(|_| frame_basis(b, c, d, DEFAULT_DEGENERACY_EPSILON))
        .map_err(|source| EngineError::geometry(residue, atom, None, source))?;
    Ok(dihedral(a, b, c, d))
}

fn measure_backbone(
    residue: usize,
    current: &ResidueAtoms,
    previous: Option<&ResidueAtoms>,
    next: Option<&ResidueAtoms>,
) -> Result<BackboneInternals, EngineError> {
    let [n, ca, c, o] = backbone_of(residue, current)?;

    let phi = match previous {
        Some(prev) => measured_dihedral(residue, "C", &prev.backbone(BackboneAtom::C), &n, &ca, &c)?,
        None => TERMINAL_SENTINEL,
    };

    let mut bb = BackboneInternals {
        n_ca: distance(&n, &ca),
        ca_c: distance(&ca, &c),
        c_n: TERMINAL_SENTINEL,
        n_ca_c: measured_angle(residue, "C", &n, &ca, &c)?,
        ca_c_n: TERMINAL_SENTINEL,
        c_n_ca: TERMINAL_SENTINEL,
        phi,
        // Without a following residue, psi is read off the carbonyl oxygen.
        psi: wrap_angle(measured_dihedral(residue, "O", &n, &ca, &c, &o)? - PI),
        omega: TERMINAL_SENTINEL,
        c_o: distance(&c, &o),
        ca_c_o: measured_angle(residue, "O", &ca, &c, &o)?,
    };

    if let Some(next) = next {
        let [next_n, next_ca, _, _] = backbone_of(residue + 1, next)?;
        bb.c_n = distance(&c, &next_n);
        bb.ca_c_n = measured_angle(residue, "N", &ca, &c, &next_n)?;
        bb.c_n_ca = measured_angle(residue, "CA", &c, &next_n, &next_ca)?;
        bb.psi = measured_dihedral(residue, "N", &n, &ca, &c, &next_n)?;
        bb.omega = measured_dihedral(residue, "CA", &ca, &c, &next_n, &next_ca)?;
    }
    Ok(bb)
}

fn measure_sidechain(
    residue: usize,
    atoms: &ResidueAtoms,
    topology: &SidechainTopology,
) -> Result<SidechainInternals, EngineError> {
    let mut coords = Vec::with_capacity(topology.len());
    for (slot, atom) in topology.atoms().iter().enumerate() {
        let d = atoms.sidechain(slot).ok_or_else(|| {
            EngineError::shape(residue, format!("side-chain atom {} is masked", atom.name))
        })?;
        let [a, b, c] = atom
            .parents
            .map(|parent| atoms.positions[AtomRole::from(parent).slot()]);
        coords.push(InternalCoord::new(
            distance(&c, &d),
            measured_angle(residue, &atom.name, &b, &c, &d)?,
            measured_dihedral(residue, &atom.name, &a, &b, &c, &d)?,
        ));
    }
    if atoms.sidechain_count() != coords.len() {
        return Err(EngineError::shape(
            residue,
            format!(
                "{} side-chain atoms present but the topology defines {}",
                atoms.sidechain_count(),
                coords.len()
            ),
        ));
    }
    SidechainInternals::from_coords(&coords)
        .ok_or_else(|| EngineError::shape(residue, "side chain exceeds the padding width"))
}

/// Recovers internal coordinates from Cartesian ones, one independent window per residue.
///
/// Undefined values carry [`TERMINAL_SENTINEL`]: `phi` of the first residue and the
/// peptide-bond values of the last one.
#[instrument(skip_all, name = "measure_chain", fields(residues = chain.len()))]
pub fn measure_chain<B: Backend>(
    backend: &B,
    chain: &ResolvedChain,
    table: &TopologyTable,
) -> Result<ChainInternals, EngineError> {
    let count = chain.residues.len();
    if chain.residue_types.len() != count {
        return Err(EngineError::shape(
            count.min(chain.residue_types.len()),
            format!(
                "{} residue types for {} residues",
                chain.residue_types.len(),
                count
            ),
        ));
    }

    let residues = backend.try_map(count, |i| {
        let residue_type = chain.residue_types[i];
        let topology = table
            .get(residue_type)
            .ok_or_else(|| EngineError::unknown_residue(i, residue_type.three_letter_code()))?;
        let previous = i.checked_sub(1).map(|p| &chain.residues[p]);
        let next = chain.residues.get(i + 1);
        let backbone = measure_backbone(i, &chain.residues[i], previous, next)?;
        let sidechain = measure_sidechain(i, &chain.residues[i], topology)?;
        Ok::<_, EngineError>(ResidueInternals::new(residue_type, backbone, sidechain))
    })?;

    Ok(ChainInternals::new(residues))
}
