use super::composer::BackboneUnit;
use super::config::{ConversionConfig, JunctionSolver};
use super::error::EngineError;
use crate::core::compute::backend::Backend;
use crate::core::compute::scan::ScanStrategy;
use crate::core::models::atom::ResidueAtoms;
use crate::core::models::transform::RigidTransform;
use crate::core::utils::superposition::kabsch;
use tracing::{debug, instrument};

fn frame_of(
    residue: usize,
    [a, b, c]: &[nalgebra::Point3<f64>; 3],
    epsilon: f64,
) -> Result<RigidTransform, EngineError> {
    RigidTransform::from_frame(a, b, c, epsilon)
        .map_err(|source| EngineError::geometry(residue, "N-CA-C frame", None, source))
}

/// `J_i` maps unit `i`'s local frame into unit `i - 1`'s; `J_0` is the identity.
///
/// Unit `i` was built on a canonical copy of residue `i - 1`'s N-CA-C triple, so `J_i`
/// is the motion carrying that copy onto the real triple of unit `i - 1`.
#[instrument(skip_all, name = "junction_transforms", fields(solver = %solver))]
pub fn junction_transforms<B: Backend>(
    backend: &B,
    units: &[BackboneUnit],
    solver: JunctionSolver,
    epsilon: f64,
) -> Result<Vec<RigidTransform>, EngineError> {
    backend.try_map(units.len(), |i| {
        if i == 0 {
            return Ok(RigidTransform::identity());
        }
        let target = units[i - 1].triple();
        let anchor = units[i].anchor;
        match solver {
            JunctionSolver::Frame => {
                let to_parent = frame_of(i - 1, &target, epsilon)?;
                let from_anchor = frame_of(i, &anchor, epsilon)?;
                Ok(to_parent.compose(&from_anchor.inverse()))
            }
            JunctionSolver::Kabsch => kabsch(&anchor, &target).map_err(|source| {
                EngineError::Superposition {
                    chain: 0,
                    residue: i,
                    source,
                }
            }),
        }
    })
}

/// `T_k = J_0 · J_1 · … · J_k`, the map from unit `k`'s frame into the chain frame.
pub fn cumulative_transforms<B: Backend>(
    backend: &B,
    junctions: &[RigidTransform],
    scan: ScanStrategy,
) -> Vec<RigidTransform> {
    scan.scan(backend, junctions)
}

/// Docks all units into one chain. Only the backbone slots of the result are set.
#[instrument(skip_all, name = "assemble_backbone", fields(units = units.len()))]
pub fn assemble<B: Backend>(
    backend: &B,
    units: &[BackboneUnit],
    config: &ConversionConfig,
) -> Result<Vec<ResidueAtoms>, EngineError> {
    let junctions = junction_transforms(
        backend,
        units,
        config.junction_solver,
        config.degeneracy_epsilon,
    )?;
    let cumulative = cumulative_transforms(backend, &junctions, config.scan);
    debug!(transforms = cumulative.len(), scan = ?config.scan, "Composed junction transforms.");

    Ok(backend.map(units.len(), |k| {
        let t = &cumulative[k];
        let u = &units[k];
        ResidueAtoms::from_backbone(t.apply(&u.n), t.apply(&u.ca), t.apply(&u.c), t.apply(&u.o))
    }))
}
