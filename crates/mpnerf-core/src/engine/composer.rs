use super::error::EngineError;
use crate::core::compute::backend::Backend;
use crate::core::models::internal::BackboneInternals;
use crate::core::utils::geometry::{
    BatchPlacementError, GeometryError, InternalCoord, place_batch, seed_triple,
};
use nalgebra::Point3;
use tracing::{debug, instrument};

/// One residue's backbone in a local frame, not yet docked to the chain.
///
/// `anchor` is the previous residue's `N, CA, C` in canonical seed position (for the
/// first residue, its own seed). `n`, `ca`, `c` and `o` live in the same frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackboneUnit {
    pub anchor: [Point3<f64>; 3],
    pub n: Point3<f64>,
    pub ca: Point3<f64>,
    pub c: Point3<f64>,
    pub o: Point3<f64>,
}

impl BackboneUnit {
    pub fn triple(&self) -> [Point3<f64>; 3] {
        [self.n, self.ca, self.c]
    }
}

fn seed_of(residue: usize, bb: &BackboneInternals) -> Result<[Point3<f64>; 3], EngineError> {
    seed_triple(bb.n_ca, bb.ca_c, bb.n_ca_c).map_err(|source| {
        let coord = match source {
            GeometryError::InvalidInternalCoordinate { coord, .. } => Some(coord),
            GeometryError::Degenerate => None,
        };
        EngineError::geometry(residue, "C", coord, source)
    })
}

/// Lifts a batch failure over residues `offset..` back to a residue-level error.
fn placement_error(
    err: BatchPlacementError,
    offset: usize,
    atom: &'static str,
    coords: &[InternalCoord],
) -> EngineError {
    match err {
        BatchPlacementError::Placement { index, source } => {
            EngineError::geometry(index + offset, atom, coords.get(index).copied(), source)
        }
        BatchPlacementError::Shape { .. } => EngineError::shape(offset, err.to_string()),
    }
}

/// Builds every residue's [`BackboneUnit`] independently.
///
/// Unit `r` reads only the internals of residues `r - 1` and `r`, so the result for a
/// residue does not depend on the rest of the batch. Each atom slot is one batched
/// placement over all residues.
#[instrument(skip_all, name = "compose_units", fields(residues = backbone.len()))]
pub fn compose_units<B: Backend>(
    backend: &B,
    backbone: &[BackboneInternals],
    epsilon: f64,
) -> Result<Vec<BackboneUnit>, EngineError> {
    let count = backbone.len();
    if count == 0 {
        return Ok(Vec::new());
    }

    let seeds = backend.try_map(count, |r| seed_of(r, &backbone[r]))?;

    // Residues 1.. are built on the seed of their predecessor.
    let anchors = &seeds[..count - 1];
    let a: Vec<_> = anchors.iter().map(|s| s[0]).collect();
    let b: Vec<_> = anchors.iter().map(|s| s[1]).collect();
    let c: Vec<_> = anchors.iter().map(|s| s[2]).collect();

    let n_coords: Vec<_> = backbone.windows(2).map(|w| w[0].next_n()).collect();
    let n = place_batch(backend, &a, &b, &c, &n_coords, epsilon)
        .map_err(|e| placement_error(e, 1, "N", &n_coords))?;

    let ca_coords: Vec<_> = backbone.windows(2).map(|w| w[0].next_ca(&w[1])).collect();
    let ca = place_batch(backend, &b, &c, &n, &ca_coords, epsilon)
        .map_err(|e| placement_error(e, 1, "CA", &ca_coords))?;

    let c_coords: Vec<_> = backbone[1..].iter().map(|bb| bb.own_c()).collect();
    let c_placed = place_batch(backend, &c, &n, &ca, &c_coords, epsilon)
        .map_err(|e| placement_error(e, 1, "C", &c_coords))?;

    let mut n_all = Vec::with_capacity(count);
    let mut ca_all = Vec::with_capacity(count);
    let mut c_all = Vec::with_capacity(count);
    n_all.push(seeds[0][0]);
    ca_all.push(seeds[0][1]);
    c_all.push(seeds[0][2]);
    n_all.extend(n);
    ca_all.extend(ca);
    c_all.extend(c_placed);

    let o_coords: Vec<_> = backbone.iter().map(|bb| bb.carbonyl()).collect();
    let o_all = place_batch(backend, &n_all, &ca_all, &c_all, &o_coords, epsilon)
        .map_err(|e| placement_error(e, 0, "O", &o_coords))?;

    let units = backend.map(count, |r| BackboneUnit {
        anchor: if r == 0 { seeds[0] } else { seeds[r - 1] },
        n: n_all[r],
        ca: ca_all[r],
        c: c_all[r],
        o: o_all[r],
    });
    debug!(units = units.len(), "Composed backbone units.");
    Ok(units)
}
