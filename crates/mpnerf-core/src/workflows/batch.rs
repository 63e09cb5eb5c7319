use crate::core::compute::backend::{Backend, BackendKind, Serial};
use crate::core::models::atom::{ATOMS_PER_RESIDUE, ResidueAtoms};
use crate::core::models::internal::{
    BackboneInternals, ChainInternals, ResidueInternals, SidechainInternals,
};
use crate::core::models::residue::AminoAcid;
use crate::core::topology::TopologyTable;
use crate::engine::config::ConversionConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::sidechain::resolve_topology;
use crate::workflows::build;
use std::ops::Range;
use tracing::{info, instrument, warn};

#[cfg(feature = "parallel")]
use crate::core::compute::backend::Rayon;
#[cfg(not(feature = "parallel"))]
use crate::engine::config::ConfigError;

/// Fixed-rank input: `batch_size × max_residues` rows in row-major order.
///
/// Row `k * max_residues + r` holds residue `r` of chain `k`. The valid residues of a
/// chain are a leading run of its rows, marked by `residue_mask`; padding rows are
/// never read.
#[derive(Debug, Clone, PartialEq)]
pub struct PaddedBatch {
    pub batch_size: usize,
    pub max_residues: usize,
    /// Index into [`AminoAcid::ALL`].
    pub residue_types: Vec<usize>,
    pub residue_mask: Vec<bool>,
    pub backbone: Vec<BackboneInternals>,
    pub sidechain: Vec<SidechainInternals>,
}

impl PaddedBatch {
    /// Pads `chains` to the length of the longest one.
    pub fn from_chains(chains: &[ChainInternals]) -> Self {
        let batch_size = chains.len();
        let max_residues = chains.iter().map(ChainInternals::len).max().unwrap_or(0);
        let rows = batch_size * max_residues;

        let mut batch = Self {
            batch_size,
            max_residues,
            residue_types: vec![AminoAcid::Glycine.index(); rows],
            residue_mask: vec![false; rows],
            backbone: vec![BackboneInternals::extended(); rows],
            sidechain: vec![SidechainInternals::empty(); rows],
        };
        for (k, chain) in chains.iter().enumerate() {
            for (r, residue) in chain.residues.iter().enumerate() {
                let row = k * max_residues + r;
                batch.residue_types[row] = residue.residue_type.index();
                batch.residue_mask[row] = true;
                batch.backbone[row] = residue.backbone;
                batch.sidechain[row] = residue.sidechain;
            }
        }
        batch
    }

    /// Row range of chain `k`, if the header and mask are large enough to hold it.
    fn chain_rows(&self, k: usize) -> Option<Range<usize>> {
        if k >= self.batch_size {
            return None;
        }
        let start = k.checked_mul(self.max_residues)?;
        let end = start.checked_add(self.max_residues)?;
        (end <= self.residue_mask.len()).then_some(start..end)
    }

    /// Number of valid residues of chain `k`.
    pub fn chain_len(&self, k: usize) -> usize {
        self.chain_rows(k).map_or(0, |rows| {
            self.residue_mask[rows]
                .iter()
                .take_while(|&&valid| valid)
                .count()
        })
    }

    /// Checks every array's rank, every chain's residue mask, every valid residue type
    /// index, and every valid residue's side-chain mask against its topology.
    pub fn validate(&self, table: &TopologyTable) -> Result<(), EngineError> {
        let rows = self
            .batch_size
            .checked_mul(self.max_residues)
            .ok_or_else(|| {
                EngineError::shape(
                    0,
                    format!(
                        "{} x {} rows exceed the addressable size",
                        self.batch_size, self.max_residues
                    ),
                )
            })?;
        let lengths = [
            ("residue_types", self.residue_types.len()),
            ("residue_mask", self.residue_mask.len()),
            ("backbone", self.backbone.len()),
            ("sidechain", self.sidechain.len()),
        ];
        for (name, len) in lengths {
            if len != rows {
                return Err(EngineError::shape(
                    0,
                    format!(
                        "'{name}' has {len} rows, expected {} x {} = {rows}",
                        self.batch_size, self.max_residues
                    ),
                ));
            }
        }

        for k in 0..self.batch_size {
            let start = k * self.max_residues;
            let len = self.chain_len(k);
            if let Some(offset) = self.residue_mask[start + len..start + self.max_residues]
                .iter()
                .position(|&valid| valid)
            {
                return Err(EngineError::shape(
                    len + offset,
                    "residue mask must mark a contiguous run of leading rows",
                )
                .in_chain(k));
            }
            for r in 0..len {
                let row = start + r;
                let index = self.residue_types[row];
                let residue_type = AminoAcid::from_index(index).ok_or_else(|| {
                    EngineError::unknown_residue(r, format!("#{index}")).in_chain(k)
                })?;
                let residue =
                    ResidueInternals::new(residue_type, self.backbone[row], self.sidechain[row]);
                resolve_topology(r, &residue, table).map_err(|e| e.in_chain(k))?;
            }
        }
        Ok(())
    }

    /// The valid residues of chain `k`. Call after [`PaddedBatch::validate`].
    pub fn chain(&self, k: usize) -> Option<ChainInternals> {
        let rows = self.chain_rows(k)?;
        (rows.start..rows.start + self.chain_len(k))
            .map(|row| {
                let residue_type = AminoAcid::from_index(*self.residue_types.get(row)?)?;
                Some(ResidueInternals::new(
                    residue_type,
                    *self.backbone.get(row)?,
                    *self.sidechain.get(row)?,
                ))
            })
            .collect::<Option<Vec<_>>>()
            .map(ChainInternals::new)
    }
}

/// Fixed-rank output: `batch_size × max_residues` padded residues of
/// [`ATOMS_PER_RESIDUE`] slots each, row-major like [`PaddedBatch`].
#[derive(Debug, Clone, PartialEq)]
pub struct PaddedCoordinates {
    pub batch_size: usize,
    pub max_residues: usize,
    pub residues: Vec<ResidueAtoms>,
}

impl PaddedCoordinates {
    fn empty(batch_size: usize, max_residues: usize) -> Self {
        Self {
            batch_size,
            max_residues,
            residues: vec![ResidueAtoms::default(); batch_size * max_residues],
        }
    }

    pub fn get(&self, chain: usize, residue: usize) -> Option<&ResidueAtoms> {
        if chain >= self.batch_size || residue >= self.max_residues {
            return None;
        }
        self.residues.get(chain * self.max_residues + residue)
    }

    /// Coordinates as a flat `batch × residues × 14 × 3` array.
    pub fn to_flat_positions(&self) -> Vec<f64> {
        self.residues
            .iter()
            .flat_map(|r| r.positions.iter().flat_map(|p| [p.x, p.y, p.z]))
            .collect()
    }

    /// Atom validity as a flat `batch × residues × 14` array.
    pub fn to_flat_mask(&self) -> Vec<bool> {
        self.residues.iter().flat_map(|r| r.mask).collect()
    }

    pub fn atom_slots(&self) -> usize {
        self.residues.len() * ATOMS_PER_RESIDUE
    }
}

#[derive(Debug)]
pub struct BatchResult {
    pub coordinates: PaddedCoordinates,
    /// One entry per chain; rows of a failed chain stay masked.
    pub chains: Vec<Result<(), EngineError>>,
}

impl BatchResult {
    pub fn failures(&self) -> impl Iterator<Item = &EngineError> {
        self.chains.iter().filter_map(|r| r.as_ref().err())
    }

    pub fn is_complete(&self) -> bool {
        self.chains.iter().all(Result::is_ok)
    }
}

/// Converts every chain of a padded batch.
///
/// The batch is validated as a whole first, so shape, residue type and side-chain mask
/// problems fail the call before any chain is converted. After that, a placement
/// failure only affects its own chain's entry in [`BatchResult::chains`].
#[instrument(skip_all, name = "batch_workflow", fields(chains = batch.batch_size, max_residues = batch.max_residues))]
pub fn run(
    batch: &PaddedBatch,
    table: &TopologyTable,
    config: &ConversionConfig,
    reporter: &ProgressReporter,
) -> Result<BatchResult, EngineError> {
    batch.validate(table)?;
    match config.backend {
        BackendKind::Serial => Ok(convert(&Serial, batch, table, config, reporter)),
        #[cfg(feature = "parallel")]
        BackendKind::Parallel => Ok(convert(&Rayon, batch, table, config, reporter)),
        #[cfg(not(feature = "parallel"))]
        kind @ BackendKind::Parallel => Err(ConfigError::UnavailableBackend(kind).into()),
    }
}

/// Chains are mapped on `backend`, and each chain runs its own pipeline on the same
/// backend. Expects a validated batch.
pub fn convert<B: Backend>(
    backend: &B,
    batch: &PaddedBatch,
    table: &TopologyTable,
    config: &ConversionConfig,
    reporter: &ProgressReporter,
) -> BatchResult {
    reporter.report(Progress::BatchStart {
        chains: batch.batch_size as u64,
    });

    let silent = ProgressReporter::new();
    let outcomes = backend.map(batch.batch_size, |k| {
        let outcome = match batch.chain(k) {
            Some(chain) if chain.is_empty() => Ok(Vec::new()),
            Some(chain) => build::convert(backend, &chain, table, config, &silent)
                .map(|resolved| resolved.residues),
            None => Err(EngineError::shape(0, "unvalidated residue type index")),
        }
        .map_err(|e| e.in_chain(k));
        reporter.report(Progress::ChainFinished {
            chain: k,
            ok: outcome.is_ok(),
        });
        outcome
    });

    let mut coordinates = PaddedCoordinates::empty(batch.batch_size, batch.max_residues);
    let mut chains = Vec::with_capacity(batch.batch_size);
    for (k, outcome) in outcomes.into_iter().enumerate() {
        match outcome {
            Ok(residues) => {
                let start = k * batch.max_residues;
                for (r, atoms) in residues.into_iter().enumerate() {
                    coordinates.residues[start + r] = atoms;
                }
                chains.push(Ok(()));
            }
            Err(e) => {
                warn!(chain = k, error = %e, "Chain conversion failed.");
                chains.push(Err(e));
            }
        }
    }

    reporter.report(Progress::BatchFinish);
    let failed = chains.iter().filter(|r| r.is_err()).count();
    info!(
        chains = batch.batch_size,
        failed, "Batch conversion finished."
    );
    BatchResult {
        coordinates,
        chains,
    }
}
