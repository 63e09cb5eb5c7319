use crate::core::compute::backend::{BackendKind, Serial};
use crate::core::models::chain::ResolvedChain;
use crate::core::models::internal::ChainInternals;
use crate::core::topology::TopologyTable;
use crate::engine::error::EngineError;
use crate::engine::inverse::measure_chain;
use crate::engine::progress::{ProgressReporter, Stage};
use tracing::{info, instrument};

#[cfg(feature = "parallel")]
use crate::core::compute::backend::Rayon;
#[cfg(not(feature = "parallel"))]
use crate::engine::config::ConfigError;

/// Measures the internal coordinates of one placed chain.
#[instrument(skip_all, name = "measure_workflow", fields(residues = chain.len(), backend = %backend))]
pub fn run(
    chain: &ResolvedChain,
    table: &TopologyTable,
    backend: BackendKind,
    reporter: &ProgressReporter,
) -> Result<ChainInternals, EngineError> {
    if chain.is_empty() {
        return Err(EngineError::shape(0, "chain has no residues"));
    }
    let internals = reporter.stage(Stage::Measurement, chain.len(), || match backend {
        BackendKind::Serial => measure_chain(&Serial, chain, table),
        #[cfg(feature = "parallel")]
        BackendKind::Parallel => measure_chain(&Rayon, chain, table),
        #[cfg(not(feature = "parallel"))]
        kind @ BackendKind::Parallel => Err(ConfigError::UnavailableBackend(kind).into()),
    })?;
    info!(residues = internals.len(), "Internal coordinates measured.");
    Ok(internals)
}
