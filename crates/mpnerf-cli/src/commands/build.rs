use super::load_topology;
use crate::cli::BuildArgs;
use crate::config::PartialConversionConfig;
use crate::error::Result;
use crate::utils::io::{ChainFile, write_atoms};
use crate::utils::progress::CliProgressHandler;
use mpnerf::engine::progress::ProgressReporter;
use mpnerf::workflows::build::{self, chain_from_torsions};
use tracing::info;

pub fn run(args: BuildArgs, progress: &CliProgressHandler) -> Result<()> {
    let config = PartialConversionConfig::resolve(&args.conversion)?;
    let table = load_topology(args.topology.as_deref())?;

    let description = ChainFile::from_file(&args.input)?;
    let sequence = description.sequence()?;
    let chain = chain_from_torsions(&sequence, &description.torsions(), &table)?;
    info!(
        residues = chain.len(),
        backend = %config.backend,
        "Building chain from {:?}.",
        args.input
    );

    let reporter = ProgressReporter::with_callback(progress.get_callback());
    let resolved = build::run(&chain, &table, &config, &reporter)?;

    let written = write_atoms(&args.output, &resolved, &table)?;
    info!("Wrote {} atoms to {:?}.", written, args.output);
    Ok(())
}
