use super::load_topology;
use crate::cli::MeasureArgs;
use crate::error::Result;
use crate::utils::io::{internals_records, read_atoms, write_internals};
use crate::utils::progress::CliProgressHandler;
use mpnerf::engine::progress::ProgressReporter;
use mpnerf::workflows::measure;
use tracing::info;

pub fn run(args: MeasureArgs, progress: &CliProgressHandler) -> Result<()> {
    let table = load_topology(args.topology.as_deref())?;
    let chain = read_atoms(&args.input, &table)?;
    info!(residues = chain.len(), "Measuring chain from {:?}.", args.input);

    let reporter = ProgressReporter::with_callback(progress.get_callback());
    let internals = measure::run(&chain, &table, args.backend.unwrap_or_default(), &reporter)?;

    let records = internals_records(&internals, &table);
    write_internals(&args.output, &records)?;
    info!("Wrote {} residues to {:?}.", records.len(), args.output);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{BuildArgs, ConversionArgs};
    use crate::commands::build;
    use crate::utils::io::InternalsRecord;
    use mpnerf::core::compute::backend::BackendKind;

    #[test]
    fn measure_recovers_built_torsions() {
        let dir = tempfile::tempdir().unwrap();
        let chain = dir.path().join("chain.toml");
        let atoms = dir.path().join("atoms.csv");
        let internals = dir.path().join("internals.csv");
        std::fs::write(
            &chain,
            r#"
            sequence = "AVK"

            [[residues]]
            psi = 140.0

            [[residues]]
            phi = -120.0
            psi = 130.0
            chi = [175.0]

            [[residues]]
            phi = -80.0
            chi = [-60.0, 170.0]
            "#,
        )
        .unwrap();

        let progress = CliProgressHandler::hidden();
        build::run(
            BuildArgs {
                input: chain,
                output: atoms.clone(),
                topology: None,
                conversion: ConversionArgs {
                    backend: Some(BackendKind::Serial),
                    ..ConversionArgs::default()
                },
            },
            &progress,
        )
        .unwrap();
        run(
            MeasureArgs {
                input: atoms,
                output: internals.clone(),
                topology: None,
                backend: Some(BackendKind::Serial),
            },
            &progress,
        )
        .unwrap();

        let mut reader = csv::Reader::from_path(&internals).unwrap();
        let records: Vec<InternalsRecord> = reader.deserialize().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].residue_name, "ALA");
        assert!((records[0].psi - 140.0).abs() < 1e-6);
        assert!((records[1].phi + 120.0).abs() < 1e-6);
        assert!((records[1].chi1.unwrap() - 175.0).abs() < 1e-6);
        assert!(records[1].chi2.is_none());
        assert!((records[2].chi2.unwrap() - 170.0).abs() < 1e-6);
        assert!((records[2].n_ca - 1.458).abs() < 1e-6);
        assert_eq!(records[2].omega, 0.0);
    }
}
