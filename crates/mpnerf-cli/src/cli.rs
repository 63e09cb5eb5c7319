use clap::{Args, Parser, Subcommand};
use mpnerf::core::compute::backend::BackendKind;
use mpnerf::engine::config::JunctionSolver;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "MP-NeRF contributors",
    version,
    about = "MP-NeRF CLI - Build protein coordinates from internal coordinates and measure them back.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for parallel computation.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build Cartesian coordinates from a sequence and torsion angles.
    Build(BuildArgs),
    /// Measure internal coordinates of a chain given as atom coordinates.
    Measure(MeasureArgs),
    /// Print or export the side-chain topology table.
    Topology(TopologyArgs),
}

/// Conversion settings shared by the commands that run the pipeline.
#[derive(Args, Debug, Clone, Default)]
pub struct ConversionArgs {
    /// Path to a conversion configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the execution backend ('serial' or 'parallel').
    #[arg(short, long, value_name = "NAME")]
    pub backend: Option<BackendKind>,

    /// Override the junction solver ('frame' or 'kabsch').
    #[arg(long, value_name = "NAME")]
    pub junction_solver: Option<JunctionSolver>,

    /// Override the block size of the parallel prefix scan.
    #[arg(long, value_name = "INT")]
    pub scan_block_size: Option<usize>,

    /// Compose junction transforms with a plain left fold instead of the blocked scan.
    #[arg(long)]
    pub sequential_scan: bool,

    /// Override the relative threshold below which a reference triple is degenerate.
    #[arg(long, value_name = "FLOAT")]
    pub degeneracy_epsilon: Option<f64>,
}

/// Arguments for the `build` subcommand.
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Path to the chain description in TOML format (sequence and optional torsions).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path for the output atom table in CSV format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Side-chain topology table in TOML format. Defaults to the built-in table.
    #[arg(short, long, value_name = "PATH")]
    pub topology: Option<PathBuf>,

    #[command(flatten)]
    pub conversion: ConversionArgs,
}

/// Arguments for the `measure` subcommand.
#[derive(Args, Debug)]
pub struct MeasureArgs {
    /// Path to the atom table in CSV format, as written by `build`.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path for the per-residue internal coordinates in CSV format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Side-chain topology table in TOML format. Defaults to the built-in table.
    #[arg(short, long, value_name = "PATH")]
    pub topology: Option<PathBuf>,

    /// Override the execution backend ('serial' or 'parallel').
    #[arg(short, long, value_name = "NAME")]
    pub backend: Option<BackendKind>,
}

/// Arguments for the `topology` subcommand.
#[derive(Args, Debug)]
pub struct TopologyArgs {
    /// Side-chain topology table in TOML format. Defaults to the built-in table.
    #[arg(short, long, value_name = "PATH")]
    pub topology: Option<PathBuf>,

    /// Show the atoms of a single residue type (three- or one-letter code).
    #[arg(short, long, value_name = "CODE")]
    pub residue: Option<String>,

    /// Write the table to a TOML file instead of printing a summary.
    #[arg(short, long, value_name = "PATH")]
    pub export: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn build_arguments_are_parsed() {
        let cli = Cli::try_parse_from([
            "mpnerf",
            "-vv",
            "-j",
            "4",
            "build",
            "-i",
            "chain.toml",
            "-o",
            "atoms.csv",
            "--backend",
            "serial",
            "--junction-solver",
            "kabsch",
            "--scan-block-size",
            "16",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.threads, Some(4));
        let Commands::Build(args) = cli.command else {
            panic!("expected the build command");
        };
        assert_eq!(args.input, PathBuf::from("chain.toml"));
        assert_eq!(args.conversion.backend, Some(BackendKind::Serial));
        assert_eq!(args.conversion.junction_solver, Some(JunctionSolver::Kabsch));
        assert_eq!(args.conversion.scan_block_size, Some(16));
        assert!(!args.conversion.sequential_scan);
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let result = Cli::try_parse_from([
            "mpnerf", "measure", "-i", "a.csv", "-o", "b.csv", "--backend", "gpu",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from(["mpnerf", "-q", "-v", "topology"]);
        assert!(result.is_err());
    }
}
