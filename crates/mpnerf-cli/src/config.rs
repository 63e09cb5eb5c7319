use crate::cli::ConversionArgs;
use crate::error::{CliError, Result};
use mpnerf::core::compute::backend::BackendKind;
use mpnerf::engine::config::{ConversionConfig, ConversionConfigBuilder, JunctionSolver};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
enum PartialScanStrategy {
    Sequential,
    Blocked,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct PartialConversionConfig {
    backend: Option<String>,
    scan_strategy: Option<PartialScanStrategy>,
    scan_block_size: Option<usize>,
    junction_solver: Option<String>,
    degeneracy_epsilon: Option<f64>,
}

impl PartialConversionConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    fn from_toml_str(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Loads the file named in `args`, if any, and applies the command-line overrides.
    pub fn resolve(args: &ConversionArgs) -> Result<ConversionConfig> {
        let partial = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        partial.merge_with_cli(args)
    }

    pub fn merge_with_cli(self, args: &ConversionArgs) -> Result<ConversionConfig> {
        let backend = match (args.backend, self.backend) {
            (Some(kind), _) => kind,
            (None, Some(name)) => name
                .parse::<BackendKind>()
                .map_err(|e| CliError::Config(format!("`backend`: {e}")))?,
            (None, None) => BackendKind::default(),
        };

        let junction_solver = match (args.junction_solver, self.junction_solver) {
            (Some(solver), _) => solver,
            (None, Some(name)) => name.parse::<JunctionSolver>()?,
            (None, None) => JunctionSolver::default(),
        };

        let sequential = args.sequential_scan
            || self.scan_strategy == Some(PartialScanStrategy::Sequential);

        let mut builder = ConversionConfigBuilder::new()
            .backend(backend)
            .junction_solver(junction_solver)
            .sequential_scan(sequential);
        if let Some(block_size) = args.scan_block_size.or(self.scan_block_size) {
            builder = builder.scan_block_size(block_size);
        }
        if let Some(epsilon) = args.degeneracy_epsilon.or(self.degeneracy_epsilon) {
            builder = builder.degeneracy_epsilon(epsilon);
        }

        let config = builder.build()?;
        debug!(?config, "Resolved conversion configuration.");
        Ok(config)
    }
}
