use crate::core::compute::backend::BackendKind;
use crate::core::compute::scan::{DEFAULT_SCAN_BLOCK_SIZE, ScanStrategy};
use crate::core::utils::geometry::DEFAULT_DEGENERACY_EPSILON;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Invalid value for '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
    #[error("Backend '{0}' is not available in this build")]
    UnavailableBackend(BackendKind),
}

/// How the rigid transform between neighbouring backbone units is solved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum JunctionSolver {
    /// Closed form from the two NeRF frames of the shared N-CA-C triple.
    #[default]
    Frame,
    /// Least-squares superposition of the shared triple.
    Kabsch,
}

impl fmt::Display for JunctionSolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Frame => write!(f, "frame"),
            Self::Kabsch => write!(f, "kabsch"),
        }
    }
}

impl FromStr for JunctionSolver {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "frame" => Ok(Self::Frame),
            "kabsch" => Ok(Self::Kabsch),
            other => Err(ConfigError::InvalidParameter {
                name: "junction_solver",
                reason: format!("unknown solver '{other}' (expected 'frame' or 'kabsch')"),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConversionConfig {
    pub backend: BackendKind,
    pub scan: ScanStrategy,
    pub junction_solver: JunctionSolver,
    pub degeneracy_epsilon: f64,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            scan: ScanStrategy::default(),
            junction_solver: JunctionSolver::default(),
            degeneracy_epsilon: DEFAULT_DEGENERACY_EPSILON,
        }
    }
}

#[derive(Default)]
pub struct ConversionConfigBuilder {
    backend: Option<BackendKind>,
    sequential_scan: Option<bool>,
    scan_block_size: Option<usize>,
    junction_solver: Option<JunctionSolver>,
    degeneracy_epsilon: Option<f64>,
}

impl ConversionConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn backend(mut self, backend: BackendKind) -> Self {
        self.backend = Some(backend);
        self
    }
    pub fn sequential_scan(mut self, sequential: bool) -> Self {
        self.sequential_scan = Some(sequential);
        self
    }
    pub fn scan_block_size(mut self, block_size: usize) -> Self {
        self.scan_block_size = Some(block_size);
        self
    }
    pub fn junction_solver(mut self, solver: JunctionSolver) -> Self {
        self.junction_solver = Some(solver);
        self
    }
    pub fn degeneracy_epsilon(mut self, epsilon: f64) -> Self {
        self.degeneracy_epsilon = Some(epsilon);
        self
    }

    pub fn build(self) -> Result<ConversionConfig, ConfigError> {
        let backend = self.backend.unwrap_or_default();
        if !backend.is_available() {
            return Err(ConfigError::UnavailableBackend(backend));
        }

        let block_size = self.scan_block_size.unwrap_or(DEFAULT_SCAN_BLOCK_SIZE);
        if block_size < 2 {
            return Err(ConfigError::InvalidParameter {
                name: "scan_block_size",
                reason: format!("must be at least 2, got {block_size}"),
            });
        }
        let scan = if self.sequential_scan.unwrap_or(false) {
            ScanStrategy::Sequential
        } else {
            ScanStrategy::Blocked { block_size }
        };

        let degeneracy_epsilon = self
            .degeneracy_epsilon
            .unwrap_or(DEFAULT_DEGENERACY_EPSILON);
        if !(degeneracy_epsilon.is_finite() && degeneracy_epsilon > 0.0 && degeneracy_epsilon < 1.0)
        {
            return Err(ConfigError::InvalidParameter {
                name: "degeneracy_epsilon",
                reason: format!("must lie strictly between 0 and 1, got {degeneracy_epsilon}"),
            });
        }

        Ok(ConversionConfig {
            backend,
            scan,
            junction_solver: self.junction_solver.unwrap_or_default(),
            degeneracy_epsilon,
        })
    }
}
