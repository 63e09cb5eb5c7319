use thiserror::Error;

use super::config::ConfigError;
use crate::core::utils::geometry::{GeometryError, InternalCoord};
use crate::core::utils::superposition::SuperpositionError;

fn describe_coord(coord: &Option<InternalCoord>) -> String {
    match coord {
        Some(coord) => format!(" with {coord}"),
        None => String::new(),
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(
        "Geometry error in chain {chain}, residue {residue}, atom {atom}{}: {source}",
        describe_coord(.coord)
    )]
    Geometry {
        chain: usize,
        residue: usize,
        atom: String,
        coord: Option<InternalCoord>,
        #[source]
        source: GeometryError,
    },

    #[error("Unknown residue type '{name}' in chain {chain}, residue {residue}")]
    UnknownResidueType {
        chain: usize,
        residue: usize,
        name: String,
    },

    #[error("Shape mismatch in chain {chain}, residue {residue}: {reason}")]
    ShapeMismatch {
        chain: usize,
        residue: usize,
        reason: String,
    },

    #[error("Junction superposition failed in chain {chain}, residue {residue}: {source}")]
    Superposition {
        chain: usize,
        residue: usize,
        #[source]
        source: SuperpositionError,
    },

    #[error("Invalid configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },
}

impl EngineError {
    /// Re-labels a single-chain error with its position in a batch.
    pub fn in_chain(mut self, index: usize) -> Self {
        match &mut self {
            Self::Geometry { chain, .. }
            | Self::UnknownResidueType { chain, .. }
            | Self::ShapeMismatch { chain, .. }
            | Self::Superposition { chain, .. } => *chain = index,
            Self::Config { .. } => {}
        }
        self
    }

    pub fn chain(&self) -> Option<usize> {
        match self {
            Self::Geometry { chain, .. }
            | Self::UnknownResidueType { chain, .. }
            | Self::ShapeMismatch { chain, .. }
            | Self::Superposition { chain, .. } => Some(*chain),
            Self::Config { .. } => None,
        }
    }

    pub fn residue(&self) -> Option<usize> {
        match self {
            Self::Geometry { residue, .. }
            | Self::UnknownResidueType { residue, .. }
            | Self::ShapeMismatch { residue, .. }
            | Self::Superposition { residue, .. } => Some(*residue),
            Self::Config { .. } => None,
        }
    }

    pub(crate) fn geometry(
        residue: usize,
        atom: impl Into<String>,
        coord: Option<InternalCoord>,
        source: GeometryError,
    ) -> Self {
        Self::Geometry {
            chain: 0,
            residue,
            atom: atom.into(),
            coord,
            source,
        }
    }

    pub(crate) fn shape(residue: usize, reason: impl Into<String>) -> Self {
        Self::ShapeMismatch {
            chain: 0,
            residue,
            reason: reason.into(),
        }
    }

    pub(crate) fn unknown_residue(residue: usize, name: impl Into<String>) -> Self {
        Self::UnknownResidueType {
            chain: 0,
            residue,
            name: name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_chain_relabels_chain_index() {
        let err = EngineError::shape(4, "mask mismatch").in_chain(7);
        assert_eq!(err.chain(), Some(7));
        assert_eq!(err.residue(), Some(4));
        assert_eq!(
            err.to_string(),
            "Shape mismatch in chain 7, residue 4: mask mismatch"
        );
    }

    #[test]
    fn geometry_error_reports_offending_coordinate() {
        let coord = InternalCoord::new(-1.0, 1.0, 0.0);
        let err = EngineError::geometry(
            2,
            "CA",
            Some(coord),
            GeometryError::InvalidInternalCoordinate {
                coord,
                reason: "bond length must be positive",
            },
        );
        let message = err.to_string();
        assert!(message.contains("chain 0, residue 2, atom CA with (length -1.0000"));
        assert!(message.contains("bond length must be positive"));

        let degenerate = EngineError::geometry(1, "junction", None, GeometryError::Degenerate);
        assert!(degenerate.to_string().contains("atom junction: Degenerate"));
    }
}
