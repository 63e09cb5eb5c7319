use crate::core::utils::identifiers::{ONE_LETTER_CODES, THREE_LETTER_CODES};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The 20 standard amino acids.
///
/// Variants are declared in alphabetical order of their three-letter codes, which is
/// also the order of [`AminoAcid::index`] used by padded batches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AminoAcid {
    Alanine,       // ALA
    Arginine,      // ARG
    Asparagine,    // ASN
    AsparticAcid,  // ASP
    Cysteine,      // CYS
    Glutamine,     // GLN
    GlutamicAcid,  // GLU
    Glycine,       // GLY
    Histidine,     // HIS
    Isoleucine,    // ILE
    Leucine,       // LEU
    Lysine,        // LYS
    Methionine,    // MET
    Phenylalanine, // PHE
    Proline,       // PRO
    Serine,        // SER
    Threonine,     // THR
    Tryptophan,    // TRP
    Tyrosine,      // TYR
    Valine,        // VAL
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown amino acid code '{0}'")]
pub struct ParseAminoAcidError(pub String);

impl AminoAcid {
    pub const COUNT: usize = 20;

    pub const ALL: [AminoAcid; Self::COUNT] = [
        Self::Alanine,
        Self::Arginine,
        Self::Asparagine,
        Self::AsparticAcid,
        Self::Cysteine,
        Self::Glutamine,
        Self::GlutamicAcid,
        Self::Glycine,
        Self::Histidine,
        Self::Isoleucine,
        Self::Leucine,
        Self::Lysine,
        Self::Methionine,
        Self::Phenylalanine,
        Self::Proline,
        Self::Serine,
        Self::Threonine,
        Self::Tryptophan,
        Self::Tyrosine,
        Self::Valine,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn three_letter_code(self) -> &'static str {
        match self {
            Self::Alanine => "ALA",
            Self::Arginine => "ARG",
            Self::Asparagine => "ASN",
            Self::AsparticAcid => "ASP",
            Self::Cysteine => "CYS",
            Self::Glutamine => "GLN",
            Self::GlutamicAcid => "GLU",
            Self::Glycine => "GLY",
            Self::Histidine => "HIS",
            Self::Isoleucine => "ILE",
            Self::Leucine => "LEU",
            Self::Lysine => "LYS",
            Self::Methionine => "MET",
            Self::Phenylalanine => "PHE",
            Self::Proline => "PRO",
            Self::Serine => "SER",
            Self::Threonine => "THR",
            Self::Tryptophan => "TRP",
            Self::Tyrosine => "TYR",
            Self::Valine => "VAL",
        }
    }

    pub fn one_letter_code(self) -> char {
        match self {
            Self::Alanine => 'A',
            Self::Arginine => 'R',
            Self::Asparagine => 'N',
            Self::AsparticAcid => 'D',
            Self::Cysteine => 'C',
            Self::Glutamine => 'Q',
            Self::GlutamicAcid => 'E',
            Self::Glycine => 'G',
            Self::Histidine => 'H',
            Self::Isoleucine => 'I',
            Self::Leucine => 'L',
            Self::Lysine => 'K',
            Self::Methionine => 'M',
            Self::Phenylalanine => 'F',
            Self::Proline => 'P',
            Self::Serine => 'S',
            Self::Threonine => 'T',
            Self::Tryptophan => 'W',
            Self::Tyrosine => 'Y',
            Self::Valine => 'V',
        }
    }

    pub fn from_one_letter(code: char) -> Result<Self, ParseAminoAcidError> {
        ONE_LETTER_CODES
            .get(&code.to_ascii_uppercase())
            .copied()
            .ok_or_else(|| ParseAminoAcidError(code.to_string()))
    }

    /// Parses a one-letter sequence such as `"GAW"`, ignoring whitespace.
    pub fn parse_sequence(sequence: &str) -> Result<Vec<Self>, ParseAminoAcidError> {
        sequence
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(Self::from_one_letter)
            .collect()
    }
}

impl FromStr for AminoAcid {
    type Err = ParseAminoAcidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let upper = trimmed.to_ascii_uppercase();
        if let Some(&aa) = THREE_LETTER_CODES.get(upper.as_str()) {
            return Ok(aa);
        }
        let mut chars = upper.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_one_letter(c),
            _ => Err(ParseAminoAcidError(trimmed.to_string())),
        }
    }
}

impl fmt::Display for AminoAcid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.three_letter_code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_str_parses_three_letter_codes_case_insensitively() {
        assert_eq!("GLY".parse::<AminoAcid>().unwrap(), AminoAcid::Glycine);
        assert_eq!("trp".parse::<AminoAcid>().unwrap(), AminoAcid::Tryptophan);
        assert_eq!(" Ala ".parse::<AminoAcid>().unwrap(), AminoAcid::Alanine);
    }

    #[test]
    fn from_str_accepts_single_letter_codes() {
        assert_eq!("W".parse::<AminoAcid>().unwrap(), AminoAcid::Tryptophan);
        assert_eq!("k".parse::<AminoAcid>().unwrap(), AminoAcid::Lysine);
    }

    #[test]
    fn from_str_rejects_unknown_codes() {
        assert!("XYZ".parse::<AminoAcid>().is_err());
        assert!("B".parse::<AminoAcid>().is_err());
        assert!("".parse::<AminoAcid>().is_err());
        assert_eq!(
            "HSE".parse::<AminoAcid>(),
            Err(ParseAminoAcidError("HSE".to_string()))
        );
    }

    #[test]
    fn index_round_trips_for_every_variant() {
        for (i, aa) in AminoAcid::ALL.iter().enumerate() {
            assert_eq!(aa.index(), i);
            assert_eq!(AminoAcid::from_index(i), Some(*aa));
        }
        assert_eq!(AminoAcid::from_index(AminoAcid::COUNT), None);
    }

    #[test]
    fn codes_are_consistent_with_lookup_tables() {
        for aa in AminoAcid::ALL {
            assert_eq!(aa.three_letter_code().parse::<AminoAcid>().unwrap(), aa);
            assert_eq!(AminoAcid::from_one_letter(aa.one_letter_code()).unwrap(), aa);
        }
    }

    #[test]
    fn parse_sequence_skips_whitespace_and_reports_bad_letters() {
        let seq = AminoAcid::parse_sequence("GA W\n").unwrap();
        assert_eq!(
            seq,
            vec![AminoAcid::Glycine, AminoAcid::Alanine, AminoAcid::Tryptophan]
        );
        assert_eq!(
            AminoAcid::parse_sequence("GAX"),
            Err(ParseAminoAcidError("X".to_string()))
        );
    }

    #[test]
    fn display_uses_three_letter_code() {
        assert_eq!(AminoAcid::Histidine.to_string(), "HIS");
    }
}
