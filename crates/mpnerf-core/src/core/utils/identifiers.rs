use crate::core::models::residue::AminoAcid;
use phf::{Map, Set, phf_map, phf_set};

pub(crate) static THREE_LETTER_CODES: Map<&'static str, AminoAcid> = phf_map! {
    "ALA" => AminoAcid::Alanine,
    "ARG" => AminoAcid::Arginine,
    "ASN" => AminoAcid::Asparagine,
    "ASP" => AminoAcid::AsparticAcid,
    "CYS" => AminoAcid::Cysteine,
    "GLN" => AminoAcid::Glutamine,
    "GLU" => AminoAcid::GlutamicAcid,
    "GLY" => AminoAcid::Glycine,
    "HIS" => AminoAcid::Histidine,
    "ILE" => AminoAcid::Isoleucine,
    "LEU" => AminoAcid::Leucine,
    "LYS" => AminoAcid::Lysine,
    "MET" => AminoAcid::Methionine,
    "PHE" => AminoAcid::Phenylalanine,
    "PRO" => AminoAcid::Proline,
    "SER" => AminoAcid::Serine,
    "THR" => AminoAcid::Threonine,
    "TRP" => AminoAcid::Tryptophan,
    "TYR" => AminoAcid::Tyrosine,
    "VAL" => AminoAcid::Valine,
};

pub(crate) static ONE_LETTER_CODES: Map<char, AminoAcid> = phf_map! {
    'A' => AminoAcid::Alanine,
    'R' => AminoAcid::Arginine,
    'N' => AminoAcid::Asparagine,
    'D' => AminoAcid::AsparticAcid,
    'C' => AminoAcid::Cysteine,
    'Q' => AminoAcid::Glutamine,
    'E' => AminoAcid::GlutamicAcid,
    'G' => AminoAcid::Glycine,
    'H' => AminoAcid::Histidine,
    'I' => AminoAcid::Isoleucine,
    'L' => AminoAcid::Leucine,
    'K' => AminoAcid::Lysine,
    'M' => AminoAcid::Methionine,
    'F' => AminoAcid::Phenylalanine,
    'P' => AminoAcid::Proline,
    'S' => AminoAcid::Serine,
    'T' => AminoAcid::Threonine,
    'W' => AminoAcid::Tryptophan,
    'Y' => AminoAcid::Tyrosine,
    'V' => AminoAcid::Valine,
};

static BACKBONE_ATOM_NAMES: Set<&'static str> = phf_set! {
    "N", "CA", "C", "O", "OXT",
};

/// Names reserved for the backbone; side-chain topologies may not reuse them.
pub fn is_backbone_atom(atom_name: &str) -> bool {
    BACKBONE_ATOM_NAMES.contains(atom_name.trim())
}

pub fn is_heavy_atom(atom_name: &str) -> bool {
    let first_char = atom_name
        .trim()
        .chars()
        .next()
        .map(|c| c.to_ascii_uppercase());
    !matches!(first_char, Some('H') | Some('D') | None)
}
