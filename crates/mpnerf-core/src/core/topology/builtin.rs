//! Built-in heavy-atom side-chain geometry of the 20 standard amino acids.
//!
//! Values follow the PeptideBuilder defaults. Lengths in Å, angles in degrees; each row
//! places its atom from three parents `(a, b, c)` at `length` from `c`, with the angle at
//! `c` and the dihedral `a-b-c-atom`.

use super::registry::{AtomSpec, ResidueSpec, TopologyTable};
use crate::core::models::residue::AminoAcid;
use std::sync::OnceLock;

type Row = (
    &'static str,
    [&'static str; 3],
    f64,
    f64,
    f64,
    Option<usize>,
);

const CHI1: Option<usize> = Some(0);
const CHI2: Option<usize> = Some(1);
const CHI3: Option<usize> = Some(2);
const CHI4: Option<usize> = Some(3);
const CHI5: Option<usize> = Some(4);

const CB_PARENTS: [&str; 3] = ["N", "C", "CA"];

fn rows(residue: AminoAcid) -> &'static [Row] {
    match residue {
        AminoAcid::Glycine => &[],
        AminoAcid::Alanine => &[("CB", CB_PARENTS, 1.52, 109.5, 122.686, None)],
        AminoAcid::Serine => &[
            ("CB", CB_PARENTS, 1.52, 109.5, 122.6618, None),
            ("OG", ["N", "CA", "CB"], 1.417, 110.773, -63.3, CHI1),
        ],
        AminoAcid::Cysteine => &[
            ("CB", CB_PARENTS, 1.52, 109.5, 122.5037, None),
            ("SG", ["N", "CA", "CB"], 1.808, 113.8169, -62.2, CHI1),
        ],
        AminoAcid::Valine => &[
            ("CB", CB_PARENTS, 1.52, 109.5, 123.2347, None),
            ("CG1", ["N", "CA", "CB"], 1.527, 110.7, 177.2, CHI1),
            ("CG2", ["N", "CA", "CB"], 1.527, 110.4, -63.3, CHI1),
        ],
        AminoAcid::Isoleucine => &[
            ("CB", CB_PARENTS, 1.52, 109.5, 123.2347, None),
            ("CG1", ["N", "CA", "CB"], 1.527, 110.7, 59.7, CHI1),
            ("CG2", ["N", "CA", "CB"], 1.527, 110.4, -61.6, CHI1),
            ("CD1", ["CA", "CB", "CG1"], 1.52, 113.97, 169.8, CHI2),
        ],
        AminoAcid::Leucine => &[
            ("CB", CB_PARENTS, 1.52, 109.5, 122.4948, None),
            ("CG", ["N", "CA", "CB"], 1.53, 116.10, -60.1, CHI1),
            ("CD1", ["CA", "CB", "CG"], 1.524, 110.27, 174.9, CHI2),
            ("CD2", ["CA", "CB", "CG"], 1.525, 110.58, 66.7, CHI2),
        ],
        AminoAcid::Threonine => &[
            ("CB", CB_PARENTS, 1.52, 109.5, 123.0953, None),
            ("OG1", ["N", "CA", "CB"], 1.43, 109.18, 60.0, CHI1),
            ("CG2", ["N", "CA", "CB"], 1.53, 111.13, -60.3, CHI1),
        ],
        AminoAcid::Arginine => &[
            ("CB", CB_PARENTS, 1.52, 109.5, 122.76, None),
            ("CG", ["N", "CA", "CB"], 1.52, 113.83, -65.2, CHI1),
            ("CD", ["CA", "CB", "CG"], 1.52, 111.79, -179.2, CHI2),
            ("NE", ["CB", "CG", "CD"], 1.46, 111.68, -179.3, CHI3),
            ("CZ", ["CG", "CD", "NE"], 1.33, 124.79, -178.7, CHI4),
            ("NH1", ["CD", "NE", "CZ"], 1.33, 120.64, 0.0, CHI5),
            ("NH2", ["CD", "NE", "CZ"], 1.33, 119.63, 180.0, CHI5),
        ],
        AminoAcid::Lysine => &[
            ("CB", CB_PARENTS, 1.52, 109.5, 122.76, None),
            ("CG", ["N", "CA", "CB"], 1.52, 113.83, -64.5, CHI1),
            ("CD", ["CA", "CB", "CG"], 1.52, 111.79, -178.1, CHI2),
            ("CE", ["CB", "CG", "CD"], 1.46, 111.68, -179.6, CHI3),
            ("NZ", ["CG", "CD", "CE"], 1.33, 124.79, 179.6, CHI4),
        ],
        AminoAcid::AsparticAcid => &[
            ("CB", CB_PARENTS, 1.52, 109.5, 122.82, None),
            ("CG", ["N", "CA", "CB"], 1.52, 113.06, -66.4, CHI1),
            ("OD1", ["CA", "CB", "CG"], 1.25, 119.22, -46.7, CHI2),
            ("OD2", ["CA", "CB", "CG"], 1.25, 118.218, 133.3, CHI2),
        ],
        AminoAcid::GlutamicAcid => &[
            ("CB", CB_PARENTS, 1.52, 109.5, 122.8702, None),
            ("CG", ["N", "CA", "CB"], 1.52, 113.82, -63.8, CHI1),
            ("CD", ["CA", "CB", "CG"], 1.52, 113.31, -179.8, CHI2),
            ("OE1", ["CB", "CG", "CD"], 1.25, 119.02, -6.2, CHI3),
            ("OE2", ["CB", "CG", "CD"], 1.25, 118.08, 173.8, CHI3),
        ],
        AminoAcid::Asparagine => &[
            ("CB", CB_PARENTS, 1.52, 109.5, 123.2254, None),
            ("CG", ["N", "CA", "CB"], 1.52, 112.62, -65.5, CHI1),
            ("OD1", ["CA", "CB", "CG"], 1.23, 120.85, -58.3, CHI2),
            ("ND2", ["CA", "CB", "CG"], 1.33, 116.48, 121.7, CHI2),
        ],
        AminoAcid::Glutamine => &[
            ("CB", CB_PARENTS, 1.52, 109.5, 122.8134, None),
            ("CG", ["N", "CA", "CB"], 1.52, 113.75, -60.2, CHI1),
            ("CD", ["CA", "CB", "CG"], 1.52, 112.78, -69.6, CHI2),
            ("OE1", ["CB", "CG", "CD"], 1.24, 120.86, -50.5, CHI3),
            ("NE2", ["CB", "CG", "CD"], 1.33, 116.50, 129.5, CHI3),
        ],
        AminoAcid::Methionine => &[
            ("CB", CB_PARENTS, 1.52, 109.5, 122.6733, None),
            ("CG", ["N", "CA", "CB"], 1.52, 113.68, -64.4, CHI1),
            ("SD", ["CA", "CB", "CG"], 1.81, 112.69, -179.6, CHI2),
            ("CE", ["CB", "CG", "SD"], 1.79, 100.61, 70.1, CHI3),
        ],
        AminoAcid::Histidine => &[
            ("CB", CB_PARENTS, 1.52, 109.5, 122.6711, None),
            ("CG", ["N", "CA", "CB"], 1.49, 113.74, -63.2, CHI1),
            ("ND1", ["CA", "CB", "CG"], 1.38, 122.85, -75.7, CHI2),
            ("CD2", ["CA", "CB", "CG"], 1.35, 130.61, 104.3, CHI2),
            ("CE1", ["CB", "CG", "ND1"], 1.32, 108.5, 180.0, None),
            ("NE2", ["CB", "CG", "CD2"], 1.35, 108.5, 180.0, None),
        ],
        AminoAcid::Proline => &[
            ("CB", CB_PARENTS, 1.52, 109.5, 115.2975, None),
            ("CG", ["N", "CA", "CB"], 1.49, 104.21, 29.6, CHI1),
            ("CD", ["CA", "CB", "CG"], 1.50, 105.03, -34.8, CHI2),
        ],
        AminoAcid::Phenylalanine => &[
            ("CB", CB_PARENTS, 1.52, 109.5, 122.6054, None),
            ("CG", ["N", "CA", "CB"], 1.50, 113.85, -64.7, CHI1),
            ("CD1", ["CA", "CB", "CG"], 1.39, 120.0, 93.3, CHI2),
            ("CD2", ["CA", "CB", "CG"], 1.39, 120.0, -86.7, CHI2),
            ("CE1", ["CB", "CG", "CD1"], 1.39, 120.0, 180.0, None),
            ("CE2", ["CB", "CG", "CD2"], 1.39, 120.0, 180.0, None),
            ("CZ", ["CG", "CD1", "CE1"], 1.39, 120.0, 0.0, None),
        ],
        AminoAcid::Tyrosine => &[
            ("CB", CB_PARENTS, 1.52, 109.5, 122.6023, None),
            ("CG", ["N", "CA", "CB"], 1.51, 113.8, -64.3, CHI1),
            ("CD1", ["CA", "CB", "CG"], 1.39, 120.98, 93.1, CHI2),
            ("CD2", ["CA", "CB", "CG"], 1.39, 120.82, -86.9, CHI2),
            ("CE1", ["CB", "CG", "CD1"], 1.39, 120.0, 180.0, None),
            ("CE2", ["CB", "CG", "CD2"], 1.39, 120.0, 180.0, None),
            ("CZ", ["CG", "CD1", "CE1"], 1.39, 120.0, 0.0, None),
            ("OH", ["CD1", "CE1", "CZ"], 1.39, 119.78, 180.0, None),
        ],
        AminoAcid::Tryptophan => &[
            ("CB", CB_PARENTS, 1.52, 109.5, 122.6112, None),
            ("CG", ["N", "CA", "CB"], 1.50, 114.10, -66.4, CHI1),
            ("CD1", ["CA", "CB", "CG"], 1.37, 127.07, 96.3, CHI2),
            ("CD2", ["CA", "CB", "CG"], 1.43, 126.66, -83.7, CHI2),
            ("NE1", ["CB", "CG", "CD1"], 1.38, 108.5, 180.0, None),
            ("CE2", ["CB", "CG", "CD2"], 1.40, 108.5, 180.0, None),
            ("CE3", ["CB", "CG", "CD2"], 1.40, 133.83, 0.0, None),
            ("CZ2", ["CG", "CD2", "CE2"], 1.40, 120.0, 180.0, None),
            ("CZ3", ["CG", "CD2", "CE3"], 1.40, 120.0, 180.0, None),
            ("CH2", ["CD2", "CE2", "CZ2"], 1.40, 120.0, 0.0, None),
        ],
    }
}

fn residue_spec(residue: AminoAcid) -> ResidueSpec {
    let atoms = rows(residue)
        .iter()
        .map(|&(name, parents, length, angle, torsion, chi)| AtomSpec {
            name: name.to_string(),
            parents: parents.map(str::to_string),
            length,
            angle,
            torsion,
            chi,
        })
        .collect();
    ResidueSpec { atoms }
}

static BUILTIN: OnceLock<TopologyTable> = OnceLock::new();

impl TopologyTable {
    /// The built-in table, constructed on first use and shared for the process lifetime.
    pub fn builtin() -> &'static TopologyTable {
        BUILTIN.get_or_init(|| {
            let specs = AminoAcid::ALL
                .iter()
                .map(|&residue| (residue.three_letter_code().to_string(), residue_spec(residue)));
            // The rows above are fixed at compile time and covered by tests.
            TopologyTable::from_specs(specs).expect("built-in side-chain topology must be valid")
        })
    }
}
