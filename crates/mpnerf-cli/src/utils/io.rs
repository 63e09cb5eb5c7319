use crate::error::{CliError, Result};
use anyhow::anyhow;
use mpnerf::core::models::atom::{AtomRole, BackboneAtom, ResidueAtoms};
use mpnerf::core::models::chain::ResolvedChain;
use mpnerf::core::models::internal::{ChainInternals, ResidueTorsions};
use mpnerf::core::models::residue::AminoAcid;
use mpnerf::core::topology::TopologyTable;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Chain description read by `build`. Angles are in degrees.
///
/// ```toml
/// sequence = "GAW"
///
/// [[residues]]
/// phi = -57.0
/// psi = -47.0
/// chi = [-65.0]
/// ```
///
/// Without a `residues` list every residue is all-trans with default side chains.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ChainFile {
    pub sequence: String,
    #[serde(default)]
    pub residues: Vec<ResidueEntry>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ResidueEntry {
    pub phi: Option<f64>,
    pub psi: Option<f64>,
    pub omega: Option<f64>,
    #[serde(default)]
    pub chi: Vec<f64>,
}

impl ResidueEntry {
    fn to_torsions(&self) -> ResidueTorsions {
        let defaults = ResidueTorsions::default();
        ResidueTorsions {
            phi: self.phi.map_or(defaults.phi, f64::to_radians),
            psi: self.psi.map_or(defaults.psi, f64::to_radians),
            omega: self.omega.map_or(defaults.omega, f64::to_radians),
            chis: self.chi.iter().map(|c| c.to_radians()).collect(),
        }
    }
}

impl ChainFile {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading chain description from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    pub fn sequence(&self) -> Result<Vec<AminoAcid>> {
        let sequence = AminoAcid::parse_sequence(&self.sequence)
            .map_err(|e| CliError::Argument(e.to_string()))?;
        if sequence.is_empty() {
            return Err(CliError::Argument("sequence is empty".to_string()));
        }
        Ok(sequence)
    }

    pub fn torsions(&self) -> Vec<ResidueTorsions> {
        self.residues.iter().map(ResidueEntry::to_torsions).collect()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AtomRecord {
    pub residue_index: usize,
    pub residue_name: String,
    pub atom_name: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

pub fn write_atoms(path: &Path, chain: &ResolvedChain, table: &TopologyTable) -> Result<usize> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| csv_error(path, e))?;
    let atoms = chain.atoms(table);
    for atom in &atoms {
        writer
            .serialize(AtomRecord {
                residue_index: atom.residue_index,
                residue_name: chain.residue_types[atom.residue_index]
                    .three_letter_code()
                    .to_string(),
                atom_name: atom.name.to_string(),
                x: atom.position.x,
                y: atom.position.y,
                z: atom.position.z,
            })
            .map_err(|e| csv_error(path, e))?;
    }
    writer.flush()?;
    Ok(atoms.len())
}

/// Reads an atom table back into padded residues.
///
/// Rows of one residue must be adjacent and residue indices must run `0, 1, 2, ...`.
pub fn read_atoms(path: &Path, table: &TopologyTable) -> Result<ResolvedChain> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| csv_error(path, e))?;
    let parse_error = |message: String| CliError::FileParsing {
        path: path.to_path_buf(),
        source: anyhow!(message),
    };

    let mut residue_types: Vec<AminoAcid> = Vec::new();
    let mut residues: Vec<ResidueAtoms> = Vec::new();
    for (line, record) in reader.deserialize::<AtomRecord>().enumerate() {
        let record = record.map_err(|e| csv_error(path, e))?;
        let residue_type = record
            .residue_name
            .parse::<AminoAcid>()
            .map_err(|e| parse_error(format!("row {}: {e}", line + 1)))?;

        if record.residue_index == residues.len() {
            residue_types.push(residue_type);
            residues.push(ResidueAtoms::default());
        } else if record.residue_index + 1 != residues.len() {
            return Err(parse_error(format!(
                "row {}: residue index {} is out of order",
                line + 1,
                record.residue_index
            )));
        } else if residue_types[record.residue_index] != residue_type {
            return Err(parse_error(format!(
                "row {}: residue {} changes type to {residue_type}",
                line + 1,
                record.residue_index
            )));
        }

        let role = match record.atom_name.parse::<BackboneAtom>() {
            Ok(atom) => AtomRole::Backbone(atom),
            Err(()) => table
                .get(residue_type)
                .and_then(|t| t.index_of(&record.atom_name))
                .map(AtomRole::Sidechain)
                .ok_or_else(|| {
                    parse_error(format!(
                        "row {}: {residue_type} has no atom '{}'",
                        line + 1,
                        record.atom_name
                    ))
                })?,
        };
        if let Some(residue) = residues.last_mut() {
            residue.set(role, Point3::new(record.x, record.y, record.z));
        }
    }

    debug!(residues = residues.len(), "Read atom table.");
    Ok(ResolvedChain::new(residue_types, residues))
}

/// One residue of measured internals. Lengths in Å, angles in degrees.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct InternalsRecord {
    pub residue_index: usize,
    pub residue_name: String,
    pub n_ca: f64,
    pub ca_c: f64,
    pub c_n: f64,
    pub c_o: f64,
    pub n_ca_c: f64,
    pub ca_c_n: f64,
    pub c_n_ca: f64,
    pub ca_c_o: f64,
    pub phi: f64,
    pub psi: f64,
    pub omega: f64,
    pub chi1: Option<f64>,
    pub chi2: Option<f64>,
    pub chi3: Option<f64>,
    pub chi4: Option<f64>,
    pub chi5: Option<f64>,
}

pub fn internals_records(internals: &ChainInternals, table: &TopologyTable) -> Vec<InternalsRecord> {
    internals
        .residues
        .iter()
        .enumerate()
        .map(|(index, residue)| {
            let bb = &residue.backbone;
            let mut chis = [None; 5];
            if let Some(topology) = table.get(residue.residue_type) {
                for (k, chi) in chis.iter_mut().enumerate().take(topology.chi_count()) {
                    *chi = topology
                        .atoms()
                        .iter()
                        .position(|a| a.chi == Some(k))
                        .and_then(|slot| residue.sidechain.get(slot))
                        .map(|coord| coord.torsion.to_degrees());
                }
            }
            let [chi1, chi2, chi3, chi4, chi5] = chis;
            InternalsRecord {
                residue_index: index,
                residue_name: residue.residue_type.three_letter_code().to_string(),
                n_ca: bb.n_ca,
                ca_c: bb.ca_c,
                c_n: bb.c_n,
                c_o: bb.c_o,
                n_ca_c: bb.n_ca_c.to_degrees(),
                ca_c_n: bb.ca_c_n.to_degrees(),
                c_n_ca: bb.c_n_ca.to_degrees(),
                ca_c_o: bb.ca_c_o.to_degrees(),
                phi: bb.phi.to_degrees(),
                psi: bb.psi.to_degrees(),
                omega: bb.omega.to_degrees(),
                chi1,
                chi2,
                chi3,
                chi4,
                chi5,
            }
        })
        .collect()
}

pub fn write_internals(path: &Path, records: &[InternalsRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| csv_error(path, e))?;
    for record in records {
        writer.serialize(record).map_err(|e| csv_error(path, e))?;
    }
    writer.flush()?;
    Ok(())
}

fn csv_error(path: &Path, e: csv::Error) -> CliError {
    CliError::FileParsing {
        path: path.to_path_buf(),
        source: e.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn chain_file_parses_degrees() {
        let file = write_temp(
            r#"
            sequence = "GS"

            [[residues]]

            [[residues]]
            phi = -90.0
            chi = [60.0]
            "#,
        );
        let chain = ChainFile::from_file(file.path()).unwrap();
        assert_eq!(
            chain.sequence().unwrap(),
            vec![AminoAcid::Glycine, AminoAcid::Serine]
        );
        let torsions = chain.torsions();
        assert_eq!(torsions[0], ResidueTorsions::default());
        assert!((torsions[1].phi + std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        assert!((torsions[1].chis[0] - std::f64::consts::FRAC_PI_3).abs() < 1e-12);
    }

    #[test]
    fn chain_file_rejects_unknown_residues_and_keys() {
        let bad_code = write_temp("sequence = \"GZ\"\n");
        let chain = ChainFile::from_file(bad_code.path()).unwrap();
        assert!(matches!(chain.sequence(), Err(CliError::Argument(_))));

        let bad_key = write_temp("sequence = \"G\"\nresidue = []\n");
        assert!(matches!(
            ChainFile::from_file(bad_key.path()),
            Err(CliError::FileParsing { .. })
        ));
    }

    #[test]
    fn atom_table_round_trips() {
        let table = TopologyTable::builtin();
        let mut ala = ResidueAtoms::from_backbone(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.458, 0.0, 0.0),
            Point3::new(2.0, 1.4, 0.0),
            Point3::new(3.1, 1.6, 0.2),
        );
        ala.set(AtomRole::Sidechain(0), Point3::new(1.9, -0.8, 1.2));
        let gly = ResidueAtoms::from_backbone(
            Point3::new(2.8, 2.4, 0.1),
            Point3::new(4.2, 2.7, 0.1),
            Point3::new(4.9, 1.5, -0.4),
            Point3::new(4.5, 0.4, -0.2),
        );
        let chain = ResolvedChain::new(vec![AminoAcid::Alanine, AminoAcid::Glycine], vec![ala, gly]);

        let file = NamedTempFile::new().unwrap();
        assert_eq!(write_atoms(file.path(), &chain, table).unwrap(), 9);
        let content = std::fs::read_to_string(file.path()).unwrap();
        assert!(content.starts_with("residue_index,residue_name,atom_name,x,y,z"));
        assert!(content.contains("0,ALA,CB,"));

        assert_eq!(read_atoms(file.path(), table).unwrap(), chain);
    }

    #[test]
    fn atom_table_errors_name_the_row() {
        let table = TopologyTable::builtin();
        let unknown_atom = write_temp(
            "residue_index,residue_name,atom_name,x,y,z\n0,GLY,N,0,0,0\n0,GLY,CB,1,0,0\n",
        );
        match read_atoms(unknown_atom.path(), table) {
            Err(CliError::FileParsing { source, .. }) => {
                assert!(source.to_string().contains("row 2"));
            }
            other => panic!("unexpected result: {other:?}"),
        }

        let out_of_order = write_temp(
            "residue_index,residue_name,atom_name,x,y,z\n0,GLY,N,0,0,0\n2,GLY,N,1,0,0\n",
        );
        assert!(matches!(
            read_atoms(out_of_order.path(), table),
            Err(CliError::FileParsing { .. })
        ));
    }
}
