use crate::core::models::atom::BackboneAtom;
use crate::core::models::internal::MAX_SIDECHAIN_ATOMS;
use crate::core::models::residue::AminoAcid;
use crate::core::utils::geometry::{GeometryError, InternalCoord};
use crate::core::utils::identifiers::{is_backbone_atom, is_heavy_atom};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// On-disk form of one side-chain atom. Angles are in degrees.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AtomSpec {
    pub name: String,
    pub parents: [String; 3],
    pub length: f64,
    pub angle: f64,
    pub torsion: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chi: Option<usize>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ResidueSpec {
    #[serde(default)]
    pub atoms: Vec<AtomSpec>,
}

/// Reference to an already placed atom of the same residue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AtomRef {
    Backbone(BackboneAtom),
    Sidechain(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SidechainAtom {
    pub name: String,
    pub parents: [AtomRef; 3],
    pub coord: InternalCoord,
    /// Index into the residue's chi list when this atom is driven by a chi torsion.
    pub chi: Option<usize>,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TopologyError {
    #[error("{count} side-chain atoms exceed the maximum of {MAX_SIDECHAIN_ATOMS}")]
    TooManyAtoms { count: usize },
    #[error("Atom name '{name}' is used more than once")]
    DuplicateAtom { name: String },
    #[error("Atom name '{name}' is reserved for the backbone or is not a heavy atom")]
    ReservedAtomName { name: String },
    #[error("Atom '{atom}' references unknown parent '{parent}'")]
    UnknownParent { atom: String, parent: String },
    #[error("Atom '{atom}' references parent '{parent}' which is not placed before it")]
    ForwardParent { atom: String, parent: String },
    #[error("Atom '{atom}' lists the same parent more than once")]
    RepeatedParent { atom: String },
    #[error("Atom '{atom}' has invalid default geometry: {source}")]
    InvalidGeometry {
        atom: String,
        #[source]
        source: GeometryError,
    },
    #[error("Chi index {chi} is used without chi index {previous}")]
    ChiGap { chi: usize, previous: usize },
}

#[derive(Debug, Error)]
pub enum TopologyLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("Unknown residue name '{name}' in topology table")]
    UnknownResidue { name: String },
    #[error("Residue {residue} is defined more than once (again as '{name}')")]
    DuplicateResidue { residue: AminoAcid, name: String },
    #[error("Invalid topology for residue {residue}: {source}")]
    Invalid {
        residue: AminoAcid,
        #[source]
        source: TopologyError,
    },
}

/// Ordered heavy-atom side chain of one residue type; parents always precede children.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SidechainTopology {
    atoms: Vec<SidechainAtom>,
}

impl SidechainTopology {
    pub fn new(atoms: Vec<SidechainAtom>) -> Result<Self, TopologyError> {
        if atoms.len() > MAX_SIDECHAIN_ATOMS {
            return Err(TopologyError::TooManyAtoms { count: atoms.len() });
        }

        for (index, atom) in atoms.iter().enumerate() {
            if is_backbone_atom(&atom.name) || !is_heavy_atom(&atom.name) {
                return Err(TopologyError::ReservedAtomName {
                    name: atom.name.clone(),
                });
            }
            if atoms[..index].iter().any(|a| a.name == atom.name) {
                return Err(TopologyError::DuplicateAtom {
                    name: atom.name.clone(),
                });
            }
            for parent in &atom.parents {
                if let AtomRef::Sidechain(p) = parent {
                    if *p >= index {
                        let parent = atoms
                            .get(*p)
                            .map(|a| a.name.clone())
                            .unwrap_or_else(|| format!("#{p}"));
                        return Err(TopologyError::ForwardParent {
                            atom: atom.name.clone(),
                            parent,
                        });
                    }
                }
            }
            let [a, b, c] = atom.parents;
            if a == b || b == c || a == c {
                return Err(TopologyError::RepeatedParent {
                    atom: atom.name.clone(),
                });
            }
            atom.coord
                .validate()
                .map_err(|source| TopologyError::InvalidGeometry {
                    atom: atom.name.clone(),
                    source,
                })?;
        }

        let mut seen_chi = Vec::new();
        for chi in atoms.iter().filter_map(|a| a.chi) {
            if !seen_chi.contains(&chi) {
                seen_chi.push(chi);
            }
        }
        seen_chi.sort_unstable();
        for (expected, &chi) in seen_chi.iter().enumerate() {
            if chi != expected {
                return Err(TopologyError::ChiGap {
                    chi,
                    previous: chi.saturating_sub(1),
                });
            }
        }

        Ok(Self { atoms })
    }

    /// Resolves parent names against the backbone and the atoms listed earlier.
    pub fn from_specs(specs: &[AtomSpec]) -> Result<Self, TopologyError> {
        let mut atoms: Vec<SidechainAtom> = Vec::with_capacity(specs.len());
        for spec in specs {
            let mut parents = [AtomRef::Backbone(BackboneAtom::N); 3];
            for (slot, parent_name) in parents.iter_mut().zip(&spec.parents) {
                *slot = resolve_parent(&spec.name, parent_name, &atoms, specs)?;
            }
            atoms.push(SidechainAtom {
                name: spec.name.trim().to_string(),
                parents,
                coord: InternalCoord::from_degrees(spec.length, spec.angle, spec.torsion),
                chi: spec.chi,
            });
        }
        Self::new(atoms)
    }

    pub fn to_specs(&self) -> Vec<AtomSpec> {
        self.atoms
            .iter()
            .map(|atom| AtomSpec {
                name: atom.name.clone(),
                parents: atom.parents.map(|p| self.parent_name(p).to_string()),
                length: atom.coord.length,
                angle: atom.coord.angle.to_degrees(),
                torsion: atom.coord.torsion.to_degrees(),
                chi: atom.chi,
            })
            .collect()
    }

    pub fn atoms(&self) -> &[SidechainAtom] {
        &self.atoms
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.atoms.iter().position(|a| a.name == name.trim())
    }

    /// The first atom driven by chi `k`.
    pub fn chi_primary(&self, chi: usize) -> Option<&SidechainAtom> {
        self.atoms.iter().find(|a| a.chi == Some(chi))
    }

    pub fn chi_count(&self) -> usize {
        self.atoms
            .iter()
            .filter_map(|a| a.chi)
            .max()
            .map_or(0, |max| max + 1)
    }

    pub fn parent_name(&self, parent: AtomRef) -> &str {
        match parent {
            AtomRef::Backbone(atom) => atom.name(),
            AtomRef::Sidechain(index) => self.atoms.get(index).map_or("?", |a| a.name.as_str()),
        }
    }
}

fn resolve_parent(
    atom_name: &str,
    parent_name: &str,
    placed: &[SidechainAtom],
    specs: &[AtomSpec],
) -> Result<AtomRef, TopologyError> {
    let parent_name = parent_name.trim();
    if let Ok(backbone) = parent_name.parse::<BackboneAtom>() {
        return Ok(AtomRef::Backbone(backbone));
    }
    if let Some(index) = placed.iter().position(|a| a.name == parent_name) {
        return Ok(AtomRef::Sidechain(index));
    }
    if specs.iter().any(|s| s.name.trim() == parent_name) {
        return Err(TopologyError::ForwardParent {
            atom: atom_name.to_string(),
            parent: parent_name.to_string(),
        });
    }
    Err(TopologyError::UnknownParent {
        atom: atom_name.to_string(),
        parent: parent_name.to_string(),
    })
}

/// Immutable map from residue type to side-chain topology.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopologyTable {
    registry: HashMap<AminoAcid, SidechainTopology>,
}

impl TopologyTable {
    pub fn load(path: &Path) -> Result<Self, TopologyLoadError> {
        let path_str = path.to_string_lossy().to_string();
        let content = std::fs::read_to_string(path).map_err(|e| TopologyLoadError::Io {
            path: path_str.clone(),
            source: e,
        })?;
        let table = Self::parse(&content, path_str)?;
        debug!(
            path = %path.display(),
            residues = table.len(),
            "Loaded side-chain topology table."
        );
        Ok(table)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, TopologyLoadError> {
        Self::parse(content, "<inline>".to_string())
    }

    fn parse(content: &str, path: String) -> Result<Self, TopologyLoadError> {
        let specs: HashMap<String, ResidueSpec> = toml::from_str(content)
            .map_err(|e| TopologyLoadError::Toml { path, source: e })?;
        Self::from_specs(specs)
    }

    pub fn from_specs<I>(specs: I) -> Result<Self, TopologyLoadError>
    where
        I: IntoIterator<Item = (String, ResidueSpec)>,
    {
        let mut registry = HashMap::new();
        for (name, spec) in specs {
            let residue = name
                .parse::<AminoAcid>()
                .map_err(|_| TopologyLoadError::UnknownResidue { name: name.clone() })?;
            if registry.contains_key(&residue) {
                return Err(TopologyLoadError::DuplicateResidue { residue, name });
            }
            let topology = SidechainTopology::from_specs(&spec.atoms)
                .map_err(|source| TopologyLoadError::Invalid { residue, source })?;
            registry.insert(residue, topology);
        }
        Ok(Self { registry })
    }

    /// Keyed by three-letter code, sorted.
    pub fn to_specs(&self) -> BTreeMap<String, ResidueSpec> {
        self.registry
            .iter()
            .map(|(residue, topology)| {
                (
                    residue.three_letter_code().to_string(),
                    ResidueSpec {
                        atoms: topology.to_specs(),
                    },
                )
            })
            .collect()
    }

    pub fn get(&self, residue: AminoAcid) -> Option<&SidechainTopology> {
        self.registry.get(&residue)
    }

    pub fn insert(&mut self, residue: AminoAcid, topology: SidechainTopology) {
        self.registry.insert(residue, topology);
    }

    pub fn residue_types(&self) -> Vec<AminoAcid> {
        let mut types: Vec<_> = self.registry.keys().copied().collect();
        types.sort();
        types
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SER_TOML: &str = r#"
        [SER]
        atoms = [
            { name = "CB", parents = ["N", "C", "CA"], length = 1.52, angle = 109.5, torsion = 122.66 },
            { name = "OG", parents = ["N", "CA", "CB"], length = 1.417, angle = 110.773, torsion = -63.3, chi = 0 },
        ]

        [GLY]
    "#;

    fn write_temp(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{content}").unwrap();
        file
    }

    fn spec(name: &str, parents: [&str; 3], chi: Option<usize>) -> AtomSpec {
        AtomSpec {
            name: name.to_string(),
            parents: parents.map(str::to_string),
            length: 1.5,
            angle: 110.0,
            torsion: 60.0,
            chi,
        }
    }

    fn invalid_reason(specs: &[AtomSpec]) -> TopologyError {
        SidechainTopology::from_specs(specs).unwrap_err()
    }

    #[test]
    fn load_parses_valid_file() {
        let file = write_temp(SER_TOML);
        let table = TopologyTable::load(file.path()).unwrap();
        assert_eq!(table.len(), 2);

        let ser = table.get(AminoAcid::Serine).unwrap();
        assert_eq!(ser.len(), 2);
        assert_eq!(ser.atoms()[1].parents[2], AtomRef::Sidechain(0));
        assert_eq!(ser.atoms()[0].parents[1], AtomRef::Backbone(BackboneAtom::C));
        assert!((ser.atoms()[1].coord.angle.to_degrees() - 110.773).abs() < 1e-9);
        assert_eq!(ser.chi_count(), 1);

        assert!(table.get(AminoAcid::Glycine).unwrap().is_empty());
        assert!(table.get(AminoAcid::Alanine).is_none());
    }

    #[test]
    fn load_fails_for_missing_file() {
        let result = TopologyTable::load(Path::new("/definitely/not/here.toml"));
        assert!(matches!(result, Err(TopologyLoadError::Io { .. })));
    }

    #[test]
    fn load_fails_for_malformed_toml() {
        let file = write_temp("[SER\natoms = 3");
        let result = TopologyTable::load(file.path());
        assert!(matches!(result, Err(TopologyLoadError::Toml { .. })));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result = TopologyTable::from_toml_str("[ALA]\nbonds = []\n");
        assert!(matches!(result, Err(TopologyLoadError::Toml { .. })));
    }

    #[test]
    fn unknown_residue_names_are_rejected() {
        let result = TopologyTable::from_toml_str("[XYZ]\natoms = []\n");
        assert!(
            matches!(result, Err(TopologyLoadError::UnknownResidue { ref name }) if name == "XYZ")
        );
    }

    #[test]
    fn residue_defined_under_two_codes_is_rejected() {
        let result = TopologyTable::from_toml_str("[GLY]\natoms = []\n\n[G]\natoms = []\n");
        assert!(matches!(
            result,
            Err(TopologyLoadError::DuplicateResidue {
                residue: AminoAcid::Glycine,
                ..
            })
        ));
    }

    #[test]
    fn invalid_residue_reports_residue_and_reason() {
        let toml = r#"
            [ALA]
            atoms = [{ name = "CB", parents = ["N", "C", "CX"], length = 1.52, angle = 109.5, torsion = 122.0 }]
        "#;
        match TopologyTable::from_toml_str(toml) {
            Err(TopologyLoadError::Invalid { residue, source }) => {
                assert_eq!(residue, AminoAcid::Alanine);
                assert!(matches!(source, TopologyError::UnknownParent { .. }));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn validation_rejects_forward_and_unknown_parents() {
        let forward = [
            spec("CB", ["N", "CA", "CG"], None),
            spec("CG", ["N", "CA", "CB"], None),
        ];
        assert!(matches!(
            invalid_reason(&forward),
            TopologyError::ForwardParent { .. }
        ));

        let self_ref = [spec("CB", ["N", "CA", "CB"], None)];
        assert!(matches!(
            invalid_reason(&self_ref),
            TopologyError::ForwardParent { .. }
        ));

        let unknown = [spec("CB", ["N", "CA", "QQ"], None)];
        assert!(matches!(
            invalid_reason(&unknown),
            TopologyError::UnknownParent { .. }
        ));
    }

    #[test]
    fn validation_rejects_bad_names() {
        let duplicate = [
            spec("CB", ["N", "C", "CA"], None),
            spec("CB", ["N", "CA", "CB"], None),
        ];
        assert!(matches!(
            invalid_reason(&duplicate),
            TopologyError::DuplicateAtom { .. }
        ));

        let reserved = [spec("CA", ["N", "C", "O"], None)];
        assert!(matches!(
            invalid_reason(&reserved),
            TopologyError::ReservedAtomName { .. }
        ));

        let hydrogen = [spec("HB1", ["N", "C", "CA"], None)];
        assert!(matches!(
            invalid_reason(&hydrogen),
            TopologyError::ReservedAtomName { .. }
        ));
    }

    #[test]
    fn validation_rejects_repeated_parents_and_bad_geometry() {
        let repeated = [spec("CB", ["N", "N", "CA"], None)];
        assert!(matches!(
            invalid_reason(&repeated),
            TopologyError::RepeatedParent { .. }
        ));

        let mut flat = spec("CB", ["N", "C", "CA"], None);
        flat.angle = 180.0;
        assert!(matches!(
            invalid_reason(&[flat]),
            TopologyError::InvalidGeometry { .. }
        ));
    }

    #[test]
    fn validation_rejects_oversized_side_chains() {
        let mut specs = vec![spec("CB", ["N", "C", "CA"], None)];
        for i in 1..=MAX_SIDECHAIN_ATOMS {
            let previous = specs[i - 1].name.clone();
            let mut atom = spec(&format!("C{i}"), ["N", "CA", "CB"], None);
            atom.parents[2] = previous;
            atom.parents[1] = if i == 1 { "CA".to_string() } else { specs[i - 2].name.clone() };
            specs.push(atom);
        }
        assert!(matches!(
            invalid_reason(&specs),
            TopologyError::TooManyAtoms { count: 11 }
        ));
    }

    #[test]
    fn validation_rejects_chi_gaps() {
        let gap = [
            spec("CB", ["N", "C", "CA"], None),
            spec("CG", ["N", "CA", "CB"], Some(1)),
        ];
        assert_eq!(
            invalid_reason(&gap),
            TopologyError::ChiGap {
                chi: 1,
                previous: 0
            }
        );
    }

    #[test]
    fn specs_survive_a_serialization_cycle() {
        let table = TopologyTable::from_toml_str(SER_TOML).unwrap();
        let text = toml::to_string(&table.to_specs()).unwrap();
        let reparsed = TopologyTable::from_toml_str(&text).unwrap();
        let a = table.get(AminoAcid::Serine).unwrap();
        let b = reparsed.get(AminoAcid::Serine).unwrap();
        for (x, y) in a.atoms().iter().zip(b.atoms()) {
            assert_eq!(x.name, y.name);
            assert_eq!(x.parents, y.parents);
            assert!((x.coord.torsion - y.coord.torsion).abs() < 1e-12);
        }
    }
}
