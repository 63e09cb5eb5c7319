use super::internal::MAX_SIDECHAIN_ATOMS;
use nalgebra::Point3;
use std::fmt;
use std::str::FromStr;

pub const BACKBONE_ATOM_COUNT: usize = 4;
/// Slots per padded residue: four backbone atoms followed by the side chain.
pub const ATOMS_PER_RESIDUE: usize = BACKBONE_ATOM_COUNT + MAX_SIDECHAIN_ATOMS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BackboneAtom {
    N,
    CA,
    C,
    O,
}

impl BackboneAtom {
    pub const ALL: [BackboneAtom; BACKBONE_ATOM_COUNT] = [Self::N, Self::CA, Self::C, Self::O];

    pub fn slot(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::N => "N",
            Self::CA => "CA",
            Self::C => "C",
            Self::O => "O",
        }
    }
}

impl FromStr for BackboneAtom {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "N" => Ok(Self::N),
            "CA" => Ok(Self::CA),
            "C" => Ok(Self::C),
            "O" => Ok(Self::O),
            _ => Err(()),
        }
    }
}

impl fmt::Display for BackboneAtom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where an atom sits in its residue's padded layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AtomRole {
    Backbone(BackboneAtom),
    Sidechain(usize),
}

impl AtomRole {
    pub fn slot(self) -> usize {
        match self {
            Self::Backbone(atom) => atom.slot(),
            Self::Sidechain(index) => BACKBONE_ATOM_COUNT + index,
        }
    }

    pub fn from_slot(slot: usize) -> Option<Self> {
        match slot {
            s if s < BACKBONE_ATOM_COUNT => Some(Self::Backbone(BackboneAtom::ALL[s])),
            s if s < ATOMS_PER_RESIDUE => Some(Self::Sidechain(s - BACKBONE_ATOM_COUNT)),
            _ => None,
        }
    }
}

/// One emitted atom.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom<'a> {
    pub residue_index: usize,
    pub role: AtomRole,
    pub name: &'a str,
    pub position: Point3<f64>,
}

/// Padded Cartesian output of one residue. Masked slots hold the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResidueAtoms {
    pub positions: [Point3<f64>; ATOMS_PER_RESIDUE],
    pub mask: [bool; ATOMS_PER_RESIDUE],
}

impl Default for ResidueAtoms {
    fn default() -> Self {
        Self {
            positions: [Point3::origin(); ATOMS_PER_RESIDUE],
            mask: [false; ATOMS_PER_RESIDUE],
        }
    }
}

impl ResidueAtoms {
    pub fn from_backbone(n: Point3<f64>, ca: Point3<f64>, c: Point3<f64>, o: Point3<f64>) -> Self {
        let mut atoms = Self::default();
        for (atom, position) in BackboneAtom::ALL.into_iter().zip([n, ca, c, o]) {
            atoms.set(AtomRole::Backbone(atom), position);
        }
        atoms
    }

    pub fn get(&self, role: AtomRole) -> Option<Point3<f64>> {
        let slot = role.slot();
        match self.mask.get(slot) {
            Some(true) => Some(self.positions[slot]),
            _ => None,
        }
    }

    /// Backbone positions are always populated once a residue is resolved.
    pub fn backbone(&self, atom: BackboneAtom) -> Point3<f64> {
        self.positions[atom.slot()]
    }

    pub fn sidechain(&self, index: usize) -> Option<Point3<f64>> {
        self.get(AtomRole::Sidechain(index))
    }

    pub fn set(&mut self, role: AtomRole, position: Point3<f64>) {
        let slot = role.slot();
        self.positions[slot] = position;
        self.mask[slot] = true;
    }

    pub fn sidechain_count(&self) -> usize {
        self.mask[BACKBONE_ATOM_COUNT..]
            .iter()
            .filter(|&&valid| valid)
            .count()
    }

    /// Valid slots in layout order.
    pub fn iter(&self) -> impl Iterator<Item = (AtomRole, Point3<f64>)> + '_ {
        self.mask
            .iter()
            .enumerate()
            .filter(|(_, valid)| **valid)
            .filter_map(|(slot, _)| AtomRole::from_slot(slot).map(|role| (role, self.positions[slot])))
    }
}
