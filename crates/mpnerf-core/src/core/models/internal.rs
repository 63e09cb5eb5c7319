use super::residue::AminoAcid;
use crate::core::topology::SidechainTopology;
use crate::core::utils::geometry::{InternalCoord, wrap_angle};
use std::f64::consts::PI;

/// Fixed side-chain width of every padded residue; TRP uses all of it.
pub const MAX_SIDECHAIN_ATOMS: usize = 10;

/// Value stored for geometrically undefined internals: `phi` of the first residue and
/// the junction values (`c_n`, `ca_c_n`, `c_n_ca`, `omega`) of the last residue.
pub const TERMINAL_SENTINEL: f64 = 0.0;

/// Backbone internal coordinates of residue `i`. Lengths in Å, angles in radians.
///
/// `c_n`, `ca_c_n`, `c_n_ca` and `omega` describe the peptide bond towards residue
/// `i + 1`; `phi` involves `C` of residue `i - 1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackboneInternals {
    pub n_ca: f64,
    pub ca_c: f64,
    pub c_n: f64,
    pub n_ca_c: f64,
    pub ca_c_n: f64,
    pub c_n_ca: f64,
    pub phi: f64,
    pub psi: f64,
    pub omega: f64,
    pub c_o: f64,
    pub ca_c_o: f64,
}

impl BackboneInternals {
    pub const IDEAL_N_CA: f64 = 1.458;
    pub const IDEAL_CA_C: f64 = 1.525;
    pub const IDEAL_C_N: f64 = 1.329;
    pub const IDEAL_C_O: f64 = 1.231;
    pub const IDEAL_N_CA_C_DEG: f64 = 111.0;
    pub const IDEAL_CA_C_N_DEG: f64 = 117.2;
    pub const IDEAL_C_N_CA_DEG: f64 = 121.7;
    pub const IDEAL_CA_C_O_DEG: f64 = 120.5;

    /// Ideal bond geometry with the given torsions (radians).
    pub fn ideal(phi: f64, psi: f64, omega: f64) -> Self {
        Self {
            n_ca: Self::IDEAL_N_CA,
            ca_c: Self::IDEAL_CA_C,
            c_n: Self::IDEAL_C_N,
            n_ca_c: Self::IDEAL_N_CA_C_DEG.to_radians(),
            ca_c_n: Self::IDEAL_CA_C_N_DEG.to_radians(),
            c_n_ca: Self::IDEAL_C_N_CA_DEG.to_radians(),
            phi,
            psi,
            omega,
            c_o: Self::IDEAL_C_O,
            ca_c_o: Self::IDEAL_CA_C_O_DEG.to_radians(),
        }
    }

    /// Fully extended (all-trans) backbone.
    pub fn extended() -> Self {
        Self::ideal(PI, PI, PI)
    }

    /// Places `N` of the next residue from `(N, CA, C)` of this one.
    pub fn next_n(&self) -> InternalCoord {
        InternalCoord::new(self.c_n, self.ca_c_n, self.psi)
    }

    /// Places `CA` of the next residue from `(CA, C, N_next)`.
    pub fn next_ca(&self, next: &Self) -> InternalCoord {
        InternalCoord::new(next.n_ca, self.c_n_ca, self.omega)
    }

    /// Places `C` from `(C_prev, N, CA)`.
    pub fn own_c(&self) -> InternalCoord {
        InternalCoord::new(self.ca_c, self.n_ca_c, self.phi)
    }

    /// Places `O` from `(N, CA, C)`, trans to the next `N`.
    pub fn carbonyl(&self) -> InternalCoord {
        InternalCoord::new(self.c_o, self.ca_c_o, wrap_angle(self.psi + PI))
    }

    /// Clears the values that have no geometric meaning at the chain termini.
    pub fn with_terminal_sentinels(mut self, is_first: bool, is_last: bool) -> Self {
        if is_first {
            self.phi = TERMINAL_SENTINEL;
        }
        if is_last {
            self.c_n = TERMINAL_SENTINEL;
            self.ca_c_n = TERMINAL_SENTINEL;
            self.c_n_ca = TERMINAL_SENTINEL;
            self.omega = TERMINAL_SENTINEL;
        }
        self
    }
}

/// Padded side-chain internal coordinates with a validity mask.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SidechainInternals {
    pub coords: [InternalCoord; MAX_SIDECHAIN_ATOMS],
    pub mask: [bool; MAX_SIDECHAIN_ATOMS],
}

impl Default for SidechainInternals {
    fn default() -> Self {
        Self::empty()
    }
}

impl SidechainInternals {
    pub fn empty() -> Self {
        Self {
            coords: [InternalCoord::default(); MAX_SIDECHAIN_ATOMS],
            mask: [false; MAX_SIDECHAIN_ATOMS],
        }
    }

    /// Fills the leading slots from `coords`; anything past the padding width is
    /// rejected by returning `None`.
    pub fn from_coords(coords: &[InternalCoord]) -> Option<Self> {
        if coords.len() > MAX_SIDECHAIN_ATOMS {
            return None;
        }
        let mut out = Self::empty();
        for (slot, coord) in coords.iter().enumerate() {
            out.coords[slot] = *coord;
            out.mask[slot] = true;
        }
        Some(out)
    }

    /// Table defaults with chi torsions overridden.
    ///
    /// An atom driven by chi `k` receives `chis[k]` shifted by its default offset from
    /// the first atom of chi `k`, so branch atoms keep their relative placement. Missing
    /// chi values keep the defaults; extra values are ignored.
    pub fn from_topology(topology: &SidechainTopology, chis: &[f64]) -> Self {
        let mut out = Self::empty();
        for (slot, atom) in topology.atoms().iter().enumerate() {
            let mut coord = atom.coord;
            if let Some(k) = atom.chi {
                if let (Some(&chi), Some(primary)) = (chis.get(k), topology.chi_primary(k)) {
                    coord.torsion = wrap_angle(chi + atom.coord.torsion - primary.coord.torsion);
                }
            }
            out.coords[slot] = coord;
            out.mask[slot] = true;
        }
        out
    }

    pub fn count(&self) -> usize {
        self.mask.iter().filter(|&&valid| valid).count()
    }

    pub fn get(&self, slot: usize) -> Option<&InternalCoord> {
        match self.mask.get(slot) {
            Some(true) => self.coords.get(slot),
            _ => None,
        }
    }

    /// A well-formed mask is a contiguous run of valid slots from slot 0.
    pub fn is_prefix_mask(&self) -> bool {
        let count = self.count();
        self.mask.iter().take(count).all(|&valid| valid)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResidueInternals {
    pub residue_type: AminoAcid,
    pub backbone: BackboneInternals,
    pub sidechain: SidechainInternals,
}

impl ResidueInternals {
    pub fn new(
        residue_type: AminoAcid,
        backbone: BackboneInternals,
        sidechain: SidechainInternals,
    ) -> Self {
        Self {
            residue_type,
            backbone,
            sidechain,
        }
    }
}

/// Backbone and side-chain torsions of one residue, in radians.
#[derive(Debug, Clone, PartialEq)]
pub struct ResidueTorsions {
    pub phi: f64,
    pub psi: f64,
    pub omega: f64,
    pub chis: Vec<f64>,
}

impl Default for ResidueTorsions {
    fn default() -> Self {
        Self {
            phi: PI,
            psi: PI,
            omega: PI,
            chis: Vec::new(),
        }
    }
}

/// Ordered residues of one chain, 0-indexed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChainInternals {
    pub residues: Vec<ResidueInternals>,
}

impl ChainInternals {
    pub fn new(residues: Vec<ResidueInternals>) -> Self {
        Self { residues }
    }

    pub fn len(&self) -> usize {
        self.residues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.residues.is_empty()
    }

    pub fn sequence(&self) -> Vec<AminoAcid> {
        self.residues.iter().map(|r| r.residue_type).collect()
    }

    pub fn backbone(&self) -> Vec<BackboneInternals> {
        self.residues.iter().map(|r| r.backbone).collect()
    }
}
