use crate::core::compute::backend::Backend;
use nalgebra::{Matrix3, Point3, Rotation3, Vector3};
use std::f64::consts::{PI, TAU};
use std::fmt;
use thiserror::Error;

/// Relative tolerance below which a reference triple is treated as collinear.
pub const DEFAULT_DEGENERACY_EPSILON: f64 = 1e-6;

/// A `(bond length, bond angle, torsion)` triple. Angles are in radians.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InternalCoord {
    pub length: f64,
    pub angle: f64,
    pub torsion: f64,
}

impl InternalCoord {
    pub const fn new(length: f64, angle: f64, torsion: f64) -> Self {
        Self {
            length,
            angle,
            torsion,
        }
    }

    pub fn from_degrees(length: f64, angle_degrees: f64, torsion_degrees: f64) -> Self {
        Self::new(
            length,
            angle_degrees.to_radians(),
            torsion_degrees.to_radians(),
        )
    }

    /// Checks the triple before any arithmetic touches it.
    pub fn validate(&self) -> Result<(), GeometryError> {
        let finite =
            self.length.is_finite() && self.angle.is_finite() && self.torsion.is_finite();
        let reason = if !finite {
            Some("non-finite value")
        } else if self.length <= 0.0 {
            Some("bond length must be positive")
        } else if self.angle <= 0.0 || self.angle >= PI {
            Some("bond angle must lie strictly between 0 and pi")
        } else {
            None
        };
        match reason {
            Some(reason) => Err(GeometryError::InvalidInternalCoordinate {
                coord: *self,
                reason,
            }),
            None => Ok(()),
        }
    }
}

impl fmt::Display for InternalCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(length {:.4}, angle {:.2} deg, torsion {:.2} deg)",
            self.length,
            self.angle.to_degrees(),
            self.torsion.to_degrees()
        )
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum GeometryError {
    #[error("Degenerate reference triple: points are coincident, collinear or non-finite")]
    Degenerate,
    #[error("Invalid internal coordinate {coord}: {reason}")]
    InvalidInternalCoordinate {
        coord: InternalCoord,
        reason: &'static str,
    },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum BatchPlacementError {
    #[error("Batch shape mismatch: {a} reference A, {b} reference B, {c} reference C and {coords} internal coordinates")]
    Shape {
        a: usize,
        b: usize,
        c: usize,
        coords: usize,
    },
    #[error("Placement failed for batch element {index}: {source}")]
    Placement {
        index: usize,
        #[source]
        source: GeometryError,
    },
}

/// Orthonormal basis of the NeRF frame spanned by `(a, b, c)`.
///
/// Columns are `bc = unit(c - b)`, `n × bc` and `n = unit((b - a) × (c - b))`.
pub fn frame_basis(
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
    epsilon: f64,
) -> Result<Rotation3<f64>, GeometryError> {
    let ab = b - a;
    let bc = c - b;
    if !(ab.iter().all(|v| v.is_finite()) && bc.iter().all(|v| v.is_finite())) {
        return Err(GeometryError::Degenerate);
    }
    let normal = ab.cross(&bc);
    let normal_norm = normal.norm();
    // Also rejects coincident points, where both sides are zero.
    if !(normal_norm > epsilon * ab.norm() * bc.norm()) {
        return Err(GeometryError::Degenerate);
    }

    let bc_unit = bc.normalize();
    let n_unit = normal / normal_norm;
    let basis = Matrix3::from_columns(&[bc_unit, n_unit.cross(&bc_unit), n_unit]);
    Ok(Rotation3::from_matrix_unchecked(basis))
}

/// Offset of the new atom in its reference frame.
#[inline]
pub fn local_offset(ic: &InternalCoord) -> Vector3<f64> {
    let (sin_theta, cos_theta) = ic.angle.sin_cos();
    let (sin_phi, cos_phi) = ic.torsion.sin_cos();
    Vector3::new(
        -ic.length * cos_theta,
        ic.length * sin_theta * cos_phi,
        ic.length * sin_theta * sin_phi,
    )
}

/// Places `d` so that `|c - d| = length`, `∠bcd = angle` and the dihedral `abcd = torsion`.
pub fn place_atom(
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
    ic: &InternalCoord,
    epsilon: f64,
) -> Result<Point3<f64>, GeometryError> {
    ic.validate()?;
    let basis = frame_basis(a, b, c, epsilon)?;
    Ok(c + basis * local_offset(ic))
}

/// [`place_atom`] over a batch. Every slice must have the same length; the first
/// failing element (by index) is reported.
pub fn place_batch<B: Backend>(
    backend: &B,
    a: &[Point3<f64>],
    b: &[Point3<f64>],
    c: &[Point3<f64>],
    coords: &[InternalCoord],
    epsilon: f64,
) -> Result<Vec<Point3<f64>>, BatchPlacementError> {
    let len = coords.len();
    if a.len() != len || b.len() != len || c.len() != len {
        return Err(BatchPlacementError::Shape {
            a: a.len(),
            b: b.len(),
            c: c.len(),
            coords: len,
        });
    }
    backend.try_map(len, |i| {
        place_atom(&a[i], &b[i], &c[i], &coords[i], epsilon)
            .map_err(|source| BatchPlacementError::Placement { index: i, source })
    })
}

/// The canonical first three atoms: `a` at the origin, `b` on +x, `c` in the xy-plane
/// with `∠abc = angle`.
pub fn seed_triple(
    first_length: f64,
    second_length: f64,
    angle: f64,
) -> Result<[Point3<f64>; 3], GeometryError> {
    InternalCoord::new(first_length, angle, 0.0).validate()?;
    InternalCoord::new(second_length, angle, 0.0).validate()?;

    let a = Point3::origin();
    let b = Point3::new(first_length, 0.0, 0.0);
    let c = b + second_length * Vector3::new(-angle.cos(), angle.sin(), 0.0);
    Ok([a, b, c])
}

#[inline]
pub fn distance(a: &Point3<f64>, b: &Point3<f64>) -> f64 {
    (b - a).norm()
}

/// Angle at `b` in radians, in `[0, π]`.
pub fn bond_angle(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> f64 {
    let u1 = b - a;
    let u2 = c - b;
    u1.cross(&u2).norm().atan2(-u1.dot(&u2))
}

/// Signed dihedral `a-b-c-d` in radians, in `(-π, π]`, IUPAC sign convention.
pub fn dihedral(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>, d: &Point3<f64>) -> f64 {
    let u1 = b - a;
    let u2 = c - b;
    let u3 = d - c;
    let u2_x_u3 = u2.cross(&u3);
    let y = u2.norm() * u1.dot(&u2_x_u3);
    let x = u1.cross(&u2).dot(&u2_x_u3);
    y.atan2(x)
}

/// Wraps an angle into `(-π, π]`.
pub fn wrap_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    if wrapped > PI { wrapped - TAU } else { wrapped }
}

/// Smallest signed difference `a - b` between two angles.
pub fn angle_difference(a: f64, b: f64) -> f64 {
    wrap_angle(a - b)
}
