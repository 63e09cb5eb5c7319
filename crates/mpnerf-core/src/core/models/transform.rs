use crate::core::compute::scan::Monoid;
use crate::core::utils::geometry::{GeometryError, frame_basis};
use nalgebra::{Point3, Rotation3, Vector3};

/// A proper rigid-body motion `x ↦ R·x + t`.
///
/// Composition is associative but not commutative: `a.compose(&b)` applies `b` first
/// and `a` second, so a left-to-right product `J_0 · J_1 · … · J_k` maps points from
/// frame `k` into frame `0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidTransform {
    pub rotation: Rotation3<f64>,
    pub translation: Vector3<f64>,
}

impl RigidTransform {
    pub fn new(rotation: Rotation3<f64>, translation: Vector3<f64>) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    pub fn identity() -> Self {
        Self {
            rotation: Rotation3::identity(),
            translation: Vector3::zeros(),
        }
    }

    /// The frame spanned by `(a, b, c)`: rotation columns are the frame axes and the
    /// origin sits on `c`. Applying it maps frame-local offsets to the points' space.
    pub fn from_frame(
        a: &Point3<f64>,
        b: &Point3<f64>,
        c: &Point3<f64>,
        epsilon: f64,
    ) -> Result<Self, GeometryError> {
        let rotation = frame_basis(a, b, c, epsilon)?;
        Ok(Self::new(rotation, c.coords))
    }

    #[inline]
    pub fn apply(&self, point: &Point3<f64>) -> Point3<f64> {
        Point3::from(self.rotation * point.coords + self.translation)
    }

    #[inline]
    pub fn compose(&self, other: &Self) -> Self {
        Self {
            rotation: self.rotation * other.rotation,
            translation: self.rotation * other.translation + self.translation,
        }
    }

    pub fn inverse(&self) -> Self {
        let rotation = self.rotation.inverse();
        Self {
            rotation,
            translation: -(rotation * self.translation),
        }
    }
}

impl Default for RigidTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Monoid for RigidTransform {
    fn identity() -> Self {
        RigidTransform::identity()
    }

    fn combine(&self, other: &Self) -> Self {
        self.compose(other)
    }
}
