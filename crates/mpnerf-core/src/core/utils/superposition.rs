use crate::core::models::transform::RigidTransform;
use nalgebra::{Matrix3, Point3, Rotation3, Vector3};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SuperpositionError {
    #[error("Point sets differ in size: {from} vs {to}")]
    LengthMismatch { from: usize, to: usize },
    #[error("Cannot superpose empty point sets")]
    Empty,
    #[error("Singular value decomposition did not produce both factors")]
    Decomposition,
}

fn centroid(points: &[Point3<f64>]) -> Point3<f64> {
    let sum: Vector3<f64> = points.iter().map(|p| p.coords).sum();
    Point3::from(sum / points.len() as f64)
}

/// Least-squares rigid superposition mapping `from_points` onto `to_points`.
///
/// Reflections are corrected, so the result is always a proper rotation.
pub fn kabsch(
    from_points: &[Point3<f64>],
    to_points: &[Point3<f64>],
) -> Result<RigidTransform, SuperpositionError> {
    if from_points.len() != to_points.len() {
        return Err(SuperpositionError::LengthMismatch {
            from: from_points.len(),
            to: to_points.len(),
        });
    }
    if from_points.is_empty() {
        return Err(SuperpositionError::Empty);
    }

    let from_centroid = centroid(from_points);
    let to_centroid = centroid(to_points);

    let h = from_points
        .iter()
        .zip(to_points.iter())
        .fold(Matrix3::zeros(), |acc, (f, t)| {
            acc + (t - to_centroid) * (f - from_centroid).transpose()
        });

    let svd = h.svd(true, true);
    let (u, v_t) = match (svd.u, svd.v_t) {
        (Some(u), Some(v_t)) => (u, v_t),
        _ => return Err(SuperpositionError::Decomposition),
    };

    let mut correction = Matrix3::identity();
    if (u * v_t).determinant() < 0.0 {
        correction[(2, 2)] = -1.0;
    }

    let rotation = Rotation3::from_matrix(&(u * correction * v_t));
    let translation = to_centroid.coords - rotation * from_centroid.coords;
    Ok(RigidTransform::new(rotation, translation))
}

pub fn rmsd(coords1: &[Point3<f64>], coords2: &[Point3<f64>]) -> Option<f64> {
    if coords1.len() != coords2.len() || coords1.is_empty() {
        return None;
    }
    let n = coords1.len() as f64;
    let squared_dist_sum: f64 = coords1
        .iter()
        .zip(coords2.iter())
        .map(|(p1, p2)| (p1 - p2).norm_squared())
        .sum();
    Some((squared_dist_sum / n).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Unit;

    fn cloud() -> Vec<Point3<f64>> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.458, 0.0, 0.0),
            Point3::new(2.009, 1.420, 0.0),
            Point3::new(1.2, 2.3, 0.9),
        ]
    }

    #[test]
    fn kabsch_recovers_a_known_motion() {
        let motion = RigidTransform::new(
            Rotation3::from_axis_angle(&Unit::new_normalize(Vector3::new(0.3, -1.0, 0.6)), 2.4),
            Vector3::new(5.0, -3.0, 1.5),
        );
        let from = cloud();
        let to: Vec<_> = from.iter().map(|p| motion.apply(p)).collect();
        let fitted = kabsch(&from, &to).unwrap();
        for (f, t) in from.iter().zip(&to) {
            assert!((fitted.apply(f) - t).norm() < 1e-9);
        }
        assert!((fitted.rotation.matrix().determinant() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn kabsch_never_returns_a_reflection() {
        let from = cloud();
        let mirrored: Vec<_> = from.iter().map(|p| Point3::new(p.x, p.y, -p.z)).collect();
        let fitted = kabsch(&from, &mirrored).unwrap();
        assert!((fitted.rotation.matrix().determinant() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn kabsch_rejects_bad_input() {
        let from = cloud();
        assert_eq!(
            kabsch(&from, &from[..2]),
            Err(SuperpositionError::LengthMismatch { from: 4, to: 2 })
        );
        assert_eq!(kabsch(&[], &[]), Err(SuperpositionError::Empty));
    }

    #[test]
    fn rmsd_of_identical_sets_is_zero() {
        let a = cloud();
        assert_eq!(rmsd(&a, &a), Some(0.0));
    }

    #[test]
    fn rmsd_of_uniform_shift_equals_shift() {
        let a = cloud();
        let b: Vec<_> = a.iter().map(|p| p + Vector3::new(0.0, 2.0, 0.0)).collect();
        assert!((rmsd(&a, &b).unwrap() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn rmsd_rejects_mismatched_or_empty_sets() {
        let a = cloud();
        assert_eq!(rmsd(&a, &a[..1]), None);
        assert_eq!(rmsd(&[], &[]), None);
    }
}
