use crate::core::utils::geometry::centered;
use nalgebra::{Matrix3, Matrix4, Point3, Quaternion, SymmetricEigen, Unit, Vector3};
use std::f64::consts::PI;

const SMALL_ANGLE_THRESHOLD: f64 = 1e-8;

/// Prefactor mapping a unit quaternion to its exponential-map vector, and its
/// derivative with respect to the real part `q0`.
///
/// `fac(q0) * q_imag` is the rotation vector (axis times angle). The expression
/// `2 acos(q0) / sqrt(1 - q0²)` is ill-defined at `q0 = 1`, where its first-order
/// expansion is used instead; `fac(1) = 2`.
pub fn calc_fac_dfac(q0: f64) -> (f64, f64) {
    let qm1 = q0 - 1.0;
    if qm1.abs() < SMALL_ANGLE_THRESHOLD {
        (2.0 - 2.0 * qm1 / 3.0, -2.0 / 3.0)
    } else {
        let one_minus_sq = 1.0 - q0 * q0;
        let acos = q0.acos();
        let fac = 2.0 * acos / one_minus_sq.sqrt();
        let dfac = -2.0 / one_minus_sq + 2.0 * q0 * acos / one_minus_sq.powf(1.5);
        (fac, dfac)
    }
}

/// Maps an angle onto its periodic image in `[-π, π)`.
pub fn wrap_angle(theta: f64) -> f64 {
    (theta + PI).rem_euclid(2.0 * PI) - PI
}

/// Unit quaternion for a rotation of `theta` radians about `axis`, after wrapping the
/// angle so that the real part is never negative.
pub fn axis_angle_quaternion(axis: &Unit<Vector3<f64>>, theta: f64) -> Quaternion<f64> {
    let half = wrap_angle(theta) / 2.0;
    let (s, c) = half.sin_cos();
    Quaternion::new(c, axis.x * s, axis.y * s, axis.z * s)
}

/// Exponential-map displacement for rotating a group of radius of gyration `rg` by
/// `theta` radians about `axis`.
///
/// This is the target value triple for the three rotation components of a group.
/// Because of the angle wrapping its magnitude is `|wrap(theta)| * rg`.
pub fn axis_angle_displacement(axis: &Unit<Vector3<f64>>, theta: f64, rg: f64) -> Vector3<f64> {
    let q = axis_angle_quaternion(axis, theta);
    let (fac, _) = calc_fac_dfac(q.w);
    q.imag() * (fac * rg)
}

fn build_correlation(x: &[Vector3<f64>], y: &[Vector3<f64>]) -> Matrix3<f64> {
    x.iter()
        .zip(y)
        .fold(Matrix3::zeros(), |acc, (xi, yi)| acc + xi * yi.transpose())
}

fn build_f(r: &Matrix3<f64>) -> Matrix4<f64> {
    Matrix4::new(
        r[(0, 0)] + r[(1, 1)] + r[(2, 2)],
        r[(1, 2)] - r[(2, 1)],
        r[(2, 0)] - r[(0, 2)],
        r[(0, 1)] - r[(1, 0)],
        r[(1, 2)] - r[(2, 1)],
        r[(0, 0)] - r[(1, 1)] - r[(2, 2)],
        r[(0, 1)] + r[(1, 0)],
        r[(0, 2)] + r[(2, 0)],
        r[(2, 0)] - r[(0, 2)],
        r[(0, 1)] + r[(1, 0)],
        -r[(0, 0)] + r[(1, 1)] - r[(2, 2)],
        r[(1, 2)] + r[(2, 1)],
        r[(0, 1)] - r[(1, 0)],
        r[(0, 2)] + r[(2, 0)],
        r[(1, 2)] + r[(2, 1)],
        -r[(0, 0)] - r[(1, 1)] + r[(2, 2)],
    )
}

/// The unit quaternion of the rotation that best superimposes `reference` onto
/// `current` after removing both centroids.
///
/// The quaternion is the eigenvector of the largest eigenvalue of the 4x4 key matrix
/// built from the correlation matrix, with its sign chosen so that the real part is
/// non-negative. Degenerate inputs (empty, mismatched, or all atoms at the centroid)
/// give the identity.
pub fn quaternion_between(reference: &[Point3<f64>], current: &[Point3<f64>]) -> Quaternion<f64> {
    if reference.is_empty() || reference.len() != current.len() {
        return Quaternion::identity();
    }
    let x = centered(reference);
    let y = centered(current);
    let f = build_f(&build_correlation(&x, &y));
    if f.norm() < f64::EPSILON {
        return Quaternion::identity();
    }

    let eigen = SymmetricEigen::new(f);
    let q = eigen.eigenvectors.column(eigen.eigenvalues.imax()).into_owned();
    let q = if q[0] < 0.0 { -q } else { q };
    Quaternion::new(q[0], q[1], q[2], q[3])
}

/// Rotation vector (axis times angle) taking `reference` onto `current`.
pub fn exponential_map(reference: &[Point3<f64>], current: &[Point3<f64>]) -> Vector3<f64> {
    let q = quaternion_between(reference, current);
    let (fac, _) = calc_fac_dfac(q.w);
    q.imag() * fac
}
