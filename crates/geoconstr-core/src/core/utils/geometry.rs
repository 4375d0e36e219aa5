use nalgebra::{Point3, Vector3};

pub fn centroid(points: &[Point3<f64>]) -> Option<Point3<f64>> {
    if points.is_empty() {
        return None;
    }
    let sum: Vector3<f64> = points.iter().map(|p| p.coords).sum();
    Some(Point3::from(sum / points.len() as f64))
}

/// Root-mean-square distance of `points` from their centroid.
///
/// Returns `None` for an empty slice.
pub fn radius_of_gyration(points: &[Point3<f64>]) -> Option<f64> {
    let center = centroid(points)?;
    let mean_sq = points
        .iter()
        .map(|p| (p - center).norm_squared())
        .sum::<f64>()
        / points.len() as f64;
    Some(mean_sq.sqrt())
}

/// Centered copies of `points`, i.e. each point minus the centroid.
pub fn centered(points: &[Point3<f64>]) -> Vec<Vector3<f64>> {
    match centroid(points) {
        Some(center) => points.iter().map(|p| p - center).collect(),
        None => Vec::new(),
    }
}
