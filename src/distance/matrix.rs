//! Dense Euclidean distance matrix.

use crate::models::Problem;

/// Euclidean distance between two planar points.
///
/// The radicand is clamped at zero so floating-point cancellation can never
/// produce `NaN`.
///
/// ```
/// use ev_routing::distance::euclidean;
///
/// assert!((euclidean((0.0, 0.0), (3.0, 4.0)) - 5.0).abs() < 1e-10);
/// ```
pub fn euclidean(a: (f64, f64), b: (f64, f64)) -> f64 {
    let dx = b.0 - a.0;
    let dy = b.1 - a.1;
    (dx * dx + dy * dy).max(0.0).sqrt()
}

/// Pairwise distances between the depot and every customer, row-major.
///
/// Index 0 is the depot, indices `1..=N` are customers in input order, so a
/// customer id addresses its own row. Built once per solve and read-only
/// afterwards.
///
/// # Examples
///
/// ```
/// use ev_routing::models::{Customer, Depot, Problem, Vehicle};
/// use ev_routing::distance::DistanceMatrix;
///
/// let problem = Problem::new(
///     Depot::new(0.0, 0.0),
///     vec![Customer::new(1, 3.0, 4.0, 10.0, 5.0), Customer::new(2, 6.0, 8.0, 20.0, 5.0)],
///     vec![Vehicle::default()],
/// )
/// .unwrap();
/// let dm = DistanceMatrix::from_problem(&problem);
/// assert!((dm.get(0, 1) - 5.0).abs() < 1e-10);
/// assert!((dm.get(2, 1) - 5.0).abs() < 1e-10);
/// assert_eq!(dm.size(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct DistanceMatrix {
    data: Vec<f64>,
    size: usize,
}

impl DistanceMatrix {
    /// Computes the symmetric matrix over `points`.
    pub fn from_points(points: &[(f64, f64)]) -> Self {
        let size = points.len();
        let data = points
            .iter()
            .flat_map(|&from| points.iter().map(move |&to| euclidean(from, to)))
            .collect();
        Self { data, size }
    }

    /// Computes the matrix over the depot followed by every customer.
    pub fn from_problem(problem: &Problem) -> Self {
        let points: Vec<(f64, f64)> = std::iter::once(problem.depot().position())
            .chain(problem.customers().iter().map(|c| c.position()))
            .collect();
        Self::from_points(&points)
    }

    /// Distance between locations `from` and `to`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.data[from * self.size + to]
    }

    /// Number of locations, depot included.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns `true` if `get(i, j)` and `get(j, i)` differ by at most `tol`
    /// for every pair.
    pub fn is_symmetric(&self, tol: f64) -> bool {
        (0..self.size).all(|i| ((i + 1)..self.size).all(|j| (self.get(i, j) - self.get(j, i)).abs() <= tol))
    }

    /// The candidate closest to `from`; ties go to the earlier candidate.
    ///
    /// Returns `None` if `candidates` is empty.
    pub fn nearest_neighbor(&self, from: usize, candidates: &[usize]) -> Option<usize> {
        candidates
            .iter()
            .copied()
            .min_by(|&a, &b| self.get(from, a).total_cmp(&self.get(from, b)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_points() {
        let dm = DistanceMatrix::from_points(&[(0.0, 0.0), (3.0, 4.0), (0.0, 8.0)]);
        assert_eq!(dm.size(), 3);
        assert!((dm.get(0, 1) - 5.0).abs() < 1e-10);
        assert!((dm.get(0, 2) - 8.0).abs() < 1e-10);
        assert_eq!(dm.get(1, 1), 0.0);
        assert_eq!(dm.get(1, 2), dm.get(2, 1));
        assert!(dm.is_symmetric(0.0));
    }

    #[test]
    fn test_nearest_neighbor() {
        let dm = DistanceMatrix::from_points(&[(0.0, 0.0), (3.0, 4.0), (0.0, 8.0), (-4.0, 3.0)]);
        assert_eq!(dm.nearest_neighbor(0, &[2, 1]), Some(1));
        // 1 and 3 are both 5 away from the depot
        assert_eq!(dm.nearest_neighbor(0, &[3, 1]), Some(3));
        assert_eq!(dm.nearest_neighbor(0, &[1, 3]), Some(1));
        assert_eq!(dm.nearest_neighbor(2, &[]), None);
    }

    #[test]
    fn test_empty() {
        let dm = DistanceMatrix::from_points(&[]);
        assert_eq!(dm.size(), 0);
        assert!(dm.is_symmetric(0.0));
    }

    #[test]
    fn test_euclidean_never_nan() {
        let p = (1e154, -1e154);
        assert_eq!(euclidean(p, p), 0.0);
        assert!(euclidean((0.1, 0.2), (0.1 + 1e-17, 0.2)) >= 0.0);
    }
}
