use serde::{Deserialize, Serialize};

use crate::candidate::Matchable;

/// Observed and theoretical m/z pair for fitting a calibration curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationPoint {
    pub label: String,
    pub theoretical_mz: f64,
    pub observed_mz: f64,
}

/// Sorts calibration points by observed m/z, keeping the match order on ties.
pub fn sorted(mut points: Vec<CalibrationPoint>) -> Vec<CalibrationPoint> {
    points.sort_by(|a, b| {
        a.observed_mz
            .partial_cmp(&b.observed_mz)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    points
}

/// One calibration point per match of already matched candidates, sorted by observed m/z.
pub fn from_candidates<T: Matchable>(candidates: &[T]) -> Vec<CalibrationPoint> {
    let points = candidates
        .iter()
        .flat_map(|candidate| {
            candidate.matches().iter().map(move |found| CalibrationPoint {
                label: candidate.label().to_string(),
                theoretical_mz: found.theoretical_mz,
                observed_mz: found.observed_mz,
            })
        })
        .collect();
    sorted(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(label: &str, observed_mz: f64) -> CalibrationPoint {
        CalibrationPoint {
            label: label.to_string(),
            theoretical_mz: observed_mz,
            observed_mz,
        }
    }

    #[test]
    fn test_sorted_is_stable() {
        let points = sorted(vec![point("c", 300.0), point("a", 100.0), point("b", 300.0)]);
        let labels: Vec<&str> = points.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["a", "c", "b"]);
    }
}
