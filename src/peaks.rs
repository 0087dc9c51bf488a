use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Centroided peak.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Peak {
    pub mz: f64,
    pub intensity: f64,
    #[serde(default)]
    pub baseline: f64,
    /// Signed charge if it was determined, `None` otherwise.
    #[serde(default)]
    pub charge: Option<i32>,
}

impl Peak {
    pub fn new(mz: f64, intensity: f64) -> Self {
        Self {
            mz,
            intensity,
            baseline: 0.0,
            charge: None,
        }
    }

    pub fn with_charge(mut self, charge: i32) -> Self {
        self.charge = Some(charge);
        self
    }

    pub fn with_baseline(mut self, baseline: f64) -> Self {
        self.baseline = baseline;
        self
    }
}

/// Peaks sorted by ascending m/z. Peak indices are stable for the lifetime of the list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeakList {
    peaks: Vec<Peak>,
}

impl PeakList {
    pub fn new(mut peaks: Vec<Peak>) -> Self {
        peaks.sort_by(|a, b| a.mz.partial_cmp(&b.mz).unwrap_or(std::cmp::Ordering::Equal));
        Self { peaks }
    }

    /// Builds a peak list from parallel m/z and intensity arrays.
    ///
    /// # Arguments
    /// * `mz` - m/z values
    /// * `intensities` - Intensities, same length as `mz`
    ///
    pub fn from_arrays(mz: &Array1<f64>, intensities: &Array1<f64>) -> Result<Self, Error> {
        if mz.len() != intensities.len() {
            return Err(Error::PeakListShape(mz.len(), intensities.len()));
        }
        Ok(Self::new(
            mz.iter()
                .zip(intensities.iter())
                .map(|(mz, intensity)| Peak::new(*mz, *intensity))
                .collect(),
        ))
    }

    pub fn peaks(&self) -> &[Peak] {
        &self.peaks
    }

    pub fn get(&self, index: usize) -> Option<&Peak> {
        self.peaks.get(index)
    }

    pub fn len(&self) -> usize {
        self.peaks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peaks.is_empty()
    }

    /// Most intense peak, the first one on ties.
    pub fn base_peak(&self) -> Option<&Peak> {
        self.peaks.iter().fold(None, |best: Option<&Peak>, peak| match best {
            Some(best) if best.intensity >= peak.intensity => Some(best),
            _ => Some(peak),
        })
    }

    pub fn total_intensity(&self) -> f64 {
        self.intensities().sum()
    }

    pub fn mz_array(&self) -> Array1<f64> {
        self.peaks.iter().map(|peak| peak.mz).collect()
    }

    pub fn intensities(&self) -> Array1<f64> {
        self.peaks.iter().map(|peak| peak.intensity).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_from_arrays() {
        let peaks = PeakList::from_arrays(&array![300.0, 100.0, 200.0], &array![1.0, 5.0, 5.0]).unwrap();
        assert_eq!(peaks.mz_array(), array![100.0, 200.0, 300.0]);
        assert_eq!(peaks.total_intensity(), 11.0);
        assert_eq!(peaks.base_peak().unwrap().mz, 100.0);

        assert_eq!(
            PeakList::from_arrays(&array![1.0, 2.0], &array![1.0]),
            Err(Error::PeakListShape(2, 1))
        );
    }

    #[test]
    fn test_empty() {
        let peaks = PeakList::default();
        assert!(peaks.base_peak().is_none());
        assert_eq!(peaks.total_intensity(), 0.0);
    }
}
