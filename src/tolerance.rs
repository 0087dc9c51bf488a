use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Units of a mass error or tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ErrorUnits {
    #[default]
    #[serde(rename = "da")]
    Da,
    #[serde(rename = "ppm")]
    Ppm,
}

/// Whether peak charges constrain matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChargeMode {
    /// Peak and candidate charges must agree when both are known.
    #[default]
    #[serde(rename = "strict")]
    Strict,
    #[serde(rename = "ignore_charge")]
    IgnoreCharge,
}

/// Matching tolerance window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToleranceSpec {
    pub value: f64,
    #[serde(default)]
    pub units: ErrorUnits,
    #[serde(default)]
    pub charge_mode: ChargeMode,
}

impl ToleranceSpec {
    pub fn new(value: f64, units: ErrorUnits, charge_mode: ChargeMode) -> Self {
        Self {
            value,
            units,
            charge_mode,
        }
    }

    pub fn da(value: f64) -> Self {
        Self::new(value, ErrorUnits::Da, ChargeMode::Strict)
    }

    pub fn ppm(value: f64) -> Self {
        Self::new(value, ErrorUnits::Ppm, ChargeMode::Strict)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if !self.value.is_finite() || self.value < 0.0 {
            return Err(Error::InvalidParameter(format!(
                "tolerance must be a finite non-negative number, got {}",
                self.value
            )));
        }
        Ok(())
    }

    /// Whether a peak charge is compatible with a candidate charge.
    pub fn charges_compatible(&self, peak_charge: Option<i32>, candidate_charge: Option<i32>) -> bool {
        match (self.charge_mode, peak_charge, candidate_charge) {
            (ChargeMode::IgnoreCharge, _, _) => true,
            (_, Some(peak), Some(candidate)) => peak == candidate,
            _ => true,
        }
    }

    /// Lower and upper m/z bounds around a target value.
    pub fn bounds(&self, mz: f64) -> (f64, f64) {
        let delta = match self.units {
            ErrorUnits::Da => self.value,
            ErrorUnits::Ppm => self.value * mz / 1e6,
        };
        (mz - delta, mz + delta)
    }
}

impl Default for ToleranceSpec {
    fn default() -> Self {
        Self::da(0.2)
    }
}

/// Signed error of an observed m/z against a theoretical value.
///
/// # Arguments
/// * `observed` - Observed m/z
/// * `theoretical` - Theoretical m/z
/// * `units` - Error units
///
pub fn mass_error(observed: f64, theoretical: f64, units: ErrorUnits) -> f64 {
    match units {
        ErrorUnits::Da => observed - theoretical,
        ErrorUnits::Ppm => (observed - theoretical) / theoretical * 1e6,
    }
}

/// One point of an error plot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ErrorPoint {
    pub mz: f64,
    pub theoretical: f64,
    pub error: f64,
}

/// Errors of a match run in the units they were computed in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorSeries {
    units: ErrorUnits,
    points: Vec<ErrorPoint>,
}

impl ErrorSeries {
    pub fn new(units: ErrorUnits) -> Self {
        Self {
            units,
            points: Vec::new(),
        }
    }

    /// Appends the error of `mz` against `theoretical` and returns it.
    pub fn push(&mut self, mz: f64, theoretical: f64) -> f64 {
        let error = mass_error(mz, theoretical, self.units);
        self.points.push(ErrorPoint {
            mz,
            theoretical,
            error,
        });
        error
    }

    pub fn units(&self) -> ErrorUnits {
        self.units
    }

    pub fn points(&self) -> &[ErrorPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// `(mz, error)` pairs for plotting.
    pub fn pairs(&self) -> Vec<(f64, f64)> {
        self.points.iter().map(|point| (point.mz, point.error)).collect()
    }

    /// Errors recomputed in other units from the stored observed and theoretical values.
    pub fn in_units(&self, units: ErrorUnits) -> ErrorSeries {
        ErrorSeries {
            units,
            points: self
                .points
                .iter()
                .map(|point| ErrorPoint {
                    error: mass_error(point.mz, point.theoretical, units),
                    ..*point
                })
                .collect(),
        }
    }

    /// Errors converted by scaling with `mz / 1e6`.
    ///
    /// This is what an error plot does when only the `(mz, error)` pairs are kept. The ppm
    /// value is relative to the observed m/z instead of the theoretical one, so it drifts from
    /// [`ErrorSeries::in_units`] by a factor of `theoretical / mz`. Da to ppm to Da returns
    /// the original errors up to rounding.
    ///
    pub fn rescaled(&self, units: ErrorUnits) -> ErrorSeries {
        let scale = |point: &ErrorPoint| match (self.units, units) {
            (ErrorUnits::Da, ErrorUnits::Ppm) => point.error / (point.mz / 1e6),
            (ErrorUnits::Ppm, ErrorUnits::Da) => point.error * (point.mz / 1e6),
            _ => point.error,
        };
        ErrorSeries {
            units,
            points: self
                .points
                .iter()
                .map(|point| ErrorPoint {
                    error: scale(point),
                    ..*point
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mass_error() {
        assert_eq!(mass_error(1000.5, 1000.0, ErrorUnits::Da), 1000.5 - 1000.0);
        assert_eq!(
            mass_error(1000.5, 1000.0, ErrorUnits::Ppm),
            (1000.5 - 1000.0) / 1000.0 * 1e6
        );
    }

    #[test]
    fn test_validate() {
        assert!(ToleranceSpec::da(0.0).validate().is_ok());
        assert!(ToleranceSpec::da(-0.1).validate().is_err());
        assert!(ToleranceSpec::ppm(f64::NAN).validate().is_err());
    }

    #[test]
    fn test_charges_compatible() {
        let strict = ToleranceSpec::da(0.1);
        assert!(strict.charges_compatible(None, Some(2)));
        assert!(strict.charges_compatible(Some(2), None));
        assert!(strict.charges_compatible(Some(2), Some(2)));
        assert!(!strict.charges_compatible(Some(1), Some(2)));
        assert!(!strict.charges_compatible(Some(-1), Some(1)));

        let ignore = ToleranceSpec::new(0.1, ErrorUnits::Da, ChargeMode::IgnoreCharge);
        assert!(ignore.charges_compatible(Some(1), Some(2)));
    }

    #[test]
    fn test_bounds() {
        let (low, high) = ToleranceSpec::ppm(10.0).bounds(1000.0);
        assert!((low - 999.99).abs() < 1e-9);
        assert!((high - 1000.01).abs() < 1e-9);
    }

    #[test]
    fn test_unit_conversion() {
        let mut series = ErrorSeries::new(ErrorUnits::Da);
        series.push(1000.02, 1000.0);
        series.push(500.01, 500.0);

        let exact = series.in_units(ErrorUnits::Ppm);
        assert!((exact.points()[0].error - 20.0).abs() < 1e-6);
        assert!((exact.points()[1].error - 20.0).abs() < 1e-6);

        let back = series.rescaled(ErrorUnits::Ppm).rescaled(ErrorUnits::Da);
        for (original, converted) in series.points().iter().zip(back.points()) {
            assert!((original.error - converted.error).abs() < 1e-12);
        }

        // rescaling divides by the observed m/z, not the theoretical one
        let approximate = series.rescaled(ErrorUnits::Ppm);
        assert!((approximate.points()[0].error - exact.points()[0].error).abs() > 1e-6);
    }
}
