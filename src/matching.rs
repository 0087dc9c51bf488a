use tracing::{debug, info};

use crate::{
    calibration::{self, CalibrationPoint},
    cancellation::CancellationToken,
    candidate::{Match, Matchable},
    error::Error,
    peaks::PeakList,
    tolerance::{mass_error, ErrorSeries, ToleranceSpec},
};

/// Output series of a match run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchOutcome {
    /// One point per match in match order.
    pub errors: ErrorSeries,
    /// One point per match, sorted by observed m/z.
    pub calibration: Vec<CalibrationPoint>,
}

/// Assigns peaks to candidates within a tolerance window.
#[derive(Debug, Clone, Copy)]
pub struct ToleranceMatcher {
    tolerance: ToleranceSpec,
}

impl ToleranceMatcher {
    pub fn new(tolerance: ToleranceSpec) -> Result<Self, Error> {
        tolerance.validate()?;
        Ok(Self { tolerance })
    }

    pub fn tolerance(&self) -> &ToleranceSpec {
        &self.tolerance
    }

    /// Matches every peak against every candidate.
    ///
    /// Previous matches are cleared first. Pairs are visited peak by peak, candidates in list
    /// order. Each candidate's best error is the match with the smallest absolute error, the
    /// first one found on ties.
    ///
    /// # Arguments
    /// * `peaks` - Peak list
    /// * `candidates` - Candidates, matches are written into them
    /// * `token` - Cancellation token
    ///
    /// # Errors
    /// [`Error::Cancelled`] if the run was cancelled, all candidates are left without matches.
    ///
    pub fn run<T: Matchable>(
        &self,
        peaks: &PeakList,
        candidates: &mut [T],
        token: &CancellationToken,
    ) -> Result<MatchOutcome, Error> {
        candidates.iter_mut().for_each(|candidate| candidate.clear_matches());

        match self.match_all(peaks, candidates, token) {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                if err.is_cancelled() {
                    info!("Matching cancelled, discarding partial matches");
                }
                candidates.iter_mut().for_each(|candidate| candidate.clear_matches());
                Err(err)
            }
        }
    }

    fn match_all<T: Matchable>(
        &self,
        peaks: &PeakList,
        candidates: &mut [T],
        token: &CancellationToken,
    ) -> Result<MatchOutcome, Error> {
        let mut errors = ErrorSeries::new(self.tolerance.units);
        let mut points = Vec::new();

        for (peak_index, peak) in peaks.peaks().iter().enumerate() {
            for candidate in candidates.iter_mut() {
                token.check()?;

                if !self
                    .tolerance
                    .charges_compatible(peak.charge, candidate.charge())
                {
                    continue;
                }
                let Some(theoretical_mz) = candidate.theoretical_mz() else {
                    continue;
                };

                let error = mass_error(peak.mz, theoretical_mz, self.tolerance.units);
                // NaN errors (ppm against a zero m/z) never match
                if !(error.abs() <= self.tolerance.value) {
                    continue;
                }

                candidate.push_match(Match {
                    peak_index,
                    observed_mz: peak.mz,
                    observed_intensity: peak.intensity,
                    observed_baseline: peak.baseline,
                    theoretical_mz,
                    error,
                });
                errors.push(peak.mz, theoretical_mz);
                points.push(CalibrationPoint {
                    label: candidate.label().to_string(),
                    theoretical_mz,
                    observed_mz: peak.mz,
                });
            }
        }

        let mut matched = 0;
        for candidate in candidates.iter_mut() {
            let best = candidate
                .matches()
                .iter()
                .map(|found| found.error)
                .fold(None, |best: Option<f64>, error| match best {
                    Some(best) if best.abs() <= error.abs() => Some(best),
                    _ => Some(error),
                });
            if best.is_some() {
                matched += 1;
            }
            candidate.set_best_error(best);
        }

        debug!(
            "Matched {} of {} candidates against {} peaks ({} assignments)",
            matched,
            candidates.len(),
            peaks.len(),
            errors.len()
        );

        Ok(MatchOutcome {
            errors,
            calibration: calibration::sorted(points),
        })
    }
}
