pub mod blocks;
pub mod calibration;
pub mod cancellation;
pub mod candidate;
/// Formulas, compositions and masses
pub mod chemistry;
pub mod compounds;
pub mod configuration;
pub mod digest;
pub mod error;
pub mod fragment;
/// Peak to candidate assignment
pub mod matching;
pub mod occupancy;
pub mod peaks;
pub mod references;
pub mod search;
pub mod sequence;
pub mod summary;
pub mod tolerance;
// Various utilities
pub mod utils;
/// Background runs of generate and match jobs
pub mod worker;

use tracing::debug;

use crate::{
    calibration::CalibrationPoint,
    cancellation::CancellationToken,
    candidate::Candidate,
    configuration::{CompoundParams, DigestParams, FragmentParams},
    error::Error,
    matching::ToleranceMatcher,
    peaks::PeakList,
    references::Reference,
    sequence::Sequence,
    summary::{MatchSummary, SummaryMode},
    tolerance::{ErrorSeries, ToleranceSpec},
};

/// Candidate source of a run.
#[derive(Debug, Clone, PartialEq)]
pub enum GeneratorKind {
    Compounds(CompoundParams),
    Digest {
        sequence: Sequence,
        params: DigestParams,
    },
    Fragment {
        sequence: Sequence,
        params: FragmentParams,
    },
    References(Vec<Reference>),
}

impl GeneratorKind {
    /// Summary flavour of the candidates this source produces.
    pub fn summary_mode(&self) -> SummaryMode {
        match self {
            GeneratorKind::Compounds(_) => SummaryMode::Compounds,
            GeneratorKind::Digest { sequence, .. } => SummaryMode::Digest {
                sequence_length: sequence.len(),
            },
            GeneratorKind::Fragment { sequence, .. } => SummaryMode::Fragment {
                sequence_length: sequence.len(),
            },
            GeneratorKind::References(_) => SummaryMode::References,
        }
    }
}

/// Generates the candidates of a source, sorted by label.
///
/// # Arguments
/// * `kind` - Candidate source and its settings
/// * `token` - Cancellation token
///
/// # Errors
/// Invalid settings fail before any candidate is built, [`Error::Cancelled`] if the run was
/// cancelled.
///
pub fn generate(kind: &GeneratorKind, token: &CancellationToken) -> Result<Vec<Candidate>, Error> {
    let result = match kind {
        GeneratorKind::Compounds(params) => compounds::generate(params, token),
        GeneratorKind::Digest { sequence, params } => digest::generate(sequence, params, token),
        GeneratorKind::Fragment { sequence, params } => fragment::generate(sequence, params, token),
        GeneratorKind::References(references) => references::generate(references),
    };
    if let Err(Error::Cancelled) = result {
        debug!("Candidate generation cancelled");
    }
    result
}

/// Matched candidates with the derived series of a match run.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub candidates: Vec<Candidate>,
    pub errors: ErrorSeries,
    pub calibration: Vec<CalibrationPoint>,
    pub summary: MatchSummary,
}

/// Matches candidates against a peak list and summarizes the result.
///
/// # Arguments
/// * `peaks` - Peak list
/// * `candidates` - Generated candidates, previous matches are discarded
/// * `tolerance` - Match tolerance
/// * `mode` - Summary flavour, see [`GeneratorKind::summary_mode`]
/// * `token` - Cancellation token
///
pub fn match_candidates(
    peaks: &PeakList,
    mut candidates: Vec<Candidate>,
    tolerance: ToleranceSpec,
    mode: SummaryMode,
    token: &CancellationToken,
) -> Result<MatchResult, Error> {
    let matcher = ToleranceMatcher::new(tolerance)?;
    let outcome = matcher.run(peaks, &mut candidates, token)?;
    let summary = MatchSummary::new(peaks, &candidates, mode);
    Ok(MatchResult {
        candidates,
        errors: outcome.errors,
        calibration: outcome.calibration,
        summary,
    })
}

/// Generates candidates and matches them in one go, reporting progress between the steps.
///
/// # Arguments
/// * `kind` - Candidate source and its settings
/// * `peaks` - Peak list
/// * `tolerance` - Match tolerance
/// * `token` - Cancellation token
/// * `progress` - Progress reporter of a worker job
///
pub fn annotate(
    kind: &GeneratorKind,
    peaks: &PeakList,
    tolerance: ToleranceSpec,
    token: &CancellationToken,
    progress: &worker::Progress,
) -> Result<MatchResult, Error> {
    progress.report(0.0);
    let candidates = generate(kind, token)?;
    progress.report(0.5);
    let result = match_candidates(peaks, candidates, tolerance, kind.summary_mode(), token)?;
    progress.report(1.0);
    Ok(result)
}
