use serde::{Deserialize, Serialize};

use crate::sequence::Sequence;

/// Observed peak assigned to a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Match {
    /// Index of the peak in the peak list the match run was given.
    pub peak_index: usize,
    pub observed_mz: f64,
    pub observed_intensity: f64,
    pub observed_baseline: f64,
    pub theoretical_mz: f64,
    pub error: f64,
}

/// Structure a candidate was generated from.
#[derive(Debug, Clone, PartialEq)]
pub enum CandidateKind {
    /// Reference mass of the mass filter.
    Reference,
    Compound {
        /// Compound name.
        name: String,
        /// Ion formula including the adduct.
        formula: String,
    },
    Peptide {
        sequence: Sequence,
        /// 1-based residue range in the digested protein.
        range: (usize, usize),
        miscleavages: usize,
    },
    Fragment {
        sequence: Sequence,
        series: String,
        /// Backbone position, `None` for internal and precursor fragments.
        index: Option<usize>,
        /// Fragment carries a neutral loss its residues do not explain.
        filtered: bool,
    },
}

/// Theoretical ion with the matches of the most recent match run.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub label: String,
    /// Theoretical m/z, candidates without one never match.
    pub theoretical_mz: Option<f64>,
    /// Signed charge, `None` matches peaks of any charge.
    pub charge: Option<i32>,
    /// Adduct, radical, loss or gain tag.
    pub variant: Option<String>,
    pub kind: CandidateKind,
    pub best_error: Option<f64>,
    pub matches: Vec<Match>,
}

impl Candidate {
    pub fn new(label: String, theoretical_mz: f64, charge: Option<i32>, kind: CandidateKind) -> Self {
        Self {
            label,
            theoretical_mz: Some(theoretical_mz),
            charge,
            variant: None,
            kind,
            best_error: None,
            matches: Vec::new(),
        }
    }

    pub fn with_variant(mut self, variant: Option<String>) -> Self {
        self.variant = variant;
        self
    }

    pub fn is_matched(&self) -> bool {
        !self.matches.is_empty()
    }

    /// Sequence of peptide and fragment candidates.
    pub fn sequence(&self) -> Option<&Sequence> {
        match &self.kind {
            CandidateKind::Peptide { sequence, .. } | CandidateKind::Fragment { sequence, .. } => {
                Some(sequence)
            }
            _ => None,
        }
    }
}

/// Anything the tolerance matcher can assign peaks to.
pub trait Matchable {
    fn label(&self) -> &str;

    fn theoretical_mz(&self) -> Option<f64>;

    fn charge(&self) -> Option<i32>;

    fn matches(&self) -> &[Match];

    fn best_error(&self) -> Option<f64>;

    fn push_match(&mut self, found: Match);

    fn set_best_error(&mut self, error: Option<f64>);

    /// Forgets matches and best error of a previous run.
    fn clear_matches(&mut self);
}

impl Matchable for Candidate {
    fn label(&self) -> &str {
        &self.label
    }

    fn theoretical_mz(&self) -> Option<f64> {
        self.theoretical_mz
    }

    fn charge(&self) -> Option<i32> {
        self.charge
    }

    fn matches(&self) -> &[Match] {
        &self.matches
    }

    fn best_error(&self) -> Option<f64> {
        self.best_error
    }

    fn push_match(&mut self, found: Match) {
        self.matches.push(found);
    }

    fn set_best_error(&mut self, error: Option<f64>) {
        self.best_error = error;
    }

    fn clear_matches(&mut self) {
        self.matches.clear();
        self.best_error = None;
    }
}

/// Stable sort by label, the order every generator returns.
pub(crate) fn sort_by_label(candidates: &mut [Candidate]) {
    candidates.sort_by(|a, b| a.label.cmp(&b.label));
}
