use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    candidate::{sort_by_label, Candidate, CandidateKind},
    error::Error,
};

fn enabled() -> bool {
    true
}

/// Known m/z used to filter or calibrate a spectrum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    pub label: String,
    pub mz: f64,
    /// Disabled references are not matched.
    #[serde(default = "enabled")]
    pub enabled: bool,
}

impl Reference {
    pub fn new(label: &str, mz: f64) -> Self {
        Self {
            label: label.to_string(),
            mz,
            enabled: true,
        }
    }
}

/// Turns enabled reference masses into candidates. References carry no charge and match
/// peaks of any charge.
pub fn generate(references: &[Reference]) -> Result<Vec<Candidate>, Error> {
    let mut candidates = Vec::new();
    for reference in references.iter().filter(|reference| reference.enabled) {
        if !reference.mz.is_finite() || reference.mz <= 0.0 {
            return Err(Error::InvalidParameter(format!(
                "reference {} has invalid m/z {}",
                reference.label, reference.mz
            )));
        }
        candidates.push(Candidate::new(
            reference.label.clone(),
            reference.mz,
            None,
            CandidateKind::Reference,
        ));
    }
    sort_by_label(&mut candidates);
    debug!("Prepared {} reference masses", candidates.len());
    Ok(candidates)
}
