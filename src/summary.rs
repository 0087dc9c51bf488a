use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::{
    candidate::{Candidate, CandidateKind},
    digest::coverage,
    fragment::{series_label, LADDER_SERIES},
    peaks::PeakList,
};

/// Tool the candidates were generated by, selects the mode specific summary entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryMode {
    References,
    Compounds,
    Digest { sequence_length: usize },
    Fragment { sequence_length: usize },
}

impl SummaryMode {
    /// Plural noun of the matched items.
    pub fn item_name(&self) -> &'static str {
        match self {
            SummaryMode::References => "reference masses",
            SummaryMode::Compounds => "compounds",
            SummaryMode::Digest { .. } => "peptides",
            SummaryMode::Fragment { .. } => "fragments",
        }
    }
}

/// Statistics of a match run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSummary {
    pub mode: SummaryMode,
    pub peaks_searched: usize,
    pub items_searched: usize,
    pub items_matched: usize,
    /// Percentage of the total intensity carried by matched peaks, rounded.
    pub intensity_matched: f64,
    /// Percentage of residues covered by matched peptides.
    pub coverage: Option<f64>,
    /// Matched backbone positions per ion series, by series name.
    pub ion_series: BTreeMap<String, Vec<usize>>,
}

impl MatchSummary {
    /// Summarizes matched candidates.
    ///
    /// # Arguments
    /// * `peaks` - Peak list the candidates were matched against
    /// * `candidates` - Matched candidates
    /// * `mode` - Generating tool
    ///
    pub fn new(peaks: &PeakList, candidates: &[Candidate], mode: SummaryMode) -> Self {
        let items_matched = candidates.iter().filter(|c| c.is_matched()).count();

        let coverage = match mode {
            SummaryMode::Digest { sequence_length } => {
                let ranges: Vec<(usize, usize)> = candidates
                    .iter()
                    .filter(|c| c.is_matched())
                    .filter_map(|c| match &c.kind {
                        CandidateKind::Peptide { range, .. } => Some(*range),
                        _ => None,
                    })
                    .collect();
                Some(coverage(&ranges, sequence_length))
            }
            _ => None,
        };

        let ion_series = match mode {
            SummaryMode::Fragment { .. } => ion_series(candidates),
            _ => BTreeMap::new(),
        };

        Self {
            mode,
            peaks_searched: peaks.len(),
            items_searched: candidates.len(),
            items_matched,
            intensity_matched: intensity_matched(peaks, candidates),
            coverage,
            ion_series,
        }
    }

    /// Summary as ordered `(label, value)` pairs for display.
    pub fn entries(&self) -> Vec<(String, String)> {
        let item = self.mode.item_name();
        let mut entries = vec![
            (
                "Number of peaks searched".to_string(),
                self.peaks_searched.to_string(),
            ),
            (
                format!("Number of {} searched", item),
                self.items_searched.to_string(),
            ),
            (
                format!("Number of {} matched", item),
                self.items_matched.to_string(),
            ),
            (
                "Intensity matched".to_string(),
                format!("{:.0} %", self.intensity_matched),
            ),
        ];

        match self.mode {
            SummaryMode::Digest { sequence_length } => {
                entries.push(("Sequence length".to_string(), sequence_length.to_string()));
                entries.push((
                    "Sequence coverage".to_string(),
                    format!("{:.0} %", self.coverage.unwrap_or(0.0)),
                ));
            }
            SummaryMode::Fragment { sequence_length } => {
                entries.push(("Sequence length".to_string(), sequence_length.to_string()));
                for (series, indexes) in self.ion_series.iter() {
                    let value = indexes
                        .iter()
                        .map(|index| index.to_string())
                        .collect::<Vec<String>>()
                        .join(", ");
                    entries.push((format!("Ion serie matches for \"{}\"", series), value));
                }
            }
            _ => {}
        }

        entries
    }
}

/// Matched share of the total intensity in percent, each peak counted once.
pub fn intensity_matched(peaks: &PeakList, candidates: &[Candidate]) -> f64 {
    let total = peaks.total_intensity();
    if peaks.is_empty() || total == 0.0 {
        return 0.0;
    }
    let matched_peaks: HashSet<usize> = candidates
        .iter()
        .flat_map(|candidate| candidate.matches.iter().map(|found| found.peak_index))
        .collect();
    let matched: f64 = matched_peaks
        .iter()
        .filter_map(|index| peaks.get(*index))
        .map(|peak| peak.intensity)
        .sum();
    (100.0 * matched / total).round()
}

/// Matched positions of ladder series fragments, excluding fragments of opened rings.
///
/// Every series seen gets an entry, positions are sorted and unique.
///
fn ion_series(candidates: &[Candidate]) -> BTreeMap<String, Vec<usize>> {
    let mut series: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for candidate in candidates {
        let CandidateKind::Fragment {
            sequence,
            series: name,
            index,
            ..
        } = &candidate.kind
        else {
            continue;
        };
        if !LADDER_SERIES.contains(&name.as_str()) || sequence.has_break() {
            continue;
        }
        let positions = series.entry(series_label(name, sequence)).or_default();
        if let (true, Some(index)) = (candidate.is_matched(), index) {
            positions.push(*index);
        }
    }
    for positions in series.values_mut() {
        positions.sort_unstable();
        positions.dedup();
    }
    series
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{candidate::Match, peaks::Peak, sequence::Sequence};

    fn matched(label: &str, kind: CandidateKind, peak_indexes: &[usize]) -> Candidate {
        let mut candidate = Candidate::new(label.to_string(), 100.0, Some(1), kind);
        for peak_index in peak_indexes {
            candidate.matches.push(Match {
                peak_index: *peak_index,
                observed_mz: 100.0,
                observed_intensity: 1.0,
                observed_baseline: 0.0,
                theoretical_mz: 100.0,
                error: 0.0,
            });
        }
        candidate
    }

    #[test]
    fn test_intensity_counted_once() {
        let peaks = PeakList::new(vec![
            Peak::new(100.0, 30.0),
            Peak::new(200.0, 50.0),
            Peak::new(300.0, 20.0),
        ]);
        let candidates = vec![
            matched("a", CandidateKind::Reference, &[0]),
            matched("b", CandidateKind::Reference, &[0, 2]),
            matched("c", CandidateKind::Reference, &[]),
        ];
        assert_eq!(intensity_matched(&peaks, &candidates), 50.0);

        let summary = MatchSummary::new(&peaks, &candidates, SummaryMode::References);
        assert_eq!(summary.items_matched, 2);
        let entries = summary.entries();
        assert_eq!(entries[1], ("Number of reference masses searched".to_string(), "3".to_string()));
        assert_eq!(entries[3], ("Intensity matched".to_string(), "50 %".to_string()));
    }

    fn fragment(index: usize) -> CandidateKind {
        CandidateKind::Fragment {
            sequence: Sequence::new("PEP").unwrap(),
            series: "b".to_string(),
            index: Some(index),
            filtered: false,
        }
    }

    #[test]
    fn test_ion_series_position_listed_once() {
        let peaks = PeakList::new(vec![Peak::new(100.0, 1.0), Peak::new(200.0, 1.0)]);
        let mut doubly_charged = matched("b2", fragment(2), &[1]);
        doubly_charged.charge = Some(2);
        let candidates = vec![
            matched("b2", fragment(2), &[0]),
            doubly_charged,
            matched("b3", fragment(3), &[]),
        ];
        let summary = MatchSummary::new(
            &peaks,
            &candidates,
            SummaryMode::Fragment { sequence_length: 3 },
        );
        assert_eq!(summary.ion_series.get("b"), Some(&vec![2]));
        assert_eq!(summary.items_matched, 2);
    }

    #[test]
    fn test_empty_peak_list() {
        let candidates = vec![matched("a", CandidateKind::Reference, &[0])];
        assert_eq!(intensity_matched(&PeakList::default(), &candidates), 0.0);
    }
}
