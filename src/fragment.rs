use std::collections::HashSet;

use itertools::Itertools;
use tracing::debug;

use crate::{
    blocks::{self, FragmentSeries, Terminus},
    cancellation::CancellationToken,
    candidate::{sort_by_label, Candidate, CandidateKind},
    configuration::FragmentParams,
    error::Error,
    sequence::Sequence,
};

/// Series that can be summarized as ion ladders.
pub const LADDER_SERIES: &[&str] = &["a", "b", "c", "x", "y", "z", "n-ladder", "c-ladder"];

/// Series re-fragmented when scrambling is enabled.
const SCRAMBLED_SERIES: &[&str] = &["a", "b", "M"];

/// Neutral fragment of a peptide.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    /// Fragment residues, terminal groups, losses and gains.
    pub sequence: Sequence,
    pub series: String,
    /// Number of residues counted from the series terminus.
    pub index: Option<usize>,
    /// Carries a loss none of its residues is known to undergo.
    pub filtered: bool,
}

impl Fragment {
    fn new(sequence: Sequence, series: &str, index: Option<usize>) -> Self {
        Self {
            sequence,
            series: series.to_string(),
            index,
            filtered: false,
        }
    }

    /// Loss and gain tag, e.g. `-H2O +CO`. Empty if there are none.
    pub fn variant(&self) -> String {
        variant_tag(&self.sequence)
    }

    /// Series name including losses and gains, e.g. `b -H2O`.
    pub fn series_name(&self) -> String {
        series_label(&self.series, &self.sequence)
    }

    /// Display label, e.g. `b3 +H2O -NH3 [1xOxidation]`.
    pub fn label(&self) -> String {
        let mut label = self.series.clone();
        if let Some(index) = self.index {
            label.push_str(&index.to_string());
        }
        for gain in self.sequence.gains.iter() {
            label.push_str(&format!(" +{}", gain));
        }
        for loss in self.sequence.losses.iter() {
            label.push_str(&format!(" -{}", loss));
        }
        let mods = self.sequence.format_modifications();
        if !mods.is_empty() {
            label.push_str(&format!(" [{}]", mods));
        }
        label
    }
}

fn variant_tag(sequence: &Sequence) -> String {
    sequence
        .losses
        .iter()
        .map(|loss| format!("-{}", loss))
        .chain(sequence.gains.iter().map(|gain| format!("+{}", gain)))
        .join(" ")
}

/// Series name of a fragment sequence including its losses and gains, e.g. `y -NH3 +H2O`.
pub fn series_label(series: &str, sequence: &Sequence) -> String {
    let variant = variant_tag(sequence);
    if variant.is_empty() {
        series.to_string()
    } else {
        format!("{} {}", series, variant)
    }
}

fn allowed_on_cyclic(series: &FragmentSeries) -> bool {
    series.terminus != Terminus::Internal && !matches!(series.name, "n-ladder" | "c-ladder")
}

/// Fragments of a single series from a linear peptide.
///
/// # Arguments
/// * `sequence` - Linear peptide
/// * `series` - Fragment series
/// * `cyclic_parent` - Peptide was opened from a cyclic parent, fixes the terminal groups
/// * `token` - Cancellation token
///
pub fn fragment_series(
    sequence: &Sequence,
    series: &FragmentSeries,
    cyclic_parent: bool,
    token: &CancellationToken,
) -> Result<Vec<Fragment>, Error> {
    if sequence.is_cyclic() {
        return Err(Error::UnsupportedForCyclic("Direct fragmentation"));
    }

    let length = sequence.len();
    let mut fragments = Vec::new();

    match series.terminus {
        Terminus::Molecular => {
            fragments.push(Fragment::new(sequence.slice(0, length)?, series.name, None));
        }
        Terminus::NTerminal => {
            for x in 0..length {
                token.check()?;
                let mut peptide = sequence.slice(0, x + 1)?;
                peptide.c_term_formula = series.c_term_formula.to_string();
                fragments.push(Fragment::new(peptide, series.name, Some(x + 1)));
            }
        }
        Terminus::CTerminal => {
            for x in 0..length {
                token.check()?;
                let mut peptide = sequence.slice(length - (x + 1), length)?;
                peptide.n_term_formula = series.n_term_formula.to_string();
                fragments.push(Fragment::new(peptide, series.name, Some(x + 1)));
            }
        }
        Terminus::Singlet => {
            for x in 0..length {
                token.check()?;
                let mut peptide = sequence.slice(x, x + 1)?;
                peptide.n_term_formula = series.n_term_formula.to_string();
                peptide.c_term_formula = series.c_term_formula.to_string();
                fragments.push(Fragment::new(peptide, series.name, Some(x + 1)));
            }
        }
        Terminus::Internal => {
            for x in 1..length.saturating_sub(1) {
                for y in 2..length - x {
                    token.check()?;
                    let mut peptide = sequence.slice(x, x + y)?;
                    peptide.n_term_formula = series.n_term_formula.to_string();
                    peptide.c_term_formula = series.c_term_formula.to_string();
                    fragments.push(Fragment::new(peptide, series.name, None));
                }
            }
        }
    }

    if cyclic_parent {
        for fragment in fragments.iter_mut() {
            match series.terminus {
                Terminus::Molecular => {
                    fragment.sequence.n_term_formula.clear();
                    fragment.sequence.c_term_formula.clear();
                }
                Terminus::NTerminal => fragment.sequence.n_term_formula = "H".to_string(),
                Terminus::CTerminal => fragment.sequence.c_term_formula = "H-1".to_string(),
                _ => {}
            }
        }
    }

    // drop fragments without chemical meaning at the series ends
    let (drop_first, drop_last) = match series.terminus {
        Terminus::NTerminal | Terminus::Singlet => (series.n_term_filter, series.c_term_filter),
        Terminus::CTerminal => (series.c_term_filter, series.n_term_filter),
        _ => (false, false),
    };
    if drop_first && !fragments.is_empty() {
        fragments.remove(0);
    }
    if drop_last {
        fragments.pop();
    }

    Ok(fragments)
}

/// Fragments of all requested series.
///
/// Cyclic sequences are opened at every bond first. With scrambling, a/b/M fragments longer
/// than two residues are opened again and re-fragmented. Fragments of the same series
/// covering the same parent residues are kept once.
///
/// # Arguments
/// * `sequence` - Peptide
/// * `series` - Series names
/// * `scrambling` - Generate scrambled fragments
/// * `token` - Cancellation token
///
pub fn fragment(
    sequence: &Sequence,
    series: &[String],
    scrambling: bool,
    token: &CancellationToken,
) -> Result<Vec<Fragment>, Error> {
    let series: Vec<&FragmentSeries> = series
        .iter()
        .map(|name| blocks::fragment_series(name))
        .collect::<Result<_, _>>()?;

    if sequence.is_cyclic() && (scrambling || !series.iter().all(|s| allowed_on_cyclic(s))) {
        return Err(Error::UnsupportedForCyclic(
            "Internal, ladder and scrambled fragmentation",
        ));
    }

    let mut fragments = Vec::new();
    if sequence.is_cyclic() {
        for peptide in sequence.linearized()? {
            for serie in series.iter() {
                fragments.extend(fragment_series(&peptide, serie, true, token)?);
            }
        }
    } else {
        for serie in series.iter() {
            fragments.extend(fragment_series(sequence, serie, false, token)?);
        }
    }

    if scrambling {
        let mut scrambled = Vec::new();
        for fragment in fragments.iter() {
            if fragment.sequence.len() <= 2 || !SCRAMBLED_SERIES.contains(&fragment.series.as_str()) {
                continue;
            }
            for peptide in fragment.sequence.linearized()? {
                for serie in series.iter().filter(|s| s.terminus != Terminus::Molecular) {
                    scrambled.extend(fragment_series(&peptide, serie, false, token)?);
                }
            }
        }
        fragments.extend(scrambled);
    }

    let mut seen = HashSet::new();
    fragments.retain(|fragment| {
        let mut indexes = fragment.sequence.indexes();
        if fragment.series == "M" {
            indexes.sort_unstable();
        }
        seen.insert((fragment.series.clone(), indexes))
    });

    Ok(fragments)
}

/// Applies neutral losses to fragments.
///
/// Combinations of up to `limit` losses are tried. With `defined`, the losses of the fragment
/// residues are added as well. Losses the fragment residues do not explain mark it as
/// filtered. Losses cancelling an applied gain and invalid compositions are skipped.
///
/// # Arguments
/// * `fragments` - Source fragments
/// * `losses` - Loss formulas
/// * `defined` - Use residue defined losses
/// * `limit` - Maximum number of simultaneous losses
/// * `token` - Cancellation token
///
pub fn apply_losses(
    fragments: &[Fragment],
    losses: &[String],
    defined: bool,
    limit: usize,
    token: &CancellationToken,
) -> Result<Vec<Fragment>, Error> {
    let mut combinations: Vec<Vec<String>> = Vec::new();
    for size in 1..=losses.len().min(limit) {
        combinations.extend(losses.iter().cloned().combinations(size));
    }

    let mut result = Vec::new();
    for fragment in fragments {
        token.check()?;

        let mut defined_losses: Vec<&str> = Vec::new();
        for residue in fragment.sequence.chain() {
            defined_losses.extend(blocks::monomer(*residue)?.losses.iter());
        }

        let mut to_apply = combinations.clone();
        if defined {
            for residue in fragment.sequence.chain() {
                let monomer = blocks::monomer(*residue)?;
                let snapshot: Vec<Vec<String>> =
                    std::iter::once(Vec::new()).chain(to_apply.iter().cloned()).collect();
                for item in snapshot {
                    for loss in monomer.losses {
                        let single = vec![loss.to_string()];
                        if !to_apply.contains(&single) {
                            to_apply.push(single);
                        }
                        let mut combined = item.clone();
                        combined.push(loss.to_string());
                        combined.sort();
                        if combined.len() <= limit && !to_apply.contains(&combined) {
                            to_apply.push(combined);
                        }
                    }
                }
            }
        }

        'combinations: for combination in to_apply {
            let mut lost = fragment.clone();
            for loss in combination {
                if fragment.sequence.gains.contains(&loss) {
                    continue 'combinations;
                }
                if !defined_losses.contains(&loss.as_str()) {
                    lost.filtered = true;
                }
                lost.sequence.losses.push(loss);
                if !lost.sequence.is_valid() {
                    continue 'combinations;
                }
            }
            result.push(lost);
        }
    }

    Ok(result)
}

/// Series a gain is restricted to and whether it needs a cyclic parent.
fn gain_filter(gain: &str) -> Option<(&'static [&'static str], bool)> {
    match gain {
        "H2O" => Some((&["b"], false)),
        "CO" => Some((&["b", "c"], true)),
        _ => None,
    }
}

/// Applies neutral gains to fragments.
///
/// `H2O` is only gained by b ions, `CO` by b and c ions of cyclic parents. A gain cancelling
/// an applied loss is skipped.
///
pub fn apply_gains(
    fragments: &[Fragment],
    gains: &[String],
    token: &CancellationToken,
) -> Result<Vec<Fragment>, Error> {
    let mut result = Vec::new();
    for fragment in fragments {
        token.check()?;
        let cyclic_parent = fragment.sequence.has_break();

        for gain in gains {
            if fragment.sequence.losses.contains(gain) {
                continue;
            }
            if let Some((series, needs_break)) = gain_filter(gain) {
                if !series.contains(&fragment.series.as_str()) || (needs_break && !cyclic_parent) {
                    continue;
                }
            }
            let mut gained = fragment.clone();
            gained.sequence.gains.push(gain.clone());
            if gained.sequence.is_valid() {
                result.push(gained);
            }
        }
    }
    Ok(result)
}

/// Generates fragment ion candidates of a peptide.
///
/// # Arguments
/// * `sequence` - Peptide
/// * `params` - Fragmentation settings
/// * `token` - Cancellation token
///
pub fn generate(
    sequence: &Sequence,
    params: &FragmentParams,
    token: &CancellationToken,
) -> Result<Vec<Candidate>, Error> {
    params.validate()?;
    if sequence.is_empty() {
        debug!("Empty sequence, nothing to fragment");
        return Ok(Vec::new());
    }

    let mut fragments = fragment(sequence, &params.series, params.scrambling, token)?;
    let lost = apply_losses(
        &fragments,
        &params.losses,
        params.defined_losses,
        params.max_losses,
        token,
    )?;
    fragments.extend(lost);
    let gained = apply_gains(&fragments, &params.gains, token)?;
    fragments.extend(gained);

    let mut variants = Vec::new();
    for fragment in fragments.iter() {
        for variant in fragment
            .sequence
            .variations(params.max_mods, false, None, token)?
        {
            variants.push(Fragment {
                sequence: variant,
                ..fragment.clone()
            });
        }
    }

    let mut candidates = Vec::new();
    for fragment in variants {
        if params.filter_fragments && fragment.filtered {
            continue;
        }
        let label = fragment.label();
        let variant = Some(fragment.variant()).filter(|v| !v.is_empty());
        for charge in params.polarity.charges(params.max_charge) {
            token.check()?;
            let mz = fragment.sequence.mz(charge, params.mass_type)?;
            let kind = CandidateKind::Fragment {
                sequence: fragment.sequence.clone(),
                series: fragment.series.clone(),
                index: fragment.index,
                filtered: fragment.filtered,
            };
            candidates.push(Candidate::new(label.clone(), mz, Some(charge), kind).with_variant(variant.clone()));
        }
    }

    sort_by_label(&mut candidates);
    debug!(
        "Generated {} fragment ions of {}",
        candidates.len(),
        sequence.format()
    );
    Ok(candidates)
}
