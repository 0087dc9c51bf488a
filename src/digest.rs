use tracing::debug;

use crate::{
    blocks::{self, Enzyme},
    cancellation::CancellationToken,
    candidate::{sort_by_label, Candidate, CandidateKind},
    configuration::DigestParams,
    error::Error,
    sequence::Sequence,
};

/// Residue slice `start..stop` of a protein with its number of missed cleavages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cleavage {
    pub start: usize,
    pub stop: usize,
    pub miscleavages: usize,
}

/// Finds the enzymatic peptide slices of a sequence.
///
/// A site is cleaved when the enzyme expression matches the end of the peptide grown so far.
/// Unless `allow_mods` is set, sites next to a fixed modification are not cleaved on the side
/// the enzyme does not tolerate modifications. Slices spanning up to `miscleavages` sites are
/// appended after the fully cleaved ones.
///
/// # Arguments
/// * `sequence` - Linear protein sequence
/// * `enzyme` - Enzyme
/// * `miscleavages` - Maximum number of missed cleavages
/// * `allow_mods` - Ignore modifications at cleavage sites
///
pub fn cleavages(
    sequence: &Sequence,
    enzyme: &Enzyme,
    miscleavages: usize,
    allow_mods: bool,
) -> Result<Vec<Cleavage>, Error> {
    if sequence.is_cyclic() {
        return Err(Error::UnsupportedForCyclic("Digest"));
    }
    if sequence.is_empty() {
        return Ok(Vec::new());
    }

    let expression = enzyme.cleavage_regex()?;
    let mut slices = Vec::new();
    let mut last = 0;
    let mut peptide = String::with_capacity(sequence.len());

    for (x, residue) in sequence.chain().iter().enumerate() {
        peptide.push(*residue);
        if !expression.is_match(&peptide) {
            continue;
        }
        if !allow_mods {
            let modified_before = x > 0 && sequence.is_modified(Some(x - 1), false);
            if modified_before && !enzyme.mods_before {
                continue;
            }
            if sequence.is_modified(Some(x), false) && !enzyme.mods_after {
                continue;
            }
        }
        slices.push(Cleavage {
            start: last,
            stop: x,
            miscleavages: 0,
        });
        last = x;
    }
    slices.push(Cleavage {
        start: last,
        stop: sequence.len(),
        miscleavages: 0,
    });

    let count = slices.len();
    for x in 0..count {
        for y in 1..=miscleavages {
            if x + y >= count {
                break;
            }
            slices.push(Cleavage {
                start: slices[x].start,
                stop: slices[x + y].stop,
                miscleavages: y,
            });
        }
    }

    Ok(slices)
}

/// Cuts a sequence into enzymatic peptides.
///
/// Peptides not located at a protein terminus get the terminal groups of the enzyme.
///
pub fn digest(
    sequence: &Sequence,
    enzyme: &Enzyme,
    miscleavages: usize,
    allow_mods: bool,
    token: &CancellationToken,
) -> Result<Vec<Sequence>, Error> {
    let mut peptides = Vec::new();
    for cleavage in cleavages(sequence, enzyme, miscleavages, allow_mods)? {
        token.check()?;
        let mut peptide = sequence.slice(cleavage.start, cleavage.stop)?;
        peptide.miscleavages = cleavage.miscleavages;
        if cleavage.start != 0 {
            peptide.n_term_formula = enzyme.n_term_formula.to_string();
        }
        if cleavage.stop != sequence.len() {
            peptide.c_term_formula = enzyme.c_term_formula.to_string();
        }
        peptides.push(peptide);
    }
    Ok(peptides)
}

/// Residue coverage in percent of `length` by 1-based inclusive ranges.
///
/// Overlapping ranges are counted once.
///
/// # Arguments
/// * `ranges` - 1-based `(start, end)` ranges
/// * `length` - Sequence length
///
pub fn coverage(ranges: &[(usize, usize)], length: usize) -> f64 {
    if ranges.is_empty() || length == 0 {
        return 0.0;
    }
    let mut covered = vec![false; length];
    for (start, end) in ranges {
        let start = start.saturating_sub(1).min(length);
        let end = (*end).min(length);
        for residue in covered.iter_mut().take(end).skip(start) {
            *residue = true;
        }
    }
    100.0 * covered.iter().filter(|c| **c).count() as f64 / length as f64
}

/// Generates peptide candidates of a protein digest.
///
/// Each peptide is expanded into its modification variants. Enzyme cleavage sites stay
/// unmodified unless `allow_mods` is set. Only ions inside the mass range are kept.
///
/// # Arguments
/// * `sequence` - Protein sequence
/// * `params` - Digest settings
/// * `token` - Cancellation token
///
pub fn generate(
    sequence: &Sequence,
    params: &DigestParams,
    token: &CancellationToken,
) -> Result<Vec<Candidate>, Error> {
    params.validate()?;
    let enzyme = blocks::enzyme(&params.enzyme)?;

    let peptides = digest(sequence, enzyme, params.miscleavages, params.allow_mods, token)?;

    let site_enzyme = if params.allow_mods { None } else { Some(enzyme) };
    let mut variants = Vec::new();
    for peptide in peptides.iter() {
        variants.extend(peptide.variations(
            params.max_mods,
            params.retain_position,
            site_enzyme,
            token,
        )?);
    }

    let mut candidates = Vec::new();
    for peptide in variants {
        let label = peptide.format_flanked();
        let range = peptide.range();
        for charge in params.polarity.charges(params.max_charge) {
            token.check()?;
            let mz = peptide.mz(charge, params.mass_type)?;
            if mz < params.low_mass || mz > params.high_mass {
                continue;
            }
            let kind = CandidateKind::Peptide {
                sequence: peptide.clone(),
                range,
                miscleavages: peptide.miscleavages,
            };
            candidates.push(Candidate::new(label.clone(), mz, Some(charge), kind));
        }
    }

    sort_by_label(&mut candidates);
    debug!(
        "Digested {} residues with {} into {} peptide ions",
        sequence.len(),
        enzyme.name,
        candidates.len()
    );
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::{ModPosition, ModState};

    fn trypsin() -> &'static Enzyme {
        blocks::enzyme("Trypsin").unwrap()
    }

    #[test]
    fn test_cleavages() {
        // cleaved after K and R, not before P
        let sequence = Sequence::new("AAKGGRPGGRCC").unwrap();
        let slices = cleavages(&sequence, trypsin(), 0, false).unwrap();
        let ranges: Vec<(usize, usize)> = slices.iter().map(|c| (c.start, c.stop)).collect();
        assert_eq!(ranges, vec![(0, 3), (3, 10), (10, 12)]);

        let slices = cleavages(&sequence, trypsin(), 1, false).unwrap();
        assert_eq!(slices.len(), 5);
        assert_eq!(
            slices[3],
            Cleavage {
                start: 0,
                stop: 10,
                miscleavages: 1
            }
        );
        assert_eq!(slices[4].start, 3);
        assert_eq!(slices[4].stop, 12);
    }

    #[test]
    fn test_cleavages_modified_site() {
        let mut sequence = Sequence::new("AAKGGRCC").unwrap();
        sequence
            .modify("Acetyl", ModPosition::Residue(2), ModState::Fixed)
            .unwrap();
        let slices = cleavages(&sequence, trypsin(), 0, false).unwrap();
        assert_eq!(slices.len(), 2);
        let slices = cleavages(&sequence, trypsin(), 0, true).unwrap();
        assert_eq!(slices.len(), 3);

        // variable modifications do not block cleavage
        let mut sequence = Sequence::new("AAKGGRCC").unwrap();
        sequence
            .modify("Acetyl", ModPosition::Residue(2), ModState::Variable)
            .unwrap();
        assert_eq!(cleavages(&sequence, trypsin(), 0, false).unwrap().len(), 3);
    }

    #[test]
    fn test_digest_termini() {
        let sequence = Sequence::new("AAKGGRCC").unwrap();
        let enzyme = blocks::enzyme("CNBr-HSerLac").unwrap();
        let peptides = digest(&sequence, enzyme, 0, false, &CancellationToken::new()).unwrap();
        assert_eq!(peptides.len(), 1);

        let peptides = digest(&sequence, trypsin(), 0, false, &CancellationToken::new()).unwrap();
        assert_eq!(peptides[1].chain(), &['G', 'G', 'R']);
        assert_eq!(peptides[1].item_before, Some('K'));
        assert_eq!(peptides[1].range(), (4, 6));
    }

    #[test]
    fn test_cyclic_refused() {
        let mut sequence = Sequence::new("AAKGGRCC").unwrap();
        sequence.cyclize(true);
        assert_eq!(
            cleavages(&sequence, trypsin(), 0, false),
            Err(Error::UnsupportedForCyclic("Digest"))
        );
    }

    #[test]
    fn test_coverage() {
        assert_eq!(coverage(&[(1, 5), (3, 10)], 20), 50.0);
        assert_eq!(coverage(&[], 20), 0.0);
        assert_eq!(coverage(&[(1, 30)], 20), 100.0);
    }

    #[test]
    fn test_generate_mass_range() {
        let sequence = Sequence::new("MAAKGGGGGGR").unwrap();
        let params = DigestParams {
            miscleavages: 0,
            low_mass: 0.0,
            high_mass: 10000.0,
            max_charge: 2,
            ..Default::default()
        };
        let candidates = generate(&sequence, &params, &CancellationToken::new()).unwrap();
        assert_eq!(candidates.len(), 4);
        assert_eq!(candidates[0].label, ".MAAK.g");

        let params = DigestParams {
            low_mass: 400.0,
            ..params
        };
        let candidates = generate(&sequence, &params, &CancellationToken::new()).unwrap();
        assert!(candidates
            .iter()
            .all(|c| c.theoretical_mz.is_some_and(|mz| mz >= 400.0)));
        assert!(candidates.len() < 4);
    }
}
