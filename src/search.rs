use tracing::debug;

use crate::{
    blocks, cancellation::CancellationToken, configuration::SearchParams, error::Error,
    sequence::Sequence, tolerance::mass_error,
};

/// Peptide of a sequence whose m/z falls within the search tolerance.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub label: String,
    pub sequence: Sequence,
    /// 1-based residue range in the searched sequence.
    pub range: (usize, usize),
    pub mz: f64,
    pub charge: i32,
    /// Signed error against the target in the tolerance units.
    pub error: f64,
}

/// Searches all sub-sequences of a sequence for a target m/z.
///
/// Every window `i..j` is expanded into its modification variants. Windows are grown from
/// each start until all variants exceed the upper bound. For semi-specific searches at least
/// one end of a window inside the sequence has to be an enzyme cleavage site.
///
/// # Arguments
/// * `sequence` - Linear sequence
/// * `params` - Search settings
/// * `token` - Cancellation token
///
pub fn search(
    sequence: &Sequence,
    params: &SearchParams,
    token: &CancellationToken,
) -> Result<Vec<SearchHit>, Error> {
    params.validate()?;
    if sequence.is_cyclic() {
        return Err(Error::UnsupportedForCyclic("Mass search"));
    }

    let (expression, n_term, c_term, semi_specific) = match &params.enzyme {
        Some(name) => {
            let enzyme = blocks::enzyme(name)?;
            (
                Some(enzyme.cleavage_regex()?),
                enzyme.n_term_formula,
                enzyme.c_term_formula,
                params.semi_specific,
            )
        }
        None => (None, "H", "OH", false),
    };
    let (low, high) = params.tolerance.bounds(params.mass);

    let mut hits = Vec::new();
    let length = sequence.len();
    for i in 0..length {
        for j in i + 1..=length {
            token.check()?;

            let mut peptide = sequence.slice(i, j)?;
            if i != 0 {
                peptide.n_term_formula = n_term.to_string();
            }
            if j != length {
                peptide.c_term_formula = c_term.to_string();
            }

            if let (true, Some(expression), Some(before), Some(after)) = (
                semi_specific,
                expression.as_ref(),
                peptide.item_before,
                peptide.item_after,
            ) {
                let chain = peptide.chain();
                let n_site: String = [before, chain[0]].iter().collect();
                let c_site: String = [chain[chain.len() - 1], after].iter().collect();
                if !expression.is_match(&n_site) && !expression.is_match(&c_site) {
                    continue;
                }
            }

            let mut variants = Vec::new();
            for variant in peptide.variations(params.max_mods, params.retain_position, None, token)? {
                let mz = variant.mz(params.charge, params.mass_type)?;
                variants.push((mz, variant));
            }
            if variants.is_empty() {
                continue;
            }

            let max = variants.iter().map(|(mz, _)| *mz).fold(f64::MIN, f64::max);
            let min = variants.iter().map(|(mz, _)| *mz).fold(f64::MAX, f64::min);
            if max < low {
                continue;
            }
            if min > high {
                break;
            }

            for (mz, variant) in variants {
                if low <= mz && mz <= high {
                    hits.push(SearchHit {
                        label: variant.format_flanked(),
                        range: variant.range(),
                        mz,
                        charge: params.charge,
                        error: mass_error(mz, params.mass, params.tolerance.units),
                        sequence: variant,
                    });
                }
            }
        }
    }

    hits.sort_by(|a, b| a.label.cmp(&b.label));
    debug!("Mass search for {} found {} peptides", params.mass, hits.len());
    Ok(hits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{chemistry::MassType, tolerance::ToleranceSpec};

    #[test]
    fn test_search() {
        let token = CancellationToken::new();
        let sequence = Sequence::new("AAKGGGGRCC").unwrap();
        let target = sequence
            .slice(3, 8)
            .unwrap()
            .mz(1, MassType::Monoisotopic)
            .unwrap();

        // AAKGG is 0.025 Da heavier than GGGGR
        let params = SearchParams {
            mass: target - 0.05,
            tolerance: ToleranceSpec::da(0.06),
            ..Default::default()
        };
        let hits = search(&sequence, &params, &token).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].label, "k.GGGGR.c");
        assert_eq!(hits[0].range, (4, 8));
        assert!((hits[0].error - 0.05).abs() < 1e-9);
    }

    #[test]
    fn test_semi_specific() {
        let token = CancellationToken::new();
        let sequence = Sequence::new("MAKWCAGRWW").unwrap();
        // neither WC nor GR is a trypsin site
        let target = sequence
            .slice(4, 7)
            .unwrap()
            .mz(1, MassType::Monoisotopic)
            .unwrap();
        let params = SearchParams {
            mass: target,
            tolerance: ToleranceSpec::da(0.01),
            ..Default::default()
        };
        assert!(search(&sequence, &params, &token).unwrap().is_empty());

        let params = SearchParams {
            enzyme: None,
            ..params
        };
        let hits = search(&sequence, &params, &token).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].sequence.chain(), &['C', 'A', 'G']);
    }

    #[test]
    fn test_invalid_parameters() {
        let sequence = Sequence::new("AAK").unwrap();
        let params = SearchParams::default();
        assert!(matches!(
            search(&sequence, &params, &CancellationToken::new()),
            Err(Error::InvalidParameter(_))
        ));
    }
}
