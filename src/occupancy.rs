use crate::sequence::{ModPosition, ModState, Modification, Sequence};

/// Checks whether a modification may be added to a sequence.
///
/// Terminal positions carry at most one fixed modification. Variable terminal
/// modifications may coexist because they are alternatives. Every other modification is
/// counted as demand on its residue index or residue type: a fixed wildcard takes one
/// slot per occurrence of the residue, anything else takes one slot.
///
/// # Arguments
/// * `sequence` - Sequence the modification would be applied to
/// * `modification` - Candidate modification
/// * `max_mods` - Maximum number of modifications per residue
///
pub fn is_legal(sequence: &Sequence, modification: &Modification, max_mods: usize) -> bool {
    if sequence.modifications().contains(modification) {
        return false;
    }

    if modification.is_terminal() {
        return !sequence.modifications().iter().any(|applied| {
            applied.position == modification.position
                && (applied.state == ModState::Fixed || modification.state == ModState::Fixed)
        });
    }

    let mut positions = Vec::new();
    for applied in sequence
        .modifications()
        .iter()
        .chain(std::iter::once(modification))
    {
        positions.extend(demand(sequence, applied));
    }

    check_occupancy(&positions, sequence.chain(), max_mods)
}

fn demand(sequence: &Sequence, modification: &Modification) -> Vec<ModPosition> {
    match (modification.position, modification.state) {
        (ModPosition::NTerm | ModPosition::CTerm | ModPosition::Unlocalized, _) => Vec::new(),
        (ModPosition::Wildcard(residue), ModState::Fixed) => {
            vec![modification.position; sequence.count(residue).max(1)]
        }
        (position, _) => vec![position],
    }
}

/// Validates slot demands against residue capacity.
///
/// A residue index may be claimed `max_mods` times. A residue type may be claimed
/// `max_mods` times per occurrence that is not already pinned by a positional claim.
/// Terminal claims are limited to `max_mods` as well.
///
pub(crate) fn check_occupancy(positions: &[ModPosition], chain: &[char], max_mods: usize) -> bool {
    for position in positions {
        let count = positions.iter().filter(|p| *p == position).count();
        match position {
            ModPosition::Residue(_) | ModPosition::NTerm | ModPosition::CTerm => {
                if count > max_mods {
                    return false;
                }
            }
            ModPosition::Wildcard(residue) => {
                let occurrences = chain.iter().filter(|c| *c == residue).count();
                let pinned = positions
                    .iter()
                    .filter(|p| matches!(p, ModPosition::Residue(i) if chain.get(*i) == Some(residue)))
                    .count();
                let available = occurrences.saturating_sub(pinned);
                if count > available * max_mods {
                    return false;
                }
            }
            ModPosition::Unlocalized => {}
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sequence(chain: &str, mods: &[(&str, ModPosition, ModState)]) -> Sequence {
        let mut sequence = Sequence::new(chain).unwrap();
        for (name, position, state) in mods {
            assert!(sequence.modify(name, *position, *state).unwrap());
        }
        sequence
    }

    #[test]
    fn test_duplicate_rejected() {
        let sequence = sequence(
            "PEPTIDE",
            &[("Phospho", ModPosition::Residue(3), ModState::Variable)],
        );
        let same = Modification::new("Phospho", ModPosition::Residue(3), ModState::Variable);
        assert!(!is_legal(&sequence, &same, 2));
    }

    #[test]
    fn test_terminal() {
        let fixed = sequence("PEPTIDE", &[("Acetyl", ModPosition::NTerm, ModState::Fixed)]);
        let variable = Modification::new("Formyl", ModPosition::NTerm, ModState::Variable);
        assert!(!is_legal(&fixed, &variable, 1));
        let c_term = Modification::new("Amide", ModPosition::CTerm, ModState::Fixed);
        assert!(is_legal(&fixed, &c_term, 1));

        let open = sequence("PEPTIDE", &[("Acetyl", ModPosition::NTerm, ModState::Variable)]);
        assert!(is_legal(&open, &variable, 1));
        let fixed_formyl = Modification::new("Formyl", ModPosition::NTerm, ModState::Fixed);
        assert!(!is_legal(&open, &fixed_formyl, 1));
    }

    #[test]
    fn test_residue_index() {
        let sequence = sequence(
            "PEPTIDE",
            &[("Phospho", ModPosition::Residue(3), ModState::Variable)],
        );
        let other = Modification::new("Sulfo", ModPosition::Residue(3), ModState::Variable);
        assert!(!is_legal(&sequence, &other, 1));
        assert!(is_legal(&sequence, &other, 2));
        let elsewhere = Modification::new("Sulfo", ModPosition::Residue(0), ModState::Variable);
        assert!(is_legal(&sequence, &elsewhere, 1));
    }

    #[test]
    fn test_fixed_wildcard_fills_residues() {
        let sequence = sequence(
            "MAMK",
            &[("Oxidation", ModPosition::Wildcard('M'), ModState::Fixed)],
        );
        let positional = Modification::new("Sulfo", ModPosition::Residue(0), ModState::Variable);
        assert!(!is_legal(&sequence, &positional, 1));

        let lysine = Modification::new("Acetyl", ModPosition::Residue(3), ModState::Variable);
        assert!(is_legal(&sequence, &lysine, 1));

        let wildcard = Modification::new("Sulfo", ModPosition::Wildcard('M'), ModState::Variable);
        assert!(!is_legal(&sequence, &wildcard, 1));
        assert!(is_legal(&sequence, &wildcard, 2));
    }

    #[test]
    fn test_positional_claims_exhaust_wildcard_capacity() {
        let pinned = sequence(
            "MAMK",
            &[
                ("Oxidation", ModPosition::Residue(0), ModState::Variable),
                ("Oxidation", ModPosition::Residue(2), ModState::Variable),
            ],
        );
        let wildcard = Modification::new("Sulfo", ModPosition::Wildcard('M'), ModState::Variable);
        assert!(!is_legal(&pinned, &wildcard, 1));
        assert!(!is_legal(&pinned, &wildcard, 2));

        let one_pinned = sequence(
            "MAMK",
            &[("Oxidation", ModPosition::Residue(0), ModState::Variable)],
        );
        assert!(is_legal(&one_pinned, &wildcard, 1));

        let positions = [
            ModPosition::Residue(0),
            ModPosition::Residue(2),
            ModPosition::Wildcard('M'),
        ];
        assert!(!check_occupancy(&positions, &['M', 'A', 'M', 'K'], 1));
    }

    #[test]
    fn test_check_occupancy() {
        let chain = ['M', 'A', 'M'];
        let positions = [ModPosition::Wildcard('M'), ModPosition::Wildcard('M')];
        assert!(check_occupancy(&positions, &chain, 1));

        let positions = [
            ModPosition::Wildcard('M'),
            ModPosition::Wildcard('M'),
            ModPosition::Residue(0),
        ];
        assert!(!check_occupancy(&positions, &chain, 1));
        assert!(check_occupancy(&positions, &chain, 2));
    }
}
