use std::fmt;

use itertools::repeat_n;
use rustyms::MolecularFormula;
use serde::{Deserialize, Serialize};

use crate::{
    blocks::{self, Enzyme},
    cancellation::CancellationToken,
    chemistry::{self, formula_mass, formula_mz, parse_formula, Agent, MassType},
    error::Error,
    occupancy::check_occupancy,
};

/// Where a modification sits on the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ModPosition {
    /// Zero based residue index.
    Residue(usize),
    NTerm,
    CTerm,
    /// Every residue of the given type.
    Wildcard(char),
    /// Counted once, without a residue assignment. Produced by [`Sequence::variations`]
    /// when positions are not retained.
    Unlocalized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ModState {
    Fixed,
    Variable,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Modification {
    pub name: String,
    pub position: ModPosition,
    pub state: ModState,
}

impl Modification {
    pub fn new(name: &str, position: ModPosition, state: ModState) -> Self {
        Self {
            name: name.to_string(),
            position,
            state,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.position, ModPosition::NTerm | ModPosition::CTerm)
    }
}

/// Derivation step of a sequence, used to map residues back to the parent sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryEvent {
    Init { start: usize, stop: usize },
    Slice { start: usize, stop: usize },
    /// Linearization of a cyclic parent between residue `before` and `after`.
    Break { before: usize, after: usize },
}

/// Monomer chain with modifications, terminal groups and derivation history.
#[derive(Debug, Clone, PartialEq)]
pub struct Sequence {
    chain: Vec<char>,
    cyclic: bool,
    pub n_term_formula: String,
    pub c_term_formula: String,
    modifications: Vec<Modification>,
    history: Vec<HistoryEvent>,
    pub item_before: Option<char>,
    pub item_after: Option<char>,
    pub miscleavages: usize,
    /// Neutral losses applied to a fragment.
    pub losses: Vec<String>,
    /// Neutral gains applied to a fragment.
    pub gains: Vec<String>,
}

impl Sequence {
    /// Creates a linear sequence from one letter amino acid codes.
    ///
    /// Whitespace and the characters `-`, `*`, `.` are ignored, letters are upper-cased.
    ///
    /// # Arguments
    /// * `chain` - Amino acid sequence
    ///
    pub fn new(chain: &str) -> Result<Self, Error> {
        let chain: Vec<char> = chain
            .chars()
            .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '*' | '.'))
            .map(|c| c.to_ascii_uppercase())
            .collect();
        for monomer in chain.iter() {
            blocks::monomer(*monomer)?;
        }
        Ok(Self::from_chain(chain))
    }

    fn from_chain(chain: Vec<char>) -> Self {
        let length = chain.len();
        Self {
            chain,
            cyclic: false,
            n_term_formula: "H".to_string(),
            c_term_formula: "OH".to_string(),
            modifications: Vec::new(),
            history: vec![HistoryEvent::Init {
                start: 0,
                stop: length,
            }],
            item_before: None,
            item_after: None,
            miscleavages: 0,
            losses: Vec::new(),
            gains: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    pub fn chain(&self) -> &[char] {
        &self.chain
    }

    pub fn is_cyclic(&self) -> bool {
        self.cyclic
    }

    pub fn modifications(&self) -> &[Modification] {
        &self.modifications
    }

    pub fn history(&self) -> &[HistoryEvent] {
        &self.history
    }

    /// Number of residues of the given type.
    pub fn count(&self, residue: char) -> usize {
        self.chain.iter().filter(|c| **c == residue).count()
    }

    /// Makes the sequence cyclic (or linear again). Cyclic sequences have no terminal groups
    /// and lose their terminal modifications.
    pub fn cyclize(&mut self, cyclic: bool) {
        self.cyclic = cyclic;
        if cyclic {
            self.n_term_formula.clear();
            self.c_term_formula.clear();
            self.modifications.retain(|m| !m.is_terminal());
        } else {
            self.n_term_formula = "H".to_string();
            self.c_term_formula = "OH".to_string();
        }
    }

    /// Applies a modification.
    ///
    /// Returns `Ok(false)` if the position does not exist on this sequence.
    ///
    /// # Arguments
    /// * `name` - Modification name, must exist in [`blocks::MODIFICATIONS`]
    /// * `position` - Modification position
    /// * `state` - Fixed or variable
    ///
    pub fn modify(&mut self, name: &str, position: ModPosition, state: ModState) -> Result<bool, Error> {
        blocks::modification(name)?;
        let exists = match position {
            ModPosition::NTerm | ModPosition::CTerm => !self.cyclic,
            ModPosition::Residue(index) => index < self.len(),
            ModPosition::Wildcard(residue) => self.chain.contains(&residue),
            ModPosition::Unlocalized => true,
        };
        if !exists {
            return Ok(false);
        }
        self.modifications
            .push(Modification::new(name, position, state));
        Ok(true)
    }

    /// Removes every copy of the given modification, or all modifications if `None`.
    pub fn unmodify(&mut self, modification: Option<&Modification>) {
        match modification {
            Some(modification) => self.modifications.retain(|m| m != modification),
            None => self.modifications.clear(),
        }
    }

    /// Checks whether a residue (or the whole sequence if `position` is `None`) is modified.
    ///
    /// # Arguments
    /// * `position` - Residue index
    /// * `strict` - Take variable modifications into account
    ///
    pub fn is_modified(&self, position: Option<usize>, strict: bool) -> bool {
        let considered = self
            .modifications
            .iter()
            .filter(|m| strict || m.state == ModState::Fixed);
        match position {
            None => considered.count() > 0,
            Some(index) => {
                let residue = self.chain.get(index).copied();
                considered.into_iter().any(|m| match m.position {
                    ModPosition::Residue(i) => i == index,
                    ModPosition::Wildcard(c) => Some(c) == residue,
                    ModPosition::NTerm => index == 0,
                    ModPosition::CTerm => index + 1 == self.len(),
                    ModPosition::Unlocalized => false,
                })
            }
        }
    }

    /// Sub-sequence `start..stop`. A cyclic sequence can be sliced across its origin
    /// (`stop <= start`), which gives the linear peptide starting at `start`.
    ///
    /// # Arguments
    /// * `start` - First residue index
    /// * `stop` - Index after the last residue
    ///
    pub fn slice(&self, start: usize, stop: usize) -> Result<Sequence, Error> {
        self.slice_as(start, stop, self.cyclic)
    }

    fn slice_as(&self, start: usize, stop: usize, cyclic: bool) -> Result<Sequence, Error> {
        let length = self.len();
        let stop = stop.min(length);
        if (stop <= start && !cyclic) || start > length || length == 0 {
            return Err(Error::InvalidSlice(start, stop));
        }
        let wraps = stop <= start;

        let chain = if wraps {
            let mut chain = self.chain[start..].to_vec();
            chain.extend_from_slice(&self.chain[..stop]);
            chain
        } else {
            self.chain[start..stop].to_vec()
        };

        let mut peptide = Sequence::from_chain(chain);
        peptide.history = self.history.clone();

        for modification in self.modifications.iter() {
            let position = match modification.position {
                ModPosition::NTerm if start == 0 => Some(ModPosition::NTerm),
                ModPosition::CTerm if stop == length => Some(ModPosition::CTerm),
                ModPosition::Wildcard(c) if peptide.chain.contains(&c) => Some(ModPosition::Wildcard(c)),
                ModPosition::Residue(i) if !wraps && start <= i && i < stop => {
                    Some(ModPosition::Residue(i - start))
                }
                ModPosition::Residue(i) if wraps && i >= start => Some(ModPosition::Residue(i - start)),
                ModPosition::Residue(i) if wraps && i < stop => {
                    Some(ModPosition::Residue(i + length - start))
                }
                _ => None,
            };
            if let Some(position) = position {
                peptide.modifications.push(Modification {
                    position,
                    ..modification.clone()
                });
            }
        }

        if start == 0 {
            peptide.n_term_formula = self.n_term_formula.clone();
        }
        if stop >= length {
            peptide.c_term_formula = self.c_term_formula.clone();
        }
        if cyclic {
            peptide.n_term_formula = "H".to_string();
            peptide.c_term_formula = "OH".to_string();
        }

        if start > 0 {
            peptide.item_before = Some(self.chain[start - 1]);
        } else if cyclic {
            peptide.item_before = self.chain.last().copied();
        }
        if stop < length {
            peptide.item_after = Some(self.chain[stop]);
        } else if cyclic {
            peptide.item_after = self.chain.first().copied();
        }

        peptide.history.push(HistoryEvent::Slice { start, stop });
        Ok(peptide)
    }

    /// All linear peptides obtained by opening the ring at every bond.
    ///
    /// The sequence is treated as cyclic even if it is not, which is how scrambled fragments
    /// are produced. Terminal modifications are removed.
    ///
    pub fn linearized(&self) -> Result<Vec<Sequence>, Error> {
        (0..self.len()).map(|x| self.linearized_at(x)).collect()
    }

    /// Linear peptide obtained by opening the ring before residue `break_point`.
    pub fn linearized_at(&self, break_point: usize) -> Result<Sequence, Error> {
        let mut peptide = self.slice_as(break_point, break_point, true)?;
        peptide.history.pop();
        let before = if break_point == 0 {
            self.len() - 1
        } else {
            break_point - 1
        };
        peptide.history.push(HistoryEvent::Break {
            before,
            after: break_point,
        });
        peptide.modifications.retain(|m| !m.is_terminal());
        Ok(peptide)
    }

    /// Residue indices in the original parent sequence, resolved from the history.
    pub fn indexes(&self) -> Vec<usize> {
        let mut ranges: Vec<usize> = match self.history.first() {
            Some(HistoryEvent::Init { start, stop }) => (*start..*stop).collect(),
            _ => (0..self.len()).collect(),
        };
        for event in self.history.iter().skip(1) {
            ranges = match *event {
                HistoryEvent::Slice { start, stop } => {
                    let stop = stop.min(ranges.len());
                    if start < stop {
                        ranges[start..stop].to_vec()
                    } else {
                        Vec::new()
                    }
                }
                HistoryEvent::Break { after, .. } => {
                    // opening the ring before `after` rotates the parent indexes
                    let mut reordered = ranges;
                    let after = after.min(reordered.len());
                    reordered.rotate_left(after);
                    reordered
                }
                HistoryEvent::Init { .. } => ranges,
            };
        }
        ranges
    }

    /// Human readable (1-based, inclusive) residue range of the last slice in the parent.
    pub fn range(&self) -> (usize, usize) {
        match self.history.last() {
            Some(HistoryEvent::Slice { start, stop }) | Some(HistoryEvent::Init { start, stop }) => {
                (start + 1, *stop)
            }
            Some(HistoryEvent::Break { .. }) | None => (1, self.len()),
        }
    }

    /// Whether the sequence derives from a cyclic parent.
    pub fn has_break(&self) -> bool {
        self.history
            .iter()
            .any(|event| matches!(event, HistoryEvent::Break { .. }))
    }

    /// Elemental composition including modifications, terminal groups, losses and gains.
    pub fn composition(&self) -> Result<MolecularFormula, Error> {
        let mut formula = MolecularFormula::default();
        for monomer in self.chain.iter() {
            formula += blocks::monomer(*monomer)?.composition()?;
        }

        for modification in self.modifications.iter() {
            let multiplier = match modification.position {
                ModPosition::Wildcard(residue) => self.count(residue) as i32,
                _ => 1,
            };
            let delta = blocks::modification(&modification.name)?.composition()?;
            formula += delta * multiplier;
        }

        if !self.cyclic {
            formula += parse_formula(&self.n_term_formula)?;
            formula += parse_formula(&self.c_term_formula)?;
        }

        for loss in self.losses.iter() {
            formula -= parse_formula(loss)?;
        }
        for gain in self.gains.iter() {
            formula += parse_formula(gain)?;
        }

        Ok(formula)
    }

    pub fn mass(&self, mass_type: MassType) -> Result<f64, Error> {
        Ok(formula_mass(&self.composition()?, mass_type))
    }

    /// Protonated (or deprotonated for negative charges) m/z.
    pub fn mz(&self, charge: i32, mass_type: MassType) -> Result<f64, Error> {
        Ok(formula_mz(&self.composition()?, charge, &Agent::Proton, mass_type))
    }

    /// A sequence is valid if its composition can be computed and has no negative atom counts.
    pub fn is_valid(&self) -> bool {
        self.composition().is_ok_and(|formula| chemistry::is_valid(&formula))
    }

    /// Enumerates all unique combinations of the variable modifications.
    ///
    /// Fixed modifications are always kept. Each returned sequence carries the fixed
    /// modifications plus one combination of variable ones converted to fixed.
    ///
    /// # Arguments
    /// * `max_mods` - Maximum number of modifications per residue
    /// * `retain_position` - Keep positions of wildcard modifications (slower)
    /// * `enzyme` - Block modifications on cleavage sites the enzyme cannot cut when modified
    /// * `token` - Cancellation token
    ///
    pub fn variations(
        &self,
        max_mods: usize,
        retain_position: bool,
        enzyme: Option<&Enzyme>,
        token: &CancellationToken,
    ) -> Result<Vec<Sequence>, Error> {
        let mut fixed_mods = Vec::new();
        let mut variable_mods = Vec::new();
        for modification in self.modifications.iter() {
            match (modification.state, modification.position) {
                (ModState::Fixed, _) => fixed_mods.push(modification.clone()),
                (_, ModPosition::Wildcard(residue)) if retain_position => {
                    for (x, symbol) in self.chain.iter().enumerate() {
                        if *symbol == residue {
                            variable_mods.push(Modification::new(
                                &modification.name,
                                ModPosition::Residue(x),
                                ModState::Variable,
                            ));
                        }
                    }
                }
                (_, ModPosition::Wildcard(residue)) => {
                    for _ in 0..self.count(residue) {
                        variable_mods.push(modification.clone());
                    }
                }
                _ => variable_mods.push(modification.clone()),
            }
        }

        let unique_mods = count_unique(&variable_mods);
        let combinations = unique_combinations(&unique_mods);

        let mut occupied = Vec::new();
        for modification in fixed_mods.iter() {
            let count = match modification.position {
                ModPosition::Wildcard(residue) => self.count(residue).max(1),
                _ => 1,
            };
            occupied.extend(repeat_n(modification.position, count));
        }
        if let Some(enzyme) = enzyme {
            if !enzyme.mods_before && self.item_after.is_some() && !self.is_empty() {
                occupied.extend(repeat_n(
                    ModPosition::Residue(self.len() - 1),
                    max_mods,
                ));
            }
            if !enzyme.mods_after && self.item_before.is_some() {
                occupied.extend(repeat_n(ModPosition::Residue(0), max_mods));
            }
        }

        token.check()?;

        let mut legal = Vec::new();
        for combination in combinations {
            let mut positions = occupied.clone();
            for (modification, count) in combination.iter() {
                positions.extend(repeat_n(modification.position, *count));
            }
            if check_occupancy(&positions, &self.chain, max_mods) {
                legal.push(combination);
            }
        }

        token.check()?;

        let mut formatted: Vec<Vec<Modification>> = Vec::new();
        for combination in legal {
            let mut mods = Vec::new();
            for (modification, count) in combination.iter() {
                let position = if retain_position || modification.is_terminal() {
                    modification.position
                } else {
                    ModPosition::Unlocalized
                };
                let fixed = Modification::new(&modification.name, position, ModState::Fixed);
                let repeat = if modification.is_terminal() && !retain_position {
                    1
                } else {
                    *count
                };
                mods.extend(repeat_n(fixed, repeat));
            }
            mods.sort();
            if !formatted.contains(&mods) {
                formatted.push(mods);
            }
        }

        let mut peptides = Vec::new();
        for combination in formatted {
            token.check()?;
            let mut peptide = self.clone();
            peptide.modifications = fixed_mods.iter().cloned().chain(combination).collect();
            if peptide.is_valid() {
                peptides.push(peptide);
            }
        }

        Ok(peptides)
    }

    /// Display label, residues followed by a modification summary, e.g. `PEPTMDE [1xOxidation]`.
    pub fn format(&self) -> String {
        let mods = self.format_modifications();
        let chain: String = self.chain.iter().collect();
        if mods.is_empty() {
            chain
        } else {
            format!("{} [{}]", chain, mods)
        }
    }

    /// Label with the flanking residues in lower case, e.g. `k.PEPTMDE.a [1xOxidation]`.
    pub fn format_flanked(&self) -> String {
        let before = self.item_before.map(|c| c.to_ascii_lowercase().to_string());
        let after = self.item_after.map(|c| c.to_ascii_lowercase().to_string());
        let chain: String = self.chain.iter().collect();
        let mut label = format!(
            "{}.{}.{}",
            before.unwrap_or_default(),
            chain,
            after.unwrap_or_default()
        );
        let mods = self.format_modifications();
        if !mods.is_empty() {
            label = format!("{} [{}]", label, mods);
        }
        label
    }

    pub(crate) fn format_modifications(&self) -> String {
        let mut counts: Vec<(&str, usize)> = Vec::new();
        for modification in self.modifications.iter() {
            let count = match modification.position {
                ModPosition::Wildcard(residue) => self.count(residue),
                _ => 1,
            };
            if count == 0 {
                continue;
            }
            match counts.iter_mut().find(|(name, _)| *name == modification.name) {
                Some((_, total)) => *total += count,
                None => counts.push((&modification.name, count)),
            }
        }
        counts.sort();
        counts
            .iter()
            .map(|(name, count)| format!("{}x{}", count, name))
            .collect::<Vec<String>>()
            .join("; ")
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.format())
    }
}

fn count_unique(modifications: &[Modification]) -> Vec<(Modification, usize)> {
    let mut unique: Vec<(Modification, usize)> = Vec::new();
    for modification in modifications {
        match unique.iter_mut().find(|(m, _)| m == modification) {
            Some((_, count)) => *count += 1,
            None => unique.push((modification.clone(), 1)),
        }
    }
    unique
}

/// Every selection of 0..=count copies of each unique modification.
fn unique_combinations(items: &[(Modification, usize)]) -> Vec<Vec<(Modification, usize)>> {
    let mut combinations = Vec::new();
    for i in 0..items.len() {
        for tail in unique_combinations(&items[i + 1..]) {
            for j in 0..items[i].1 {
                let mut combination = vec![(items[i].0.clone(), items[i].1 - j)];
                combination.extend(tail.iter().cloned());
                combinations.push(combination);
            }
        }
    }
    combinations.push(Vec::new());
    combinations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chemistry::count;
    use rustyms::Element;

    #[test]
    fn test_new() {
        let sequence = Sequence::new("pep tide-*").unwrap();
        assert_eq!(sequence.chain(), &['P', 'E', 'P', 'T', 'I', 'D', 'E']);
        assert_eq!(Sequence::new("PEPXIDE"), Err(Error::UnknownMonomer('X')));
    }

    #[test]
    fn test_composition() {
        // G + A + H2O
        let sequence = Sequence::new("GA").unwrap();
        let formula = sequence.composition().unwrap();
        assert_eq!(formula.to_string(), "C5H10N2O3");

        let mut cyclic = Sequence::new("GA").unwrap();
        cyclic.cyclize(true);
        assert_eq!(cyclic.composition().unwrap().to_string(), "C5H8N2O2");
    }

    #[test]
    fn test_modify() {
        let mut sequence = Sequence::new("PEPTMDEM").unwrap();
        assert!(sequence
            .modify("Oxidation", ModPosition::Wildcard('M'), ModState::Fixed)
            .unwrap());
        assert!(!sequence
            .modify("Oxidation", ModPosition::Wildcard('W'), ModState::Fixed)
            .unwrap());
        assert!(!sequence
            .modify("Oxidation", ModPosition::Residue(8), ModState::Fixed)
            .unwrap());
        assert!(sequence
            .modify("Bogus", ModPosition::Residue(1), ModState::Fixed)
            .is_err());

        let formula = sequence.composition().unwrap();
        let plain = Sequence::new("PEPTMDEM").unwrap().composition().unwrap();
        assert_eq!(count(&formula, Element::O) - count(&plain, Element::O), 2);
        assert_eq!(sequence.format(), "PEPTMDEM [2xOxidation]");
        assert!(sequence.is_modified(Some(4), false));
        assert!(!sequence.is_modified(Some(3), true));
    }

    #[test]
    fn test_slice() {
        let mut sequence = Sequence::new("ACDEFGHIK").unwrap();
        sequence
            .modify("Phospho", ModPosition::Residue(5), ModState::Variable)
            .unwrap();
        sequence
            .modify("Acetyl", ModPosition::NTerm, ModState::Fixed)
            .unwrap();

        let peptide = sequence.slice(3, 7).unwrap();
        assert_eq!(peptide.chain(), &['E', 'F', 'G', 'H']);
        assert_eq!(peptide.item_before, Some('D'));
        assert_eq!(peptide.item_after, Some('I'));
        assert_eq!(
            peptide.modifications(),
            &[Modification::new("Phospho", ModPosition::Residue(2), ModState::Variable)]
        );
        assert_eq!(peptide.range(), (4, 7));
        assert_eq!(peptide.indexes(), vec![3, 4, 5, 6]);

        let n_terminal = sequence.slice(0, 2).unwrap();
        assert_eq!(n_terminal.modifications().len(), 1);
        assert_eq!(n_terminal.item_before, None);

        assert_eq!(sequence.slice(4, 4), Err(Error::InvalidSlice(4, 4)));
    }

    #[test]
    fn test_linearized() {
        let mut sequence = Sequence::new("ACDE").unwrap();
        sequence.cyclize(true);
        let peptides = sequence.linearized().unwrap();
        assert_eq!(peptides.len(), 4);
        assert_eq!(peptides[1].chain(), &['C', 'D', 'E', 'A']);
        assert_eq!(peptides[1].indexes(), vec![1, 2, 3, 0]);
        assert!(peptides[1].has_break());
        assert_eq!(peptides[0].indexes(), vec![0, 1, 2, 3]);

        // sub-fragment of a linearized peptide maps back to the ring
        let fragment = peptides[2].slice(1, 3).unwrap();
        assert_eq!(fragment.chain(), &['E', 'A']);
        assert_eq!(fragment.indexes(), vec![3, 0]);
    }

    #[test]
    fn test_variations() {
        let token = CancellationToken::new();
        let mut sequence = Sequence::new("MAMK").unwrap();
        sequence
            .modify("Oxidation", ModPosition::Wildcard('M'), ModState::Variable)
            .unwrap();

        let variants = sequence.variations(1, false, None, &token).unwrap();
        // none, one or two oxidations
        assert_eq!(variants.len(), 3);
        let labels: Vec<String> = variants.iter().map(|v| v.format()).collect();
        assert!(labels.contains(&"MAMK".to_string()));
        assert!(labels.contains(&"MAMK [1xOxidation]".to_string()));
        assert!(labels.contains(&"MAMK [2xOxidation]".to_string()));

        // with positions the single oxidation can sit on either methionine
        let variants = sequence.variations(1, true, None, &token).unwrap();
        assert_eq!(variants.len(), 4);
    }

    #[test]
    fn test_variations_blocked_by_fixed() {
        let token = CancellationToken::new();
        let mut sequence = Sequence::new("MAK").unwrap();
        sequence
            .modify("Oxidation", ModPosition::Wildcard('M'), ModState::Fixed)
            .unwrap();
        sequence
            .modify("Oxidation", ModPosition::Residue(0), ModState::Variable)
            .unwrap();
        let variants = sequence.variations(1, false, None, &token).unwrap();
        assert_eq!(variants.len(), 1);
        assert_eq!(variants[0].format(), "MAK [1xOxidation]");

        // the lysine is still free
        sequence
            .modify("Oxidation", ModPosition::Residue(2), ModState::Variable)
            .unwrap();
        let variants = sequence.variations(1, false, None, &token).unwrap();
        assert_eq!(variants.len(), 2);
    }

    #[test]
    fn test_variations_cancelled() {
        let token = CancellationToken::new();
        let mut sequence = Sequence::new("MAMK").unwrap();
        sequence
            .modify("Oxidation", ModPosition::Wildcard('M'), ModState::Variable)
            .unwrap();
        token.cancel();
        assert_eq!(
            sequence.variations(1, false, None, &token),
            Err(Error::Cancelled)
        );
    }
}
