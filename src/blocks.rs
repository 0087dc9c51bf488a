//! Immutable building block tables: monomers, enzymes, fragment series and modifications.

use regex::Regex;
use rustyms::{AminoAcid, MolecularFormula, MultiChemical};

use crate::{chemistry::parse_formula, error::Error};

/// Source of a monomer's residue composition.
pub enum Residue {
    /// Standard amino acid, composition from rustyms.
    AminoAcid(AminoAcid),
    /// Residue rustyms does not know, given as formula expression.
    Formula(&'static str),
}

pub struct Monomer {
    pub abbr: char,
    pub name: &'static str,
    pub residue: Residue,
    /// Neutral losses this residue is known to undergo.
    pub losses: &'static [&'static str],
}

pub struct Enzyme {
    pub name: &'static str,
    /// Cleavage site, matched against the last two residues of the growing peptide.
    pub expression: &'static str,
    pub n_term_formula: &'static str,
    pub c_term_formula: &'static str,
    /// Modifications allowed on the residue before the cleavage site.
    pub mods_before: bool,
    /// Modifications allowed on the residue after the cleavage site.
    pub mods_after: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminus {
    /// Whole molecule.
    Molecular,
    NTerminal,
    CTerminal,
    /// Single residue.
    Singlet,
    Internal,
}

pub struct FragmentSeries {
    pub name: &'static str,
    pub terminus: Terminus,
    pub n_term_formula: &'static str,
    pub c_term_formula: &'static str,
    /// Drop the fragment containing only the N-terminal residue.
    pub n_term_filter: bool,
    /// Drop the fragment containing the whole sequence.
    pub c_term_filter: bool,
}

pub struct ModificationDefinition {
    pub name: &'static str,
    pub gain_formula: &'static str,
    pub loss_formula: &'static str,
    pub amino_specificity: &'static str,
    pub term_specificity: Option<char>,
    pub description: &'static str,
}

#[rustfmt::skip]
pub const MONOMERS: &[Monomer] = &[
    Monomer { abbr: 'A', name: "Alanine", residue: Residue::AminoAcid(AminoAcid::Alanine), losses: &[] },
    Monomer { abbr: 'C', name: "Cysteine", residue: Residue::AminoAcid(AminoAcid::Cysteine), losses: &[] },
    Monomer { abbr: 'D', name: "Aspartic Acid", residue: Residue::AminoAcid(AminoAcid::AsparticAcid), losses: &["H2O"] },
    Monomer { abbr: 'E', name: "Glutamic Acid", residue: Residue::AminoAcid(AminoAcid::GlutamicAcid), losses: &["H2O"] },
    Monomer { abbr: 'F', name: "Phenylalanine", residue: Residue::AminoAcid(AminoAcid::Phenylalanine), losses: &[] },
    Monomer { abbr: 'G', name: "Glycine", residue: Residue::AminoAcid(AminoAcid::Glycine), losses: &[] },
    Monomer { abbr: 'H', name: "Histidine", residue: Residue::AminoAcid(AminoAcid::Histidine), losses: &[] },
    Monomer { abbr: 'I', name: "Isoleucine", residue: Residue::AminoAcid(AminoAcid::Isoleucine), losses: &[] },
    Monomer { abbr: 'K', name: "Lysine", residue: Residue::AminoAcid(AminoAcid::Lysine), losses: &["NH3"] },
    Monomer { abbr: 'L', name: "Leucine", residue: Residue::AminoAcid(AminoAcid::Leucine), losses: &[] },
    Monomer { abbr: 'M', name: "Methionine", residue: Residue::AminoAcid(AminoAcid::Methionine), losses: &[] },
    Monomer { abbr: 'N', name: "Asparagine", residue: Residue::AminoAcid(AminoAcid::Asparagine), losses: &["NH3"] },
    Monomer { abbr: 'O', name: "Ornithine", residue: Residue::Formula("C5H10N2O"), losses: &[] },
    Monomer { abbr: 'P', name: "Proline", residue: Residue::AminoAcid(AminoAcid::Proline), losses: &[] },
    Monomer { abbr: 'Q', name: "Glutamine", residue: Residue::AminoAcid(AminoAcid::Glutamine), losses: &["NH3"] },
    Monomer { abbr: 'R', name: "Arginine", residue: Residue::AminoAcid(AminoAcid::Arginine), losses: &["NH3"] },
    Monomer { abbr: 'S', name: "Serine", residue: Residue::AminoAcid(AminoAcid::Serine), losses: &["H2O", "H3PO4"] },
    Monomer { abbr: 'T', name: "Threonine", residue: Residue::AminoAcid(AminoAcid::Threonine), losses: &["H2O", "H3PO4"] },
    Monomer { abbr: 'V', name: "Valine", residue: Residue::AminoAcid(AminoAcid::Valine), losses: &[] },
    Monomer { abbr: 'W', name: "Tryptophan", residue: Residue::AminoAcid(AminoAcid::Tryptophan), losses: &[] },
    Monomer { abbr: 'Y', name: "Tyrosine", residue: Residue::AminoAcid(AminoAcid::Tyrosine), losses: &["H3PO4"] },
];

macro_rules! enzyme {
    ($name:expr, $expression:expr, $c_term:expr, $before:expr, $after:expr) => {
        Enzyme {
            name: $name,
            expression: $expression,
            n_term_formula: "H",
            c_term_formula: $c_term,
            mods_before: $before,
            mods_after: $after,
        }
    };
}

pub const ENZYMES: &[Enzyme] = &[
    enzyme!("Arg-C", "[R][A-Z]", "OH", false, true),
    enzyme!("Asp-N", "[A-Z][D]", "OH", true, false),
    enzyme!("Bromelain", "[KAY][A-Z]", "OH", false, true),
    enzyme!("CNBr-HSerLac", "[M][A-Z]", "O-1C-1H-3", false, true),
    enzyme!("Cathepsin B", "[R][A-Z]", "OH", false, true),
    enzyme!("Cathepsin D", "[LF][^VAG]", "OH", false, true),
    enzyme!("Cathepsin G", "[YWF][A-Z]", "OH", false, true),
    enzyme!("Chymotrypsin", "[YWFL][^P]", "OH", false, true),
    enzyme!("Clostripain", "[R][^P]", "OH", false, true),
    enzyme!("Elastase", "[AVLIGS][A-Z]", "OH", false, true),
    enzyme!("Glu-C Bic", "[E][A-Z]", "OH", false, true),
    enzyme!("Glu-C Phos", "[ED][A-Z]", "OH", false, true),
    enzyme!("Hydroxylamine", "[N][G]", "OH", false, false),
    enzyme!("Lys-C", "[K][A-Z]", "OH", false, true),
    enzyme!("Lys-N", "[A-Z][K]", "OH", true, false),
    enzyme!("Non-Specific", "[A-Z][A-Z]", "OH", true, true),
    enzyme!("Papain", "[RK][A-Z]", "OH", false, true),
    enzyme!("Pepsin", "[LF][^VAG]", "OH", false, true),
    enzyme!("Proteinase K", "[YWF][A-Z]", "OH", false, true),
    enzyme!("Subtilisin", "[^RHK][A-Z]", "OH", false, true),
    enzyme!("Thermolysin", "[A-Z][LFIVMA]", "OH", true, false),
    enzyme!("TrypAspN", "(([KR][^P])|([A-Z][D]))", "OH", false, false),
    enzyme!("TrypChymo", "[FYWLKR][^P]", "OH", false, true),
    enzyme!("Trypsin", "[KR][^P]", "OH", false, true),
    enzyme!("Trypsin/P", "[KR][A-Z]", "OH", false, true),
];

#[rustfmt::skip]
pub const FRAGMENT_SERIES: &[FragmentSeries] = &[
    FragmentSeries { name: "M", terminus: Terminus::Molecular, n_term_formula: "", c_term_formula: "", n_term_filter: false, c_term_filter: false },
    FragmentSeries { name: "im", terminus: Terminus::Singlet, n_term_formula: "H", c_term_formula: "C-1O-1H-1", n_term_filter: false, c_term_filter: false },
    FragmentSeries { name: "a", terminus: Terminus::NTerminal, n_term_formula: "", c_term_formula: "C-1O-1H-1", n_term_filter: true, c_term_filter: true },
    FragmentSeries { name: "b", terminus: Terminus::NTerminal, n_term_formula: "", c_term_formula: "H-1", n_term_filter: true, c_term_filter: true },
    FragmentSeries { name: "c", terminus: Terminus::NTerminal, n_term_formula: "", c_term_formula: "NH2", n_term_filter: false, c_term_filter: true },
    FragmentSeries { name: "x", terminus: Terminus::CTerminal, n_term_formula: "COH-1", c_term_formula: "", n_term_filter: true, c_term_filter: false },
    FragmentSeries { name: "y", terminus: Terminus::CTerminal, n_term_formula: "H", c_term_formula: "", n_term_filter: true, c_term_filter: false },
    FragmentSeries { name: "z", terminus: Terminus::CTerminal, n_term_formula: "N-1H-2", c_term_formula: "", n_term_filter: true, c_term_filter: false },
    FragmentSeries { name: "c-ladder", terminus: Terminus::NTerminal, n_term_formula: "", c_term_formula: "OH", n_term_filter: true, c_term_filter: true },
    FragmentSeries { name: "n-ladder", terminus: Terminus::CTerminal, n_term_formula: "H", c_term_formula: "", n_term_filter: true, c_term_filter: false },
    FragmentSeries { name: "int-b", terminus: Terminus::Internal, n_term_formula: "H", c_term_formula: "H-1", n_term_filter: false, c_term_filter: false },
    FragmentSeries { name: "int-a", terminus: Terminus::Internal, n_term_formula: "H", c_term_formula: "C-1O-1H-1", n_term_filter: false, c_term_filter: false },
];

macro_rules! modification {
    ($name:expr, $gain:expr, $loss:expr, $amino:expr, $term:expr, $description:expr) => {
        ModificationDefinition {
            name: $name,
            gain_formula: $gain,
            loss_formula: $loss,
            amino_specificity: $amino,
            term_specificity: $term,
            description: $description,
        }
    };
}

pub const MODIFICATIONS: &[ModificationDefinition] = &[
    modification!("Acetyl", "C2H3O", "H", "KCST", Some('N'), "Acetylation"),
    modification!("Amide", "NH2", "OH", "", Some('C'), "Amidation"),
    modification!("Biotin", "H14C10N2O2S", "", "K", Some('N'), "Biotinylation"),
    modification!("Carbamidomethyl", "CH2CONH2", "H", "CKHDE", Some('N'), "Iodoacetamide derivative"),
    modification!("Carbamyl", "HCNO", "", "KRCM", Some('N'), "Carbamylation"),
    modification!("Cation:K", "K", "H", "DE", Some('C'), "Replacement of proton by potassium"),
    modification!("Cation:Na", "Na", "H", "DE", Some('C'), "Replacement of proton by sodium"),
    modification!("Deamidation", "O", "HN", "NQRF", None, "Deamidation"),
    modification!("Dehydrated", "", "H2O", "NQSTYDC", None, "Dehydration"),
    modification!("Dimethyl", "C2H6", "H2", "KRNP", Some('N'), "Di-Methylation"),
    modification!("Formyl", "CHO", "H", "KST", Some('N'), "Formylation"),
    modification!("Guanidination", "CH3N2", "H", "K", None, "Homoarginine from Lysine"),
    modification!("Hex", "C6H12O6", "H2O", "KNTWCRY", Some('N'), "Hexose"),
    modification!("HexNAc", "C8H15N1O6", "H2O", "NST", None, "N-Acetylhexosamine"),
    modification!("Label:13C(6)", "C{13}6", "C6", "KR", None, "13C(6) Silac label"),
    modification!("Methyl", "CH3", "H", "CHKNQRIL", Some('N'), "Methylation"),
    modification!("Nitro", "NO2", "H", "WY", None, "Oxidation to nitro"),
    modification!("Oxidation", "O", "", "ODKNPFYRMCHWG", None, "Oxidation or Hydroxylation"),
    modification!("Phospho", "H2PO3", "H", "STYDHCR", None, "Phosphorylation"),
    modification!("Sulfo", "HSO3", "H", "STYC", None, "O-Sulfonation"),
];

/// Neutral losses and gains that can be requested by name.
pub const NEUTRAL_LOSSES: &[&str] = &["H2O", "NH3", "CO", "H3PO4"];

pub fn monomer(abbr: char) -> Result<&'static Monomer, Error> {
    MONOMERS
        .iter()
        .find(|monomer| monomer.abbr == abbr)
        .ok_or(Error::UnknownMonomer(abbr))
}

pub fn enzyme(name: &str) -> Result<&'static Enzyme, Error> {
    ENZYMES
        .iter()
        .find(|enzyme| enzyme.name == name)
        .ok_or_else(|| Error::UnknownEnzyme(name.to_string()))
}

pub fn fragment_series(name: &str) -> Result<&'static FragmentSeries, Error> {
    FRAGMENT_SERIES
        .iter()
        .find(|series| series.name == name)
        .ok_or_else(|| Error::UnknownFragmentSeries(name.to_string()))
}

pub fn modification(name: &str) -> Result<&'static ModificationDefinition, Error> {
    MODIFICATIONS
        .iter()
        .find(|modification| modification.name == name)
        .ok_or_else(|| Error::UnknownModification(name.to_string()))
}

impl Monomer {
    /// Residue composition, the amino acid without the water of its peptide bond.
    pub fn composition(&self) -> Result<MolecularFormula, Error> {
        match &self.residue {
            Residue::AminoAcid(amino_acid) => amino_acid
                .single_formula()
                .ok_or(Error::UnknownMonomer(self.abbr)),
            Residue::Formula(expression) => parse_formula(expression),
        }
    }
}

impl Enzyme {
    /// Compiles the cleavage expression anchored to the end of the peptide being built.
    pub fn cleavage_regex(&self) -> Result<Regex, Error> {
        Regex::new(&format!("{}$", self.expression))
            .map_err(|err| Error::InvalidParameter(format!("enzyme {}: {}", self.name, err)))
    }
}

impl ModificationDefinition {
    /// Net elemental change, gain minus loss.
    pub fn composition(&self) -> Result<MolecularFormula, Error> {
        let gain = parse_formula(self.gain_formula)?;
        let loss = parse_formula(self.loss_formula)?;
        Ok(gain - loss)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chemistry::{formula_mass, MassType};

    #[test]
    fn test_all_blocks_parse() {
        for monomer in MONOMERS {
            assert!(monomer.composition().is_ok(), "{}", monomer.name);
            for loss in monomer.losses {
                assert!(parse_formula(loss).is_ok());
            }
        }
        for enzyme in ENZYMES {
            assert!(enzyme.cleavage_regex().is_ok(), "{}", enzyme.name);
            assert!(parse_formula(enzyme.n_term_formula).is_ok());
            assert!(parse_formula(enzyme.c_term_formula).is_ok());
        }
        for series in FRAGMENT_SERIES {
            assert!(parse_formula(series.n_term_formula).is_ok(), "{}", series.name);
            assert!(parse_formula(series.c_term_formula).is_ok(), "{}", series.name);
        }
        for modification in MODIFICATIONS {
            assert!(modification.composition().is_ok(), "{}", modification.name);
        }
    }

    #[test]
    fn test_residue_compositions() {
        let lysine = monomer('K').unwrap().composition().unwrap();
        assert_eq!(lysine.to_string(), "C6H12N2O1");
        let ornithine = monomer('O').unwrap().composition().unwrap();
        assert!((formula_mass(&ornithine, MassType::Monoisotopic) - 114.079_313).abs() < 1e-5);
        let methionine = monomer('M').unwrap().composition().unwrap();
        assert!((formula_mass(&methionine, MassType::Monoisotopic) - 131.040_485).abs() < 1e-5);
    }

    #[test]
    fn test_lookup() {
        assert_eq!(monomer('K').unwrap().name, "Lysine");
        assert_eq!(monomer('B').err(), Some(Error::UnknownMonomer('B')));
        assert!(enzyme("Trypsin").is_ok());
        assert!(enzyme("Trypsin2").is_err());
        assert_eq!(fragment_series("y").unwrap().terminus, Terminus::CTerminal);
    }

    #[test]
    fn test_modification_mass() {
        let phospho = modification("Phospho").unwrap().composition().unwrap();
        assert!((formula_mass(&phospho, MassType::Monoisotopic) - 79.966_331).abs() < 1e-4);
        let oxidation = modification("Oxidation").unwrap().composition().unwrap();
        assert!((formula_mass(&oxidation, MassType::Monoisotopic) - 15.994_915).abs() < 1e-5);
    }

    #[test]
    fn test_trypsin_expression() {
        let regex = enzyme("Trypsin").unwrap().cleavage_regex().unwrap();
        assert!(!regex.is_match("PEPK"));
        assert!(!regex.is_match("PEK"));
        assert!(regex.is_match("PEKA"));
        assert!(!regex.is_match("PEKP"));
    }
}
