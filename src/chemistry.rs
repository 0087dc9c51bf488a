use std::num::NonZeroU16;

use rustyms::{Element, MassMode, MolecularFormula};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Mass convention used to compute theoretical values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MassType {
    #[default]
    #[serde(rename = "monoisotopic")]
    Monoisotopic,
    #[serde(rename = "average")]
    Average,
}

impl From<MassType> for MassMode {
    fn from(mass_type: MassType) -> Self {
        match mass_type {
            MassType::Monoisotopic => MassMode::Monoisotopic,
            MassType::Average => MassMode::Average,
        }
    }
}

/// Charging agent of an ion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Agent {
    /// Protonation / deprotonation, `H` with unit charge +1.
    Proton,
    /// Electron loss / gain, used for radical ions.
    Electron,
    /// Any other agent with its unit charge, e.g. `Na` with +1.
    Custom {
        formula: MolecularFormula,
        charge: i32,
    },
}

/// Element entry of a rustyms formula: element, isotope and count.
type ElementCount = (Element, Option<NonZeroU16>, i32);

/// Mass of a single electron in Dalton.
pub fn electron_mass() -> f64 {
    Element::Electron.mass(None).map_or(0.0, |mass| mass.value)
}

/// Parses a formula expression.
///
/// Accepts element symbols with optional isotope (`C{13}`), signed counts (`H-2O-1`)
/// and parenthesised groups with multipliers (`(H2O)2`). The empty string is the empty formula.
/// Counts may end up negative, see [`is_valid`].
///
/// # Arguments
/// * `expression` - Formula expression
///
pub fn parse_formula(expression: &str) -> Result<MolecularFormula, Error> {
    let chars: Vec<char> = expression.chars().filter(|c| !c.is_whitespace()).collect();
    let mut position = 0;
    let atoms = parse_group(&chars, &mut position, expression)?;
    if position != chars.len() {
        return Err(Error::InvalidFormula(expression.to_string()));
    }
    MolecularFormula::new(&atoms, &[]).ok_or_else(|| Error::InvalidFormula(expression.to_string()))
}

/// A formula is chemically valid if no atom count is negative.
pub fn is_valid(formula: &MolecularFormula) -> bool {
    formula.elements().iter().all(|(_, _, count)| *count >= 0)
}

/// Counts atoms of an element, isotopes included.
pub fn count(formula: &MolecularFormula, element: Element) -> i32 {
    formula
        .elements()
        .iter()
        .filter(|(atom, _, _)| *atom == element)
        .map(|(_, _, count)| *count)
        .sum()
}

/// Neutral mass of a formula in Dalton.
pub fn formula_mass(formula: &MolecularFormula, mass_type: MassType) -> f64 {
    formula.mass(mass_type.into()).value
}

/// m/z of the ion formed by `charge` charging agents.
///
/// # Arguments
/// * `formula` - Neutral formula
/// * `charge` - Signed ion charge, 0 returns the neutral mass
/// * `agent` - Charging agent
/// * `mass_type` - Mass convention
///
pub fn formula_mz(formula: &MolecularFormula, charge: i32, agent: &Agent, mass_type: MassType) -> f64 {
    mz(formula_mass(formula, mass_type), charge, agent, mass_type)
}

/// m/z for a neutral mass, see [`formula_mz`].
pub fn mz(mass: f64, charge: i32, agent: &Agent, mass_type: MassType) -> f64 {
    if charge == 0 {
        return mass;
    }
    let (agent_mass, agent_charge) = agent_mass(agent, mass_type);
    let agent_count = charge as f64 / agent_charge as f64;
    (mass + agent_mass * agent_count) / charge.unsigned_abs() as f64
}

/// Mass and unit charge of a charging agent, the electrons it lacks already removed.
pub(crate) fn agent_mass(agent: &Agent, mass_type: MassType) -> (f64, i32) {
    match agent {
        Agent::Electron => (electron_mass(), -1),
        Agent::Proton => {
            let hydrogen = match mass_type {
                MassType::Monoisotopic => Element::H.mass(None),
                MassType::Average => Element::H.average_weight(None),
            };
            (hydrogen.map_or(0.0, |mass| mass.value) - electron_mass(), 1)
        }
        Agent::Custom { formula, charge } => (
            formula_mass(formula, mass_type) - *charge as f64 * electron_mass(),
            *charge,
        ),
    }
}

fn parse_group(chars: &[char], position: &mut usize, expression: &str) -> Result<Vec<ElementCount>, Error> {
    let invalid = || Error::InvalidFormula(expression.to_string());
    let mut atoms = Vec::new();

    while let Some(current) = chars.get(*position) {
        if *current == '(' {
            *position += 1;
            let inner = parse_group(chars, position, expression)?;
            if chars.get(*position) != Some(&')') {
                return Err(invalid());
            }
            *position += 1;
            let multiplier = parse_count(chars, position, false, expression)?.unwrap_or(1);
            atoms.extend(
                inner
                    .into_iter()
                    .map(|(element, isotope, count)| (element, isotope, count * multiplier)),
            );
        } else if *current == ')' {
            break;
        } else if current.is_ascii_uppercase() {
            let start = *position;
            *position += 1;
            while chars.get(*position).is_some_and(|c| c.is_ascii_lowercase()) {
                *position += 1;
            }
            let symbol: String = chars[start..*position].iter().collect();
            let element =
                Element::try_from(symbol.as_str()).map_err(|_| Error::UnknownElement(symbol.clone()))?;

            let mut isotope = None;
            if chars.get(*position) == Some(&'{') {
                *position += 1;
                let number = parse_count(chars, position, false, expression)?.ok_or_else(invalid)?;
                if chars.get(*position) != Some(&'}') {
                    return Err(invalid());
                }
                *position += 1;
                isotope = u16::try_from(number).ok().and_then(NonZeroU16::new);
                if isotope.is_none() {
                    return Err(invalid());
                }
            }

            let count = parse_count(chars, position, true, expression)?.unwrap_or(1);
            atoms.push((element, isotope, count));
        } else {
            return Err(invalid());
        }
    }

    Ok(atoms)
}

fn parse_count(
    chars: &[char],
    position: &mut usize,
    signed: bool,
    expression: &str,
) -> Result<Option<i32>, Error> {
    let start = *position;
    if signed && chars.get(*position) == Some(&'-') {
        *position += 1;
    }
    while chars.get(*position).is_some_and(|c| c.is_ascii_digit()) {
        *position += 1;
    }
    if *position == start {
        return Ok(None);
    }
    let digits: String = chars[start..*position].iter().collect();
    digits
        .parse::<i32>()
        .map(Some)
        .map_err(|_| Error::InvalidFormula(expression.to_string()))
}
