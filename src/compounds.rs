use rustyms::MolecularFormula;
use tracing::{debug, trace};

use crate::{
    cancellation::CancellationToken,
    candidate::{sort_by_label, Candidate, CandidateKind},
    chemistry::{formula_mz, is_valid, parse_formula, Agent},
    configuration::{Adduct, CompoundParams},
    error::Error,
};

const METALS: [Adduct; 4] = [Adduct::Na, Adduct::K, Adduct::Li, Adduct::NH4];
const PARTNERS: [Adduct; 3] = [Adduct::ACN, Adduct::MeOH, Adduct::WaterLoss];

/// Formula expression of a compound carrying a single adduct.
fn adduct_expression(expression: &str, adduct: Adduct) -> String {
    match adduct {
        Adduct::WaterLoss => format!("{}({})", expression, adduct.formula()),
        _ => format!("{}({})(H-1)", expression, adduct.formula()),
    }
}

/// Formula expression and tag of a metal adduct combined with a solvent adduct or water loss.
fn combination_expression(expression: &str, metal: Adduct, partner: Adduct) -> (String, String) {
    match partner {
        Adduct::WaterLoss => (
            format!(
                "{}({})({})(H-1)",
                expression,
                metal.formula(),
                partner.formula()
            ),
            format!("{}{}", metal.name(), partner.name()),
        ),
        _ => (
            format!(
                "{}({})({})(H-2)",
                expression,
                metal.formula(),
                partner.formula()
            ),
            format!("{}+{}", metal.name(), partner.name()),
        ),
    }
}

/// Parses a generated formula, `None` if it is malformed or has negative atom counts.
fn valid_formula(expression: &str) -> Option<MolecularFormula> {
    match parse_formula(expression) {
        Ok(formula) if is_valid(&formula) => Some(formula),
        Ok(_) => {
            trace!("Skipping chemically invalid formula {}", expression);
            None
        }
        Err(err) => {
            trace!("Skipping formula {}: {}", expression, err);
            None
        }
    }
}

/// Generates the ions of a set of compounds.
///
/// For every compound and charge the plain ion is emitted, followed by the radical ion,
/// the single adducts and the metal adduct combinations that are enabled. Formulas that
/// turn out invalid are skipped.
///
/// # Arguments
/// * `params` - Compounds and ion settings
/// * `token` - Cancellation token
///
pub fn generate(params: &CompoundParams, token: &CancellationToken) -> Result<Vec<Candidate>, Error> {
    params.validate()?;

    let mut candidates = Vec::new();

    for (name, expression) in params.compounds.iter() {
        let Some(compound) = valid_formula(expression) else {
            debug!("Compound {} has no valid formula, skipping", name);
            continue;
        };

        for charge in params.polarity.charges(params.max_charge) {
            let mut push = |formula: &MolecularFormula, agent: &Agent, variant: Option<String>| {
                let mz = formula_mz(formula, charge, agent, params.mass_type);
                let kind = CandidateKind::Compound {
                    name: name.clone(),
                    formula: formula.to_string(),
                };
                candidates.push(Candidate::new(name.clone(), mz, Some(charge), kind).with_variant(variant));
            };

            push(&compound, &Agent::Proton, None);
            if params.radicals {
                push(&compound, &Agent::Electron, Some("radical".to_string()));
            }

            token.check()?;

            for adduct in params.adducts.iter() {
                if let Some(formula) = valid_formula(&adduct_expression(expression, *adduct)) {
                    push(&formula, &Agent::Proton, Some(adduct.name().to_string()));
                }
            }

            token.check()?;

            for metal in METALS.iter().filter(|metal| params.adducts.contains(metal)) {
                for partner in PARTNERS.iter().filter(|partner| params.adducts.contains(partner)) {
                    let (expression, tag) = combination_expression(expression, *metal, *partner);
                    if let Some(formula) = valid_formula(&expression) {
                        push(&formula, &Agent::Proton, Some(tag));
                    }
                }
                token.check()?;
            }
        }
    }

    sort_by_label(&mut candidates);
    debug!("Generated {} compound ions", candidates.len());
    Ok(candidates)
}
