use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    blocks::{self, NEUTRAL_LOSSES},
    chemistry::MassType,
    error::Error,
    tolerance::ToleranceSpec,
};

/// Ion polarity, the sign of generated charges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    #[default]
    Positive,
    Negative,
}

impl Polarity {
    pub fn sign(&self) -> i32 {
        match self {
            Polarity::Positive => 1,
            Polarity::Negative => -1,
        }
    }

    /// Signed charges `1..=max_charge`.
    pub fn charges(&self, max_charge: u32) -> impl Iterator<Item = i32> + '_ {
        (1..=max_charge as i32).map(move |z| z * self.sign())
    }
}

/// Adducts the compound generator can attach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Adduct {
    Na,
    K,
    Li,
    NH4,
    ACN,
    MeOH,
    #[serde(rename = "-H2O")]
    WaterLoss,
}

impl Adduct {
    /// Tag used in variant labels.
    pub fn name(&self) -> &'static str {
        match self {
            Adduct::Na => "Na",
            Adduct::K => "K",
            Adduct::Li => "Li",
            Adduct::NH4 => "NH4",
            Adduct::ACN => "ACN",
            Adduct::MeOH => "MeOH",
            Adduct::WaterLoss => "-H2O",
        }
    }

    pub fn formula(&self) -> &'static str {
        match self {
            Adduct::Na => "Na",
            Adduct::K => "K",
            Adduct::Li => "Li",
            Adduct::NH4 => "NH4",
            Adduct::ACN => "CH3CN",
            Adduct::MeOH => "CH3OH",
            Adduct::WaterLoss => "H-2O-1",
        }
    }
}

fn validate_charge(max_charge: u32) -> Result<(), Error> {
    if max_charge < 1 {
        return Err(Error::InvalidParameter(
            "maximum charge must be at least 1".to_string(),
        ));
    }
    Ok(())
}

fn validate_max_mods(max_mods: usize) -> Result<(), Error> {
    if max_mods < 1 {
        return Err(Error::InvalidParameter(
            "maximum modifications per residue must be at least 1".to_string(),
        ));
    }
    Ok(())
}

fn validate_neutral(names: &[String]) -> Result<(), Error> {
    for name in names {
        if !NEUTRAL_LOSSES.contains(&name.as_str()) {
            return Err(Error::InvalidParameter(format!(
                "unsupported neutral loss or gain {}",
                name
            )));
        }
    }
    Ok(())
}

/// Compound ion generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompoundParams {
    /// Compound name to formula.
    pub compounds: BTreeMap<String, String>,
    pub mass_type: MassType,
    pub max_charge: u32,
    pub polarity: Polarity,
    pub radicals: bool,
    pub adducts: Vec<Adduct>,
}

impl Default for CompoundParams {
    fn default() -> Self {
        Self {
            compounds: BTreeMap::new(),
            mass_type: MassType::Monoisotopic,
            max_charge: 1,
            polarity: Polarity::Positive,
            radicals: false,
            adducts: vec![Adduct::Na, Adduct::K],
        }
    }
}

impl CompoundParams {
    pub fn validate(&self) -> Result<(), Error> {
        validate_charge(self.max_charge)
    }
}

/// Protein digest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DigestParams {
    pub enzyme: String,
    pub miscleavages: usize,
    /// Cleave regardless of modifications at the cleavage site.
    pub allow_mods: bool,
    pub low_mass: f64,
    pub high_mass: f64,
    pub mass_type: MassType,
    pub max_charge: u32,
    pub polarity: Polarity,
    pub max_mods: usize,
    pub retain_position: bool,
}

impl Default for DigestParams {
    fn default() -> Self {
        Self {
            enzyme: "Trypsin".to_string(),
            miscleavages: 1,
            allow_mods: false,
            low_mass: 500.0,
            high_mass: 5000.0,
            mass_type: MassType::Monoisotopic,
            max_charge: 1,
            polarity: Polarity::Positive,
            max_mods: 1,
            retain_position: false,
        }
    }
}

impl DigestParams {
    pub fn validate(&self) -> Result<(), Error> {
        blocks::enzyme(&self.enzyme)?;
        validate_charge(self.max_charge)?;
        validate_max_mods(self.max_mods)?;
        if !self.low_mass.is_finite() || !self.high_mass.is_finite() || self.low_mass > self.high_mass {
            return Err(Error::InvalidParameter(format!(
                "invalid mass range {}-{}",
                self.low_mass, self.high_mass
            )));
        }
        Ok(())
    }
}

/// Peptide fragmentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FragmentParams {
    /// Fragment series names, see [`blocks::FRAGMENT_SERIES`].
    pub series: Vec<String>,
    pub losses: Vec<String>,
    /// Also apply the neutral losses defined by the residues.
    pub defined_losses: bool,
    /// Maximum number of simultaneous losses.
    pub max_losses: usize,
    pub gains: Vec<String>,
    pub scrambling: bool,
    /// Drop fragments with losses their residues do not explain.
    pub filter_fragments: bool,
    pub mass_type: MassType,
    pub max_charge: u32,
    pub polarity: Polarity,
    pub max_mods: usize,
}

impl Default for FragmentParams {
    fn default() -> Self {
        Self {
            series: vec!["a".to_string(), "b".to_string(), "y".to_string()],
            losses: vec!["NH3".to_string(), "H2O".to_string()],
            defined_losses: false,
            max_losses: 1,
            gains: Vec::new(),
            scrambling: false,
            filter_fragments: true,
            mass_type: MassType::Average,
            max_charge: 1,
            polarity: Polarity::Positive,
            max_mods: 1,
        }
    }
}

impl FragmentParams {
    pub fn validate(&self) -> Result<(), Error> {
        for series in self.series.iter() {
            blocks::fragment_series(series)?;
        }
        validate_neutral(&self.losses)?;
        validate_neutral(&self.gains)?;
        validate_charge(self.max_charge)?;
        validate_max_mods(self.max_mods)?;
        if self.max_losses < 1 {
            return Err(Error::InvalidParameter(
                "loss combination limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Sequence mass search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    /// Target m/z.
    pub mass: f64,
    /// Charge of the target m/z.
    pub charge: i32,
    pub tolerance: ToleranceSpec,
    /// Enzyme defining peptide ends, `None` searches plain `H`/`OH` termini.
    pub enzyme: Option<String>,
    pub semi_specific: bool,
    pub mass_type: MassType,
    pub max_mods: usize,
    pub retain_position: bool,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            mass: 0.0,
            charge: 1,
            tolerance: ToleranceSpec::default(),
            enzyme: Some("Trypsin".to_string()),
            semi_specific: true,
            mass_type: MassType::Monoisotopic,
            max_mods: 1,
            retain_position: false,
        }
    }
}

impl SearchParams {
    pub fn validate(&self) -> Result<(), Error> {
        if !self.mass.is_finite() || self.mass <= 0.0 {
            return Err(Error::InvalidParameter(format!(
                "target mass must be positive, got {}",
                self.mass
            )));
        }
        if self.charge == 0 {
            return Err(Error::InvalidParameter("target charge must not be 0".to_string()));
        }
        if let Some(enzyme) = &self.enzyme {
            blocks::enzyme(enzyme)?;
        }
        self.tolerance.validate()?;
        validate_max_mods(self.max_mods)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tolerance::ErrorUnits;

    #[test]
    fn test_defaults_are_valid() {
        assert!(DigestParams::default().validate().is_ok());
        assert!(FragmentParams::default().validate().is_ok());
        assert!(CompoundParams::default().validate().is_ok());
        // a target mass has to be set
        assert!(SearchParams::default().validate().is_err());
    }

    #[test]
    fn test_invalid() {
        let params = DigestParams {
            low_mass: 2000.0,
            high_mass: 1000.0,
            ..Default::default()
        };
        assert!(matches!(params.validate(), Err(Error::InvalidParameter(_))));

        let params = DigestParams {
            enzyme: "Unknown".to_string(),
            ..Default::default()
        };
        assert_eq!(
            params.validate(),
            Err(Error::UnknownEnzyme("Unknown".to_string()))
        );

        let params = FragmentParams {
            losses: vec!["CH4".to_string()],
            ..Default::default()
        };
        assert!(params.validate().is_err());

        let params = CompoundParams {
            max_charge: 0,
            ..Default::default()
        };
        assert!(params.validate().is_err());

        let params = SearchParams {
            mass: 1000.0,
            charge: 0,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_polarity() {
        let charges: Vec<i32> = Polarity::Negative.charges(3).collect();
        assert_eq!(charges, vec![-1, -2, -3]);
    }

    #[test]
    fn test_deserialize() {
        let json = r#"{
            "mass": 1045.53,
            "charge": 2,
            "tolerance": {"value": 10.0, "units": "ppm"},
            "enzyme": null,
            "mass_type": "average"
        }"#;
        let params: SearchParams = serde_json::from_str(json).unwrap();
        assert_eq!(params.tolerance.units, ErrorUnits::Ppm);
        assert_eq!(params.mass_type, MassType::Average);
        assert!(params.enzyme.is_none());
        assert_eq!(params.max_mods, 1);
        assert!(params.validate().is_ok());

        let params: CompoundParams =
            serde_json::from_str(r#"{"adducts": ["Na", "-H2O"], "compounds": {"water": "H2O"}}"#).unwrap();
        assert_eq!(params.adducts, vec![Adduct::Na, Adduct::WaterLoss]);
    }
}
