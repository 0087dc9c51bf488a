use ndarray::Array1;

use crate::{
    candidate::Candidate,
    chemistry::{agent_mass, Agent, MassType},
};

/// Converts a mass to charge ratio (Thompson) of a protonated ion to its neutral mass in Dalton
///
/// # Arguments
/// * `mz` - Mass to charge ratio (Thompson)
/// * `charge` - Charge
///
pub fn mass_to_charge_to_dalton(mz: f64, charge: usize) -> f64 {
    neutral_mass(mz, charge as i32, &Agent::Proton, MassType::Monoisotopic)
}

/// Neutral mass of an ion, the inverse of [`crate::chemistry::mz`].
///
/// # Arguments
/// * `mz` - Mass to charge ratio
/// * `charge` - Signed charge, 0 returns `mz` unchanged
/// * `agent` - Charging agent
/// * `mass_type` - Mass convention of the agent mass
///
pub fn neutral_mass(mz: f64, charge: i32, agent: &Agent, mass_type: MassType) -> f64 {
    if charge == 0 {
        return mz;
    }
    let (agent_mass, agent_charge) = agent_mass(agent, mass_type);
    let agent_count = charge as f64 / agent_charge as f64;
    mz * charge.unsigned_abs() as f64 - agent_mass * agent_count
}

/// Sorted theoretical m/z values of candidates, e.g. to export a theoretical spectrum.
///
/// # Arguments
/// * `candidates` - Candidates, those without m/z are skipped
/// * `max_mz` - Upper m/z limit
///
pub fn theoretical_spectrum(candidates: &[Candidate], max_mz: f64) -> Array1<f64> {
    let mut mz: Vec<f64> = candidates
        .iter()
        .filter_map(|candidate| candidate.theoretical_mz)
        .filter(|mz| *mz <= max_mz)
        .collect();

    mz.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    Array1::from(mz)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{candidate::CandidateKind, chemistry::mz};

    #[test]
    fn test_mass_to_charge_ratio_to_dalton() {
        let dalton = mass_to_charge_to_dalton(464.888129195412, 3);
        assert!((dalton - 1391.642558).abs() < 1e-4, "{}", dalton);
    }

    #[test]
    fn test_neutral_mass_inverts_mz() {
        for (charge, agent) in [
            (2, Agent::Proton),
            (-3, Agent::Proton),
            (1, Agent::Electron),
        ] {
            let ion = mz(1000.0, charge, &agent, MassType::Monoisotopic);
            let mass = neutral_mass(ion, charge, &agent, MassType::Monoisotopic);
            assert!((mass - 1000.0).abs() < 1e-9);
        }
        assert_eq!(neutral_mass(512.0, 0, &Agent::Proton, MassType::Average), 512.0);
    }

    #[test]
    fn test_theoretical_spectrum() {
        let candidates: Vec<Candidate> = [300.0, 100.0, 900.0, 200.0]
            .iter()
            .map(|mz| Candidate::new(mz.to_string(), *mz, Some(1), CandidateKind::Reference))
            .collect();
        let spectrum = theoretical_spectrum(&candidates, 500.0);
        assert_eq!(spectrum, Array1::from(vec![100.0, 200.0, 300.0]));
    }
}
