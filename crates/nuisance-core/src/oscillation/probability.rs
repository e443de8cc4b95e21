//! Wave-packet flavor transition probabilities (after arXiv:1206.0812).
//!
//! `P(a -> b) = sum_j |U_aj|^2 |U_bj|^2
//!            + 2 Re sum_{i<j} U_ai U*_aj U*_bi U_bj exp(-2 pi i L / l_osc(j, i))`

use super::hamiltonian::{
    MatterPotential, MatterScaling, PropagationBasis, diagonalize_hamiltonian,
    effective_hamiltonian, validate_dimensions,
};
use super::matrices::{MixingParameter, build_mass_matrix, build_mixing_matrix};
use crate::common::constants::{KM2M, M2GEV, PI, PI2};
use crate::domain::{NuisanceError, NuisanceResult, ParticleKind};
use crate::numerics::DenseRealMatrix;
use num_complex::Complex64;

/// Squared-mass (or effective energy) splitting between states `i` and `j`.
///
/// When the lower index is 0 the upper diagonal entry is used on its own
/// instead of the difference; this matches the convention the reference
/// grids were produced with and is only exact for a massless lowest state.
pub fn mass_difference(i: usize, j: usize, diagonal: &DenseRealMatrix) -> f64 {
    if i == j {
        return 0.0;
    }
    let (lower, upper) = if i < j { (i, j) } else { (j, i) };
    if lower == 0 {
        diagonal[(upper, upper)]
    } else {
        diagonal[(upper, upper)] - diagonal[(lower, lower)]
    }
}

/// `4 pi E / dm^2`, infinite when the states are degenerate.
pub fn oscillation_length(j: usize, i: usize, energy: f64, diagonal: &DenseRealMatrix) -> f64 {
    4.0 * PI * energy / mass_difference(j, i, diagonal)
}

/// Travel distance in km converted to natural units (GeV^-1).
pub fn natural_distance(distance_km: f64) -> f64 {
    distance_km * KM2M * M2GEV
}

pub fn transition_probability(
    alpha: usize,
    beta: usize,
    energy: f64,
    distance_km: f64,
    basis: &PropagationBasis,
    mass_states: usize,
) -> NuisanceResult<f64> {
    validate_kinematics(energy, distance_km)?;
    let dimension = basis.dimension();
    if alpha >= dimension || beta >= dimension {
        return Err(NuisanceError::configuration(
            "CONFIG.FLAVOR_INDEX",
            format!("flavor indices ({alpha}, {beta}) exceed the {dimension}-state basis"),
        ));
    }
    if mass_states == 0 || mass_states > dimension {
        return Err(NuisanceError::configuration(
            "CONFIG.MASS_STATES",
            format!("mass_states must be in 1..={dimension}, got {mass_states}"),
        ));
    }

    Ok(interference_sum(alpha, beta, energy, distance_km, basis, mass_states))
}

fn interference_sum(
    alpha: usize,
    beta: usize,
    energy: f64,
    distance_km: f64,
    basis: &PropagationBasis,
    mass_states: usize,
) -> f64 {
    let mixing = basis.mixing();
    let diagonal = basis.diagonal();
    let distance = natural_distance(distance_km);

    let mut probability = 0.0;
    for j in 0..mass_states {
        probability += mixing[(alpha, j)].norm_sqr() * mixing[(beta, j)].norm_sqr();

        let mut interference = Complex64::new(0.0, 0.0);
        for i in 0..j {
            let length = oscillation_length(j, i, energy, diagonal);
            let phase = Complex64::from_polar(1.0, -PI2 * distance / length);
            interference += mixing[(alpha, i)]
                * mixing[(alpha, j)].conj()
                * mixing[(beta, i)].conj()
                * mixing[(beta, j)]
                * phase;
        }
        probability += 2.0 * interference.re;
    }
    probability
}

fn validate_kinematics(energy: f64, distance_km: f64) -> NuisanceResult<()> {
    if !energy.is_finite() || energy <= 0.0 {
        return Err(NuisanceError::configuration(
            "CONFIG.ENERGY",
            format!("neutrino energy must be finite and positive, got {energy}"),
        ));
    }
    if !distance_km.is_finite() || distance_km < 0.0 {
        return Err(NuisanceError::configuration(
            "CONFIG.DISTANCE",
            format!("travel distance must be finite and non-negative, got {distance_km}"),
        ));
    }
    Ok(())
}

/// Raw physics inputs for the per-call probability path.
#[derive(Debug, Clone, Copy)]
pub struct WavePacketInput<'a> {
    pub mixing: &'a [MixingParameter],
    pub masses: &'a [f64],
    pub matter: Option<&'a MatterPotential>,
    pub kind: ParticleKind,
    pub mass_states: usize,
}

impl<'a> WavePacketInput<'a> {
    pub fn new(
        mixing: &'a [MixingParameter],
        masses: &'a [f64],
        matter: Option<&'a MatterPotential>,
        kind: ParticleKind,
    ) -> Self {
        Self {
            mixing,
            masses,
            matter,
            kind,
            mass_states: masses.len(),
        }
    }

    pub fn with_mass_states(mut self, mass_states: usize) -> Self {
        self.mass_states = mass_states;
        self
    }

    pub fn with_anti(self, anti: i32) -> NuisanceResult<Self> {
        Ok(Self {
            kind: ParticleKind::from_anti(anti)?,
            ..self
        })
    }

    /// Basis the probability is evaluated in at `energy`.
    ///
    /// Without matter this is the raw mixing and mass matrices; with matter
    /// the Hamiltonian uses `V * E` and is diagonalized.
    pub fn propagation_basis(&self, energy: f64) -> NuisanceResult<PropagationBasis> {
        validate_dimensions(self.mixing, self.masses, self.matter)?;
        let mixing = build_mixing_matrix(self.mixing, self.kind)?;
        let mass = build_mass_matrix(self.masses)?;

        match self.matter {
            None => PropagationBasis::new(mixing, mass),
            Some(potential) => {
                let matter = potential.to_matrix(MatterScaling::EnergyScaled.factor(energy));
                let hamiltonian = effective_hamiltonian(&mixing, &mass, Some(&matter), self.kind)?;
                diagonalize_hamiltonian(&hamiltonian)
            }
        }
    }

    pub fn depends_on_energy(&self) -> bool {
        self.matter.is_some()
    }
}

/// Probability from raw mixing/mass parameters, rebuilding the basis per call.
pub fn wp_prob(
    alpha: usize,
    beta: usize,
    energy: f64,
    distance_km: f64,
    input: WavePacketInput<'_>,
) -> NuisanceResult<f64> {
    validate_kinematics(energy, distance_km)?;
    let basis = input.propagation_basis(energy)?;
    transition_probability(alpha, beta, energy, distance_km, &basis, input.mass_states)
}

/// Probability from a precomputed effective basis.
pub fn wp_prob_effective(
    alpha: usize,
    beta: usize,
    energy: f64,
    distance_km: f64,
    basis: &PropagationBasis,
    mass_states: usize,
) -> NuisanceResult<f64> {
    transition_probability(alpha, beta, energy, distance_km, basis, mass_states)
}

/// Anything that can answer "probability of `alpha -> beta` at (E, L)".
pub trait OscillationProbabilityApi {
    fn probability(
        &self,
        alpha: usize,
        beta: usize,
        energy: f64,
        distance_km: f64,
    ) -> NuisanceResult<f64>;
}

impl OscillationProbabilityApi for WavePacketInput<'_> {
    fn probability(
        &self,
        alpha: usize,
        beta: usize,
        energy: f64,
        distance_km: f64,
    ) -> NuisanceResult<f64> {
        wp_prob(alpha, beta, energy, distance_km, *self)
    }
}

impl OscillationProbabilityApi for PropagationBasis {
    fn probability(
        &self,
        alpha: usize,
        beta: usize,
        energy: f64,
        distance_km: f64,
    ) -> NuisanceResult<f64> {
        wp_prob_effective(alpha, beta, energy, distance_km, self, self.dimension())
    }
}
