//! Effective Hamiltonian `H = U (M U^H) + sign * V` and its diagonal basis.

use super::matrices::{MixingParameter, build_mass_matrix, build_mixing_matrix, mixing_dimension};
use crate::domain::{NuisanceError, NuisanceResult, ParticleKind};
use crate::numerics::{
    DenseComplexMatrix, DenseRealMatrix, adjoint, deterministic_argsort,
    hermitian_eigen_decompose, multiply, real_diagonal_to_complex,
};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// Diagonal matter potential in the flavor basis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatterPotential(Vec<f64>);

impl MatterPotential {
    pub fn new(diagonal: Vec<f64>) -> NuisanceResult<Self> {
        if let Some(index) = diagonal.iter().position(|value| !value.is_finite()) {
            return Err(NuisanceError::configuration(
                "CONFIG.MATTER_VALUE",
                format!("matter potential entry {index} is not finite"),
            ));
        }
        Ok(Self(diagonal))
    }

    pub(crate) fn from_unchecked(diagonal: Vec<f64>) -> Self {
        Self(diagonal)
    }

    pub fn diagonal(&self) -> &[f64] {
        &self.0
    }

    pub fn dimension(&self) -> usize {
        self.0.len()
    }

    pub fn to_matrix(&self, scale: f64) -> DenseComplexMatrix {
        let dimension = self.dimension();
        let mut matrix = DenseComplexMatrix::zeros(dimension, dimension);
        for (index, value) in self.0.iter().enumerate() {
            matrix[(index, index)] = Complex64::new(value * scale, 0.0);
        }
        matrix
    }
}

/// How a matter potential enters the Hamiltonian at a given energy.
///
/// `effective_matrices` consumes the potential as given; the per-call
/// probability path multiplies it by the neutrino energy first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatterScaling {
    Unscaled,
    #[default]
    EnergyScaled,
}

impl MatterScaling {
    pub fn factor(self, energy: f64) -> f64 {
        match self {
            Self::Unscaled => 1.0,
            Self::EnergyScaled => energy,
        }
    }
}

/// Mixing matrix and diagonal energy matrix used to propagate flavor states.
#[derive(Debug, Clone, PartialEq)]
pub struct PropagationBasis {
    mixing: DenseComplexMatrix,
    diagonal: DenseRealMatrix,
}

impl PropagationBasis {
    pub fn new(mixing: DenseComplexMatrix, diagonal: DenseRealMatrix) -> NuisanceResult<Self> {
        let dimension = mixing.nrows();
        if mixing.ncols() != dimension
            || diagonal.nrows() != dimension
            || diagonal.ncols() != dimension
        {
            return Err(NuisanceError::configuration(
                "CONFIG.BASIS_SHAPE",
                format!(
                    "mixing matrix {}x{} and diagonal matrix {}x{} must be square with equal size",
                    mixing.nrows(),
                    mixing.ncols(),
                    diagonal.nrows(),
                    diagonal.ncols()
                ),
            ));
        }
        Ok(Self { mixing, diagonal })
    }

    pub fn dimension(&self) -> usize {
        self.mixing.nrows()
    }

    pub fn mixing(&self) -> &DenseComplexMatrix {
        &self.mixing
    }

    pub fn diagonal(&self) -> &DenseRealMatrix {
        &self.diagonal
    }

    pub fn diagonal_values(&self) -> Vec<f64> {
        (0..self.dimension())
            .map(|index| self.diagonal[(index, index)])
            .collect()
    }
}

/// Output of [`effective_matrices`]: the diagonalized basis plus the raw
/// Hamiltonian it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveBasis {
    basis: PropagationBasis,
    hamiltonian: DenseComplexMatrix,
}

impl EffectiveBasis {
    pub fn basis(&self) -> &PropagationBasis {
        &self.basis
    }

    pub fn mixing(&self) -> &DenseComplexMatrix {
        self.basis.mixing()
    }

    pub fn diagonal(&self) -> &DenseRealMatrix {
        self.basis.diagonal()
    }

    pub fn hamiltonian(&self) -> &DenseComplexMatrix {
        &self.hamiltonian
    }

    pub fn dimension(&self) -> usize {
        self.basis.dimension()
    }

    pub fn into_parts(self) -> (DenseComplexMatrix, DenseRealMatrix, DenseComplexMatrix) {
        (self.basis.mixing, self.basis.diagonal, self.hamiltonian)
    }
}

pub fn effective_hamiltonian(
    mixing: &DenseComplexMatrix,
    mass: &DenseRealMatrix,
    matter: Option<&DenseComplexMatrix>,
    kind: ParticleKind,
) -> NuisanceResult<DenseComplexMatrix> {
    let mass = real_diagonal_to_complex(mass);
    let mass_adjoint = multiply(&mass, &adjoint(mixing)).map_err(product_error)?;
    let mut hamiltonian = multiply(mixing, &mass_adjoint).map_err(product_error)?;

    if let Some(matter) = matter {
        if matter.nrows() != hamiltonian.nrows() || matter.ncols() != hamiltonian.ncols() {
            return Err(NuisanceError::configuration(
                "CONFIG.MATTER_DIMENSION",
                format!(
                    "matter matrix is {}x{} but the Hamiltonian is {}x{}",
                    matter.nrows(),
                    matter.ncols(),
                    hamiltonian.nrows(),
                    hamiltonian.ncols()
                ),
            ));
        }
        let sign = kind.sign();
        for row in 0..hamiltonian.nrows() {
            for col in 0..hamiltonian.ncols() {
                hamiltonian[(row, col)] += matter[(row, col)] * sign;
            }
        }
    }

    Ok(hamiltonian)
}

/// Singular value decomposition of a Hermitian Hamiltonian.
///
/// For `H = W diag(l) W^H` the left singular vectors are the eigenvectors `W`
/// and the singular values are `|l|`. Values are sorted ascending, ties by
/// original index, and the columns of `W` follow the same permutation.
pub fn diagonalize_hamiltonian(
    hamiltonian: &DenseComplexMatrix,
) -> NuisanceResult<PropagationBasis> {
    let decomposition = hermitian_eigen_decompose(hamiltonian).map_err(|error| {
        NuisanceError::internal("NUMERICS.EIGEN_DECOMPOSITION", error.to_string())
    })?;
    let (eigenvalues, eigenvectors) = decomposition.into_parts();

    let singular_values: Vec<f64> = eigenvalues.iter().map(|value| value.abs()).collect();
    let order = deterministic_argsort(&singular_values);

    let dimension = singular_values.len();
    let mut mixing = DenseComplexMatrix::zeros(dimension, dimension);
    let mut diagonal = DenseRealMatrix::zeros(dimension, dimension);
    for (target, &source) in order.iter().enumerate() {
        diagonal[(target, target)] = singular_values[source];
        for row in 0..dimension {
            mixing[(row, target)] = eigenvectors[(row, source)];
        }
    }

    PropagationBasis::new(mixing, diagonal)
}

/// Builds mixing and mass matrices, adds the matter term as given and
/// diagonalizes the result.
pub fn effective_matrices(
    mixing_params: &[MixingParameter],
    mass_params: &[f64],
    matter: Option<&MatterPotential>,
    kind: ParticleKind,
) -> NuisanceResult<EffectiveBasis> {
    effective_matrices_scaled(mixing_params, mass_params, matter, kind, 1.0)
}

/// [`effective_matrices`] at a specific energy with an explicit matter
/// convention.
pub fn effective_matrices_at(
    mixing_params: &[MixingParameter],
    mass_params: &[f64],
    matter: Option<&MatterPotential>,
    kind: ParticleKind,
    energy: f64,
    scaling: MatterScaling,
) -> NuisanceResult<EffectiveBasis> {
    effective_matrices_scaled(
        mixing_params,
        mass_params,
        matter,
        kind,
        scaling.factor(energy),
    )
}

fn effective_matrices_scaled(
    mixing_params: &[MixingParameter],
    mass_params: &[f64],
    matter: Option<&MatterPotential>,
    kind: ParticleKind,
    matter_scale: f64,
) -> NuisanceResult<EffectiveBasis> {
    validate_dimensions(mixing_params, mass_params, matter)?;
    let mixing = build_mixing_matrix(mixing_params, kind)?;
    let mass = build_mass_matrix(mass_params)?;
    let matter = matter.map(|potential| potential.to_matrix(matter_scale));

    let hamiltonian = effective_hamiltonian(&mixing, &mass, matter.as_ref(), kind)?;
    let basis = diagonalize_hamiltonian(&hamiltonian)?;
    Ok(EffectiveBasis { basis, hamiltonian })
}

pub(crate) fn validate_dimensions(
    mixing_params: &[MixingParameter],
    mass_params: &[f64],
    matter: Option<&MatterPotential>,
) -> NuisanceResult<usize> {
    let dimension = mixing_dimension(mixing_params);
    if mass_params.len() != dimension {
        return Err(NuisanceError::configuration(
            "CONFIG.DIMENSION_MISMATCH",
            format!(
                "mixing parameters span {dimension} states but {} mass parameters were given",
                mass_params.len()
            ),
        ));
    }
    if let Some(matter) = matter {
        if matter.dimension() != dimension {
            return Err(NuisanceError::configuration(
                "CONFIG.MATTER_DIMENSION",
                format!(
                    "mixing parameters span {dimension} states but the matter potential has {} entries",
                    matter.dimension()
                ),
            ));
        }
    }
    Ok(dimension)
}

fn product_error(error: crate::numerics::LinalgError) -> NuisanceError {
    NuisanceError::internal("INTERNAL.HAMILTONIAN_PRODUCT", error.to_string())
}

#[cfg(test)]
mod tests {
    use super::{
        MatterPotential, MatterScaling, diagonalize_hamiltonian, effective_matrices,
        effective_matrices_at,
    };
    use crate::common::constants::{
        earth_matter_diagonal, reference_mass_parameters, reference_mixing_rows,
    };
    use crate::domain::{NuisanceErrorCategory, ParticleKind};
    use crate::numerics::{DenseComplexMatrix, unitarity_deviation};
    use crate::oscillation::matrices::{MixingParameter, build_mass_matrix, build_mixing_matrix};
    use num_complex::Complex64;

    fn reference_mixing() -> Vec<MixingParameter> {
        reference_mixing_rows()
            .into_iter()
            .map(|(i, j, angle, cp)| MixingParameter::new(i, j, angle, cp).expect("param"))
            .collect()
    }

    fn earth_matter() -> MatterPotential {
        MatterPotential::new(earth_matter_diagonal().to_vec()).expect("matter")
    }

    #[test]
    fn vacuum_limit_recovers_mixing_and_mass_matrices() {
        let mixing = reference_mixing();
        let masses = reference_mass_parameters();
        let effective =
            effective_matrices(&mixing, &masses, None, ParticleKind::Neutrino).expect("effective");

        let raw_mixing = build_mixing_matrix(&mixing, ParticleKind::Neutrino).expect("mixing");
        let raw_mass = build_mass_matrix(&masses).expect("mass");

        for state in 0..3 {
            let expected = raw_mass[(state, state)];
            let actual = effective.diagonal()[(state, state)];
            assert!(
                (expected - actual).abs() <= 1.0e-12 * raw_mass[(2, 2)],
                "state {state}: expected {expected:e} actual {actual:e}"
            );

            let mut overlap = Complex64::new(0.0, 0.0);
            for row in 0..3 {
                overlap += raw_mixing[(row, state)].conj() * effective.mixing()[(row, state)];
            }
            assert!((overlap.norm() - 1.0).abs() < 1.0e-10, "column {state}");
        }
        assert!(unitarity_deviation(effective.mixing()) < 1.0e-12);
    }

    #[test]
    fn singular_values_are_sorted_with_matching_vectors() {
        let effective = effective_matrices(
            &reference_mixing(),
            &reference_mass_parameters(),
            Some(&earth_matter()),
            ParticleKind::Antineutrino,
        )
        .expect("effective");

        let diagonal = effective.basis().diagonal_values();
        assert!(diagonal.windows(2).all(|pair| pair[0] <= pair[1]));
        assert!(diagonal.iter().all(|value| *value >= 0.0));

        let hamiltonian = effective.hamiltonian();
        let vectors = effective.mixing();
        for state in 0..3 {
            let mut image = [Complex64::new(0.0, 0.0); 3];
            for row in 0..3 {
                for k in 0..3 {
                    image[row] += hamiltonian[(row, k)] * vectors[(k, state)];
                }
            }
            let norm: f64 = image.iter().map(|value| value.norm_sqr()).sum::<f64>().sqrt();
            assert!(
                (norm - diagonal[state]).abs() <= 1.0e-10 * diagonal[2],
                "|H v| must equal the singular value for state {state}"
            );
        }
    }

    #[test]
    fn matter_term_changes_the_spectrum_with_sign_of_anti() {
        let mixing = reference_mixing();
        let masses = reference_mass_parameters();
        let matter = earth_matter();

        let nu = effective_matrices(&mixing, &masses, Some(&matter), ParticleKind::Neutrino)
            .expect("nu");
        let nubar = effective_matrices(&mixing, &masses, Some(&matter), ParticleKind::Antineutrino)
            .expect("nubar");

        let trace_shift = nu.hamiltonian()[(0, 0)].re - nubar.hamiltonian()[(0, 0)].re;
        assert!((trace_shift - 2.0 * earth_matter_diagonal()[0]).abs() < 1.0e-30);
        assert_ne!(nu.basis().diagonal_values(), nubar.basis().diagonal_values());
    }

    #[test]
    fn energy_scaled_variant_multiplies_the_potential() {
        let mixing = reference_mixing();
        let masses = reference_mass_parameters();
        let matter = earth_matter();

        let unscaled = effective_matrices(&mixing, &masses, Some(&matter), ParticleKind::Neutrino)
            .expect("unscaled");
        let same = effective_matrices_at(
            &mixing,
            &masses,
            Some(&matter),
            ParticleKind::Neutrino,
            10.0,
            MatterScaling::Unscaled,
        )
        .expect("unscaled at energy");
        assert_eq!(unscaled, same);

        let scaled = effective_matrices_at(
            &mixing,
            &masses,
            Some(&matter),
            ParticleKind::Neutrino,
            10.0,
            MatterScaling::EnergyScaled,
        )
        .expect("scaled");
        let shift = scaled.hamiltonian()[(0, 0)].re - unscaled.hamiltonian()[(0, 0)].re;
        assert!((shift - 9.0 * earth_matter_diagonal()[0]).abs() < 1.0e-30);
    }

    #[test]
    fn effective_matrices_are_bit_reproducible() {
        let mixing = reference_mixing();
        let masses = reference_mass_parameters();
        let matter = earth_matter();
        let first = effective_matrices(&mixing, &masses, Some(&matter), ParticleKind::Neutrino)
            .expect("first");
        let second = effective_matrices(&mixing, &masses, Some(&matter), ParticleKind::Neutrino)
            .expect("second");
        assert_eq!(first, second);
    }

    #[test]
    fn shape_mismatches_are_configuration_errors() {
        let mixing = reference_mixing();
        let error = effective_matrices(&mixing, &[0.0, 1.0e-22], None, ParticleKind::Neutrino)
            .expect_err("two masses for three states");
        assert_eq!(error.category(), NuisanceErrorCategory::Configuration);
        assert_eq!(error.placeholder(), "CONFIG.DIMENSION_MISMATCH");

        let matter = MatterPotential::new(vec![1.0e-22, 0.0]).expect("matter");
        let error = effective_matrices(
            &mixing,
            &reference_mass_parameters(),
            Some(&matter),
            ParticleKind::Neutrino,
        )
        .expect_err("two matter entries for three states");
        assert_eq!(error.placeholder(), "CONFIG.MATTER_DIMENSION");

        assert!(MatterPotential::new(vec![f64::INFINITY]).is_err());
    }

    #[test]
    fn zero_hamiltonian_diagonalizes_to_identity() {
        let basis = diagonalize_hamiltonian(&DenseComplexMatrix::zeros(3, 3)).expect("basis");
        assert_eq!(basis.diagonal_values(), vec![0.0, 0.0, 0.0]);
        assert!(unitarity_deviation(basis.mixing()) == 0.0);
    }
}
