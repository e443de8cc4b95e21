//! Mass and mixing matrices built from scalar physics parameters.
//!
//! Mixing parameters use 1-indexed state pairs `(i, j)` with `i < j` and
//! angles in degrees. The mixing matrix is the product of the pair rotations
//! in reverse declaration order, `U = R(last) ... R(first)`.

use crate::domain::{NuisanceError, NuisanceResult, ParticleKind};
use crate::numerics::{DenseComplexMatrix, DenseRealMatrix, complex_identity, multiply};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MixingParameter {
    pub i: usize,
    pub j: usize,
    pub angle_degrees: f64,
    #[serde(default)]
    pub cp_phase_degrees: f64,
}

impl MixingParameter {
    pub fn new(
        i: usize,
        j: usize,
        angle_degrees: f64,
        cp_phase_degrees: f64,
    ) -> NuisanceResult<Self> {
        let parameter = Self {
            i,
            j,
            angle_degrees,
            cp_phase_degrees,
        };
        parameter.validate()?;
        Ok(parameter)
    }

    pub fn validate(&self) -> NuisanceResult<()> {
        if self.i == 0 || self.i >= self.j {
            return Err(NuisanceError::configuration(
                "CONFIG.MIXING_PAIR",
                format!(
                    "mixing pair ({}, {}) must be 1-indexed with i < j",
                    self.i, self.j
                ),
            ));
        }
        if !self.angle_degrees.is_finite() || !self.cp_phase_degrees.is_finite() {
            return Err(NuisanceError::configuration(
                "CONFIG.MIXING_ANGLE",
                format!(
                    "mixing pair ({}, {}) has non-finite angle {} or phase {}",
                    self.i, self.j, self.angle_degrees, self.cp_phase_degrees
                ),
            ));
        }
        Ok(())
    }
}

/// Lightest mass followed by squared-mass differences relative to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MassParameters(Vec<f64>);

impl MassParameters {
    pub fn new(values: Vec<f64>) -> NuisanceResult<Self> {
        let parameters = Self(values);
        parameters.validate()?;
        Ok(parameters)
    }

    pub(crate) fn from_unchecked(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[f64] {
        &self.0
    }

    pub fn dimension(&self) -> usize {
        self.0.len()
    }

    pub fn validate(&self) -> NuisanceResult<()> {
        build_mass_matrix(&self.0).map(|_| ())
    }
}

/// Number of states spanned by a mixing set, i.e. the largest `j`.
pub fn mixing_dimension(params: &[MixingParameter]) -> usize {
    params.iter().map(|param| param.j).max().unwrap_or(0)
}

/// Every state `1..=N` must take part in at least one rotation.
pub fn validate_mixing_parameters(params: &[MixingParameter]) -> NuisanceResult<usize> {
    if params.is_empty() {
        return Err(NuisanceError::configuration(
            "CONFIG.MIXING_EMPTY",
            "at least one mixing parameter is required",
        ));
    }
    for param in params {
        param.validate()?;
    }

    // Each rotation touches two states, so a larger span can never be covered.
    let dimension = mixing_dimension(params);
    if dimension > 2 * params.len() {
        return Err(NuisanceError::configuration(
            "CONFIG.MIXING_COVERAGE",
            format!(
                "mixing parameters span {dimension} states but {} rotations can cover at most {}",
                params.len(),
                2 * params.len()
            ),
        ));
    }
    let mut covered = vec![false; dimension];
    for param in params {
        covered[param.i - 1] = true;
        covered[param.j - 1] = true;
    }
    if let Some(missing) = covered.iter().position(|state| !*state) {
        return Err(NuisanceError::configuration(
            "CONFIG.MIXING_COVERAGE",
            format!(
                "mixing parameters span {dimension} states but state {} is never rotated",
                missing + 1
            ),
        ));
    }

    Ok(dimension)
}

pub fn build_mass_matrix(params: &[f64]) -> NuisanceResult<DenseRealMatrix> {
    let Some((&lightest, differences)) = params.split_first() else {
        return Err(NuisanceError::configuration(
            "CONFIG.MASS_EMPTY",
            "mass parameters must contain at least the lightest mass",
        ));
    };
    if let Some(index) = params.iter().position(|value| !value.is_finite()) {
        return Err(NuisanceError::configuration(
            "CONFIG.MASS_VALUE",
            format!("mass parameter {index} is not finite"),
        ));
    }

    let lightest_sq = lightest * lightest;
    let smallest_difference = differences.iter().copied().fold(f64::INFINITY, f64::min);
    if -lightest_sq > smallest_difference {
        return Err(NuisanceError::physics_constraint(
            "PHYSICS.NEGATIVE_MASS",
            format!(
                "All masses have to be positive! lightest mass squared {lightest_sq:e} \
                 with squared-mass difference {smallest_difference:e}"
            ),
        ));
    }

    let dimension = params.len();
    let mut matrix = DenseRealMatrix::zeros(dimension, dimension);
    matrix[(0, 0)] = lightest_sq;
    for (offset, difference) in differences.iter().enumerate() {
        matrix[(offset + 1, offset + 1)] = lightest_sq + difference;
    }
    Ok(matrix)
}

/// Gell-Mann style rotation in the `(i, j)` plane, 0-indexed, `i < j < dim`.
pub fn build_rotation(
    dim: usize,
    i: usize,
    j: usize,
    angle_rad: f64,
    cp_rad: f64,
) -> NuisanceResult<DenseComplexMatrix> {
    if i >= j || j >= dim {
        return Err(NuisanceError::configuration(
            "CONFIG.ROTATION_INDEX",
            format!("rotation plane ({i}, {j}) is invalid for dimension {dim}"),
        ));
    }

    let (sin, cos) = angle_rad.sin_cos();
    let mut rotation = complex_identity(dim);
    rotation[(i, j)] = Complex64::from_polar(sin, -cp_rad);
    rotation[(j, i)] = -Complex64::from_polar(sin, cp_rad);
    rotation[(i, i)] = Complex64::new(cos, 0.0);
    rotation[(j, j)] = Complex64::new(cos, 0.0);
    Ok(rotation)
}

pub fn build_mixing_matrix(
    params: &[MixingParameter],
    kind: ParticleKind,
) -> NuisanceResult<DenseComplexMatrix> {
    let dimension = validate_mixing_parameters(params)?;
    let mut mixing = complex_identity(dimension);
    for param in params {
        let rotation = build_rotation(
            dimension,
            param.i - 1,
            param.j - 1,
            param.angle_degrees.to_radians(),
            kind.sign() * param.cp_phase_degrees.to_radians(),
        )?;
        mixing = multiply(&rotation, &mixing).map_err(|error| {
            NuisanceError::internal("INTERNAL.MIXING_PRODUCT", error.to_string())
        })?;
    }
    Ok(mixing)
}

#[cfg(test)]
mod tests {
    use super::{
        MassParameters, MixingParameter, build_mass_matrix, build_mixing_matrix, build_rotation,
        validate_mixing_parameters,
    };
    use crate::common::constants::{reference_mass_parameters, reference_mixing_rows};
    use crate::domain::{NuisanceErrorCategory, ParticleKind};
    use crate::numerics::unitarity_deviation;
    use num_complex::Complex64;

    fn reference_mixing(cp_degrees: f64) -> Vec<MixingParameter> {
        reference_mixing_rows()
            .into_iter()
            .map(|(i, j, angle, _)| MixingParameter::new(i, j, angle, cp_degrees).expect("param"))
            .collect()
    }

    #[test]
    fn mass_matrix_adds_lightest_mass_squared_to_every_state() {
        let matrix = build_mass_matrix(&[2.0, 1.0, 3.0]).expect("mass matrix");
        assert_eq!(matrix.nrows(), 3);
        assert_eq!(matrix[(0, 0)], 4.0);
        assert_eq!(matrix[(1, 1)], 5.0);
        assert_eq!(matrix[(2, 2)], 7.0);
        assert_eq!(matrix[(0, 1)], 0.0);
        assert_eq!(matrix[(2, 0)], 0.0);
    }

    #[test]
    fn mass_matrix_rejects_negative_absolute_squared_masses() {
        build_mass_matrix(&[1.0, -1.0, 0.5]).expect("boundary case stays valid");

        let error = build_mass_matrix(&[1.0, -1.5, 0.5]).expect_err("negative mass");
        assert_eq!(error.category(), NuisanceErrorCategory::PhysicsConstraint);
        assert_eq!(error.placeholder(), "PHYSICS.NEGATIVE_MASS");

        let error = build_mass_matrix(&[]).expect_err("empty");
        assert_eq!(error.category(), NuisanceErrorCategory::Configuration);

        assert!(MassParameters::new(vec![0.0, -1.0e-3]).is_err());
        assert_eq!(
            MassParameters::new(reference_mass_parameters().to_vec())
                .expect("reference masses")
                .dimension(),
            3
        );
    }

    #[test]
    fn rotation_places_phased_sine_terms_off_diagonal() {
        let angle = 0.3_f64;
        let cp = 0.7_f64;
        let rotation = build_rotation(3, 0, 2, angle, cp).expect("rotation");

        let expected_ij = Complex64::new(angle.sin() * cp.cos(), -angle.sin() * cp.sin());
        let expected_ji = Complex64::new(-angle.sin() * cp.cos(), -angle.sin() * cp.sin());
        assert!((rotation[(0, 2)] - expected_ij).norm() < 1.0e-15);
        assert!((rotation[(2, 0)] - expected_ji).norm() < 1.0e-15);
        assert_eq!(rotation[(0, 0)], Complex64::new(angle.cos(), 0.0));
        assert_eq!(rotation[(2, 2)], Complex64::new(angle.cos(), 0.0));
        assert_eq!(rotation[(1, 1)], Complex64::new(1.0, 0.0));
        assert!(unitarity_deviation(&rotation) < 1.0e-15);

        assert!(build_rotation(3, 2, 1, angle, cp).is_err());
        assert!(build_rotation(3, 0, 3, angle, cp).is_err());
    }

    #[test]
    fn mixing_matrix_is_unitary_for_neutrinos_and_antineutrinos() {
        for cp in [0.0, 45.0, 197.0] {
            for kind in [ParticleKind::Neutrino, ParticleKind::Antineutrino] {
                let mixing = build_mixing_matrix(&reference_mixing(cp), kind).expect("mixing");
                assert!(unitarity_deviation(&mixing) < 1.0e-10);
            }
        }
    }

    #[test]
    fn mixing_matrix_applies_rotations_in_reverse_declared_order() {
        let mut params = reference_mixing(0.0);
        params[1].cp_phase_degrees = 30.0;
        let mixing = build_mixing_matrix(&params, ParticleKind::Neutrino).expect("mixing");

        let (s12, c12) = params[0].angle_degrees.to_radians().sin_cos();
        let (s13, c13) = params[1].angle_degrees.to_radians().sin_cos();
        let (s23, c23) = params[2].angle_degrees.to_radians().sin_cos();
        let delta = 30.0_f64.to_radians();

        // Standard PMNS layout: U = R23 R13 R12 with the phase on the 13 rotation.
        assert!((mixing[(0, 0)] - Complex64::new(c12 * c13, 0.0)).norm() < 1.0e-14);
        assert!((mixing[(0, 1)] - Complex64::new(s12 * c13, 0.0)).norm() < 1.0e-14);
        assert!((mixing[(0, 2)] - Complex64::from_polar(s13, -delta)).norm() < 1.0e-14);
        assert!((mixing[(1, 2)] - Complex64::new(s23 * c13, 0.0)).norm() < 1.0e-14);
        assert!((mixing[(2, 2)] - Complex64::new(c23 * c13, 0.0)).norm() < 1.0e-14);
    }

    #[test]
    fn antineutrino_flag_conjugates_only_the_phase() {
        let params = reference_mixing(60.0);
        let neutrino = build_mixing_matrix(&params, ParticleKind::Neutrino).expect("nu");
        let antineutrino = build_mixing_matrix(&params, ParticleKind::Antineutrino).expect("nubar");

        for row in 0..3 {
            for col in 0..3 {
                let diff = (neutrino[(row, col)].conj() - antineutrino[(row, col)]).norm();
                assert!(diff < 1.0e-14, "entry ({row},{col})");
            }
        }

        let real = build_mixing_matrix(&reference_mixing(0.0), ParticleKind::Neutrino).expect("nu");
        let real_anti =
            build_mixing_matrix(&reference_mixing(0.0), ParticleKind::Antineutrino).expect("nubar");
        assert_eq!(real, real_anti);
    }

    #[test]
    fn mixing_parameters_must_cover_every_state() {
        let sparse = vec![MixingParameter::new(1, 3, 10.0, 0.0).expect("param")];
        let error = validate_mixing_parameters(&sparse).expect_err("state 2 missing");
        assert_eq!(error.category(), NuisanceErrorCategory::Configuration);
        assert_eq!(error.placeholder(), "CONFIG.MIXING_COVERAGE");

        let error = validate_mixing_parameters(&[]).expect_err("empty");
        assert_eq!(error.placeholder(), "CONFIG.MIXING_EMPTY");

        assert!(MixingParameter::new(2, 2, 10.0, 0.0).is_err());
        assert!(MixingParameter::new(0, 1, 10.0, 0.0).is_err());
        assert!(MixingParameter::new(1, 2, f64::NAN, 0.0).is_err());

        let two_state = vec![MixingParameter::new(1, 2, 33.0, 0.0).expect("param")];
        assert_eq!(validate_mixing_parameters(&two_state).expect("dimension"), 2);
    }

    #[test]
    fn oversized_state_index_is_rejected_before_allocation() {
        let huge = vec![MixingParameter::new(1, usize::MAX / 2, 10.0, 0.0).expect("param")];
        let error = validate_mixing_parameters(&huge).expect_err("span far beyond coverage");
        assert_eq!(error.category(), NuisanceErrorCategory::Configuration);
        assert_eq!(error.placeholder(), "CONFIG.MIXING_COVERAGE");

        let error = build_mixing_matrix(&huge, ParticleKind::Neutrino).expect_err("no matrix");
        assert_eq!(error.placeholder(), "CONFIG.MIXING_COVERAGE");

        let wide = vec![
            MixingParameter::new(1, 2, 10.0, 0.0).expect("param"),
            MixingParameter::new(3, 100_000, 10.0, 0.0).expect("param"),
        ];
        let error = validate_mixing_parameters(&wide).expect_err("span of 1e5 states");
        assert_eq!(error.placeholder(), "CONFIG.MIXING_COVERAGE");
    }
}
