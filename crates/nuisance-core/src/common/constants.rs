//! Physical constants and the reference three-flavor parameter set.
//!
//! Energies are in GeV and lengths in km unless a name says otherwise.
//! `M2GEV` converts metres into natural units (GeV^-1).

pub const PI: f64 = std::f64::consts::PI;
pub const PI2: f64 = 2.0 * PI;
pub const HBARC_GEV_FM: f64 = 0.197;
pub const M2GEV: f64 = 1.0 / (HBARC_GEV_FM * 1.0e-15);
pub const KM2M: f64 = 1.0e3;
pub const EV2GEV: f64 = 1.0e-9;
pub const EV2_TO_GEV2: f64 = EV2GEV * EV2GEV;

pub const R_EARTH_KM: f64 = 6_371.0;
pub const ATMOSPHERE_HEIGHT_KM: f64 = 20.0;
pub const R_ATMOS_KM: f64 = R_EARTH_KM + ATMOSPHERE_HEIGHT_KM;

/// Earth matter potential in GeV^-2, density included; multiplied by E in the
/// per-call pathway.
pub const EARTH_POTENTIAL: f64 = 4.0e-22;

pub const SIN2_THETA12: f64 = 0.307;
pub const SIN2_THETA13: f64 = 0.0218;
pub const SIN2_THETA23: f64 = 0.512;

pub const DELTA_M21_SQ_EV2: f64 = 7.60e-5;
pub const DELTA_M32_SQ_EV2: f64 = 2.35e-3;
pub const LIGHTEST_MASS_PARAMETER_EV: f64 = 1.0;

pub fn mixing_angle_degrees(sin2_theta: f64) -> f64 {
    sin2_theta.sqrt().asin().to_degrees()
}

/// `(i, j, angle_degrees, cp_degrees)` rows of the reference mixing set.
pub fn reference_mixing_rows() -> [(usize, usize, f64, f64); 3] {
    [
        (1, 2, mixing_angle_degrees(SIN2_THETA12), 0.0),
        (1, 3, mixing_angle_degrees(SIN2_THETA13), 0.0),
        (2, 3, mixing_angle_degrees(SIN2_THETA23), 0.0),
    ]
}

/// Lightest-mass entry followed by the squared-mass differences, in GeV^2.
pub fn reference_mass_parameters() -> [f64; 3] {
    [
        LIGHTEST_MASS_PARAMETER_EV * EV2_TO_GEV2,
        DELTA_M21_SQ_EV2 * EV2_TO_GEV2,
        (DELTA_M21_SQ_EV2 + DELTA_M32_SQ_EV2) * EV2_TO_GEV2,
    ]
}

pub fn earth_matter_diagonal() -> [f64; 3] {
    [EARTH_POTENTIAL, 0.0, 0.0]
}
