//! Probability surfaces over (cos-zenith x energy) for atmospheric neutrinos.

use super::hamiltonian::PropagationBasis;
use super::probability::{WavePacketInput, transition_probability};
use crate::common::config::NuisanceConfig;
use crate::common::constants::{PI, R_ATMOS_KM, R_EARTH_KM};
use crate::domain::{ExecutionMode, Flavor, NuisanceError, NuisanceResult, ParticleKind};
use rayon::prelude::*;
use tracing::{debug, info, warn};

/// Path length through a sphere of radius `r_earth` for a neutrino produced
/// at radius `r_atmos` with zenith angle `zenith` (radians).
pub fn slant_distance(zenith: f64, r_earth: f64, r_atmos: f64) -> f64 {
    let inner = ((PI - zenith).sin() / r_atmos * r_earth).asin();
    (r_atmos.powi(2) + r_earth.powi(2) - 2.0 * r_atmos * r_earth * (zenith - inner).cos()).sqrt()
}

pub fn slant_distance_km(zenith: f64) -> f64 {
    slant_distance(zenith, R_EARTH_KM, R_ATMOS_KM)
}

/// One destination flavor over the grid, stored row-major with one row per
/// zenith value.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityGrid {
    rows: usize,
    cols: usize,
    values: Vec<f64>,
}

impl ProbabilityGrid {
    fn from_rows(rows: usize, cols: usize, values: Vec<f64>) -> Self {
        debug_assert_eq!(values.len(), rows * cols);
        Self { rows, cols, values }
    }

    /// `(zenith count, energy count)`
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn get(&self, zenith_index: usize, energy_index: usize) -> Option<f64> {
        if zenith_index >= self.rows || energy_index >= self.cols {
            return None;
        }
        Some(self.values[zenith_index * self.cols + energy_index])
    }

    pub fn row(&self, zenith_index: usize) -> Option<&[f64]> {
        if zenith_index >= self.rows {
            return None;
        }
        let start = zenith_index * self.cols;
        Some(&self.values[start..start + self.cols])
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.values.chunks(self.cols.max(1)).take(self.rows)
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

/// Transition probabilities from one source flavor into each of e, mu, tau.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilitySurface {
    source: Flavor,
    destinations: [ProbabilityGrid; 3],
}

impl ProbabilitySurface {
    pub fn source(&self) -> Flavor {
        self.source
    }

    pub fn to(&self, destination: Flavor) -> &ProbabilityGrid {
        &self.destinations[destination.index()]
    }

    pub fn destinations(&self) -> &[ProbabilityGrid; 3] {
        &self.destinations
    }

    pub fn shape(&self) -> (usize, usize) {
        self.destinations[0].shape()
    }

    pub fn into_destinations(self) -> [ProbabilityGrid; 3] {
        self.destinations
    }
}

#[derive(Debug, Clone, Copy)]
enum EnergyBases<'a> {
    Shared(&'a PropagationBasis),
    PerEnergy(&'a [PropagationBasis]),
}

impl EnergyBases<'_> {
    fn at(&self, energy_index: usize) -> &PropagationBasis {
        match self {
            Self::Shared(basis) => basis,
            Self::PerEnergy(bases) => &bases[energy_index],
        }
    }
}

/// Sweeps the grid for `source` with raw physics inputs.
///
/// Equivalent to calling `wp_prob` per cell; the basis is built once per
/// energy (once overall in vacuum) and reused across zenith rows.
pub fn compute_grid(
    source: Flavor,
    energy_grid: &[f64],
    zenith_rad: &[f64],
    input: WavePacketInput<'_>,
) -> NuisanceResult<ProbabilitySurface> {
    compute_grid_with_mode(source, energy_grid, zenith_rad, input, ExecutionMode::default())
}

pub fn compute_grid_with_mode(
    source: Flavor,
    energy_grid: &[f64],
    zenith_rad: &[f64],
    input: WavePacketInput<'_>,
    mode: ExecutionMode,
) -> NuisanceResult<ProbabilitySurface> {
    validate_axes(energy_grid, zenith_rad)?;

    if input.depends_on_energy() {
        let bases = energy_grid
            .iter()
            .map(|energy| input.propagation_basis(*energy))
            .collect::<NuisanceResult<Vec<_>>>()?;
        sweep(
            source,
            energy_grid,
            zenith_rad,
            EnergyBases::PerEnergy(&bases),
            input.mass_states,
            mode,
        )
    } else {
        let basis = input.propagation_basis(energy_grid[0])?;
        sweep(
            source,
            energy_grid,
            zenith_rad,
            EnergyBases::Shared(&basis),
            input.mass_states,
            mode,
        )
    }
}

/// Sweeps the grid for `source` with one precomputed effective basis.
pub fn compute_grid_effective(
    source: Flavor,
    energy_grid: &[f64],
    zenith_rad: &[f64],
    basis: &PropagationBasis,
    mass_states: usize,
    mode: ExecutionMode,
) -> NuisanceResult<ProbabilitySurface> {
    validate_axes(energy_grid, zenith_rad)?;
    sweep(
        source,
        energy_grid,
        zenith_rad,
        EnergyBases::Shared(basis),
        mass_states,
        mode,
    )
}

fn validate_axes(energy_grid: &[f64], zenith_rad: &[f64]) -> NuisanceResult<()> {
    if energy_grid.is_empty() || zenith_rad.is_empty() {
        return Err(NuisanceError::configuration(
            "CONFIG.GRID_EMPTY",
            format!(
                "energy and zenith grids must be non-empty, got {} energies and {} zenith values",
                energy_grid.len(),
                zenith_rad.len()
            ),
        ));
    }
    if let Some(zenith) = zenith_rad.iter().find(|zenith| !zenith.is_finite()) {
        return Err(NuisanceError::configuration(
            "CONFIG.ZENITH",
            format!("zenith angle {zenith} is not finite"),
        ));
    }
    Ok(())
}

fn sweep(
    source: Flavor,
    energy_grid: &[f64],
    zenith_rad: &[f64],
    bases: EnergyBases<'_>,
    mass_states: usize,
    mode: ExecutionMode,
) -> NuisanceResult<ProbabilitySurface> {
    let rows = match mode {
        ExecutionMode::Serial => zenith_rad
            .iter()
            .map(|zenith| sweep_row(source, *zenith, energy_grid, bases, mass_states))
            .collect::<NuisanceResult<Vec<_>>>()?,
        ExecutionMode::Parallel => zenith_rad
            .par_iter()
            .map(|zenith| sweep_row(source, *zenith, energy_grid, bases, mass_states))
            .collect::<NuisanceResult<Vec<_>>>()?,
    };

    let (row_count, col_count) = (zenith_rad.len(), energy_grid.len());
    let destinations = Flavor::ALL.map(|destination| {
        let values = rows
            .iter()
            .flat_map(|row| row[destination.index()].iter().copied())
            .collect();
        ProbabilityGrid::from_rows(row_count, col_count, values)
    });

    Ok(ProbabilitySurface {
        source,
        destinations,
    })
}

fn sweep_row(
    source: Flavor,
    zenith: f64,
    energy_grid: &[f64],
    bases: EnergyBases<'_>,
    mass_states: usize,
) -> NuisanceResult<[Vec<f64>; 3]> {
    let distance_km = slant_distance_km(zenith);
    debug!(%source, zenith, distance_km, "sweeping zenith row");

    let mut row: [Vec<f64>; 3] = std::array::from_fn(|_| Vec::with_capacity(energy_grid.len()));
    for (energy_index, energy) in energy_grid.iter().enumerate() {
        let basis = bases.at(energy_index);
        for destination in Flavor::ALL {
            row[destination.index()].push(transition_probability(
                source.index(),
                destination.index(),
                *energy,
                distance_km,
                basis,
                mass_states,
            )?);
        }
    }
    Ok(row)
}

/// Surfaces for every source flavor over a shared (cos-zenith, energy) grid.
#[derive(Debug, Clone, PartialEq)]
pub struct OscillationGrids {
    energy_grid: Vec<f64>,
    cos_zenith: Vec<f64>,
    kind: ParticleKind,
    matter: bool,
    surfaces: [ProbabilitySurface; 3],
}

impl OscillationGrids {
    pub fn from_config(config: &NuisanceConfig) -> NuisanceResult<Self> {
        config.validate()?;
        if config.oscillation.precalc {
            return Err(NuisanceError::not_implemented(
                "NOT_IMPLEMENTED.PRECALC_GRID",
                "Precalculated oscillation grids are not implemented yet",
            ));
        }
        if config.general.random_seed.is_none() {
            warn!("no random seed configured; runs are not reproducible");
        }

        let energy_grid = config.oscillation.energy_grid.resolve()?;
        let cos_zenith = config.oscillation.angle_grid.resolve()?;
        let kind = config.oscillation.particle_kind()?;

        let matter = if config.oscillation.matter {
            info!("Including Earth matter effects");
            Some(&config.physics.matter_potential)
        } else {
            info!("Computing vacuum oscillations");
            None
        };
        match kind {
            ParticleKind::Neutrino => info!("Computing neutrino oscillations"),
            ParticleKind::Antineutrino => info!("Computing anti-neutrino oscillations"),
        }

        let input = WavePacketInput::new(
            &config.physics.mixing,
            config.physics.masses.values(),
            matter,
            kind,
        )
        .with_mass_states(config.oscillation.mass_states);

        Self::compute(
            energy_grid,
            cos_zenith,
            input,
            config.oscillation.execution_mode,
        )
    }

    pub fn compute(
        energy_grid: Vec<f64>,
        cos_zenith: Vec<f64>,
        input: WavePacketInput<'_>,
        mode: ExecutionMode,
    ) -> NuisanceResult<Self> {
        if let Some(value) = cos_zenith
            .iter()
            .find(|value| !(-1.0..=1.0).contains(*value))
        {
            return Err(NuisanceError::configuration(
                "CONFIG.COS_ZENITH",
                format!("cos(zenith) value {value} lies outside [-1, 1]"),
            ));
        }
        let zenith: Vec<f64> = cos_zenith.iter().map(|value| value.acos()).collect();

        let mut surfaces = Vec::with_capacity(Flavor::ALL.len());
        for source in Flavor::ALL {
            info!(%source, "Computing oscillation grid");
            surfaces.push(compute_grid_with_mode(
                source,
                &energy_grid,
                &zenith,
                input,
                mode,
            )?);
        }
        let surfaces: [ProbabilitySurface; 3] = surfaces.try_into().map_err(|_| {
            NuisanceError::internal("INTERNAL.GRID_SURFACES", "expected one surface per flavor")
        })?;

        info!(
            zenith_points = cos_zenith.len(),
            energy_points = energy_grid.len(),
            "Finished oscillation grids"
        );

        Ok(Self {
            energy_grid,
            cos_zenith,
            kind: input.kind,
            matter: input.matter.is_some(),
            surfaces,
        })
    }

    pub fn energy_grid(&self) -> &[f64] {
        &self.energy_grid
    }

    pub fn cos_zenith(&self) -> &[f64] {
        &self.cos_zenith
    }

    pub fn kind(&self) -> ParticleKind {
        self.kind
    }

    pub fn matter_enabled(&self) -> bool {
        self.matter
    }

    pub fn surface(&self, source: Flavor) -> &ProbabilitySurface {
        &self.surfaces[source.index()]
    }

    pub fn surfaces(&self) -> &[ProbabilitySurface; 3] {
        &self.surfaces
    }

    pub fn electron(&self) -> &ProbabilitySurface {
        self.surface(Flavor::E)
    }

    pub fn muon(&self) -> &ProbabilitySurface {
        self.surface(Flavor::Mu)
    }

    pub fn tau(&self) -> &ProbabilitySurface {
        self.surface(Flavor::Tau)
    }
}
