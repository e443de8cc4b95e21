//! Run configuration: logging, grid axes and physics parameters.
//!
//! Every section carries `#[serde(default)]`, so a JSON file only needs the
//! keys it changes. The defaults reproduce the reference atmospheric setup.

use super::constants::{earth_matter_diagonal, reference_mass_parameters, reference_mixing_rows};
use crate::domain::{ExecutionMode, NuisanceError, NuisanceResult, ParticleKind};
use crate::numerics::{is_strictly_ascending, linear_grid, log_grid};
use crate::oscillation::hamiltonian::MatterPotential;
use crate::oscillation::matrices::{MassParameters, MixingParameter, validate_mixing_parameters};
use crate::oscillation::serialization::write_text_artifact;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_RANDOM_SEED: u64 = 1337;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NuisanceConfig {
    pub general: GeneralConfig,
    pub oscillation: OscillationConfig,
    pub physics: PhysicsParameters,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Carried through to run artifacts; nothing in the engine draws from it.
    pub random_seed: Option<u64>,
    pub enable_logging: bool,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            random_seed: Some(DEFAULT_RANDOM_SEED),
            enable_logging: true,
            log_level: "info".to_string(),
            log_file: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OscillationConfig {
    pub precalc: bool,
    pub energy_grid: GridSpec,
    pub angle_grid: GridSpec,
    pub matter: bool,
    pub anti: i32,
    pub mass_states: usize,
    pub execution_mode: ExecutionMode,
}

impl Default for OscillationConfig {
    fn default() -> Self {
        Self {
            precalc: false,
            energy_grid: GridSpec::Log {
                log_start: -2.0,
                log_stop: 2.0,
                count: 1000,
            },
            angle_grid: GridSpec::Linear {
                start: -1.0,
                stop: 1.0,
                count: 400,
            },
            matter: true,
            anti: 1,
            mass_states: 3,
            execution_mode: ExecutionMode::default(),
        }
    }
}

impl OscillationConfig {
    pub fn particle_kind(&self) -> NuisanceResult<ParticleKind> {
        ParticleKind::from_anti(self.anti)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsParameters {
    pub mixing: Vec<MixingParameter>,
    pub masses: MassParameters,
    pub matter_potential: MatterPotential,
}

impl Default for PhysicsParameters {
    fn default() -> Self {
        let mixing = reference_mixing_rows()
            .into_iter()
            .map(|(i, j, angle_degrees, cp_phase_degrees)| MixingParameter {
                i,
                j,
                angle_degrees,
                cp_phase_degrees,
            })
            .collect();
        Self {
            mixing,
            masses: MassParameters::from_unchecked(reference_mass_parameters().to_vec()),
            matter_potential: MatterPotential::from_unchecked(earth_matter_diagonal().to_vec()),
        }
    }
}

/// Grid axis given either explicitly or as a linear/log10 range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GridSpec {
    Values(Vec<f64>),
    Log {
        log_start: f64,
        log_stop: f64,
        count: usize,
    },
    Linear {
        start: f64,
        stop: f64,
        count: usize,
    },
}

impl GridSpec {
    pub fn resolve(&self) -> NuisanceResult<Vec<f64>> {
        let grid = match self {
            Self::Values(values) => Some(values.clone()),
            Self::Log {
                log_start,
                log_stop,
                count,
            } => log_grid(*log_start, *log_stop, *count),
            Self::Linear { start, stop, count } => linear_grid(*start, *stop, *count),
        };
        grid.ok_or_else(|| {
            NuisanceError::configuration(
                "CONFIG.GRID_COUNT",
                "range grids need at least two points",
            )
        })
    }
}

impl NuisanceConfig {
    pub fn validate(&self) -> NuisanceResult<()> {
        let energies = self.oscillation.energy_grid.resolve()?;
        if energies.is_empty() {
            return Err(NuisanceError::configuration(
                "CONFIG.ENERGY_GRID",
                "energy grid must not be empty",
            ));
        }
        if let Some(energy) = energies
            .iter()
            .find(|energy| !energy.is_finite() || **energy <= 0.0)
        {
            return Err(NuisanceError::configuration(
                "CONFIG.ENERGY_GRID",
                format!("energy grid values must be finite and positive, found {energy}"),
            ));
        }
        if !is_strictly_ascending(&energies) {
            return Err(NuisanceError::configuration(
                "CONFIG.ENERGY_GRID",
                "energy grid must be strictly ascending",
            ));
        }

        let cos_zenith = self.oscillation.angle_grid.resolve()?;
        if cos_zenith.is_empty() {
            return Err(NuisanceError::configuration(
                "CONFIG.COS_ZENITH",
                "angle grid must not be empty",
            ));
        }
        if let Some(value) = cos_zenith
            .iter()
            .find(|value| !(-1.0..=1.0).contains(*value))
        {
            return Err(NuisanceError::configuration(
                "CONFIG.COS_ZENITH",
                format!("cos(zenith) value {value} lies outside [-1, 1]"),
            ));
        }

        self.oscillation.particle_kind()?;

        let dimension = validate_mixing_parameters(&self.physics.mixing)?;
        if self.physics.masses.dimension() != dimension {
            return Err(NuisanceError::configuration(
                "CONFIG.DIMENSION_MISMATCH",
                format!(
                    "mixing parameters span {dimension} states but {} mass parameters were given",
                    self.physics.masses.dimension()
                ),
            ));
        }
        self.physics.masses.validate()?;
        if self.physics.matter_potential.dimension() != dimension {
            return Err(NuisanceError::configuration(
                "CONFIG.MATTER_DIMENSION",
                format!(
                    "mixing parameters span {dimension} states but the matter potential has {} entries",
                    self.physics.matter_potential.dimension()
                ),
            ));
        }
        MatterPotential::new(self.physics.matter_potential.diagonal().to_vec())?;

        let mass_states = self.oscillation.mass_states;
        if mass_states == 0 || mass_states > dimension {
            return Err(NuisanceError::configuration(
                "CONFIG.MASS_STATES",
                format!("mass_states must be in 1..={dimension}, got {mass_states}"),
            ));
        }

        Ok(())
    }

    pub fn to_json_pretty(&self) -> NuisanceResult<String> {
        serde_json::to_string_pretty(self).map_err(|error| {
            NuisanceError::internal("INTERNAL.CONFIG_SERIALIZE", error.to_string())
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("failed to read configuration '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse configuration '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl From<ConfigLoadError> for NuisanceError {
    fn from(error: ConfigLoadError) -> Self {
        match &error {
            ConfigLoadError::Read { .. } => {
                NuisanceError::io_system("IO.CONFIG_READ", error.to_string())
            }
            ConfigLoadError::Parse { .. } => {
                NuisanceError::configuration("CONFIG.PARSE", error.to_string())
            }
        }
    }
}

pub fn load_config(path: impl AsRef<Path>) -> Result<NuisanceConfig, ConfigLoadError> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|source| ConfigLoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&source).map_err(|source| ConfigLoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes the effective configuration as pretty JSON.
pub fn dump_config(config: &NuisanceConfig, path: impl AsRef<Path>) -> NuisanceResult<()> {
    let path = path.as_ref();
    let content = config.to_json_pretty()?;
    write_text_artifact(path, &content).map_err(|error| {
        NuisanceError::io_system(
            "IO.CONFIG_DUMP",
            format!("failed to write configuration '{}': {error}", path.display()),
        )
    })
}
