pub mod errors;

pub use errors::{
    ComputeResult, ConfigResult, NuisanceError, NuisanceErrorCategory, NuisanceResult,
};

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    Serial,
    #[default]
    Parallel,
}

/// Standard-model flavor states, indexed the way the flavor basis rows are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Flavor {
    #[serde(alias = "electron")]
    E,
    #[serde(alias = "muon")]
    Mu,
    Tau,
}

impl Flavor {
    pub const ALL: [Flavor; 3] = [Flavor::E, Flavor::Mu, Flavor::Tau];

    pub const fn index(self) -> usize {
        match self {
            Self::E => 0,
            Self::Mu => 1,
            Self::Tau => 2,
        }
    }

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::E),
            1 => Some(Self::Mu),
            2 => Some(Self::Tau),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::E => "e",
            Self::Mu => "mu",
            Self::Tau => "tau",
        }
    }
}

impl Display for Flavor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

impl FromStr for Flavor {
    type Err = NuisanceError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "e" | "electron" | "nu_e" => Ok(Self::E),
            "mu" | "muon" | "nu_mu" => Ok(Self::Mu),
            "tau" | "nu_tau" => Ok(Self::Tau),
            other => Err(NuisanceError::configuration(
                "CONFIG.FLAVOR",
                format!("unknown flavor '{other}', expected one of e, mu, tau"),
            )),
        }
    }
}

/// Neutrino or antineutrino; the sign flips the CP phase and the matter term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ParticleKind {
    #[default]
    Neutrino,
    Antineutrino,
}

impl ParticleKind {
    pub const fn sign(self) -> f64 {
        match self {
            Self::Neutrino => 1.0,
            Self::Antineutrino => -1.0,
        }
    }

    pub const fn anti(self) -> i32 {
        match self {
            Self::Neutrino => 1,
            Self::Antineutrino => -1,
        }
    }

    pub fn from_anti(anti: i32) -> NuisanceResult<Self> {
        match anti {
            1 => Ok(Self::Neutrino),
            -1 => Ok(Self::Antineutrino),
            other => Err(NuisanceError::physics_constraint(
                "PHYSICS.ANTI_FLAG",
                format!("The parameter anti is set to {other}. It has to be either 1 or -1!"),
            )),
        }
    }
}

impl TryFrom<i32> for ParticleKind {
    type Error = NuisanceError;

    fn try_from(anti: i32) -> Result<Self, Self::Error> {
        Self::from_anti(anti)
    }
}

impl From<ParticleKind> for i32 {
    fn from(kind: ParticleKind) -> Self {
        kind.anti()
    }
}

impl Serialize for ParticleKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_i32(self.anti())
    }
}

impl<'de> Deserialize<'de> for ParticleKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let anti = i32::deserialize(deserializer)?;
        Self::from_anti(anti).map_err(|error| serde::de::Error::custom(error.message().to_string()))
    }
}
