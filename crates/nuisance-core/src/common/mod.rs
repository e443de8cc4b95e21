pub mod config;
pub mod constants;

pub use config::{
    ConfigLoadError, GeneralConfig, GridSpec, NuisanceConfig, OscillationConfig,
    PhysicsParameters, dump_config, load_config,
};
