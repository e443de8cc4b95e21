//! Wave-packet oscillation engine: mixing and mass matrices, the effective
//! Hamiltonian, transition probabilities and zenith/energy grids.

pub mod grid;
pub mod hamiltonian;
pub mod matrices;
pub mod probability;
pub mod serialization;

pub use grid::{
    OscillationGrids, ProbabilityGrid, ProbabilitySurface, compute_grid, compute_grid_effective,
    compute_grid_with_mode, slant_distance, slant_distance_km,
};
pub use hamiltonian::{
    EffectiveBasis, MatterPotential, MatterScaling, PropagationBasis, diagonalize_hamiltonian,
    effective_hamiltonian, effective_matrices, effective_matrices_at,
};
pub use matrices::{
    MassParameters, MixingParameter, build_mass_matrix, build_mixing_matrix, build_rotation,
    mixing_dimension, validate_mixing_parameters,
};
pub use probability::{
    OscillationProbabilityApi, WavePacketInput, mass_difference, natural_distance,
    oscillation_length, transition_probability, wp_prob, wp_prob_effective,
};
pub use serialization::{RunArtifact, write_run_artifact, write_text_artifact};
