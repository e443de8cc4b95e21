use super::CliError;
use super::helpers::init_logging;
use anyhow::Context;
use nuisance_core::common::{
    GeneralConfig, NuisanceConfig, PhysicsParameters, dump_config, load_config,
};
use nuisance_core::domain::{ExecutionMode, Flavor, NuisanceError, ParticleKind};
use nuisance_core::oscillation::{OscillationGrids, WavePacketInput, wp_prob, write_run_artifact};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

#[derive(clap::Args)]
pub(super) struct GridArgs {
    /// JSON configuration; defaults reproduce the reference setup
    #[arg(long)]
    config: Option<PathBuf>,

    /// Run artifact output path
    #[arg(long, default_value = "oscillation-grids.json")]
    output: PathBuf,

    /// Sweep zenith rows on the calling thread only
    #[arg(long)]
    serial: bool,

    /// Also write the effective configuration here
    #[arg(long)]
    dump_config: Option<PathBuf>,
}

#[derive(clap::Args)]
pub(super) struct ProbabilityArgs {
    /// Source flavor (e, mu, tau)
    #[arg(long = "from")]
    source: Flavor,

    /// Destination flavor (e, mu, tau)
    #[arg(long = "to")]
    destination: Flavor,

    /// Neutrino energy in GeV
    #[arg(long, allow_negative_numbers = true)]
    energy: f64,

    /// Travel distance in km
    #[arg(long, allow_negative_numbers = true)]
    distance: f64,

    /// Antineutrino instead of neutrino
    #[arg(long)]
    anti: bool,

    /// Include the Earth matter potential
    #[arg(long)]
    matter: bool,
}

#[derive(Debug, Serialize)]
struct ProbabilityReport {
    from: Flavor,
    to: Flavor,
    energy_gev: f64,
    distance_km: f64,
    anti: i32,
    matter: bool,
    probability: f64,
}

pub(super) fn run_grid_command(args: GridArgs, verbose: bool) -> Result<i32, CliError> {
    let mut config = match &args.config {
        Some(path) => load_config(path).map_err(NuisanceError::from)?,
        None => NuisanceConfig::default(),
    };
    if args.serial {
        config.oscillation.execution_mode = ExecutionMode::Serial;
    }
    init_logging(verbose, &config.general)?;
    if let Some(path) = &args.config {
        info!(config = %path.display(), "Loaded configuration");
    }

    let grids = OscillationGrids::from_config(&config)?;
    write_run_artifact(&args.output, &config, &grids)?;
    if let Some(path) = &args.dump_config {
        dump_config(&config, path)?;
    }

    println!(
        "Wrote {} x {} {} grids ({}) to {}",
        grids.cos_zenith().len(),
        grids.energy_grid().len(),
        if grids.matter_enabled() { "matter" } else { "vacuum" },
        match grids.kind() {
            ParticleKind::Neutrino => "neutrino",
            ParticleKind::Antineutrino => "antineutrino",
        },
        args.output.display()
    );
    Ok(0)
}

pub(super) fn run_probability_command(
    args: ProbabilityArgs,
    verbose: bool,
) -> Result<i32, CliError> {
    init_logging(verbose, &GeneralConfig::default())?;

    let physics = PhysicsParameters::default();
    let kind = if args.anti {
        ParticleKind::Antineutrino
    } else {
        ParticleKind::Neutrino
    };
    let matter = args.matter.then_some(&physics.matter_potential);
    let input = WavePacketInput::new(&physics.mixing, physics.masses.values(), matter, kind);

    let probability = wp_prob(
        args.source.index(),
        args.destination.index(),
        args.energy,
        args.distance,
        input,
    )?;

    let report = ProbabilityReport {
        from: args.source,
        to: args.destination,
        energy_gev: args.energy,
        distance_km: args.distance,
        anti: kind.anti(),
        matter: args.matter,
        probability,
    };
    let rendered =
        serde_json::to_string_pretty(&report).context("failed to render probability report")?;
    println!("{rendered}");
    Ok(0)
}

pub(super) fn run_config_command(verbose: bool) -> Result<i32, CliError> {
    init_logging(verbose, &GeneralConfig::default())?;
    println!("{}", NuisanceConfig::default().to_json_pretty()?);
    Ok(0)
}
