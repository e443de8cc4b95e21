use super::grid::{OscillationGrids, ProbabilityGrid};
use crate::common::config::NuisanceConfig;
use crate::domain::{Flavor, NuisanceError, NuisanceResult};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub fn normalize_text_artifact(content: &str) -> String {
    let mut normalized = content.replace("\r\n", "\n").replace('\r', "\n");
    if !normalized.is_empty() && !normalized.ends_with('\n') {
        normalized.push('\n');
    }
    normalized
}

pub fn write_text_artifact(path: &Path, content: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, normalize_text_artifact(content))
}

/// JSON layout of one grid run: `surfaces[source][destination]` holds one
/// row per cos-zenith value, each row ordered like `energy_grid`.
#[derive(Debug, Serialize)]
pub struct RunArtifact<'a> {
    pub config: &'a NuisanceConfig,
    pub anti: i32,
    pub matter: bool,
    pub energy_grid: &'a [f64],
    pub cos_zenith: &'a [f64],
    pub surfaces: BTreeMap<&'static str, BTreeMap<&'static str, Vec<&'a [f64]>>>,
}

impl<'a> RunArtifact<'a> {
    pub fn new(config: &'a NuisanceConfig, grids: &'a OscillationGrids) -> Self {
        let surfaces = Flavor::ALL
            .iter()
            .map(|source| {
                let surface = grids.surface(*source);
                let destinations: BTreeMap<_, _> = Flavor::ALL
                    .iter()
                    .map(|destination| (destination.as_str(), grid_rows(surface.to(*destination))))
                    .collect();
                (source.as_str(), destinations)
            })
            .collect();

        Self {
            config,
            anti: grids.kind().anti(),
            matter: grids.matter_enabled(),
            energy_grid: grids.energy_grid(),
            cos_zenith: grids.cos_zenith(),
            surfaces,
        }
    }

    pub fn to_json(&self) -> NuisanceResult<String> {
        serde_json::to_string(self).map_err(|error| {
            NuisanceError::internal("INTERNAL.ARTIFACT_SERIALIZE", error.to_string())
        })
    }
}

fn grid_rows(grid: &ProbabilityGrid) -> Vec<&[f64]> {
    grid.rows().collect()
}

pub fn write_run_artifact(
    path: &Path,
    config: &NuisanceConfig,
    grids: &OscillationGrids,
) -> NuisanceResult<()> {
    let content = RunArtifact::new(config, grids).to_json()?;
    write_text_artifact(path, &content).map_err(|error| {
        NuisanceError::io_system(
            "IO.ARTIFACT_WRITE",
            format!("failed to write run artifact '{}': {error}", path.display()),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::{normalize_text_artifact, write_run_artifact, write_text_artifact};
    use crate::common::config::{GridSpec, NuisanceConfig};
    use crate::domain::ExecutionMode;
    use crate::oscillation::grid::OscillationGrids;
    use serde_json::Value;
    use std::fs;
    use tempfile::TempDir;

    fn small_config() -> NuisanceConfig {
        let mut config = NuisanceConfig::default();
        config.oscillation.energy_grid = GridSpec::Values(vec![0.5, 1.0, 5.0, 20.0]);
        config.oscillation.angle_grid = GridSpec::Linear {
            start: -1.0,
            stop: 1.0,
            count: 3,
        };
        config.oscillation.execution_mode = ExecutionMode::Serial;
        config
    }

    #[test]
    fn normalize_text_artifact_uses_canonical_line_endings() {
        let normalized = normalize_text_artifact("alpha\r\nbeta\rgamma");
        assert_eq!(normalized, "alpha\nbeta\ngamma\n");
        assert_eq!(normalize_text_artifact(""), "");
    }

    #[test]
    fn text_writes_create_parent_directories_and_are_repeatable() {
        let temp = TempDir::new().expect("tempdir should be created");
        let path = temp.path().join("nested").join("artifact.json");

        write_text_artifact(&path, "{}\r\n").expect("first write should succeed");
        let first = fs::read(&path).expect("artifact should be readable");
        write_text_artifact(&path, "{}\r\n").expect("second write should succeed");
        let second = fs::read(&path).expect("artifact should be readable");

        assert_eq!(first, second);
        assert_eq!(second, b"{}\n");
    }

    #[test]
    fn run_artifact_nests_rows_by_source_and_destination() {
        let temp = TempDir::new().expect("tempdir should be created");
        let path = temp.path().join("run.json");
        let config = small_config();
        let grids = OscillationGrids::from_config(&config).expect("grids");

        write_run_artifact(&path, &config, &grids).expect("artifact should be written");
        let artifact: Value =
            serde_json::from_str(&fs::read_to_string(&path).expect("read")).expect("json");

        assert_eq!(artifact["anti"], 1);
        assert_eq!(artifact["matter"], true);
        assert_eq!(artifact["config"]["general"]["random_seed"], 1337);
        assert_eq!(artifact["energy_grid"].as_array().map(Vec::len), Some(4));
        assert_eq!(artifact["cos_zenith"].as_array().map(Vec::len), Some(3));

        for source in ["e", "mu", "tau"] {
            let rows = artifact["surfaces"][source]["mu"]
                .as_array()
                .expect("rows should be an array");
            assert_eq!(rows.len(), 3);
            assert!(
                rows.iter()
                    .all(|row| row.as_array().map(Vec::len) == Some(4))
            );
        }

        let stored = artifact["surfaces"]["mu"]["e"][2][1].as_f64().expect("cell");
        let expected = grids
            .muon()
            .to(crate::domain::Flavor::E)
            .get(2, 1)
            .expect("cell");
        assert!((stored - expected).abs() < 1.0e-12);
    }
}
