use anyhow::Context;
use nuisance_core::common::GeneralConfig;
use std::fs::File;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. `RUST_LOG` wins over the configured level;
/// `--verbose` forces debug. Events go to stderr unless a log file is set.
pub(super) fn init_logging(verbose: bool, general: &GeneralConfig) -> anyhow::Result<()> {
    if !general.enable_logging && !verbose {
        return Ok(());
    }

    let level = if verbose { "debug" } else { general.log_level.as_str() };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let installed = match &general.log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create log file '{}'", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init(),
    };
    if installed.is_err() {
        tracing::debug!("global subscriber already installed");
    }
    Ok(())
}
