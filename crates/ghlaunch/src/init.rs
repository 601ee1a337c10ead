use anyhow::{bail, Result};
use std::path::Path;

use ghlaunch_core::config::{write_config, AppConfig};

pub fn run(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", config_path.display());
    }
    write_config(config_path, &AppConfig::default())?;
    eprintln!("[ghlaunch] Wrote default config to {}", config_path.display());
    eprintln!("[ghlaunch] Set ghidra_install_dir there or export GHIDRA_INSTALL_DIR");
    Ok(())
}
