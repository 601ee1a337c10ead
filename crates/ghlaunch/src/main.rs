use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

mod console;
mod doctor;
mod file_type;
mod init;
mod launch;
mod target;

use ghlaunch_core::config::{load_config, AppConfig};

#[derive(Parser)]
#[command(
    name = "ghlaunch",
    version,
    about = "Create a Ghidra project for a binary, run headless analysis and open it in the GUI. \
             Existing project files (.gpr) are opened directly.",
    subcommand_negates_reqs = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    launch: LaunchArgs,

    /// Ghidra installation directory
    #[arg(long, global = true, env = "GHIDRA_INSTALL_DIR")]
    ghidra_dir: Option<PathBuf>,

    /// Config file (default: ~/.ghlaunch/config.toml)
    #[arg(long, global = true, env = "GHLAUNCH_CONFIG")]
    config: Option<PathBuf>,

    /// Debug logging on stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Args, Debug, Clone)]
pub struct LaunchArgs {
    /// Target binary, project file (.gpr) or directory (write ./doctor or ./init for files with those names)
    #[arg(required = true)]
    pub target: Option<PathBuf>,

    /// Create the project in the temp directory instead of next to the target
    #[arg(short, long)]
    pub temp: bool,

    /// Start analysis without the cancellation countdown
    #[arg(short = 'y', long)]
    pub no_wait: bool,

    /// Countdown length in seconds (overrides countdown_seconds)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the Ghidra install, file utility and config
    Doctor,
    /// Write a default config file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        console::error(&format!("error: {:#}", e));
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::WARN };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config_path = match cli.config {
        Some(path) => path,
        None => ghlaunch_core::storage::default_config_path()?,
    };
    match cli.command {
        Some(Commands::Doctor) => doctor::run(&config_path, cli.ghidra_dir),
        Some(Commands::Init { force }) => init::run(&config_path, force),
        None => {
            let config = effective_config(&config_path, cli.ghidra_dir)?;
            launch::run(&cli.launch, &config)
        }
    }
}

/// Config file values with command-line / environment overrides applied.
pub fn effective_config(config_path: &Path, ghidra_dir: Option<PathBuf>) -> Result<AppConfig> {
    let mut config = load_config(config_path)?;
    if let Some(dir) = ghidra_dir {
        config.ghidra_install_dir = Some(dir);
    }
    tracing::debug!(?config, config_path = %config_path.display(), "configuration loaded");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_target_with_flags() {
        let cli = Cli::try_parse_from(["ghlaunch", "-t", "-y", "--timeout", "5", "sample.bin"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.launch.target, Some(PathBuf::from("sample.bin")));
        assert!(cli.launch.temp);
        assert!(cli.launch.no_wait);
        assert_eq!(cli.launch.timeout, Some(5));
    }

    #[test]
    fn test_target_required_without_subcommand() {
        assert!(Cli::try_parse_from(["ghlaunch"]).is_err());
    }

    #[test]
    fn test_dot_slash_prefix_selects_target_named_like_subcommand() {
        let cli = Cli::try_parse_from(["ghlaunch", "-y", "./doctor"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.launch.target, Some(PathBuf::from("./doctor")));
    }

    #[test]
    fn test_subcommand_without_target() {
        let cli = Cli::try_parse_from(["ghlaunch", "init", "--force"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Init { force: true })));
    }

    #[test]
    fn test_effective_config_applies_ghidra_dir_override() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "ghidra_install_dir = \"/from/file\"\ncountdown_seconds = 7\n").unwrap();

        let cfg = effective_config(&path, Some(PathBuf::from("/from/flag"))).unwrap();
        assert_eq!(cfg.ghidra_install_dir, Some(PathBuf::from("/from/flag")));
        assert_eq!(cfg.countdown_seconds, 7);

        let cfg = effective_config(&path, None).unwrap();
        assert_eq!(cfg.ghidra_install_dir, Some(PathBuf::from("/from/file")));
    }
}
