use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::AppConfig;
use crate::errors::{LaunchError, Result};
use crate::project::ProjectDescriptor;

#[cfg(windows)]
const SCRIPT_SUFFIX: &str = ".bat";
#[cfg(not(windows))]
const SCRIPT_SUFFIX: &str = "";

/// The two entry points of a Ghidra installation: `ghidraRun` (GUI) and
/// `support/analyzeHeadless` (batch import + analysis).
#[derive(Debug, Clone)]
pub struct GhidraTool {
    install_dir: PathBuf,
}

impl GhidraTool {
    pub fn new(install_dir: impl Into<PathBuf>) -> Self {
        Self { install_dir: install_dir.into() }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        config
            .ghidra_install_dir
            .as_deref()
            .map(Self::new)
            .ok_or_else(|| {
                LaunchError::Config(
                    "Ghidra install directory not set (use --ghidra-dir, GHIDRA_INSTALL_DIR or ghidra_install_dir in config.toml)".into(),
                )
            })
    }

    pub fn install_dir(&self) -> &Path {
        &self.install_dir
    }

    pub fn launcher_path(&self) -> PathBuf {
        self.install_dir.join(format!("ghidraRun{SCRIPT_SUFFIX}"))
    }

    pub fn headless_path(&self) -> PathBuf {
        self.install_dir.join("support").join(format!("analyzeHeadless{SCRIPT_SUFFIX}"))
    }

    /// `analyzeHeadless <dir> <name> -import <target>`
    pub fn headless_command(&self, project: &ProjectDescriptor, target: &Path) -> Command {
        let mut cmd = Command::new(self.headless_path());
        cmd.arg(&project.directory)
            .arg(&project.name)
            .arg("-import")
            .arg(target);
        cmd
    }

    /// `ghidraRun [project]`
    pub fn launch_command(&self, project: Option<&Path>) -> Command {
        let mut cmd = Command::new(self.launcher_path());
        if let Some(project) = project {
            cmd.arg(project);
        }
        cmd
    }

    /// Import and analyze `target` into `project`. Blocks until the headless run exits.
    pub fn run_headless(&self, project: &ProjectDescriptor, target: &Path) -> Result<()> {
        run_to_completion(self.headless_command(project, target), "analyzeHeadless")
    }

    /// Start the GUI, optionally opening `project`.
    pub fn launch(&self, project: Option<&Path>) -> Result<()> {
        run_to_completion(self.launch_command(project), "ghidraRun")
    }
}

fn run_to_completion(mut cmd: Command, tool: &str) -> Result<()> {
    tracing::info!(program = %cmd.get_program().to_string_lossy(), args = ?cmd.get_args().collect::<Vec<_>>(), "running {}", tool);
    let status = match cmd.status() {
        Ok(status) => status,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(LaunchError::ToolNotFound(cmd.get_program().to_string_lossy().into_owned()));
        }
        Err(e) => return Err(e.into()),
    };
    if !status.success() {
        return Err(LaunchError::ToolFailed { tool: tool.into(), status: status.to_string() });
    }
    Ok(())
}
