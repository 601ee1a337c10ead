use anyhow::{bail, Context, Result};
use std::io::{self, BufRead, Write};
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use ghlaunch_core::config::AppConfig;
use ghlaunch_core::gate::{self, await_cancellation};
use ghlaunch_core::ghidra::GhidraTool;
use ghlaunch_core::project::resolve;

use crate::console;
use crate::file_type;
use crate::target::{classify, TargetKind};
use crate::LaunchArgs;

pub fn run(args: &LaunchArgs, config: &AppConfig) -> Result<()> {
    let target = args.target.as_deref().context("no target given")?;
    if std::fs::symlink_metadata(target).is_err() {
        bail!("target {} does not exist", target.display());
    }
    let tool = GhidraTool::from_config(config)?;

    file_type::print_file_type(config, target);
    let target = absolute(target)?;

    match classify(&target) {
        TargetKind::Directory => {
            console::warn("The target path is not a project file nor a binary!");
            let stdin = io::stdin();
            if confirm("Launch Ghidra anyway? [Y/n] ", &mut stdin.lock())? {
                launch_gui(&tool, None)?;
            }
            Ok(())
        }
        TargetKind::ExistingProject => launch_gui(&tool, Some(&target)),
        TargetKind::Binary => analyze_and_open(&tool, &target, args, config),
    }
}

fn analyze_and_open(tool: &GhidraTool, target: &Path, args: &LaunchArgs, config: &AppConfig) -> Result<()> {
    let project = resolve(target, args.temp, &config.temp_dir)?;

    if !args.no_wait {
        let timeout = args.timeout.map(Duration::from_secs).unwrap_or_else(|| config.countdown());
        let mut watcher = gate::stdin_watcher();
        let cancelled = await_cancellation(&mut watcher, timeout, console::info)
            .context("cannot watch standard input for cancellation (use --no-wait to skip the countdown)")?;
        if cancelled {
            console::warn("Analysis cancelled.");
            return Ok(());
        }
    }

    if args.temp {
        std::fs::create_dir_all(&project.directory)
            .with_context(|| format!("cannot create {}", project.directory.display()))?;
    }
    tool.run_headless(&project, target)?;
    console::detail(&format!("Analysis completed. Created project: {}", project.file.display()));
    launch_gui(tool, Some(&project.file))
}

fn launch_gui(tool: &GhidraTool, project: Option<&Path>) -> Result<()> {
    console::info(if project.is_some() { "Loading the project..." } else { "Launching Ghidra..." });
    tool.launch(project)?;
    Ok(())
}

/// Ask a yes/no question. An empty answer means yes, end of input means no.
pub fn confirm(question: &str, input: &mut impl BufRead) -> Result<bool> {
    print!("{}", question);
    io::stdout().flush()?;
    let mut answer = String::new();
    if input.read_line(&mut answer)? == 0 {
        return Ok(false);
    }
    let answer = answer.trim().to_lowercase();
    Ok(answer.is_empty() || answer.starts_with('y'))
}

/// Absolute form of `path` with `.` and `..` folded away. Symlinks are left alone.
pub fn absolute(path: &Path) -> Result<PathBuf> {
    let joined = if path.is_absolute() { path.to_path_buf() } else { std::env::current_dir()?.join(path) };
    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    Ok(normalized)
}
