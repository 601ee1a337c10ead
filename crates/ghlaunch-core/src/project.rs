use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::errors::{LaunchError, Result};

/// Ghidra project file suffix, without the leading dot.
pub const PROJECT_EXTENSION: &str = "gpr";

/// Where the analysis results of one invocation are stored.
///
/// Derived once per run and never written back anywhere. `file` is
/// `directory/<name>.gpr` for every descriptor produced by [`resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDescriptor {
    pub name: String,
    pub directory: PathBuf,
    pub file: PathBuf,
}

/// Compute a project file path for `target` that does not exist yet.
///
/// With `use_temporary` the project goes to `temp_dir/<basename>.gpr`,
/// otherwise next to the target as `<target>.gpr` (directory `.` when the
/// target has no parent). Nothing is created on disk; the returned path is
/// only guaranteed free at the moment of the call.
///
/// Targets whose name already contains `.gpr` are resolved like any other
/// file. Telling existing projects apart is the caller's job.
pub fn resolve(target: &Path, use_temporary: bool, temp_dir: &Path) -> Result<ProjectDescriptor> {
    if target.as_os_str().is_empty() {
        return Err(LaunchError::InvalidPath("empty path".into()));
    }
    let file_name = target.file_name().ok_or_else(|| {
        LaunchError::InvalidPath(format!("{} has no file name component", target.display()))
    })?;
    // The project name is handed to Ghidra as text; it must match the file on disk.
    if file_name.to_str().is_none() {
        return Err(LaunchError::InvalidPath(format!("{} is not valid UTF-8", target.display())));
    }

    let mut project_file_name = file_name.to_os_string();
    project_file_name.push(".");
    project_file_name.push(PROJECT_EXTENSION);

    let (candidate, directory) = if use_temporary {
        (temp_dir.join(&project_file_name), temp_dir.to_path_buf())
    } else {
        let directory = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        (target.with_file_name(&project_file_name), directory)
    };

    let file = uniquify(&candidate);
    let name = file
        .file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_owned)
        .ok_or_else(|| LaunchError::InvalidPath(format!("{} has no file stem", file.display())))?;

    tracing::debug!(project = %file.display(), name = %name, directory = %directory.display(), "resolved project");
    Ok(ProjectDescriptor { name, directory, file })
}

/// Return `candidate` if nothing exists there, else the first free
/// `<stem>.<n>.<ext>` sibling for n = 0, 1, 2, ...
///
/// Existence is re-checked for every candidate. Dangling symlinks count as taken.
pub fn uniquify(candidate: &Path) -> PathBuf {
    if !entry_exists(candidate) {
        return candidate.to_path_buf();
    }

    let stem = candidate.file_stem().map(|s| s.to_os_string()).unwrap_or_default();
    let extension = candidate.extension();
    let mut n: u64 = 0;
    loop {
        let mut name: OsString = stem.clone();
        name.push(format!(".{n}"));
        if let Some(ext) = extension {
            name.push(".");
            name.push(ext);
        }
        let next = candidate.with_file_name(name);
        if !entry_exists(&next) {
            tracing::debug!(taken = %candidate.display(), chosen = %next.display(), "project path already in use");
            return next;
        }
        n += 1;
    }
}

fn entry_exists(path: &Path) -> bool {
    std::fs::symlink_metadata(path).is_ok()
}
