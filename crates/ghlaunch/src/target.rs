use std::path::Path;

use ghlaunch_core::PROJECT_EXTENSION;

/// How a command-line target is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Directory,
    /// A file whose name contains `.gpr`; opened as-is.
    ExistingProject,
    Binary,
}

pub fn classify(path: &Path) -> TargetKind {
    if path.is_dir() {
        return TargetKind::Directory;
    }
    let marker = format!(".{}", PROJECT_EXTENSION);
    let is_project = path
        .file_name()
        .is_some_and(|name| name.to_string_lossy().contains(&marker));
    if is_project {
        TargetKind::ExistingProject
    } else {
        TargetKind::Binary
    }
}
