use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

use ghlaunch_core::config::AppConfig;

use crate::console;

/// Find the file-type utility, in `file_utility_search_dirs` if any are configured, else on PATH.
pub fn locate(config: &AppConfig) -> Option<PathBuf> {
    if config.file_utility_search_dirs.is_empty() {
        return which::which(&config.file_utility).ok();
    }
    let paths = std::env::join_paths(&config.file_utility_search_dirs).ok()?;
    let cwd = std::env::current_dir().ok()?;
    which::which_in(&config.file_utility, Some(paths), cwd).ok()
}

/// Run `utility <target>` and return its trimmed stdout.
pub fn describe(utility: &Path, target: &Path) -> Result<String> {
    let output = Command::new(utility)
        .arg(target)
        .output()
        .with_context(|| format!("failed to run {}", utility.display()))?;
    if !output.status.success() {
        bail!(
            "{} exited with {}: {}",
            utility.display(),
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim_end().to_string())
}

/// Print what the file utility says about `target`. Never fails the run.
pub fn print_file_type(config: &AppConfig, target: &Path) {
    let Some(utility) = locate(config) else {
        console::warn("The file utility was not found on the system!");
        return;
    };
    match describe(&utility, target) {
        Ok(description) => console::detail(&description),
        Err(e) => {
            tracing::warn!(error = %e, "file type detection failed");
            console::warn(&format!("File type detection failed: {:#}", e));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_locate_in_empty_search_dir() {
        let tmp = TempDir::new().unwrap();
        let cfg = AppConfig {
            file_utility: "ghlaunch-no-such-utility".into(),
            file_utility_search_dirs: vec![tmp.path().to_path_buf()],
            ..AppConfig::default()
        };
        assert!(locate(&cfg).is_none());
    }

    #[test]
    fn test_locate_missing_on_path() {
        let cfg = AppConfig { file_utility: "ghlaunch-no-such-utility".into(), ..AppConfig::default() };
        assert!(locate(&cfg).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_locate_prefers_search_dirs() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let utility = tmp.path().join("file");
        std::fs::write(&utility, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&utility, std::fs::Permissions::from_mode(0o755)).unwrap();
        let cfg = AppConfig { file_utility_search_dirs: vec![tmp.path().to_path_buf()], ..AppConfig::default() };
        assert_eq!(locate(&cfg), Some(utility));
    }

    #[test]
    fn test_describe_missing_utility_errors() {
        let err = describe(Path::new("/nonexistent/ghlaunch-file"), Path::new("x")).unwrap_err();
        assert!(err.to_string().contains("failed to run"));
    }
}
