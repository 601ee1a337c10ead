use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use anyhow::Result;

pub const CONFIG_FILE: &str = "config.toml";

pub fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp_path = path.with_extension("tmp");
    let mut file = fs::File::create(&tmp_path)?;
    file.write_all(content)?;
    file.sync_all()?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Returns the ghlaunch data directory (`~/.ghlaunch/`). Does not create it.
pub fn ghlaunch_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| anyhow::anyhow!("HOME directory not found"))?;
    Ok(ghlaunch_dir_with_home(&home))
}

/// Testable inner function that accepts a custom home directory.
pub fn ghlaunch_dir_with_home(home: &Path) -> PathBuf {
    home.join(".ghlaunch")
}

/// Default location of the config file: `~/.ghlaunch/config.toml`.
pub fn default_config_path() -> Result<PathBuf> {
    Ok(ghlaunch_dir()?.join(CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_atomic_write_creates_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        atomic_write(&path, b"hello").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "hello");
    }

    #[test]
    fn test_atomic_write_no_tmp_file_left() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        atomic_write(&path, b"data").unwrap();
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_atomic_write_creates_parent_dirs() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join(".ghlaunch").join("config.toml");
        atomic_write(&path, b"x").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_ghlaunch_dir_with_home() {
        let tmp = TempDir::new().unwrap();
        let dir = ghlaunch_dir_with_home(tmp.path());
        assert_eq!(dir, tmp.path().join(".ghlaunch"));
        assert!(!dir.exists());
    }
}
