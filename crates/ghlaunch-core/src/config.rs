use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Root of the Ghidra installation (the directory holding `ghidraRun`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ghidra_install_dir: Option<PathBuf>,
    /// Where `--temp` projects are created.
    #[serde(default = "default_temp_dir")]
    pub temp_dir: PathBuf,
    #[serde(default = "default_countdown_seconds")]
    pub countdown_seconds: u64,
    #[serde(default = "default_file_utility")]
    pub file_utility: String,
    /// Searched instead of PATH when non-empty.
    #[serde(default = "default_file_utility_search_dirs")]
    pub file_utility_search_dirs: Vec<PathBuf>,
}

fn default_temp_dir() -> PathBuf { std::env::temp_dir() }
fn default_countdown_seconds() -> u64 { 3 }
fn default_file_utility() -> String { "file".into() }

#[cfg(windows)]
fn default_file_utility_search_dirs() -> Vec<PathBuf> {
    vec![PathBuf::from(r"C:\Program Files\Git\usr\bin")]
}

#[cfg(not(windows))]
fn default_file_utility_search_dirs() -> Vec<PathBuf> { Vec::new() }

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ghidra_install_dir: None,
            temp_dir: default_temp_dir(),
            countdown_seconds: default_countdown_seconds(),
            file_utility: default_file_utility(),
            file_utility_search_dirs: default_file_utility_search_dirs(),
        }
    }
}

impl AppConfig {
    pub fn countdown(&self) -> Duration {
        Duration::from_secs(self.countdown_seconds)
    }
}

pub fn write_config(path: &Path, config: &AppConfig) -> Result<()> {
    let content = toml::to_string_pretty(config)?;
    crate::storage::atomic_write(path, content.as_bytes())
}

pub fn load_config(path: &Path) -> Result<AppConfig> {
    match std::fs::read_to_string(path) {
        Ok(content) => toml::from_str(&content)
            .with_context(|| format!("invalid config file {}", path.display())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            Ok(AppConfig::default())
        }
        Err(e) => Err(e).with_context(|| format!("cannot read config file {}", path.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_values() {
        let cfg = AppConfig::default();
        assert!(cfg.ghidra_install_dir.is_none());
        assert_eq!(cfg.countdown_seconds, 3);
        assert_eq!(cfg.countdown(), Duration::from_secs(3));
        assert_eq!(cfg.file_utility, "file");
        assert_eq!(cfg.temp_dir, std::env::temp_dir());
    }

    #[test]
    fn test_config_write_and_read() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        let cfg = AppConfig {
            ghidra_install_dir: Some(PathBuf::from("/opt/ghidra_11.0.3_PUBLIC")),
            countdown_seconds: 5,
            ..AppConfig::default()
        };
        write_config(&path, &cfg).unwrap();
        let loaded = load_config(&path).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn test_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let cfg = load_config(&tmp.path().join("nonexistent.toml")).unwrap();
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn test_config_partial_toml_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("partial.toml");
        std::fs::write(&path, "ghidra_install_dir = \"/usr/share/ghidra\"\n").unwrap();
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.ghidra_install_dir, Some(PathBuf::from("/usr/share/ghidra")));
        assert_eq!(cfg.countdown_seconds, 3);
        assert_eq!(cfg.file_utility, "file");
    }

    #[test]
    fn test_config_invalid_toml_errors_with_path() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("broken.toml");
        std::fs::write(&path, "countdown_seconds = \"soon\"\n").unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("broken.toml"));
    }
}
