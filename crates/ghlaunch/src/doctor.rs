use anyhow::Result;
use std::fmt;
use std::path::{Path, PathBuf};

use ghlaunch_core::config::AppConfig;
use ghlaunch_core::ghidra::GhidraTool;

pub enum CheckResult {
    Ok(String),
    Warn(String),
    Fail(String),
}

impl fmt::Display for CheckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckResult::Ok(msg) => write!(f, "  [OK]   {}", msg),
            CheckResult::Warn(msg) => write!(f, "  [WARN] {}", msg),
            CheckResult::Fail(msg) => write!(f, "  [FAIL] {}", msg),
        }
    }
}

pub fn run(config_path: &Path, ghidra_dir: Option<PathBuf>) -> Result<()> {
    eprintln!("ghlaunch doctor report:");
    let (config, mut checks) = match crate::effective_config(config_path, ghidra_dir) {
        Ok(cfg) => (cfg, vec![check_config_file(config_path)]),
        Err(e) => (AppConfig::default(), vec![CheckResult::Fail(format!("Config: {:#}", e))]),
    };
    checks.extend(check_ghidra(&config));
    checks.push(check_file_utility(&config));
    checks.push(check_temp_dir(&config.temp_dir));

    let mut has_fail = false;
    for check in &checks {
        eprintln!("{}", check);
        if matches!(check, CheckResult::Fail(_)) { has_fail = true; }
    }
    eprintln!("  [{}] Overall: {}", if has_fail {"FAIL"} else {"OK"}, if has_fail {"unhealthy"} else {"healthy"});
    Ok(())
}

fn check_config_file(path: &Path) -> CheckResult {
    if path.exists() {
        CheckResult::Ok(format!("Config: {}", path.display()))
    } else {
        CheckResult::Warn(format!("Config: {} not found, using defaults (run init)", path.display()))
    }
}

fn check_ghidra(config: &AppConfig) -> Vec<CheckResult> {
    let tool = match GhidraTool::from_config(config) {
        Ok(t) => t,
        Err(e) => return vec![CheckResult::Fail(e.to_string())],
    };
    if !tool.install_dir().is_dir() {
        return vec![CheckResult::Fail(format!("Ghidra install dir missing: {}", tool.install_dir().display()))];
    }
    vec![
        CheckResult::Ok(format!("Ghidra install dir: {}", tool.install_dir().display())),
        check_script("Launcher", &tool.launcher_path()),
        check_script("Headless analyzer", &tool.headless_path()),
    ]
}

fn check_script(label: &str, path: &Path) -> CheckResult {
    if path.is_file() {
        CheckResult::Ok(format!("{}: {}", label, path.display()))
    } else {
        CheckResult::Fail(format!("{} missing: {}", label, path.display()))
    }
}

fn check_file_utility(config: &AppConfig) -> CheckResult {
    match crate::file_type::locate(config) {
        Some(path) => CheckResult::Ok(format!("File utility: {}", path.display())),
        None => CheckResult::Warn(format!("File utility '{}' not found (file type output disabled)", config.file_utility)),
    }
}

fn check_temp_dir(dir: &Path) -> CheckResult {
    match std::fs::metadata(dir) {
        Ok(m) if m.is_dir() && !m.permissions().readonly() => CheckResult::Ok(format!("Temp dir: {}", dir.display())),
        Ok(m) if m.is_dir() => CheckResult::Warn(format!("Temp dir is read-only: {}", dir.display())),
        Ok(_) => CheckResult::Fail(format!("Temp dir is not a directory: {}", dir.display())),
        Err(_) => CheckResult::Warn(format!("Temp dir missing, created on first --temp run: {}", dir.display())),
    }
}
