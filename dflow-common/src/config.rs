//! Configuration loading and data root resolution
//!
//! The data root is the folder holding the `staging/`, `success/`,
//! `failure/` and `logs/` trees that packages move between.

use crate::{Error, Result};
use std::path::PathBuf;

/// Data root resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file (`data_root` key)
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_data_root(cli_arg: Option<&str>, env_var_name: &str) -> Result<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Ok(PathBuf::from(path));
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        return Ok(PathBuf::from(path));
    }

    // Priority 3: TOML config file
    if let Ok(config_path) = locate_config_file() {
        if let Ok(toml_content) = std::fs::read_to_string(&config_path) {
            if let Ok(config) = toml::from_str::<toml::Value>(&toml_content) {
                if let Some(data_root) = config.get("data_root").and_then(|v| v.as_str()) {
                    return Ok(PathBuf::from(data_root));
                }
            }
        }
    }

    // Priority 4: OS-dependent compiled default
    Ok(default_data_root())
}

/// Get configuration file path for the platform
fn locate_config_file() -> Result<PathBuf> {
    if cfg!(target_os = "linux") {
        // Try ~/.config/dflow/config.toml first, then /etc/dflow/config.toml
        let user_config = dirs::config_dir().map(|d| d.join("dflow").join("config.toml"));
        let system_config = PathBuf::from("/etc/dflow/config.toml");

        if let Some(path) = user_config {
            if path.exists() {
                return Ok(path);
            }
        }
        if system_config.exists() {
            return Ok(system_config);
        }
        return Err(Error::Config("No config file found".to_string()));
    }

    let config_path = dirs::config_dir()
        .map(|d| d.join("dflow").join("config.toml"))
        .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;

    if config_path.exists() {
        Ok(config_path)
    } else {
        Err(Error::Config(format!(
            "Config file not found: {:?}",
            config_path
        )))
    }
}

/// Get OS-dependent default data root path
fn default_data_root() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/dflow (or /var/lib/dflow for system-wide)
        dirs::data_local_dir()
            .map(|d| d.join("dflow"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/dflow"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("dflow"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/dflow"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("dflow"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\dflow"))
    } else {
        PathBuf::from("./dflow_data")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn cli_argument_wins_over_environment() {
        std::env::set_var("DFLOW_TEST_DATA_ROOT", "/from/env");
        let resolved = resolve_data_root(Some("/from/cli"), "DFLOW_TEST_DATA_ROOT").unwrap();
        std::env::remove_var("DFLOW_TEST_DATA_ROOT");
        assert_eq!(resolved, PathBuf::from("/from/cli"));
    }

    #[test]
    #[serial]
    fn environment_used_when_no_cli_argument() {
        std::env::set_var("DFLOW_TEST_DATA_ROOT", "/from/env");
        let resolved = resolve_data_root(None, "DFLOW_TEST_DATA_ROOT").unwrap();
        std::env::remove_var("DFLOW_TEST_DATA_ROOT");
        assert_eq!(resolved, PathBuf::from("/from/env"));
    }

    #[test]
    #[serial]
    fn falls_back_to_default_without_cli_or_env() {
        std::env::remove_var("DFLOW_TEST_DATA_ROOT");
        let resolved = resolve_data_root(None, "DFLOW_TEST_DATA_ROOT").unwrap();
        // Exact path is platform dependent; it must at least name dflow
        // unless a config file on the machine overrides it.
        assert!(!resolved.as_os_str().is_empty());
    }
}
