use std::path::{Path, PathBuf};

use crate::config::types::ScriptboxConfig;
use crate::error::{Result, ScriptboxError};

/// Get the default configuration file path
pub fn get_config_path() -> PathBuf {
    if let Some(proj_dirs) = directories::ProjectDirs::from("com", "scriptbox", "scriptbox") {
        proj_dirs.config_dir().join("config.toml")
    } else {
        // Fallback to home directory
        dirs_fallback().join(".scriptbox").join("config.toml")
    }
}

fn dirs_fallback() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

/// Load configuration from file, with defaults for missing values
pub fn load_config(config_path: Option<&Path>) -> Result<ScriptboxConfig> {
    let path = config_path
        .map(PathBuf::from)
        .unwrap_or_else(get_config_path);

    if !path.exists() {
        // Return defaults if no config file exists
        return Ok(ScriptboxConfig::default());
    }

    let content = std::fs::read_to_string(&path)?;
    let config: ScriptboxConfig =
        toml::from_str(&content).map_err(|e| ScriptboxError::TomlParse(e.to_string()))?;

    Ok(config)
}

/// Get the data directory for workspace storage
pub fn get_data_dir() -> PathBuf {
    if let Some(proj_dirs) = directories::ProjectDirs::from("com", "scriptbox", "scriptbox") {
        proj_dirs.data_dir().to_path_buf()
    } else {
        dirs_fallback().join(".local").join("share").join("scriptbox")
    }
}

/// Default workspace directory when none is configured
pub fn default_workspace_dir() -> PathBuf {
    get_data_dir().join("workspace")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_yields_defaults() {
        let config = load_config(Some(Path::new("/nonexistent/config.toml"))).unwrap();
        assert_eq!(config.workspace.max_file_bytes, 10 * 1024);
        assert_eq!(config.sandbox.timeout_seconds, 5);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[sandbox]\ntimeout_seconds = 2\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.sandbox.timeout_seconds, 2);
        assert_eq!(config.sandbox.max_heap_mb, 64);
        assert_eq!(config.workspace.max_file_bytes, 10 * 1024);
    }
}
