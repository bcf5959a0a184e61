//! Configuration file management
//!
//! Handles finding, loading, and saving configuration files.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use super::{EnvConfig, HarnessConfig};

/// Configuration file locations (in order of precedence)
const CONFIG_LOCATIONS: &[&str] = &[
    "./fanpulse-harness.yaml",
    "./fanpulse-harness.yml",
    "./fanpulse-harness.json",
    "~/.config/fanpulse-harness/config.yaml",
];

/// Find configuration file in standard locations
pub fn find_config_file() -> Option<PathBuf> {
    CONFIG_LOCATIONS
        .iter()
        .map(|location| expand_path(location))
        .find(|path| path.exists())
}

impl HarnessConfig {
    /// Load configuration from file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = if is_yaml_file(path) {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))?
        };

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = if is_yaml_file(path) {
            serde_yaml::to_string(self).context("Failed to serialize config")?
        } else {
            serde_json::to_string_pretty(self).context("Failed to serialize config")?
        };

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Resolve the file layer and environment overrides.
    ///
    /// An explicit path wins over `FANPULSE_HARNESS_CONFIG`, which wins over
    /// the standard locations. No file at all means defaults.
    pub fn resolve(explicit: Option<&Path>, env: &EnvConfig) -> Result<Self> {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(|| env.config_file.as_ref().map(PathBuf::from))
            .or_else(find_config_file);

        let mut config = match path {
            Some(path) => Self::load(&path)?,
            None => Self::default(),
        };
        config.apply_env(env);
        Ok(config)
    }
}

/// Expand ~ to home directory
fn expand_path(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

/// Check if file is YAML based on extension
fn is_yaml_file(path: &Path) -> bool {
    path.extension()
        .map(|e| e == "yaml" || e == "yml")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_and_load_yaml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("harness.yaml");

        let config = HarnessConfig::new("http://gw:4000").with_users(4);
        config.save(&path).unwrap();

        let loaded = HarnessConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_save_and_load_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("harness.json");

        let config = HarnessConfig::default().with_duration(15);
        config.save(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"test_duration_secs\": 15"));
        assert_eq!(HarnessConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_resolve_explicit_file_then_env() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("harness.yaml");
        HarnessConfig::new("http://from-file:4000")
            .with_users(3)
            .save(&path)
            .unwrap();

        let env = EnvConfig {
            users: Some(9),
            ..Default::default()
        };
        let config = HarnessConfig::resolve(Some(&path), &env).unwrap();
        assert_eq!(config.gateway_url, "http://from-file:4000");
        assert_eq!(config.concurrent_users, 9);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let dir = tempdir().unwrap();
        assert!(HarnessConfig::load(dir.path().join("absent.yaml")).is_err());
    }

    #[test]
    fn test_expand_path() {
        assert_eq!(expand_path("./a.yaml"), PathBuf::from("./a.yaml"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_path("~/x.yaml"), home.join("x.yaml"));
        }
    }
}
