//! Configuration file loading.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use memview::SessionConfig;
use tracing::{debug, warn};

/// Load a TOML session config; a missing file falls back to defaults
pub fn load_config(path: &Path) -> Result<SessionConfig> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("Config {} not found, using defaults", path.display());
            return Ok(SessionConfig::default());
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read {}", path.display()));
        }
    };
    let config: SessionConfig =
        toml::from_str(&content).with_context(|| format!("Invalid config {}", path.display()))?;
    debug!("Loaded config from {}", path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use memview::GameVersion;

    #[test]
    fn test_load_partial_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memview.toml");
        fs::write(&path, "version = \"6.5.8+2024.03.19\"\nroster_capacity = 8\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.roster_capacity, 8);
        assert_eq!(
            config.version,
            Some("6.5.8+2024.03.19".parse::<GameVersion>().unwrap())
        );
        assert_eq!(config.party_signature, SessionConfig::default().party_signature);
    }

    #[test]
    fn test_missing_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, SessionConfig::default());
    }

    #[test]
    fn test_invalid_version_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memview.toml");
        fs::write(&path, "version = \"six\"\n").unwrap();
        assert!(load_config(&path).is_err());
    }
}
