//! Operator configuration
//!
//! Loaded from a TOML file; every key is optional.
//!
//! ```toml
//! [storage]
//! data_dir = "./nexus_data"
//!
//! [analysis]
//! default_urgency = 5.0
//!
//! [export]
//! output_dir = "."
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

use chimera_core::DEFAULT_URGENCY;
use chimera_store::StoreConfig;

/// Config file picked up from the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "chimera.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NexusConfig {
    pub storage: StorageSection,
    pub analysis: AnalysisSection,
    pub export: ExportSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisSection {
    /// Urgency baseline used when rendering pressure
    pub default_urgency: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExportSection {
    pub output_dir: PathBuf,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            data_dir: StoreConfig::default().data_dir,
        }
    }
}

impl Default for AnalysisSection {
    fn default() -> Self {
        Self {
            default_urgency: DEFAULT_URGENCY,
        }
    }
}

impl Default for ExportSection {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
        }
    }
}

impl NexusConfig {
    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, `chimera.toml` in the
    /// working directory is used if present, otherwise the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.exists() {
                    Self::from_file(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::parse(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::default().with_data_dir(&self.storage.data_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = NexusConfig::default();
        assert_eq!(config.analysis.default_urgency, 5.0);
        assert_eq!(config.storage.data_dir, PathBuf::from("./nexus_data"));
        assert_eq!(config.export.output_dir, PathBuf::from("."));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = NexusConfig::parse("[analysis]\ndefault_urgency = 7.5\n").unwrap();
        assert_eq!(config.analysis.default_urgency, 7.5);
        assert_eq!(config.storage.data_dir, PathBuf::from("./nexus_data"));
    }

    #[test]
    fn test_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nexus.toml");
        std::fs::write(&path, "[storage]\ndata_dir = \"/srv/nexus\"\n").unwrap();

        let config = NexusConfig::load(Some(path.as_path())).unwrap();
        assert_eq!(config.store_config().chains_dir(), PathBuf::from("/srv/nexus/chains"));
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = TempDir::new().unwrap();
        assert!(NexusConfig::load(Some(dir.path().join("absent.toml").as_path())).is_err());
    }

    #[test]
    fn test_invalid_toml_is_error() {
        assert!(NexusConfig::parse("[analysis]\ndefault_urgency = \"high\"\n").is_err());
    }
}
