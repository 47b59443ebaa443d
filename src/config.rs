//! Configuration file handling.
//!
//! The configuration file is optional. It is read from the path given with `--config` (or
//! `EXPENSES_CONFIG`), otherwise from `<config dir>/expenses/config.json` when that file exists,
//! otherwise built-in defaults are used. Command line options override the file.

use crate::session::{Theme, DEFAULT_NOTIFICATION_TTL};
use crate::view::DEFAULT_PAGE_SIZE;
use crate::{utils, Result};
use anyhow::{bail, ensure, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

const APP_NAME: &str = "expenses";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";

/// The `Config` object represents the settings of the dashboard after the config file, if any,
/// and command line overrides have been applied.
#[derive(Debug, Clone, Default)]
pub struct Config {
    config_path: Option<PathBuf>,
    config_file: ConfigFile,
    seed: Option<PathBuf>,
}

impl Config {
    /// Loads the configuration.
    ///
    /// - When `path` is given, that file must exist and is loaded.
    /// - Otherwise `<config dir>/expenses/config.json` is loaded if it exists.
    /// - Otherwise the defaults are returned.
    ///
    /// # Errors
    /// - Returns an error if a config file exists but cannot be read or parsed, or if an explicit
    ///   `path` does not exist.
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => {
                if !utils::exists(p).await? {
                    bail!("The config file is missing '{}'", p.display());
                }
                Some(p.to_path_buf())
            }
            None => match default_config_path() {
                Some(p) if utils::exists(&p).await? => Some(p),
                _ => None,
            },
        };

        let Some(config_path) = config_path else {
            debug!("No config file found, using defaults");
            return Ok(Self::default());
        };

        debug!("Loading config from {}", config_path.display());
        let config_file = ConfigFile::load(&config_path).await?;

        // A relative seed path is relative to the directory holding the config file
        let seed = config_file.seed.as_ref().map(|seed| {
            match config_path.parent() {
                Some(dir) if seed.is_relative() => dir.join(seed),
                _ => seed.clone(),
            }
        });

        Ok(Self {
            config_path: Some(config_path),
            config_file,
            seed,
        })
    }

    /// Overrides the seed file.
    pub fn with_seed(mut self, seed: impl Into<PathBuf>) -> Self {
        self.seed = Some(seed.into());
        self
    }

    /// Overrides the page size.
    ///
    /// # Errors
    /// - Returns an error if `page_size` is zero.
    pub fn with_page_size(mut self, page_size: usize) -> Result<Self> {
        ensure!(page_size > 0, "The page size must be at least 1");
        self.config_file.page_size = page_size;
        Ok(self)
    }

    /// The config file that was loaded, if any.
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// The seed file to build the ledger from. `None` means the built-in sample set.
    pub fn seed(&self) -> Option<&Path> {
        self.seed.as_deref()
    }

    pub fn page_size(&self) -> usize {
        self.config_file.page_size
    }

    pub fn notification_ttl(&self) -> Duration {
        Duration::from_millis(self.config_file.notification_ttl_ms)
    }

    pub fn theme(&self) -> Theme {
        self.config_file.theme
    }
}

/// Returns `<config dir>/expenses/config.json`, e.g. `~/.config/expenses/config.json` on Linux.
fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_NAME).join(CONFIG_JSON))
}

/// Represents the serialization format of the config file. Every field except `app_name` may be
/// omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    app_name: String,

    config_version: u8,

    /// Number of expenses per page of the expense list
    page_size: usize,

    /// How long notifications stay on screen, in milliseconds
    notification_ttl_ms: u64,

    /// The theme to start with
    theme: Theme,

    /// Seed file to load instead of the built-in sample expenses (relative to config.json or
    /// absolute)
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<PathBuf>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            page_size: DEFAULT_PAGE_SIZE,
            notification_ttl_ms: DEFAULT_NOTIFICATION_TTL.as_millis() as u64,
            theme: Theme::default(),
            seed: None,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or holds invalid settings.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path)
            .await
            .context("Unable to load the config file")?;

        ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        ensure!(
            config.page_size > 0,
            "Invalid page_size in config file: it must be at least 1"
        );

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.page_size(), 5);
        assert_eq!(config.notification_ttl(), Duration::from_secs(3));
        assert_eq!(config.theme(), Theme::Dark);
        assert!(config.seed().is_none());
        assert!(config.config_path().is_none());
    }

    #[tokio::test]
    async fn test_load_explicit_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"app_name": "expenses", "page_size": 3, "theme": "light", "seed": "seed.json"}"#,
        )
        .unwrap();

        let config = Config::load(Some(&path)).await.unwrap();
        assert_eq!(config.page_size(), 3);
        assert_eq!(config.theme(), Theme::Light);
        assert_eq!(config.notification_ttl(), Duration::from_secs(3));
        assert_eq!(config.seed().unwrap(), dir.path().join("seed.json"));
        assert_eq!(config.config_path().unwrap(), path);
    }

    #[tokio::test]
    async fn test_load_minimal_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"app_name": "expenses"}"#).unwrap();
        let config = Config::load(Some(&path)).await.unwrap();
        assert_eq!(config.page_size(), 5);
    }

    #[tokio::test]
    async fn test_missing_explicit_file_is_error() {
        let dir = TempDir::new().unwrap();
        let result = Config::load(Some(&dir.path().join("nope.json"))).await;
        assert!(result.unwrap_err().to_string().contains("missing"));
    }

    #[tokio::test]
    async fn test_invalid_app_name() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"app_name": "budget"}"#).unwrap();
        let err = Config::load(Some(&path)).await.unwrap_err();
        assert!(err.to_string().contains("Invalid app_name"));
    }

    #[tokio::test]
    async fn test_zero_page_size_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"app_name": "expenses", "page_size": 0}"#).unwrap();
        assert!(Config::load(Some(&path)).await.is_err());
        assert!(Config::default().with_page_size(0).is_err());
    }

    #[test]
    fn test_overrides() {
        let config = Config::default()
            .with_seed("/tmp/seed.json")
            .with_page_size(10)
            .unwrap();
        assert_eq!(config.seed().unwrap(), Path::new("/tmp/seed.json"));
        assert_eq!(config.page_size(), 10);
    }

    #[test]
    fn test_serialization_omits_none_seed() {
        let json = serde_json::to_string(&ConfigFile::default()).unwrap();
        assert!(!json.contains("seed"));
        assert!(json.contains("\"page_size\":5"));
    }
}
