//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/banana/config.toml)
//! 3. Environment variables (BANANA_* prefix)
//!
//! Environment variables take precedence over config file values.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable prefix
const ENV_PREFIX: &str = "BANANA";

/// Default file name of the store inside the store directory
pub const DEFAULT_STORE_NAME: &str = "note.db";

/// Directory under `data_dir` that holds the store file
const STORE_DIR_NAME: &str = "SQLite";

/// How an export hands the store file to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExportMode {
    /// Write a copy into a directory the user granted access to
    #[default]
    Directory,
    /// Pass the file to a share surface
    Share,
}

impl ExportMode {
    /// Parse a mode name as used in config files and the environment
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "directory" | "dir" => Some(ExportMode::Directory),
            "share" => Some(ExportMode::Share),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExportMode::Directory => "directory",
            ExportMode::Share => "share",
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory for data storage (store file, backups, logs)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// File name of the store
    #[serde(default = "default_store_name")]
    pub store_name: String,

    /// How `export` delivers the store file
    #[serde(default)]
    pub export_mode: ExportMode,

    /// Log file path (defaults to {data_dir}/debug.log when logging is on)
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            store_name: default_store_name(),
            export_mode: ExportMode::default(),
            log_file: None,
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (BANANA_DATA_DIR, BANANA_STORE_NAME, ...)
    /// 2. Config file (~/.config/banana/config.toml or BANANA_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration, preferring a path given on the command line
    pub fn load_with_cli_override(path: Option<&PathBuf>) -> Result<Self> {
        match path {
            Some(p) => Self::load_from_path(p),
            None => Self::load(),
        }
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        config.ensure_data_dir()?;
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Build a configuration rooted at `data_dir` with default settings
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var(format!("{}_DATA_DIR", ENV_PREFIX)) {
            self.data_dir = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var(format!("{}_STORE_NAME", ENV_PREFIX)) {
            if !val.is_empty() {
                self.store_name = val;
            }
        }

        if let Ok(val) = std::env::var(format!("{}_EXPORT_MODE", ENV_PREFIX)) {
            if let Some(mode) = ExportMode::parse(&val) {
                self.export_mode = mode;
            }
        }

        if let Ok(val) = std::env::var(format!("{}_LOG_FILE", ENV_PREFIX)) {
            self.log_file = if val.is_empty() {
                None
            } else {
                Some(PathBuf::from(val))
            };
        }
    }

    /// Ensure data directory exists
    fn ensure_data_dir(&self) -> Result<()> {
        if !self.data_dir.exists() {
            std::fs::create_dir_all(&self.data_dir)
                .with_context(|| format!("Failed to create data directory: {:?}", self.data_dir))?;
        }
        Ok(())
    }

    /// Save configuration to the default config file
    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::config_file_path())
    }

    /// Save configuration to a specific file
    pub fn save_to_path(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with BANANA_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("banana")
            .join("config.toml")
    }

    /// Directory holding the store file
    pub fn store_dir(&self) -> PathBuf {
        self.data_dir.join(STORE_DIR_NAME)
    }

    /// Canonical path of the store file
    pub fn store_path(&self) -> PathBuf {
        self.store_dir().join(&self.store_name)
    }

    /// Where the previous store is kept after an import replaces it
    pub fn backup_path(&self) -> PathBuf {
        self.store_dir().join(format!("{}.bak", self.store_name))
    }

    /// Effective log file path
    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join("debug.log"))
    }
}

/// Get the default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("banana")
}

fn default_store_name() -> String {
    DEFAULT_STORE_NAME.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to serialize tests that touch environment variables
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Guard that locks env access and saves/restores env vars
    struct EnvGuard<'a> {
        _lock: std::sync::MutexGuard<'a, ()>,
        saved: Vec<(String, Option<String>)>,
    }

    impl<'a> EnvGuard<'a> {
        fn new(vars: &[&str]) -> Self {
            let lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
            let saved = vars
                .iter()
                .map(|&name| (name.to_string(), env::var(name).ok()))
                .collect();
            for name in vars {
                env::remove_var(name);
            }
            Self { _lock: lock, saved }
        }
    }

    impl Drop for EnvGuard<'_> {
        fn drop(&mut self) {
            for (name, value) in &self.saved {
                match value {
                    Some(v) => env::set_var(name, v),
                    None => env::remove_var(name),
                }
            }
        }
    }

    const ENV_VARS: &[&str] = &[
        "BANANA_DATA_DIR",
        "BANANA_STORE_NAME",
        "BANANA_EXPORT_MODE",
        "BANANA_LOG_FILE",
    ];

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.store_name, "note.db");
        assert_eq!(config.export_mode, ExportMode::Directory);
        assert!(config.log_file.is_none());
        assert!(config.data_dir.ends_with("banana"));
    }

    #[test]
    fn test_file_paths() {
        let config = Config::with_data_dir("/data/banana");

        assert_eq!(config.store_dir(), PathBuf::from("/data/banana/SQLite"));
        assert_eq!(
            config.store_path(),
            PathBuf::from("/data/banana/SQLite/note.db")
        );
        assert_eq!(
            config.backup_path(),
            PathBuf::from("/data/banana/SQLite/note.db.bak")
        );
        assert_eq!(config.log_path(), PathBuf::from("/data/banana/debug.log"));
    }

    #[test]
    fn test_env_override_data_dir() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("BANANA_DATA_DIR", "/tmp/banana-test");
        config.apply_env_overrides();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/banana-test"));
    }

    #[test]
    fn test_env_override_export_mode() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("BANANA_EXPORT_MODE", "share");
        config.apply_env_overrides();
        assert_eq!(config.export_mode, ExportMode::Share);

        // Unknown values leave the setting alone
        env::set_var("BANANA_EXPORT_MODE", "carrier-pigeon");
        config.apply_env_overrides();
        assert_eq!(config.export_mode, ExportMode::Share);
    }

    #[test]
    fn test_env_override_log_file() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("BANANA_LOG_FILE", "/tmp/banana.log");
        config.apply_env_overrides();
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/banana.log")));

        // Empty string clears it
        env::set_var("BANANA_LOG_FILE", "");
        config.apply_env_overrides();
        assert!(config.log_file.is_none());
    }

    #[test]
    fn test_serialization() {
        let _guard = EnvGuard::new(ENV_VARS);

        let config = Config {
            data_dir: PathBuf::from("/data/banana"),
            store_name: "backup.db".to_string(),
            export_mode: ExportMode::Share,
            log_file: None,
        };

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("data_dir"));
        assert!(toml_str.contains("export_mode = \"share\""));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.data_dir, config.data_dir);
        assert_eq!(parsed.store_name, config.store_name);
        assert_eq!(parsed.export_mode, config.export_mode);
    }

    #[test]
    fn test_load_from_str() {
        let _guard = EnvGuard::new(ENV_VARS);

        let toml = r#"
            data_dir = "/custom/data"
            store_name = "phone.db"
        "#;

        let config = Config::load_from_str(toml).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/custom/data"));
        assert_eq!(config.store_name, "phone.db");
        assert_eq!(config.export_mode, ExportMode::Directory);
    }

    #[test]
    fn test_load_from_path_missing_file_creates_data_dir() {
        let _guard = EnvGuard::new(ENV_VARS);
        let temp = tempfile::TempDir::new().unwrap();
        let data_dir = temp.path().join("nested").join("data");

        env::set_var("BANANA_DATA_DIR", &data_dir);
        let config = Config::load_from_path(&temp.path().join("missing.toml")).unwrap();

        assert_eq!(config.data_dir, data_dir);
        assert!(data_dir.is_dir());
    }

    #[test]
    fn test_save_to_path_round_trip() {
        let _guard = EnvGuard::new(ENV_VARS);
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("conf").join("config.toml");

        let mut config = Config::with_data_dir(temp.path().join("data"));
        config.export_mode = ExportMode::Share;
        config.save_to_path(&path).unwrap();

        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(loaded.export_mode, ExportMode::Share);
        assert_eq!(loaded.data_dir, temp.path().join("data"));
    }

    #[test]
    fn test_export_mode_parse() {
        assert_eq!(ExportMode::parse("Directory"), Some(ExportMode::Directory));
        assert_eq!(ExportMode::parse("dir"), Some(ExportMode::Directory));
        assert_eq!(ExportMode::parse(" share "), Some(ExportMode::Share));
        assert_eq!(ExportMode::parse("email"), None);
    }
}
