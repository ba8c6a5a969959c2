//! Configuration for the tapeflow binary
//!
//! Settings live in `~/.tapeflow/config.toml` (or `$TAPEFLOW_HOME/config.toml`).
//! Every key is optional:
//!
//! ```toml
//! [store]
//! backend = "csv"
//! path = "/srv/tapes/sheets"
//!
//! [shell]
//! exit_countdown_secs = 3
//! ```

use crate::cli::error::HelpfulError;
use crate::cli::output::print_table;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tapeflow_db::{CsvStore, LocationStore, MemoryStore};
use tapeflow_protocol::paths::{default_config_path, ensure_tapeflow_home, LOGS_DIR, SHEETS_DIR};
use tapeflow_protocol::Location;
use tracing::{debug, warn};

const DEFAULT_EXIT_COUNTDOWN_SECS: u64 = 3;

/// Store backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// One CSV sheet per location on disk
    #[default]
    Csv,
    /// Process-local sheets, discarded on exit
    Memory,
}

impl StoreBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreBackend::Csv => "csv",
            StoreBackend::Memory => "memory",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    pub backend: StoreBackend,
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellSection {
    pub exit_countdown_secs: u64,
}

impl Default for ShellSection {
    fn default() -> Self {
        Self {
            exit_countdown_secs: DEFAULT_EXIT_COUNTDOWN_SECS,
        }
    }
}

/// Contents of config.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub store: StoreSection,
    pub shell: ShellSection,
}

impl ConfigFile {
    /// Load from `path`; a missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self, HelpfulError> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|err| HelpfulError::config_error(path, &err.to_string()))?;
        toml::from_str(&content).map_err(|err| HelpfulError::config_error(path, &err.to_string()))
    }
}

/// Effective settings after applying command-line overrides.
#[derive(Debug, Clone, Serialize)]
pub struct Settings {
    pub home: PathBuf,
    pub config_path: PathBuf,
    pub config_file_exists: bool,
    pub backend: StoreBackend,
    pub store_dir: PathBuf,
    pub logs_dir: PathBuf,
    pub exit_countdown_secs: u64,
}

impl Settings {
    /// Read config.toml and apply `--store-dir`, which forces the csv backend.
    pub fn resolve(store_dir_override: Option<PathBuf>) -> Result<Self, HelpfulError> {
        let home = ensure_tapeflow_home();
        let config_path = default_config_path();
        let file = ConfigFile::load(&config_path)?;
        Ok(Self::from_file(file, home, config_path, store_dir_override))
    }

    /// Settings rooted at `home`; touches nothing on disk.
    pub fn from_file(
        file: ConfigFile,
        home: PathBuf,
        config_path: PathBuf,
        store_dir_override: Option<PathBuf>,
    ) -> Self {
        let config_file_exists = config_path.exists();
        let (backend, store_dir) = match store_dir_override {
            Some(dir) => (StoreBackend::Csv, dir),
            None => (
                file.store.backend,
                file.store.path.unwrap_or_else(|| home.join(SHEETS_DIR)),
            ),
        };
        Self {
            logs_dir: home.join(LOGS_DIR),
            home,
            config_path,
            config_file_exists,
            backend,
            store_dir,
            exit_countdown_secs: file.shell.exit_countdown_secs,
        }
    }

    /// Open the configured backend, creating missing sheets for csv.
    pub fn open_store(&self) -> Result<Box<dyn LocationStore>, HelpfulError> {
        match self.backend {
            StoreBackend::Csv => {
                let store = CsvStore::open(&self.store_dir).map_err(|err| {
                    HelpfulError::cannot_open_store(&self.store_dir, &err.to_string())
                })?;
                debug!(dir = %self.store_dir.display(), "Opened csv store");
                Ok(Box::new(store))
            }
            StoreBackend::Memory => {
                warn!("Using the memory backend; changes are discarded on exit");
                Ok(Box::new(MemoryStore::new()))
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct SheetStatus {
    location: Location,
    path: PathBuf,
    exists: bool,
}

#[derive(Debug, Serialize)]
struct ConfigReport<'a> {
    #[serde(flatten)]
    settings: &'a Settings,
    sheets: Vec<SheetStatus>,
}

/// `tapeflow config`
pub fn run(settings: &Settings, json: bool) -> anyhow::Result<()> {
    let sheets: Vec<SheetStatus> = Location::ALL
        .iter()
        .map(|location| {
            let path = CsvStore::sheet_file(&settings.store_dir, *location);
            SheetStatus {
                location: *location,
                exists: path.exists(),
                path,
            }
        })
        .collect();

    if json {
        let report = ConfigReport { settings, sheets };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let config_note = if settings.config_file_exists { "" } else { " (not found, defaults)" };
    let mut rows = vec![
        vec!["Home".to_string(), settings.home.display().to_string()],
        vec![
            "Config".to_string(),
            format!("{}{}", settings.config_path.display(), config_note),
        ],
        vec!["Backend".to_string(), settings.backend.as_str().to_string()],
        vec!["Store".to_string(), settings.store_dir.display().to_string()],
        vec!["Logs".to_string(), settings.logs_dir.display().to_string()],
        vec![
            "Exit countdown".to_string(),
            format!("{}s", settings.exit_countdown_secs),
        ],
    ];
    if settings.backend == StoreBackend::Csv {
        for sheet in &sheets {
            let state = if sheet.exists { "present" } else { "missing" };
            rows.push(vec![
                format!("{} sheet", sheet.location),
                format!("{} ({})", sheet.path.display(), state),
            ]);
        }
    }
    print_table(&["Setting", "Value"], rows);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let file: ConfigFile = toml::from_str("").unwrap();
        assert_eq!(file.store.backend, StoreBackend::Csv);
        assert!(file.store.path.is_none());
        assert_eq!(file.shell.exit_countdown_secs, DEFAULT_EXIT_COUNTDOWN_SECS);
    }

    #[test]
    fn test_parse_full_config() {
        let file: ConfigFile = toml::from_str(
            r#"
            [store]
            backend = "memory"
            path = "/tmp/sheets"

            [shell]
            exit_countdown_secs = 0
            "#,
        )
        .unwrap();
        assert_eq!(file.store.backend, StoreBackend::Memory);
        assert_eq!(file.store.path, Some(PathBuf::from("/tmp/sheets")));
        assert_eq!(file.shell.exit_countdown_secs, 0);
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        let parsed: Result<ConfigFile, _> = toml::from_str("[store]\nbackend = \"sheets\"\n");
        assert!(parsed.is_err());
    }

    #[test]
    fn test_store_dir_override_forces_csv() {
        let mut file = ConfigFile::default();
        file.store.backend = StoreBackend::Memory;
        file.store.path = Some(PathBuf::from("/ignored"));

        let home = tempfile::tempdir().unwrap();
        let settings = Settings::from_file(
            file,
            home.path().to_path_buf(),
            home.path().join("config.toml"),
            Some(PathBuf::from("/data/sheets")),
        );
        assert_eq!(settings.backend, StoreBackend::Csv);
        assert_eq!(settings.store_dir, PathBuf::from("/data/sheets"));
        assert_eq!(settings.logs_dir, home.path().join("logs"));
        assert!(!settings.config_file_exists);
    }

    #[test]
    fn test_default_paths_derive_from_home() {
        let home = tempfile::tempdir().unwrap();
        let root = home.path().join("tapeflow-home");

        let settings = Settings::from_file(
            ConfigFile::default(),
            root.clone(),
            root.join("config.toml"),
            None,
        );
        assert_eq!(settings.backend, StoreBackend::Csv);
        assert_eq!(settings.store_dir, root.join("sheets"));
        assert_eq!(settings.logs_dir, root.join("logs"));
        assert!(!root.exists());
    }

    #[test]
    fn test_load_reports_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[store\nbackend = ").unwrap();

        let err = ConfigFile::load(&path).unwrap_err();
        assert!(err.message.contains("Invalid config file"));
    }
}
