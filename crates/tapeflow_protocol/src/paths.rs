use std::path::PathBuf;
use std::sync::Once;

static CREATE_DIR_WARNED: Once = Once::new();

/// Subdirectory of the home holding the location sheets.
pub const SHEETS_DIR: &str = "sheets";
/// Subdirectory of the home holding log files.
pub const LOGS_DIR: &str = "logs";

/// Resolve the Tapeflow home directory.
///
/// Priority:
/// 1) TAPEFLOW_HOME
/// 2) the user's home directory
/// 3) ./.tapeflow
pub fn tapeflow_home() -> PathBuf {
    if let Ok(override_path) = std::env::var("TAPEFLOW_HOME") {
        return PathBuf::from(override_path);
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".tapeflow");
    }
    PathBuf::from(".").join(".tapeflow")
}

fn ensure_home_dir(home: &PathBuf) {
    if let Err(err) = std::fs::create_dir_all(home) {
        CREATE_DIR_WARNED.call_once(|| {
            eprintln!(
                "Warning: failed to create Tapeflow home directory {}: {}. Set TAPEFLOW_HOME or pass --store-dir.",
                home.display(),
                err
            );
        });
    }
}

/// Default config file: ~/.tapeflow/config.toml
pub fn default_config_path() -> PathBuf {
    tapeflow_home().join("config.toml")
}

/// The home directory, created if missing (a failure only warns once).
pub fn ensure_tapeflow_home() -> PathBuf {
    let home = tapeflow_home();
    ensure_home_dir(&home);
    home
}

/// Default logs directory: ~/.tapeflow/logs
pub fn default_logs_dir() -> PathBuf {
    ensure_tapeflow_home().join(LOGS_DIR)
}
