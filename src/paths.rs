use std::path::PathBuf;
use std::sync::OnceLock;

static EXE_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Returns the directory containing the executable.
pub fn get_exe_dir() -> &'static PathBuf {
    EXE_DIR.get_or_init(|| {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."))
    })
}

/// Returns the logs directory: `<exe_dir>/logs/`
pub fn get_logs_dir() -> PathBuf {
    get_exe_dir().join("logs")
}

/// Returns the captures directory: `<exe_dir>/captures/`
pub fn get_captures_dir() -> PathBuf {
    get_exe_dir().join("captures")
}

/// Returns the config file next to the executable: `<exe_dir>/config.json`
pub fn get_local_config_path() -> PathBuf {
    get_exe_dir().join("config.json")
}

/// Returns the per-user config file: `<config_dir>/windowcap/config.json`
pub fn get_user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("windowcap").join("config.json"))
}

/// Ensures all output directories exist. Call at startup.
pub fn ensure_directories() -> std::io::Result<()> {
    std::fs::create_dir_all(get_logs_dir())?;
    std::fs::create_dir_all(get_captures_dir())?;
    Ok(())
}
