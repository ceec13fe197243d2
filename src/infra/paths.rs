// src/infra/paths.rs — XDG-compliant path management
//
// All paths respect the DECORA_HOME environment variable for isolation.
// When DECORA_HOME is set, all config and data live under that directory.
// When unset, config uses ~/.decora/ and data uses XDG_DATA_HOME/decora.

use directories::ProjectDirs;
use std::path::PathBuf;
use std::sync::OnceLock;

static PROJECT_DIRS: OnceLock<ProjectDirs> = OnceLock::new();

fn project_dirs() -> &'static ProjectDirs {
    PROJECT_DIRS.get_or_init(|| {
        ProjectDirs::from("", "", "decora").expect("Could not determine home directory")
    })
}

/// Returns the DECORA_HOME override, if set.
fn decora_home() -> Option<PathBuf> {
    std::env::var_os("DECORA_HOME").map(PathBuf::from)
}

/// Configuration directory: $DECORA_HOME/ or ~/.decora/
pub fn config_dir() -> PathBuf {
    if let Some(home) = decora_home() {
        return home;
    }
    dirs_home().join(".decora")
}

/// Data directory: $DECORA_HOME/data/ or XDG_DATA_HOME/decora
pub fn data_dir() -> PathBuf {
    if let Some(home) = decora_home() {
        return home.join("data");
    }
    project_dirs().data_local_dir().to_path_buf()
}

/// Home directory
pub fn dirs_home() -> PathBuf {
    directories::BaseDirs::new()
        .expect("Could not determine home directory")
        .home_dir()
        .to_path_buf()
}

/// Directory backing the key-value session store (one JSON file per key)
pub fn sessions_dir() -> PathBuf {
    data_dir().join("sessions")
}

/// Render gallery database path
pub fn gallery_db_path() -> PathBuf {
    data_dir().join("gallery.db")
}

/// Exported renders directory
pub fn exports_dir() -> PathBuf {
    data_dir().join("exports")
}

/// Auth store path
pub fn auth_file_path() -> PathBuf {
    config_dir().join("auth.json")
}

/// Config file path
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Ensure all required directories exist
pub async fn ensure_dirs() -> anyhow::Result<()> {
    let dirs = [config_dir(), data_dir(), sessions_dir(), exports_dir()];

    for dir in &dirs {
        tokio::fs::create_dir_all(dir).await?;
    }

    Ok(())
}
