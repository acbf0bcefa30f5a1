//! Configuration loading and root folder resolution

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Environment variable overriding the root folder
pub const ENV_ROOT_FOLDER: &str = "WORLDTOUR_ROOT_FOLDER";

/// Compiled default port for the web service
pub const DEFAULT_PORT: u16 = 8160;

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "worldtour.db";

/// Optional settings read from config.toml
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub root_folder: Option<PathBuf>,
    pub port: Option<u16>,
}

impl TomlConfig {
    /// Load settings from the first config file found.
    ///
    /// A missing or unreadable file is not fatal: the service starts with
    /// defaults and logs a warning for files that exist but do not parse.
    pub fn load() -> Self {
        for path in Self::candidate_paths() {
            if !path.exists() {
                continue;
            }
            match Self::load_from(&path) {
                Ok(config) => return config,
                Err(e) => {
                    warn!("Ignoring config file {}: {}", path.display(), e);
                }
            }
        }
        Self::default()
    }

    /// Load settings from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Config file lookup order: user config dir first, then /etc on Linux
    fn candidate_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("worldtour").join("config.toml"));
        }
        if cfg!(target_os = "linux") {
            paths.push(PathBuf::from("/etc/worldtour/config.toml"));
        }
        paths
    }
}

/// Root folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. WORLDTOUR_ROOT_FOLDER environment variable
/// 3. TOML config file
/// 4. OS-dependent compiled default (fallback)
#[derive(Debug, Clone)]
pub struct RootFolderResolver {
    cli_override: Option<PathBuf>,
    toml: TomlConfig,
}

impl RootFolderResolver {
    /// Create a resolver from the CLI override and loaded TOML settings
    pub fn new(cli_override: Option<PathBuf>, toml: TomlConfig) -> Self {
        Self { cli_override, toml }
    }

    /// Resolve the root folder following the priority order
    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_override {
            return path.clone();
        }

        if let Ok(path) = std::env::var(ENV_ROOT_FOLDER) {
            if !path.is_empty() {
                return PathBuf::from(path);
            }
        }

        if let Some(path) = &self.toml.root_folder {
            return path.clone();
        }

        default_root_folder()
    }
}

/// Get OS-dependent default root folder path
pub fn default_root_folder() -> PathBuf {
    // ~/.local/share/worldtour on Linux, platform data dir elsewhere
    dirs::data_local_dir()
        .map(|d| d.join("worldtour"))
        .unwrap_or_else(|| PathBuf::from("./worldtour_data"))
}

/// Resolve the listen port: CLI/env (parsed by clap) -> TOML -> compiled default
pub fn resolve_port(cli_port: Option<u16>, toml: &TomlConfig) -> u16 {
    cli_port.or(toml.port).unwrap_or(DEFAULT_PORT)
}

/// Prepares the resolved root folder for use on startup
#[derive(Debug, Clone)]
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    /// Create the root folder (and parents) if missing
    pub fn ensure_directory_exists(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root_folder)?;
        Ok(())
    }

    /// Full path of the database file inside the root folder
    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE)
    }

    pub fn root_folder(&self) -> &Path {
        &self.root_folder
    }
}
