//! Tool configuration loaded from TOML.
//!
//! Every component receives the values it needs from a [`Config`] built once
//! per invocation; nothing reads global paths on its own.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use super::path::{expand_home, resolve_path};
use crate::error::{Result, VxError};
use crate::registry::EnabledPolicy;

/// Application directory name under the platform config/cache dirs.
pub const APP_DIR: &str = "vxl";

/// Config file name inside [`APP_DIR`].
pub const CONFIG_FILE: &str = "config.toml";

/// Vortex under Proton keeps its LevelDB state inside the game's prefix.
pub const DEFAULT_STORE_PATH: &str = "~/.steam/steam/steamapps/compatdata/264710/pfx/drive_c/users/steamuser/AppData/Roaming/Vortex/state.v2";

pub const DEFAULT_GAME: &str = "subnautica";

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Game id as used in the store keys.
    pub game: String,
    /// Game directory override; when unset the store's discovered path is used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_path: Option<PathBuf>,
    pub store: StoreConfig,
    pub deploy: DeployConfig,
    pub cleanup: CleanupConfig,
}

/// Where and how the state store is read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Live Vortex database directory.
    pub path: PathBuf,
    /// Local copy tried when the live database is absent. The default is
    /// relative to the working directory and is never written out, so a
    /// saved config does not pin it to the config directory.
    #[serde(skip_serializing_if = "is_default_fallback")]
    pub fallback_path: PathBuf,
    /// Directory holding the per-invocation snapshot copy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_dir: Option<PathBuf>,
    /// File inside the database directory whose presence means another
    /// process is writing to it.
    pub lock_sentinel: String,
}

/// Deployment rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeployConfig {
    /// Mod type deployed into the game root.
    pub framework_type: String,
    /// Mod type deployed into `plugins_subdir`.
    pub plugin_type: String,
    /// Types that are never deployed, even when enabled.
    pub excluded_types: Vec<String>,
    /// Plugin destination relative to the game root.
    pub plugins_subdir: PathBuf,
    /// How the two enabled indicators are combined.
    pub enabled_policy: EnabledPolicy,
}

/// Teardown rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CleanupConfig {
    /// Directories under the game root scanned recursively for links.
    /// The game root itself is always scanned one level deep.
    pub scan_dirs: Vec<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            game: DEFAULT_GAME.to_string(),
            game_path: None,
            store: StoreConfig::default(),
            deploy: DeployConfig::default(),
            cleanup: CleanupConfig::default(),
        }
    }
}

/// Local database copy, relative to the working directory.
pub const DEFAULT_FALLBACK_PATH: &str = "state";

#[allow(clippy::ptr_arg)] // serde hands over &PathBuf
fn is_default_fallback(path: &PathBuf) -> bool {
    path.as_os_str() == DEFAULT_FALLBACK_PATH
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_STORE_PATH),
            fallback_path: PathBuf::from(DEFAULT_FALLBACK_PATH),
            snapshot_dir: None,
            lock_sentinel: "vortex.lock".to_string(),
        }
    }
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            framework_type: "bepinex-5".to_string(),
            plugin_type: "bepinex-plugin".to_string(),
            excluded_types: vec!["collection".to_string()],
            plugins_subdir: PathBuf::from("BepInEx").join("plugins"),
            enabled_policy: EnabledPolicy::Flag,
        }
    }
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            scan_dirs: vec![PathBuf::from("BepInEx")],
        }
    }
}

impl Config {
    /// Default config file location (`$XDG_CONFIG_HOME/vxl/config.toml`).
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, the default location is
    /// used when present and built-in defaults otherwise. Returns the file
    /// the values came from, if any.
    #[instrument]
    pub fn load(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        let path = match explicit {
            Some(p) => {
                let p = expand_home(p)?;
                if !p.is_file() {
                    return Err(VxError::ConfigNotFound {
                        path: p.display().to_string(),
                    });
                }
                Some(p)
            }
            None => Self::default_path().filter(|p| p.is_file()),
        };

        let Some(path) = path else {
            debug!("No config file, using defaults");
            return Ok((Self::default(), None));
        };

        let config = Self::from_file(&path)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok((config, Some(path)))
    }

    /// Parse a config file, resolving relative store paths against its directory.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let mut config = Self::from_toml(&text)?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        config.store.path = resolve_path(&config.store.path, base)?;
        config.store.fallback_path = resolve_path(&config.store.fallback_path, base)?;
        if let Some(dir) = &config.store.snapshot_dir {
            config.store.snapshot_dir = Some(resolve_path(dir, base)?);
        }
        if let Some(game_path) = &config.game_path {
            config.game_path = Some(resolve_path(game_path, base)?);
        }
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| VxError::ConfigParse(e.to_string()))
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| VxError::ConfigParse(e.to_string()))
    }

    /// Write this configuration, refusing to clobber an existing file unless `force`.
    #[instrument(skip(self))]
    pub fn save(&self, path: &Path, force: bool) -> Result<()> {
        if path.exists() && !force {
            return Err(VxError::ConfigExists {
                path: path.display().to_string(),
            });
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_toml()?)?;
        info!(path = %path.display(), "Wrote configuration");
        Ok(())
    }

    /// Snapshot directory, defaulting to the platform cache dir.
    pub fn snapshot_dir(&self) -> Result<PathBuf> {
        match &self.store.snapshot_dir {
            Some(dir) => expand_home(dir),
            None => Ok(dirs::cache_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join(APP_DIR)
                .join("snapshot")),
        }
    }
}
