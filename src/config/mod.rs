//! Configuration for the deployment tool.
//!
//! Values come from a TOML file (see [`Config::load`]) and are then
//! overridden by command-line flags in the binary.

mod path;
mod settings;

pub use path::{expand_home, home_dir, resolve_path};
pub use settings::{
    CleanupConfig, Config, DeployConfig, StoreConfig, APP_DIR, CONFIG_FILE,
    DEFAULT_FALLBACK_PATH, DEFAULT_GAME, DEFAULT_STORE_PATH,
};
