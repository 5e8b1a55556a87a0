//! Test fixture helpers for creating temporary Vortex installs.
//!
//! A [`VortexFixture`] owns a temporary directory holding a real LevelDB
//! state store, a staging folder, a game directory and a config file that
//! points at all of them. Everything is removed when the fixture is dropped.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rusty_leveldb::{Options, DB};
use tempfile::TempDir;

use super::cli::CliRunner;

pub const GAME: &str = "subnautica";
pub const PROFILE: &str = "prof1";
pub const FRAMEWORK_TYPE: &str = "bepinex-5";
pub const PLUGIN_TYPE: &str = "bepinex-plugin";

/// Wine path (`Z:\...`) for a host path, the way the mod manager records it.
#[must_use]
pub fn wine_path(path: &Path) -> String {
    format!("Z:{}", path.display().to_string().replace('/', "\\"))
}

/// One installed mod and its staged files.
#[derive(Debug, Clone)]
pub struct ModSpec {
    pub id: String,
    pub name: String,
    pub mod_type: String,
    /// Folder under the staging directory; `None` records no installation path.
    pub install: Option<String>,
    /// Files relative to the mod folder.
    pub files: Vec<String>,
    pub enabled: bool,
    pub enabled_time: Option<u64>,
}

impl ModSpec {
    #[must_use]
    pub fn new(id: &str, name: &str, mod_type: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            mod_type: mod_type.to_string(),
            install: Some(format!("{id}-1")),
            files: Vec::new(),
            enabled: true,
            enabled_time: Some(1_700_000_000_000),
        }
    }

    #[must_use]
    pub fn file(mut self, rel: &str) -> Self {
        self.files.push(rel.to_string());
        self
    }

    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    #[must_use]
    pub fn without_install(mut self) -> Self {
        self.install = None;
        self
    }
}

/// Temporary Vortex install backed by a real LevelDB store.
pub struct VortexFixture {
    pub dir: TempDir,
    entries: Vec<(String, String)>,
}

impl VortexFixture {
    /// Empty store plus game and staging directories.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directories cannot be created.
    #[must_use]
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let fixture = Self {
            dir,
            entries: Vec::new(),
        };
        fs::create_dir_all(fixture.game_path()).expect("create game dir");
        fs::create_dir_all(fixture.staging_path()).expect("create staging dir");
        fixture
    }

    /// A store for [`GAME`] with the active profile and both paths recorded.
    #[must_use]
    pub fn standard() -> Self {
        Self::new()
            .with_active_profile(PROFILE)
            .with_profile_name(PROFILE, "Default")
            .with_recorded_paths()
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    #[must_use]
    pub fn store_path(&self) -> PathBuf {
        self.root().join("state.v2")
    }

    #[must_use]
    pub fn game_path(&self) -> PathBuf {
        self.root().join("game")
    }

    #[must_use]
    pub fn staging_path(&self) -> PathBuf {
        self.root().join("staging")
    }

    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        self.root().join("config.toml")
    }

    #[must_use]
    pub fn snapshot_path(&self) -> PathBuf {
        self.root().join("snapshot")
    }

    /// Add a raw entry; `value` is stored as given.
    #[must_use]
    pub fn with_entry(mut self, key: &str, value: &str) -> Self {
        self.entries.push((key.to_string(), value.to_string()));
        self
    }

    /// Add an entry whose value is a JSON string.
    #[must_use]
    pub fn with_string(self, key: &str, value: &str) -> Self {
        let encoded = serde_json::Value::String(value.to_string()).to_string();
        self.with_entry(key, &encoded)
    }

    #[must_use]
    pub fn with_active_profile(self, profile: &str) -> Self {
        let key = format!("settings###profiles###lastActiveProfile###{GAME}");
        self.with_string(&key, profile)
    }

    #[must_use]
    pub fn with_profile_name(self, profile: &str, name: &str) -> Self {
        self.with_string(&format!("persistent###profiles###{profile}###name"), name)
            .with_string(&format!("persistent###profiles###{profile}###gameId"), GAME)
    }

    /// Record the game and staging directories as Wine paths.
    #[must_use]
    pub fn with_recorded_paths(self) -> Self {
        let game = wine_path(&self.game_path());
        let staging = wine_path(&self.staging_path());
        self.with_string(
            &format!("settings###gameMode###discovered###{GAME}###path"),
            &game,
        )
        .with_string(&format!("settings###mods###installPath###{GAME}"), &staging)
    }

    /// Stage the mod's files and record it in the active profile.
    ///
    /// # Panics
    ///
    /// Panics if staged files cannot be written.
    #[must_use]
    pub fn with_mod(mut self, spec: &ModSpec) -> Self {
        let base = format!("persistent###mods###{GAME}###{}", spec.id);
        if let Some(install) = &spec.install {
            let mod_dir = self.staging_path().join(install);
            fs::create_dir_all(&mod_dir).expect("create mod dir");
            for rel in &spec.files {
                let path = mod_dir.join(rel);
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent).expect("create mod subdir");
                }
                fs::write(&path, format!("{} {rel}", spec.id)).expect("write staged file");
            }
            self = self.with_string(&format!("{base}###installationPath"), install);
        }
        self = self
            .with_string(&format!("{base}###type"), &spec.mod_type)
            .with_string(&format!("{base}###state"), "installed")
            .with_string(&format!("{base}###attributes###name"), &spec.name)
            .with_string(&format!("{base}###attributes###modVersion"), "1.0.0");

        let state = format!("persistent###profiles###{PROFILE}###modState###{}", spec.id);
        self = self.with_entry(&format!("{state}###enabled"), &spec.enabled.to_string());
        if let Some(time) = spec.enabled_time {
            self = self.with_entry(&format!("{state}###enabledTime"), &time.to_string());
        }
        self
    }

    /// Write the LevelDB store and a config file pointing at this fixture.
    ///
    /// # Errors
    ///
    /// Fails if LevelDB or the config file cannot be written.
    pub fn write(&self) -> Result<()> {
        let opts = Options {
            create_if_missing: true,
            ..Options::default()
        };
        let mut db = DB::open(self.store_path(), opts)
            .map_err(|e| anyhow::anyhow!("open leveldb: {e}"))?;
        for (key, value) in &self.entries {
            db.put(key.as_bytes(), value.as_bytes())
                .map_err(|e| anyhow::anyhow!("put {key}: {e}"))?;
        }
        db.flush().map_err(|e| anyhow::anyhow!("flush: {e}"))?;
        drop(db);

        let config = format!(
            "game = \"{GAME}\"\n\n[store]\npath = {}\nfallback_path = {}\nsnapshot_dir = {}\n",
            toml_str(&self.store_path()),
            toml_str(&self.root().join("fallback")),
            toml_str(&self.snapshot_path()),
        );
        fs::write(self.config_path(), config).context("write config")?;
        Ok(())
    }

    /// [`Self::write`], then a CLI runner using this fixture's config.
    ///
    /// # Panics
    ///
    /// Panics if the fixture cannot be written.
    #[must_use]
    pub fn build(self) -> (Self, CliRunner) {
        self.write().expect("Failed to write fixture");
        let cli = CliRunner::new().with_env("VXL_CONFIG", &self.config_path().to_string_lossy());
        (self, cli)
    }

    /// Create a symlink under the game directory pointing at `target`.
    ///
    /// # Panics
    ///
    /// Panics if the link cannot be created.
    pub fn game_link(&self, rel: &str, target: &Path) -> PathBuf {
        let link = self.game_path().join(rel);
        if let Some(parent) = link.parent() {
            fs::create_dir_all(parent).expect("create link parent");
        }
        std::os::unix::fs::symlink(target, &link).expect("create symlink");
        link
    }

    /// Create a regular file under the game directory.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be written.
    pub fn game_file(&self, rel: &str) -> PathBuf {
        let path = self.game_path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create file parent");
        }
        fs::write(&path, rel).expect("write game file");
        path
    }
}

impl Default for VortexFixture {
    fn default() -> Self {
        Self::new()
    }
}

fn toml_str(path: &Path) -> String {
    toml::Value::String(path.display().to_string()).to_string()
}
