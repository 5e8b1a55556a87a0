//! Deployment and teardown of mod symlinks.
//!
//! - [`planner`]: which mods go where, in what order
//! - [`sync`]: mirroring one staging directory into the game tree
//! - [`cleanup`]: finding and removing links again

pub mod cleanup;
pub mod planner;
pub mod sync;

pub use cleanup::{find_links, remove_links, RemovalFailure, RemovalOutcome};
pub use planner::{plan, DeploymentPlan, ModKind, PlanStep, PlannedMod, SkipReason, SkippedMod};
pub use sync::{sync, LinkFailure, SyncOutcome};

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, instrument};

use crate::config::{expand_home, Config};
use crate::error::{Result, VxError};
use crate::fs::{EntryKind, Filesystem};
use crate::registry::ModRegistry;
use crate::translate::translate_path;

/// Pick a directory from an explicit value or the store's recorded one.
///
/// The result must be an existing directory; a path that does not exist is
/// reported, not retried.
fn existing_dir(
    fs: &dyn Filesystem,
    what: &'static str,
    explicit: Option<&Path>,
    stored: Option<&str>,
    game: &str,
) -> Result<PathBuf> {
    let path = match (explicit, stored) {
        (Some(p), _) => expand_home(p)?,
        (None, Some(raw)) => translate_path(raw),
        (None, None) => {
            return Err(VxError::MissingSetting {
                setting: what,
                game: game.to_string(),
            });
        }
    };
    if fs.stat(&path)? != Some(EntryKind::Dir) {
        return Err(VxError::PathNotFound { what, path });
    }
    Ok(path)
}

/// Game directory: `explicit`, then the configured path, then the store's.
pub fn resolve_game_path(
    fs: &dyn Filesystem,
    config: &Config,
    explicit: Option<&Path>,
    registry: Option<&ModRegistry>,
) -> Result<PathBuf> {
    let explicit = explicit.or(config.game_path.as_deref());
    existing_dir(
        fs,
        "Game path",
        explicit,
        registry.and_then(ModRegistry::game_path),
        &config.game,
    )
}

/// Staging directory: `explicit`, then the store's.
pub fn resolve_staging_path(
    fs: &dyn Filesystem,
    config: &Config,
    explicit: Option<&Path>,
    registry: &ModRegistry,
) -> Result<PathBuf> {
    existing_dir(
        fs,
        "Staging path",
        explicit,
        registry.staging_path(),
        &config.game,
    )
}

#[derive(Debug, Clone, Default)]
pub struct DeployOptions {
    pub dry_run: bool,
    pub game_path: Option<PathBuf>,
    pub staging_path: Option<PathBuf>,
}

/// Per-mod result, in deployment order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeployStep {
    Deployed {
        #[serde(flatten)]
        planned: PlannedMod,
        created: Vec<PathBuf>,
        failures: Vec<LinkFailure>,
    },
    Skipped(SkippedMod),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeployReport {
    pub game: String,
    pub profile_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_name: Option<String>,
    pub game_path: PathBuf,
    pub staging_path: PathBuf,
    pub dry_run: bool,
    /// Selected mods, skipped ones included.
    pub total_mods: usize,
    pub framework_count: usize,
    pub plugin_count: usize,
    /// Links created, or that would be created.
    pub total_links: usize,
    pub failed_links: usize,
    pub steps: Vec<DeployStep>,
}

/// Plan and synchronize the active profile's mods.
///
/// Per-link failures are collected in the report; only missing
/// preconditions (profile, paths) fail the whole run.
#[instrument(skip_all, fields(game = %config.game, dry_run = opts.dry_run))]
pub fn deploy(
    fs: &dyn Filesystem,
    registry: &ModRegistry,
    config: &Config,
    opts: &DeployOptions,
) -> Result<DeployReport> {
    let profile_id = registry.require_active_profile()?;
    let game_path = resolve_game_path(fs, config, opts.game_path.as_deref(), Some(registry))?;
    let staging_path = resolve_staging_path(fs, config, opts.staging_path.as_deref(), registry)?;

    let plan = plan(registry, &config.deploy, fs, &game_path, &staging_path)?;

    let mut steps = Vec::with_capacity(plan.steps.len());
    let mut total_links = 0;
    let mut failed_links = 0;
    for step in plan.steps {
        match step {
            PlanStep::Deploy(planned) => {
                info!(mod_name = %planned.name, kind = ?planned.kind, "Deploying");
                let outcome = sync(fs, &planned.source, &planned.destination, opts.dry_run)?;
                total_links += outcome.created.len();
                failed_links += outcome.failures.len();
                steps.push(DeployStep::Deployed {
                    planned,
                    created: outcome.created,
                    failures: outcome.failures,
                });
            }
            PlanStep::Skip(skipped) => steps.push(DeployStep::Skipped(skipped)),
        }
    }

    info!(
        mods = plan.selected,
        links = total_links,
        failed = failed_links,
        "Deployment finished"
    );
    Ok(DeployReport {
        game: config.game.clone(),
        profile_id: profile_id.to_string(),
        profile_name: registry.profile_name(profile_id).map(str::to_string),
        game_path,
        staging_path,
        dry_run: opts.dry_run,
        total_mods: plan.selected,
        framework_count: plan.framework_count,
        plugin_count: plan.plugin_count,
        total_links,
        failed_links,
        steps,
    })
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CleanupOptions {
    pub dry_run: bool,
    /// Scan the whole game tree instead of the root plus the scan dirs.
    pub recursive: bool,
}

/// One scanned directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    pub dir: PathBuf,
    pub recursive: bool,
    pub found: usize,
}

/// A link slated for removal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkInfo {
    pub path: PathBuf,
    pub relative: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    pub game_path: PathBuf,
    pub dry_run: bool,
    pub scanned: Vec<ScanSummary>,
    pub links: Vec<LinkInfo>,
    /// Links removed, or that would be removed.
    pub removed: usize,
    pub failures: Vec<RemovalFailure>,
}

/// Remove the links under `game_path`.
///
/// The root is scanned one level deep and each of `scan_dirs` (relative to
/// the root) recursively; with `opts.recursive` the whole tree is scanned.
#[instrument(skip(fs, scan_dirs), fields(game_path = %game_path.display()))]
pub fn cleanup(
    fs: &dyn Filesystem,
    game_path: &Path,
    scan_dirs: &[PathBuf],
    opts: CleanupOptions,
) -> Result<CleanupReport> {
    if fs.stat(game_path)? != Some(EntryKind::Dir) {
        return Err(VxError::PathNotFound {
            what: "Game path",
            path: game_path.to_path_buf(),
        });
    }

    let targets: Vec<(PathBuf, bool)> = if opts.recursive {
        vec![(game_path.to_path_buf(), true)]
    } else {
        std::iter::once((game_path.to_path_buf(), false))
            .chain(scan_dirs.iter().map(|d| (game_path.join(d), true)))
            .collect()
    };

    let mut found = BTreeSet::new();
    let mut scanned = Vec::with_capacity(targets.len());
    for (dir, recursive) in targets {
        let links = find_links(fs, &dir, recursive)?;
        scanned.push(ScanSummary {
            dir,
            recursive,
            found: links.len(),
        });
        found.extend(links);
    }

    let links: Vec<LinkInfo> = found
        .iter()
        .map(|path| LinkInfo {
            relative: path.strip_prefix(game_path).unwrap_or(path).to_path_buf(),
            target: fs.read_link(path).ok(),
            path: path.clone(),
        })
        .collect();

    let paths: Vec<PathBuf> = found.into_iter().collect();
    let outcome = remove_links(fs, &paths, opts.dry_run);
    info!(
        found = paths.len(),
        removed = outcome.removed.len(),
        failed = outcome.failures.len(),
        "Cleanup finished"
    );

    Ok(CleanupReport {
        game_path: game_path.to_path_buf(),
        dry_run: opts.dry_run,
        scanned,
        links,
        removed: outcome.removed.len(),
        failures: outcome.failures,
    })
}
