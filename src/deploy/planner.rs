//! Selection and ordering of the mods to deploy.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::config::DeployConfig;
use crate::error::Result;
use crate::fs::{EntryKind, Filesystem};
use crate::registry::{ModRecord, ModRegistry};

/// Where a deployable mod goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModKind {
    /// Deployed into the game root.
    Framework,
    /// Deployed into the plugins directory.
    Plugin,
}

/// Why an enabled mod is not deployed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    ExcludedType { mod_type: String },
    UnsupportedType { mod_type: String },
    NoInstallationPath,
    StagingDirMissing { path: PathBuf },
    StagingUnreadable { path: PathBuf, error: String },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ExcludedType { mod_type } => write!(f, "Excluded type {mod_type}"),
            Self::UnsupportedType { mod_type } if mod_type.is_empty() => {
                f.write_str("No mod type recorded")
            }
            Self::UnsupportedType { mod_type } => write!(f, "Unsupported type {mod_type}"),
            Self::NoInstallationPath => f.write_str("No installation path"),
            Self::StagingDirMissing { path } => {
                write!(f, "Staging directory not found: {}", path.display())
            }
            Self::StagingUnreadable { path, error } => {
                write!(f, "Staging directory unreadable: {} ({error})", path.display())
            }
        }
    }
}

/// Classify a mod type under the deployment rules.
pub fn mod_kind(rules: &DeployConfig, mod_type: &str) -> std::result::Result<ModKind, SkipReason> {
    if rules.excluded_types.iter().any(|t| t == mod_type) {
        return Err(SkipReason::ExcludedType {
            mod_type: mod_type.to_string(),
        });
    }
    if mod_type == rules.framework_type {
        Ok(ModKind::Framework)
    } else if mod_type == rules.plugin_type {
        Ok(ModKind::Plugin)
    } else {
        Err(SkipReason::UnsupportedType {
            mod_type: mod_type.to_string(),
        })
    }
}

/// One mod ready to be synchronized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedMod {
    pub mod_id: String,
    pub name: String,
    pub mod_type: String,
    pub kind: ModKind,
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// A selected mod that will not be synchronized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedMod {
    pub mod_id: String,
    pub name: String,
    #[serde(flatten)]
    pub reason: SkipReason,
}

/// Ordered deployment plan for the active profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploymentPlan {
    pub profile_id: String,
    /// Enabled mods of a deployable type, including the skipped ones.
    pub selected: usize,
    pub framework_count: usize,
    pub plugin_count: usize,
    /// In deployment order, skipped entries interleaved where they fell.
    pub steps: Vec<PlanStep>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PlanStep {
    Deploy(PlannedMod),
    Skip(SkippedMod),
}

impl DeploymentPlan {
    pub fn planned(&self) -> impl Iterator<Item = &PlannedMod> {
        self.steps.iter().filter_map(|s| match s {
            PlanStep::Deploy(m) => Some(m),
            PlanStep::Skip(_) => None,
        })
    }

    pub fn skipped(&self) -> impl Iterator<Item = &SkippedMod> {
        self.steps.iter().filter_map(|s| match s {
            PlanStep::Skip(m) => Some(m),
            PlanStep::Deploy(_) => None,
        })
    }
}

/// Build the plan for the registry's active profile.
///
/// Mods enabled under `rules.enabled_policy` whose type is the framework or
/// plugin type are selected, framework first, then by display name and
/// mod id. Selected mods without an installation path or with a missing or
/// unreadable staging directory become skip steps.
#[instrument(skip_all, fields(game_root = %game_root.display(), staging_root = %staging_root.display()))]
pub fn plan(
    registry: &ModRegistry,
    rules: &DeployConfig,
    fs: &dyn Filesystem,
    game_root: &Path,
    staging_root: &Path,
) -> Result<DeploymentPlan> {
    let profile_id = registry.require_active_profile()?;

    let mut selected: Vec<(ModKind, &ModRecord)> = registry
        .enabled_mod_ids(profile_id, rules.enabled_policy)
        .into_iter()
        .filter_map(|id| registry.resolve(id))
        .filter_map(|record| match mod_kind(rules, record.mod_type()) {
            Ok(kind) => Some((kind, record)),
            Err(reason) => {
                debug!(mod_id = %record.mod_id, %reason, "Not deployable");
                None
            }
        })
        .collect();

    selected.sort_by(|(ka, a), (kb, b)| {
        ka.cmp(kb)
            .then_with(|| a.display_name().as_bytes().cmp(b.display_name().as_bytes()))
            .then_with(|| a.mod_id.cmp(&b.mod_id))
    });

    let plugins_dir = game_root.join(&rules.plugins_subdir);
    let mut steps = Vec::with_capacity(selected.len());
    for &(kind, record) in &selected {
        let name = record.display_name().to_string();
        let skip = |reason: SkipReason| {
            warn!(mod_name = %name, %reason, "Skipping mod");
            PlanStep::Skip(SkippedMod {
                mod_id: record.mod_id.clone(),
                name: name.clone(),
                reason,
            })
        };

        let install = record.installation_path.as_deref().unwrap_or("");
        if install.is_empty() {
            steps.push(skip(SkipReason::NoInstallationPath));
            continue;
        }

        let source = staging_root.join(install);
        match fs.stat(&source) {
            Ok(Some(EntryKind::Dir)) => {}
            Ok(_) => {
                steps.push(skip(SkipReason::StagingDirMissing { path: source }));
                continue;
            }
            Err(e) => {
                steps.push(skip(SkipReason::StagingUnreadable {
                    path: source,
                    error: e.to_string(),
                }));
                continue;
            }
        }

        let destination = match kind {
            ModKind::Framework => game_root.to_path_buf(),
            ModKind::Plugin => plugins_dir.clone(),
        };
        steps.push(PlanStep::Deploy(PlannedMod {
            mod_id: record.mod_id.clone(),
            name,
            mod_type: record.mod_type().to_string(),
            kind,
            source,
            destination,
        }));
    }

    let framework_count = selected
        .iter()
        .filter(|(k, _)| *k == ModKind::Framework)
        .count();
    Ok(DeploymentPlan {
        profile_id: profile_id.to_string(),
        selected: selected.len(),
        framework_count,
        plugin_count: selected.len() - framework_count,
        steps,
    })
}
