//! Read-only views over the store and the registry.
//!
//! These back the `list`, `paths`, `compare`, `profiles`, `stats` and
//! `dump` commands. Nothing here touches the game directory.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::instrument;

use crate::config::DeployConfig;
use crate::deploy::planner::mod_kind;
use crate::error::Result;
use crate::registry::{EnabledPolicy, ModRecord, ModRegistry, ModRegistryBuilder, ScanStats};
use crate::store::{KvStore, StoreEntry};
use crate::translate::translate_path;

/// Descriptions longer than this are cut, ellipsis included.
pub const DESCRIPTION_LIMIT: usize = 100;

/// Cut `text` to at most `limit` characters, ending in `...` when cut.
pub fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let kept: String = text.chars().take(limit.saturating_sub(3)).collect();
    format!("{kept}...")
}

/// Render an `enabledTime` holding epoch milliseconds as a UTC timestamp.
pub fn format_enabled_time(raw: &str) -> Option<String> {
    let millis: i64 = raw.trim().parse().ok()?;
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
}

/// Sort key for `enabledTime` values: numbers by value, then text.
fn time_key(time: Option<&str>) -> (Option<u64>, Option<&str>) {
    (time.and_then(|t| t.trim().parse().ok()), time)
}

// === list ===

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnabledMod {
    pub mod_id: String,
    pub name: String,
    /// False when the profile enables a mod with no record for this game.
    pub recorded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub mod_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled_time: Option<String>,
    /// `enabled_time` as a readable UTC timestamp, when it is numeric.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnabledModsReport {
    pub game: String,
    pub profile_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_name: Option<String>,
    pub policy: EnabledPolicy,
    pub installed: usize,
    pub mods: Vec<EnabledMod>,
}

/// Mods enabled in the active profile, most recently enabled first.
///
/// Mods the profile enables but that have no record for this game are still
/// listed, under their id and without details.
#[instrument(skip(registry))]
pub fn enabled_mods(registry: &ModRegistry, policy: EnabledPolicy) -> Result<EnabledModsReport> {
    let profile_id = registry.require_active_profile()?;

    let candidates: BTreeSet<&str> = registry
        .all_mod_ids()
        .chain(registry.flagged_mod_ids(profile_id))
        .chain(registry.timed_mod_ids(profile_id))
        .collect();
    let mut mods: Vec<EnabledMod> = candidates
        .into_iter()
        .filter(|id| registry.is_enabled_by(profile_id, id, policy))
        .map(|id| enabled_mod(registry, profile_id, id))
        .collect();
    mods.sort_by(|a, b| {
        Reverse(time_key(a.enabled_time.as_deref()))
            .cmp(&Reverse(time_key(b.enabled_time.as_deref())))
            .then_with(|| a.name.cmp(&b.name))
    });

    Ok(EnabledModsReport {
        game: registry.game().to_string(),
        profile_id: profile_id.to_string(),
        profile_name: registry.profile_name(profile_id).map(str::to_string),
        policy,
        installed: registry.mod_count(),
        mods,
    })
}

fn enabled_mod(registry: &ModRegistry, profile_id: &str, mod_id: &str) -> EnabledMod {
    let record = registry.resolve(mod_id);
    let enabled_time = registry.enabled_time(profile_id, mod_id);
    EnabledMod {
        mod_id: mod_id.to_string(),
        name: record.map_or(mod_id, ModRecord::display_name).to_string(),
        recorded: record.is_some(),
        version: record.and_then(|m| m.mod_version.clone()),
        author: record.and_then(|m| m.author.clone()),
        description: record
            .and_then(|m| m.short_description.as_deref())
            .filter(|d| !d.is_empty())
            .map(|d| truncate(d, DESCRIPTION_LIMIT)),
        mod_type: record.and_then(|m| m.mod_type.clone()),
        enabled_time: enabled_time.map(str::to_string),
        enabled_at: enabled_time.and_then(format_enabled_time),
    }
}

// === paths ===

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModPaths {
    pub mod_id: String,
    pub name: String,
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub mod_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installation_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModPathsReport {
    pub game: String,
    pub profile_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staging_path: Option<String>,
    pub total_mods: usize,
    pub enabled_mods: usize,
    pub show_all: bool,
    pub mods: Vec<ModPaths>,
}

/// Installation details per mod, sorted by display name.
#[instrument(skip(registry))]
pub fn mod_paths(
    registry: &ModRegistry,
    policy: EnabledPolicy,
    show_all: bool,
) -> Result<ModPathsReport> {
    let profile_id = registry.require_active_profile()?;
    let staging = registry.staging_path().map(translate_path);

    let mut records: Vec<&ModRecord> = registry.mods().collect();
    records.sort_by(|a, b| {
        a.display_name()
            .cmp(b.display_name())
            .then_with(|| a.mod_id.cmp(&b.mod_id))
    });

    let enabled_mods = records
        .iter()
        .filter(|m| registry.is_enabled_by(profile_id, &m.mod_id, policy))
        .count();

    let mods = records
        .into_iter()
        .map(|m| (m, registry.is_enabled_by(profile_id, &m.mod_id, policy)))
        .filter(|(_, enabled)| show_all || *enabled)
        .map(|(m, enabled)| ModPaths {
            mod_id: m.mod_id.clone(),
            name: m.display_name().to_string(),
            enabled,
            version: m.mod_version.clone(),
            mod_type: m.mod_type.clone(),
            state: m.state.clone(),
            installation_path: m.installation_path.clone(),
            full_path: staging
                .as_ref()
                .zip(m.installation_path.as_deref())
                .map(|(root, install)| root.join(install)),
        })
        .collect();

    Ok(ModPathsReport {
        game: registry.game().to_string(),
        profile_id: profile_id.to_string(),
        profile_name: registry.profile_name(profile_id).map(str::to_string),
        game_path: registry.game_path().map(str::to_string),
        staging_path: registry.staging_path().map(str::to_string),
        total_mods: registry.mod_count(),
        enabled_mods,
        show_all,
        mods,
    })
}

// === compare ===

/// An enabled mod the deployment leaves out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotDeployed {
    pub mod_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub mod_type: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompareReport {
    pub profile_id: String,
    /// `enabled == true` without an `enabledTime`.
    pub flag_only: Vec<String>,
    /// `enabledTime` present, flag absent or false.
    pub time_only: Vec<String>,
    pub both: Vec<String>,
    pub deploy_policy: EnabledPolicy,
    /// Mods the deployment would select.
    pub deployable: Vec<String>,
    /// Mods with both indicators that the deployment would not select.
    pub not_deployed: Vec<NotDeployed>,
}

/// Compare the two enabled indicators with what a deployment would select.
#[instrument(skip_all)]
pub fn compare(registry: &ModRegistry, rules: &DeployConfig) -> Result<CompareReport> {
    let profile_id = registry.require_active_profile()?;
    let flagged = registry.flagged_mod_ids(profile_id);
    let timed = registry.timed_mod_ids(profile_id);

    let owned = |set: BTreeSet<&str>| set.into_iter().map(str::to_string).collect::<Vec<_>>();
    let both: BTreeSet<&str> = flagged.intersection(&timed).copied().collect();

    let deployable: BTreeSet<&str> = registry
        .enabled_mod_ids(profile_id, rules.enabled_policy)
        .into_iter()
        .filter(|id| {
            registry
                .resolve(id)
                .is_some_and(|m| mod_kind(rules, m.mod_type()).is_ok())
        })
        .collect();

    let not_deployed = both
        .difference(&deployable)
        .map(|id| {
            let record = registry.resolve(id);
            let reason = match record {
                None => "No mod record for this game".to_string(),
                Some(m) => match mod_kind(rules, m.mod_type()) {
                    Err(reason) => reason.to_string(),
                    Ok(_) => format!("Not enabled under the {} policy", rules.enabled_policy),
                },
            };
            NotDeployed {
                mod_id: (*id).to_string(),
                name: record.map_or(*id, ModRecord::display_name).to_string(),
                mod_type: record.map_or("", ModRecord::mod_type).to_string(),
                reason,
            }
        })
        .collect();

    Ok(CompareReport {
        profile_id: profile_id.to_string(),
        flag_only: owned(flagged.difference(&timed).copied().collect()),
        time_only: owned(timed.difference(&flagged).copied().collect()),
        both: owned(both),
        deploy_policy: rules.enabled_policy,
        deployable: owned(deployable),
        not_deployed,
    })
}

// === profiles ===

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileSummary {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game: Option<String>,
    pub active: bool,
    /// Mods of the selected game flagged enabled in this profile.
    pub enabled_mods: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfilesReport {
    pub game: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_profile: Option<String>,
    pub profiles: Vec<ProfileSummary>,
}

/// Every profile in the store. Missing active profile is not an error here.
pub fn profiles(registry: &ModRegistry) -> ProfilesReport {
    let active = registry.active_profile_id();
    ProfilesReport {
        game: registry.game().to_string(),
        active_profile: active.map(str::to_string),
        profiles: registry
            .profiles()
            .map(|p| ProfileSummary {
                id: p.id.clone(),
                name: p.name.clone(),
                game: p.game.clone(),
                active: Some(p.id.as_str()) == active,
                enabled_mods: registry.enabled_mod_ids(&p.id, EnabledPolicy::Flag).len(),
            })
            .collect(),
    }
}

// === stats / dump ===

/// One raw entry in every encoding a reader might want.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DumpEntry {
    pub key_hex: String,
    pub key_bytes: Vec<u8>,
    pub value_hex: String,
    pub value_bytes: Vec<u8>,
    pub key_length: usize,
    pub value_length: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_utf8: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_utf8: Option<String>,
}

impl From<&StoreEntry> for DumpEntry {
    fn from(entry: &StoreEntry) -> Self {
        Self {
            key_hex: hex::encode(&entry.key),
            key_bytes: entry.key.clone(),
            value_hex: hex::encode(&entry.value),
            value_bytes: entry.value.clone(),
            key_length: entry.key.len(),
            value_length: entry.value.len(),
            key_utf8: String::from_utf8(entry.key.clone()).ok(),
            value_utf8: String::from_utf8(entry.value.clone()).ok(),
        }
    }
}

/// Every entry in store order.
#[instrument(skip(store))]
pub fn dump_entries(store: &mut dyn KvStore) -> Result<Vec<DumpEntry>> {
    let mut out = Vec::new();
    store.for_each_entry(&mut |entry| out.push(DumpEntry::from(&entry)))?;
    Ok(out)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LengthStats {
    pub min: usize,
    pub max: usize,
    pub avg: f64,
}

#[derive(Debug, Default)]
struct LengthAccumulator {
    min: usize,
    max: usize,
    sum: usize,
    count: usize,
}

impl LengthAccumulator {
    fn add(&mut self, len: usize) {
        if self.count == 0 || len < self.min {
            self.min = len;
        }
        self.max = self.max.max(len);
        self.sum += len;
        self.count += 1;
    }

    #[allow(clippy::cast_precision_loss)]
    fn finish(&self) -> Option<LengthStats> {
        (self.count > 0).then(|| LengthStats {
            min: self.min,
            max: self.max,
            avg: self.sum as f64 / self.count as f64,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrefixCount {
    pub prefix_hex: String,
    pub count: usize,
}

/// Byte-prefix widths reported by [`store_stats`].
pub const PREFIX_WIDTHS: [usize; 4] = [1, 2, 4, 8];

/// Prefixes kept per width.
const TOP_PREFIXES: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreStats {
    pub total_entries: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_lengths: Option<LengthStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_lengths: Option<LengthStats>,
    /// Key length in bytes to number of keys.
    pub key_length_distribution: BTreeMap<usize, usize>,
    /// Most common key prefixes per width, most frequent first.
    pub common_prefixes: BTreeMap<usize, Vec<PrefixCount>>,
    /// First `###` segment of UTF-8 keys to number of keys.
    pub namespaces: BTreeMap<String, usize>,
    pub non_utf8_keys: usize,
    /// How the registry decoder fared on this store for the selected game.
    pub decoder: ScanStats,
    pub samples: Vec<DumpEntry>,
}

/// Structural statistics over one pass of the store.
#[instrument(skip(store))]
pub fn store_stats(store: &mut dyn KvStore, game: &str, samples: usize) -> Result<StoreStats> {
    let mut keys = LengthAccumulator::default();
    let mut values = LengthAccumulator::default();
    let mut distribution = BTreeMap::new();
    let mut prefixes: BTreeMap<(usize, Vec<u8>), usize> = BTreeMap::new();
    let mut namespaces = BTreeMap::new();
    let mut non_utf8_keys = 0;
    let mut sample_entries = Vec::with_capacity(samples);
    let mut decoder = ModRegistryBuilder::new(game);

    store.for_each_entry(&mut |entry| {
        keys.add(entry.key.len());
        values.add(entry.value.len());
        *distribution.entry(entry.key.len()).or_insert(0) += 1;
        for width in PREFIX_WIDTHS {
            if let Some(prefix) = entry.key.get(..width) {
                *prefixes.entry((width, prefix.to_vec())).or_insert(0) += 1;
            }
        }
        match std::str::from_utf8(&entry.key) {
            Ok(text) => {
                let ns = text.split(crate::registry::keypath::DELIMITER).next().unwrap_or("");
                *namespaces.entry(ns.to_string()).or_insert(0) += 1;
            }
            Err(_) => non_utf8_keys += 1,
        }
        decoder.push(&entry);
        if sample_entries.len() < samples {
            sample_entries.push(DumpEntry::from(&entry));
        }
    })?;

    let mut common_prefixes: BTreeMap<usize, Vec<PrefixCount>> = BTreeMap::new();
    for ((width, prefix), count) in prefixes {
        common_prefixes.entry(width).or_default().push(PrefixCount {
            prefix_hex: hex::encode(prefix),
            count,
        });
    }
    for list in common_prefixes.values_mut() {
        list.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.prefix_hex.cmp(&b.prefix_hex)));
        list.truncate(TOP_PREFIXES);
    }

    Ok(StoreStats {
        total_entries: keys.count,
        key_lengths: keys.finish(),
        value_lengths: values.finish(),
        key_length_distribution: distribution,
        common_prefixes,
        namespaces,
        non_utf8_keys,
        decoder: decoder.finish().stats(),
        samples: sample_entries,
    })
}
