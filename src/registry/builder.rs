//! One-pass reconstruction of mod records from the flat store.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info, instrument, trace};

use super::keypath::{classify, KeyPath, StoreKey};
use super::value::{as_flag, as_text, decode};
use super::EnabledPolicy;
use crate::error::{Result, VxError};
use crate::store::{KvStore, StoreEntry};

/// A mod as reconstructed from its store keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModRecord {
    pub mod_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installation_path: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub mod_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mod_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_description: Option<String>,
    /// Every other attribute, nested keys folded into JSON objects.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, Value>,
}

impl ModRecord {
    fn new(mod_id: &str) -> Self {
        Self {
            mod_id: mod_id.to_string(),
            ..Self::default()
        }
    }

    /// Display name, falling back to the mod id.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.mod_id)
    }

    pub fn mod_type(&self) -> &str {
        self.mod_type.as_deref().unwrap_or("")
    }

    fn set_field(&mut self, field: &str, value: &Value) {
        let text = as_text(value);
        match field {
            "installationPath" => self.installation_path = text,
            "type" => self.mod_type = text,
            "state" => self.state = text,
            _ => {}
        }
    }

    fn set_attribute(&mut self, attr: &str, nested: &[String], value: Value) {
        if nested.is_empty() {
            match attr {
                "name" => self.name = as_text(&value),
                "modVersion" => self.mod_version = as_text(&value),
                "author" => self.author = as_text(&value),
                "shortDescription" => self.short_description = as_text(&value),
                _ => {
                    self.attributes.insert(attr.to_string(), value);
                }
            }
            return;
        }

        let slot = self
            .attributes
            .entry(attr.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        insert_nested(slot, nested, value);
    }
}

/// Place `value` at `path` inside `slot`, turning non-objects into objects.
fn insert_nested(slot: &mut Value, path: &[String], value: Value) {
    let mut current = slot;
    for (i, segment) in path.iter().enumerate() {
        if !current.is_object() {
            *current = Value::Object(Map::new());
        }
        let Value::Object(map) = current else {
            return;
        };
        if i + 1 == path.len() {
            map.insert(segment.clone(), value);
            return;
        }
        current = map
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
    }
}

/// A profile as seen in the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProfileInfo {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game: Option<String>,
}

/// Entry counts for one scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    pub total: usize,
    pub matched: usize,
    pub skipped: usize,
}

/// Accumulates store entries for one game.
#[derive(Debug)]
pub struct ModRegistryBuilder {
    registry: ModRegistry,
}

impl ModRegistryBuilder {
    pub fn new(game: impl Into<String>) -> Self {
        Self {
            registry: ModRegistry {
                game: game.into(),
                ..ModRegistry::default()
            },
        }
    }

    /// Feed one entry. Entries that do not apply are counted, never errors.
    pub fn push(&mut self, entry: &StoreEntry) {
        self.registry.stats.total += 1;
        if self.apply(entry) {
            self.registry.stats.matched += 1;
        } else {
            self.registry.stats.skipped += 1;
        }
    }

    fn apply(&mut self, entry: &StoreEntry) -> bool {
        let Some(path) = KeyPath::parse(&entry.key) else {
            trace!(len = entry.key.len(), "Skipping non-UTF-8 key");
            return false;
        };
        let Some(key) = classify(&path) else {
            return false;
        };
        let Some(value) = decode(&entry.value) else {
            trace!(key = %path, "Skipping undecodable value");
            return false;
        };

        let reg = &mut self.registry;
        let game = reg.game.as_str();
        match key {
            StoreKey::ActiveProfile { game: g } if g == game => {
                reg.active_profile = as_text(&value);
            }
            StoreKey::GamePath { game: g } if g == game => {
                reg.game_path = as_text(&value);
            }
            StoreKey::StagingPath { game: g } if g == game => {
                reg.staging_path = as_text(&value);
            }
            StoreKey::ProfileName { profile_id } => {
                reg.profile_mut(profile_id).name = as_text(&value);
            }
            StoreKey::ProfileGame { profile_id } => {
                reg.profile_mut(profile_id).game = as_text(&value);
            }
            StoreKey::ModField {
                game: g,
                mod_id,
                field,
            } if g == game => {
                reg.mod_mut(mod_id).set_field(field, &value);
            }
            StoreKey::ModAttribute {
                game: g,
                mod_id,
                attr,
                nested,
            } if g == game => {
                reg.mod_mut(mod_id).set_attribute(attr, nested, value);
            }
            StoreKey::ModEnabled { profile_id, mod_id } => {
                reg.enabled
                    .entry(profile_id.to_string())
                    .or_default()
                    .insert(mod_id.to_string(), as_flag(&value));
            }
            StoreKey::ModEnabledTime { profile_id, mod_id } => {
                let Some(time) = as_text(&value) else {
                    return false;
                };
                reg.enabled_time
                    .entry(profile_id.to_string())
                    .or_default()
                    .insert(mod_id.to_string(), time);
            }
            // Settings and mods belonging to another game.
            _ => return false,
        }
        true
    }

    pub fn finish(self) -> ModRegistry {
        self.registry
    }

    /// Scan a whole store.
    #[instrument(skip(store))]
    pub fn build_from(store: &mut dyn KvStore, game: &str) -> Result<ModRegistry> {
        let mut builder = Self::new(game);
        store.for_each_entry(&mut |entry| builder.push(&entry))?;
        let registry = builder.finish();

        let stats = registry.stats;
        info!(
            total = stats.total,
            matched = stats.matched,
            skipped = stats.skipped,
            mods = registry.mods.len(),
            "Store scan complete"
        );
        debug!(active_profile = ?registry.active_profile, "Registry built");
        Ok(registry)
    }
}

/// Everything the store knows about one game's mods.
#[derive(Debug, Clone, Default)]
pub struct ModRegistry {
    game: String,
    active_profile: Option<String>,
    game_path: Option<String>,
    staging_path: Option<String>,
    profiles: BTreeMap<String, ProfileInfo>,
    mods: BTreeMap<String, ModRecord>,
    enabled: BTreeMap<String, BTreeMap<String, bool>>,
    enabled_time: BTreeMap<String, BTreeMap<String, String>>,
    stats: ScanStats,
}

impl ModRegistry {
    fn profile_mut(&mut self, id: &str) -> &mut ProfileInfo {
        self.profiles
            .entry(id.to_string())
            .or_insert_with(|| ProfileInfo {
                id: id.to_string(),
                ..ProfileInfo::default()
            })
    }

    fn mod_mut(&mut self, id: &str) -> &mut ModRecord {
        self.mods
            .entry(id.to_string())
            .or_insert_with(|| ModRecord::new(id))
    }

    pub fn game(&self) -> &str {
        &self.game
    }

    pub fn stats(&self) -> ScanStats {
        self.stats
    }

    pub fn active_profile_id(&self) -> Option<&str> {
        self.active_profile.as_deref()
    }

    /// The active profile, or [`VxError::MissingActiveProfile`].
    pub fn require_active_profile(&self) -> Result<&str> {
        self.active_profile_id()
            .ok_or_else(|| VxError::MissingActiveProfile {
                game: self.game.clone(),
            })
    }

    pub fn resolve(&self, mod_id: &str) -> Option<&ModRecord> {
        self.mods.get(mod_id)
    }

    /// The `enabled` flag; `false` when the store says nothing.
    pub fn is_enabled(&self, profile_id: &str, mod_id: &str) -> bool {
        self.enabled
            .get(profile_id)
            .and_then(|mods| mods.get(mod_id))
            .copied()
            .unwrap_or(false)
    }

    pub fn enabled_time(&self, profile_id: &str, mod_id: &str) -> Option<&str> {
        self.enabled_time
            .get(profile_id)
            .and_then(|mods| mods.get(mod_id))
            .map(String::as_str)
    }

    /// Combine both indicators under `policy`.
    pub fn is_enabled_by(&self, profile_id: &str, mod_id: &str, policy: EnabledPolicy) -> bool {
        policy.accepts(
            self.is_enabled(profile_id, mod_id),
            self.enabled_time(profile_id, mod_id).is_some(),
        )
    }

    /// Mod ids of this game that are enabled in `profile_id` under `policy`.
    ///
    /// Mod ids that appear only in the enabled indexes (no record for this
    /// game) are not returned.
    pub fn enabled_mod_ids(&self, profile_id: &str, policy: EnabledPolicy) -> Vec<&str> {
        self.mods
            .keys()
            .map(String::as_str)
            .filter(|id| self.is_enabled_by(profile_id, id, policy))
            .collect()
    }

    /// Mod ids with an `enabled` flag set to true in `profile_id`.
    pub fn flagged_mod_ids(&self, profile_id: &str) -> BTreeSet<&str> {
        self.enabled
            .get(profile_id)
            .into_iter()
            .flatten()
            .filter(|(_, on)| **on)
            .map(|(id, _)| id.as_str())
            .collect()
    }

    /// Mod ids with an `enabledTime` entry in `profile_id`.
    pub fn timed_mod_ids(&self, profile_id: &str) -> BTreeSet<&str> {
        self.enabled_time
            .get(profile_id)
            .into_iter()
            .flat_map(BTreeMap::keys)
            .map(String::as_str)
            .collect()
    }

    /// Every mod id in byte order.
    pub fn all_mod_ids(&self) -> impl Iterator<Item = &str> {
        self.mods.keys().map(String::as_str)
    }

    pub fn mods(&self) -> impl Iterator<Item = &ModRecord> {
        self.mods.values()
    }

    pub fn mod_count(&self) -> usize {
        self.mods.len()
    }

    /// The store's game directory, still in the mod manager's path form.
    pub fn game_path(&self) -> Option<&str> {
        self.game_path.as_deref()
    }

    /// The store's staging directory, still in the mod manager's path form.
    pub fn staging_path(&self) -> Option<&str> {
        self.staging_path.as_deref()
    }

    pub fn profiles(&self) -> impl Iterator<Item = &ProfileInfo> {
        self.profiles.values()
    }

    pub fn profile_name(&self, profile_id: &str) -> Option<&str> {
        self.profiles
            .get(profile_id)
            .and_then(|p| p.name.as_deref())
    }
}
