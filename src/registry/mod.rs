//! Mod registry reconstructed from the mod manager's state store.
//!
//! - [`keypath`]: splitting and classifying `###`-delimited keys
//! - [`value`]: JSON-or-text value decoding
//! - [`builder`]: the single pass that accumulates [`ModRecord`]s

pub mod builder;
pub mod keypath;
pub mod value;

pub use builder::{ModRecord, ModRegistry, ModRegistryBuilder, ProfileInfo, ScanStats};
pub use keypath::{classify, KeyPath, StoreKey};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// How the `enabled` flag and the `enabledTime` entry are combined into a
/// single "is this mod on" answer.
///
/// The store keeps both and they disagree in practice: mods disabled in the
/// UI keep their `enabledTime`, and some imports set the flag without a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EnabledPolicy {
    /// `enabled == true`.
    #[default]
    Flag,
    /// An `enabledTime` entry exists.
    Time,
    /// Both of the above.
    Both,
    /// Either of the above.
    Either,
}

impl EnabledPolicy {
    pub const fn accepts(self, flag: bool, has_time: bool) -> bool {
        match self {
            Self::Flag => flag,
            Self::Time => has_time,
            Self::Both => flag && has_time,
            Self::Either => flag || has_time,
        }
    }
}

impl std::fmt::Display for EnabledPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Flag => "flag",
            Self::Time => "time",
            Self::Both => "both",
            Self::Either => "either",
        };
        f.write_str(name)
    }
}
