//! Translation of the mod manager's Windows-style paths to host paths.
//!
//! Under Wine/Proton the `Z:` drive maps to the host root, so
//! `Z:\Games\Subnautica` is `/Games/Subnautica`. Other drives cannot be
//! mapped without knowing the prefix; they only get their separators
//! flipped, and callers must check that the result exists.

use std::path::PathBuf;

const HOST_ROOT_DRIVE: &str = "Z:\\";

/// Translate a stored path to a host path string.
pub fn translate(raw: &str) -> String {
    match raw.strip_prefix(HOST_ROOT_DRIVE) {
        Some(rest) => format!("/{}", rest.replace('\\', "/")),
        None => raw.replace('\\', "/"),
    }
}

pub fn translate_path(raw: &str) -> PathBuf {
    PathBuf::from(translate(raw))
}
