//! Error types for mod deployment operations.

use std::path::PathBuf;

use thiserror::Error;

/// Primary error type for store reading, planning and deployment.
///
/// Only conditions that stop the current command live here. Undecodable
/// store entries are counted during the scan, and single-mod or single-link
/// failures are recorded in the command report instead.
#[derive(Error, Debug)]
pub enum VxError {
    // Store errors
    #[error("Mod manager database not found (looked in: {})", format_candidates(.candidates))]
    StoreNotFound { candidates: Vec<PathBuf> },

    #[error("Failed to open database at {}: {reason}", .path.display())]
    StoreOpen { path: PathBuf, reason: String },

    #[error("Database is in use by another process (lock artifact present: {})", .sentinel.display())]
    ExternalWriterDetected { sentinel: PathBuf },

    #[error("Failed to snapshot database {} into {}: {reason}", .source_path.display(), .snapshot.display())]
    SnapshotFailed {
        source_path: PathBuf,
        snapshot: PathBuf,
        reason: String,
    },

    // Registry errors
    #[error("Could not find active profile for {game}")]
    MissingActiveProfile { game: String },

    #[error("No {setting} recorded for {game}")]
    MissingSetting { setting: &'static str, game: String },

    // Filesystem preconditions
    #[error("{what} does not exist: {}", .path.display())]
    PathNotFound { what: &'static str, path: PathBuf },

    // Configuration errors
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    #[error("Configuration parse error: {0}")]
    ConfigParse(String),

    #[error("Configuration file already exists: {path}")]
    ConfigExists { path: String },

    // General errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

fn format_candidates(candidates: &[PathBuf]) -> String {
    candidates
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl VxError {
    /// Returns true if the error is recoverable by the user.
    pub const fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            Self::StoreNotFound { .. }
                | Self::ExternalWriterDetected { .. }
                | Self::MissingActiveProfile { .. }
                | Self::MissingSetting { .. }
                | Self::PathNotFound { .. }
                | Self::ConfigNotFound { .. }
                | Self::ConfigExists { .. }
        )
    }

    /// Returns a suggestion for how to fix the error.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::StoreNotFound { .. } => Some("Pass the state.v2 directory with --db"),
            Self::ExternalWriterDetected { .. } => {
                Some("Close Vortex so it releases the database, then re-run")
            }
            Self::MissingActiveProfile { .. } => {
                Some("Open the game in Vortex once so it records an active profile, or check --game")
            }
            Self::MissingSetting { .. } => {
                Some("Pass the path explicitly with --game-path / --staging-path")
            }
            Self::PathNotFound { .. } => {
                Some("Paths outside the Z: drive cannot be translated; pass the native path explicitly")
            }
            Self::ConfigNotFound { .. } => Some("Run: vxl init"),
            Self::ConfigExists { .. } => Some("Use --force to overwrite"),
            _ => None,
        }
    }
}

/// Convenience type alias for Results using VxError.
pub type Result<T> = std::result::Result<T, VxError>;
