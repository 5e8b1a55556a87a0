//! Output mode abstraction for robot and human output.

use std::path::Path;

use crate::cli::Cli;
use crate::deploy::{CleanupReport, DeployReport};
use crate::error::VxError;
use crate::inspect::{
    CompareReport, DumpEntry, EnabledModsReport, ModPathsReport, ProfilesReport, StoreStats,
};

pub mod human;
pub mod report;
pub mod robot;

pub use human::HumanOutput;
pub use report::{write_report_file, ConfigReport, PathStatus, VersionInfo};
pub use robot::RobotOutput;

/// JSON formatting options for robot mode.
#[derive(Debug, Clone, Copy)]
pub enum RobotFormat {
    /// Pretty-printed JSON (default for --robot).
    Json,
    /// Single-line JSON (--format=json-compact).
    JsonCompact,
}

/// Determines how command output is rendered.
#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    /// JSON output for agents and scripting.
    Robot(RobotFormat),
    /// Styled terminal output; `verbose` adds per-link listings.
    Human { verbose: bool },
}

impl OutputMode {
    /// Create OutputMode from CLI arguments.
    #[must_use]
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.use_json() {
            let format = if cli.use_compact_json() {
                RobotFormat::JsonCompact
            } else {
                RobotFormat::Json
            };
            Self::Robot(format)
        } else {
            if cli.no_color {
                console::set_colors_enabled(false);
                console::set_colors_enabled_stderr(false);
            }
            Self::Human {
                verbose: cli.verbose > 0,
            }
        }
    }

    /// Returns true if output should be JSON.
    #[must_use]
    pub const fn is_robot(&self) -> bool {
        matches!(self, Self::Robot(_))
    }

    /// Convert into the appropriate Output implementation.
    #[must_use]
    pub fn into_output(self) -> Box<dyn Output> {
        match self {
            Self::Robot(format) => Box::new(RobotOutput::new(format)),
            Self::Human { verbose } => Box::new(HumanOutput::new(verbose)),
        }
    }
}

/// Trait for all output operations.
///
/// Commands call these methods without knowing the output mode.
pub trait Output {
    // Basic messages
    fn success(&self, message: &str);
    fn error(&self, error: &VxError);
    fn warning(&self, message: &str);
    fn info(&self, message: &str);

    // Deployment
    fn deploy_report(&self, report: &DeployReport);
    fn cleanup_report(&self, report: &CleanupReport);

    // Inspection
    fn enabled_mods(&self, report: &EnabledModsReport);
    fn mod_paths(&self, report: &ModPathsReport);
    fn compare(&self, report: &CompareReport);
    fn profiles(&self, report: &ProfilesReport);
    fn store_stats(&self, stats: &StoreStats);
    fn dump(&self, entries: &[DumpEntry]);

    // Configuration and metadata
    fn config_info(&self, report: &ConfigReport);
    fn config_written(&self, path: &Path);
    fn version_info(&self, info: &VersionInfo);
}
