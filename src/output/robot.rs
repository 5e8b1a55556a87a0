//! Robot mode JSON output implementation.

use std::path::Path;

use serde::Serialize;
use tracing::{debug, instrument, trace};

use crate::deploy::{CleanupReport, DeployReport};
use crate::error::VxError;
use crate::inspect::{
    CompareReport, DumpEntry, EnabledModsReport, ModPathsReport, ProfilesReport, StoreStats,
};

use super::{ConfigReport, Output, RobotFormat, VersionInfo};

/// JSON output implementation for agents and scripting.
///
/// Reports go to stdout, errors to stderr, one JSON document per call.
pub struct RobotOutput {
    format: RobotFormat,
}

impl RobotOutput {
    #[instrument]
    pub fn new(format: RobotFormat) -> Self {
        debug!(?format, "Creating RobotOutput");
        Self { format }
    }

    fn render<T: Serialize + ?Sized>(&self, data: &T) -> String {
        let rendered = match self.format {
            RobotFormat::Json => serde_json::to_string_pretty(data),
            RobotFormat::JsonCompact => serde_json::to_string(data),
        };
        rendered.unwrap_or_else(|e| {
            serde_json::json!({ "error": true, "message": format!("serialization failed: {e}") })
                .to_string()
        })
    }

    /// Output any serializable data as JSON to stdout.
    #[instrument(skip(self, data), fields(format = ?self.format))]
    fn output_json<T: Serialize + ?Sized>(&self, data: &T) {
        let json = self.render(data);
        trace!(json_len = json.len(), "JSON serialized");
        println!("{json}");
    }
}

impl Output for RobotOutput {
    #[instrument(skip(self))]
    fn success(&self, message: &str) {
        debug!(message, "Robot: success");
        self.output_json(&serde_json::json!({
            "success": true,
            "message": message
        }));
    }

    #[instrument(skip(self))]
    fn error(&self, error: &VxError) {
        debug!(error = %error, "Robot: error");
        eprintln!(
            "{}",
            self.render(&serde_json::json!({
                "error": true,
                "message": error.to_string(),
                "suggestion": error.suggestion(),
                "recoverable": error.is_user_recoverable(),
            }))
        );
    }

    #[instrument(skip(self))]
    fn warning(&self, message: &str) {
        debug!(message, "Robot: warning");
        self.output_json(&serde_json::json!({
            "warning": true,
            "message": message
        }));
    }

    #[instrument(skip(self))]
    fn info(&self, message: &str) {
        debug!(message, "Robot: info");
        self.output_json(&serde_json::json!({
            "info": true,
            "message": message
        }));
    }

    #[instrument(skip_all, fields(links = report.total_links))]
    fn deploy_report(&self, report: &DeployReport) {
        self.output_json(report);
    }

    #[instrument(skip_all, fields(links = report.links.len()))]
    fn cleanup_report(&self, report: &CleanupReport) {
        self.output_json(report);
    }

    fn enabled_mods(&self, report: &EnabledModsReport) {
        self.output_json(report);
    }

    fn mod_paths(&self, report: &ModPathsReport) {
        self.output_json(report);
    }

    fn compare(&self, report: &CompareReport) {
        self.output_json(report);
    }

    fn profiles(&self, report: &ProfilesReport) {
        self.output_json(report);
    }

    fn store_stats(&self, stats: &StoreStats) {
        self.output_json(stats);
    }

    #[instrument(skip_all, fields(count = entries.len()))]
    fn dump(&self, entries: &[DumpEntry]) {
        self.output_json(entries);
    }

    fn config_info(&self, report: &ConfigReport) {
        self.output_json(report);
    }

    fn config_written(&self, path: &Path) {
        self.output_json(&serde_json::json!({
            "success": true,
            "config_path": path,
        }));
    }

    fn version_info(&self, info: &VersionInfo) {
        self.output_json(info);
    }
}
