//! Human-friendly output implementation using console styles.

use std::path::Path;

use tracing::{debug, instrument, trace};

use crate::deploy::{CleanupReport, DeployReport, DeployStep, ModKind};
use crate::error::VxError;
use crate::inspect::{
    CompareReport, DumpEntry, EnabledModsReport, ModPathsReport, ProfilesReport, StoreStats,
};
use crate::theme::VxTheme;

use super::{ConfigReport, Output, PathStatus, VersionInfo};

const RULE_WIDTH: usize = 60;

/// Styled terminal output implementation for human users.
pub struct HumanOutput {
    theme: VxTheme,
    verbose: bool,
}

impl HumanOutput {
    #[instrument]
    pub fn new(verbose: bool) -> Self {
        debug!("Creating HumanOutput");
        Self {
            theme: VxTheme::default(),
            verbose,
        }
    }

    fn rule(&self) {
        println!("{}", self.theme.muted.apply_to("=".repeat(RULE_WIDTH)));
    }

    fn heading(&self, title: &str) {
        self.rule();
        println!("{}", self.theme.header.apply_to(title));
        self.rule();
    }

    fn field(&self, label: &str, value: impl std::fmt::Display) {
        println!(
            "{} {}",
            self.theme.label.apply_to(format!("{label}:")),
            self.theme.value.apply_to(value)
        );
    }

    fn path_status(&self, label: &str, status: &PathStatus) {
        let marker = if status.exists {
            self.theme.success.apply_to("found")
        } else {
            self.theme.warning.apply_to("missing")
        };
        println!(
            "{} {} ({marker})",
            self.theme.label.apply_to(format!("{label}:")),
            self.theme.path.apply_to(status.path.display())
        );
    }

    fn profile_line(&self, profile_id: &str, profile_name: Option<&str>) {
        match profile_name {
            Some(name) => self.field("Active Profile", format!("{name} ({profile_id})")),
            None => self.field("Active Profile", profile_id),
        }
    }

    fn id_list(&self, title: &str, ids: &[String]) {
        println!("{} ({})", self.theme.label.apply_to(title), ids.len());
        for id in ids {
            println!("  - {id}");
        }
    }
}

impl Output for HumanOutput {
    #[instrument(skip(self))]
    fn success(&self, message: &str) {
        debug!(message, "Outputting success");
        println!("{} {message}", self.theme.success.apply_to("✓"));
    }

    #[instrument(skip(self))]
    fn error(&self, error: &VxError) {
        debug!(error = %error, "Outputting error");
        eprintln!("{} {error}", self.theme.error.apply_to("Error:"));
        if let Some(hint) = error.suggestion() {
            eprintln!("{} {hint}", self.theme.muted.apply_to("Hint:"));
        }
    }

    #[instrument(skip(self))]
    fn warning(&self, message: &str) {
        debug!(message, "Outputting warning");
        eprintln!("{} {message}", self.theme.warning.apply_to("⚠"));
    }

    #[instrument(skip(self))]
    fn info(&self, message: &str) {
        debug!(message, "Outputting info");
        println!("{} {message}", self.theme.accent.apply_to("[INFO]"));
    }

    #[instrument(skip_all, fields(steps = report.steps.len()))]
    fn deploy_report(&self, report: &DeployReport) {
        self.field("Game Path", report.game_path.display());
        self.field("Staging Path", report.staging_path.display());
        self.profile_line(&report.profile_id, report.profile_name.as_deref());
        println!();

        if report.total_mods == 0 {
            self.warning("No enabled mods found for the active profile");
        } else {
            println!("Found {} enabled mods to deploy:", report.total_mods);
            println!("  - Framework: {}", report.framework_count);
            println!("  - Plugins: {}", report.plugin_count);
        }
        println!();

        if report.dry_run {
            println!(
                "{}",
                self.theme
                    .dry_run
                    .apply_to("DRY RUN MODE - No changes will be made")
            );
            println!();
        }

        let prefix = if report.dry_run { "[DRY RUN] " } else { "" };
        for step in &report.steps {
            match step {
                DeployStep::Deployed {
                    planned,
                    created,
                    failures,
                } => {
                    trace!(mod_id = %planned.mod_id, "Rendering deployed mod");
                    println!(
                        "{}Deploying: {}",
                        self.theme.dry_run.apply_to(prefix),
                        self.theme.mod_name.apply_to(&planned.name)
                    );
                    let kind = match planned.kind {
                        ModKind::Framework => "framework",
                        ModKind::Plugin => "plugin",
                    };
                    println!("  Type: {} ({kind})", planned.mod_type);
                    println!("  From: {}", self.theme.path.apply_to(planned.source.display()));
                    println!(
                        "  To:   {}",
                        self.theme.path.apply_to(planned.destination.display())
                    );
                    if self.verbose {
                        for link in created {
                            println!("    + {}", self.theme.muted.apply_to(link.display()));
                        }
                    }
                    for failure in failures {
                        println!(
                            "  {} {}: {}",
                            self.theme.error.apply_to("✗"),
                            failure.path.display(),
                            failure.reason
                        );
                    }
                    let verb = if report.dry_run { "Would create" } else { "Created" };
                    println!("  {verb} {} symlinks", created.len());
                    println!();
                }
                DeployStep::Skipped(skipped) => {
                    println!(
                        "{} {} - {}",
                        self.theme.warning.apply_to("⚠ SKIP:"),
                        skipped.name,
                        skipped.reason
                    );
                }
            }
        }

        println!();
        let title = if report.dry_run {
            "DEPLOYMENT PREVIEW"
        } else {
            "DEPLOYMENT COMPLETE"
        };
        self.heading(title);
        println!("Total mods processed: {}", report.total_mods);
        if report.dry_run {
            println!("Total symlinks would be created: {}", report.total_links);
        } else {
            println!("Total symlinks created: {}", report.total_links);
        }
        if report.failed_links > 0 {
            println!(
                "{}",
                self.theme
                    .error
                    .apply_to(format!("Failed symlinks: {}", report.failed_links))
            );
        }
    }

    #[instrument(skip_all, fields(links = report.links.len()))]
    fn cleanup_report(&self, report: &CleanupReport) {
        self.field("Game Path", report.game_path.display());
        println!();

        for scan in &report.scanned {
            let mode = if scan.recursive { " (recursive)" } else { "" };
            println!(
                "Found {} symlinks in {}{mode}",
                scan.found,
                self.theme.path.apply_to(scan.dir.display())
            );
        }
        println!();

        if report.links.is_empty() {
            println!("No symlinks found. Nothing to clean up.");
            return;
        }

        println!("Total symlinks to remove: {}", report.links.len());
        if self.verbose || report.dry_run {
            for link in &report.links {
                match &link.target {
                    Some(target) => println!(
                        "  {} -> {}",
                        link.relative.display(),
                        self.theme.muted.apply_to(target.display())
                    ),
                    None => println!("  {}", link.relative.display()),
                }
            }
        }
        println!();

        if report.dry_run {
            println!(
                "{}",
                self.theme
                    .dry_run
                    .apply_to("DRY RUN MODE - No changes will be made")
            );
            println!("{} symlinks to be removed", report.links.len());
            return;
        }

        for failure in &report.failures {
            println!(
                "  {} {}: {}",
                self.theme.error.apply_to("✗"),
                failure.path.display(),
                failure.reason
            );
        }
        self.heading("CLEANUP COMPLETE");
        println!("Symlinks removed: {}", report.removed);
        if !report.failures.is_empty() {
            println!(
                "{}",
                self.theme
                    .error
                    .apply_to(format!("Failed: {}", report.failures.len()))
            );
        }
    }

    #[instrument(skip_all, fields(count = report.mods.len()))]
    fn enabled_mods(&self, report: &EnabledModsReport) {
        self.field("Game", &report.game);
        self.profile_line(&report.profile_id, report.profile_name.as_deref());
        self.field("Enabled by", report.policy);
        println!();

        if report.mods.is_empty() {
            self.warning("No enabled mods found");
            return;
        }

        println!(
            "Enabled mods: {} of {} installed",
            report.mods.len(),
            report.installed
        );
        println!();
        for m in &report.mods {
            let version = m.version.as_deref().map(|v| format!(" v{v}")).unwrap_or_default();
            println!("{}{version}", self.theme.mod_name.apply_to(&m.name));
            println!("  {}", self.theme.muted.apply_to(&m.mod_id));
            if !m.recorded {
                println!("  Version: unknown");
                println!("  Author: unknown");
            }
            if let Some(author) = &m.author {
                println!("  Author: {author}");
            }
            if let Some(mod_type) = &m.mod_type {
                println!("  Type: {mod_type}");
            }
            if let Some(description) = &m.description {
                println!("  {description}");
            }
            if self.verbose {
                if let Some(time) = m.enabled_at.as_ref().or(m.enabled_time.as_ref()) {
                    println!("  Enabled at: {time}");
                }
            }
        }
    }

    #[instrument(skip_all, fields(count = report.mods.len()))]
    fn mod_paths(&self, report: &ModPathsReport) {
        self.field("Game", &report.game);
        self.profile_line(&report.profile_id, report.profile_name.as_deref());
        if let Some(game_path) = &report.game_path {
            self.field("Game Path", game_path);
        }
        if let Some(staging) = &report.staging_path {
            self.field("Staging Path", staging);
        }
        println!(
            "Mods: {} total, {} enabled",
            report.total_mods, report.enabled_mods
        );
        println!();

        for m in &report.mods {
            let state = if m.enabled {
                self.theme.enabled.apply_to("enabled")
            } else {
                self.theme.disabled.apply_to("disabled")
            };
            println!("{} [{state}]", self.theme.mod_name.apply_to(&m.name));
            if let Some(mod_type) = &m.mod_type {
                println!("  Type: {mod_type}");
            }
            match &m.installation_path {
                Some(path) => println!("  Install: {path}"),
                None => println!("  Install: {}", self.theme.warning.apply_to("(none)")),
            }
            if let Some(full) = &m.full_path {
                println!("  Path: {}", self.theme.path.apply_to(full.display()));
            }
        }
    }

    #[instrument(skip_all)]
    fn compare(&self, report: &CompareReport) {
        self.field("Active Profile", &report.profile_id);
        println!();
        self.id_list("Enabled flag only", &report.flag_only);
        self.id_list("Enabled time only", &report.time_only);
        self.id_list("Both", &report.both);
        println!();
        self.field("Deploy policy", report.deploy_policy);
        self.id_list("Deployable", &report.deployable);
        println!(
            "{} ({})",
            self.theme.label.apply_to("Not deployed"),
            report.not_deployed.len()
        );
        for m in &report.not_deployed {
            println!("  - {} ({}): {}", m.name, m.mod_type, m.reason);
        }
    }

    #[instrument(skip_all, fields(count = report.profiles.len()))]
    fn profiles(&self, report: &ProfilesReport) {
        self.field("Game", &report.game);
        if report.active_profile.is_none() {
            self.warning("No active profile set");
        }
        if report.profiles.is_empty() {
            println!("No profiles found.");
            return;
        }
        for profile in &report.profiles {
            let marker = if profile.active {
                self.theme.enabled.apply_to("*")
            } else {
                self.theme.muted.apply_to(" ")
            };
            let name = profile.name.as_deref().unwrap_or("(unnamed)");
            println!(
                "{marker} {} {} ({} enabled)",
                self.theme.mod_name.apply_to(name),
                self.theme.muted.apply_to(&profile.id),
                profile.enabled_mods
            );
        }
    }

    #[instrument(skip_all, fields(entries = stats.total_entries))]
    fn store_stats(&self, stats: &StoreStats) {
        self.heading("STORE STATISTICS");
        self.field("Total entries", stats.total_entries);
        if let Some(keys) = &stats.key_lengths {
            println!(
                "Key lengths: min {} max {} avg {:.1}",
                keys.min, keys.max, keys.avg
            );
        }
        if let Some(values) = &stats.value_lengths {
            println!(
                "Value lengths: min {} max {} avg {:.1}",
                values.min, values.max, values.avg
            );
        }
        self.field("Non-UTF-8 keys", stats.non_utf8_keys);
        println!(
            "Decoder: {} matched, {} skipped of {}",
            stats.decoder.matched, stats.decoder.skipped, stats.decoder.total
        );

        if !stats.namespaces.is_empty() {
            println!();
            println!("{}", self.theme.header.apply_to("Namespaces"));
            for (namespace, count) in &stats.namespaces {
                println!("  {namespace:<24} {count}");
            }
        }

        for (width, prefixes) in &stats.common_prefixes {
            if prefixes.is_empty() {
                continue;
            }
            println!();
            println!(
                "{}",
                self.theme
                    .header
                    .apply_to(format!("Common {width}-byte prefixes"))
            );
            for prefix in prefixes {
                println!("  {:<20} {}", prefix.prefix_hex, prefix.count);
            }
        }

        if self.verbose && !stats.key_length_distribution.is_empty() {
            println!();
            println!("{}", self.theme.header.apply_to("Key length distribution"));
            for (len, count) in &stats.key_length_distribution {
                println!("  {len:>6} {count}");
            }
        }

        if !stats.samples.is_empty() {
            println!();
            println!("{}", self.theme.header.apply_to("Samples"));
            for sample in &stats.samples {
                let key = sample.key_utf8.as_deref().unwrap_or(&sample.key_hex);
                println!("  {key}");
            }
        }
    }

    #[instrument(skip_all, fields(count = entries.len()))]
    fn dump(&self, entries: &[DumpEntry]) {
        match serde_json::to_string_pretty(entries) {
            Ok(json) => println!("{json}"),
            Err(e) => self.warning(&format!("Could not render entries: {e}")),
        }
    }

    #[instrument(skip_all)]
    fn config_info(&self, report: &ConfigReport) {
        match &report.config_file {
            Some(path) => self.field("Config file", path.display()),
            None => self.field("Config file", "(defaults)"),
        }
        self.field("Game", &report.config.game);
        self.path_status("Live store", &report.live_store);
        self.path_status("Fallback store", &report.fallback_store);
        match &report.resolved_store {
            Ok(path) => self.field("Resolved store", path.display()),
            Err(reason) => println!(
                "{} {}",
                self.theme.label.apply_to("Resolved store:"),
                self.theme.warning.apply_to(reason)
            ),
        }
        self.field("Snapshot dir", report.snapshot_dir.display());
        self.field("Lock sentinel", &report.config.store.lock_sentinel);
        if let Some(game_path) = &report.game_path {
            self.path_status("Game path", game_path);
        }
        let deploy = &report.config.deploy;
        self.field("Framework type", &deploy.framework_type);
        self.field("Plugin type", &deploy.plugin_type);
        self.field("Excluded types", deploy.excluded_types.join(", "));
        self.field("Plugins dir", deploy.plugins_subdir.display());
        self.field("Enabled policy", deploy.enabled_policy);
        let scan: Vec<_> = report
            .config
            .cleanup
            .scan_dirs
            .iter()
            .map(|d| d.display().to_string())
            .collect();
        self.field("Cleanup dirs", scan.join(", "));
    }

    fn config_written(&self, path: &Path) {
        self.success(&format!("Config written to {}", path.display()));
    }

    #[instrument(skip_all)]
    fn version_info(&self, info: &VersionInfo) {
        println!(
            "{} {}",
            self.theme.header.apply_to(info.name),
            self.theme.value.apply_to(info.version)
        );
        let label = |name: &str| self.theme.label.apply_to(format!("  {name:<10}"));
        let dirty = if info.git_dirty { " (dirty)" } else { "" };
        println!(
            "{}{}{}",
            label("Git SHA"),
            info.git_sha,
            self.theme.warning.apply_to(dirty)
        );
        println!("{}{}", label("Built"), self.theme.muted.apply_to(info.build_timestamp));
        println!("{}{}", label("Rust"), self.theme.muted.apply_to(info.rustc_version));
        println!("{}{}", label("Target"), self.theme.muted.apply_to(info.target));
    }
}
