//! CLI argument definitions and command dispatch.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::registry::EnabledPolicy;

/// Vortex Linker - deploy Vortex-managed mods into a game directory as symlinks.
///
/// Reads the Vortex LevelDB state store to find the active profile's enabled
/// mods, then mirrors their staging folders into the game tree.
///
/// Robot Mode: Use --robot or --format json for machine-parseable output.
#[derive(Parser, Debug)]
#[command(name = "vxl", version, about, long_about = None)]
#[command(propagate_version = true)]
#[allow(clippy::struct_excessive_bools)] // CLI flags naturally use multiple bools
pub struct Cli {
    /// Output format (text for humans, json for agents/scripts)
    #[arg(
        long,
        short = 'f',
        default_value = "text",
        global = true,
        env = "VXL_FORMAT"
    )]
    pub format: OutputFormat,

    /// Robot mode: equivalent to --format=json
    #[arg(long, global = true)]
    pub robot: bool,

    /// Verbose output (-v debug, -vv trace)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Vortex state store (LevelDB directory); auto-detected when omitted
    #[arg(long, global = true, env = "VXL_DB", value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Game id as recorded by Vortex
    #[arg(long, global = true, env = "VXL_GAME", value_name = "ID")]
    pub game: Option<String>,

    /// Configuration file
    #[arg(long, global = true, env = "VXL_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Also write the command's report as JSON to FILE
    #[arg(long, short = 'o', global = true, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Read the live store in place instead of a snapshot copy
    #[arg(long, global = true)]
    pub no_snapshot: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Output format selection.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text with optional color
    #[default]
    Text,
    /// JSON output for scripts and agents
    Json,
    /// Compact JSON (single line)
    JsonCompact,
}

impl Cli {
    /// Returns true if output should be JSON (robot mode or explicit --format=json).
    pub const fn use_json(&self) -> bool {
        self.robot || matches!(self.format, OutputFormat::Json | OutputFormat::JsonCompact)
    }

    /// Returns true if output should be compact JSON.
    pub const fn use_compact_json(&self) -> bool {
        matches!(self.format, OutputFormat::JsonCompact)
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    // === Deployment ===
    /// Link the active profile's enabled mods into the game directory
    Deploy(DeployArgs),

    /// Remove mod symlinks from the game directory
    Cleanup(CleanupArgs),

    // === Inspection ===
    /// List enabled mods of the active profile
    List(ListArgs),

    /// Show installation and staging paths of mods
    Paths(PathsArgs),

    /// Compare enabled indicators and what deploy would link
    Compare,

    /// List profiles for the game
    Profiles,

    /// Summarize the raw store contents
    Stats(StatsArgs),

    /// Dump every store entry as JSON
    Dump(DumpArgs),

    // === Configuration ===
    /// Write a default configuration file
    Init(InitArgs),

    /// Show the resolved configuration
    Config(ConfigArgs),

    // === Utilities ===
    /// Show version and build information
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// === Argument Structs ===

/// Arguments for deploying mods.
///
/// # Examples
///
/// ```bash
/// # Preview what would be linked
/// vxl deploy --dry-run
///
/// # Deploy into a specific install
/// vxl deploy --game-path ~/Games/Subnautica
/// ```
#[derive(Parser, Debug)]
pub struct DeployArgs {
    /// Show what would happen without touching the filesystem
    #[arg(long, short = 'n')]
    pub dry_run: bool,

    /// Game directory (overrides config and store)
    #[arg(long, value_name = "PATH")]
    pub game_path: Option<PathBuf>,

    /// Vortex staging directory (overrides the store)
    #[arg(long, value_name = "PATH")]
    pub staging_path: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct CleanupArgs {
    /// Show what would be removed without removing it
    #[arg(long, short = 'n')]
    pub dry_run: bool,

    /// Game directory (overrides config and store)
    #[arg(long, value_name = "PATH")]
    pub game_path: Option<PathBuf>,

    /// Scan the whole game tree instead of the configured directories
    #[arg(long, short = 'r')]
    pub recursive: bool,
}

#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Which enabled indicator counts
    #[arg(long, value_enum, default_value_t = EnabledPolicy::Both)]
    pub policy: EnabledPolicy,
}

#[derive(Parser, Debug)]
pub struct PathsArgs {
    /// Include disabled mods
    #[arg(long, short = 'a')]
    pub all: bool,
}

#[derive(Parser, Debug)]
pub struct StatsArgs {
    /// Number of sample entries to include
    #[arg(long, default_value = "10")]
    pub samples: usize,
}

#[derive(Parser, Debug)]
pub struct DumpArgs {
    /// Write entries to FILE instead of stdout
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Force overwrite existing configuration
    #[arg(long)]
    pub force: bool,
}

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Show configuration file path only
    #[arg(long)]
    pub path: bool,
}

#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
