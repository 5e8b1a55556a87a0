//! Vortex Linker - deploy Vortex-managed mods into a game directory as symlinks.
//!
//! Provides both human-friendly and agent-friendly (robot mode) interfaces.
#![forbid(unsafe_code)]

use std::path::PathBuf;

use clap::{CommandFactory, Parser};
use serde::Serialize;
use tracing::{debug, info};

use vxl::cli::{self, Cli, Commands};
use vxl::config::{expand_home, Config};
use vxl::deploy::{self, CleanupOptions, DeployOptions};
use vxl::error::{Result, VxError};
use vxl::fs::RealFs;
use vxl::inspect;
use vxl::logging::init_logging;
use vxl::output::{
    write_report_file, ConfigReport, Output, OutputMode, PathStatus, VersionInfo,
};
use vxl::registry::{ModRegistry, ModRegistryBuilder};
use vxl::store::{locate_store, open_store, StoreHandle};

/// Build information embedded at compile time.
mod build_info {
    pub const NAME: &str = env!("CARGO_PKG_NAME");
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");

    pub fn git_sha() -> &'static str {
        option_env!("VERGEN_GIT_SHA").unwrap_or("unknown")
    }

    pub fn git_dirty() -> &'static str {
        option_env!("VERGEN_GIT_DIRTY").unwrap_or("false")
    }

    pub fn build_timestamp() -> &'static str {
        option_env!("VERGEN_BUILD_TIMESTAMP").unwrap_or("unknown")
    }

    pub fn rustc_semver() -> &'static str {
        option_env!("VERGEN_RUSTC_SEMVER").unwrap_or("unknown")
    }

    pub fn target() -> &'static str {
        option_env!("VERGEN_CARGO_TARGET_TRIPLE").unwrap_or("unknown")
    }
}

/// Everything a command needs besides its own arguments.
struct Ctx<'a> {
    cli: &'a Cli,
    config: Config,
    config_file: Option<PathBuf>,
    out: Box<dyn Output>,
}

impl Ctx<'_> {
    fn open_store(&self) -> Result<StoreHandle> {
        let handle = open_store(&self.config, self.cli.db.as_deref(), !self.cli.no_snapshot)?;
        debug!(
            live = %handle.live_path.display(),
            snapshot = handle.is_snapshot(),
            "Store opened"
        );
        Ok(handle)
    }

    fn registry(&self) -> Result<ModRegistry> {
        let mut store = self.open_store()?;
        ModRegistryBuilder::build_from(&mut store, &self.config.game)
    }

    /// Also write `report` to `--output FILE` when given.
    fn save_report<T: Serialize + ?Sized>(&self, report: &T) -> Result<()> {
        if let Some(path) = &self.cli.output {
            write_report_file(path, report)?;
        }
        Ok(())
    }
}

fn main() {
    let cli = Cli::parse();

    init_logging(cli.use_json(), cli.verbose, cli.quiet);

    let mode = OutputMode::from_cli(&cli);
    if let Err(e) = run(&cli, mode) {
        output_error(mode, &e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli, mode: OutputMode) -> Result<()> {
    match &cli.command {
        None => return print_quick_start(cli),
        Some(Commands::Version) => return cmd_version(mode),
        Some(Commands::Completions(args)) => return cmd_completions(args),
        Some(Commands::Init(args)) => return cmd_init(cli, mode, args),
        Some(_) => {}
    }

    let (mut config, config_file) = Config::load(cli.config.as_deref())?;
    if let Some(game) = &cli.game {
        config.game.clone_from(game);
    }
    debug!(game = %config.game, ?config_file, "Configuration resolved");

    let ctx = Ctx {
        cli,
        config,
        config_file,
        out: mode.into_output(),
    };

    match &cli.command {
        Some(Commands::Deploy(args)) => cmd_deploy(&ctx, args),
        Some(Commands::Cleanup(args)) => cmd_cleanup(&ctx, args),
        Some(Commands::List(args)) => cmd_list(&ctx, args),
        Some(Commands::Paths(args)) => cmd_paths(&ctx, args),
        Some(Commands::Compare) => cmd_compare(&ctx),
        Some(Commands::Profiles) => cmd_profiles(&ctx),
        Some(Commands::Stats(args)) => cmd_stats(&ctx, args),
        Some(Commands::Dump(args)) => cmd_dump(&ctx, args),
        Some(Commands::Config(args)) => cmd_config(&ctx, args),
        None | Some(Commands::Version | Commands::Completions(_) | Commands::Init(_)) => Ok(()),
    }
}

fn print_quick_start(cli: &Cli) -> Result<()> {
    if cli.use_json() {
        print_robot_quick_start();
    } else {
        print_human_quick_start();
    }
    Ok(())
}

fn print_robot_quick_start() {
    let help = RobotQuickStart {
        tool: "vxl",
        version: build_info::VERSION,
        description: "Deploy Vortex-managed mods as symlinks, with robot mode for agents",
        deployment: RobotDeployment {
            preview: "vxl deploy --dry-run --robot",
            deploy: "vxl deploy --robot",
            cleanup_preview: "vxl cleanup --dry-run --robot",
            cleanup: "vxl cleanup --robot",
        },
        inspection: RobotInspection {
            enabled_mods: "vxl list --robot",
            mod_paths: "vxl paths --all --robot",
            compare: "vxl compare --robot",
            profiles: "vxl profiles --robot",
            store_stats: "vxl stats --robot",
            dump: "vxl dump entries.json",
        },
        output_modes: OutputModes {
            human: "--format=text (default)",
            robot: "--robot or --format=json",
            compact: "--format=json-compact",
        },
        store: "Use --db <PATH> to read a specific state.v2 directory",
    };

    match serde_json::to_string_pretty(&help) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("{e}"),
    }
}

fn print_human_quick_start() {
    let title = console::Style::new().bold().cyan();
    let heading = console::Style::new().bold().underlined();
    let cmd = console::Style::new().green();
    let robot = console::Style::new().cyan();

    println!(
        "{} {} - Vortex mod linker\n",
        title.apply_to("vxl"),
        build_info::VERSION
    );

    println!("{}", heading.apply_to("QUICK START"));
    println!();
    println!("  {}  Preview deployment", cmd.apply_to("vxl deploy --dry-run"));
    println!("  {}  Link enabled mods", cmd.apply_to("vxl deploy"));
    println!("  {}  Remove mod links", cmd.apply_to("vxl cleanup"));
    println!("  {}  Enabled mods", cmd.apply_to("vxl list"));
    println!("  {}  Mod paths", cmd.apply_to("vxl paths --all"));
    println!("  {}  Show configuration", cmd.apply_to("vxl config"));
    println!();

    println!("{}", heading.apply_to("ROBOT MODE (for AI agents)"));
    println!();
    println!("  {}  JSON output", robot.apply_to("vxl --robot <command>"));
    println!("  {}  Quick-start JSON", robot.apply_to("vxl --robot"));
    println!();

    println!(
        "Run {} for full help",
        console::Style::new().yellow().apply_to("vxl --help")
    );
}

// === Robot Mode JSON Structures ===

#[derive(Serialize)]
struct RobotQuickStart {
    tool: &'static str,
    version: &'static str,
    description: &'static str,
    deployment: RobotDeployment,
    inspection: RobotInspection,
    output_modes: OutputModes,
    store: &'static str,
}

#[derive(Serialize)]
struct RobotDeployment {
    preview: &'static str,
    deploy: &'static str,
    cleanup_preview: &'static str,
    cleanup: &'static str,
}

#[derive(Serialize)]
struct RobotInspection {
    enabled_mods: &'static str,
    mod_paths: &'static str,
    compare: &'static str,
    profiles: &'static str,
    store_stats: &'static str,
    dump: &'static str,
}

#[derive(Serialize)]
struct OutputModes {
    human: &'static str,
    robot: &'static str,
    compact: &'static str,
}

// === Command Implementations ===

fn cmd_deploy(ctx: &Ctx<'_>, args: &cli::DeployArgs) -> Result<()> {
    let registry = ctx.registry()?;
    let opts = DeployOptions {
        dry_run: args.dry_run,
        game_path: args.game_path.clone(),
        staging_path: args.staging_path.clone(),
    };

    let report = deploy::deploy(&RealFs, &registry, &ctx.config, &opts)?;
    info!(
        mods = report.total_mods,
        links = report.total_links,
        failed = report.failed_links,
        "Deploy finished"
    );
    ctx.out.deploy_report(&report);
    ctx.save_report(&report)
}

fn cmd_cleanup(ctx: &Ctx<'_>, args: &cli::CleanupArgs) -> Result<()> {
    let fs = RealFs;
    let known = args.game_path.as_deref().or(ctx.config.game_path.as_deref());

    // The store is only consulted when no game path was given.
    let game_path = if known.is_some() {
        deploy::resolve_game_path(&fs, &ctx.config, known, None)?
    } else {
        let registry = ctx.registry()?;
        deploy::resolve_game_path(&fs, &ctx.config, None, Some(&registry))?
    };

    let opts = CleanupOptions {
        dry_run: args.dry_run,
        recursive: args.recursive,
    };
    let report = deploy::cleanup(&fs, &game_path, &ctx.config.cleanup.scan_dirs, opts)?;
    info!(
        found = report.links.len(),
        removed = report.removed,
        "Cleanup finished"
    );
    ctx.out.cleanup_report(&report);
    ctx.save_report(&report)
}

fn cmd_list(ctx: &Ctx<'_>, args: &cli::ListArgs) -> Result<()> {
    let registry = ctx.registry()?;
    let report = inspect::enabled_mods(&registry, args.policy)?;
    ctx.out.enabled_mods(&report);
    ctx.save_report(&report)
}

fn cmd_paths(ctx: &Ctx<'_>, args: &cli::PathsArgs) -> Result<()> {
    let registry = ctx.registry()?;
    let report = inspect::mod_paths(&registry, ctx.config.deploy.enabled_policy, args.all)?;
    ctx.out.mod_paths(&report);
    ctx.save_report(&report)
}

fn cmd_compare(ctx: &Ctx<'_>) -> Result<()> {
    let registry = ctx.registry()?;
    let report = inspect::compare(&registry, &ctx.config.deploy)?;
    ctx.out.compare(&report);
    ctx.save_report(&report)
}

fn cmd_profiles(ctx: &Ctx<'_>) -> Result<()> {
    let registry = ctx.registry()?;
    let report = inspect::profiles(&registry);
    ctx.out.profiles(&report);
    ctx.save_report(&report)
}

fn cmd_stats(ctx: &Ctx<'_>, args: &cli::StatsArgs) -> Result<()> {
    let mut store = ctx.open_store()?;
    let stats = inspect::store_stats(&mut store, &ctx.config.game, args.samples)?;
    ctx.out.store_stats(&stats);
    ctx.save_report(&stats)
}

fn cmd_dump(ctx: &Ctx<'_>, args: &cli::DumpArgs) -> Result<()> {
    let mut store = ctx.open_store()?;
    let entries = inspect::dump_entries(&mut store)?;

    match &args.file {
        Some(path) => {
            write_report_file(path, &entries)?;
            ctx.out.success(&format!(
                "Dumped {} entries to {}",
                entries.len(),
                path.display()
            ));
        }
        None => ctx.out.dump(&entries),
    }
    ctx.save_report(&entries)
}

/// Runs before any config is loaded, since its target usually does not exist yet.
fn cmd_init(cli: &Cli, mode: OutputMode, args: &cli::InitArgs) -> Result<()> {
    let path = match &cli.config {
        Some(p) => expand_home(p)?,
        None => Config::default_path()
            .ok_or_else(|| VxError::Other("No configuration directory on this platform".into()))?,
    };

    let mut config = Config::default();
    if let Some(game) = &cli.game {
        config.game.clone_from(game);
    }
    config.save(&path, args.force)?;
    mode.into_output().config_written(&path);
    Ok(())
}

fn cmd_config(ctx: &Ctx<'_>, args: &cli::ConfigArgs) -> Result<()> {
    if args.path {
        let path = ctx.config_file.clone().or_else(Config::default_path);
        match path {
            Some(path) => ctx.out.info(&path.display().to_string()),
            None => ctx.out.warning("No configuration directory on this platform"),
        }
        return Ok(());
    }

    let report = config_report(ctx)?;
    ctx.out.config_info(&report);
    ctx.save_report(&report)
}

fn config_report(ctx: &Ctx<'_>) -> Result<ConfigReport> {
    let config = &ctx.config;
    let resolved_store =
        locate_store(config, ctx.cli.db.as_deref()).map_err(|e| e.to_string());
    let game_path = config
        .game_path
        .as_deref()
        .map(expand_home)
        .transpose()?
        .map(PathStatus::check);

    Ok(ConfigReport {
        config_file: ctx.config_file.clone(),
        config: config.clone(),
        live_store: PathStatus::check(expand_home(&config.store.path)?),
        fallback_store: PathStatus::check(expand_home(&config.store.fallback_path)?),
        game_path,
        resolved_store,
        snapshot_dir: config.snapshot_dir()?,
    })
}

fn version_info() -> VersionInfo {
    VersionInfo {
        name: build_info::NAME,
        version: build_info::VERSION,
        git_sha: build_info::git_sha(),
        git_dirty: build_info::git_dirty() == "true",
        build_timestamp: build_info::build_timestamp(),
        rustc_version: build_info::rustc_semver(),
        target: build_info::target(),
    }
}

#[allow(clippy::unnecessary_wraps)] // Consistent return type with other commands
fn cmd_version(mode: OutputMode) -> Result<()> {
    mode.into_output().version_info(&version_info());
    Ok(())
}

#[allow(clippy::unnecessary_wraps)] // Consistent return type with other commands
fn cmd_completions(args: &cli::CompletionsArgs) -> Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(args.shell, &mut cmd, "vxl", &mut std::io::stdout());
    Ok(())
}

fn output_error(mode: OutputMode, error: &VxError) {
    mode.into_output().error(error);
}
