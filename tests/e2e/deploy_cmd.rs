//! `vxl deploy` end-to-end tests.

use std::fs;

use crate::common::assertions::{assert_link_to, assert_no_ansi, symlinks_under};
use crate::common::fixtures::{ModSpec, VortexFixture, FRAMEWORK_TYPE, PLUGIN_TYPE};
use crate::common::init_test_logging;

fn two_mod_fixture() -> VortexFixture {
    VortexFixture::standard()
        .with_mod(&ModSpec::new("bepinex", "BepInEx Pack", FRAMEWORK_TYPE).file("winhttp.dll"))
        .with_mod(&ModSpec::new("plugin", "Cool Plugin", PLUGIN_TYPE).file("CoolPlugin.dll"))
}

#[test]
fn deploy_two_mods_creates_exactly_two_links() {
    init_test_logging();
    let (fx, cli) = two_mod_fixture().build();

    let result = cli.run(&["deploy"]);
    result
        .assert_success()
        .assert_stdout_contains("Total mods processed: 2")
        .assert_stdout_contains("Total symlinks created: 2")
        .assert_stdout_contains("Deploying: BepInEx Pack")
        .assert_stdout_contains("Deploying: Cool Plugin");
    assert_no_ansi(&result.stdout);

    let game = fx.game_path();
    assert_eq!(symlinks_under(&game).len(), 2);
    assert_link_to(
        &game.join("winhttp.dll"),
        &fx.staging_path().join("bepinex-1").join("winhttp.dll"),
    );
    assert_link_to(
        &game.join("BepInEx").join("plugins").join("CoolPlugin.dll"),
        &fx.staging_path().join("plugin-1").join("CoolPlugin.dll"),
    );
}

#[test]
fn deploy_dry_run_touches_nothing() {
    init_test_logging();
    let (fx, cli) = two_mod_fixture().build();

    cli.run_dry_run(&["deploy"])
        .assert_success()
        .assert_stdout_contains("DRY RUN MODE - No changes will be made")
        .assert_stdout_contains("[DRY RUN] Deploying: BepInEx Pack")
        .assert_stdout_contains("Total symlinks would be created: 2");

    assert!(symlinks_under(&fx.game_path()).is_empty());
    assert!(!fx.game_path().join("BepInEx").exists());
}

#[test]
fn deploy_twice_gives_the_same_tree() {
    init_test_logging();
    let (fx, cli) = two_mod_fixture().build();

    cli.run(&["deploy"]).assert_success();
    let first = symlinks_under(&fx.game_path());
    cli.run(&["deploy"])
        .assert_success()
        .assert_stdout_contains("Total symlinks created: 2");
    assert_eq!(symlinks_under(&fx.game_path()), first);
}

#[test]
fn deploy_mirrors_nested_directories() {
    init_test_logging();
    let (fx, cli) = VortexFixture::standard()
        .with_mod(
            &ModSpec::new("bepinex", "BepInEx Pack", FRAMEWORK_TYPE)
                .file("winhttp.dll")
                .file("BepInEx/core/BepInEx.dll")
                .file("BepInEx/core/0Harmony.dll"),
        )
        .build();

    cli.run(&["deploy"])
        .assert_success()
        .assert_stdout_contains("Total symlinks created: 3");

    let core = fx.game_path().join("BepInEx").join("core");
    let meta = fs::symlink_metadata(&core).unwrap();
    assert!(meta.is_dir(), "directories are created, not linked");
    assert_link_to(
        &core.join("BepInEx.dll"),
        &fx.staging_path()
            .join("bepinex-1")
            .join("BepInEx")
            .join("core")
            .join("BepInEx.dll"),
    );
}

#[test]
fn deploy_replaces_existing_file_with_link() {
    init_test_logging();
    let fx = two_mod_fixture();
    fx.game_file("winhttp.dll");
    let (fx, cli) = fx.build();

    cli.run(&["deploy"]).assert_success();
    assert_link_to(
        &fx.game_path().join("winhttp.dll"),
        &fx.staging_path().join("bepinex-1").join("winhttp.dll"),
    );
}

#[test]
fn deploy_skips_excluded_disabled_and_pathless_mods() {
    init_test_logging();
    let (fx, cli) = VortexFixture::standard()
        .with_mod(&ModSpec::new("plugin", "Cool Plugin", PLUGIN_TYPE).file("CoolPlugin.dll"))
        .with_mod(&ModSpec::new("coll", "My Collection", "collection").file("readme.txt"))
        .with_mod(&ModSpec::new("off", "Disabled Plugin", PLUGIN_TYPE).file("Off.dll").disabled())
        .with_mod(&ModSpec::new("ghost", "Ghost Plugin", PLUGIN_TYPE).without_install())
        .build();

    cli.run(&["deploy"])
        .assert_success()
        .assert_stdout_contains("SKIP: Ghost Plugin - No installation path")
        .assert_stdout_not_contains("My Collection")
        .assert_stdout_not_contains("Disabled Plugin")
        .assert_stdout_contains("Total mods processed: 2")
        .assert_stdout_contains("Total symlinks created: 1");

    assert_eq!(symlinks_under(&fx.game_path()).len(), 1);
}

#[test]
fn deploy_game_path_flag_overrides_store() {
    init_test_logging();
    let (fx, cli) = two_mod_fixture().build();
    let other = fx.root().join("other-game");
    fs::create_dir_all(&other).unwrap();

    cli.run(&["deploy", "--game-path", &other.to_string_lossy()])
        .assert_success();

    assert_eq!(symlinks_under(&other).len(), 2);
    assert!(symlinks_under(&fx.game_path()).is_empty());
}

#[test]
fn deploy_report_file_matches_run() {
    init_test_logging();
    let (fx, cli) = two_mod_fixture().build();
    let report_path = fx.root().join("report.json");

    cli.run(&["deploy", "--output", &report_path.to_string_lossy()])
        .assert_success();

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(report["total_mods"], 2);
    assert_eq!(report["total_links"], 2);
    assert_eq!(report["dry_run"], false);
}

#[test]
fn deploy_reads_a_snapshot_not_the_live_store() {
    init_test_logging();
    let (fx, cli) = two_mod_fixture().build();

    cli.run(&["deploy", "--dry-run"]).assert_success();

    assert!(fx.snapshot_path().exists(), "snapshot directory was not created");
}
