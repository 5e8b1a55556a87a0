//! `vxl cleanup` end-to-end tests.

use crate::common::assertions::{assert_regular_file, symlinks_under};
use crate::common::fixtures::VortexFixture;
use crate::common::init_test_logging;

/// Three links in the default scan locations, plus regular files and one
/// link outside them.
fn linked_game() -> VortexFixture {
    let fx = VortexFixture::standard();
    let target = fx.staging_path().join("mod-1").join("payload.dll");
    fx.game_link("winhttp.dll", &target);
    fx.game_link("BepInEx/plugins/A/A.dll", &target);
    fx.game_link("BepInEx/core/B.dll", &target);
    fx.game_file("doorstop_config.ini");
    fx.game_file("BepInEx/config/BepInEx.cfg");
    fx.game_link("Subnautica_Data/Managed/Extra.dll", &target);
    fx
}

#[test]
fn cleanup_dry_run_then_real_run_removes_exactly_those_links() {
    init_test_logging();
    let (fx, cli) = linked_game().build();
    let game = fx.game_path();
    let game_arg = game.to_string_lossy().to_string();

    cli.run(&["cleanup", "--dry-run", "--game-path", &game_arg])
        .assert_success()
        .assert_stdout_contains("3 symlinks to be removed")
        .assert_stdout_contains("winhttp.dll -> ")
        .assert_stdout_contains("BepInEx/core/B.dll -> ");
    assert_eq!(symlinks_under(&game).len(), 4, "dry run must not remove anything");

    cli.run(&["cleanup", "--game-path", &game_arg])
        .assert_success()
        .assert_stdout_contains("Symlinks removed: 3");

    let remaining = symlinks_under(&game);
    assert_eq!(
        remaining,
        vec![game.join("Subnautica_Data/Managed/Extra.dll")]
    );
    assert_regular_file(&game.join("doorstop_config.ini"));
    assert_regular_file(&game.join("BepInEx/config/BepInEx.cfg"));
}

#[test]
fn cleanup_recursive_scans_the_whole_tree() {
    init_test_logging();
    let (fx, cli) = linked_game().build();
    let game = fx.game_path();

    cli.run(&[
        "cleanup",
        "--recursive",
        "--game-path",
        &game.to_string_lossy(),
    ])
    .assert_success()
    .assert_stdout_contains("Symlinks removed: 4");

    assert!(symlinks_under(&game).is_empty());
    assert_regular_file(&game.join("doorstop_config.ini"));
}

#[test]
fn cleanup_with_nothing_to_do() {
    init_test_logging();
    let fx = VortexFixture::standard();
    fx.game_file("doorstop_config.ini");
    let (fx, cli) = fx.build();

    cli.run(&["cleanup", "--game-path", &fx.game_path().to_string_lossy()])
        .assert_success()
        .assert_stdout_contains("No symlinks found. Nothing to clean up.");
}

#[test]
fn cleanup_uses_the_store_game_path_by_default() {
    init_test_logging();
    let (fx, cli) = linked_game().build();

    cli.run(&["cleanup", "--dry-run"])
        .assert_success()
        .assert_stdout_contains("3 symlinks to be removed");
    assert_eq!(symlinks_under(&fx.game_path()).len(), 4);
}

#[test]
fn cleanup_after_deploy_leaves_only_directories() {
    use crate::common::fixtures::{ModSpec, PLUGIN_TYPE};

    init_test_logging();
    let (fx, cli) = VortexFixture::standard()
        .with_mod(&ModSpec::new("plugin", "Cool Plugin", PLUGIN_TYPE).file("Cool/Cool.dll"))
        .build();

    cli.run(&["deploy"]).assert_success();
    assert_eq!(symlinks_under(&fx.game_path()).len(), 1);

    cli.run(&["cleanup"])
        .assert_success()
        .assert_stdout_contains("Symlinks removed: 1");
    assert!(symlinks_under(&fx.game_path()).is_empty());
    assert!(fx.game_path().join("BepInEx/plugins/Cool").is_dir());
}
