//! Conditions that must stop a command with exit code 1 and no changes.

use std::fs;

use crate::common::assertions::symlinks_under;
use crate::common::fixtures::{ModSpec, VortexFixture, PLUGIN_TYPE};
use crate::common::init_test_logging;

#[test]
fn missing_active_profile_exits_one() {
    init_test_logging();
    let (fx, cli) = VortexFixture::new()
        .with_recorded_paths()
        .with_mod(&ModSpec::new("plugin", "Cool Plugin", PLUGIN_TYPE).file("Cool.dll"))
        .build();

    cli.run(&["deploy"])
        .assert_exit_code(1)
        .assert_stderr_contains("Could not find active profile for subnautica");
    assert!(symlinks_under(&fx.game_path()).is_empty());
}

#[test]
fn active_profile_of_another_game_does_not_count() {
    init_test_logging();
    let (_fx, cli) = VortexFixture::new()
        .with_string("settings###profiles###lastActiveProfile###skyrimse", "p9")
        .build();

    cli.run(&["list"]).assert_exit_code(1);
}

#[test]
fn lock_sentinel_refuses_to_read() {
    init_test_logging();
    let (fx, cli) = VortexFixture::standard()
        .with_mod(&ModSpec::new("plugin", "Cool Plugin", PLUGIN_TYPE).file("Cool.dll"))
        .build();
    fs::write(fx.store_path().join("vortex.lock"), "").unwrap();

    cli.run(&["deploy"])
        .assert_exit_code(1)
        .assert_stderr_contains("in use by another process");
    assert!(symlinks_under(&fx.game_path()).is_empty());
    assert!(!fx.snapshot_path().exists());
}

#[test]
fn missing_store_lists_candidates() {
    init_test_logging();
    let fx = VortexFixture::standard();
    let (fx, cli) = fx.build();
    fs::remove_dir_all(fx.store_path()).unwrap();

    cli.run(&["list"])
        .assert_exit_code(1)
        .assert_stderr_contains("database not found")
        .assert_stderr_contains(&fx.store_path().to_string_lossy());
}

#[test]
fn missing_game_directory_is_reported() {
    init_test_logging();
    let (fx, cli) = VortexFixture::standard()
        .with_mod(&ModSpec::new("plugin", "Cool Plugin", PLUGIN_TYPE).file("Cool.dll"))
        .build();
    fs::remove_dir_all(fx.game_path()).unwrap();

    cli.run(&["deploy"])
        .assert_exit_code(1)
        .assert_stderr_contains("Game path does not exist");
}

#[test]
fn missing_explicit_config_is_an_error() {
    init_test_logging();
    let fx = VortexFixture::new();
    let missing = fx.root().join("nope.toml");

    crate::common::cli::CliRunner::new()
        .run(&["--config", &missing.to_string_lossy(), "list"])
        .assert_exit_code(1)
        .assert_stderr_contains("Configuration file not found");
}
