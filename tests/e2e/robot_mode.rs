//! Robot-mode end-to-end tests.

use serde_json::Value;

use crate::common::assertions::{assert_json_has_fields, symlinks_under};
use crate::common::cli::CliRunner;
use crate::common::fixtures::{ModSpec, VortexFixture, FRAMEWORK_TYPE, PLUGIN_TYPE};
use crate::common::init_test_logging;

#[test]
fn robot_quick_start_outputs_json() {
    init_test_logging();
    let result = CliRunner::new().run(&["--robot"]);
    result.assert_success();

    let json = assert_json_has_fields(result.stdout.trim(), &["tool", "deployment", "output_modes"]);
    assert_eq!(json["tool"], "vxl");
}

#[test]
fn robot_deploy_dry_run_reports_plan() {
    init_test_logging();
    let (fx, cli) = VortexFixture::standard()
        .with_mod(&ModSpec::new("bepinex", "BepInEx Pack", FRAMEWORK_TYPE).file("winhttp.dll"))
        .with_mod(&ModSpec::new("plugin", "Cool Plugin", PLUGIN_TYPE).file("Cool.dll"))
        .with_mod(&ModSpec::new("coll", "My Collection", "collection"))
        .with_mod(&ModSpec::new("ghost", "Ghost Plugin", PLUGIN_TYPE).without_install())
        .build();

    let result = cli.run_robot(&["deploy", "--dry-run"]);
    result
        .assert_success()
        .assert_json_field("/dry_run", &Value::Bool(true))
        .assert_json_field("/total_mods", &Value::from(3))
        .assert_json_field("/framework_count", &Value::from(1))
        .assert_json_field("/plugin_count", &Value::from(2))
        .assert_json_field("/total_links", &Value::from(2))
        .assert_json_array_len("/steps", 3);

    let json = result.json();
    let steps = json["steps"].as_array().unwrap();
    assert_eq!(steps[0]["status"], "deployed");
    assert_eq!(steps[0]["kind"], "framework");
    let skipped: Vec<_> = steps.iter().filter(|s| s["status"] == "skipped").collect();
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0]["reason"], "no_installation_path");
    assert_eq!(skipped[0]["name"], "Ghost Plugin");

    assert!(symlinks_under(&fx.game_path()).is_empty());
}

#[test]
fn compact_format_is_single_line() {
    init_test_logging();
    let (_fx, cli) = VortexFixture::standard().build();

    let result = cli.run(&["--format", "json-compact", "profiles"]);
    result.assert_success();
    assert_eq!(result.stdout.trim().lines().count(), 1);
    let _ = result.json();
}

#[test]
fn robot_errors_are_json_on_stderr() {
    init_test_logging();
    let (_fx, cli) = VortexFixture::new().build();

    let result = cli.run_robot(&["deploy"]);
    result.assert_exit_code(1);
    let err = result.stderr_json();
    assert_eq!(err["error"], true);
    assert_eq!(err["recoverable"], true);
    assert!(err["message"]
        .as_str()
        .unwrap()
        .contains("active profile"));
}

#[test]
fn robot_version_has_build_fields() {
    init_test_logging();
    let result = CliRunner::new().run_robot(&["version"]);
    result
        .assert_success()
        .assert_json_field("/name", &Value::from("vortex_linker"))
        .assert_json_field_exists("/version")
        .assert_json_field_exists("/git_sha")
        .assert_json_field_exists("/target");
}
