//! Deploy then cleanup through the library on a real filesystem.

use vxl::config::Config;
use vxl::deploy::{cleanup, deploy, CleanupOptions, DeployOptions};
use vxl::fs::RealFs;
use vxl::registry::ModRegistryBuilder;
use vxl::store::LevelDbStore;

use crate::common::assertions::{assert_regular_file, symlinks_under};
use crate::common::fixtures::{ModSpec, VortexFixture, FRAMEWORK_TYPE, GAME, PLUGIN_TYPE};
use crate::common::init_test_logging;

#[test]
fn deploy_then_cleanup_restores_the_game_tree() {
    init_test_logging();
    let fx = VortexFixture::standard()
        .with_mod(
            &ModSpec::new("bepinex", "BepInEx Pack", FRAMEWORK_TYPE)
                .file("winhttp.dll")
                .file("BepInEx/core/BepInEx.dll"),
        )
        .with_mod(&ModSpec::new("plugin", "Cool Plugin", PLUGIN_TYPE).file("Cool/Cool.dll"));
    fx.game_file("Subnautica.exe");
    fx.write().unwrap();

    let config = Config::from_file(&fx.config_path()).unwrap();
    let mut store = LevelDbStore::open(&fx.store_path()).unwrap();
    let registry = ModRegistryBuilder::build_from(&mut store, GAME).unwrap();

    let report = deploy(&RealFs, &registry, &config, &DeployOptions::default()).unwrap();
    assert_eq!(report.total_mods, 2);
    assert_eq!(report.total_links, 3);
    assert_eq!(report.failed_links, 0);
    assert_eq!(symlinks_under(&fx.game_path()).len(), 3);

    let preview = cleanup(
        &RealFs,
        &fx.game_path(),
        &config.cleanup.scan_dirs,
        CleanupOptions {
            dry_run: true,
            recursive: false,
        },
    )
    .unwrap();
    assert_eq!(preview.links.len(), 3);
    assert_eq!(preview.removed, 0);
    assert_eq!(symlinks_under(&fx.game_path()).len(), 3);

    let done = cleanup(
        &RealFs,
        &fx.game_path(),
        &config.cleanup.scan_dirs,
        CleanupOptions::default(),
    )
    .unwrap();
    assert_eq!(done.removed, 3);
    assert!(done.failures.is_empty());
    assert!(symlinks_under(&fx.game_path()).is_empty());
    assert_regular_file(&fx.game_path().join("Subnautica.exe"));
}
