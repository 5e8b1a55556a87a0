//! Building a registry from a real store.

use vxl::registry::{EnabledPolicy, ModRegistryBuilder};
use vxl::store::LevelDbStore;
use vxl::translate::translate_path;

use crate::common::fixtures::{ModSpec, VortexFixture, FRAMEWORK_TYPE, GAME, PLUGIN_TYPE, PROFILE};
use crate::common::init_test_logging;

#[test]
fn registry_reflects_the_store() {
    init_test_logging();
    let fx = VortexFixture::standard()
        .with_mod(&ModSpec::new("bepinex", "BepInEx Pack", FRAMEWORK_TYPE).file("winhttp.dll"))
        .with_mod(&ModSpec::new("plugin", "Cool Plugin", PLUGIN_TYPE).disabled())
        .with_string("persistent###mods###skyrimse###other###type", "\"x\"")
        .with_entry("app###installId", "\"abc\"");
    fx.write().unwrap();

    let mut store = LevelDbStore::open(&fx.store_path()).unwrap();
    let registry = ModRegistryBuilder::build_from(&mut store, GAME).unwrap();

    assert_eq!(registry.active_profile_id(), Some(PROFILE));
    assert_eq!(registry.profile_name(PROFILE), Some("Default"));
    assert_eq!(registry.mod_count(), 2);
    assert!(registry.resolve("other").is_none());

    let bepinex = registry.resolve("bepinex").unwrap();
    assert_eq!(bepinex.display_name(), "BepInEx Pack");
    assert_eq!(bepinex.mod_type(), FRAMEWORK_TYPE);
    assert_eq!(bepinex.installation_path.as_deref(), Some("bepinex-1"));
    assert_eq!(bepinex.mod_version.as_deref(), Some("1.0.0"));

    assert_eq!(
        registry.enabled_mod_ids(PROFILE, EnabledPolicy::Flag),
        vec!["bepinex"]
    );
    assert_eq!(
        registry.enabled_mod_ids(PROFILE, EnabledPolicy::Time),
        vec!["bepinex", "plugin"]
    );

    let stats = registry.stats();
    assert!(stats.total >= stats.matched + stats.skipped);
    assert!(stats.skipped >= 2, "foreign game and app keys are skipped");
}

#[test]
fn recorded_paths_translate_to_fixture_directories() {
    init_test_logging();
    let fx = VortexFixture::standard();
    fx.write().unwrap();

    let mut store = LevelDbStore::open(&fx.store_path()).unwrap();
    let registry = ModRegistryBuilder::build_from(&mut store, GAME).unwrap();

    assert_eq!(
        translate_path(registry.game_path().unwrap()),
        fx.game_path()
    );
    assert_eq!(
        translate_path(registry.staging_path().unwrap()),
        fx.staging_path()
    );
}
