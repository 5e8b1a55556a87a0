//! Opening and iterating real LevelDB stores.

use std::fs;

use rusty_leveldb::{Options, DB};
use vxl::config::Config;
use vxl::error::VxError;
use vxl::store::{open_store, KvStore, LevelDbStore};

use crate::common::fixtures::VortexFixture;
use crate::common::init_test_logging;

fn fixture_config(fx: &VortexFixture) -> Config {
    Config::from_file(&fx.config_path()).expect("fixture config must parse")
}

#[test]
fn leveldb_store_yields_every_entry_in_key_order() {
    init_test_logging();
    let fx = VortexFixture::standard();
    fx.write().unwrap();

    let mut store = LevelDbStore::open(&fx.store_path()).unwrap();
    let entries = store.entries().unwrap();

    assert_eq!(entries.len(), 5);
    let keys: Vec<_> = entries.iter().map(|e| e.key.clone()).collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);
}

#[test]
fn opening_a_missing_directory_never_creates_it() {
    init_test_logging();
    let fx = VortexFixture::new();
    let missing = fx.root().join("absent");

    assert!(LevelDbStore::open(&missing).is_err());
    assert!(!missing.exists());
}

#[test]
fn snapshot_read_leaves_live_store_untouched() {
    init_test_logging();
    let fx = VortexFixture::standard();
    fx.write().unwrap();
    let config = fixture_config(&fx);

    let mut before: Vec<_> = fs::read_dir(fx.store_path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    before.sort();

    let mut handle = open_store(&config, None, true).unwrap();
    assert!(handle.is_snapshot());
    assert_eq!(handle.live_path, fx.store_path());
    assert_eq!(handle.read_path, fx.snapshot_path());
    assert_eq!(handle.entries().unwrap().len(), 5);
    drop(handle);

    let mut after: Vec<_> = fs::read_dir(fx.store_path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    after.sort();
    assert_eq!(before, after);
}

#[test]
fn in_place_read_still_checks_the_sentinel() {
    init_test_logging();
    let fx = VortexFixture::standard();
    fx.write().unwrap();
    fs::write(fx.store_path().join("vortex.lock"), "").unwrap();
    let config = fixture_config(&fx);

    let err = open_store(&config, None, false).err().expect("must refuse");
    assert!(matches!(err, VxError::ExternalWriterDetected { .. }));
}

#[test]
fn override_path_wins_over_config() {
    init_test_logging();
    let fx = VortexFixture::standard();
    fx.write().unwrap();
    let config = Config::default();

    let handle = open_store(&config, Some(&fx.store_path()), false).unwrap();
    assert_eq!(handle.read_path, fx.store_path());
    assert!(!handle.is_snapshot());
}

#[test]
fn fallback_copy_is_used_when_live_is_absent() {
    init_test_logging();
    let fx = VortexFixture::standard();
    fx.write().unwrap();
    let mut config = fixture_config(&fx);
    config.store.fallback_path = fx.store_path();
    config.store.path = fx.root().join("not-there");

    let handle = open_store(&config, None, false).unwrap();
    assert_eq!(handle.live_path, fx.store_path());
}

#[test]
fn binary_keys_are_iterated_too() {
    init_test_logging();
    let fx = VortexFixture::new();
    let opts = Options {
        create_if_missing: true,
        ..Options::default()
    };
    let mut db = DB::open(fx.store_path(), opts).unwrap();
    db.put(&[0xff, 0xfe, 0x00], b"raw").unwrap();
    db.put(b"settings###a", b"1").unwrap();
    db.flush().unwrap();
    drop(db);

    let mut store = LevelDbStore::open(&fx.store_path()).unwrap();
    let entries = store.entries().unwrap();
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().any(|e| e.key == [0xff, 0xfe, 0x00]));
}
