use super::{touch_with_age, HOUR};
use crate::config::{Channel, SyncConfig};
use crate::prune::{is_stale, prune_all, prune_channel, stale_files};
use std::time::{Duration, SystemTime};

#[test]
fn test_prunes_25h_old_and_keeps_23h_old() {
    let dir = tempfile::tempdir().unwrap();
    let now = SystemTime::now();
    let old = dir.path().join("old.jp2");
    let fresh = dir.path().join("fresh.jp2");
    touch_with_age(&old, 25 * HOUR, now);
    touch_with_age(&fresh, 23 * HOUR, now);

    let removed = prune_channel(dir.path(), "jp2", 24 * HOUR, now).unwrap();

    assert_eq!(removed, vec![old.clone()]);
    assert!(!old.exists());
    assert!(fresh.exists());
}

#[test]
fn test_is_stale_boundaries() {
    let now = SystemTime::now();
    assert!(is_stale(now - 24 * HOUR, now, 24 * HOUR));
    assert!(!is_stale(now - 24 * HOUR + Duration::from_secs(1), now, 24 * HOUR));
    // clock skew: modified after "now"
    assert!(!is_stale(now + HOUR, now, 24 * HOUR));
}

#[test]
fn test_other_extensions_are_left_alone() {
    let dir = tempfile::tempdir().unwrap();
    let now = SystemTime::now();
    let notes = dir.path().join("notes.txt");
    touch_with_age(&notes, 100 * HOUR, now);

    let removed = prune_channel(dir.path(), "jp2", 24 * HOUR, now).unwrap();

    assert!(removed.is_empty());
    assert!(notes.exists());
}

#[test]
fn test_missing_directory_has_nothing_to_prune() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("171");

    let removed = prune_channel(&missing, "jp2", 24 * HOUR, SystemTime::now()).unwrap();
    assert!(removed.is_empty());
}

#[test]
fn test_directory_name_with_glob_characters() {
    let dir = tempfile::tempdir().unwrap();
    let now = SystemTime::now();
    let odd = dir.path().join("[cache]");
    let old = odd.join("old.jp2");
    touch_with_age(&old, 48 * HOUR, now);

    let removed = prune_channel(&odd, "jp2", 24 * HOUR, now).unwrap();
    assert_eq!(removed, vec![old.clone()]);
    assert!(!old.exists());
}

#[test]
fn test_retention_is_configurable() {
    let dir = tempfile::tempdir().unwrap();
    let now = SystemTime::now();
    let frame = dir.path().join("frame.jp2");
    touch_with_age(&frame, 3 * HOUR, now);

    assert!(stale_files(dir.path(), "jp2", 4 * HOUR, now).unwrap().is_empty());
    assert_eq!(stale_files(dir.path(), "jp2", 2 * HOUR, now).unwrap(), vec![frame]);
}

#[test]
fn test_prune_all_covers_each_channel() {
    let dir = tempfile::tempdir().unwrap();
    let now = SystemTime::now();
    let config = SyncConfig {
        data_dir: dir.path().to_path_buf(),
        channels: vec![Channel::A171, Channel::A304],
        ..SyncConfig::default()
    };
    touch_with_age(&dir.path().join("171").join("a.jp2"), 30 * HOUR, now);
    touch_with_age(&dir.path().join("304").join("b.jp2"), 30 * HOUR, now);
    touch_with_age(&dir.path().join("304").join("c.jp2"), HOUR, now);
    // not a configured channel
    touch_with_age(&dir.path().join("94").join("d.jp2"), 30 * HOUR, now);

    let results = prune_all(&config, now);

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].0, Channel::A171);
    assert_eq!(results[0].1.as_ref().unwrap().len(), 1);
    assert_eq!(results[1].0, Channel::A304);
    assert_eq!(results[1].1.as_ref().unwrap().len(), 1);
    assert!(dir.path().join("304").join("c.jp2").exists());
    assert!(dir.path().join("94").join("d.jp2").exists());
}

#[test]
fn test_prune_all_dry_run_keeps_files() {
    let dir = tempfile::tempdir().unwrap();
    let now = SystemTime::now();
    let config = SyncConfig {
        data_dir: dir.path().to_path_buf(),
        channels: vec![Channel::A193],
        dry_run: true,
        ..SyncConfig::default()
    };
    let old = dir.path().join("193").join("old.jp2");
    touch_with_age(&old, 30 * HOUR, now);

    let results = prune_all(&config, now);

    assert_eq!(results[0].1.as_ref().unwrap(), &vec![old.clone()]);
    assert!(old.exists());
}
