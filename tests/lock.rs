// ABOUTME: Tests for the switch lock guarding the state file.
// ABOUTME: Covers exclusive acquisition, stale and forced breaking, and release.

use chrono::Utc;
use std::fs;
use swapcam::deploy::{LockError, LockInfo, SwitchLock};
use tempfile::TempDir;

fn state_path(dir: &TempDir) -> std::path::PathBuf {
    dir.path().join("active_container.txt")
}

fn write_lock(dir: &TempDir, info: &LockInfo) {
    let path = LockInfo::lock_path(&state_path(dir));
    fs::write(path, serde_json::to_string(info).unwrap()).unwrap();
}

#[test]
fn second_acquire_fails_while_held() {
    let dir = TempDir::new().unwrap();
    let _lock = SwitchLock::acquire(&state_path(&dir), false).unwrap();

    let err = SwitchLock::acquire(&state_path(&dir), false).unwrap_err();

    assert!(matches!(err, LockError::Held { pid, .. } if pid == std::process::id()));
    assert!(err.to_string().contains("--force"));
}

#[test]
fn lock_file_records_holder() {
    let dir = TempDir::new().unwrap();
    let lock = SwitchLock::acquire(&state_path(&dir), false).unwrap();

    let info: LockInfo = serde_json::from_str(&fs::read_to_string(lock.path()).unwrap()).unwrap();
    assert_eq!(info.pid, std::process::id());
    assert!(!info.is_stale());
}

#[test]
fn release_removes_lock_file() {
    let dir = TempDir::new().unwrap();
    let lock = SwitchLock::acquire(&state_path(&dir), false).unwrap();
    let path = lock.path().to_path_buf();

    lock.release().unwrap();

    assert!(!path.exists());
    SwitchLock::acquire(&state_path(&dir), false).unwrap();
}

#[test]
fn drop_releases_lock() {
    let dir = TempDir::new().unwrap();
    {
        let _lock = SwitchLock::acquire(&state_path(&dir), false).unwrap();
    }
    assert!(!LockInfo::lock_path(&state_path(&dir)).exists());
}

#[test]
fn stale_lock_is_broken() {
    let dir = TempDir::new().unwrap();
    let mut info = LockInfo::new();
    info.holder = "other-host".to_string();
    info.started_at = Utc::now() - chrono::Duration::hours(3);
    write_lock(&dir, &info);

    let lock = SwitchLock::acquire(&state_path(&dir), false).unwrap();

    let current: LockInfo =
        serde_json::from_str(&fs::read_to_string(lock.path()).unwrap()).unwrap();
    assert_ne!(current.holder, "other-host");
}

#[test]
fn live_lock_needs_force() {
    let dir = TempDir::new().unwrap();
    let mut info = LockInfo::new();
    info.pid = 1;
    write_lock(&dir, &info);

    assert!(SwitchLock::acquire(&state_path(&dir), false).is_err());
    SwitchLock::acquire(&state_path(&dir), true).unwrap();
}

#[test]
fn corrupt_lock_is_broken() {
    let dir = TempDir::new().unwrap();
    fs::write(LockInfo::lock_path(&state_path(&dir)), "{garbage").unwrap();

    SwitchLock::acquire(&state_path(&dir), false).unwrap();
}
