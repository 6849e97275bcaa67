//! Integration tests for session flag persistence across restarts
//!
//! The flag survives a restart through the file store; the secret never
//! does, so a restarted session always needs re-entry.

use ecko::session::{FileSessionStore, GateState, Session};
use tempfile::tempdir;

#[test]
fn test_flag_survives_restart_but_secret_does_not() {
    let dir = tempdir().unwrap();
    let flag_path = dir.path().join("session.flag");

    // First session: enter the password
    let store = FileSessionStore::new_with_path(&flag_path).unwrap();
    let mut session = Session::resume(Box::new(store));
    assert!(!session.needs_reentry());
    session.submit_password("hunter2").unwrap();
    session.confirm();
    assert_eq!(session.state(), GateState::Unlocked);
    assert!(flag_path.exists());

    // "Restart": a new session over the same flag path
    let store = FileSessionStore::new_with_path(&flag_path).unwrap();
    let session = Session::resume(Box::new(store));
    assert_eq!(session.state(), GateState::Locked);
    assert!(session.secret().is_none());
    assert!(session.needs_reentry());
}

#[test]
fn test_lock_removes_flag_for_future_sessions() {
    let dir = tempdir().unwrap();
    let flag_path = dir.path().join("session.flag");

    let store = FileSessionStore::new_with_path(&flag_path).unwrap();
    let mut session = Session::resume(Box::new(store));
    session.submit_password("hunter2").unwrap();
    assert!(flag_path.exists());

    session.lock();
    assert!(!flag_path.exists());

    // The next session starts cold, no re-entry note
    let store = FileSessionStore::new_with_path(&flag_path).unwrap();
    let session = Session::resume(Box::new(store));
    assert!(!session.needs_reentry());
}

#[test]
fn test_empty_password_leaves_store_untouched() {
    let dir = tempdir().unwrap();
    let flag_path = dir.path().join("session.flag");

    let store = FileSessionStore::new_with_path(&flag_path).unwrap();
    let mut session = Session::resume(Box::new(store));

    assert!(session.submit_password("   ").is_err());
    assert!(!flag_path.exists());
    assert_eq!(session.state(), GateState::Locked);
}

#[test]
fn test_store_creates_parent_directories() {
    let dir = tempdir().unwrap();
    let flag_path = dir.path().join("nested").join("deeper").join("session.flag");

    let store = FileSessionStore::new_with_path(&flag_path).unwrap();
    let mut session = Session::resume(Box::new(store));
    session.submit_password("hunter2").unwrap();
    assert!(flag_path.exists());
}
