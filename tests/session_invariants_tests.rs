//! State-machine invariants checked after every step of mixed operation sequences.

mod common;

use std::sync::Arc;

use tempfile::tempdir;

use common::token_for;
use warden::identity::{
    FileSessionStore, FixedClock, HydrateOutcome, MemorySessionStore, SessionManager, SessionStatus, SessionStore,
    UserRecord, TOKEN_KEY, USER_KEY,
};

const NOW: i64 = 1_800_000_000;

#[derive(Debug, Clone, Copy)]
enum Op {
    LoginAdmin,
    LoginUser,
    Logout,
    Hydrate,
    CorruptToken,
    ExpireClock,
}

fn user(role: &str) -> UserRecord {
    UserRecord { id: "u-1".into(), profile_id: "p-1".into(), email: "ops@example.com".into(), role: role.into() }
}

fn check(sm: &SessionManager, store: &dyn SessionStore, step: usize, op: Op) {
    assert_eq!(sm.user().is_some(), sm.credential().is_some(), "presence invariant broken at step {} ({:?})", step, op);
    if let Some(u) = sm.user() {
        assert_eq!(u.role, "ADMIN", "non-admin session observable at step {} ({:?})", step, op);
        assert_eq!(sm.status(), SessionStatus::Authenticated);
    } else {
        assert_eq!(sm.status(), SessionStatus::Unauthenticated);
        assert!(!sm.is_authenticated());
    }
    if matches!(op, Op::Logout | Op::LoginUser) {
        assert!(store.get(TOKEN_KEY).unwrap().is_none());
        assert!(store.get(USER_KEY).unwrap().is_none());
    }
}

fn run(ops: &[Op]) {
    let store = Arc::new(MemorySessionStore::new());
    let clock = Arc::new(FixedClock::new(NOW));
    let sm = SessionManager::new(store.clone(), "ADMIN").with_clock(clock.clone());
    for (i, op) in ops.iter().copied().enumerate() {
        match op {
            Op::LoginAdmin => {
                let _ = sm.login(user("ADMIN"), token_for("ADMIN", "ops@example.com", clock_now(&clock) + 60));
            }
            Op::LoginUser => {
                assert!(sm.login(user("USER"), token_for("USER", "ops@example.com", clock_now(&clock) + 60)).is_err());
            }
            Op::Logout => sm.logout(),
            Op::Hydrate => {
                sm.hydrate();
            }
            Op::CorruptToken => store.set(TOKEN_KEY, "corrupted").unwrap(),
            Op::ExpireClock => clock.advance(120),
        }
        check(&sm, store.as_ref(), i, op);
    }
}

fn clock_now(clock: &FixedClock) -> i64 {
    use warden::identity::Clock;
    clock.now()
}

#[test]
fn mixed_sequences_preserve_invariants() {
    use Op::*;
    let sequences: &[&[Op]] = &[
        &[LoginAdmin, Hydrate, Logout, Logout, Hydrate],
        &[LoginAdmin, LoginUser, Hydrate, LoginAdmin],
        &[LoginAdmin, CorruptToken, Hydrate, Hydrate],
        &[LoginAdmin, ExpireClock, Hydrate, LoginAdmin, Hydrate],
        &[Hydrate, LoginUser, LoginUser, Logout],
        &[LoginAdmin, LoginAdmin, CorruptToken, Logout, Hydrate],
    ];
    for ops in sequences {
        run(ops);
    }
}

#[test]
fn corrupted_token_hydrates_to_logged_out_with_empty_store() {
    let store = Arc::new(MemorySessionStore::new());
    let sm = SessionManager::new(store.clone(), "ADMIN").with_clock(Arc::new(FixedClock::new(NOW)));
    sm.login(user("ADMIN"), token_for("ADMIN", "ops@example.com", NOW + 60)).unwrap();
    store.set(TOKEN_KEY, "corrupted").unwrap();
    assert!(matches!(sm.hydrate(), HydrateOutcome::Rejected(_)));
    assert!(!sm.is_authenticated());
    assert!(store.is_empty());
}

#[test]
fn file_backed_round_trip_and_expiry_boundary() {
    let tmp = tempdir().unwrap();
    let clock = Arc::new(FixedClock::new(NOW));
    {
        let store = Arc::new(FileSessionStore::open(tmp.path()).unwrap());
        let sm = SessionManager::new(store, "ADMIN").with_clock(clock.clone());
        sm.login(user("ADMIN"), token_for("ADMIN", "ops@example.com", NOW + 1)).unwrap();
    }
    // exp == now + 1: still valid
    let store = Arc::new(FileSessionStore::open(tmp.path()).unwrap());
    let sm = SessionManager::new(store.clone(), "ADMIN").with_clock(clock.clone());
    assert_eq!(sm.hydrate(), HydrateOutcome::Restored(user("ADMIN")));

    // exp == now: expired, and storage is wiped
    clock.advance(1);
    let sm = SessionManager::new(store.clone(), "ADMIN").with_clock(clock);
    assert!(matches!(sm.hydrate(), HydrateOutcome::Rejected(warden::AuthError::ExpiredCredential { .. })));
    assert!(store.get(TOKEN_KEY).unwrap().is_none());
    assert!(store.get(USER_KEY).unwrap().is_none());
}

#[test]
fn configurable_privileged_role() {
    let store = Arc::new(MemorySessionStore::new());
    let sm = SessionManager::new(store, "SUPERADMIN").with_clock(Arc::new(FixedClock::new(NOW)));
    assert!(sm.login(user("ADMIN"), token_for("ADMIN", "ops@example.com", NOW + 60)).is_err());
    assert!(sm.login(user("SUPERADMIN"), token_for("SUPERADMIN", "ops@example.com", NOW + 60)).is_ok());
    assert_eq!(sm.privileged_role(), "SUPERADMIN");
}
