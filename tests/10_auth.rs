mod common;

use common::{Harness, ADMIN_EMAIL, ADMIN_PASSWORD, USER_EMAIL, USER_PASSWORD};
use folio_admin::auth::{AuthError, AuthState, Role, SessionGate, SessionHandle, SignUpOutcome};
use folio_admin::store::ContentStore;
use std::sync::Arc;

#[tokio::test]
async fn admin_sign_in_reaches_admin_state() {
    let h = Harness::new();
    assert_eq!(h.gate.state(), AuthState::Anonymous);

    let identity = h.gate.sign_in(ADMIN_EMAIL, ADMIN_PASSWORD).await.unwrap();
    assert_eq!(identity.role, Role::Admin);
    assert!(h.gate.state().is_admin());
}

#[tokio::test]
async fn account_without_profile_row_is_standard() {
    let h = Harness::new();
    let identity = h.gate.sign_in(USER_EMAIL, USER_PASSWORD).await.unwrap();
    assert_eq!(identity.role, Role::Standard);
    assert!(!h.gate.state().is_admin());
}

#[tokio::test]
async fn invalid_credentials_leave_state_unchanged() {
    let h = Harness::new();
    let err = h.gate.sign_in(ADMIN_EMAIL, "wrong").await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));
    assert_eq!(h.gate.state(), AuthState::Anonymous);

    // also unchanged when already signed in
    h.sign_in_admin().await;
    let _ = h.gate.sign_in(ADMIN_EMAIL, "wrong").await.unwrap_err();
    assert!(h.gate.state().is_admin());
}

#[tokio::test]
async fn subscribers_see_the_transition_before_the_call_resolves() {
    let h = Harness::new();
    let rx = h.gate.subscribe();

    h.sign_in_admin().await;
    // no await between sign_in resolving and this read: the watch channel
    // must already carry the authenticated state
    assert!(rx.borrow().is_admin());

    h.gate.sign_out().await.unwrap();
    assert_eq!(*rx.borrow(), AuthState::Anonymous);
}

#[tokio::test]
async fn sign_out_is_unconditional() {
    let h = Harness::new();
    h.sign_in_admin().await;
    h.gate.sign_out().await.unwrap();
    assert_eq!(h.gate.state(), AuthState::Anonymous);

    // signing out while anonymous is a no-op, not an error
    h.gate.sign_out().await.unwrap();
    assert_eq!(h.gate.state(), AuthState::Anonymous);
}

#[tokio::test]
async fn sign_up_never_grants_admin() {
    let h = Harness::new();
    let outcome = h.gate.sign_up("new@example.com", "secret1").await.unwrap();
    assert!(matches!(outcome, SignUpOutcome::SignedIn(_)));
    match h.gate.state() {
        AuthState::Authenticated(identity) => assert_eq!(identity.role, Role::Standard),
        AuthState::Anonymous => panic!("expected authenticated state"),
    }
}

#[tokio::test]
async fn sign_up_with_confirmation_stays_anonymous() {
    let store = Arc::new(folio_admin::store::MemoryStore::new());
    let auth = Arc::new(folio_admin::auth::MemoryAuth::with_confirmation_required());
    let gate = SessionGate::new(
        auth,
        store as Arc<dyn ContentStore>,
        SessionHandle::new(),
    );

    let outcome = gate.sign_up("new@example.com", "secret1").await.unwrap();
    assert!(matches!(outcome, SignUpOutcome::ConfirmationRequired));
    assert_eq!(gate.state(), AuthState::Anonymous);
}

#[tokio::test]
async fn restore_picks_up_a_live_session() {
    let h = Harness::new();
    h.sign_in_admin().await;

    // a second gate over the same auth service, as on process restart
    let gate = SessionGate::new(
        h.auth.clone(),
        h.store.clone() as Arc<dyn ContentStore>,
        SessionHandle::new(),
    );
    let state = gate.restore().await.unwrap();
    assert!(state.is_admin());
}

#[tokio::test]
async fn restore_ignores_an_expired_session() {
    let h = Harness::new();
    h.sign_in_admin().await;
    h.auth.expire_active();

    let gate = SessionGate::new(
        h.auth.clone(),
        h.store.clone() as Arc<dyn ContentStore>,
        SessionHandle::new(),
    );
    assert_eq!(gate.restore().await.unwrap(), AuthState::Anonymous);
}
