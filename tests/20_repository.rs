mod common;

use common::Harness;
use folio_admin::content::{ContentRecord, FormInput, Project, ProjectInput};
use folio_admin::error::CoreError;
use folio_admin::store::StoreError;
use folio_admin::validate::RawTags;

fn project_input(title: &str) -> ProjectInput {
    ProjectInput {
        title: title.to_string(),
        description: "A project with a long enough description".to_string(),
        image_url: String::new(),
        technologies: RawTags::Joined("Rust, Tokio".to_string()),
        github_url: "https://github.com/example/repo".to_string(),
        live_url: String::new(),
    }
}

fn normalized(title: &str) -> serde_json::Map<String, serde_json::Value> {
    ProjectInput::schema()
        .validate(&project_input(title))
        .expect("valid input")
}

#[tokio::test]
async fn create_then_list_round_trips() {
    let h = Harness::new();
    h.sign_in_admin().await;
    let repo = h.repository::<Project>();

    repo.create(normalized("Portfolio")).await.unwrap();
    let records = repo.list_all().await.unwrap();

    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.title, "Portfolio");
    assert_eq!(record.technologies, vec!["Rust", "Tokio"]);
    assert_eq!(
        record.github_url.as_deref(),
        Some("https://github.com/example/repo")
    );
    // empty optional URLs were normalized to absent, which reads as None
    assert_eq!(record.image_url, None);
    assert_eq!(record.live_url, None);
    assert!(!record.id.is_empty());
}

#[tokio::test]
async fn listing_is_newest_first_despite_interleaved_reads() {
    let h = Harness::new();
    h.sign_in_admin().await;
    let repo = h.repository::<Project>();

    repo.create(normalized("first")).await.unwrap();
    let _ = repo.list_all().await.unwrap();
    repo.create(normalized("second")).await.unwrap();
    let _ = repo.list_all().await.unwrap();
    repo.create(normalized("third")).await.unwrap();

    let titles: Vec<String> = repo
        .list_all()
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.title)
        .collect();
    assert_eq!(titles, vec!["third", "second", "first"]);

    // repeated reads with no intervening writes are identical
    let again: Vec<String> = repo
        .list_all()
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.title)
        .collect();
    assert_eq!(titles, again);
}

#[tokio::test]
async fn delete_twice_is_success_then_not_found() {
    let h = Harness::new();
    h.sign_in_admin().await;
    let repo = h.repository::<Project>();

    repo.create(normalized("doomed")).await.unwrap();
    let id = repo.list_all().await.unwrap()[0].id.clone();

    repo.delete(&id).await.unwrap();
    let err = repo.delete(&id).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn update_missing_id_is_not_found() {
    let h = Harness::new();
    h.sign_in_admin().await;
    let repo = h.repository::<Project>();

    let err = repo
        .update("nonexistent-id", normalized("ghost"))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn writes_require_a_session() {
    let h = Harness::new();
    let repo = h.repository::<Project>();

    let err = repo.create(normalized("nope")).await.unwrap_err();
    assert!(err.is_auth());
    assert_eq!(repo.list_all().await.unwrap().len(), 0);
}

#[tokio::test]
async fn expired_session_is_reported_as_expired() {
    use chrono::{Duration, Utc};
    use folio_admin::auth::{AuthError, SessionGate, SessionHandle};
    use std::sync::Arc;

    let h = Harness::new();
    let handle = SessionHandle::new();
    let gate = SessionGate::new(
        h.auth.clone(),
        h.store.clone() as Arc<dyn folio_admin::store::ContentStore>,
        handle.clone(),
    );
    gate.sign_in(common::ADMIN_EMAIL, common::ADMIN_PASSWORD)
        .await
        .unwrap();

    // token lifetime runs out between sign-in and the write
    let mut session = handle.get().expect("session after sign-in");
    session.expires_at = Utc::now() - Duration::seconds(5);
    handle.set(Some(session));

    let repo = folio_admin::repository::Repository::<Project>::new(
        h.store.clone() as Arc<dyn folio_admin::store::ContentStore>,
        gate.clone(),
    );
    let err = repo.create(normalized("stale")).await.unwrap_err();
    assert!(err.is_auth());
    assert!(matches!(err, CoreError::Auth(AuthError::SessionExpired)));
    assert_eq!(gate.state(), folio_admin::auth::AuthState::Anonymous);
}

#[tokio::test]
async fn a_token_revoked_at_the_store_is_an_auth_error() {
    let h = Harness::new();
    h.sign_in_admin().await;
    let repo = h.repository::<Project>();

    // local session check passes, the store itself refuses the token
    h.store
        .fail_next(StoreError::Unauthorized("JWT expired".into()));
    let err = repo.create(normalized("revoked")).await.unwrap_err();
    assert!(err.is_auth());
    assert!(!matches!(err, CoreError::Write(_)));
}

#[tokio::test]
async fn failed_read_is_an_error_not_an_empty_list() {
    let h = Harness::new();
    let repo = h.repository::<Project>();

    h.store
        .fail_next(StoreError::Transport("connection reset".into()));
    let err = repo.list_all().await.unwrap_err();
    assert!(matches!(err, CoreError::Fetch(_)));
}

#[tokio::test]
async fn payloads_must_not_carry_system_fields() {
    let h = Harness::new();
    h.sign_in_admin().await;
    let repo = h.repository::<Project>();

    let mut fields = normalized("sneaky");
    fields.insert("id".to_string(), "forged".into());
    let err = repo.create(fields).await.unwrap_err();
    assert!(matches!(err, CoreError::Write(_)));
    assert_eq!(h.store.row_count(Project::TABLE), 0);
}
