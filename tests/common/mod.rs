//! Shared harness: an in-memory store and auth service wired to a session
//! gate, seeded with one admin account (with an admin profile row) and one
//! standard account (no profile row at all).

#![allow(dead_code)]

use serde_json::{json, Value};
use std::sync::Arc;

use folio_admin::auth::{MemoryAuth, SessionGate, SessionHandle};
use folio_admin::content::{ContentRecord, FormInput, Profile};
use folio_admin::manager::ListManager;
use folio_admin::repository::Repository;
use folio_admin::store::{ContentStore, MemoryStore, Row};

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "admin-secret";
pub const USER_EMAIL: &str = "visitor@example.com";
pub const USER_PASSWORD: &str = "visitor-secret";

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub auth: Arc<MemoryAuth>,
    pub gate: SessionGate,
}

impl Harness {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let auth = Arc::new(MemoryAuth::new());

        let admin_id = auth.add_account(ADMIN_EMAIL, ADMIN_PASSWORD);
        auth.add_account(USER_EMAIL, USER_PASSWORD);
        store.seed(
            Profile::TABLE,
            vec![row(json!({
                "id": admin_id.to_string(),
                "email": ADMIN_EMAIL,
                "role": "admin",
            }))],
        );

        let handle = SessionHandle::new();
        let gate = SessionGate::new(
            auth.clone(),
            store.clone() as Arc<dyn ContentStore>,
            handle,
        );
        Self { store, auth, gate }
    }

    pub async fn sign_in_admin(&self) {
        self.gate
            .sign_in(ADMIN_EMAIL, ADMIN_PASSWORD)
            .await
            .expect("admin sign-in");
    }

    pub fn repository<T: ContentRecord>(&self) -> Repository<T> {
        Repository::new(
            self.store.clone() as Arc<dyn ContentStore>,
            self.gate.clone(),
        )
    }

    pub fn manager<I: FormInput + 'static>(&self) -> ListManager<I> {
        ListManager::new(self.repository::<I::Record>())
    }
}

pub fn row(value: Value) -> Row {
    value.as_object().cloned().expect("object literal")
}
