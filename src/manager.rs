//! List-with-form workflow for one entity type's admin view.
//!
//! Holds the observable list state, runs validation before any network call,
//! and serializes mutations: one write in flight per entity type, a second
//! attempt is rejected with `Busy` rather than raced or dropped. Writes run
//! inside a spawned task so an abandoned caller (navigation away) cannot stop
//! a mutation mid-flight; only the follow-up reload is abandoned with it.

use serde_json::Map;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};

use crate::content::{ContentRecord, FormInput};
use crate::error::CoreError;
use crate::repository::Repository;
use crate::store::Row;
use crate::validate::Violation;

/// Snapshot of one list view, consumed by the presentation layer.
#[derive(Debug, Clone)]
pub struct ListState<T> {
    /// `None` until the first successful load; a failed reload never clears a
    /// previously loaded collection.
    pub records: Option<Vec<T>>,
    /// Field-level messages from the last rejected submit.
    pub violations: Vec<Violation>,
    /// Id of the record currently being edited, if any.
    pub editing: Option<String>,
    /// True while a mutation is in flight.
    pub busy: bool,
    /// Last surfaced repository error, cleared by the next success.
    pub last_error: Option<String>,
}

impl<T> Default for ListState<T> {
    fn default() -> Self {
        Self {
            records: None,
            violations: Vec::new(),
            editing: None,
            busy: false,
            last_error: None,
        }
    }
}

enum WriteOp {
    Create(Row),
    Update(String, Row),
    Delete(String),
}

pub struct ListManager<I: FormInput> {
    repo: Repository<I::Record>,
    state_tx: watch::Sender<ListState<I::Record>>,
    write_guard: Arc<Mutex<()>>,
}

impl<I: FormInput> Clone for ListManager<I> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            state_tx: self.state_tx.clone(),
            write_guard: self.write_guard.clone(),
        }
    }
}

impl<I: FormInput + 'static> ListManager<I> {
    pub fn new(repo: Repository<I::Record>) -> Self {
        let (state_tx, _) = watch::channel(ListState::default());
        Self {
            repo,
            state_tx,
            write_guard: Arc::new(Mutex::new(())),
        }
    }

    pub fn state(&self) -> ListState<I::Record> {
        self.state_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ListState<I::Record>> {
        self.state_tx.subscribe()
    }

    /// Fetch the full collection. On failure the prior collection stays put
    /// and the error is surfaced instead of a blanked view.
    pub async fn load(&self) -> Result<(), CoreError> {
        match self.repo.list_all().await {
            Ok(records) => {
                self.state_tx.send_modify(|s| {
                    s.records = Some(records);
                    s.last_error = None;
                });
                Ok(())
            }
            Err(e) => {
                tracing::warn!(table = I::Record::TABLE, "load failed: {}", e);
                self.state_tx
                    .send_modify(|s| s.last_error = Some(e.user_message()));
                Err(e)
            }
        }
    }

    pub async fn submit_new(&self, input: &I) -> Result<(), CoreError> {
        let fields = self.validated(input)?;
        self.run_write(WriteOp::Create(fields)).await?;
        self.load().await
    }

    pub async fn submit_edit(&self, id: &str, input: &I) -> Result<(), CoreError> {
        let fields = self.validated(input)?;
        self.run_write(WriteOp::Update(id.to_string(), fields))
            .await?;
        self.state_tx.send_modify(|s| {
            if s.editing.as_deref() == Some(id) {
                s.editing = None;
            }
        });
        self.load().await
    }

    /// Delete, then reload. When the deleted id was mid-edit the edit state is
    /// cleared, whether the delete succeeded or found the record already gone.
    pub async fn remove(&self, id: &str) -> Result<(), CoreError> {
        self.run_write(WriteOp::Delete(id.to_string())).await?;
        self.load().await
    }

    pub fn begin_edit(&self, id: &str) -> Result<(), CoreError> {
        let known = self
            .state_tx
            .borrow()
            .records
            .as_ref()
            .map(|records| records.iter().any(|r| r.id() == id))
            .unwrap_or(false);
        if !known {
            return Err(CoreError::NotFound(format!("{} {id}", I::Record::TABLE)));
        }
        self.state_tx.send_modify(|s| {
            s.editing = Some(id.to_string());
            s.violations.clear();
        });
        Ok(())
    }

    pub fn cancel_edit(&self) {
        self.state_tx.send_modify(|s| {
            s.editing = None;
            s.violations.clear();
        });
    }

    /// Validation happens before any network call; violations abort the
    /// submit and are surfaced per-field.
    fn validated(&self, input: &I) -> Result<Map<String, serde_json::Value>, CoreError> {
        match I::schema().validate(input) {
            Ok(fields) => {
                self.state_tx.send_modify(|s| s.violations.clear());
                Ok(fields)
            }
            Err(e) => {
                self.state_tx
                    .send_modify(|s| s.violations = e.violations.clone());
                Err(e.into())
            }
        }
    }

    async fn run_write(&self, op: WriteOp) -> Result<(), CoreError> {
        let permit = self
            .write_guard
            .clone()
            .try_lock_owned()
            .map_err(|_| CoreError::Busy(I::Record::TABLE))?;

        self.state_tx.send_modify(|s| s.busy = true);
        let repo = self.repo.clone();
        let state_tx = self.state_tx.clone();

        // The write itself must complete even if the caller stops waiting.
        let handle = tokio::spawn(async move {
            let _permit = permit;
            let result = match op {
                WriteOp::Create(fields) => repo.create(fields).await,
                WriteOp::Update(id, fields) => repo.update(&id, fields).await,
                WriteOp::Delete(id) => {
                    let result = repo.delete(&id).await;
                    if matches!(result, Ok(()) | Err(CoreError::NotFound(_))) {
                        state_tx.send_modify(|s| {
                            if s.editing.as_deref() == Some(id.as_str()) {
                                s.editing = None;
                            }
                        });
                    }
                    result
                }
            };
            state_tx.send_modify(|s| {
                s.busy = false;
                if let Err(e) = &result {
                    s.last_error = Some(e.user_message());
                }
            });
            result
        });

        match handle.await {
            Ok(result) => result,
            Err(e) => Err(CoreError::Write(format!("write task failed: {e}"))),
        }
    }
}
