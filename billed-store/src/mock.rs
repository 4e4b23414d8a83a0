//! In-memory store seeded with the sample bills, with per-operation failure injection.

use async_trait::async_trait;
use billed_core::{BillRecord, BillStatus};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::debug;

use crate::api::{BillsApi, CreateBill, CreatedBill, Store, UpdateBill};
use crate::error::StoreError;
use crate::fixtures;

/// Base URL handed out for uploaded files.
pub const MOCK_FILE_HOST: &str = "https://localhost:3456/images";

const FIRST_KEY: u64 = 1234;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    List,
    Get,
    Create,
    Update,
}

#[derive(Debug, Default)]
struct State {
    records: Vec<BillRecord>,
    failures: HashMap<Op, StoreError>,
    // Consumed by the next call of the op.
    one_shot: HashMap<Op, StoreError>,
    calls: Vec<Op>,
    next_key: u64,
}

/// Scriptable [`Store`] for tests and offline runs.
#[derive(Debug)]
pub struct MockStore {
    state: Mutex<State>,
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MockStore {
    /// Seeded with [`fixtures::store_bills`].
    pub fn new() -> Self {
        Self::with_records(fixtures::store_bills())
    }

    pub fn empty() -> Self {
        Self::with_records(Vec::new())
    }

    pub fn with_records(records: Vec<BillRecord>) -> Self {
        Self {
            state: Mutex::new(State {
                records,
                next_key: FIRST_KEY,
                ..State::default()
            }),
        }
    }

    /// Make every later call of `op` fail with `error`.
    pub fn fail(self, op: Op, error: StoreError) -> Self {
        self.lock().failures.insert(op, error);
        self
    }

    /// Make only the next call of `op` fail with `error`.
    pub fn fail_once(self, op: Op, error: StoreError) -> Self {
        self.lock().one_shot.insert(op, error);
        self
    }

    /// Operations invoked so far, in call order.
    pub fn calls(&self) -> Vec<Op> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self, op: Op) -> usize {
        self.lock().calls.iter().filter(|c| **c == op).count()
    }

    pub fn records(&self) -> Vec<BillRecord> {
        self.lock().records.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    // Record the call, then fail if a failure is scripted for `op`.
    fn enter(&self, op: Op) -> Result<std::sync::MutexGuard<'_, State>, StoreError> {
        let mut state = self.lock();
        state.calls.push(op);
        if let Some(err) = state.one_shot.remove(&op) {
            return Err(err);
        }
        if let Some(err) = state.failures.get(&op).cloned() {
            return Err(err);
        }
        Ok(state)
    }
}

impl Store for MockStore {
    fn bills(&self) -> &dyn BillsApi {
        self
    }
}

#[async_trait]
impl BillsApi for MockStore {
    async fn list(&self) -> Result<Vec<BillRecord>, StoreError> {
        let state = self.enter(Op::List)?;
        Ok(state.records.clone())
    }

    async fn get(&self, id: &str) -> Result<BillRecord, StoreError> {
        let state = self.enter(Op::Get)?;
        state
            .records
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(id))
    }

    async fn create(&self, payload: CreateBill) -> Result<CreatedBill, StoreError> {
        let mut state = self.enter(Op::Create)?;
        let key = state.next_key.to_string();
        state.next_key += 1;

        let file_url = payload
            .file
            .as_ref()
            .map(|f| format!("{MOCK_FILE_HOST}/{}", f.name));
        let mut record =
            BillRecord::new(key.clone(), "", 0.0, BillStatus::Pending, payload.email);
        record.file_url = file_url.clone();
        record.file_name = payload.file.map(|f| f.name);
        state.records.push(record);

        debug!(key = %key, "mock store created bill");
        Ok(CreatedBill { key, file_url })
    }

    async fn update(&self, payload: UpdateBill) -> Result<BillRecord, StoreError> {
        let mut state = self.enter(Op::Update)?;
        let record = state
            .records
            .iter_mut()
            .find(|r| r.id == payload.selector)
            .ok_or_else(|| StoreError::not_found(payload.selector.clone()))?;

        let draft = payload.data;
        record.email = draft.email;
        record.bill_type = Some(draft.bill_type);
        record.name = Some(draft.name);
        record.date = draft.date;
        record.amount = draft.amount as f64;
        record.vat = Some(draft.vat);
        record.pct = Some(draft.pct);
        record.commentary = Some(draft.commentary);
        record.status = draft.status;
        if draft.file_url.is_some() {
            record.file_url = draft.file_url;
            record.file_name = draft.file_name;
        }
        Ok(record.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Attachment;
    use billed_core::{DraftFields, NewBillDraft};

    #[tokio::test]
    async fn test_list_returns_fixtures_newest_first() {
        let store = MockStore::new();
        let bills = store.bills().list().await.unwrap();
        let dates: Vec<&str> = bills.iter().map(|b| b.date.as_str()).collect();
        assert_eq!(dates, ["2004-04-04", "2003-03-03", "2002-02-02", "2001-01-01"]);
    }

    #[tokio::test]
    async fn test_scripted_failure() {
        let store = MockStore::new().fail(Op::List, StoreError::http(500));
        let err = store.bills().list().await.unwrap_err();
        assert_eq!(err.to_string(), "500 Internal Server Error");
        assert_eq!(store.call_count(Op::List), 1);
    }

    #[tokio::test]
    async fn test_one_shot_failure() {
        let store = MockStore::new().fail_once(Op::List, StoreError::http(500));
        assert!(store.bills().list().await.is_err());
        assert_eq!(store.bills().list().await.unwrap().len(), 4);
        assert_eq!(store.call_count(Op::List), 2);
    }

    #[tokio::test]
    async fn test_get_unknown_id() {
        let store = MockStore::new();
        let err = store.bills().get("invalid-id").await.unwrap_err();
        assert_eq!(err, StoreError::not_found("invalid-id"));
    }

    #[tokio::test]
    async fn test_create_then_update() {
        let store = MockStore::empty();
        let created = store
            .bills()
            .create(CreateBill {
                email: "a@a".into(),
                file: Some(Attachment::new("image.jpg", "image/jpg", b"image".to_vec())),
            })
            .await
            .unwrap();
        assert_eq!(created.key, "1234");
        assert_eq!(
            created.file_url.as_deref(),
            Some("https://localhost:3456/images/image.jpg")
        );

        let draft = NewBillDraft::from_form(
            &DraftFields {
                name: "Vol",
                date: "2022-02-15",
                amount: "348",
                ..Default::default()
            },
            "a@a",
        );
        let updated = store
            .bills()
            .update(UpdateBill {
                selector: created.key.clone(),
                data: draft,
            })
            .await
            .unwrap();
        assert_eq!(updated.amount, 348.0);
        assert_eq!(updated.file_name.as_deref(), Some("image.jpg"));
        assert_eq!(store.calls(), vec![Op::Create, Op::Update]);
    }
}
