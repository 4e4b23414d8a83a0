//! NewBill form: proof validation, draft assembly and submission.

use billed_core::{BillRecord, DraftFields, KeyValueStorage, NewBillDraft, Route, Session};
use billed_store::{Attachment, CreateBill, Store, StoreError, UpdateBill};
use futures_util::FutureExt;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

use super::{load_session, OnNavigate};
use crate::dom::{Document, Element, Event, EventKind, HandlerFuture};

/// Proof extensions accepted by the form, compared case-insensitively.
pub const ACCEPTED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];
pub const BAD_FORMAT_ALERT: &str = "Mauvais format";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    FileSelected,
    Submitting,
    Navigated,
}

/// Outcome of a file-input change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileCheck {
    Accepted { file_name: String },
    Rejected,
    NoFile,
}

#[derive(Debug)]
struct Form {
    state: SubmissionState,
    file: Option<Attachment>,
    file_name: Option<String>,
    // Set once the store has reserved the record.
    bill_id: Option<String>,
    file_url: Option<String>,
}

struct Inner {
    document: Document,
    on_navigate: OnNavigate,
    store: Option<Arc<dyn Store>>,
    session: Option<Session>,
    form: RefCell<Form>,
}

/// Controller of the NewBill page.
#[derive(Clone)]
pub struct NewBill {
    inner: Rc<Inner>,
}

pub fn is_accepted_extension(file: &Attachment) -> bool {
    file.extension()
        .is_some_and(|ext| ACCEPTED_EXTENSIONS.contains(&ext.as_str()))
}

impl NewBill {
    /// Wire the form. Missing elements and a missing store are tolerated.
    pub fn new(
        document: Document,
        on_navigate: impl Fn(Route) + 'static,
        store: Option<Arc<dyn Store>>,
        storage: Arc<dyn KeyValueStorage>,
    ) -> Self {
        let new_bill = NewBill {
            inner: Rc::new(Inner {
                session: load_session(storage.as_ref()),
                document,
                on_navigate: Rc::new(on_navigate),
                store,
                form: RefCell::new(Form {
                    state: SubmissionState::Idle,
                    file: None,
                    file_name: None,
                    bill_id: None,
                    file_url: None,
                }),
            }),
        };

        // Listeners hold the controller weakly: the document owns them and
        // the controller owns the document.
        if let Some(input) = new_bill.inner.document.by_test_id("file") {
            let weak = Rc::downgrade(&new_bill.inner);
            input.add_event_listener(EventKind::Change, move |ev| {
                if let Some(this) = NewBill::upgrade(&weak) {
                    this.handle_change_file(ev);
                }
                None
            });
        }

        if let Some(form) = new_bill.inner.document.by_test_id("form-new-bill") {
            let weak = Rc::downgrade(&new_bill.inner);
            form.add_event_listener(EventKind::Submit, move |ev| {
                NewBill::upgrade(&weak).map(|this| this.handle_submit(ev))
            });
        }

        new_bill
    }

    fn upgrade(weak: &Weak<Inner>) -> Option<Self> {
        weak.upgrade().map(|inner| NewBill { inner })
    }

    pub fn state(&self) -> SubmissionState {
        self.inner.form.borrow().state
    }

    /// Name of the validated proof waiting to be submitted.
    pub fn file_name(&self) -> Option<String> {
        self.inner.form.borrow().file_name.clone()
    }

    pub fn bill_id(&self) -> Option<String> {
        self.inner.form.borrow().bill_id.clone()
    }

    /// Validate the first selected file. A rejected file raises the
    /// "Mauvais format" alert and is cleared from the input.
    pub fn handle_change_file(&self, event: &Event) -> FileCheck {
        let input = event.target();
        let Some(file) = input.files().into_iter().next() else {
            return FileCheck::NoFile;
        };

        if !is_accepted_extension(&file) {
            warn!(file_name = %file.name, "rejected proof format");
            self.inner.document.window().alert(BAD_FORMAT_ALERT);
            input.set_files(Vec::new());
            input.set_value("");
            let mut form = self.inner.form.borrow_mut();
            form.file = None;
            form.file_name = None;
            // A record reserved with the replaced proof must not be reused.
            form.file_url = None;
            form.bill_id = None;
            form.state = SubmissionState::Idle;
            return FileCheck::Rejected;
        }

        let file_name = file.name.clone();
        debug!(file_name = %file_name, "proof selected");
        let mut form = self.inner.form.borrow_mut();
        form.file = Some(file);
        form.file_name = Some(file_name.clone());
        // A new proof replaces any earlier upload.
        form.file_url = None;
        form.bill_id = None;
        form.state = SubmissionState::FileSelected;
        FileCheck::Accepted { file_name }
    }

    /// Prevent the default action, read the form into a draft and return the
    /// continuation that persists it and navigates back to the Bills page.
    pub fn handle_submit(&self, event: &Event) -> HandlerFuture {
        event.prevent_default();
        let draft = self.read_draft(event.target());
        let this = self.clone();
        async move { this.submit(draft).await }.boxed_local()
    }

    fn read_draft(&self, form: &Element) -> NewBillDraft {
        let value = |test_id: &str| {
            form.find_by_test_id(test_id)
                .map(|e| e.value())
                .unwrap_or_default()
        };
        let (bill_type, name, date, amount, vat, pct, commentary) = (
            value("expense-type"),
            value("expense-name"),
            value("datepicker"),
            value("amount"),
            value("vat"),
            value("pct"),
            value("commentary"),
        );
        let fields = DraftFields {
            bill_type: &bill_type,
            name: &name,
            date: &date,
            amount: &amount,
            vat: &vat,
            pct: &pct,
            commentary: &commentary,
        };
        let email = self
            .inner
            .session
            .as_ref()
            .map(|s| s.email.clone())
            .unwrap_or_default();
        NewBillDraft::from_form(&fields, email)
    }

    async fn submit(&self, draft: NewBillDraft) {
        let Some(store) = self.inner.store.clone() else {
            warn!(?draft, "no store configured, bill not sent");
            return;
        };

        self.inner.form.borrow_mut().state = SubmissionState::Submitting;
        match self.persist(store.as_ref(), draft).await {
            Ok(bill) => {
                self.inner.form.borrow_mut().state = SubmissionState::Navigated;
                info!(bill_id = %bill.id, "bill submitted");
                (self.inner.on_navigate)(Route::Bills);
            }
            Err(e) => {
                self.inner.form.borrow_mut().state = SubmissionState::Idle;
                error!(error = %e, "bill submission failed: {e:?}");
            }
        }
    }

    #[instrument(name = "billed.new_bill.persist", skip_all)]
    async fn persist(
        &self,
        store: &dyn Store,
        mut draft: NewBillDraft,
    ) -> Result<BillRecord, StoreError> {
        let bill_id = self.inner.form.borrow().bill_id.clone();
        let bill_id = match bill_id {
            Some(id) => id,
            None => {
                let file = self.inner.form.borrow().file.clone();
                let created = store
                    .bills()
                    .create(CreateBill {
                        email: draft.email.clone(),
                        file,
                    })
                    .await?;
                let mut form = self.inner.form.borrow_mut();
                form.bill_id = Some(created.key.clone());
                form.file_url = created.file_url;
                created.key
            }
        };

        {
            let form = self.inner.form.borrow();
            draft.file_url = form.file_url.clone();
            draft.file_name = form.file_name.clone();
        }

        store
            .bills()
            .update(UpdateBill {
                selector: bill_id,
                data: draft,
            })
            .await
    }

    /// Fetch one bill. Failures are logged, then returned unchanged.
    pub async fn fetch_bill(&self, id: &str) -> Result<BillRecord, StoreError> {
        let Some(store) = self.inner.store.as_ref() else {
            let e = StoreError::Unavailable;
            error!(error = %e, bill_id = %id, "fetching bill failed: {e:?}");
            return Err(e);
        };
        store.bills().get(id).await.inspect_err(|e| {
            error!(error = %e, bill_id = %id, "fetching bill failed: {e:?}");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepted_extensions() {
        let file = |name: &str| Attachment::new(name, "", Vec::new());
        for name in ["image.jpg", "image.JPG", "photo.jpeg", "scan.PnG", "a.b.png"] {
            assert!(is_accepted_extension(&file(name)), "{name}");
        }
        for name in ["document.pdf", "image.gif", "jpg", "image.jpg.exe", ""] {
            assert!(!is_accepted_extension(&file(name)), "{name}");
        }
    }

    #[test]
    fn test_change_without_file_is_ignored() {
        let doc = Document::new();
        let input = Element::new("input").with_test_id("file");
        doc.set_body(vec![input.clone()]);
        let storage = Arc::new(billed_core::MemoryStorage::new());
        let new_bill = NewBill::new(doc, |_| {}, None, storage);
        let check = new_bill.handle_change_file(&Event::new(EventKind::Change, input));
        assert_eq!(check, FileCheck::NoFile);
        assert_eq!(new_bill.state(), SubmissionState::Idle);
    }
}
