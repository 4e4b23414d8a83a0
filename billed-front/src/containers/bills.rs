//! Bills page: new-bill navigation, proof preview and the formatted list.

use billed_core::{format_date, format_status, DisplayBill, KeyValueStorage, Route, Session};
use billed_store::{Store, StoreError};
use std::rc::{Rc, Weak};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use super::{load_session, OnNavigate};
use crate::dom::{escape, Document, Element, EventKind};
use crate::views::MODAL_ID;

/// Preview width when the modal has no `width` attribute.
const DEFAULT_PREVIEW_WIDTH: &str = "50%";

struct Inner {
    document: Document,
    on_navigate: OnNavigate,
    store: Option<Arc<dyn Store>>,
    session: Option<Session>,
}

/// Controller of the employee Bills page.
#[derive(Clone)]
pub struct Bills {
    inner: Rc<Inner>,
}

impl Bills {
    /// Wire the page. Missing elements and a missing store are tolerated.
    pub fn new(
        document: Document,
        on_navigate: impl Fn(Route) + 'static,
        store: Option<Arc<dyn Store>>,
        storage: Arc<dyn KeyValueStorage>,
    ) -> Self {
        let bills = Bills {
            inner: Rc::new(Inner {
                session: load_session(storage.as_ref()),
                document,
                on_navigate: Rc::new(on_navigate),
                store,
            }),
        };

        // Listeners hold the controller weakly, see `NewBill::new`.
        if let Some(button) = bills.inner.document.by_test_id("btn-new-bill") {
            let weak = Rc::downgrade(&bills.inner);
            button.add_event_listener(EventKind::Click, move |_| {
                if let Some(this) = Bills::upgrade(&weak) {
                    this.handle_click_new_bill();
                }
                None
            });
        }

        for icon in bills.inner.document.all_by_test_id("icon-eye") {
            let weak = Rc::downgrade(&bills.inner);
            icon.add_event_listener(EventKind::Click, move |ev| {
                if let Some(this) = Bills::upgrade(&weak) {
                    this.handle_click_icon_eye(ev.target());
                }
                None
            });
        }

        bills
    }

    fn upgrade(weak: &Weak<Inner>) -> Option<Self> {
        weak.upgrade().map(|inner| Bills { inner })
    }

    pub fn session(&self) -> Option<&Session> {
        self.inner.session.as_ref()
    }

    pub fn handle_click_new_bill(&self) {
        (self.inner.on_navigate)(Route::NewBill);
    }

    /// Show the proof referenced by `icon`'s `data-bill-url` in the modal.
    pub fn handle_click_icon_eye(&self, icon: &Element) {
        let url = icon.attr("data-bill-url").unwrap_or_default();
        let Some(modal) = self.inner.document.by_id(MODAL_ID) else {
            warn!("no preview modal on the page");
            return;
        };

        let width = modal
            .attr("width")
            .and_then(|w| w.trim().parse::<f64>().ok())
            .map(|w| (w * 0.5).floor().to_string())
            .unwrap_or_else(|| DEFAULT_PREVIEW_WIDTH.to_string());

        if let Some(body) = modal.find(|e| e.has_class("modal-body")) {
            body.set_inner_html(format!(
                "<div style='text-align: center;' class=\"bill-proof-container\">\
                 <img width={width} src=\"{}\" alt=\"Bill\" /></div>",
                escape(&url)
            ));
        }
        modal.add_class("show");
        debug!(url = %url, "showing bill proof");
    }

    /// Fetch every bill with display-formatted date and status, in store order.
    ///
    /// `Ok(None)` when no store is configured. A record whose date cannot be
    /// formatted keeps its raw date. List failures are returned unchanged.
    #[instrument(name = "billed.bills.get_bills", skip(self))]
    pub async fn get_bills(&self) -> Result<Option<Vec<DisplayBill>>, StoreError> {
        let Some(store) = self.inner.store.as_ref() else {
            return Ok(None);
        };

        let records = store.bills().list().await?;
        let bills = records
            .iter()
            .map(|record| match format_date(&record.date) {
                Ok(date) => {
                    DisplayBill::from_record(record, date, format_status(record.status))
                }
                Err(e) => {
                    warn!(bill_id = %record.id, error = %e, "keeping unformatted date");
                    DisplayBill::unformatted(record)
                }
            })
            .collect::<Vec<_>>();

        debug!(count = bills.len(), "fetched bills");
        Ok(Some(bills))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fire_event;
    use billed_core::MemoryStorage;
    use std::cell::RefCell;

    fn modal_page(width: Option<&str>) -> Document {
        let doc = Document::new();
        let modal = Element::new("div")
            .with_id(MODAL_ID)
            .with_class("modal")
            .with_child(Element::new("div").with_class("modal-body"));
        if let Some(w) = width {
            modal.set_attr("width", w);
        }
        doc.set_body(vec![
            Element::new("div")
                .with_test_id("icon-eye")
                .with_attr("data-bill-url", "https://x.tld/bill.jpg"),
            modal,
        ]);
        doc
    }

    #[test]
    fn test_preview_width_is_half_the_modal() {
        let doc = modal_page(Some("801"));
        let _bills = Bills::new(doc.clone(), |_| {}, None, Arc::new(MemoryStorage::new()));
        let _ = fire_event::click(&doc.by_test_id("icon-eye").unwrap());
        let html = doc.query_class("modal-body").unwrap().inner_html();
        assert!(html.contains("width=400 "), "{html}");
    }

    #[test]
    fn test_preview_default_width() {
        let doc = modal_page(None);
        let _bills = Bills::new(doc.clone(), |_| {}, None, Arc::new(MemoryStorage::new()));
        let _ = fire_event::click(&doc.by_test_id("icon-eye").unwrap());
        assert!(doc.query_class("modal-body").unwrap().inner_html().contains("width=50%"));
    }

    #[test]
    fn test_preview_url_is_quoted_and_escaped() {
        let doc = modal_page(Some("800"));
        let icon = doc.by_test_id("icon-eye").unwrap();
        icon.set_attr("data-bill-url", "https://x.tld/a b.jpg?x=1&y=\"2\">");
        let _bills = Bills::new(doc.clone(), |_| {}, None, Arc::new(MemoryStorage::new()));
        let _ = fire_event::click(&icon);
        let html = doc.query_class("modal-body").unwrap().inner_html();
        assert!(
            html.contains("src=\"https://x.tld/a b.jpg?x=1&amp;y=&quot;2&quot;&gt;\""),
            "{html}"
        );
    }

    #[test]
    fn test_listeners_do_not_outlive_the_controller() {
        let routes = Rc::new(RefCell::new(Vec::new()));
        let r = routes.clone();
        let doc = Document::new();
        doc.set_body(vec![Element::new("button").with_test_id("btn-new-bill")]);
        let storage = Arc::new(MemoryStorage::new());
        let nav = move |route: Route| r.borrow_mut().push(route);
        let bills = Bills::new(doc.clone(), nav, None, storage);
        let button = doc.by_test_id("btn-new-bill").unwrap();

        let _ = fire_event::click(&button);
        drop(bills);
        let _ = fire_event::click(&button);

        assert_eq!(*routes.borrow(), vec![Route::NewBill]);
    }

    #[test]
    fn test_construction_on_empty_page() {
        let routes = Rc::new(RefCell::new(Vec::new()));
        let r = routes.clone();
        let storage = Arc::new(MemoryStorage::new());
        let nav = move |route: Route| r.borrow_mut().push(route);
        let bills = Bills::new(Document::new(), nav, None, storage);
        bills.handle_click_new_bill();
        assert_eq!(*routes.borrow(), vec![Route::NewBill]);
        assert!(bills.session().is_none());
    }

    #[test]
    fn test_reads_session() {
        let storage = Arc::new(MemoryStorage::with_session(&Session::employee("a@a")));
        let bills = Bills::new(Document::new(), |_| {}, None, storage);
        assert_eq!(bills.session().map(|s| s.email.as_str()), Some("a@a"));
    }
}
