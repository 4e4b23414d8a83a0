//! Event helpers in the spirit of `fireEvent`: dispatch synchronously, then
//! let the caller await whatever continuations the handlers scheduled.

use billed_store::Attachment;
use futures_util::future::join_all;

use crate::dom::{Element, Event, EventKind, HandlerFuture};

/// Result of a dispatch whose handler continuations have not run yet.
#[must_use = "handler continuations only run when settled"]
pub struct Dispatched {
    event: Event,
    pending: Vec<HandlerFuture>,
}

impl Dispatched {
    pub fn event(&self) -> &Event {
        &self.event
    }

    /// Number of continuations still waiting.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Drive every scheduled continuation to completion.
    pub async fn settle(self) -> Event {
        join_all(self.pending).await;
        self.event
    }
}

pub fn dispatch(target: &Element, kind: EventKind) -> Dispatched {
    let event = Event::new(kind, target.clone());
    let pending = target.dispatch(&event);
    Dispatched { event, pending }
}

pub fn click(target: &Element) -> Dispatched {
    dispatch(target, EventKind::Click)
}

pub fn submit(target: &Element) -> Dispatched {
    dispatch(target, EventKind::Submit)
}

/// Select `files` on an input, then fire `change`.
pub fn change_files(input: &Element, files: Vec<Attachment>) -> Dispatched {
    input.set_files(files);
    dispatch(input, EventKind::Change)
}

/// Type into a field (no event, like setting `.value`).
pub fn type_value(input: &Element, value: &str) {
    input.set_value(value);
}
