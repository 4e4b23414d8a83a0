//! Headless document: an element tree with test markers, classes, values,
//! selected files and event listeners.
//!
//! Everything here is single-threaded (`Rc`/`RefCell`), like the page it
//! stands in for.
//! A listener may hand back a future; dispatching collects those so the caller
//! decides when the continuations run (see [`crate::fire_event`]).

use billed_store::Attachment;
use futures_util::future::LocalBoxFuture;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use tracing::warn;

pub type HandlerFuture = LocalBoxFuture<'static, ()>;
pub type Listener = Rc<dyn Fn(&Event) -> Option<HandlerFuture>>;

pub const TEST_ID_ATTR: &str = "data-testid";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    Change,
    Submit,
}

/// An event being dispatched on one target.
#[derive(Clone)]
pub struct Event {
    kind: EventKind,
    target: Element,
    default_prevented: Rc<Cell<bool>>,
}

impl Event {
    pub fn new(kind: EventKind, target: Element) -> Self {
        Self {
            kind,
            target,
            default_prevented: Rc::new(Cell::new(false)),
        }
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn target(&self) -> &Element {
        &self.target
    }

    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("kind", &self.kind)
            .field("target", &self.target)
            .field("default_prevented", &self.default_prevented.get())
            .finish()
    }
}

struct Node {
    tag: String,
    attrs: RefCell<BTreeMap<String, String>>,
    classes: RefCell<Vec<String>>,
    text: RefCell<String>,
    // Set by `set_inner_html`; replaces rendered children.
    html: RefCell<Option<String>>,
    value: RefCell<String>,
    files: RefCell<Vec<Attachment>>,
    children: RefCell<Vec<Element>>,
    listeners: RefCell<Vec<(EventKind, Listener)>>,
}

/// Shared handle to one element. Clones point at the same node.
#[derive(Clone)]
pub struct Element(Rc<Node>);

impl Element {
    pub fn new(tag: &str) -> Self {
        Element(Rc::new(Node {
            tag: tag.to_string(),
            attrs: RefCell::new(BTreeMap::new()),
            classes: RefCell::new(Vec::new()),
            text: RefCell::new(String::new()),
            html: RefCell::new(None),
            value: RefCell::new(String::new()),
            files: RefCell::new(Vec::new()),
            children: RefCell::new(Vec::new()),
            listeners: RefCell::new(Vec::new()),
        }))
    }

    // -------- builders --------

    pub fn with_id(self, id: &str) -> Self {
        self.set_attr("id", id);
        self
    }

    pub fn with_test_id(self, test_id: &str) -> Self {
        self.set_attr(TEST_ID_ATTR, test_id);
        self
    }

    /// Adds every whitespace-separated class in `classes`.
    pub fn with_class(self, classes: &str) -> Self {
        for c in classes.split_whitespace() {
            self.add_class(c);
        }
        self
    }

    pub fn with_attr(self, name: &str, value: &str) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_text(self, text: &str) -> Self {
        self.set_text(text);
        self
    }

    pub fn with_value(self, value: &str) -> Self {
        self.set_value(value);
        self
    }

    pub fn with_child(self, child: Element) -> Self {
        self.append_child(child);
        self
    }

    pub fn with_children(self, children: impl IntoIterator<Item = Element>) -> Self {
        for child in children {
            self.append_child(child);
        }
        self
    }

    // -------- accessors --------

    pub fn tag(&self) -> &str {
        &self.0.tag
    }

    pub fn attr(&self, name: &str) -> Option<String> {
        self.0.attrs.borrow().get(name).cloned()
    }

    pub fn set_attr(&self, name: &str, value: &str) {
        self.0
            .attrs
            .borrow_mut()
            .insert(name.to_string(), value.to_string());
    }

    pub fn id(&self) -> Option<String> {
        self.attr("id")
    }

    pub fn test_id(&self) -> Option<String> {
        self.attr(TEST_ID_ATTR)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.0.classes.borrow().iter().any(|c| c == class)
    }

    pub fn add_class(&self, class: &str) {
        if !self.has_class(class) {
            self.0.classes.borrow_mut().push(class.to_string());
        }
    }

    pub fn remove_class(&self, class: &str) {
        self.0.classes.borrow_mut().retain(|c| c != class);
    }

    pub fn text(&self) -> String {
        self.0.text.borrow().clone()
    }

    pub fn set_text(&self, text: &str) {
        *self.0.text.borrow_mut() = text.to_string();
    }

    pub fn value(&self) -> String {
        self.0.value.borrow().clone()
    }

    pub fn set_value(&self, value: &str) {
        *self.0.value.borrow_mut() = value.to_string();
    }

    pub fn files(&self) -> Vec<Attachment> {
        self.0.files.borrow().clone()
    }

    pub fn set_files(&self, files: Vec<Attachment>) {
        *self.0.files.borrow_mut() = files;
    }

    pub fn children(&self) -> Vec<Element> {
        self.0.children.borrow().clone()
    }

    pub fn append_child(&self, child: Element) {
        self.0.children.borrow_mut().push(child);
    }

    pub fn replace_children(&self, children: Vec<Element>) {
        *self.0.html.borrow_mut() = None;
        *self.0.children.borrow_mut() = children;
    }

    /// Replace the content with raw markup. Raw markup is not queryable.
    pub fn set_inner_html(&self, html: impl Into<String>) {
        self.0.children.borrow_mut().clear();
        *self.0.html.borrow_mut() = Some(html.into());
    }

    pub fn inner_html(&self) -> String {
        if let Some(html) = self.0.html.borrow().as_ref() {
            return html.clone();
        }
        let mut out = escape(&self.text());
        for child in self.0.children.borrow().iter() {
            out.push_str(&child.outer_html());
        }
        out
    }

    pub fn outer_html(&self) -> String {
        let mut out = format!("<{}", self.tag());
        let classes = self.0.classes.borrow();
        if !classes.is_empty() {
            out.push_str(&format!(" class=\"{}\"", escape(&classes.join(" "))));
        }
        for (name, value) in self.0.attrs.borrow().iter() {
            out.push_str(&format!(" {}=\"{}\"", name, escape(value)));
        }
        out.push('>');
        out.push_str(&self.inner_html());
        out.push_str(&format!("</{}>", self.tag()));
        out
    }

    // -------- queries over this subtree, self included, document order --------

    pub fn descendants(&self) -> Vec<Element> {
        let mut out = Vec::new();
        self.collect(&mut out);
        out
    }

    fn collect(&self, out: &mut Vec<Element>) {
        out.push(self.clone());
        for child in self.0.children.borrow().iter() {
            child.collect(out);
        }
    }

    pub fn find(&self, pred: impl Fn(&Element) -> bool) -> Option<Element> {
        self.descendants().into_iter().find(|e| pred(e))
    }

    pub fn find_all(&self, pred: impl Fn(&Element) -> bool) -> Vec<Element> {
        self.descendants().into_iter().filter(|e| pred(e)).collect()
    }

    pub fn find_by_test_id(&self, test_id: &str) -> Option<Element> {
        self.find(|e| e.test_id().as_deref() == Some(test_id))
    }

    // -------- events --------

    pub fn add_event_listener(
        &self,
        kind: EventKind,
        listener: impl Fn(&Event) -> Option<HandlerFuture> + 'static,
    ) {
        self.0
            .listeners
            .borrow_mut()
            .push((kind, Rc::new(listener)));
    }

    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.0
            .listeners
            .borrow()
            .iter()
            .filter(|(k, _)| *k == kind)
            .count()
    }

    /// Run the synchronous part of every matching listener, returning the
    /// continuations they scheduled.
    pub fn dispatch(&self, event: &Event) -> Vec<HandlerFuture> {
        // Listeners may touch this element again; don't hold the borrow
        // while calling them.
        let listeners: Vec<Listener> = self
            .0
            .listeners
            .borrow()
            .iter()
            .filter(|(k, _)| *k == event.kind())
            .map(|(_, l)| l.clone())
            .collect();
        listeners.iter().filter_map(|l| l(event)).collect()
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("tag", &self.0.tag)
            .field("attrs", &self.0.attrs.borrow())
            .field("classes", &self.0.classes.borrow())
            .finish()
    }
}

/// Escape text for use in markup and quoted attribute values.
pub(crate) fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// `window` services the containers use.
pub trait Window {
    /// Blocking user alert.
    fn alert(&self, message: &str);
}

/// Window with no user in front of it: alerts are only logged.
#[derive(Debug, Default)]
pub struct HeadlessWindow;

impl Window for HeadlessWindow {
    fn alert(&self, message: &str) {
        warn!(alert = message, "window alert");
    }
}

/// Window that keeps every alert message, for assertions.
#[derive(Debug, Default)]
pub struct RecordingWindow {
    alerts: RefCell<Vec<String>>,
}

impl RecordingWindow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.alerts.borrow().clone()
    }
}

impl Window for RecordingWindow {
    fn alert(&self, message: &str) {
        self.alerts.borrow_mut().push(message.to_string());
    }
}

/// The page: a `<body>` element plus the window it lives in.
#[derive(Clone)]
pub struct Document {
    body: Element,
    window: Rc<dyn Window>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self::with_window(Rc::new(HeadlessWindow))
    }

    pub fn with_window(window: Rc<dyn Window>) -> Self {
        Self {
            body: Element::new("body"),
            window,
        }
    }

    pub fn window(&self) -> &dyn Window {
        self.window.as_ref()
    }

    pub fn body(&self) -> &Element {
        &self.body
    }

    /// `document.body.innerHTML = ...` with an element tree.
    pub fn set_body(&self, elements: Vec<Element>) {
        self.body.replace_children(elements);
    }

    pub fn by_test_id(&self, test_id: &str) -> Option<Element> {
        self.body.find_by_test_id(test_id)
    }

    pub fn all_by_test_id(&self, test_id: &str) -> Vec<Element> {
        self.body
            .find_all(|e| e.test_id().as_deref() == Some(test_id))
    }

    pub fn by_id(&self, id: &str) -> Option<Element> {
        self.body.find(|e| e.id().as_deref() == Some(id))
    }

    /// First element carrying `class` (`querySelector(".class")`).
    pub fn query_class(&self, class: &str) -> Option<Element> {
        self.body.find(|e| e.has_class(class))
    }

    /// Elements whose own text equals `text` or matches `pred` (`getAllByText`).
    pub fn all_by_text(&self, pred: impl Fn(&str) -> bool) -> Vec<Element> {
        self.body.find_all(|e| {
            let text = e.text();
            !text.is_empty() && pred(&text)
        })
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document").field("body", &self.body).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> Document {
        let doc = Document::new();
        doc.set_body(vec![
            Element::new("button")
                .with_test_id("btn-new-bill")
                .with_text("New Bill"),
            Element::new("div")
                .with_id("modaleFile")
                .with_class("modal fade")
                .with_child(Element::new("div").with_class("modal-body")),
        ]);
        doc
    }

    #[test]
    fn test_queries() {
        let doc = page();
        assert_eq!(doc.by_test_id("btn-new-bill").unwrap().text(), "New Bill");
        assert!(doc.by_id("modaleFile").unwrap().has_class("fade"));
        assert!(doc.query_class("modal-body").is_some());
        assert!(doc.by_test_id("missing").is_none());
    }

    #[test]
    fn test_inner_html_override() {
        let doc = page();
        let body = doc.query_class("modal-body").unwrap();
        body.set_inner_html("<img src=\"x.jpg\" />");
        assert_eq!(body.inner_html(), "<img src=\"x.jpg\" />");
        let modal = doc.by_id("modaleFile").unwrap();
        assert!(modal.inner_html().contains("x.jpg"));
    }

    #[test]
    fn test_outer_html_escapes() {
        let el = Element::new("td")
            .with_attr("data-bill-url", "a?b=1&c=\"2\"")
            .with_text("<b>");
        assert_eq!(
            el.outer_html(),
            "<td data-bill-url=\"a?b=1&amp;c=&quot;2&quot;\">&lt;b&gt;</td>"
        );
    }

    #[test]
    fn test_dispatch_runs_matching_listeners() {
        let hits = Rc::new(Cell::new(0));
        let button = Element::new("button");
        let h = hits.clone();
        button.add_event_listener(EventKind::Click, move |_| {
            h.set(h.get() + 1);
            None
        });
        button.add_event_listener(EventKind::Submit, |_| panic!("wrong kind"));

        let pending = button.dispatch(&Event::new(EventKind::Click, button.clone()));
        assert!(pending.is_empty());
        assert_eq!(hits.get(), 1);
        assert_eq!(button.listener_count(EventKind::Click), 1);
    }

    #[test]
    fn test_class_toggle() {
        let el = Element::new("div").with_class("modal");
        el.add_class("show");
        el.add_class("show");
        assert_eq!(el.outer_html(), "<div class=\"modal show\"></div>");
        el.remove_class("show");
        assert!(!el.has_class("show"));
    }
}
