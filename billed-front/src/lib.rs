//! billed-front: headless document, employee views and the Bills / NewBill page controllers

pub mod containers;
pub mod dom;
pub mod fire_event;
pub mod views;

pub use containers::{Bills, FileCheck, NewBill, OnNavigate, SubmissionState};
pub use dom::{Document, Element, Event, EventKind, HeadlessWindow, RecordingWindow, Window};
