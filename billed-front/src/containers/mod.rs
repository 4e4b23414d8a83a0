//! Page controllers. Each one wires its listeners at construction and keeps
//! the injected document, navigation callback, store and storage handles.

pub mod bills;
pub mod new_bill;

pub use bills::Bills;
pub use new_bill::{FileCheck, NewBill, SubmissionState};

use billed_core::{KeyValueStorage, Route, Session};
use std::rc::Rc;
use tracing::warn;

/// Navigation callback, resolved to a path by the router.
pub type OnNavigate = Rc<dyn Fn(Route)>;

/// Session of the logged-in user; a malformed entry counts as logged out.
fn load_session(storage: &dyn KeyValueStorage) -> Option<Session> {
    match Session::load(storage) {
        Ok(session) => session,
        Err(e) => {
            warn!(error = %e, "ignoring stored session");
            None
        }
    }
}
