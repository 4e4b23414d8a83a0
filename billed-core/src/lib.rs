//! billed-core: bill model, display formatting, routes and session storage

pub mod bill;
pub mod format;
pub mod routes;
pub mod session;

pub use bill::{
    BillRecord, BillStatus, DisplayBill, DraftFields, NewBillDraft, DEFAULT_PCT, EXPENSE_TYPES,
};
pub use format::{format_date, format_status, parse_bill_date, FormatError};
pub use routes::Route;
pub use session::{
    KeyValueStorage, MemoryStorage, Session, SessionError, UserType, JWT_KEY, USER_KEY,
};
