//! billed-store: the remote bill store ports, an in-memory mock and the HTTP binding

pub mod api;
pub mod error;
pub mod fixtures;
pub mod http;
pub mod mock;

pub use api::{Attachment, BillsApi, CreateBill, CreatedBill, Store, UpdateBill};
pub use error::StoreError;
pub use http::{ApiStore, DEFAULT_BASE_URL};
pub use mock::{MockStore, Op};
