//! Ports the containers consume: `store.bills()` and its CRUD calls.

use async_trait::async_trait;
use billed_core::{BillRecord, NewBillDraft};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// A file chosen in the NewBill form, ready to upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Attachment {
    pub fn new(
        name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Lowercased extension after the last dot, if any.
    pub fn extension(&self) -> Option<String> {
        self.name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
    }
}

/// Payload of `bills().create(..)`: reserves a record and uploads its file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateBill {
    pub email: String,
    pub file: Option<Attachment>,
}

/// Reply of `bills().create(..)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedBill {
    pub key: String,
    #[serde(default)]
    pub file_url: Option<String>,
}

/// Payload of `bills().update(..)`: `selector` is the record key.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateBill {
    pub selector: String,
    pub data: NewBillDraft,
}

/// Remote CRUD over bill records.
#[async_trait]
pub trait BillsApi: Send + Sync {
    async fn list(&self) -> Result<Vec<BillRecord>, StoreError>;
    async fn get(&self, id: &str) -> Result<BillRecord, StoreError>;
    async fn create(&self, payload: CreateBill) -> Result<CreatedBill, StoreError>;
    async fn update(&self, payload: UpdateBill) -> Result<BillRecord, StoreError>;
}

/// Remote object store; only the bills collection is consumed here.
pub trait Store: Send + Sync {
    fn bills(&self) -> &dyn BillsApi;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attachment_extension() {
        let ext = |name: &str| Attachment::new(name, "", Vec::new()).extension();
        assert_eq!(ext("image.JPG").as_deref(), Some("jpg"));
        assert_eq!(ext("archive.tar.gz").as_deref(), Some("gz"));
        assert_eq!(ext("noext"), None);
        assert_eq!(ext("trailing."), None);
    }

    #[test]
    fn test_created_bill_from_json() {
        let json = r#"{"fileUrl":"https://localhost:3456/images/test.jpg","key":"1234"}"#;
        let created: CreatedBill = serde_json::from_str(json).unwrap();
        assert_eq!(created.key, "1234");
        assert_eq!(created.file_url.as_deref(), Some("https://localhost:3456/images/test.jpg"));
    }
}
