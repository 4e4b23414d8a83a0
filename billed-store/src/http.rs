//! HTTP binding of the store against the Billed REST API.
//!
//! Endpoints (relative to the base URL):
//! GET bills, GET bills/{id}, POST bills (multipart: file + email), PATCH bills/{id}

use async_trait::async_trait;
use billed_core::{BillRecord, KeyValueStorage, JWT_KEY};
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, instrument};
use url::Url;

use crate::api::{BillsApi, CreateBill, CreatedBill, Store, UpdateBill};
use crate::error::StoreError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5678";

/// [`Store`] backed by the remote API. Sends `Authorization: Bearer <jwt>`
/// whenever the storage holds a token.
pub struct ApiStore {
    client: reqwest::Client,
    base: Url,
    storage: Option<Arc<dyn KeyValueStorage>>,
}

impl ApiStore {
    pub fn new(base: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            base,
            storage: None,
        }
    }

    pub fn parse(base: &str) -> Result<Self, StoreError> {
        let base = Url::parse(base)
            .map_err(|e| StoreError::Transport(format!("invalid base URL '{base}': {e}")))?;
        Ok(Self::new(base))
    }

    pub fn with_storage(mut self, storage: Arc<dyn KeyValueStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, StoreError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| {
                StoreError::Transport(format!("base URL cannot hold a path: {}", self.base))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match self.storage.as_ref().and_then(|s| s.get_item(JWT_KEY)) {
            Some(jwt) => req.bearer_auth(jwt),
            None => req,
        }
    }

    async fn send(&self, req: RequestBuilder) -> Result<Response, StoreError> {
        let resp = self.authorize(req).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(StoreError::http(status.as_u16()));
        }
        Ok(resp)
    }

    async fn json<T: DeserializeOwned>(resp: Response) -> Result<T, StoreError> {
        resp.json::<T>()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))
    }
}

impl Store for ApiStore {
    fn bills(&self) -> &dyn BillsApi {
        self
    }
}

#[async_trait]
impl BillsApi for ApiStore {
    #[instrument(name = "billed.store.http.list", skip_all, fields(base = %self.base))]
    async fn list(&self) -> Result<Vec<BillRecord>, StoreError> {
        let url = self.endpoint(&["bills"])?;
        let resp = self.send(self.client.get(url)).await?;
        let bills: Vec<BillRecord> = Self::json(resp).await?;
        debug!(count = bills.len(), "listed bills");
        Ok(bills)
    }

    #[instrument(name = "billed.store.http.get", skip(self), fields(base = %self.base))]
    async fn get(&self, id: &str) -> Result<BillRecord, StoreError> {
        let url = self.endpoint(&["bills", id])?;
        let resp = self.send(self.client.get(url)).await?;
        Self::json(resp).await
    }

    #[instrument(name = "billed.store.http.create", skip_all, fields(base = %self.base))]
    async fn create(&self, payload: CreateBill) -> Result<CreatedBill, StoreError> {
        let url = self.endpoint(&["bills"])?;
        let mut form = Form::new().text("email", payload.email);
        if let Some(file) = payload.file {
            let part = Part::bytes(file.bytes)
                .file_name(file.name)
                .mime_str(&file.content_type)
                .map_err(|e| StoreError::Transport(format!("invalid content type: {e}")))?;
            form = form.part("file", part);
        }
        let resp = self.send(self.client.post(url).multipart(form)).await?;
        let created: CreatedBill = Self::json(resp).await?;
        debug!(key = %created.key, "created bill");
        Ok(created)
    }

    #[instrument(
        name = "billed.store.http.update",
        skip_all,
        fields(base = %self.base, selector = %payload.selector)
    )]
    async fn update(&self, payload: UpdateBill) -> Result<BillRecord, StoreError> {
        let url = self.endpoint(&["bills", &payload.selector])?;
        let resp = self.send(self.client.patch(url).json(&payload.data)).await?;
        Self::json(resp).await
    }
}
