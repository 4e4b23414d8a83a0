//! Session lookup over a browser-style key-value storage.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use thiserror::Error;

/// Storage key holding the JSON-encoded [`Session`]
pub const USER_KEY: &str = "user";
/// Storage key holding the bearer token for the remote store
pub const JWT_KEY: &str = "jwt";

/// `localStorage`-like key-value handle.
pub trait KeyValueStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str);
    fn remove_item(&self, key: &str);
}

/// In-memory storage, the stand-in for `window.localStorage`.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-populated with a logged-in session.
    pub fn with_session(session: &Session) -> Self {
        let storage = Self::new();
        if let Ok(json) = serde_json::to_string(session) {
            storage.set_item(USER_KEY, &json);
        }
        storage
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    fn set_item(&self, key: &str, value: &str) {
        self.items
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value.to_string());
    }

    fn remove_item(&self, key: &str) {
        self.items
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(key);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserType {
    Employee,
    Admin,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "type")]
    pub user_type: UserType,
    #[serde(default)]
    pub email: String,
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("malformed session in storage: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl Session {
    pub fn employee(email: impl Into<String>) -> Self {
        Self {
            user_type: UserType::Employee,
            email: email.into(),
        }
    }

    /// Read the session stored under [`USER_KEY`]; `Ok(None)` when nobody is logged in.
    pub fn load(storage: &dyn KeyValueStorage) -> Result<Option<Session>, SessionError> {
        match storage.get_item(USER_KEY) {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }
}
