//! Config store client: named configuration documents, stored by the engine.
//!
//! Stateless request/response; saves are last-write-wins with no conflict
//! detection (documented limitation, not coordinated here).

use std::sync::Arc;

use crate::api::types::Validation;
use crate::api::{ApiError, BackendApi};

#[derive(Clone)]
pub struct ConfigStore {
    api: Arc<dyn BackendApi>,
}

impl ConfigStore {
    pub fn new(api: Arc<dyn BackendApi>) -> Self {
        Self { api }
    }

    /// Known configuration document names, in a stable order.
    pub async fn list(&self) -> Result<Vec<String>, ApiError> {
        self.api.list_configs().await
    }

    /// Raw text of a document; `ApiError::NotFound` when it does not exist.
    pub async fn get(&self, name: &str) -> Result<String, ApiError> {
        self.api.get_config(name).await
    }

    /// Persist raw text verbatim. On transport failure the caller fails
    /// without any partial apply.
    pub async fn put(&self, name: &str, text: &str) -> Result<(), ApiError> {
        self.api.put_config(name, text).await
    }

    /// Pure validity check, no side effect. The verdict is the returned
    /// `valid` field; transport-level success proves nothing.
    pub async fn validate(&self, text: &str) -> Result<Validation, ApiError> {
        self.api.validate_config(text).await
    }
}
