//! reqwest implementation of the backend contract.
//!
//! No client-side timeouts or retries: a hung call is bounded by the
//! transport layer, and retry policy belongs to the caller.

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;

use super::types::{
    ArchivesEnvelope, BackupRequest, BackupStarted, CheckRequest, DashboardStats, ErrorBody,
    ExtractRequest, ExtractStarted, MountRequest, Mounted, PruneRequest, RepoCreateRequest,
    RepoCreated, RepositoriesEnvelope, Validation,
};
use super::{ApiError, BackendApi};
use crate::core::models::{Archive, Job, Repository};

/// HTTP client for the backup engine's REST API.
pub struct HttpApi {
    base_url: String,
    client: reqwest::Client,
}

impl HttpApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Turn a non-success response into the engine's verbatim error message,
    /// falling back to the HTTP status when the body carries none.
    async fn engine_error(response: Response) -> ApiError {
        let status = response.status();
        let body: ErrorBody = response.json().await.unwrap_or_default();
        match body.error.or(body.output) {
            Some(message) => ApiError::Engine(message),
            None => ApiError::Engine(format!("backend returned HTTP {status}")),
        }
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        if !response.status().is_success() {
            return Err(Self::engine_error(response).await);
        }
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn decode_ack(response: Response) -> Result<(), ApiError> {
        if !response.status().is_success() {
            return Err(Self::engine_error(response).await);
        }
        Ok(())
    }

    fn config_body(config: Option<&str>) -> serde_json::Value {
        match config {
            Some(config) => serde_json::json!({ "config": config }),
            None => serde_json::json!({}),
        }
    }
}

#[async_trait]
impl BackendApi for HttpApi {
    async fn list_configs(&self) -> Result<Vec<String>, ApiError> {
        let response = self.client.get(self.url("/api/configs")).send().await?;
        let mut names: Vec<String> = Self::decode(response).await?;
        // Directory order is not stable across calls; present sorted.
        names.sort();
        Ok(names)
    }

    async fn get_config(&self, name: &str) -> Result<String, ApiError> {
        let response = self
            .client
            .get(self.url(&format!("/api/configs/{name}")))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(name.to_string()));
        }
        if !response.status().is_success() {
            return Err(Self::engine_error(response).await);
        }
        Ok(response.text().await?)
    }

    async fn put_config(&self, name: &str, text: &str) -> Result<(), ApiError> {
        let response = self
            .client
            .put(self.url(&format!("/api/configs/{name}")))
            .header("Content-Type", "text/yaml")
            .body(text.to_string())
            .send()
            .await?;
        Self::decode_ack(response).await
    }

    async fn validate_config(&self, text: &str) -> Result<Validation, ApiError> {
        let response = self
            .client
            .post(self.url("/api/validate-config"))
            .header("Content-Type", "text/yaml")
            .body(text.to_string())
            .send()
            .await?;

        // An HTTP 200 is not evidence of validity: the verdict lives in the
        // `valid` field. Only a body without one is treated as an error.
        let status = response.status();
        let body = response.text().await?;
        if let Ok(validation) = serde_json::from_str::<Validation>(&body) {
            return Ok(validation);
        }
        if let Ok(ErrorBody {
            error: Some(message),
            ..
        }) = serde_json::from_str::<ErrorBody>(&body)
        {
            return Err(ApiError::Engine(message));
        }
        Err(ApiError::Decode(format!(
            "validation endpoint returned HTTP {status} with no verdict"
        )))
    }

    async fn dispatch_backup(&self, req: &BackupRequest) -> Result<BackupStarted, ApiError> {
        let response = self
            .client
            .post(self.url("/api/backup-create"))
            .json(req)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn dispatch_prune(&self, req: &PruneRequest) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.url("/api/prune"))
            .json(req)
            .send()
            .await?;
        Self::decode_ack(response).await
    }

    async fn dispatch_check(&self, req: &CheckRequest) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.url("/api/check"))
            .json(req)
            .send()
            .await?;
        Self::decode_ack(response).await
    }

    async fn dispatch_repo_create(
        &self,
        req: &RepoCreateRequest,
    ) -> Result<RepoCreated, ApiError> {
        let response = self
            .client
            .post(self.url("/api/repo-create"))
            .json(req)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn dispatch_extract(&self, req: &ExtractRequest) -> Result<ExtractStarted, ApiError> {
        let response = self
            .client
            .post(self.url("/api/extract"))
            .json(req)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn dispatch_mount(&self, req: &MountRequest) -> Result<Mounted, ApiError> {
        let response = self
            .client
            .post(self.url("/api/mount"))
            .json(req)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn list_jobs(&self) -> Result<Vec<Job>, ApiError> {
        let response = self.client.get(self.url("/api/jobs")).send().await?;
        Self::decode(response).await
    }

    async fn sync_repositories(&self, config: Option<&str>) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.url("/api/sync-repositories"))
            .json(&Self::config_body(config))
            .send()
            .await?;
        Self::decode_ack(response).await
    }

    async fn sync_archives(&self, config: Option<&str>) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.url("/api/sync-archives"))
            .json(&Self::config_body(config))
            .send()
            .await?;
        Self::decode_ack(response).await
    }

    async fn dashboard_stats(&self) -> Result<DashboardStats, ApiError> {
        let response = self
            .client
            .get(self.url("/api/stats/dashboard"))
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn list_archives(&self, limit: u32) -> Result<Vec<Archive>, ApiError> {
        let response = self
            .client
            .get(self.url(&format!("/api/archives?limit={limit}")))
            .send()
            .await?;
        let envelope: ArchivesEnvelope = Self::decode(response).await?;
        Ok(envelope.archives)
    }

    async fn list_repositories(&self) -> Result<Vec<Repository>, ApiError> {
        let response = self
            .client
            .get(self.url("/api/repositories"))
            .send()
            .await?;
        let envelope: RepositoriesEnvelope = Self::decode(response).await?;
        Ok(envelope.repositories)
    }
}
