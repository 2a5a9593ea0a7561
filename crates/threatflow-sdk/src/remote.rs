//! RemoteExecutor: network client for a running executor server
//!
//! Posts `{otm, op}` to `{base}/components/{id}/execute`.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use threatflow::ExecuteRequest;

use crate::client::ExecutorClient;
use crate::error::{ExecutorError, ExecutorResult};
use crate::models::ServerStatus;

/// Network executor that talks to a running Threatflow server.
///
/// Failures are reported once; the caller decides whether to retry.
pub struct RemoteExecutor {
    http_base_url: String,
    http_client: Client,
}

impl RemoteExecutor {
    /// Create a new RemoteExecutor for the given HTTP base URL.
    ///
    /// # Example
    /// ```no_run
    /// # use threatflow_sdk::RemoteExecutor;
    /// let client = RemoteExecutor::new("http://localhost:8090");
    /// ```
    pub fn new(http_base_url: &str) -> Self {
        Self {
            http_base_url: http_base_url.trim_end_matches('/').to_string(),
            http_client: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.http_base_url
    }

    async fn read_json<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> ExecutorResult<T> {
        let status = response.status();
        if status.is_success() {
            Ok(response.json().await?)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ExecutorError::Remote {
                status: status.as_u16(),
                body,
            })
        }
    }
}

#[async_trait]
impl ExecutorClient for RemoteExecutor {
    async fn execute(&self, component: &str, otm: Option<Value>, op: Value) -> ExecutorResult<Value> {
        let url = format!("{}/components/{}/execute", self.http_base_url, component);
        let body = ExecuteRequest::new(otm, op);

        let response = self.http_client.post(&url).json(&body).send().await?;
        Self::read_json(response).await
    }

    async fn status(&self) -> ExecutorResult<ServerStatus> {
        let url = format!("{}/api/status", self.http_base_url);
        let response = self.http_client.get(&url).send().await?;
        Self::read_json(response).await
    }
}
