//! ExecutorClient trait: the unified interface for embedded and remote modes

use crate::error::ExecutorResult;
use crate::models::{MethodsResponse, PathsResponse, RowsResponse, ScoredPathsResponse, ServerStatus, YamlResponse};
use async_trait::async_trait;
use serde_json::{json, Value};
use threatflow::tara::TaraRow;
use threatflow::{AnalyzeOptions, AttackMethod, AttackPath, OtmDocument, ScoredPath, SuggestOptions};

/// Unified executor interface.
///
/// Implemented by:
/// - `EmbeddedExecutor`: in-process, no network
/// - `RemoteExecutor`: `POST {base}/components/{id}/execute` on a running server
///
/// Given the same document and op both return the same result.
#[async_trait]
pub trait ExecutorClient: Send + Sync {
    /// Run a named component with an `{otm, op}` payload
    async fn execute(&self, component: &str, otm: Option<Value>, op: Value) -> ExecutorResult<Value>;

    /// Get executor status
    async fn status(&self) -> ExecutorResult<ServerStatus>;

    async fn attack_paths(&self, otm: &OtmDocument, options: &AnalyzeOptions) -> ExecutorResult<Vec<AttackPath>> {
        let result = self
            .execute("attack-paths", Some(serde_json::to_value(otm)?), serde_json::to_value(options)?)
            .await?;
        Ok(serde_json::from_value::<PathsResponse>(result)?.paths)
    }

    async fn scored_attack_paths(
        &self,
        otm: &OtmDocument,
        options: &AnalyzeOptions,
    ) -> ExecutorResult<Vec<ScoredPath>> {
        let mut op = serde_json::to_value(options)?;
        op["scored"] = json!(true);
        let result = self.execute("attack-paths", Some(serde_json::to_value(otm)?), op).await?;
        Ok(serde_json::from_value::<ScoredPathsResponse>(result)?.paths)
    }

    async fn attack_methods(&self, otm: &OtmDocument, options: &SuggestOptions) -> ExecutorResult<Vec<AttackMethod>> {
        let result = self
            .execute("attack-methods", Some(serde_json::to_value(otm)?), serde_json::to_value(options)?)
            .await?;
        Ok(serde_json::from_value::<MethodsResponse>(result)?.methods)
    }

    async fn threagile_yaml(&self, otm: &OtmDocument, date: Option<&str>) -> ExecutorResult<String> {
        let op = match date {
            Some(date) => json!({ "date": date }),
            None => json!({}),
        };
        let result = self.execute("threagile-export", Some(serde_json::to_value(otm)?), op).await?;
        Ok(serde_json::from_value::<YamlResponse>(result)?.yaml)
    }

    async fn derive_tara(&self, rows: &[TaraRow]) -> ExecutorResult<Vec<TaraRow>> {
        let result = self.execute("tara-derive", None, json!({ "rows": rows })).await?;
        Ok(serde_json::from_value::<RowsResponse>(result)?.rows)
    }

    /// Ping the executor
    async fn ping(&self) -> ExecutorResult<String> {
        let status = self.status().await?;
        Ok(if status.status == "healthy" {
            "PONG".to_string()
        } else {
            status.status
        })
    }
}
