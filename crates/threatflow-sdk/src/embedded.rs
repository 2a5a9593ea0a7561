//! EmbeddedExecutor: in-process component execution
//!
//! Runs the operation dispatcher directly, no network needed.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use threatflow::ops::{Component, Dispatcher, ExecuteRequest};
use threatflow::{ConfigError, EngineConfig};

use crate::client::ExecutorClient;
use crate::error::ExecutorResult;
use crate::models::ServerStatus;

/// In-process executor wrapping a [`Dispatcher`].
///
/// Ideal for tests, the CLI's offline mode and embedded applications.
#[derive(Clone, Default)]
pub struct EmbeddedExecutor {
    dispatcher: Arc<Dispatcher>,
}

impl EmbeddedExecutor {
    /// Create an executor with the default configuration and built-in rules
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an executor from a configuration, loading its extra catalog
    pub fn with_config(config: EngineConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            dispatcher: Arc::new(Dispatcher::new(config)?),
        })
    }

    /// Wrap an existing dispatcher
    pub fn with_dispatcher(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }
}

#[async_trait]
impl ExecutorClient for EmbeddedExecutor {
    async fn execute(&self, component: &str, otm: Option<Value>, op: Value) -> ExecutorResult<Value> {
        let request = ExecuteRequest::new(otm, op);
        Ok(self.dispatcher.execute(component, &request)?)
    }

    async fn status(&self) -> ExecutorResult<ServerStatus> {
        Ok(ServerStatus {
            status: "healthy".to_string(),
            version: threatflow::VERSION.to_string(),
            components: Component::ALL.iter().map(|c| c.as_str().to_string()).collect(),
            rules: self.dispatcher.catalog().len(),
        })
    }
}
