use async_trait::async_trait;
use futures::FutureExt;
use serde::Serialize;
use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use crate::errors::ToolError;
use crate::services::logger::Logger;
use crate::utils::tool_errors::unknown_tool_error;

use serde_json::Value;

/// Rendered result of one tool call. `is_error` marks an upstream or
/// transport failure reported as content rather than as a protocol error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolOutput {
    pub text: String,
    pub is_error: bool,
}

impl ToolOutput {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    pub fn failure(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }
}

#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn handle(&self, args: Value) -> Result<ToolOutput, ToolError>;
}

#[derive(Clone)]
pub struct ToolExecutor {
    logger: Logger,
    handlers: Arc<HashMap<String, Arc<dyn ToolHandler>>>,
}

impl ToolExecutor {
    pub fn new(logger: Logger, handlers: HashMap<String, Arc<dyn ToolHandler>>) -> Self {
        Self {
            logger: logger.child("executor"),
            handlers: Arc::new(handlers),
        }
    }

    pub fn tool_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn has_tool(&self, tool: &str) -> bool {
        self.handlers.contains_key(tool)
    }

    async fn dispatch(&self, tool: &str, args: Value) -> Result<ToolOutput, ToolError> {
        let Some(handler) = self.handlers.get(tool).cloned() else {
            return Err(unknown_tool_error(tool, &self.tool_names()));
        };
        match AssertUnwindSafe(handler.handle(args)).catch_unwind().await {
            Ok(result) => result,
            Err(panic) => Err(ToolError::internal(panic_message(panic.as_ref()))),
        }
    }

    /// Runs one tool. Every failure, including a panicking handler, comes
    /// back as `Tool execution failed: <message>` with its original kind.
    pub async fn execute(&self, tool: &str, args: Value) -> Result<ToolOutput, ToolError> {
        let started = Instant::now();
        match self.dispatch(tool, args).await {
            Ok(output) => {
                self.logger.debug(
                    "Tool call finished",
                    Some(&serde_json::json!({
                        "tool": tool,
                        "is_error": output.is_error,
                        "duration_ms": started.elapsed().as_millis() as u64,
                    })),
                );
                Ok(output)
            }
            Err(err) => {
                self.logger.error(
                    "Tool execution failed",
                    Some(&serde_json::json!({
                        "tool": tool,
                        "kind": err.kind,
                        "error": err.message,
                    })),
                );
                let message = format!("Tool execution failed: {}", err.message);
                Err(err.with_message(message))
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(text) = panic.downcast_ref::<&str>() {
        return (*text).to_string();
    }
    if let Some(text) = panic.downcast_ref::<String>() {
        return text.clone();
    }
    "handler panicked".to_string()
}
