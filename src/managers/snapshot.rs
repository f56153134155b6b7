use crate::constants::content::SNAPSHOT_REF;
use crate::errors::ToolError;
use crate::services::dispatcher::Dispatcher;
use crate::services::logger::Logger;
use crate::services::tool_executor::{ToolHandler, ToolOutput};
use crate::services::validation::{SnapshotRequest, Validation};
use serde_json::{Map, Value};
use std::sync::Arc;

pub const TOOL_NAME: &str = "create_snapshot";

#[derive(Clone)]
pub struct SnapshotManager {
    logger: Logger,
    validation: Validation,
    dispatcher: Arc<dyn Dispatcher>,
}

/// Snapshots always live on the `main` ref; the body only carries the
/// optional fields that were supplied.
pub fn endpoint(request: &SnapshotRequest) -> (String, Value) {
    let path = format!(
        "/snapshot/{}/{}/{}/{}",
        request.org, request.site, SNAPSHOT_REF, request.name
    );
    let mut body = Map::new();
    if let Some(description) = &request.description {
        body.insert(
            "description".to_string(),
            Value::String(description.clone()),
        );
    }
    if let Some(paths) = &request.paths {
        body.insert("paths".to_string(), serde_json::json!(paths));
    }
    (path, Value::Object(body))
}

fn render_success(request: &SnapshotRequest, snapshot_id: &str) -> String {
    let mut lines = vec![
        "Snapshot created successfully:".to_string(),
        format!("Name: {}", request.name),
        format!("ID: {}", snapshot_id),
    ];
    if let Some(description) = &request.description {
        lines.push(format!("Description: {}", description));
    }
    match &request.paths {
        Some(paths) if !paths.is_empty() => lines.push(format!("Paths: {}", paths.join(", "))),
        _ => lines.push("All content included".to_string()),
    }
    lines.join("\n")
}

impl SnapshotManager {
    pub fn new(logger: Logger, validation: Validation, dispatcher: Arc<dyn Dispatcher>) -> Self {
        Self {
            logger: logger.child("snapshot"),
            validation,
            dispatcher,
        }
    }

    pub async fn handle_action(&self, args: Value) -> Result<ToolOutput, ToolError> {
        let request = self.validation.snapshot_request(&args)?;
        self.logger.info(
            "Creating snapshot",
            Some(&serde_json::to_value(&request).unwrap_or_default()),
        );

        let (path, body) = endpoint(&request);
        match self.dispatcher.post(&path, Some(body)).await {
            Ok(payload) => {
                let snapshot_id = payload
                    .get_str("/id")
                    .unwrap_or(request.name.as_str())
                    .to_string();
                self.logger.info(
                    "Snapshot created",
                    Some(&serde_json::json!({ "name": request.name, "id": snapshot_id })),
                );
                Ok(ToolOutput::success(render_success(&request, &snapshot_id)))
            }
            Err(failure) => {
                self.logger.error(
                    "Failed to create snapshot",
                    Some(&serde_json::json!({ "name": request.name, "error": failure.to_string() })),
                );
                Ok(ToolOutput::failure(format!(
                    "Error creating snapshot: {}",
                    failure
                )))
            }
        }
    }
}

#[async_trait::async_trait]
impl ToolHandler for SnapshotManager {
    async fn handle(&self, args: Value) -> Result<ToolOutput, ToolError> {
        self.handle_action(args).await
    }
}
