use crate::constants::content::LIVE_DOMAIN;
use crate::errors::ToolError;
use crate::services::dispatcher::{Dispatcher, Payload};
use crate::services::logger::Logger;
use crate::services::tool_executor::{ToolHandler, ToolOutput};
use crate::services::validation::{PublishRequest, Validation};
use crate::utils::text::strip_leading_slash;
use serde_json::Value;
use std::sync::Arc;

pub const TOOL_NAME: &str = "publish_content";

#[derive(Clone)]
pub struct PublishManager {
    logger: Logger,
    validation: Validation,
    dispatcher: Arc<dyn Dispatcher>,
}

/// Path and optional body of the live-publish call.
pub fn endpoint(request: &PublishRequest) -> (String, Option<Value>) {
    let scope = request.target.scope();
    if request.bulk {
        (
            format!("/live/{}/*", scope),
            Some(serde_json::json!({ "paths": [request.path] })),
        )
    } else {
        (format!("/live/{}/{}", scope, request.path), None)
    }
}

fn live_url(request: &PublishRequest, payload: &Payload) -> String {
    payload
        .get_str("/live/url")
        .or_else(|| payload.get_str("/url"))
        .map(str::to_string)
        .unwrap_or_else(|| {
            format!(
                "{}/{}",
                request.target.host_url(LIVE_DOMAIN),
                strip_leading_slash(&request.path)
            )
        })
}

impl PublishManager {
    pub fn new(logger: Logger, validation: Validation, dispatcher: Arc<dyn Dispatcher>) -> Self {
        Self {
            logger: logger.child("publish"),
            validation,
            dispatcher,
        }
    }

    pub async fn handle_action(&self, args: Value) -> Result<ToolOutput, ToolError> {
        let request = self.validation.publish_request(&args)?;
        self.logger.info(
            "Publishing content",
            Some(&serde_json::to_value(&request).unwrap_or_default()),
        );

        let (path, body) = endpoint(&request);
        let target = format!(
            "{}/{}",
            request.target.scope(),
            strip_leading_slash(&request.path)
        );
        match self.dispatcher.post(&path, body).await {
            Ok(payload) => {
                let url = live_url(&request, &payload);
                self.logger.info(
                    "Content published",
                    Some(&serde_json::json!({ "target": target, "url": url })),
                );
                let mut text = format!("Successfully published content: {}\nURL: {}", target, url);
                if request.bulk {
                    text.push_str("\nMode: bulk");
                }
                if request.force {
                    text.push_str("\nForce update: yes");
                }
                Ok(ToolOutput::success(text))
            }
            Err(failure) => {
                self.logger.error(
                    "Failed to publish content",
                    Some(&serde_json::json!({ "target": target, "error": failure.to_string() })),
                );
                Ok(ToolOutput::failure(format!(
                    "Error publishing content: {}",
                    failure
                )))
            }
        }
    }
}

#[async_trait::async_trait]
impl ToolHandler for PublishManager {
    async fn handle(&self, args: Value) -> Result<ToolOutput, ToolError> {
        self.handle_action(args).await
    }
}
