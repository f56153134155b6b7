use crate::constants::content::PREVIEW_DOMAIN;
use crate::errors::ToolError;
use crate::services::dispatcher::{Dispatcher, Payload};
use crate::services::logger::Logger;
use crate::services::tool_executor::{ToolHandler, ToolOutput};
use crate::services::validation::{PreviewRequest, Validation};
use crate::utils::text::strip_leading_slash;
use serde_json::Value;
use std::sync::Arc;

pub const TOOL_NAME: &str = "preview_content";

#[derive(Clone)]
pub struct PreviewManager {
    logger: Logger,
    validation: Validation,
    dispatcher: Arc<dyn Dispatcher>,
}

pub fn endpoint(request: &PreviewRequest) -> String {
    format!("/preview/{}/{}", request.target.scope(), request.path)
}

fn preview_url(request: &PreviewRequest, payload: &Payload) -> String {
    payload
        .get_str("/preview/url")
        .or_else(|| payload.get_str("/url"))
        .map(str::to_string)
        .unwrap_or_else(|| {
            format!(
                "{}/{}",
                request.target.host_url(PREVIEW_DOMAIN),
                strip_leading_slash(&request.path)
            )
        })
}

impl PreviewManager {
    pub fn new(logger: Logger, validation: Validation, dispatcher: Arc<dyn Dispatcher>) -> Self {
        Self {
            logger: logger.child("preview"),
            validation,
            dispatcher,
        }
    }

    pub async fn handle_action(&self, args: Value) -> Result<ToolOutput, ToolError> {
        let request = self.validation.preview_request(&args)?;
        self.logger.info(
            "Generating content preview",
            Some(&serde_json::to_value(&request).unwrap_or_default()),
        );

        match self.dispatcher.post(&endpoint(&request), None).await {
            Ok(payload) => {
                let url = preview_url(&request, &payload);
                self.logger.info(
                    "Preview generated",
                    Some(&serde_json::json!({ "path": request.path, "url": url })),
                );
                Ok(ToolOutput::success(format!(
                    "Preview generated for path: {}\nURL: {}",
                    request.path, url
                )))
            }
            Err(failure) => {
                self.logger.error(
                    "Failed to generate preview",
                    Some(&serde_json::json!({ "path": request.path, "error": failure.to_string() })),
                );
                Ok(ToolOutput::failure(format!(
                    "Error generating preview: {}",
                    failure
                )))
            }
        }
    }
}

#[async_trait::async_trait]
impl ToolHandler for PreviewManager {
    async fn handle(&self, args: Value) -> Result<ToolOutput, ToolError> {
        self.handle_action(args).await
    }
}
