use crate::errors::ToolError;
use crate::services::dispatcher::Dispatcher;
use crate::services::logger::Logger;
use crate::services::tool_executor::{ToolHandler, ToolOutput};
use crate::services::validation::{CacheRequest, Validation};
use crate::utils::text::strip_leading_slash;
use serde_json::Value;
use std::sync::Arc;

pub const TOOL_NAME: &str = "invalidate_cache";

#[derive(Clone)]
pub struct CacheManager {
    logger: Logger,
    validation: Validation,
    dispatcher: Arc<dyn Dispatcher>,
}

pub fn endpoint(request: &CacheRequest) -> String {
    format!(
        "/cache/{}/{}",
        request.target.scope(),
        strip_leading_slash(&request.path)
    )
}

impl CacheManager {
    pub fn new(logger: Logger, validation: Validation, dispatcher: Arc<dyn Dispatcher>) -> Self {
        Self {
            logger: logger.child("cache"),
            validation,
            dispatcher,
        }
    }

    pub async fn handle_action(&self, args: Value) -> Result<ToolOutput, ToolError> {
        let request = self.validation.cache_request(&args)?;
        let meta = serde_json::to_value(&request).unwrap_or_default();
        self.logger.info("Invalidating cache", Some(&meta));

        match self.dispatcher.post(&endpoint(&request), None).await {
            Ok(_) => {
                self.logger.info("Cache invalidated", Some(&meta));
                Ok(ToolOutput::success(format!(
                    "Successfully invalidated cache for {}/{}",
                    request.target.scope(),
                    strip_leading_slash(&request.path)
                )))
            }
            Err(failure) => {
                self.logger.error(
                    "Failed to invalidate cache",
                    Some(&serde_json::json!({ "request": meta, "error": failure.to_string() })),
                );
                Ok(ToolOutput::failure(format!(
                    "Error invalidating cache: {}",
                    failure
                )))
            }
        }
    }
}

#[async_trait::async_trait]
impl ToolHandler for CacheManager {
    async fn handle(&self, args: Value) -> Result<ToolOutput, ToolError> {
        self.handle_action(args).await
    }
}
