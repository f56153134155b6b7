use crate::constants::content::PREVIEW_DOMAIN;
use crate::errors::ToolError;
use crate::services::dispatcher::{Dispatcher, Payload};
use crate::services::logger::Logger;
use crate::services::tool_executor::{ToolHandler, ToolOutput};
use crate::services::validation::{SitemapRequest, Validation};
use crate::utils::text::strip_leading_slash;
use serde_json::Value;
use std::sync::Arc;

pub const TOOL_NAME: &str = "generate_sitemap";

#[derive(Clone)]
pub struct SitemapManager {
    logger: Logger,
    validation: Validation,
    dispatcher: Arc<dyn Dispatcher>,
}

pub fn endpoint(request: &SitemapRequest) -> String {
    let base = format!("/sitemap/{}", request.target.scope());
    match request.path.as_deref().map(strip_leading_slash) {
        Some(path) if !path.is_empty() => format!("{}/{}", base, path),
        _ => base,
    }
}

fn sitemap_url(request: &SitemapRequest, payload: &Payload) -> String {
    payload
        .get_str("/url")
        .map(str::to_string)
        .unwrap_or_else(|| format!("{}/sitemap.xml", request.target.host_url(PREVIEW_DOMAIN)))
}

impl SitemapManager {
    pub fn new(logger: Logger, validation: Validation, dispatcher: Arc<dyn Dispatcher>) -> Self {
        Self {
            logger: logger.child("sitemap"),
            validation,
            dispatcher,
        }
    }

    pub async fn handle_action(&self, args: Value) -> Result<ToolOutput, ToolError> {
        let request = self.validation.sitemap_request(&args)?;
        let meta = serde_json::to_value(&request).unwrap_or_default();
        self.logger.info("Generating sitemap", Some(&meta));

        match self.dispatcher.post(&endpoint(&request), None).await {
            Ok(payload) => {
                let url = sitemap_url(&request, &payload);
                self.logger.info(
                    "Sitemap generated",
                    Some(&serde_json::json!({ "request": meta, "url": url })),
                );
                Ok(ToolOutput::success(format!(
                    "Sitemap generated for {}\nSitemap URL: {}",
                    request.target.scope(),
                    url
                )))
            }
            Err(failure) => {
                self.logger.error(
                    "Failed to generate sitemap",
                    Some(&serde_json::json!({ "request": meta, "error": failure.to_string() })),
                );
                Ok(ToolOutput::failure(format!(
                    "Error generating sitemap: {}",
                    failure
                )))
            }
        }
    }
}

#[async_trait::async_trait]
impl ToolHandler for SitemapManager {
    async fn handle(&self, args: Value) -> Result<ToolOutput, ToolError> {
        self.handle_action(args).await
    }
}
