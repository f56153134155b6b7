use crate::errors::ToolError;
use crate::managers;
use crate::mcp::catalog::catalog_tool_names;
use crate::services::config::ConfigService;
use crate::services::dispatcher::{Dispatcher, HttpDispatcher};
use crate::services::logger::Logger;
use crate::services::tool_executor::{ToolExecutor, ToolHandler};
use crate::services::validation::Validation;
use std::collections::HashMap;
use std::sync::Arc;

pub struct App {
    pub logger: Logger,
    pub config: Arc<ConfigService>,
    pub tool_executor: Arc<ToolExecutor>,
}

impl App {
    fn validate_tool_wiring(handlers: &HashMap<String, Arc<dyn ToolHandler>>) -> Result<(), ToolError> {
        let catalog = catalog_tool_names();
        let mut missing: Vec<&str> = catalog
            .iter()
            .copied()
            .filter(|name| !handlers.contains_key(*name))
            .collect();
        let mut uncatalogued: Vec<&str> = handlers
            .keys()
            .map(String::as_str)
            .filter(|name| !catalog.contains(name))
            .collect();
        if missing.is_empty() && uncatalogued.is_empty() {
            return Ok(());
        }
        missing.sort_unstable();
        uncatalogued.sort_unstable();
        Err(ToolError::internal("Tool wiring is incomplete")
            .with_hint("Every tool in tool_catalog.json needs exactly one handler.")
            .with_details(serde_json::json!({
                "missing_tools": missing,
                "uncatalogued_tools": uncatalogued,
            })))
    }

    pub fn initialize(logger: Logger, config: Arc<ConfigService>) -> Result<Self, ToolError> {
        let dispatcher: Arc<dyn Dispatcher> =
            Arc::new(HttpDispatcher::new(logger.clone(), config.clone())?);
        Self::with_dispatcher(logger, config, dispatcher)
    }

    /// Wires the five content operations around `dispatcher`.
    pub fn with_dispatcher(
        logger: Logger,
        config: Arc<ConfigService>,
        dispatcher: Arc<dyn Dispatcher>,
    ) -> Result<Self, ToolError> {
        let validation = Validation::new();

        let mut handlers: HashMap<String, Arc<dyn ToolHandler>> = HashMap::new();
        handlers.insert(
            managers::publish::TOOL_NAME.to_string(),
            Arc::new(managers::publish::PublishManager::new(
                logger.clone(),
                validation.clone(),
                dispatcher.clone(),
            )),
        );
        handlers.insert(
            managers::preview::TOOL_NAME.to_string(),
            Arc::new(managers::preview::PreviewManager::new(
                logger.clone(),
                validation.clone(),
                dispatcher.clone(),
            )),
        );
        handlers.insert(
            managers::cache::TOOL_NAME.to_string(),
            Arc::new(managers::cache::CacheManager::new(
                logger.clone(),
                validation.clone(),
                dispatcher.clone(),
            )),
        );
        handlers.insert(
            managers::sitemap::TOOL_NAME.to_string(),
            Arc::new(managers::sitemap::SitemapManager::new(
                logger.clone(),
                validation.clone(),
                dispatcher.clone(),
            )),
        );
        handlers.insert(
            managers::snapshot::TOOL_NAME.to_string(),
            Arc::new(managers::snapshot::SnapshotManager::new(
                logger.clone(),
                validation,
                dispatcher,
            )),
        );

        Self::validate_tool_wiring(&handlers)?;

        let tool_executor = Arc::new(ToolExecutor::new(logger.clone(), handlers));
        Ok(Self {
            logger,
            config,
            tool_executor,
        })
    }
}
