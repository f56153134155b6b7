pub mod config;
pub mod credentials;
pub mod dispatcher;
pub mod logger;
pub mod tool_executor;
pub mod validation;
