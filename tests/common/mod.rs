#![allow(dead_code)]

use aem_admin::app::App;
use aem_admin::services::config::ConfigService;
use aem_admin::services::dispatcher::{ApiFailure, ApiResult, Dispatcher, Method, Payload};
use aem_admin::services::logger::{LogLevel, Logger};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub fn quiet_logger() -> Logger {
    Logger::with_level("test", LogLevel::Error)
}

pub fn config_with(vars: &[(&str, &str)]) -> Arc<ConfigService> {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Arc::new(ConfigService::from_lookup(quiet_logger(), move |key| {
        map.get(key).cloned()
    }))
}

pub fn authenticated_config(base_url: &str) -> Arc<ConfigService> {
    config_with(&[("AEM_BASE_URL", base_url), ("AEM_API_KEY", "test-key")])
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

/// Records every call and answers each one with the same reply.
pub struct StubDispatcher {
    calls: Mutex<Vec<RecordedCall>>,
    reply: ApiResult,
}

impl StubDispatcher {
    pub fn replying(reply: ApiResult) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            reply,
        })
    }

    pub fn ok_json(value: Value) -> Arc<Self> {
        Self::replying(Ok(Payload::Json(value)))
    }

    pub fn upstream_error(status: u16, message: &str) -> Arc<Self> {
        Self::replying(Err(ApiFailure::Upstream {
            status,
            message: message.to_string(),
        }))
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("calls lock").len()
    }

    pub fn only_call(&self) -> RecordedCall {
        let calls = self.calls();
        assert_eq!(calls.len(), 1, "expected exactly one dispatched call");
        calls.into_iter().next().expect("one call")
    }
}

#[async_trait::async_trait]
impl Dispatcher for StubDispatcher {
    async fn request(&self, method: Method, path: &str, body: Option<Value>) -> ApiResult {
        self.calls.lock().expect("calls lock").push(RecordedCall {
            method,
            path: path.to_string(),
            body,
        });
        self.reply.clone()
    }
}

pub fn app_with(stub: Arc<StubDispatcher>) -> App {
    App::with_dispatcher(
        quiet_logger(),
        authenticated_config("https://admin.example.test"),
        stub,
    )
    .expect("app wiring")
}
