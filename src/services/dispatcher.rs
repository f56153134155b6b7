use crate::constants::limits::MAX_ERROR_TEXT_BYTES;
use crate::constants::network::ACCEPT;
use crate::errors::ToolError;
use crate::services::config::ConfigService;
use crate::services::logger::Logger;
use crate::utils::text::truncate_with_ellipsis;
use async_trait::async_trait;
use reqwest::header::{ACCEPT as ACCEPT_HEADER, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

pub use reqwest::Method;

/// Decoded body of a response.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(Value),
    Text(String),
}

impl Payload {
    /// `message` of a JSON object, or the whole text body.
    pub fn message(&self) -> Option<&str> {
        match self {
            Payload::Json(value) => value.get("message").and_then(Value::as_str),
            Payload::Text(text) => Some(text),
        }
    }

    pub fn raw(&self) -> Option<&str> {
        match self {
            Payload::Json(value) => value.get("raw").and_then(Value::as_str),
            Payload::Text(text) => Some(text),
        }
    }

    /// Non-empty string at a JSON pointer such as `/preview/url`.
    pub fn get_str(&self, pointer: &str) -> Option<&str> {
        match self {
            Payload::Json(value) => value
                .pointer(pointer)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty()),
            Payload::Text(_) => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Payload::Json(value) => value.clone(),
            Payload::Text(text) => serde_json::json!({ "message": text, "raw": text }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiFailure {
    #[error("Request aborted: timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },
    #[error("{0}")]
    Transport(String),
    #[error("Malformed JSON response: {0}")]
    Decode(String),
    #[error("{message}")]
    Upstream { status: u16, message: String },
}

impl ApiFailure {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiFailure::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type ApiResult = Result<Payload, ApiFailure>;

#[async_trait]
pub trait Dispatcher: Send + Sync {
    async fn request(&self, method: Method, path: &str, body: Option<Value>) -> ApiResult;

    async fn get(&self, path: &str) -> ApiResult {
        self.request(Method::GET, path, None).await
    }

    async fn post(&self, path: &str, body: Option<Value>) -> ApiResult {
        self.request(Method::POST, path, body).await
    }

    async fn put(&self, path: &str, body: Option<Value>) -> ApiResult {
        self.request(Method::PUT, path, body).await
    }

    async fn delete(&self, path: &str) -> ApiResult {
        self.request(Method::DELETE, path, None).await
    }
}

pub struct HttpDispatcher {
    logger: Logger,
    config: Arc<ConfigService>,
    client: Client,
}

impl HttpDispatcher {
    pub fn new(logger: Logger, config: Arc<ConfigService>) -> Result<Self, ToolError> {
        let client = Client::builder().build().map_err(|err| {
            ToolError::internal(format!("Failed to build HTTP client: {}", err))
        })?;
        Ok(Self {
            logger: logger.child("dispatcher"),
            config,
            client,
        })
    }

    async fn exchange(
        &self,
        method: Method,
        url: &str,
        authorization: Option<String>,
        body: Option<Value>,
    ) -> ApiResult {
        let mut req = self
            .client
            .request(method, url)
            .header(ACCEPT_HEADER, ACCEPT);
        if let Some(authorization) = authorization {
            req = req.header(AUTHORIZATION, authorization);
        }
        // `json` also sets `Content-Type: application/json`; bodiless requests carry none.
        if let Some(body) = body {
            req = req.json(&body);
        }

        let response = req.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_lowercase();
        let text = response.text().await.map_err(map_reqwest_error)?;
        decode_response(status, &content_type, text)
    }
}

#[async_trait]
impl Dispatcher for HttpDispatcher {
    async fn request(&self, method: Method, path: &str, body: Option<Value>) -> ApiResult {
        let config = self.config.effective();
        let url = format!("{}{}", config.base_url, path);
        let timeout_ms = config.timeout_ms;
        self.logger.debug(
            "Sending admin API request",
            Some(&serde_json::json!({
                "method": method.as_str(),
                "url": url,
                "body": body,
            })),
        );

        let exchange = self.exchange(method.clone(), &url, config.authorization(), body);
        let result = match tokio::time::timeout(Duration::from_millis(timeout_ms), exchange).await
        {
            Ok(result) => result,
            Err(_) => Err(ApiFailure::Timeout { timeout_ms }),
        };

        match &result {
            Ok(_) => self.logger.debug(
                "Admin API request succeeded",
                Some(&serde_json::json!({ "method": method.as_str(), "url": url })),
            ),
            Err(failure) => self.logger.error(
                "Admin API request failed",
                Some(&serde_json::json!({
                    "method": method.as_str(),
                    "url": url,
                    "status": failure.status(),
                    "error": failure.to_string(),
                })),
            ),
        }
        result
    }
}

/// Classifies one response. JSON content types are parsed, anything else
/// is kept as text.
pub(crate) fn decode_response(status: StatusCode, content_type: &str, body: String) -> ApiResult {
    let payload = if content_type.contains("json") {
        match serde_json::from_str::<Value>(&body) {
            Ok(value) => Payload::Json(value),
            Err(err) if status.is_success() => return Err(ApiFailure::Decode(err.to_string())),
            Err(_) => Payload::Text(body),
        }
    } else {
        Payload::Text(body)
    };

    if status.is_success() {
        return Ok(payload);
    }
    Err(ApiFailure::Upstream {
        status: status.as_u16(),
        message: upstream_message(status, &payload),
    })
}

fn upstream_message(status: StatusCode, payload: &Payload) -> String {
    non_empty(payload.message())
        .or_else(|| non_empty(payload.raw()))
        .map(|m| truncate_with_ellipsis(m, MAX_ERROR_TEXT_BYTES))
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}

fn non_empty(text: Option<&str>) -> Option<&str> {
    text.map(str::trim).filter(|m| !m.is_empty())
}

fn map_reqwest_error(err: reqwest::Error) -> ApiFailure {
    let mut description = err.to_string();
    let mut source = std::error::Error::source(&err);
    while let Some(cause) = source {
        description.push_str(": ");
        description.push_str(&cause.to_string());
        source = cause.source();
    }
    ApiFailure::Transport(description)
}
