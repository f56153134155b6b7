use crate::constants::env::{BASE_URL, TIMEOUT};
use crate::constants::network::{DEFAULT_BASE_URL, TIMEOUT_API_REQUEST_MS};
use crate::errors::ToolError;
use crate::services::credentials::{authorization_value, CredentialStore, Credentials};
use crate::services::logger::Logger;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Loads `path` into the process environment without overriding variables
/// that are already set. A missing file is not an error.
pub fn load_env_file(path: &Path) -> Result<Option<PathBuf>, ToolError> {
    match dotenvy::from_path(path) {
        Ok(()) => Ok(Some(path.to_path_buf())),
        Err(err) if err.not_found() => Ok(None),
        Err(err) => Err(ToolError::configuration(format!(
            "Failed to load {}: {}",
            path.display(),
            err
        ))),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct BaseConfig {
    base_url: String,
    timeout_ms: u64,
}

/// Snapshot of the configuration as seen by one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    pub api_key: Option<String>,
    pub auth_token: Option<String>,
}

impl AdminConfig {
    pub fn authorization(&self) -> Option<String> {
        authorization_value(&Credentials {
            api_key: self.api_key.clone(),
            auth_token: self.auth_token.clone(),
        })
    }
}

pub struct ConfigService {
    logger: Logger,
    base: RwLock<BaseConfig>,
    credentials: Arc<CredentialStore>,
}

impl ConfigService {
    pub fn new(
        logger: Logger,
        base_url: Option<String>,
        timeout_ms: Option<u64>,
        credentials: Arc<CredentialStore>,
    ) -> Self {
        let logger = logger.child("config");
        let base = BaseConfig {
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout_ms: timeout_ms
                .filter(|ms| *ms > 0)
                .unwrap_or(TIMEOUT_API_REQUEST_MS),
        };
        logger.info(
            "Configuration initialized",
            Some(&serde_json::json!({
                "base_url": base.base_url,
                "timeout_ms": base.timeout_ms,
            })),
        );
        Self {
            logger,
            base: RwLock::new(base),
            credentials,
        }
    }

    pub fn from_env(logger: Logger) -> Self {
        Self::from_lookup(logger, |key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(logger: Logger, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let credentials = Arc::new(CredentialStore::from_lookup(logger.clone(), &lookup));
        let base_url = lookup(BASE_URL).filter(|value| !value.is_empty());
        let timeout_ms = lookup(TIMEOUT).and_then(|raw| match raw.trim().parse::<u64>() {
            Ok(ms) if ms > 0 => Some(ms),
            _ => {
                logger.warn(
                    "Ignoring invalid timeout, using default",
                    Some(&serde_json::json!({
                        "variable": TIMEOUT,
                        "value": raw,
                        "default_ms": TIMEOUT_API_REQUEST_MS,
                    })),
                );
                None
            }
        });
        Self::new(logger, base_url, timeout_ms, credentials)
    }

    pub fn credentials(&self) -> &Arc<CredentialStore> {
        &self.credentials
    }

    /// Base config with the current credentials merged in last.
    pub fn effective(&self) -> AdminConfig {
        let base = self
            .base
            .read()
            .unwrap_or_else(|err| err.into_inner())
            .clone();
        let credentials = self.credentials.get();
        AdminConfig {
            base_url: base.base_url,
            timeout_ms: base.timeout_ms,
            api_key: credentials.api_key,
            auth_token: credentials.auth_token,
        }
    }

    pub fn update_base_url(&self, base_url: impl Into<String>) {
        let base_url = base_url.into();
        self.base
            .write()
            .unwrap_or_else(|err| err.into_inner())
            .base_url = base_url.clone();
        self.logger.info(
            "Base URL updated",
            Some(&serde_json::json!({ "base_url": base_url })),
        );
    }

    pub fn update_timeout(&self, timeout_ms: u64) {
        if timeout_ms == 0 {
            self.logger.warn("Ignoring zero timeout", None);
            return;
        }
        self.base
            .write()
            .unwrap_or_else(|err| err.into_inner())
            .timeout_ms = timeout_ms;
        self.logger.debug(
            "Timeout updated",
            Some(&serde_json::json!({ "timeout_ms": timeout_ms })),
        );
    }

    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.effective().base_url.trim().is_empty() {
            errors.push("Base URL is required".to_string());
        }
        if !self.credentials.is_authenticated() {
            errors.push(format!(
                "Authentication credentials are required ({} or {})",
                crate::constants::env::API_KEY,
                crate::constants::env::AUTH_TOKEN
            ));
        }
        errors
    }

    pub fn ensure_valid(&self) -> Result<(), ToolError> {
        let errors = self.validate();
        if errors.is_empty() {
            return Ok(());
        }
        self.logger.error(
            "Configuration validation failed",
            Some(&serde_json::json!({ "errors": errors })),
        );
        Err(
            ToolError::configuration(format!("Configuration errors: {}", errors.join(", ")))
                .with_details(serde_json::json!({ "errors": errors })),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::logger::LogLevel;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> ConfigService {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ConfigService::from_lookup(Logger::with_level("test", LogLevel::Error), move |key| {
            map.get(key).cloned()
        })
    }

    fn scratch_env_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("aem-admin-{}-{}.env", name, std::process::id()));
        std::fs::write(&path, contents).expect("write env file");
        path
    }

    #[test]
    fn env_file_fills_unset_variables_only() {
        std::env::set_var("AEM_ADMIN_TEST_PRESET", "from-process");
        let path = scratch_env_file(
            "fill",
            "AEM_ADMIN_TEST_FROM_FILE=from-file\nAEM_ADMIN_TEST_PRESET=from-file\n",
        );
        let loaded = load_env_file(&path).expect("load");
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.as_deref(), Some(path.as_path()));
        assert_eq!(
            std::env::var("AEM_ADMIN_TEST_FROM_FILE").as_deref(),
            Ok("from-file")
        );
        assert_eq!(
            std::env::var("AEM_ADMIN_TEST_PRESET").as_deref(),
            Ok("from-process")
        );
    }

    #[test]
    fn missing_env_file_is_ignored() {
        let path = std::env::temp_dir().join("aem-admin-does-not-exist.env");
        assert_eq!(load_env_file(&path).expect("missing is fine"), None);
    }

    #[test]
    fn unparsable_env_file_is_a_configuration_error() {
        let path = scratch_env_file("broken", "AEM_ADMIN_TEST_BROKEN='unterminated\n");
        let err = load_env_file(&path).expect_err("parse failure");
        std::fs::remove_file(&path).ok();
        assert_eq!(err.kind, crate::errors::ToolErrorKind::Configuration);
        assert!(err.message.starts_with("Failed to load "));
    }

    #[test]
    fn defaults_apply_when_environment_is_empty() {
        let config = config_from(&[]).effective();
        assert_eq!(config.base_url, "https://admin.hlx.page");
        assert_eq!(config.timeout_ms, 30_000);
        assert!(config.api_key.is_none());
        assert!(config.auth_token.is_none());
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = config_from(&[
            ("AEM_BASE_URL", "http://localhost:3000"),
            ("AEM_TIMEOUT", "1500"),
            ("AEM_AUTH_TOKEN", "tok"),
        ])
        .effective();
        assert_eq!(config.base_url, "http://localhost:3000");
        assert_eq!(config.timeout_ms, 1500);
        assert_eq!(config.authorization().as_deref(), Some("token tok"));
    }

    #[test]
    fn invalid_timeout_falls_back_to_default() {
        assert_eq!(config_from(&[("AEM_TIMEOUT", "soon")]).effective().timeout_ms, 30_000);
        assert_eq!(config_from(&[("AEM_TIMEOUT", "0")]).effective().timeout_ms, 30_000);
    }

    #[test]
    fn validate_collects_every_error() {
        let config = config_from(&[]);
        config.update_base_url("");
        assert_eq!(config.validate().len(), 2);

        let only_url_missing = config_from(&[("AEM_API_KEY", "k")]);
        only_url_missing.update_base_url("");
        assert_eq!(
            only_url_missing.validate(),
            vec!["Base URL is required".to_string()]
        );

        let only_auth_missing = config_from(&[]);
        assert_eq!(
            only_auth_missing.validate(),
            vec![
                "Authentication credentials are required (AEM_API_KEY or AEM_AUTH_TOKEN)"
                    .to_string()
            ]
        );

        assert!(config_from(&[("AEM_API_KEY", "k")]).validate().is_empty());
    }

    #[test]
    fn ensure_valid_reports_configuration_error() {
        let err = config_from(&[]).ensure_valid().expect_err("must be invalid");
        assert_eq!(err.kind, crate::errors::ToolErrorKind::Configuration);
        assert!(err.message.starts_with("Configuration errors: "));
    }

    #[test]
    fn credentials_are_merged_on_every_read() {
        let config = config_from(&[("AEM_API_KEY", "k1")]);
        assert_eq!(config.effective().api_key.as_deref(), Some("k1"));
        config.credentials().set(Credentials {
            api_key: Some("k2".to_string()),
            auth_token: None,
        });
        assert_eq!(config.effective().api_key.as_deref(), Some("k2"));
    }

    #[test]
    fn updates_are_visible_and_zero_timeout_is_ignored() {
        let config = config_from(&[]);
        config.update_base_url("http://127.0.0.1:9");
        config.update_timeout(250);
        config.update_timeout(0);
        let effective = config.effective();
        assert_eq!(effective.base_url, "http://127.0.0.1:9");
        assert_eq!(effective.timeout_ms, 250);
    }
}
