use crate::constants::env::{API_KEY, AUTH_TOKEN};
use crate::constants::network::AUTH_SCHEME;
use crate::services::logger::Logger;
use std::sync::RwLock;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: Option<String>,
    pub auth_token: Option<String>,
}

impl Credentials {
    /// The credential sent upstream. The API key wins over the auth token.
    pub fn active(&self) -> Option<&str> {
        non_empty(self.api_key.as_deref()).or_else(|| non_empty(self.auth_token.as_deref()))
    }

    pub fn is_present(&self) -> bool {
        self.active().is_some()
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

pub struct CredentialStore {
    logger: Logger,
    credentials: RwLock<Credentials>,
}

impl CredentialStore {
    pub fn new(logger: Logger, credentials: Credentials) -> Self {
        Self {
            logger: logger.child("auth"),
            credentials: RwLock::new(credentials),
        }
    }

    pub fn from_env(logger: Logger) -> Self {
        Self::from_lookup(logger, |key| std::env::var(key).ok())
    }

    /// Loads credentials through `lookup`; unset or empty variables stay `None`.
    pub fn from_lookup<F>(logger: Logger, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|value| !value.is_empty());
        Self::new(
            logger,
            Credentials {
                api_key: read(API_KEY),
                auth_token: read(AUTH_TOKEN),
            },
        )
    }

    pub fn set(&self, credentials: Credentials) {
        let mut guard = self
            .credentials
            .write()
            .unwrap_or_else(|err| err.into_inner());
        *guard = credentials;
        self.logger.debug("Credentials updated", None);
    }

    pub fn get(&self) -> Credentials {
        self.credentials
            .read()
            .unwrap_or_else(|err| err.into_inner())
            .clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.get().is_present()
    }

    pub fn clear(&self) {
        self.set(Credentials::default());
        self.logger.debug("Credentials cleared", None);
    }

    pub fn authorization(&self) -> Option<String> {
        authorization_value(&self.get())
    }
}

pub fn authorization_value(credentials: &Credentials) -> Option<String> {
    credentials
        .active()
        .map(|credential| format!("{} {}", AUTH_SCHEME, credential))
}
