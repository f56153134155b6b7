pub mod network {
    pub const DEFAULT_BASE_URL: &str = "https://admin.hlx.page";
    pub const TIMEOUT_API_REQUEST_MS: u64 = 30_000;
    pub const AUTH_SCHEME: &str = "token";
    pub const ACCEPT: &str = "application/json, text/plain, */*";
}

pub mod env {
    pub const API_KEY: &str = "AEM_API_KEY";
    pub const AUTH_TOKEN: &str = "AEM_AUTH_TOKEN";
    pub const BASE_URL: &str = "AEM_BASE_URL";
    pub const TIMEOUT: &str = "AEM_TIMEOUT";
}

pub mod content {
    pub const DEFAULT_REF: &str = "main";
    pub const SNAPSHOT_REF: &str = "main";
    pub const PREVIEW_DOMAIN: &str = "aem.page";
    pub const LIVE_DOMAIN: &str = "aem.live";
}

pub mod limits {
    pub const MAX_ERROR_TEXT_BYTES: usize = 2_048;
    pub const MAX_SUGGESTIONS: usize = 3;
}
