use crate::constants::content::DEFAULT_REF;
use crate::errors::ToolError;
use serde::Serialize;
use serde_json::{Map, Value};

const ORG_REQUIRED: &str = "Organization is required";
const SITE_REQUIRED: &str = "Site is required";
const REF_REQUIRED: &str = "Ref (branch) is required";
const PATH_REQUIRED: &str = "Path is required";

/// Every field problem found in one argument object.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FieldErrors {
    errors: Vec<(String, String)>,
}

impl FieldErrors {
    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push((field.to_string(), message.into()));
    }

    pub fn into_result<T>(self, value: T) -> Result<T, ToolError> {
        if self.errors.is_empty() {
            return Ok(value);
        }
        let lines: Vec<String> = self
            .errors
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect();
        let details: Vec<Value> = self
            .errors
            .iter()
            .map(|(field, message)| serde_json::json!({ "field": field, "message": message }))
            .collect();
        Err(ToolError::invalid_params(lines.join("; "))
            .with_details(serde_json::json!({ "fields": details })))
    }
}

#[derive(Clone, Default)]
pub struct Validation;

impl Validation {
    pub fn new() -> Self {
        Self
    }

    /// Null or missing arguments behave like an empty object.
    pub fn ensure_args_object(&self, args: &Value) -> Result<Map<String, Value>, ToolError> {
        match args {
            Value::Null => Ok(Map::new()),
            Value::Object(map) => Ok(map.clone()),
            _ => Err(ToolError::invalid_params("arguments must be an object")),
        }
    }

    pub fn required_string(
        &self,
        obj: &Map<String, Value>,
        field: &str,
        message: &str,
        errors: &mut FieldErrors,
    ) -> String {
        match obj.get(field).and_then(Value::as_str) {
            Some(text) if !text.trim().is_empty() => text.to_string(),
            _ => {
                errors.push(field, message);
                String::new()
            }
        }
    }

    pub fn optional_string(
        &self,
        obj: &Map<String, Value>,
        field: &str,
        errors: &mut FieldErrors,
    ) -> Option<String> {
        match obj.get(field) {
            None | Some(Value::Null) => None,
            Some(Value::String(text)) if text.trim().is_empty() => None,
            Some(Value::String(text)) => Some(text.clone()),
            Some(_) => {
                errors.push(field, "expected string");
                None
            }
        }
    }

    /// Absent or null takes `default`; a present value must be a non-blank string.
    pub fn string_with_default(
        &self,
        obj: &Map<String, Value>,
        field: &str,
        default: &str,
        message: &str,
        errors: &mut FieldErrors,
    ) -> String {
        match obj.get(field) {
            None | Some(Value::Null) => default.to_string(),
            Some(_) => self.required_string(obj, field, message, errors),
        }
    }

    pub fn bool_with_default(
        &self,
        obj: &Map<String, Value>,
        field: &str,
        default: bool,
        errors: &mut FieldErrors,
    ) -> bool {
        match obj.get(field) {
            None | Some(Value::Null) => default,
            Some(Value::Bool(flag)) => *flag,
            Some(_) => {
                errors.push(field, "expected boolean");
                default
            }
        }
    }

    pub fn optional_string_list(
        &self,
        obj: &Map<String, Value>,
        field: &str,
        errors: &mut FieldErrors,
    ) -> Option<Vec<String>> {
        match obj.get(field) {
            None | Some(Value::Null) => None,
            Some(Value::Array(items)) => {
                let strings: Option<Vec<String>> = items
                    .iter()
                    .map(|item| item.as_str().map(str::to_string))
                    .collect();
                if strings.is_none() {
                    errors.push(field, "expected array of strings");
                }
                strings
            }
            Some(_) => {
                errors.push(field, "expected array of strings");
                None
            }
        }
    }

    fn target(&self, obj: &Map<String, Value>, errors: &mut FieldErrors) -> ContentTarget {
        ContentTarget {
            org: self.required_string(obj, "org", ORG_REQUIRED, errors),
            site: self.required_string(obj, "site", SITE_REQUIRED, errors),
            git_ref: self.string_with_default(obj, "ref", DEFAULT_REF, REF_REQUIRED, errors),
        }
    }

    pub fn publish_request(&self, args: &Value) -> Result<PublishRequest, ToolError> {
        let obj = self.ensure_args_object(args)?;
        let mut errors = FieldErrors::default();
        let request = PublishRequest {
            target: self.target(&obj, &mut errors),
            path: self.required_string(&obj, "path", PATH_REQUIRED, &mut errors),
            force: self.bool_with_default(&obj, "force", false, &mut errors),
            bulk: self.bool_with_default(&obj, "bulk", false, &mut errors),
        };
        errors.into_result(request)
    }

    pub fn preview_request(&self, args: &Value) -> Result<PreviewRequest, ToolError> {
        let obj = self.ensure_args_object(args)?;
        let mut errors = FieldErrors::default();
        let request = PreviewRequest {
            target: self.target(&obj, &mut errors),
            path: self.required_string(&obj, "path", PATH_REQUIRED, &mut errors),
        };
        errors.into_result(request)
    }

    pub fn cache_request(&self, args: &Value) -> Result<CacheRequest, ToolError> {
        let obj = self.ensure_args_object(args)?;
        let mut errors = FieldErrors::default();
        let request = CacheRequest {
            target: self.target(&obj, &mut errors),
            path: self.required_string(
                &obj,
                "path",
                "Path is required for cache invalidation",
                &mut errors,
            ),
        };
        errors.into_result(request)
    }

    pub fn sitemap_request(&self, args: &Value) -> Result<SitemapRequest, ToolError> {
        let obj = self.ensure_args_object(args)?;
        let mut errors = FieldErrors::default();
        let request = SitemapRequest {
            target: self.target(&obj, &mut errors),
            path: self.optional_string(&obj, "path", &mut errors),
        };
        errors.into_result(request)
    }

    pub fn snapshot_request(&self, args: &Value) -> Result<SnapshotRequest, ToolError> {
        let obj = self.ensure_args_object(args)?;
        let mut errors = FieldErrors::default();
        let request = SnapshotRequest {
            org: self.required_string(&obj, "org", ORG_REQUIRED, &mut errors),
            site: self.required_string(&obj, "site", SITE_REQUIRED, &mut errors),
            name: self.required_string(&obj, "name", "Snapshot name is required", &mut errors),
            description: self.optional_string(&obj, "description", &mut errors),
            paths: self.optional_string_list(&obj, "paths", &mut errors),
        };
        errors.into_result(request)
    }
}

/// The org/site/ref triple every content operation addresses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentTarget {
    pub org: String,
    pub site: String,
    #[serde(rename = "ref")]
    pub git_ref: String,
}

impl ContentTarget {
    pub fn new(org: &str, site: &str, git_ref: &str) -> Self {
        Self {
            org: org.to_string(),
            site: site.to_string(),
            git_ref: git_ref.to_string(),
        }
    }

    /// `{org}/{site}/{ref}`, the prefix shared by every admin endpoint.
    pub fn scope(&self) -> String {
        format!("{}/{}/{}", self.org, self.site, self.git_ref)
    }

    /// `https://{ref}--{site}--{org}.{domain}`
    pub fn host_url(&self, domain: &str) -> String {
        format!(
            "https://{}--{}--{}.{}",
            self.git_ref, self.site, self.org, domain
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishRequest {
    #[serde(flatten)]
    pub target: ContentTarget,
    pub path: String,
    pub force: bool,
    pub bulk: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewRequest {
    #[serde(flatten)]
    pub target: ContentTarget,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheRequest {
    #[serde(flatten)]
    pub target: ContentTarget,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SitemapRequest {
    #[serde(flatten)]
    pub target: ContentTarget,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotRequest {
    pub org: String,
    pub site: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paths: Option<Vec<String>>,
}
