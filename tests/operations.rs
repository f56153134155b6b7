mod common;
use common::{app_with, StubDispatcher};

use aem_admin::errors::ToolErrorKind;
use aem_admin::services::dispatcher::{ApiFailure, Method, Payload};
use serde_json::{json, Value};

const TOOLS: &[&str] = &[
    "publish_content",
    "preview_content",
    "invalidate_cache",
    "generate_sitemap",
    "create_snapshot",
];

#[tokio::test]
async fn missing_required_fields_never_reach_the_dispatcher() {
    for tool in TOOLS {
        let stub = StubDispatcher::ok_json(json!({}));
        let app = app_with(stub.clone());
        let err = app
            .tool_executor
            .execute(tool, json!({ "org": "adobecom" }))
            .await
            .expect_err("site is missing");
        assert_eq!(err.kind, ToolErrorKind::InvalidParams, "tool {}", tool);
        assert!(err.message.starts_with("Tool execution failed: "));
        assert!(err.message.contains("site: Site is required"), "tool {}", tool);
        assert_eq!(stub.call_count(), 0, "tool {} dispatched", tool);
    }
}

#[tokio::test]
async fn validation_reports_every_missing_field_at_once() {
    let stub = StubDispatcher::ok_json(json!({}));
    let app = app_with(stub.clone());
    let err = app
        .tool_executor
        .execute("create_snapshot", Value::Null)
        .await
        .expect_err("invalid");
    let fields: Vec<&str> = err.details.as_ref().expect("details")["fields"]
        .as_array()
        .expect("fields")
        .iter()
        .filter_map(|f| f["field"].as_str())
        .collect();
    assert_eq!(fields, vec!["org", "site", "name"]);
    assert_eq!(stub.call_count(), 0);
}

#[tokio::test]
async fn publish_dispatches_live_path_with_defaults() {
    let stub = StubDispatcher::ok_json(json!({}));
    let app = app_with(stub.clone());
    let output = app
        .tool_executor
        .execute(
            "publish_content",
            json!({"org": "adobecom", "site": "milo", "path": "en/products"}),
        )
        .await
        .expect("publish");

    let call = stub.only_call();
    assert_eq!(call.method, Method::POST);
    assert_eq!(call.path, "/live/adobecom/milo/main/en/products");
    assert!(call.body.is_none());
    assert!(!output.is_error);
    assert_eq!(
        output.text,
        "Successfully published content: adobecom/milo/main/en/products\nURL: https://main--milo--adobecom.aem.live/en/products"
    );
}

#[tokio::test]
async fn bulk_publish_sends_paths_body() {
    let stub = StubDispatcher::ok_json(json!({"live": {"url": "https://main--milo--adobecom.aem.live/en/products"}}));
    let app = app_with(stub.clone());
    let output = app
        .tool_executor
        .execute(
            "publish_content",
            json!({"org": "adobecom", "site": "milo", "ref": "stage", "path": "/en/products", "bulk": true, "force": true}),
        )
        .await
        .expect("publish");

    let call = stub.only_call();
    assert_eq!(call.path, "/live/adobecom/milo/stage/*");
    assert_eq!(call.body, Some(json!({"paths": ["/en/products"]})));
    assert!(output.text.contains("Mode: bulk"));
    assert!(output.text.contains("Force update: yes"));
}

#[tokio::test]
async fn preview_reports_url_from_payload() {
    let stub = StubDispatcher::ok_json(json!({"preview": {"url": "https://main--milo--adobecom.aem.page/en"}}));
    let app = app_with(stub.clone());
    let output = app
        .tool_executor
        .execute("preview_content", json!({"org": "adobecom", "site": "milo", "path": "en"}))
        .await
        .expect("preview");
    assert_eq!(stub.only_call().path, "/preview/adobecom/milo/main/en");
    assert_eq!(
        output.text,
        "Preview generated for path: en\nURL: https://main--milo--adobecom.aem.page/en"
    );
}

#[tokio::test]
async fn cache_paths_with_and_without_leading_slash_match() {
    let mut dispatched = Vec::new();
    for path in ["/en/products", "en/products"] {
        let stub = StubDispatcher::replying(Ok(Payload::Text("OK".to_string())));
        let app = app_with(stub.clone());
        let output = app
            .tool_executor
            .execute(
                "invalidate_cache",
                json!({"org": "adobecom", "site": "milo", "path": path}),
            )
            .await
            .expect("cache");
        assert_eq!(
            output.text,
            "Successfully invalidated cache for adobecom/milo/main/en/products"
        );
        dispatched.push(stub.only_call().path);
    }
    assert_eq!(dispatched[0], "/cache/adobecom/milo/main/en/products");
    assert_eq!(dispatched[0], dispatched[1]);
}

#[tokio::test]
async fn sitemap_strips_leading_slash_and_synthesizes_url() {
    let mut dispatched = Vec::new();
    for path in ["/en/products", "en/products"] {
        let stub = StubDispatcher::ok_json(json!({}));
        let app = app_with(stub.clone());
        let output = app
            .tool_executor
            .execute(
                "generate_sitemap",
                json!({"org": "adobecom", "site": "milo", "path": path}),
            )
            .await
            .expect("sitemap");
        assert_eq!(
            output.text,
            "Sitemap generated for adobecom/milo/main\nSitemap URL: https://main--milo--adobecom.aem.page/sitemap.xml"
        );
        dispatched.push(stub.only_call().path);
    }
    assert_eq!(dispatched[0], "/sitemap/adobecom/milo/main/en/products");
    assert_eq!(dispatched[0], dispatched[1]);

    let stub = StubDispatcher::ok_json(json!({}));
    let app = app_with(stub.clone());
    app.tool_executor
        .execute("generate_sitemap", json!({"org": "adobecom", "site": "milo"}))
        .await
        .expect("sitemap");
    assert_eq!(stub.only_call().path, "/sitemap/adobecom/milo/main");
}

#[tokio::test]
async fn snapshot_posts_optional_fields_on_main() {
    let stub = StubDispatcher::ok_json(json!({"id": "snap-42"}));
    let app = app_with(stub.clone());
    let output = app
        .tool_executor
        .execute(
            "create_snapshot",
            json!({"org": "adobecom", "site": "milo", "name": "launch", "paths": ["/en", "/fr"]}),
        )
        .await
        .expect("snapshot");
    let call = stub.only_call();
    assert_eq!(call.path, "/snapshot/adobecom/milo/main/launch");
    assert_eq!(call.body, Some(json!({"paths": ["/en", "/fr"]})));
    assert_eq!(
        output.text,
        "Snapshot created successfully:\nName: launch\nID: snap-42\nPaths: /en, /fr"
    );
}

#[tokio::test]
async fn upstream_failures_are_reported_as_content() {
    let cases = [
        ("publish_content", "Error publishing content: forbidden"),
        ("preview_content", "Error generating preview: forbidden"),
        ("invalidate_cache", "Error invalidating cache: forbidden"),
        ("generate_sitemap", "Error generating sitemap: forbidden"),
        ("create_snapshot", "Error creating snapshot: forbidden"),
    ];
    for (tool, expected) in cases {
        let stub = StubDispatcher::upstream_error(403, "forbidden");
        let app = app_with(stub.clone());
        let output = app
            .tool_executor
            .execute(
                tool,
                json!({"org": "adobecom", "site": "milo", "path": "en", "name": "snap"}),
            )
            .await
            .expect("protocol call succeeds");
        assert!(output.is_error, "tool {}", tool);
        assert_eq!(output.text, expected);
        assert_eq!(stub.call_count(), 1);
    }
}

#[tokio::test]
async fn timeouts_are_reported_as_content() {
    let stub = StubDispatcher::replying(Err(ApiFailure::Timeout { timeout_ms: 50 }));
    let app = app_with(stub);
    let output = app
        .tool_executor
        .execute("preview_content", json!({"org": "adobecom", "site": "milo", "path": "en"}))
        .await
        .expect("protocol call succeeds");
    assert!(output.is_error);
    assert_eq!(
        output.text,
        "Error generating preview: Request aborted: timed out after 50 ms"
    );
}

#[tokio::test]
async fn unknown_tool_is_rejected_before_dispatch() {
    let stub = StubDispatcher::ok_json(json!({}));
    let app = app_with(stub.clone());
    let err = app
        .tool_executor
        .execute("publish", json!({}))
        .await
        .expect_err("unknown");
    assert_eq!(err.kind, ToolErrorKind::NotFound);
    assert_eq!(err.message, "Tool execution failed: Unknown tool: publish");
    assert!(err
        .hint
        .as_deref()
        .unwrap_or("")
        .starts_with("Did you mean: publish_content?"));
    assert_eq!(stub.call_count(), 0);
}
