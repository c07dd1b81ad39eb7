//! HTTP handlers driven through `oneshot`

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use pagesmith_editor::FeatureFlags;
use pagesmith_workspace::{router, AppState, ClientSettings, Config, SlotStore};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

fn app(dir: &TempDir) -> Router {
    let store = SlotStore::new(dir.path());
    store.init().unwrap();
    router(AppState::new(store))
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(match body {
            Some(body) => Body::from(body.to_string()),
            None => Body::empty(),
        })
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_save_then_load() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir);

    let blocks = json!({
        "blocks": [
            { "typeId": "button", "data": { "text": "Go", "url": "/x" } },
            {
                "typeId": "container",
                "data": {},
                "children": [{ "typeId": "textview", "data": { "content": "Hi" } }]
            }
        ],
        "elementStyles": { "background_color": "#fafafa" }
    });

    let (status, body) = call(&app, Method::POST, "/api/slots/home", Some(blocks)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], json!(true));
    assert!(body["bytesWritten"].as_u64().unwrap() > 0);
    assert_eq!(body["backupCreated"], json!(false));

    let (status, body) = call(&app, Method::GET, "/api/slots/home", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["blocks"][0]["typeId"], json!("button"));
    assert_eq!(body["blocks"][0]["data"]["text"], json!("Go"));
    assert_eq!(body["blocks"][1]["children"][0]["data"]["content"], json!("Hi"));
    assert_eq!(body["elementStyles"]["background_color"], json!("#fafafa"));

    let (_, body) = call(&app, Method::POST, "/api/slots/home", Some(json!({ "blocks": [] }))).await;
    assert_eq!(body["backupCreated"], json!(true));
}

#[tokio::test]
async fn test_load_fresh_slot_is_empty() {
    let dir = TempDir::new().unwrap();
    let (status, body) = call(&app(&dir), Method::GET, "/api/slots/contact", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["blocks"], json!([]));
}

#[tokio::test]
async fn test_generate_code_does_not_persist() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir);

    let blocks = json!({ "blocks": [{ "typeId": "heading", "data": { "text": "Hello" } }] });
    let (status, body) = call(&app, Method::POST, "/api/slots/home/generate", Some(blocks)).await;
    assert_eq!(status, StatusCode::OK);
    let code = body["code"].as_str().unwrap();
    assert!(code.starts_with("slot: home"));
    assert!(code.contains("- heading"));
    assert!(!dir.path().join("pages/home.php").exists());
}

#[tokio::test]
async fn test_unknown_type_is_unprocessable() {
    let dir = TempDir::new().unwrap();
    let blocks = json!({ "blocks": [{ "typeId": "carousel", "data": {} }] });
    let (status, body) = call(&app(&dir), Method::POST, "/api/slots/home", Some(blocks)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("carousel"));
}

#[tokio::test]
async fn test_bad_requests() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir);

    let (status, body) = call(&app, Method::GET, "/api/slots/Bad%20Name", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = call(&app, Method::POST, "/api/slots/home", Some(json!({ "blocks": 3 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = call(&app, Method::DELETE, "/api/slots/ghost", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_reset_and_list() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir);

    let (status, body) = call(&app, Method::POST, "/api/slots/about/reset", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true }));

    let (_, body) = call(&app, Method::GET, "/api/slots/about", None).await;
    assert_eq!(body["blocks"][0]["data"]["text"], json!("About"));

    let (_, body) = call(&app, Method::GET, "/api/slots", None).await;
    assert_eq!(body, json!({ "namespace": "pages", "slots": ["about"] }));

    let (_, body) = call(&app, Method::GET, "/api/slots?namespace=elements", None).await;
    assert_eq!(body["slots"], json!(["header", "footer"]));

    let (status, _) = call(&app, Method::DELETE, "/api/slots/about", None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = call(&app, Method::GET, "/api/slots", None).await;
    assert_eq!(body["slots"], json!([]));
}

#[tokio::test]
async fn test_templates_grouped_by_category() {
    let dir = TempDir::new().unwrap();
    let (status, body) = call(&app(&dir), Method::GET, "/api/templates", None).await;
    assert_eq!(status, StatusCode::OK);

    let groups = body.as_array().unwrap();
    assert_eq!(groups[0]["category"], json!("content"));
    assert_eq!(groups[1]["category"], json!("formField"));
    let first_types: Vec<&str> = groups[0]["templates"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["typeId"].as_str().unwrap())
        .collect();
    assert!(first_types.contains(&"container"));
}

#[tokio::test]
async fn test_disabled_builder_is_forbidden() {
    let dir = TempDir::new().unwrap();
    let store = SlotStore::new(dir.path()).with_features(FeatureFlags {
        builder_enabled: false,
        ..Default::default()
    });
    let app = router(AppState::new(store));

    for (method, uri) in [
        (Method::GET, "/api/templates"),
        (Method::GET, "/api/slots/home"),
        (Method::POST, "/api/slots/home/reset"),
    ] {
        let (status, body) = call(&app, method, uri, None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], json!("Builder is disabled"));
    }
    assert!(!dir.path().join("pages").exists());
}

#[tokio::test]
async fn test_write_failure_is_a_server_error() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir);
    let blocks = json!({ "blocks": [{ "typeId": "heading", "data": { "text": "v1" } }] });
    let (status, _) = call(&app, Method::POST, "/api/slots/home", Some(blocks)).await;
    assert_eq!(status, StatusCode::OK);

    std::fs::create_dir(dir.path().join("pages/.home.php.tmp")).unwrap();

    let blocks = json!({ "blocks": [{ "typeId": "heading", "data": { "text": "v2" } }] });
    let (status, body) = call(&app, Method::POST, "/api/slots/home", Some(blocks)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("home"));

    let (_, body) = call(&app, Method::GET, "/api/slots/home", None).await;
    assert_eq!(body["blocks"][0]["data"]["text"], json!("v1"));
}

#[tokio::test]
async fn test_settings_come_from_config() {
    let dir = TempDir::new().unwrap();
    let config: Config = serde_json::from_str(
        r#"{ "autosaveDebounceMs": 1500, "siteTitle": "Bakery", "features": { "autoPopulateMenus": false } }"#,
    )
    .unwrap();
    let store = SlotStore::new(dir.path()).with_features(config.features);
    let app = router(AppState::new(store).with_settings(ClientSettings::from_config(&config)));

    let (status, body) = call(&app, Method::GET, "/api/settings", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["autosaveDebounceMs"], json!(1500));
    assert_eq!(body["siteTitle"], json!("Bakery"));
    assert_eq!(body["features"]["autoPopulateMenus"], json!(false));
    assert_eq!(body["features"]["builderEnabled"], json!(true));
}
