// tests/api_tests.rs

use axum::{
    Json, Router,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use content_widget::{config::Config, routes, state::AppState, utils::html::SchemePolicy};
use serde_json::json;

const API_KEY: &str = "good-key";

async fn mock_factsheets(headers: HeaderMap) -> Response {
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        == Some(&format!("Bearer {}", API_KEY)[..]);

    if !authorized {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Invalid key" })),
        )
            .into_response();
    }

    Json(json!({
        "data": {
            "factsheets": [
                {
                    "title": "Water <quality>",
                    "intro": "<p>Intro<script>alert(1)</script></p>",
                    "sections": [
                        {
                            "title": "Findings",
                            "content": ["<p onclick=\"x()\">Clean</p>", "<iframe src=\"https://evil.test\"></iframe>ok"]
                        }
                    ],
                    "link": "https://example.com",
                    "createdAt": "2024-03-14T10:00:00Z"
                }
            ]
        }
    }))
    .into_response()
}

/// Spawns a stand-in for the content API and returns its base URL.
///
/// * `/ok/*` answers like the real API (with key check).
/// * `/broken/*` answers 200 with the wrong shape.
/// * `/down/*` answers 500 with a non-JSON body.
async fn spawn_content_api() -> String {
    let app = Router::new()
        .route("/ok/factsheets", get(mock_factsheets))
        .route(
            "/ok/newsletters",
            get(|| async { Json(json!({ "data": { "newsletters": [] } })) }),
        )
        .route(
            "/broken/factsheets",
            get(|| async { Json(json!({ "unexpected": true })) }),
        )
        .route(
            "/down/factsheets",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://127.0.0.1:{}", port)
}

fn test_config(api_base_url: String, api_key: &str) -> Config {
    Config {
        api_base_url,
        api_key: api_key.to_string(),
        asset_base_url: None,
        listen_addr: "127.0.0.1:0".to_string(),
        allowed_origins: vec!["http://localhost:3000".to_string()],
        request_timeout: None,
        scheme_policy: SchemePolicy::Prefix,
        date_format: "%-m/%-d/%Y".to_string(),
        rust_log: "error".to_string(),
    }
}

/// Helper function to spawn the app on a random port for testing.
/// Returns the base URL (e.g., "http://127.0.0.1:12345").
async fn spawn_app(config: Config) -> String {
    let state = AppState { config };
    let app = routes::create_router(state);

    // Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    // Spawn the server in the background
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    address
}

async fn get_text(url: String) -> (u16, String) {
    let response = reqwest::Client::new()
        .get(&url)
        .send()
        .await
        .expect("Failed to execute request");
    let status = response.status().as_u16();
    let body = response.text().await.expect("Failed to read body");
    (status, body)
}

#[tokio::test]
async fn health_check_works() {
    let address = spawn_app(test_config("http://127.0.0.1:9".to_string(), API_KEY)).await;

    let (status, body) = get_text(format!("{}/health", address)).await;

    assert_eq!(status, 200);
    assert_eq!(body, "ok");
}

#[tokio::test]
async fn unknown_path_is_404() {
    let address = spawn_app(test_config("http://127.0.0.1:9".to_string(), API_KEY)).await;

    let (status, _) = get_text(format!("{}/random_path_that_does_not_exist", address)).await;

    assert_eq!(status, 404);
}

#[tokio::test]
async fn unknown_widget_kind_is_404() {
    let address = spawn_app(test_config("http://127.0.0.1:9".to_string(), API_KEY)).await;

    let (status, body) = get_text(format!("{}/widgets/podcasts", address)).await;

    assert_eq!(status, 404);
    assert!(body.contains("Unknown widget kind"));
}

#[tokio::test]
async fn factsheet_widget_renders_sanitized_items() {
    // Arrange
    let api = spawn_content_api().await;
    let address = spawn_app(test_config(format!("{}/ok", api), API_KEY)).await;

    // Act
    let (status, body) = get_text(format!("{}/widgets/factsheets", address)).await;

    // Assert
    assert_eq!(status, 200);
    assert!(body.starts_with(
        r#"<link id="factsheet-widget-css" rel="stylesheet" type="text/css" href="factsheet-widget.css">"#
    ));
    assert!(body.contains(r#"<div id="factsheet-widget" class="factsheet-widget"><h1>Factsheets</h1>"#));
    assert!(body.contains(r#"<div id="factsheets-result">"#));
    assert!(body.contains("<h3>Water &lt;quality&gt;</h3>"));
    assert!(body.contains("<p><small>Created: 3/14/2024</small></p>"));
    assert!(body.contains(r#"<div class="intro"><p>Intro</p></div>"#));
    assert!(body.contains(r#"<div class="section-content"><p>Clean</p></div>"#));
    assert!(body.contains(r#"<div class="section-content">ok</div>"#));
    assert!(body.contains(
        r#"<a href="https://example.com" target="_blank" rel="noopener noreferrer">View Link: https://example.com</a>"#
    ));
    assert!(!body.contains("<script"));
    assert!(!body.contains("<iframe"));
    assert!(!body.contains("onclick"));
}

#[tokio::test]
async fn rejected_key_shows_server_message() {
    let api = spawn_content_api().await;
    let address = spawn_app(test_config(format!("{}/ok", api), "wrong-key")).await;

    let (status, body) = get_text(format!("{}/widgets/factsheets/items", address)).await;

    assert_eq!(status, 200);
    assert_eq!(body, r#"<div class="error">Error: Invalid key</div>"#);
}

#[tokio::test]
async fn non_json_error_falls_back_to_status() {
    let api = spawn_content_api().await;
    let address = spawn_app(test_config(format!("{}/down", api), API_KEY)).await;

    let (_, body) = get_text(format!("{}/widgets/factsheets/items", address)).await;

    assert_eq!(body, r#"<div class="error">Error: HTTP error! status: 500</div>"#);
}

#[tokio::test]
async fn unexpected_shape_is_dumped() {
    let api = spawn_content_api().await;
    let address = spawn_app(test_config(format!("{}/broken", api), API_KEY)).await;

    let (status, body) = get_text(format!("{}/widgets/factsheets/items", address)).await;

    assert_eq!(status, 200);
    assert!(body.starts_with(r#"<div class="error">Error: Unexpected response structure</div><pre>"#));
    assert!(body.contains("&quot;unexpected&quot;: true"));
}

#[tokio::test]
async fn empty_newsletter_list_shows_placeholder() {
    let api = spawn_content_api().await;
    let address = spawn_app(test_config(format!("{}/ok", api), API_KEY)).await;

    let (_, body) = get_text(format!("{}/widgets/newsletters/items", address)).await;

    assert_eq!(body, r#"<p class="empty">No newsletters found</p>"#);
}

#[tokio::test]
async fn unreachable_api_is_rendered_inline() {
    // Nothing listens on the discard port.
    let address = spawn_app(test_config("http://127.0.0.1:9".to_string(), API_KEY)).await;

    let (status, body) = get_text(format!("{}/widgets/factsheets/items", address)).await;

    assert_eq!(status, 200);
    assert!(body.starts_with(r#"<div class="error">Error: "#));
}

#[tokio::test]
async fn missing_api_key_is_a_configuration_error() {
    let api = spawn_content_api().await;
    let address = spawn_app(test_config(format!("{}/ok", api), "")).await;

    let response = reqwest::Client::new()
        .get(format!("{}/widgets/factsheets", address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 500);
    let body: serde_json::Value = response.json().await.expect("Failed to parse json");
    assert_eq!(body["error"], "FactsheetWidget: API key is required");
}

#[tokio::test]
async fn query_overrides_title_and_target() {
    let api = spawn_content_api().await;
    let address = spawn_app(test_config(format!("{}/ok", api), API_KEY)).await;

    let (status, body) = get_text(format!(
        "{}/widgets/newsletters?show_title=false&target_id=latest-news",
        address
    ))
    .await;

    assert_eq!(status, 200);
    assert!(body.contains(r#"<div id="latest-news" class="newsletter-widget"><div class="container">"#));
    assert!(!body.contains("<h1>"));
}

#[tokio::test]
async fn invalid_query_is_rejected() {
    let api = spawn_content_api().await;
    let address = spawn_app(test_config(format!("{}/ok", api), API_KEY)).await;

    let (status, _) = get_text(format!(
        "{}/widgets/factsheets?target_id=%22%3E%3Cscript%3E",
        address
    ))
    .await;
    assert_eq!(status, 400);

    let (status, _) = get_text(format!(
        "{}/widgets/factsheets?title={}",
        address,
        "x".repeat(101)
    ))
    .await;
    assert_eq!(status, 400);
}
