//! HTTP tests against the axum router
//!
//! Requests go through `tower::ServiceExt::oneshot`, so no socket is bound.

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use menubot_engine::config::Config;
use menubot_engine::server::{router, AppState};
use tempfile::TempDir;
use tower::ServiceExt;

async fn app_with(dir: &TempDir, extra: &str) -> (Router, AppState) {
    let toml = format!(
        r#"
[core]
data_dir = "{}"

[dashboard]
key = "letmein"
{}
"#,
        dir.path().display(),
        extra
    );
    let config = Config::from_toml_str(&toml).unwrap();
    let state = AppState::from_config(&config).await.unwrap();
    (router(state.clone()), state)
}

fn inbound(from: &str, body: &str) -> Request<Body> {
    let form = format!(
        "From={}&Body={}",
        from.replace('+', "%2B").replace(':', "%3A"),
        body.replace(' ', "+")
    );
    Request::builder()
        .method("POST")
        .uri("/whatsapp")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form))
        .unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_webhook_returns_twiml() {
    let dir = TempDir::new().unwrap();
    let (app, _) = app_with(&dir, "").await;

    let response = app.oneshot(inbound("whatsapp:+911", "hi")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/xml"
    );

    let body = body_text(response).await;
    assert!(body.starts_with("<?xml"));
    assert!(body.contains("<Response><Message>"));
    assert!(body.contains("Welcome to Our Restaurant"));
    assert!(body.contains("• menu"));
}

#[tokio::test]
async fn test_webhook_interactive_payload() {
    let dir = TempDir::new().unwrap();
    let (app, _) = app_with(&dir, "[transport]\nformat = \"interactive\"\n").await;

    let response = app
        .clone()
        .oneshot(inbound("whatsapp:+911", "hi"))
        .await
        .unwrap();
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/json"
    );
    let value: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(value["to"], "+911");
    assert_eq!(value["interactive"]["type"], "button");

    let response = app.oneshot(inbound("whatsapp:+911", "menu")).await.unwrap();
    let value: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(value["interactive"]["type"], "list");
    assert_eq!(value["interactive"]["action"]["button"], "View Menu");
}

#[tokio::test]
async fn test_webhook_state_persists_between_requests() {
    let dir = TempDir::new().unwrap();
    let (app, state) = app_with(&dir, "").await;

    for text in ["hi", "menu", "starters", "paneer_tikka", "qty1", "done_qty", "checkout", "upi"] {
        let response = app.clone().oneshot(inbound("whatsapp:+912", text)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let orders = state.dashboard.list_orders().await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].total, 320);
    assert_eq!(orders[0].customer_phone, "whatsapp:+912");
}

#[tokio::test]
async fn test_webhook_without_sender_is_rejected() {
    let dir = TempDir::new().unwrap();
    let (app, state) = app_with(&dir, "").await;

    let request = Request::builder()
        .method("POST")
        .uri("/whatsapp")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("Body=hi"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(state.sessions.is_empty().await);
}

#[tokio::test]
async fn test_admin_requires_key() {
    let dir = TempDir::new().unwrap();
    let (app, _) = app_with(&dir, "").await;

    for uri in ["/admin", "/admin?key=wrong", "/admin?key="] {
        let response = app
            .clone()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", uri);
        assert_eq!(body_text(response).await, "Unauthorized");
    }
}

#[tokio::test]
async fn test_admin_lists_orders() {
    let dir = TempDir::new().unwrap();
    let (app, _) = app_with(&dir, "").await;

    for text in ["hi", "menu", "drinks", "coke", "done", "checkout", "cash"] {
        app.clone().oneshot(inbound("whatsapp:+913", text)).await.unwrap();
    }

    let response = app
        .oneshot(Request::get("/admin?key=letmein").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("<table>"));
    assert!(html.contains("Coca Cola x1"));
    assert!(html.contains("₹50"));
    assert!(html.contains("whatsapp:+913"));
}

#[tokio::test]
async fn test_orders_api() {
    let dir = TempDir::new().unwrap();
    let (app, _) = app_with(&dir, "").await;

    let response = app
        .clone()
        .oneshot(Request::get("/api/orders?key=nope").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    for text in ["hi", "menu", "drinks", "sprite", "done", "checkout", "upi"] {
        app.clone().oneshot(inbound("whatsapp:+914", text)).await.unwrap();
    }

    let response = app
        .oneshot(Request::get("/api/orders?key=letmein").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let value: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(value["count"], 1);
    assert_eq!(value["orders"][0]["status"], "Confirmed");
    assert_eq!(value["orders"][0]["total"], 50);
}

#[tokio::test]
async fn test_health() {
    let dir = TempDir::new().unwrap();
    let (app, _) = app_with(&dir, "").await;

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let value: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(value["status"], "ok");
    assert!(value["version"].is_string());
}

#[tokio::test]
async fn test_webhook_accepts_echoed_button_titles() {
    let dir = TempDir::new().unwrap();
    let (app, state) = app_with(&dir, "").await;

    for body in ["hi", "📋 Menu", "🥤 Soft Drinks"] {
        let response = app.clone().oneshot(inbound("whatsapp:+912", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let handle = state.sessions.get("whatsapp:+912").await;
    let session = handle.lock().await;
    assert_eq!(session.category.as_deref(), Some("drinks"));
}
