//! HTTP server
//!
//! # Endpoints
//!
//! - POST /whatsapp - Gateway webhook (form fields `From`, `Body`)
//! - GET /admin?key= - Orders dashboard (HTML)
//! - GET /api/orders?key= - Orders as JSON
//! - GET /health - Liveness and version

use anyhow::{Context, Result};
use axum::{
    extract::{Form, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use sdk::errors::BotError;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::catalog::Catalog;
use crate::config::{Config, TransportFormat};
use crate::conversation::Conversation;
use crate::dashboard::Dashboard;
use crate::orders;
use crate::session::SessionStore;
use crate::transport;

/// Shared state behind every handler
#[derive(Clone)]
pub struct AppState {
    pub conversation: Arc<Conversation>,
    pub sessions: Arc<SessionStore>,
    pub dashboard: Arc<Dashboard>,
    pub format: TransportFormat,
}

impl AppState {
    /// Wire catalog, recorder, sessions and dashboard from config
    pub async fn from_config(config: &Config) -> Result<Self> {
        let catalog = Arc::new(Catalog::from_config(&config.menu).context("Invalid menu")?);
        let recorder = orders::open(config)
            .await
            .context("Failed to open order storage")?;
        info!("Order storage backend: {}", recorder.name());

        let dashboard = Dashboard::new(
            config.dashboard.key.clone(),
            Arc::clone(&recorder),
            config.menu.currency_symbol.clone(),
        );
        let conversation = Conversation::new(catalog, recorder, config.checkout.clone());
        let sessions =
            SessionStore::with_idle_timeout(config.session.idle_timeout_secs.map(Duration::from_secs));

        Ok(Self {
            conversation: Arc::new(conversation),
            sessions: Arc::new(sessions),
            dashboard: Arc::new(dashboard),
            format: config.transport.format,
        })
    }
}

/// Inbound webhook form
#[derive(Debug, Deserialize)]
pub struct InboundMessage {
    #[serde(rename = "From", default)]
    pub from: String,
    #[serde(rename = "Body", default)]
    pub body: String,
}

/// Dashboard query string
#[derive(Debug, Deserialize)]
pub struct KeyQuery {
    key: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/whatsapp", post(webhook_handler))
        .route("/admin", get(admin_handler))
        .route("/api/orders", get(orders_api_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `host:port` and serve until Ctrl+C
pub async fn serve(state: AppState, host: &str, port: u16) -> Result<()> {
    let listener = tokio::net::TcpListener::bind((host, port))
        .await
        .with_context(|| format!("Failed to bind to {}:{}", host, port))?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Shutting down gracefully");
        })
        .await
        .context("Server error")?;

    Ok(())
}

async fn webhook_handler(
    State(state): State<AppState>,
    Form(message): Form<InboundMessage>,
) -> Response {
    let from = message.from.trim().to_string();
    if from.is_empty() {
        warn!("Webhook called without a sender");
        return (StatusCode::BAD_REQUEST, "Missing From").into_response();
    }

    let span = info_span!("webhook", user = %from);
    async move {
        let handle = state.sessions.get(&from).await;
        let mut session = handle.lock().await;
        debug!("Inbound in {}: {:?}", session.state, message.body);

        let reply = state.conversation.step(&mut session, &message.body).await;
        drop(session);

        let rendered = transport::render(state.format, &reply, &from);
        ([(header::CONTENT_TYPE, rendered.content_type)], rendered.body).into_response()
    }
    .instrument(span)
    .await
}

async fn admin_handler(State(state): State<AppState>, Query(query): Query<KeyQuery>) -> Response {
    match state.dashboard.authorized_orders(query.key.as_deref()).await {
        Ok(orders) => Html(state.dashboard.render_html(&orders)).into_response(),
        Err(BotError::Unauthorized) => (StatusCode::UNAUTHORIZED, "Unauthorized").into_response(),
        Err(e) => {
            error!("Failed to list orders: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to load orders").into_response()
        }
    }
}

async fn orders_api_handler(
    State(state): State<AppState>,
    Query(query): Query<KeyQuery>,
) -> Response {
    match state.dashboard.authorized_orders(query.key.as_deref()).await {
        Ok(orders) => Json(json!({ "count": orders.len(), "orders": orders })).into_response(),
        Err(BotError::Unauthorized) => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Unauthorized" })),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to list orders: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to load orders" })),
            )
                .into_response()
        }
    }
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "commit": env!("GIT_COMMIT_HASH"),
    }))
}
