//! End-to-end conversation tests
//!
//! Drive full ordering flows through the session store, state machine and a
//! real order recorder, the same way the webhook does.

use menubot_engine::config::Config;
use menubot_engine::conversation::ConversationState;
use menubot_engine::handlers::{run_simulation, OutputFormat};
use menubot_engine::server::AppState;
use sdk::OutboundMessage;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn config_for(dir: &Path, extra: &str) -> Config {
    let toml = format!(
        r#"
[core]
data_dir = "{}"

[dashboard]
key = "test-key"
{}
"#,
        dir.display(),
        extra
    );
    Config::from_toml_str(&toml).unwrap()
}

async fn send(state: &AppState, user: &str, text: &str) -> OutboundMessage {
    let handle = state.sessions.get(user).await;
    let mut session = handle.lock().await;
    state.conversation.step(&mut session, text).await
}

async fn state_of(state: &AppState, user: &str) -> ConversationState {
    state.sessions.get(user).await.lock().await.state
}

#[tokio::test]
async fn test_full_order_is_persisted() {
    let dir = TempDir::new().unwrap();
    let config = config_for(dir.path(), "");
    let state = AppState::from_config(&config).await.unwrap();
    let user = "whatsapp:+919800000001";

    let reply = send(&state, user, "hi").await;
    assert!(reply.offers("menu"));
    send(&state, user, "menu").await;
    send(&state, user, "starters").await;
    let reply = send(&state, user, "paneer_tikka").await;
    assert!(reply.body().contains("Paneer Tikka added to cart"));
    let reply = send(&state, user, "qty1").await;
    assert!(reply.body().contains("Paneer Tikka qty: 2"));
    send(&state, user, "done_qty").await;

    let reply = send(&state, user, "cart").await;
    assert!(reply.body().contains("Total: ₹320"));

    let reply = send(&state, user, "checkout").await;
    assert!(reply.offers("upi"));
    assert_eq!(state_of(&state, user).await, ConversationState::Payment);

    let reply = send(&state, user, "upi").await;
    assert!(reply.body().contains("🎉 Order Confirmed!"));
    assert!(reply.body().contains("Total: ₹320"));
    assert_eq!(state_of(&state, user).await, ConversationState::Welcome);

    let orders = state.dashboard.list_orders().await.unwrap();
    assert_eq!(orders.len(), 1);
    let order = &orders[0];
    assert_eq!(order.total, 320);
    assert_eq!(order.customer_phone, user);
    assert_eq!(order.lines[0].quantity, 2);
    assert!(order.total_is_consistent());
    assert!(reply.body().contains(&order.id));
    assert!(config
        .orders_dir()
        .join(format!("{}.json", order.id))
        .exists());
}

#[tokio::test]
async fn test_users_do_not_share_carts() {
    let dir = TempDir::new().unwrap();
    let state = AppState::from_config(&config_for(dir.path(), "")).await.unwrap();

    for text in ["hi", "menu", "drinks", "coke", "done"] {
        send(&state, "alice", text).await;
    }
    for text in ["hi", "menu", "desserts", "gulab_jamun", "qty2", "done"] {
        send(&state, "bob", text).await;
    }

    let alice = state.sessions.get("alice").await;
    let bob = state.sessions.get("bob").await;
    assert_eq!(alice.lock().await.total(), 50);
    assert_eq!(bob.lock().await.total(), 240);
}

#[tokio::test]
async fn test_concurrent_messages_for_one_user_are_serialized() {
    let dir = TempDir::new().unwrap();
    let state = Arc::new(AppState::from_config(&config_for(dir.path(), "")).await.unwrap());
    let user = "whatsapp:+1";
    for text in ["hi", "menu", "drinks", "coke"] {
        send(&state, user, text).await;
    }

    let mut tasks = Vec::new();
    for _ in 0..20 {
        let state = Arc::clone(&state);
        tasks.push(tokio::spawn(async move {
            send(&state, user, "+1").await;
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    let handle = state.sessions.get(user).await;
    assert_eq!(handle.lock().await.cart[0].quantity, 21);
}

#[tokio::test]
async fn test_checkout_details_are_recorded() {
    let dir = TempDir::new().unwrap();
    let config = config_for(
        dir.path(),
        r#"
[checkout]
collect_details = true

[[checkout.payment_methods]]
id = "upi"
label = "💳 UPI"

[[checkout.payment_methods]]
id = "cash"
label = "💵 Cash at Counter"
"#,
    );
    let state = AppState::from_config(&config).await.unwrap();

    for text in [
        "hi", "menu", "main_course", "chicken_biryani", "done", "checkout", "delivery", "Meera",
        "Flat 4, Lake View Road",
    ] {
        send(&state, "u", text).await;
    }
    assert_eq!(state_of(&state, "u").await, ConversationState::Payment);
    send(&state, "u", "cash").await;

    let orders = state.dashboard.list_orders().await.unwrap();
    assert_eq!(orders[0].customer_name.as_deref(), Some("Meera"));
    assert_eq!(orders[0].location.as_deref(), Some("Flat 4, Lake View Road"));
    assert_eq!(orders[0].payment_method, "cash");
}

#[tokio::test]
async fn test_idle_session_starts_over() {
    let dir = TempDir::new().unwrap();
    let config = config_for(dir.path(), "[session]\nidle_timeout_secs = 1\n");
    let state = AppState::from_config(&config).await.unwrap();

    for text in ["hi", "menu", "drinks", "coke"] {
        send(&state, "u", text).await;
    }
    tokio::time::sleep(std::time::Duration::from_millis(1100)).await;

    let handle = state.sessions.get("u").await;
    let session = handle.lock().await;
    assert_eq!(session.state, ConversationState::Welcome);
    assert!(session.cart.is_empty());
}

#[tokio::test]
async fn test_simulation_transcript() {
    let dir = TempDir::new().unwrap();
    let state = AppState::from_config(&config_for(dir.path(), "")).await.unwrap();
    let input = b"hi\nmenu\n\ndrinks\nsprite\ndone\ncheckout\ncash\n".as_slice();
    let mut out = Vec::new();

    run_simulation(&state, "sim", input, &mut out, OutputFormat::Text)
        .await
        .unwrap();

    let transcript = String::from_utf8(out).unwrap();
    assert!(transcript.contains("> hi"));
    assert!(transcript.contains("Reply with:"));
    assert!(transcript.contains("Sprite added to cart"));
    assert!(transcript.contains("Order Confirmed"));
    assert_eq!(state.dashboard.list_orders().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_simulation_json_lines() {
    let dir = TempDir::new().unwrap();
    let state = AppState::from_config(&config_for(dir.path(), "")).await.unwrap();
    let mut out = Vec::new();

    run_simulation(&state, "sim", b"hi\nmenu\n".as_slice(), &mut out, OutputFormat::Json)
        .await
        .unwrap();

    let lines: Vec<serde_json::Value> = String::from_utf8(out)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["state"], "home");
    assert_eq!(lines[1]["state"], "category");
    assert_eq!(lines[1]["reply"]["kind"], "list");
}
