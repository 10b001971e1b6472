//! Command handlers for CLI operations
//!
//! This module implements the handlers for all CLI commands:
//! - serve: Run the webhook and dashboard server
//! - orders: Show the last N saved orders
//! - menu: Print the configured menu
//! - simulate: Drive a conversation from stdin
//! - doctor: Validate configuration and storage

use anyhow::{Context, Result};
use serde_json::json;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::catalog::Catalog;
use crate::config::Config;
use crate::orders;
use crate::server::{self, AppState};
use crate::transport::twiml;

/// Output format for command results
#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for machine consumption
    Json,
}

/// Start the server and block until shutdown
pub async fn handle_serve(config: &Config, port: Option<u16>) -> Result<()> {
    if config.uses_default_dashboard_key() {
        tracing::warn!(
            "Dashboard is using the default key; set [dashboard] key or {}",
            crate::config::DASHBOARD_KEY_ENV
        );
    }

    let state = AppState::from_config(config).await?;
    server::serve(
        state,
        &config.server.host,
        port.unwrap_or(config.server.port),
    )
    .await
}

/// Show the most recent orders
pub async fn handle_orders(limit: usize, config: &Config, format: OutputFormat) -> Result<()> {
    let recorder = orders::open(config)
        .await
        .context("Failed to open order storage")?;
    let all = recorder.list().await.context("Failed to list orders")?;
    let shown = &all[all.len().saturating_sub(limit)..];

    match format {
        OutputFormat::Text => {
            if shown.is_empty() {
                println!("No orders yet");
                return Ok(());
            }

            println!("Orders (last {} of {}):", shown.len(), all.len());
            println!();

            for order in shown {
                println!("Order ID: {}", order.id);
                println!("  Customer: {}", order.customer_phone);
                println!(
                    "  Placed:   {}",
                    order.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
                );
                for line in &order.lines {
                    println!(
                        "  - {} x{} = {}{}",
                        line.name,
                        line.quantity,
                        config.menu.currency_symbol,
                        line.subtotal()
                    );
                }
                println!(
                    "  Total:    {}{} ({})",
                    config.menu.currency_symbol, order.total, order.payment_method
                );
                if let Some(order_type) = order.order_type {
                    println!("  Type:     {}", order_type);
                }
                if let Some(name) = &order.customer_name {
                    println!("  Name:     {}", name);
                }
                if let Some(location) = &order.location {
                    println!("  Location: {}", location);
                }
                println!();
            }
        }
        OutputFormat::Json => {
            let output = json!({
                "orders": shown,
                "count": shown.len(),
                "total_orders": all.len(),
                "limit": limit
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

/// Print the menu from config
pub fn handle_menu(config: &Config, format: OutputFormat) -> Result<()> {
    let catalog = Catalog::from_config(&config.menu).context("Invalid menu")?;

    match format {
        OutputFormat::Text => {
            for category in catalog.iter() {
                println!("{} [{}]", category.title, category.key);
                for item in &category.items {
                    println!(
                        "  {:<20} {:<24} {}",
                        item.id,
                        item.name,
                        catalog.price(u64::from(item.price))
                    );
                }
                println!();
            }
        }
        OutputFormat::Json => {
            let categories: Vec<_> = catalog
                .iter()
                .map(|c| json!({ "key": c.key, "title": c.title, "items": c.items }))
                .collect();
            let output = json!({
                "currency_symbol": config.menu.currency_symbol,
                "categories": categories
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

/// Chat with the bot from stdin
pub async fn handle_simulate(user: &str, config: &Config, format: OutputFormat) -> Result<()> {
    let state = AppState::from_config(config).await?;
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();

    if matches!(format, OutputFormat::Text) {
        println!("Chatting as {} (Ctrl+D to quit). Say \"hi\" to start.", user);
    }
    run_simulation(&state, user, stdin, &mut stdout, format).await
}

/// Feed each input line through the conversation and write the replies
pub async fn run_simulation<R, W>(
    state: &AppState,
    user: &str,
    input: R,
    out: &mut W,
    format: OutputFormat,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await.context("Failed to read input")? {
        if line.trim().is_empty() {
            continue;
        }

        let handle = state.sessions.get(user).await;
        let mut session = handle.lock().await;
        let reply = state.conversation.step(&mut session, &line).await;

        match format {
            OutputFormat::Text => {
                writeln!(out, "> {}", line.trim())?;
                writeln!(out, "{}", twiml::plain_text(&reply))?;
                writeln!(out)?;
            }
            OutputFormat::Json => {
                let output = json!({
                    "input": line.trim(),
                    "state": session.state,
                    "reply": reply
                });
                writeln!(out, "{}", serde_json::to_string(&output)?)?;
            }
        }
    }
    Ok(())
}

/// Validate configuration and storage
pub async fn handle_doctor(config: &Config, format: OutputFormat) -> Result<()> {
    let mut issues = Vec::new();
    let mut checks: Vec<(&str, String)> = Vec::new();

    // Config is already validated when loaded
    checks.push(("Configuration", "Valid".to_string()));

    if config.core.data_dir.exists() {
        checks.push(("Data directory", "Exists".to_string()));
    } else {
        checks.push(("Data directory", "Missing".to_string()));
        issues.push(format!(
            "Data directory does not exist: {}",
            config.core.data_dir.display()
        ));
    }

    match Catalog::from_config(&config.menu) {
        Ok(catalog) => {
            let items: usize = catalog.iter().map(|c| c.items.len()).sum();
            checks.push((
                "Menu",
                format!("{} categories, {} items", catalog.categories().len(), items),
            ));
        }
        Err(e) => {
            checks.push(("Menu", "Invalid".to_string()));
            issues.push(e.to_string());
        }
    }

    match orders::open(config).await {
        Ok(recorder) => match recorder.list().await {
            Ok(records) => {
                checks.push((
                    "Order storage",
                    format!("OK ({}, {} orders)", recorder.name(), records.len()),
                ));
            }
            Err(e) => {
                checks.push(("Order storage", "Unreadable".to_string()));
                issues.push(format!("Cannot read orders: {}", e));
            }
        },
        Err(e) => {
            checks.push(("Order storage", "Failed".to_string()));
            issues.push(format!("Cannot open order storage: {}", e));
        }
    }

    if config.uses_default_dashboard_key() {
        checks.push(("Dashboard key", "Default".to_string()));
        issues.push(format!(
            "Dashboard uses the default key. Set [dashboard] key or {}",
            crate::config::DASHBOARD_KEY_ENV
        ));
    } else {
        checks.push(("Dashboard key", "Custom".to_string()));
    }

    match format {
        OutputFormat::Text => {
            println!("Menubot Diagnostics");
            println!("============================");
            println!();
            println!("System Checks:");
            for (check, status) in &checks {
                println!("  {:<25} {}", format!("{}:", check), status);
            }

            println!();

            if issues.is_empty() {
                println!("✓ All checks passed!");
            } else {
                println!("⚠ Issues found:");
                println!();
                for (i, issue) in issues.iter().enumerate() {
                    println!("  {}. {}", i + 1, issue);
                }
            }
        }
        OutputFormat::Json => {
            let output = json!({
                "checks": checks.iter().map(|(name, status)| {
                    json!({
                        "name": name,
                        "status": status
                    })
                }).collect::<Vec<_>>(),
                "issues": issues,
                "healthy": issues.is_empty()
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
