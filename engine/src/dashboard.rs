//! Dashboard Reader
//!
//! Key-protected, read-only view over saved orders, rendered as an HTML
//! table for `/admin` and as JSON for `/api/orders`.

use quick_xml::escape::escape;
use sdk::errors::BotError;
use sdk::OrderRecord;
use std::sync::Arc;
use tracing::warn;

use crate::orders::OrderRecorder;
use crate::secrets::SecretString;

/// Order listing guarded by the shared dashboard key
pub struct Dashboard {
    key: SecretString,
    recorder: Arc<dyn OrderRecorder>,
    currency_symbol: String,
}

impl Dashboard {
    pub fn new(
        key: SecretString,
        recorder: Arc<dyn OrderRecorder>,
        currency_symbol: impl Into<String>,
    ) -> Self {
        Self {
            key,
            recorder,
            currency_symbol: currency_symbol.into(),
        }
    }

    /// Check a provided key against the configured one
    pub fn authorize(&self, provided: Option<&str>) -> bool {
        match provided {
            Some(provided) if !provided.is_empty() => self.key.matches(provided),
            _ => false,
        }
    }

    /// Every saved order, oldest first
    pub async fn list_orders(&self) -> Result<Vec<OrderRecord>, BotError> {
        self.recorder.list().await
    }

    /// `list_orders` behind the key check
    pub async fn authorized_orders(
        &self,
        provided: Option<&str>,
    ) -> Result<Vec<OrderRecord>, BotError> {
        if !self.authorize(provided) {
            warn!("Rejected dashboard request with invalid key");
            return Err(BotError::Unauthorized);
        }
        self.list_orders().await
    }

    /// Render orders as a standalone HTML page
    pub fn render_html(&self, orders: &[OrderRecord]) -> String {
        let mut rows = String::new();
        for order in orders {
            let items = order
                .lines
                .iter()
                .map(|l| format!("{} x{}", escape(l.name.as_str()), l.quantity))
                .collect::<Vec<_>>()
                .join("<br>");
            let details = [
                order.order_type.map(|t| t.to_string()),
                order.customer_name.clone(),
                order.location.clone(),
            ]
            .into_iter()
            .flatten()
            .map(|d| escape(d.as_str()).into_owned())
            .collect::<Vec<_>>()
            .join(" / ");

            rows.push_str(&format!(
                "        <tr><td>{id}</td><td>{time}</td><td>{phone}</td><td>{items}</td>\
                 <td>{symbol}{total}</td><td>{payment}</td><td>{details}</td><td>Confirmed</td></tr>\n",
                id = escape(order.id.as_str()),
                time = order.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
                phone = escape(order.customer_phone.as_str()),
                items = items,
                symbol = escape(self.currency_symbol.as_str()),
                total = order.total,
                payment = escape(order.payment_method.as_str()),
                details = details,
            ));
        }

        if orders.is_empty() {
            rows.push_str("        <tr><td colspan=\"8\">No orders yet</td></tr>\n");
        }

        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Restaurant Orders</title>
    <style>
        body {{ font-family: sans-serif; margin: 2rem; }}
        table {{ border-collapse: collapse; width: 100%; }}
        th, td {{ border: 1px solid #ccc; padding: 0.5rem; text-align: left; vertical-align: top; }}
        th {{ background: #f4f4f4; }}
    </style>
</head>
<body>
    <h1>📦 Orders ({count})</h1>
    <table>
        <tr><th>Order ID</th><th>Time</th><th>Customer</th><th>Items</th><th>Total</th><th>Payment</th><th>Details</th><th>Status</th></tr>
{rows}    </table>
</body>
</html>"#,
            count = orders.len(),
            rows = rows,
        )
    }
}
