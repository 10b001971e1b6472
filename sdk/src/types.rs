//! Menu, cart and order types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A dish on the menu. Prices are in minor currency units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    pub price: u32,
}

impl MenuItem {
    /// Create a new MenuItem
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
        }
    }
}

/// One ordered menu item with its quantity, prior to checkout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub item_id: String,
    pub name: String,
    pub unit_price: u32,
    pub quantity: u32,
}

impl CartLine {
    /// Start a cart line for an item with quantity 1
    pub fn from_item(item: &MenuItem) -> Self {
        Self {
            item_id: item.id.clone(),
            name: item.name.clone(),
            unit_price: item.price,
            quantity: 1,
        }
    }

    /// Price of this line (`unit_price * quantity`)
    pub fn subtotal(&self) -> u64 {
        u64::from(self.unit_price) * u64::from(self.quantity)
    }
}

/// Sum of all line subtotals. Always recomputed, never cached.
pub fn cart_total(lines: &[CartLine]) -> u64 {
    lines.iter().map(CartLine::subtotal).sum()
}

/// How the customer wants to receive the order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    DineIn,
    Delivery,
}

impl OrderType {
    pub fn as_str(&self) -> &str {
        match self {
            OrderType::DineIn => "dine_in",
            OrderType::Delivery => "delivery",
        }
    }

    /// Parse a reply (button id or typed label)
    pub fn parse(input: &str) -> Option<Self> {
        match input {
            "dine_in" | "dine-in" | "dine in" | "dinein" => Some(OrderType::DineIn),
            "delivery" => Some(OrderType::Delivery),
            _ => None,
        }
    }
}

impl std::fmt::Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderType::DineIn => write!(f, "Dine-in"),
            OrderType::Delivery => write!(f, "Delivery"),
        }
    }
}

/// Checkout fields collected before payment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDraft {
    pub order_type: Option<OrderType>,
    pub customer_name: Option<String>,
    /// Table number for dine-in, address for delivery
    pub location: Option<String>,
    pub phone: Option<String>,
    pub payment_method: Option<String>,
}

/// Order status. Orders are only recorded once confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Confirmed,
}

/// A finalized order, persisted after payment confirmation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    /// Generated by the order recorder at save time
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub customer_phone: String,
    pub lines: Vec<CartLine>,
    pub total: u64,
    pub payment_method: String,
    pub status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_type: Option<OrderType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl OrderRecord {
    /// Assemble a confirmed order from the cart and the checkout draft.
    ///
    /// The id is left empty; the recorder assigns it in `save`.
    pub fn assemble(
        customer_phone: impl Into<String>,
        lines: Vec<CartLine>,
        draft: &OrderDraft,
        payment_method: impl Into<String>,
    ) -> Self {
        let total = cart_total(&lines);
        Self {
            id: String::new(),
            timestamp: Utc::now(),
            customer_phone: customer_phone.into(),
            lines,
            total,
            payment_method: payment_method.into(),
            status: OrderStatus::Confirmed,
            order_type: draft.order_type,
            customer_name: draft.customer_name.clone(),
            location: draft.location.clone(),
        }
    }

    /// Check that `total` matches the lines
    pub fn total_is_consistent(&self) -> bool {
        self.total == cart_total(&self.lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(price: u32, qty: u32) -> CartLine {
        CartLine {
            item_id: "x".to_string(),
            name: "X".to_string(),
            unit_price: price,
            quantity: qty,
        }
    }

    #[test]
    fn test_new_line_has_quantity_one() {
        let item = MenuItem::new("paneer_tikka", "Paneer Tikka", 160);
        let line = CartLine::from_item(&item);
        assert_eq!(line.quantity, 1);
        assert_eq!(line.unit_price, 160);
        assert_eq!(line.name, "Paneer Tikka");
    }

    #[test]
    fn test_cart_total() {
        assert_eq!(cart_total(&[]), 0);
        assert_eq!(cart_total(&[line(160, 2), line(50, 3)]), 470);
    }

    #[test]
    fn test_assemble_computes_total() {
        let draft = OrderDraft {
            order_type: Some(OrderType::Delivery),
            ..OrderDraft::default()
        };
        let order = OrderRecord::assemble("whatsapp:+911234", vec![line(180, 2)], &draft, "upi");
        assert_eq!(order.total, 360);
        assert!(order.total_is_consistent());
        assert_eq!(order.status, OrderStatus::Confirmed);
        assert_eq!(order.order_type, Some(OrderType::Delivery));
        assert!(order.id.is_empty());
    }

    #[test]
    fn test_order_type_parse() {
        assert_eq!(OrderType::parse("dine_in"), Some(OrderType::DineIn));
        assert_eq!(OrderType::parse("dine-in"), Some(OrderType::DineIn));
        assert_eq!(OrderType::parse("delivery"), Some(OrderType::Delivery));
        assert_eq!(OrderType::parse("takeaway"), None);
    }

    #[test]
    fn test_order_json_shape() {
        let order = OrderRecord::assemble("+91", vec![line(50, 1)], &OrderDraft::default(), "cash");
        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["status"], "Confirmed");
        assert_eq!(json["total"], 50);
        assert!(json.get("customer_name").is_none());
    }
}
