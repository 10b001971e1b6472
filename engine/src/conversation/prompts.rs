//! Reply builders for each step of the ordering flow
//!
//! Choice ids are what the state machine matches on; labels are display only.

use sdk::{CartLine, Choice, ListSection, OrderType, OutboundMessage};

use crate::catalog::{Catalog, Category};
use crate::config::PaymentMethodConfig;

/// Most reply buttons a WhatsApp message may carry
pub const MAX_BUTTONS: usize = 3;

pub fn home() -> OutboundMessage {
    OutboundMessage::buttons(
        "👋 Welcome to Our Restaurant\nHow can I help you?",
        vec![
            Choice::new("menu", "📋 Menu"),
            Choice::new("reserve", "🍽 Reserve Table"),
            Choice::new("cart", "🛒 Cart"),
        ],
    )
}

pub fn reservation() -> OutboundMessage {
    OutboundMessage::text(
        "🍽 Table reservations are handled by our front desk.\n\
         Please call the restaurant and we'll hold a table for you.\n\
         Reply *menu* to order food in the meantime.",
    )
}

pub fn category_list(catalog: &Catalog) -> OutboundMessage {
    let rows = catalog
        .iter()
        .map(|c| Choice::new(c.key.as_str(), c.title.as_str()))
        .collect();
    OutboundMessage::list(
        "📋 Select a category",
        "View Menu",
        vec![ListSection {
            title: "Menu".to_string(),
            rows,
        }],
    )
}

pub fn item_list(catalog: &Catalog, category: &Category) -> OutboundMessage {
    let rows = category
        .items
        .iter()
        .map(|item| {
            Choice::new(
                item.id.as_str(),
                format!("{} {}", item.name, catalog.price(u64::from(item.price))),
            )
        })
        .collect();
    OutboundMessage::list(
        format!("Select an item from {}", category.title),
        "View Items",
        vec![ListSection {
            title: category.title.clone(),
            rows,
        }],
    )
}

pub fn quantity_choices() -> Vec<Choice> {
    vec![
        Choice::new("qty1", "+1"),
        Choice::new("qty2", "+2"),
        Choice::new("done_qty", "✅ Done"),
    ]
}

/// Quantity prompt right after an item was added
pub fn item_added(line: &CartLine) -> OutboundMessage {
    OutboundMessage::buttons(
        format!("✅ {} added to cart. Choose quantity:", line.name),
        quantity_choices(),
    )
}

/// Quantity prompt after an increment
pub fn quantity(line: &CartLine) -> OutboundMessage {
    OutboundMessage::buttons(
        format!("{} qty: {}", line.name, line.quantity),
        quantity_choices(),
    )
}

pub fn what_next() -> OutboundMessage {
    OutboundMessage::buttons(
        "Item added to cart 🛒 What next?",
        vec![
            Choice::new("menu", "➕ Add More"),
            Choice::new("cart", "🛒 View Cart"),
            Choice::new("checkout", "✅ Checkout"),
        ],
    )
}

pub fn empty_cart() -> OutboundMessage {
    OutboundMessage::buttons(
        "🛒 Your cart is empty. Add some items first.",
        vec![Choice::new("menu", "➕ Add More")],
    )
}

/// Cart lines with the recomputed total
pub fn cart(catalog: &Catalog, lines: &[CartLine]) -> OutboundMessage {
    if lines.is_empty() {
        return empty_cart();
    }

    let mut text = String::from("🛒 Your Cart:\n");
    for line in lines {
        text.push_str(&format!(
            "- {} x{} = {}\n",
            line.name,
            line.quantity,
            catalog.price(line.subtotal())
        ));
    }
    text.push_str(&format!(
        "\nTotal: {}",
        catalog.price(sdk::cart_total(lines))
    ));

    OutboundMessage::buttons(
        text,
        vec![
            Choice::new("menu", "➕ Add More"),
            Choice::new("remove", "➖ Remove Item"),
            Choice::new("checkout", "✅ Checkout"),
        ],
    )
}

/// Cart lines addressed by their 0-based index
pub fn remove_list(lines: &[CartLine]) -> OutboundMessage {
    let rows = lines
        .iter()
        .enumerate()
        .map(|(idx, line)| {
            Choice::new(
                idx.to_string(),
                format!("{}. {} x{}", idx, line.name, line.quantity),
            )
        })
        .collect();
    OutboundMessage::list(
        "Which item should be removed? Reply with its number.",
        "Remove",
        vec![ListSection {
            title: "Cart".to_string(),
            rows,
        }],
    )
}

pub fn removed(catalog: &Catalog, line: &CartLine, remaining: &[CartLine]) -> OutboundMessage {
    with_notice(
        OutboundMessage::buttons(
            "What next?",
            vec![
                Choice::new("menu", "➕ Add More"),
                Choice::new("cart", "🛒 View Cart"),
                Choice::new("checkout", "✅ Checkout"),
            ],
        ),
        &format!(
            "🗑 Removed {} x{}. Cart total: {}",
            line.name,
            line.quantity,
            catalog.price(sdk::cart_total(remaining))
        ),
    )
}

pub fn order_type() -> OutboundMessage {
    OutboundMessage::buttons(
        "How would you like your order?",
        vec![
            Choice::new("dine_in", "🍽 Dine-in"),
            Choice::new("delivery", "🛵 Delivery"),
        ],
    )
}

pub fn customer_name() -> OutboundMessage {
    OutboundMessage::text("What name should we put on the order?")
}

pub fn location(order_type: Option<OrderType>) -> OutboundMessage {
    match order_type {
        Some(OrderType::Delivery) => {
            OutboundMessage::text("📍 Please send your delivery address.")
        }
        _ => OutboundMessage::text("🔢 Which table number are you at?"),
    }
}

pub fn payment(catalog: &Catalog, total: u64, methods: &[PaymentMethodConfig]) -> OutboundMessage {
    let body = format!("Total: {}\nChoose payment method", catalog.price(total));
    let choices: Vec<Choice> = methods
        .iter()
        .map(|m| Choice::new(m.id.as_str(), m.label.as_str()))
        .collect();

    if choices.len() <= MAX_BUTTONS {
        OutboundMessage::buttons(body, choices)
    } else {
        OutboundMessage::list(
            body,
            "Pay with",
            vec![ListSection {
                title: "Payment".to_string(),
                rows: choices,
            }],
        )
    }
}

pub fn confirmation(catalog: &Catalog, order_id: &str, total: u64) -> OutboundMessage {
    OutboundMessage::text(format!(
        "🎉 Order Confirmed!\nOrder ID: {}\nTotal: {}\nYour food is being prepared 🍳",
        order_id,
        catalog.price(total)
    ))
}

/// Prefix a notice (error or status line) to a prompt, keeping its choices
pub fn with_notice(message: OutboundMessage, notice: &str) -> OutboundMessage {
    let prefixed = |body: String| format!("{}\n\n{}", notice, body);
    match message {
        OutboundMessage::Text { body } => OutboundMessage::Text {
            body: prefixed(body),
        },
        OutboundMessage::Buttons { body, choices } => OutboundMessage::Buttons {
            body: prefixed(body),
            choices,
        },
        OutboundMessage::List {
            body,
            button,
            sections,
        } => OutboundMessage::List {
            body: prefixed(body),
            button,
            sections,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CheckoutConfig, MenuConfig};
    use sdk::MenuItem;

    fn catalog() -> Catalog {
        Catalog::from_config(&MenuConfig::default()).unwrap()
    }

    #[test]
    fn test_cart_shows_recomputed_total() {
        let mut line = CartLine::from_item(&MenuItem::new("paneer_tikka", "Paneer Tikka", 160));
        line.quantity = 2;
        let coke = CartLine::from_item(&MenuItem::new("coke", "Coca Cola", 50));
        let msg = cart(&catalog(), &[line, coke]);

        assert!(msg.body().contains("Paneer Tikka x2 = ₹320"));
        assert!(msg.body().ends_with("Total: ₹370"));
        assert!(msg.offers("remove"));
    }

    #[test]
    fn test_remove_list_uses_zero_based_ids() {
        let lines = vec![
            CartLine::from_item(&MenuItem::new("a", "A", 1)),
            CartLine::from_item(&MenuItem::new("b", "B", 2)),
        ];
        let msg = remove_list(&lines);
        assert!(msg.offers("0"));
        assert!(msg.offers("1"));
        assert!(!msg.offers("2"));
    }

    #[test]
    fn test_payment_switches_to_list_past_three_methods() {
        let mut methods = CheckoutConfig::default().payment_methods;
        assert!(matches!(
            payment(&catalog(), 100, &methods),
            OutboundMessage::Buttons { .. }
        ));

        for id in ["card", "wallet"] {
            methods.push(PaymentMethodConfig {
                id: id.to_string(),
                label: id.to_string(),
            });
        }
        assert!(matches!(
            payment(&catalog(), 100, &methods),
            OutboundMessage::List { .. }
        ));
    }

    #[test]
    fn test_with_notice_keeps_choices() {
        let msg = with_notice(what_next(), "❌ Oops");
        assert!(msg.body().starts_with("❌ Oops\n\n"));
        assert_eq!(msg.choices().len(), 3);
    }
}
