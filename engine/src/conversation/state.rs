//! Conversation states

use serde::Serialize;

/// Where a user is in the ordering flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationState {
    /// First contact or just finished an order
    Welcome,
    /// Top-level menu / reserve / cart prompt shown
    Home,
    /// Category list shown
    Category,
    /// Item list of the chosen category shown
    ItemSelect,
    /// Adjusting the quantity of the active cart line
    Quantity,
    /// "What next" prompt shown
    CartAction,
    /// Cart contents shown
    CartView,
    /// Indexed cart lines shown for removal
    RemoveItem,
    /// Asking dine-in or delivery
    OrderType,
    /// Asking the customer's name
    CustomerName,
    /// Asking table number or address
    Location,
    /// Payment method prompt shown
    Payment,
}

impl ConversationState {
    pub fn as_str(&self) -> &str {
        match self {
            ConversationState::Welcome => "welcome",
            ConversationState::Home => "home",
            ConversationState::Category => "category",
            ConversationState::ItemSelect => "item_select",
            ConversationState::Quantity => "quantity",
            ConversationState::CartAction => "cart_action",
            ConversationState::CartView => "cart_view",
            ConversationState::RemoveItem => "remove_item",
            ConversationState::OrderType => "order_type",
            ConversationState::CustomerName => "customer_name",
            ConversationState::Location => "location",
            ConversationState::Payment => "payment",
        }
    }
}

impl std::fmt::Display for ConversationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
