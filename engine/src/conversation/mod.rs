//! Conversation State Machine
//!
//! Turns one inbound message into one outbound reply by advancing a user's
//! `Session`. Handlers return `Result`; lookup and input errors are turned
//! back into a re-prompt by `recover`, so a bad message never moves the user
//! out of the state they were in.

use sdk::errors::{BotError, BotErrorExt};
use sdk::{CartLine, Choice, OrderDraft, OrderRecord, OrderType, OutboundMessage};
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::catalog::Catalog;
use crate::config::{CheckoutConfig, PaymentMethodConfig};
use crate::orders::OrderRecorder;
use crate::session::Session;

pub mod prompts;
pub mod state;

pub use state::ConversationState;

const GREETINGS: &[&str] = &["hi", "hello", "hey"];

/// Lowercase and trim raw message text
pub fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Drives sessions through the ordering flow
pub struct Conversation {
    catalog: Arc<Catalog>,
    recorder: Arc<dyn OrderRecorder>,
    checkout: CheckoutConfig,
}

impl Conversation {
    pub fn new(
        catalog: Arc<Catalog>,
        recorder: Arc<dyn OrderRecorder>,
        checkout: CheckoutConfig,
    ) -> Self {
        Self {
            catalog,
            recorder,
            checkout,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Apply one message to the session and return the reply.
    ///
    /// The caller must hold the session's lock for the whole call.
    pub async fn step(&self, session: &mut Session, raw: &str) -> OutboundMessage {
        session.touch();
        let input = normalize(raw);

        if GREETINGS.contains(&input.as_str()) {
            session.state = ConversationState::Home;
            return prompts::home();
        }

        let from = session.state;
        let result = self.dispatch(session, raw.trim(), &input).await;
        let reply = match result {
            Ok(reply) => reply,
            Err(err) => self.recover(session, &input, err),
        };

        if session.state != from {
            debug!(
                "Session {} moved {} -> {}",
                session.user_id, from, session.state
            );
        }
        reply
    }

    async fn dispatch(
        &self,
        session: &mut Session,
        raw: &str,
        input: &str,
    ) -> Result<OutboundMessage, BotError> {
        let resolved = self.resolve_choice(session, input);
        let input = resolved.as_deref().unwrap_or(input);

        match session.state {
            ConversationState::Welcome => {
                session.state = ConversationState::Home;
                Ok(prompts::home())
            }
            ConversationState::Home => self.on_home(session, input),
            ConversationState::Category => self.on_category(session, input),
            ConversationState::ItemSelect => self.on_item_select(session, input),
            ConversationState::Quantity => self.on_quantity(session, input),
            ConversationState::CartAction | ConversationState::CartView => {
                self.on_cart_action(session, input)
            }
            ConversationState::RemoveItem => self.on_remove_item(session, input),
            ConversationState::OrderType => self.on_order_type(session, input),
            ConversationState::CustomerName => self.on_customer_name(session, raw),
            ConversationState::Location => self.on_location(session, raw),
            ConversationState::Payment => self.on_payment(session, input).await,
        }
    }

    /// Choices the current state offers, so a tapped label maps to its id
    fn offered_choices(&self, session: &Session) -> Vec<Choice> {
        let offered: Vec<OutboundMessage> = match session.state {
            ConversationState::Home => vec![prompts::home()],
            ConversationState::Category => vec![prompts::category_list(&self.catalog)],
            ConversationState::ItemSelect => session
                .category
                .as_deref()
                .and_then(|key| self.catalog.category(key).ok())
                .map(|category| prompts::item_list(&self.catalog, category))
                .into_iter()
                .collect(),
            ConversationState::Quantity => {
                return prompts::quantity_choices();
            }
            ConversationState::CartAction | ConversationState::CartView => vec![
                prompts::what_next(),
                prompts::cart(&self.catalog, &session.cart),
            ],
            ConversationState::RemoveItem => vec![prompts::remove_list(&session.cart)],
            ConversationState::OrderType => vec![prompts::order_type()],
            ConversationState::Payment => vec![prompts::payment(
                &self.catalog,
                session.total(),
                &self.checkout.payment_methods,
            )],
            ConversationState::Welcome
            | ConversationState::CustomerName
            | ConversationState::Location => Vec::new(),
        };
        offered
            .iter()
            .flat_map(|p| p.choices())
            .cloned()
            .collect()
    }

    fn resolve_choice(&self, session: &Session, input: &str) -> Option<String> {
        self.offered_choices(session)
            .into_iter()
            .find(|c| c.matches(input))
            .map(|c| c.id)
    }

    fn on_home(&self, session: &mut Session, input: &str) -> Result<OutboundMessage, BotError> {
        match input {
            "menu" => {
                session.state = ConversationState::Category;
                Ok(prompts::category_list(&self.catalog))
            }
            "reserve" | "reserve table" => Ok(prompts::reservation()),
            "cart" | "view cart" | "view_cart" => {
                session.state = ConversationState::CartView;
                Ok(prompts::cart(&self.catalog, &session.cart))
            }
            _ => Err(BotError::InvalidInput(input.to_string())),
        }
    }

    fn on_category(&self, session: &mut Session, input: &str) -> Result<OutboundMessage, BotError> {
        let category = self.catalog.category(input)?;
        session.category = Some(category.key.clone());
        session.state = ConversationState::ItemSelect;
        Ok(prompts::item_list(&self.catalog, category))
    }

    fn on_item_select(
        &self,
        session: &mut Session,
        input: &str,
    ) -> Result<OutboundMessage, BotError> {
        let category = session
            .category
            .as_deref()
            .ok_or_else(|| BotError::NotFound("no category selected".to_string()))?;
        let item = self.catalog.find_in(category, input)?.clone();

        let line = CartLine::from_item(&item);
        let reply = prompts::item_added(&line);
        session.cart.push(line);
        session.active_line = Some(session.cart.len() - 1);
        session.last_selected_item = Some(item);
        session.state = ConversationState::Quantity;
        Ok(reply)
    }

    fn on_quantity(&self, session: &mut Session, input: &str) -> Result<OutboundMessage, BotError> {
        let increment = match input {
            "qty1" | "+1" => 1,
            "qty2" | "+2" => 2,
            "done_qty" | "done" => {
                session.state = ConversationState::CartAction;
                return Ok(prompts::what_next());
            }
            _ => return Err(BotError::InvalidInput(input.to_string())),
        };

        let line = session
            .active_line_mut()
            .ok_or_else(|| BotError::InvalidInput("no active cart line".to_string()))?;
        line.quantity = line.quantity.saturating_add(increment);
        Ok(prompts::quantity(line))
    }

    fn on_cart_action(
        &self,
        session: &mut Session,
        input: &str,
    ) -> Result<OutboundMessage, BotError> {
        match input {
            "menu" | "add more" | "add_more" => {
                session.state = ConversationState::Category;
                Ok(prompts::category_list(&self.catalog))
            }
            "cart" | "view cart" | "view_cart" => {
                session.state = ConversationState::CartView;
                Ok(prompts::cart(&self.catalog, &session.cart))
            }
            "remove" | "remove item" | "remove_item" => {
                if session.cart.is_empty() {
                    return Ok(prompts::empty_cart());
                }
                session.state = ConversationState::RemoveItem;
                Ok(prompts::remove_list(&session.cart))
            }
            "checkout" => {
                if session.cart.is_empty() {
                    debug!("Checkout rejected for {}: cart is empty", session.user_id);
                    return Ok(prompts::empty_cart());
                }
                Ok(self.begin_checkout(session))
            }
            _ => Err(BotError::InvalidInput(input.to_string())),
        }
    }

    fn begin_checkout(&self, session: &mut Session) -> OutboundMessage {
        session.draft = OrderDraft {
            phone: Some(session.user_id.clone()),
            ..Default::default()
        };
        session.active_line = None;

        if self.checkout.collect_details {
            session.state = ConversationState::OrderType;
            prompts::order_type()
        } else {
            self.to_payment(session)
        }
    }

    fn to_payment(&self, session: &mut Session) -> OutboundMessage {
        session.state = ConversationState::Payment;
        prompts::payment(&self.catalog, session.total(), &self.checkout.payment_methods)
    }

    fn on_remove_item(
        &self,
        session: &mut Session,
        input: &str,
    ) -> Result<OutboundMessage, BotError> {
        let idx = input
            .parse::<usize>()
            .ok()
            .filter(|idx| idx.to_string() == input && *idx < session.cart.len())
            .ok_or_else(|| BotError::NotFound(format!("cart line '{}'", input)))?;

        let removed = session.cart.remove(idx);
        session.active_line = None;
        session.state = ConversationState::CartAction;
        Ok(prompts::removed(&self.catalog, &removed, &session.cart))
    }

    fn on_order_type(
        &self,
        session: &mut Session,
        input: &str,
    ) -> Result<OutboundMessage, BotError> {
        let order_type = OrderType::parse(input)
            .ok_or_else(|| BotError::InvalidInput(format!("order type '{}'", input)))?;
        session.draft.order_type = Some(order_type);
        session.state = ConversationState::CustomerName;
        Ok(prompts::customer_name())
    }

    fn on_customer_name(
        &self,
        session: &mut Session,
        raw: &str,
    ) -> Result<OutboundMessage, BotError> {
        if raw.is_empty() {
            return Err(BotError::InvalidInput("empty name".to_string()));
        }
        session.draft.customer_name = Some(raw.to_string());
        session.state = ConversationState::Location;
        Ok(prompts::location(session.draft.order_type))
    }

    fn on_location(&self, session: &mut Session, raw: &str) -> Result<OutboundMessage, BotError> {
        let location = match session.draft.order_type {
            Some(OrderType::Delivery) => {
                if raw.is_empty() {
                    return Err(BotError::InvalidInput("empty address".to_string()));
                }
                raw.to_string()
            }
            _ => match raw.parse::<u32>() {
                Ok(table) if table > 0 => table.to_string(),
                _ => return Err(BotError::InvalidInput(format!("table number '{}'", raw))),
            },
        };
        session.draft.location = Some(location);
        Ok(self.to_payment(session))
    }

    fn payment_method(&self, input: &str) -> Option<&PaymentMethodConfig> {
        self.checkout
            .payment_methods
            .iter()
            .find(|m| m.id == input || m.label.to_lowercase() == input)
    }

    async fn on_payment(
        &self,
        session: &mut Session,
        input: &str,
    ) -> Result<OutboundMessage, BotError> {
        let method = self
            .payment_method(input)
            .ok_or_else(|| BotError::InvalidInput(format!("payment method '{}'", input)))?;

        if session.cart.is_empty() {
            session.state = ConversationState::CartView;
            return Ok(prompts::empty_cart());
        }

        session.draft.payment_method = Some(method.id.clone());
        let record = OrderRecord::assemble(
            session.user_id.clone(),
            session.cart.clone(),
            &session.draft,
            method.id.clone(),
        );
        let total = record.total;

        let order_id = self.recorder.save(record).await.map_err(|e| {
            error!(
                "Failed to save order for {} via {}: {}",
                session.user_id,
                self.recorder.name(),
                e
            );
            e
        })?;

        info!(
            "Order {} confirmed for {} (total {}, {})",
            order_id, session.user_id, total, method.id
        );
        session.reset();
        Ok(prompts::confirmation(&self.catalog, &order_id, total))
    }

    /// Turn a handler error into a reply. State is left as it was.
    fn recover(&self, session: &Session, input: &str, err: BotError) -> OutboundMessage {
        debug!(
            "Unhandled input {:?} from {} in {}: {}",
            input, session.user_id, session.state, err
        );

        match (&err, session.state) {
            (BotError::NotFound(_), ConversationState::Category) => {
                prompts::with_notice(prompts::category_list(&self.catalog), "❌ Unknown category")
            }
            (BotError::NotFound(_), ConversationState::ItemSelect) => {
                let listing = session
                    .category
                    .as_deref()
                    .and_then(|key| self.catalog.category(key).ok())
                    .map(|category| prompts::item_list(&self.catalog, category))
                    .unwrap_or_else(|| prompts::category_list(&self.catalog));
                prompts::with_notice(listing, "❌ Invalid item")
            }
            (BotError::NotFound(_), ConversationState::RemoveItem) => {
                prompts::with_notice(prompts::remove_list(&session.cart), "❌ Invalid selection")
            }
            (BotError::InvalidInput(_), ConversationState::OrderType) => {
                prompts::with_notice(prompts::order_type(), err.user_hint())
            }
            (BotError::InvalidInput(_), ConversationState::CustomerName) => {
                prompts::with_notice(prompts::customer_name(), "❌ Please type your name")
            }
            (BotError::InvalidInput(_), ConversationState::Location) => prompts::with_notice(
                prompts::location(session.draft.order_type),
                "❌ That doesn't look right",
            ),
            (
                BotError::Storage(_) | BotError::Io(_) | BotError::Serialization(_),
                ConversationState::Payment,
            ) => prompts::with_notice(
                prompts::payment(&self.catalog, session.total(), &self.checkout.payment_methods),
                err.user_hint(),
            ),
            _ => OutboundMessage::text(err.user_hint()),
        }
    }
}
