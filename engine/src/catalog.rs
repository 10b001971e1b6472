//! Menu Catalog
//!
//! Read-only category → items mapping, built once from `[menu]` config and
//! shared by every conversation.

use sdk::errors::BotError;
use sdk::MenuItem;
use std::collections::HashSet;

use crate::config::MenuConfig;

/// A menu category with its items in display order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub key: String,
    pub title: String,
    pub items: Vec<MenuItem>,
}

/// The restaurant menu
#[derive(Debug, Clone)]
pub struct Catalog {
    categories: Vec<Category>,
    currency_symbol: String,
}

impl Catalog {
    /// Build and validate a catalog from config
    ///
    /// Keys and ids are normalized to lowercase so they match normalized
    /// user input.
    ///
    /// # Errors
    ///
    /// Returns `BotError::Config` for an empty menu, empty categories,
    /// duplicate category keys or item ids, and zero prices.
    pub fn from_config(menu: &MenuConfig) -> Result<Self, BotError> {
        if menu.categories.is_empty() {
            return Err(BotError::Config("menu has no categories".to_string()));
        }

        let mut keys = HashSet::new();
        let mut ids = HashSet::new();
        let mut categories = Vec::with_capacity(menu.categories.len());

        for cat in &menu.categories {
            let key = cat.key.trim().to_lowercase();
            if key.is_empty() || !keys.insert(key.clone()) {
                return Err(BotError::Config(format!(
                    "Invalid or duplicate category key '{}'",
                    cat.key
                )));
            }
            if cat.items.is_empty() {
                return Err(BotError::Config(format!("Category '{}' has no items", key)));
            }

            let mut items = Vec::with_capacity(cat.items.len());
            for item in &cat.items {
                let id = item.id.trim().to_lowercase();
                if id.is_empty() || !ids.insert(id.clone()) {
                    return Err(BotError::Config(format!(
                        "Invalid or duplicate item id '{}'",
                        item.id
                    )));
                }
                if item.price == 0 {
                    return Err(BotError::Config(format!("Item '{}' has no price", id)));
                }
                items.push(MenuItem::new(id, item.name.clone(), item.price));
            }

            categories.push(Category {
                key,
                title: cat.title.clone(),
                items,
            });
        }

        Ok(Self {
            categories,
            currency_symbol: menu.currency_symbol.clone(),
        })
    }

    /// Ordered category keys
    pub fn categories(&self) -> Vec<&str> {
        self.categories.iter().map(|c| c.key.as_str()).collect()
    }

    /// Iterate over full categories in display order
    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter()
    }

    pub fn category(&self, key: &str) -> Result<&Category, BotError> {
        self.categories
            .iter()
            .find(|c| c.key == key)
            .ok_or_else(|| BotError::NotFound(format!("category '{}'", key)))
    }

    /// Items of a category in display order
    pub fn items_in(&self, category: &str) -> Result<&[MenuItem], BotError> {
        self.category(category).map(|c| c.items.as_slice())
    }

    /// Look up an item anywhere on the menu
    pub fn find_by_id(&self, item_id: &str) -> Result<&MenuItem, BotError> {
        self.categories
            .iter()
            .flat_map(|c| c.items.iter())
            .find(|i| i.id == item_id)
            .ok_or_else(|| BotError::NotFound(format!("item '{}'", item_id)))
    }

    /// Look up an item restricted to one category
    pub fn find_in(&self, category: &str, item_id: &str) -> Result<&MenuItem, BotError> {
        self.items_in(category)?
            .iter()
            .find(|i| i.id == item_id)
            .ok_or_else(|| BotError::NotFound(format!("item '{}' in '{}'", item_id, category)))
    }

    /// Format an amount with the configured currency symbol
    pub fn price(&self, amount: u64) -> String {
        format!("{}{}", self.currency_symbol, amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CategoryConfig, MenuConfig};

    fn catalog() -> Catalog {
        Catalog::from_config(&MenuConfig::default()).unwrap()
    }

    #[test]
    fn test_default_categories_in_order() {
        assert_eq!(
            catalog().categories(),
            vec!["starters", "main_course", "desserts", "drinks"]
        );
    }

    #[test]
    fn test_items_in_category() {
        let cat = catalog();
        let starters = cat.items_in("starters").unwrap();
        assert_eq!(starters.len(), 3);
        assert_eq!(starters[2].id, "paneer_tikka");
        assert_eq!(starters[2].price, 160);
    }

    #[test]
    fn test_unknown_category_is_not_found() {
        assert!(matches!(
            catalog().items_in("pizza"),
            Err(BotError::NotFound(_))
        ));
    }

    #[test]
    fn test_find_by_id() {
        let cat = catalog();
        assert_eq!(cat.find_by_id("coke").unwrap().name, "Coca Cola");
        assert!(matches!(cat.find_by_id("naan"), Err(BotError::NotFound(_))));
    }

    #[test]
    fn test_find_in_is_category_restricted() {
        let cat = catalog();
        assert!(cat.find_in("starters", "paneer_tikka").is_ok());
        assert!(matches!(
            cat.find_in("drinks", "paneer_tikka"),
            Err(BotError::NotFound(_))
        ));
    }

    #[test]
    fn test_price_formatting() {
        assert_eq!(catalog().price(320), "₹320");
    }

    #[test]
    fn test_duplicate_item_ids_rejected() {
        let menu = MenuConfig {
            currency_symbol: "$".to_string(),
            categories: vec![
                CategoryConfig {
                    key: "a".to_string(),
                    title: "A".to_string(),
                    items: vec![MenuItem::new("x", "X", 1)],
                },
                CategoryConfig {
                    key: "b".to_string(),
                    title: "B".to_string(),
                    items: vec![MenuItem::new("X", "X again", 2)],
                },
            ],
        };
        assert!(matches!(Catalog::from_config(&menu), Err(BotError::Config(_))));
    }

    #[test]
    fn test_empty_menu_rejected() {
        let menu = MenuConfig {
            currency_symbol: "$".to_string(),
            categories: Vec::new(),
        };
        assert!(Catalog::from_config(&menu).is_err());
    }
}
