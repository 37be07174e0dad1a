use tracing::{debug, info};

use crate::models::{
    cart::{Cart, CartLineId},
    menu_item::MenuItem,
    product::{Catalog, CatalogError},
};
use crate::services::data_source::DataSource;
use crate::utils::config::Settings;

/// The running menu: one [`MenuItem`] per product plus the cart.
pub struct App {
    menu: Vec<MenuItem>,
    cart: Cart,
}

impl App {
    pub fn init(settings: &Settings, data_source: &dyn DataSource) -> Result<Self, CatalogError> {
        info!("Loading menu from {}", data_source.describe());
        let catalog = data_source.load()?;

        let menu = Self::init_menu(catalog, settings);
        let cart = Self::init_cart(settings);

        info!("Menu ready with {} products", menu.len());
        Ok(Self { menu, cart })
    }

    fn init_menu(catalog: Catalog, settings: &Settings) -> Vec<MenuItem> {
        catalog
            .products
            .into_iter()
            .map(|definition| MenuItem::new(definition, settings.amount))
            .collect()
    }

    fn init_cart(settings: &Settings) -> Cart {
        Cart::new(settings.delivery_fee, settings.amount)
    }

    pub fn menu(&self) -> &[MenuItem] {
        &self.menu
    }

    pub fn menu_item(&self, product_id: &str) -> Option<&MenuItem> {
        self.menu.iter().find(|item| item.id() == product_id)
    }

    pub fn menu_item_mut(&mut self, product_id: &str) -> Option<&mut MenuItem> {
        self.menu.iter_mut().find(|item| item.id() == product_id)
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn cart_mut(&mut self) -> &mut Cart {
        &mut self.cart
    }

    /// Expand one menu item and collapse all others. Toggling the expanded
    /// item collapses it. Returns whether the item ends up active.
    pub fn toggle_active(&mut self, product_id: &str) -> Option<bool> {
        self.menu.iter().find(|item| item.id() == product_id)?;

        let mut now_active = false;
        for item in &mut self.menu {
            if item.id() == product_id {
                now_active = !item.is_active();
                item.set_active(now_active);
            } else {
                item.set_active(false);
            }
        }

        debug!("Menu item '{}' active: {}", product_id, now_active);
        Some(now_active)
    }

    pub fn active_item(&self) -> Option<&MenuItem> {
        self.menu.iter().find(|item| item.is_active())
    }

    /// Push the current order of a menu item into the cart.
    pub fn add_to_cart(&mut self, product_id: &str) -> Option<CartLineId> {
        let item = self.menu.iter_mut().find(|item| item.id() == product_id)?;
        Some(item.add_to_cart(&mut self.cart))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::data_source::EmbeddedDataSource;

    fn app() -> App {
        App::init(&Settings::default(), &EmbeddedDataSource).unwrap()
    }

    #[test]
    fn test_one_menu_item_per_product_in_order() {
        let app = app();
        let ids: Vec<_> = app.menu().iter().map(MenuItem::id).collect();
        assert_eq!(ids, vec!["cake", "breakfast", "pizza", "salad"]);
        assert!(app.cart().is_empty());
    }

    #[test]
    fn test_accordion_keeps_one_item_open() {
        let mut app = app();
        assert_eq!(app.toggle_active("pizza"), Some(true));
        assert_eq!(app.toggle_active("salad"), Some(true));
        assert_eq!(app.active_item().map(MenuItem::id), Some("salad"));
        assert!(!app.menu_item("pizza").unwrap().is_active());

        assert_eq!(app.toggle_active("salad"), Some(false));
        assert!(app.active_item().is_none());
        assert_eq!(app.toggle_active("soup"), None);
    }

    #[test]
    fn test_add_to_cart_by_product_id() {
        let mut app = app();
        let line = app.add_to_cart("cake").unwrap();
        assert_eq!(app.cart().line(line).unwrap().name(), "Zio Stefano's Doughnut");
        assert_eq!(app.cart().totals().total_price, 29.0);
        assert!(app.add_to_cart("soup").is_none());
    }
}
