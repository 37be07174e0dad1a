use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::menu_item::{CartLineRequest, SelectedParam};
use crate::models::quantity::{AmountSettings, QuantityControl, QuantityUpdated};
use crate::utils::formatting::Templates;

pub type CartLineId = Uuid;

/// Anything a menu item can push its order snapshot into.
pub trait CartSink {
    fn add(&mut self, request: CartLineRequest) -> CartLineId;
}

/// User actions on a line inside the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartLineAction {
    SetAmount(String),
    Increase,
    Decrease,
    Edit,
    Remove,
}

/// What a line reports back to the cart that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartLineEvent {
    Updated(CartLineId),
    Remove(CartLineId),
}

#[derive(Debug, Clone)]
pub struct CartLine {
    line_id: CartLineId,
    product_id: String,
    name: String,
    quantity: QuantityControl,
    unit_price: f64,
    line_price: f64,
    selections: Vec<SelectedParam>,
}

impl CartLine {
    fn new(line_id: CartLineId, request: CartLineRequest, amount: AmountSettings) -> Self {
        // The rendered line starts with the snapshot's amount in its input.
        let quantity = QuantityControl::with_input(amount, &request.quantity.to_string());
        let line_price = request.unit_price * f64::from(quantity.value());

        Self {
            line_id,
            product_id: request.id,
            name: request.name,
            quantity,
            unit_price: request.unit_price,
            line_price,
            selections: request.selections,
        }
    }

    pub fn line_id(&self) -> CartLineId {
        self.line_id
    }

    pub fn product_id(&self) -> &str {
        &self.product_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn amount(&self) -> u32 {
        self.quantity.value()
    }

    pub fn quantity(&self) -> &QuantityControl {
        &self.quantity
    }

    pub fn unit_price(&self) -> f64 {
        self.unit_price
    }

    pub fn line_price(&self) -> f64 {
        self.line_price
    }

    pub fn selections(&self) -> &[SelectedParam] {
        &self.selections
    }

    pub fn render(&self, templates: &dyn Templates) -> String {
        templates.cart_product(self)
    }

    pub fn handle(&mut self, action: CartLineAction) -> Option<CartLineEvent> {
        match action {
            CartLineAction::SetAmount(raw) => {
                let event = self.quantity.set_raw(&raw);
                event.map(|e| self.on_quantity_updated(e))
            }
            CartLineAction::Increase => {
                let event = self.quantity.increment();
                event.map(|e| self.on_quantity_updated(e))
            }
            CartLineAction::Decrease => {
                let event = self.quantity.decrement();
                event.map(|e| self.on_quantity_updated(e))
            }
            CartLineAction::Edit => self.edit(),
            CartLineAction::Remove => Some(self.request_removal()),
        }
    }

    fn on_quantity_updated(&mut self, event: QuantityUpdated) -> CartLineEvent {
        self.line_price = self.unit_price * f64::from(event.value);
        debug!(
            "Cart line '{}' now {} x {} = {}",
            self.name, event.value, self.unit_price, self.line_price
        );
        CartLineEvent::Updated(self.line_id)
    }

    /// Editing a line from the cart is not supported; the action is accepted and ignored.
    pub fn edit(&self) -> Option<CartLineEvent> {
        None
    }

    pub fn request_removal(&self) -> CartLineEvent {
        CartLineEvent::Remove(self.line_id)
    }
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Default)]
pub struct CartTotals {
    pub total_number: u64,
    pub subtotal_price: f64,
    pub delivery_fee: f64,
    pub total_price: f64,
}

/// Contact fields of the cart's order form. Nothing validates or sends them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CheckoutForm {
    pub phone: String,
    pub address: String,
}

#[derive(Debug, Clone)]
pub struct Cart {
    lines: Vec<CartLine>,
    delivery_fee: f64,
    amount: AmountSettings,
    totals: CartTotals,
    expanded: bool,
    checkout: CheckoutForm,
}

impl Cart {
    pub fn new(delivery_fee: f64, amount: AmountSettings) -> Self {
        Self {
            lines: Vec::new(),
            delivery_fee,
            amount,
            totals: CartTotals::default(),
            expanded: false,
            checkout: CheckoutForm::default(),
        }
    }

    pub fn add(&mut self, request: CartLineRequest) -> CartLineId {
        let line = CartLine::new(Uuid::new_v4(), request, self.amount);
        let line_id = line.line_id();
        info!(
            "Cart: added {} x '{}' as line {}",
            line.amount(),
            line.name(),
            line_id
        );

        self.lines.push(line);
        self.update();
        line_id
    }

    /// Remove a line. Unknown ids leave the cart untouched.
    pub fn remove(&mut self, line_id: CartLineId) -> bool {
        let Some(index) = self.lines.iter().position(|line| line.line_id() == line_id) else {
            warn!("Cart: line {} is not in the cart, nothing removed", line_id);
            return false;
        };

        let line = self.lines.remove(index);
        info!("Cart: removed '{}' (line {})", line.name(), line_id);
        self.update();
        true
    }

    /// Forward a user action to one line and react to what it reports.
    /// Returns `false` when no line has that id.
    pub fn apply(&mut self, line_id: CartLineId, action: CartLineAction) -> bool {
        let Some(line) = self.lines.iter_mut().find(|line| line.line_id() == line_id) else {
            warn!("Cart: no line {} for action {:?}", line_id, action);
            return false;
        };

        if let Some(event) = line.handle(action) {
            self.dispatch(event);
        }
        true
    }

    pub fn dispatch(&mut self, event: CartLineEvent) {
        match event {
            CartLineEvent::Updated(_) => {
                self.update();
            }
            CartLineEvent::Remove(line_id) => {
                self.remove(line_id);
            }
        }
    }

    /// Recompute the totals. The delivery fee is only charged for a non-empty cart.
    pub fn update(&mut self) -> CartTotals {
        let (total_number, subtotal_price) = self
            .lines
            .iter()
            .fold((0u64, 0.0), |(number, price), line| {
                (number + u64::from(line.amount()), price + line.line_price())
            });

        let delivery_fee = if total_number > 0 { self.delivery_fee } else { 0.0 };
        let total_price = if total_number > 0 {
            subtotal_price + delivery_fee
        } else {
            0.0
        };

        self.totals = CartTotals {
            total_number,
            subtotal_price,
            delivery_fee,
            total_price,
        };
        debug!(
            "Cart totals: {}",
            serde_json::to_string(&self.totals).unwrap_or_else(|_| format!("{:?}", self.totals))
        );
        self.totals
    }

    pub fn totals(&self) -> CartTotals {
        self.totals
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line(&self, line_id: CartLineId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.line_id() == line_id)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn delivery_fee(&self) -> f64 {
        self.delivery_fee
    }

    pub fn toggle(&mut self) -> bool {
        self.expanded = !self.expanded;
        self.expanded
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn checkout(&self) -> &CheckoutForm {
        &self.checkout
    }

    pub fn checkout_mut(&mut self) -> &mut CheckoutForm {
        &mut self.checkout
    }

    /// Order submission is not wired to anything; the form is left as is.
    pub fn submit_order(&self) {
        info!(
            "Cart: order submission requested for {} items, not sent anywhere",
            self.totals.total_number
        );
    }
}

impl CartSink for Cart {
    fn add(&mut self, request: CartLineRequest) -> CartLineId {
        Cart::add(self, request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, quantity: u32, unit_price: f64) -> CartLineRequest {
        CartLineRequest {
            id: name.to_lowercase(),
            name: name.to_string(),
            quantity,
            unit_price,
            line_price: unit_price * f64::from(quantity),
            selections: vec![SelectedParam {
                label: "Sauce".to_string(),
                options: vec!["Tomato".to_string()],
            }],
        }
    }

    fn cart() -> Cart {
        Cart::new(20.0, AmountSettings::default())
    }

    #[test]
    fn test_empty_cart_has_zero_totals() {
        let mut cart = cart();
        assert_eq!(cart.update(), CartTotals::default());
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_appends_in_order_and_charges_delivery() {
        let mut cart = cart();
        let first = cart.add(request("Pizza", 2, 25.0));
        let second = cart.add(request("Salad", 1, 9.0));

        let ids: Vec<_> = cart.lines().iter().map(CartLine::line_id).collect();
        assert_eq!(ids, vec![first, second]);
        assert_eq!(
            cart.totals(),
            CartTotals {
                total_number: 3,
                subtotal_price: 59.0,
                delivery_fee: 20.0,
                total_price: 79.0,
            }
        );
    }

    #[test]
    fn test_totals_serialize_as_json() {
        let mut cart = cart();
        cart.add(request("Pizza", 2, 25.0));

        let json = serde_json::to_value(cart.totals()).unwrap();
        assert_eq!(json["total_number"], 2);
        assert_eq!(json["subtotal_price"], 50.0);
        assert_eq!(json["total_price"], 70.0);
    }

    #[test]
    fn test_same_product_twice_gives_two_lines() {
        let mut cart = cart();
        let first = cart.add(request("Pizza", 1, 20.0));
        let second = cart.add(request("Pizza", 1, 20.0));
        assert_ne!(first, second);
        assert_eq!(cart.len(), 2);
    }

    #[test]
    fn test_line_amount_change_updates_totals() {
        let mut cart = cart();
        let line = cart.add(request("Pizza", 2, 25.0));

        assert!(cart.apply(line, CartLineAction::SetAmount("3".to_string())));
        assert_eq!(cart.line(line).unwrap().line_price(), 75.0);
        assert_eq!(cart.totals().subtotal_price, 75.0);
        assert_eq!(cart.totals().total_price, 95.0);

        assert!(cart.apply(line, CartLineAction::Increase));
        assert_eq!(cart.totals().total_number, 4);
        assert!(cart.apply(line, CartLineAction::Decrease));
        assert_eq!(cart.totals().total_number, 3);
    }

    #[test]
    fn test_invalid_line_amount_keeps_totals() {
        let mut cart = cart();
        let line = cart.add(request("Pizza", 2, 25.0));
        let before = cart.totals();

        cart.apply(line, CartLineAction::SetAmount("0".to_string()));
        cart.apply(line, CartLineAction::SetAmount("many".to_string()));
        assert_eq!(cart.totals(), before);
        assert_eq!(cart.line(line).unwrap().quantity().input(), "2");
    }

    #[test]
    fn test_remove_action_drops_line_and_fee() {
        let mut cart = cart();
        let line = cart.add(request("Pizza", 1, 20.0));

        assert!(cart.apply(line, CartLineAction::Remove));
        assert!(cart.is_empty());
        assert_eq!(cart.totals(), CartTotals::default());
    }

    #[test]
    fn test_removing_unknown_line_changes_nothing() {
        let mut cart = cart();
        cart.add(request("Pizza", 1, 20.0));
        let before = cart.totals();

        assert!(!cart.remove(Uuid::new_v4()));
        assert!(!cart.apply(Uuid::new_v4(), CartLineAction::Increase));
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.totals(), before);
    }

    #[test]
    fn test_edit_is_a_no_op() {
        let mut cart = cart();
        let line = cart.add(request("Pizza", 2, 20.0));
        let before = cart.totals();

        assert!(cart.apply(line, CartLineAction::Edit));
        assert_eq!(cart.totals(), before);
        assert_eq!(cart.line(line).unwrap().amount(), 2);
    }

    #[test]
    fn test_line_keeps_its_snapshot() {
        let mut cart = cart();
        let line = cart.add(request("Pizza", 2, 25.0));
        let line = cart.line(line).unwrap();

        assert_eq!(line.product_id(), "pizza");
        assert_eq!(line.unit_price(), 25.0);
        assert_eq!(line.line_price(), 50.0);
        assert_eq!(line.selections()[0].options, vec!["Tomato".to_string()]);
    }

    #[test]
    fn test_toggle_and_checkout_stub() {
        let mut cart = cart();
        assert!(cart.toggle());
        assert!(!cart.toggle());

        cart.checkout_mut().phone = "555-0100".to_string();
        cart.submit_order();
        assert_eq!(cart.checkout().phone, "555-0100");
    }
}
