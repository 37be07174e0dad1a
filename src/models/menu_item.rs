use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::models::cart::{CartLineId, CartSink};
use crate::models::product::ProductDefinition;
use crate::models::quantity::{AmountSettings, QuantityControl, QuantityUpdated};
use crate::utils::formatting::Templates;

/// Serialized order form: option group id -> option ids present in the form.
pub type FormData = BTreeMap<String, Vec<String>>;

/// Labels of the options chosen in one group, frozen at add-to-cart time.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SelectedParam {
    pub label: String,
    pub options: Vec<String>,
}

/// Snapshot a menu item hands to the cart.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CartLineRequest {
    pub id: String,
    pub name: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub line_price: f64,
    pub selections: Vec<SelectedParam>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionVisibility {
    pub group: String,
    pub option: String,
    pub visible: bool,
}

/// A product on the menu together with what the user picked for it.
#[derive(Debug, Clone)]
pub struct MenuItem {
    id: String,
    definition: ProductDefinition,
    quantity: QuantityControl,
    selections: BTreeMap<String, BTreeSet<String>>,
    active: bool,
    unit_price: f64,
    line_price: f64,
    visibility: Vec<OptionVisibility>,
}

impl MenuItem {
    pub fn new(definition: ProductDefinition, amount: AmountSettings) -> Self {
        let selections = definition
            .params
            .iter()
            .map(|group| {
                let defaults: BTreeSet<String> =
                    group.default_option_ids().map(str::to_string).collect();
                (group.id.clone(), defaults)
            })
            .collect();

        let mut item = Self {
            id: definition.id.clone(),
            definition,
            quantity: QuantityControl::new(amount),
            selections,
            active: false,
            unit_price: 0.0,
            line_price: 0.0,
            visibility: Vec::new(),
        };
        item.recompute_price();
        item
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn definition(&self) -> &ProductDefinition {
        &self.definition
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

    pub fn visibility(&self) -> &[OptionVisibility] {
        &self.visibility
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn render(&self, templates: &dyn Templates) -> String {
        templates.menu_product(&self.definition)
    }

    pub fn is_selected(&self, group_id: &str, option_id: &str) -> bool {
        self.selections
            .get(group_id)
            .is_some_and(|selected| selected.contains(option_id))
    }

    fn is_defined(&self, group_id: &str, option_id: &str) -> bool {
        self.definition
            .group(group_id)
            .and_then(|group| group.option(option_id))
            .is_some()
    }

    /// Recompute unit and line price from the current selection and amount.
    ///
    /// Selected non-default options add their price, deselected defaults
    /// subtract theirs. Option ids not defined for the product never count.
    pub fn recompute_price(&mut self) -> f64 {
        let mut price = self.definition.price;
        let mut visibility = Vec::new();

        for group in &self.definition.params {
            for option in &group.options {
                let selected = self.is_selected(&group.id, &option.id);

                if selected && !option.default {
                    price += option.price;
                } else if !selected && option.default {
                    price -= option.price;
                }

                visibility.push(OptionVisibility {
                    group: group.id.clone(),
                    option: option.id.clone(),
                    visible: selected,
                });
            }
        }

        self.unit_price = price;
        self.line_price = price * f64::from(self.quantity.value());
        self.visibility = visibility;

        debug!(
            "Price for '{}': {} x {} = {}",
            self.id,
            self.unit_price,
            self.quantity.value(),
            self.line_price
        );
        self.line_price
    }

    pub fn on_selection_changed(&mut self) {
        self.recompute_price();
    }

    pub fn on_quantity_changed(&mut self, _event: QuantityUpdated) {
        self.recompute_price();
    }

    /// Replace every selection with what the form holds.
    pub fn apply_form(&mut self, form: &FormData) {
        self.selections = form
            .iter()
            .map(|(group, options)| {
                let known: BTreeSet<String> = options
                    .iter()
                    .filter(|option| self.is_defined(group, option))
                    .cloned()
                    .collect();
                (group.clone(), known)
            })
            .filter(|(_, options)| !options.is_empty())
            .collect();
        self.on_selection_changed();
    }

    pub fn set_group_selection<I, S>(&mut self, group_id: &str, option_ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let selected: BTreeSet<String> = option_ids
            .into_iter()
            .map(Into::into)
            .filter(|option_id| self.is_defined(group_id, option_id))
            .collect();
        self.selections.insert(group_id.to_string(), selected);
        self.on_selection_changed();
    }

    pub fn select_option(&mut self, group_id: &str, option_id: &str) {
        if !self.is_defined(group_id, option_id) {
            debug!("'{}' has no option {}/{}, ignored", self.id, group_id, option_id);
            return;
        }
        self.selections
            .entry(group_id.to_string())
            .or_default()
            .insert(option_id.to_string());
        self.on_selection_changed();
    }

    pub fn deselect_option(&mut self, group_id: &str, option_id: &str) {
        if let Some(selected) = self.selections.get_mut(group_id) {
            selected.remove(option_id);
        }
        self.on_selection_changed();
    }

    pub fn toggle_option(&mut self, group_id: &str, option_id: &str) {
        if self.is_selected(group_id, option_id) {
            self.deselect_option(group_id, option_id);
        } else {
            self.select_option(group_id, option_id);
        }
    }

    pub fn set_quantity(&mut self, raw: &str) {
        if let Some(event) = self.quantity.set_raw(raw) {
            self.on_quantity_changed(event);
        }
    }

    pub fn increase_quantity(&mut self) {
        if let Some(event) = self.quantity.increment() {
            self.on_quantity_changed(event);
        }
    }

    pub fn decrease_quantity(&mut self) {
        if let Some(event) = self.quantity.decrement() {
            self.on_quantity_changed(event);
        }
    }

    pub fn prepare_cart_line(&self) -> CartLineRequest {
        let quantity = self.quantity.value();

        CartLineRequest {
            id: self.id.clone(),
            name: self.definition.name.clone(),
            quantity,
            unit_price: self.unit_price,
            line_price: self.unit_price * f64::from(quantity),
            selections: self.prepare_cart_line_params(),
        }
    }

    fn prepare_cart_line_params(&self) -> Vec<SelectedParam> {
        self.definition
            .params
            .iter()
            .map(|group| SelectedParam {
                label: group.label.clone(),
                options: group
                    .options
                    .iter()
                    .filter(|option| self.is_selected(&group.id, &option.id))
                    .map(|option| option.label.clone())
                    .collect(),
            })
            .collect()
    }

    /// Push a snapshot of the current order into `cart`.
    pub fn add_to_cart(&mut self, cart: &mut dyn CartSink) -> CartLineId {
        self.recompute_price();
        let request = self.prepare_cart_line();
        info!(
            "Adding {} x '{}' to cart at {}",
            request.quantity, request.name, request.unit_price
        );
        cart.add(request)
    }
}
