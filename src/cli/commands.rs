use std::collections::HashSet;

use anyhow::{anyhow, Context, Result};
use console::{style, Emoji};
use dialoguer::{theme::ColorfulTheme, Confirm, Input, MultiSelect, Select};
use tracing::{error, info, warn};

use crate::{
    cli::args::Commands,
    models::{
        cart::{CartLineAction, CartLineId},
        menu_item::FormData,
        product::{OptionKind, ProductDefinition},
    },
    services::{data_source, App},
    utils::{
        config::Settings,
        formatting::{
            format_cart_table, format_delta, format_menu_table, format_price, format_totals,
            ConsoleTemplates,
        },
    },
};

static CHECKMARK: Emoji<'_, '_> = Emoji("✅ ", "");
static CROSS: Emoji<'_, '_> = Emoji("❌ ", "");
static WARNING: Emoji<'_, '_> = Emoji("⚠️ ", "");
static INFO: Emoji<'_, '_> = Emoji("ℹ️ ", "");
static PIZZA: Emoji<'_, '_> = Emoji("🍕 ", "");

pub struct CliApp {
    app: App,
    templates: ConsoleTemplates,
}

impl CliApp {
    pub fn new(settings: &Settings) -> Result<Self> {
        let source = data_source::from_settings(settings);
        let app = App::init(settings, source.as_ref())
            .with_context(|| format!("Failed to load the menu from {}", source.describe()))?;

        Ok(Self {
            app,
            templates: ConsoleTemplates,
        })
    }

    pub fn run(&mut self, command: Commands) -> Result<()> {
        match command {
            Commands::Menu => self.handle_menu(),
            Commands::Show { product } => self.handle_show(&product),
            Commands::Quote {
                product,
                options,
                amount,
            } => self.handle_quote(&product, &options, amount.as_deref()),
            Commands::Order => self.handle_order(),
        }
    }

    fn handle_menu(&self) -> Result<()> {
        let menu = self.app.menu();
        if menu.is_empty() {
            println!("{} The menu is empty", INFO);
            return Ok(());
        }

        println!(
            "{} {}",
            INFO,
            style(format!("{} products on the menu", menu.len())).bold()
        );
        println!("{}", format_menu_table(menu));
        Ok(())
    }

    fn handle_show(&self, product_id: &str) -> Result<()> {
        match self.app.menu_item(product_id) {
            Some(item) => {
                println!("{}", item.render(&self.templates));
            }
            None => {
                println!("{} Product '{}' not found", CROSS, style(product_id).red());
            }
        }
        Ok(())
    }

    fn handle_quote(&mut self, product_id: &str, options: &[String], amount: Option<&str>) -> Result<()> {
        let Some(item) = self.app.menu_item_mut(product_id) else {
            println!("{} Product '{}' not found", CROSS, style(product_id).red());
            return Ok(());
        };

        let form = build_quote_form(item.definition(), options)?;
        item.apply_form(&form);

        if let Some(amount) = amount {
            let requested = amount.trim();
            item.set_quantity(requested);
            if item.quantity().input() != requested {
                println!(
                    "{} Amount '{}' was adjusted to {}",
                    WARNING,
                    requested,
                    style(item.quantity().value()).yellow()
                );
            }
        }

        println!("{} {}", INFO, style(&item.definition().name).bold().cyan());
        for param in item.prepare_cart_line().selections {
            if !param.options.is_empty() {
                println!("{}: {}", style(&param.label).bold(), param.options.join(", "));
            }
        }
        println!("Unit price: {}", style(format_price(item.unit_price())).yellow());
        println!(
            "Price for {}: {}",
            item.quantity().value(),
            style(format_price(item.line_price())).green().bold()
        );
        Ok(())
    }

    fn handle_order(&mut self) -> Result<()> {
        println!("{} {}", PIZZA, style("Build your order").bold().cyan());
        let theme = ColorfulTheme::default();

        loop {
            let totals = self.app.cart().totals();
            let choices = vec![
                "Browse menu".to_string(),
                format!(
                    "Cart ({} items, {})",
                    totals.total_number,
                    format_price(totals.total_price)
                ),
                "Checkout".to_string(),
                "Quit".to_string(),
            ];

            let choice = Select::with_theme(&theme)
                .with_prompt("What next?")
                .items(&choices)
                .default(0)
                .interact()?;

            match choice {
                0 => self.browse_menu(&theme)?,
                1 => self.manage_cart(&theme)?,
                2 => self.checkout(&theme)?,
                _ => break,
            }
        }

        info!("Ordering session finished");
        Ok(())
    }

    fn browse_menu(&mut self, theme: &ColorfulTheme) -> Result<()> {
        let mut choices: Vec<String> = self
            .app
            .menu()
            .iter()
            .map(|item| {
                format!(
                    "{} ({})",
                    item.definition().name,
                    format_price(item.unit_price())
                )
            })
            .collect();
        choices.push("Back".to_string());

        let choice = Select::with_theme(theme)
            .with_prompt("Pick a product")
            .items(&choices)
            .default(0)
            .interact()?;

        let Some(item) = self.app.menu().get(choice) else {
            return Ok(());
        };
        let product_id = item.id().to_string();

        self.app.toggle_active(&product_id);
        let result = self.customize(&product_id, theme);
        self.app.toggle_active(&product_id);
        result
    }

    fn customize(&mut self, product_id: &str, theme: &ColorfulTheme) -> Result<()> {
        loop {
            let item = self
                .app
                .menu_item(product_id)
                .ok_or_else(|| anyhow!("Product '{}' disappeared from the menu", product_id))?;

            println!("{}", item.render(&self.templates));
            println!(
                "Amount: {}  Price: {}",
                style(item.quantity().value()).cyan(),
                style(format_price(item.line_price())).green().bold()
            );

            let settings = item.quantity().settings();
            let current_amount = item.quantity().input().to_string();
            let actions = ["Choose options", "Set amount", "Add to cart", "Back"];
            let choice = Select::with_theme(theme)
                .with_prompt("Customize")
                .items(&actions)
                .default(0)
                .interact()?;

            match choice {
                0 => self.choose_options(product_id, theme)?,
                1 => {
                    let raw: String = Input::with_theme(theme)
                        .with_prompt(format!("Amount ({}-{})", settings.min, settings.max))
                        .with_initial_text(current_amount)
                        .interact_text()?;
                    if let Some(item) = self.app.menu_item_mut(product_id) {
                        item.set_quantity(&raw);
                    }
                }
                2 => match self.app.add_to_cart(product_id) {
                    Some(line_id) => {
                        println!("{} Added to cart!", CHECKMARK);
                        info!("Cart line {} created from '{}'", line_id, product_id);
                    }
                    None => {
                        println!("{} Could not add '{}' to the cart", CROSS, product_id);
                        error!("Menu item '{}' not found while adding to cart", product_id);
                    }
                },
                _ => return Ok(()),
            }
        }
    }

    fn choose_options(&mut self, product_id: &str, theme: &ColorfulTheme) -> Result<()> {
        let definition = self
            .app
            .menu_item(product_id)
            .map(|item| item.definition().clone())
            .ok_or_else(|| anyhow!("Product '{}' not found", product_id))?;

        if definition.params.is_empty() {
            println!("{} This product has no options", INFO);
            return Ok(());
        }

        for group in definition.params.iter().filter(|g| !g.options.is_empty()) {
            let Some(item) = self.app.menu_item_mut(product_id) else {
                break;
            };
            let labels: Vec<String> = group
                .options
                .iter()
                .map(|option| format!("{} ({})", option.label, format_delta(option.price)))
                .collect();

            match group.kind {
                OptionKind::Radios | OptionKind::Select => {
                    let current = group
                        .options
                        .iter()
                        .position(|option| item.is_selected(&group.id, &option.id))
                        .unwrap_or(0);
                    let choice = Select::with_theme(theme)
                        .with_prompt(&group.label)
                        .items(&labels)
                        .default(current)
                        .interact()?;
                    item.set_group_selection(&group.id, [group.options[choice].id.clone()]);
                }
                OptionKind::Checkboxes => {
                    let checked: Vec<bool> = group
                        .options
                        .iter()
                        .map(|option| item.is_selected(&group.id, &option.id))
                        .collect();
                    let chosen = MultiSelect::with_theme(theme)
                        .with_prompt(&group.label)
                        .items(&labels)
                        .defaults(&checked)
                        .interact()?;
                    item.set_group_selection(
                        &group.id,
                        chosen.into_iter().map(|index| group.options[index].id.clone()),
                    );
                }
            }
        }

        Ok(())
    }

    fn manage_cart(&mut self, theme: &ColorfulTheme) -> Result<()> {
        loop {
            let cart = self.app.cart();
            if cart.is_empty() {
                println!("{} Your cart is empty", INFO);
                return Ok(());
            }

            if cart.is_expanded() {
                println!("{}", format_cart_table(cart));
            }
            println!("{}", format_totals(&cart.totals()));

            let line_ids: Vec<CartLineId> = cart.lines().iter().map(|line| line.line_id()).collect();
            let mut choices: Vec<String> = cart
                .lines()
                .iter()
                .map(|line| line.render(&self.templates))
                .collect();
            choices.push(if cart.is_expanded() { "Hide details" } else { "Show details" }.to_string());
            choices.push("Back".to_string());

            let choice = Select::with_theme(theme)
                .with_prompt("Pick a cart line")
                .items(&choices)
                .default(0)
                .interact()?;

            match line_ids.get(choice) {
                Some(line_id) => self.manage_line(*line_id, theme)?,
                None if choice == line_ids.len() => {
                    self.app.cart_mut().toggle();
                }
                None => return Ok(()),
            }
        }
    }

    fn manage_line(&mut self, line_id: CartLineId, theme: &ColorfulTheme) -> Result<()> {
        let Some(line) = self.app.cart().line(line_id) else {
            warn!("Cart line {} vanished before it could be changed", line_id);
            return Ok(());
        };
        let current_amount = line.quantity().input().to_string();
        let settings = line.quantity().settings();

        let actions = ["Increase", "Decrease", "Set amount", "Edit", "Remove", "Back"];
        let choice = Select::with_theme(theme)
            .with_prompt(line.name())
            .items(&actions)
            .default(0)
            .interact()?;

        let action = match choice {
            0 => CartLineAction::Increase,
            1 => CartLineAction::Decrease,
            2 => {
                let raw: String = Input::with_theme(theme)
                    .with_prompt(format!("Amount ({}-{})", settings.min, settings.max))
                    .with_initial_text(current_amount)
                    .interact_text()?;
                CartLineAction::SetAmount(raw)
            }
            3 => {
                println!("{} Editing a cart line is not yet implemented", WARNING);
                CartLineAction::Edit
            }
            4 => {
                let confirm = Confirm::with_theme(theme)
                    .with_prompt("Remove this line from the cart?")
                    .default(false)
                    .interact()?;
                if !confirm {
                    println!("Removal cancelled");
                    return Ok(());
                }
                CartLineAction::Remove
            }
            _ => return Ok(()),
        };

        let removing = action == CartLineAction::Remove;
        if self.app.cart_mut().apply(line_id, action) && removing {
            println!("{} Line removed", CHECKMARK);
        }
        Ok(())
    }

    // Checkout (the order form is not submitted anywhere)
    fn checkout(&mut self, theme: &ColorfulTheme) -> Result<()> {
        if self.app.cart().is_empty() {
            println!("{} Add something to the cart first", WARNING);
            return Ok(());
        }

        println!("{}", format_totals(&self.app.cart().totals()));

        let phone: String = Input::with_theme(theme)
            .with_prompt("Phone")
            .allow_empty(true)
            .interact_text()?;
        let address: String = Input::with_theme(theme)
            .with_prompt("Address")
            .allow_empty(true)
            .interact_text()?;

        let form = self.app.cart_mut().checkout_mut();
        form.phone = phone;
        form.address = address;

        self.app.cart().submit_order();
        println!("{} Order submission is not yet implemented", WARNING);
        Ok(())
    }
}

/// Build the order form for a quote: every group starts from its defaults
/// and any group named in `options` (as `group=option`) is replaced by the
/// options given for it. Pairs naming an unknown group or option are skipped.
pub fn build_quote_form(definition: &ProductDefinition, options: &[String]) -> Result<FormData> {
    let mut form: FormData = definition
        .params
        .iter()
        .map(|group| {
            let defaults: Vec<String> = group.default_option_ids().map(str::to_string).collect();
            (group.id.clone(), defaults)
        })
        .collect();
    let mut replaced = HashSet::new();

    for pair in options {
        let (group_id, option_id) = pair
            .split_once('=')
            .map(|(group, option)| (group.trim(), option.trim()))
            .ok_or_else(|| anyhow!("Option '{}' must look like group=option", pair))?;

        let known = definition
            .group(group_id)
            .and_then(|group| group.option(option_id))
            .is_some();
        if !known {
            warn!("'{}' is not an option of '{}', ignoring it", pair, definition.id);
            println!("{} Ignoring unknown option '{}'", WARNING, style(pair).yellow());
            continue;
        }

        let selected = form.entry(group_id.to_string()).or_default();
        if replaced.insert(group_id.to_string()) {
            selected.clear();
        }
        if !selected.iter().any(|id| id == option_id) {
            selected.push(option_id.to_string());
        }
    }

    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::menu_item::MenuItem;
    use crate::models::quantity::AmountSettings;
    use crate::services::data_source::{DataSource, EmbeddedDataSource};

    fn pizza() -> ProductDefinition {
        EmbeddedDataSource
            .load()
            .unwrap()
            .get("pizza")
            .cloned()
            .unwrap()
    }

    #[test]
    fn test_no_options_keeps_defaults() {
        let form = build_quote_form(&pizza(), &[]).unwrap();
        assert_eq!(form["sauce"], vec!["tomato".to_string()]);
        assert_eq!(form["toppings"].len(), 5);
    }

    #[test]
    fn test_named_group_replaces_defaults() {
        let options = vec!["sauce=cream".to_string(), "crust=thick".to_string()];
        let form = build_quote_form(&pizza(), &options).unwrap();
        assert_eq!(form["sauce"], vec!["cream".to_string()]);
        assert_eq!(form["crust"], vec!["thick".to_string()]);

        let mut item = MenuItem::new(pizza(), AmountSettings::default());
        item.apply_form(&form);
        // +2 cream, -0 tomato, +2 thick, -0 standard
        assert_eq!(item.unit_price(), 24.0);
    }

    #[test]
    fn test_repeated_group_accumulates() {
        let options = vec![
            "toppings=salami".to_string(),
            "toppings=olives".to_string(),
            "toppings=salami".to_string(),
        ];
        let form = build_quote_form(&pizza(), &options).unwrap();
        assert_eq!(
            form["toppings"],
            vec!["salami".to_string(), "olives".to_string()]
        );
    }

    #[test]
    fn test_unknown_option_is_skipped() {
        let options = vec!["sauce=bbq".to_string()];
        let form = build_quote_form(&pizza(), &options).unwrap();
        assert_eq!(form["sauce"], vec!["tomato".to_string()]);
    }

    #[test]
    fn test_malformed_pair_is_an_error() {
        let options = vec!["sauce".to_string()];
        assert!(build_quote_form(&pizza(), &options).is_err());
    }
}
