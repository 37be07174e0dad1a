use console::style;
use tabled::{
    settings::{Alignment, Style},
    Table, Tabled,
};

use crate::models::{
    cart::{Cart, CartLine, CartTotals},
    menu_item::MenuItem,
    product::ProductDefinition,
};

/// Turns data records into display fragments.
pub trait Templates {
    fn menu_product(&self, product: &ProductDefinition) -> String;
    fn cart_product(&self, line: &CartLine) -> String;
}

/// Plain terminal rendering with `console` styling.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleTemplates;

impl Templates for ConsoleTemplates {
    fn menu_product(&self, product: &ProductDefinition) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{} {}\n",
            style(&product.name).bold().green(),
            style(format_price(product.price)).yellow()
        ));

        if let Some(description) = &product.description {
            output.push_str(&format!("{}\n", style(description).dim()));
        }

        for group in &product.params {
            output.push_str(&format!(
                "{} {}\n",
                style(&group.label).bold(),
                style(format!("({})", group.kind)).dim()
            ));
            for option in &group.options {
                let marker = if option.default { "*" } else { " " };
                output.push_str(&format!(
                    "  {} {} {}\n",
                    marker,
                    option.label,
                    style(format_delta(option.price)).dim()
                ));
            }
        }

        output
    }

    fn cart_product(&self, line: &CartLine) -> String {
        let mut output = format!(
            "{} x {} {}",
            line.amount(),
            style(line.name()).green(),
            style(format_price(line.line_price())).yellow()
        );

        let details = format_selections(line);
        if !details.is_empty() {
            output.push_str(&format!("\n  {}", style(details).dim()));
        }

        output
    }
}

#[derive(Tabled)]
struct MenuTableRow {
    #[tabled(rename = "")]
    active: String,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Base price")]
    price: String,
    #[tabled(rename = "Options")]
    options: String,
}

pub fn format_menu_table(items: &[MenuItem]) -> String {
    if items.is_empty() {
        return String::new();
    }

    let rows: Vec<MenuTableRow> = items
        .iter()
        .map(|item| {
            let definition = item.definition();
            MenuTableRow {
                active: if item.is_active() { ">".to_string() } else { String::new() },
                id: definition.id.clone(),
                name: truncate(&definition.name, 30),
                price: format_price(definition.price),
                options: definition
                    .params
                    .iter()
                    .map(|group| group.label.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            }
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded()).with(Alignment::left());

    table.to_string()
}

#[derive(Tabled)]
struct CartTableRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Product")]
    name: String,
    #[tabled(rename = "Options")]
    options: String,
    #[tabled(rename = "Amount")]
    amount: u32,
    #[tabled(rename = "Price")]
    price: String,
}

pub fn format_cart_table(cart: &Cart) -> String {
    if cart.is_empty() {
        return String::new();
    }

    let rows: Vec<CartTableRow> = cart
        .lines()
        .iter()
        .enumerate()
        .map(|(index, line)| CartTableRow {
            index: index + 1,
            name: truncate(line.name(), 30),
            options: format_selections(line),
            amount: line.amount(),
            price: format_price(line.line_price()),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded()).with(Alignment::left());

    table.to_string()
}

pub fn format_totals(totals: &CartTotals) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "{}: {}\n",
        style("Items").bold(),
        style(totals.total_number).cyan()
    ));
    output.push_str(&format!(
        "{}: {}\n",
        style("Subtotal").bold(),
        format_price(totals.subtotal_price)
    ));
    output.push_str(&format!(
        "{}: {}\n",
        style("Delivery").bold(),
        format_price(totals.delivery_fee)
    ));
    output.push_str(&format!(
        "{}: {}\n",
        style("Total").bold(),
        style(format_price(totals.total_price)).green().bold()
    ));

    output
}

pub fn format_price(price: f64) -> String {
    format!("${:.2}", price)
}

pub fn format_delta(price: f64) -> String {
    if price < 0.0 {
        format!("-{}", format_price(-price))
    } else {
        format!("+{}", format_price(price))
    }
}

fn format_selections(line: &CartLine) -> String {
    line.selections()
        .iter()
        .filter(|param| !param.options.is_empty())
        .map(|param| format!("{}: {}", param.label, param.options.join(", ")))
        .collect::<Vec<_>>()
        .join("; ")
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let kept: String = text.chars().take(max - 3).collect();
        format!("{}...", kept)
    } else {
        text.to_string()
    }
}
