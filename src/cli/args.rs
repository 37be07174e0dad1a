use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "restaurant-order")]
#[command(about = "Browse the menu, price your order and fill a cart from the terminal")]
#[command(version = "0.1.0")]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Menu data file (JSON); overrides MENU_DATA_PATH
    #[arg(short, long, global = true)]
    pub data: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the products on the menu
    Menu,
    /// Show a product and its options
    Show {
        /// Product ID
        product: String,
    },
    /// Price a product for a given selection without using the cart
    Quote {
        /// Product ID
        product: String,
        /// Chosen option as group=option; repeat for several. Naming a group
        /// replaces its default options
        #[arg(short, long = "option")]
        options: Vec<String>,
        /// Amount to order
        #[arg(short, long)]
        amount: Option<String>,
    },
    /// Start an interactive ordering session
    Order,
}
