pub mod product;
pub mod quantity;
pub mod menu_item;
pub mod cart;

pub use product::{Catalog, CatalogError, OptionGroup, OptionKind, ProductDefinition, ProductOption};
pub use quantity::{AmountSettings, QuantityControl, QuantityUpdated};
pub use menu_item::{CartLineRequest, FormData, MenuItem, OptionVisibility, SelectedParam};
pub use cart::{Cart, CartLine, CartLineAction, CartLineEvent, CartLineId, CartSink, CartTotals, CheckoutForm};
