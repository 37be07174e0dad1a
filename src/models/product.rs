use std::collections::HashSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

use crate::utils::validation::IDENTIFIER_REGEX;

/// How an option group is presented. The pricing code never looks at this.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    Radios,
    #[default]
    Checkboxes,
    Select,
}

impl std::fmt::Display for OptionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OptionKind::Radios => write!(f, "radios"),
            OptionKind::Checkboxes => write!(f, "checkboxes"),
            OptionKind::Select => write!(f, "select"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Validate)]
pub struct ProductOption {
    #[validate(regex(
        path = "IDENTIFIER_REGEX",
        message = "Option id can only contain letters, numbers, '_' and '-'"
    ))]
    pub id: String,

    #[validate(length(min = 1, max = 100, message = "Option label must be 1-100 characters"))]
    pub label: String,

    /// Price delta against the product's base price.
    #[serde(default)]
    pub price: f64,

    #[serde(default)]
    pub default: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Validate)]
pub struct OptionGroup {
    #[validate(regex(
        path = "IDENTIFIER_REGEX",
        message = "Option group id can only contain letters, numbers, '_' and '-'"
    ))]
    pub id: String,

    #[validate(length(min = 1, max = 100, message = "Option group label must be 1-100 characters"))]
    pub label: String,

    #[serde(default)]
    pub kind: OptionKind,

    #[serde(default)]
    pub options: Vec<ProductOption>,
}

impl OptionGroup {
    pub fn option(&self, option_id: &str) -> Option<&ProductOption> {
        self.options.iter().find(|option| option.id == option_id)
    }

    pub fn default_option_ids(&self) -> impl Iterator<Item = &str> {
        self.options
            .iter()
            .filter(|option| option.default)
            .map(|option| option.id.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Validate)]
pub struct ProductDefinition {
    #[validate(regex(
        path = "IDENTIFIER_REGEX",
        message = "Product id can only contain letters, numbers, '_' and '-'"
    ))]
    pub id: String,

    #[validate(length(min = 1, max = 100, message = "Product name must be 1-100 characters"))]
    pub name: String,

    #[validate(range(min = 0.0, message = "Base price must not be negative"))]
    pub price: f64,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub image: Option<String>,

    #[serde(default)]
    pub params: Vec<OptionGroup>,
}

impl ProductDefinition {
    pub fn group(&self, group_id: &str) -> Option<&OptionGroup> {
        self.params.iter().find(|group| group.id == group_id)
    }

    fn check(&self) -> Result<(), CatalogError> {
        self.validate().map_err(|e| invalid(&self.id, e))?;

        let mut group_ids = HashSet::new();
        for group in &self.params {
            group
                .validate()
                .map_err(|e| invalid(&format!("{}.{}", self.id, group.id), e))?;
            if !group_ids.insert(group.id.as_str()) {
                return Err(CatalogError::Invalid {
                    message: format!("duplicate option group '{}' in '{}'", group.id, self.id),
                });
            }

            let mut option_ids = HashSet::new();
            for option in &group.options {
                let path = format!("{}.{}.{}", self.id, group.id, option.id);
                option.validate().map_err(|e| invalid(&path, e))?;
                if !option.price.is_finite() {
                    return Err(CatalogError::Invalid {
                        message: format!("{}: option price must be a finite number", path),
                    });
                }
                if !option_ids.insert(option.id.as_str()) {
                    return Err(CatalogError::Invalid {
                        message: format!("duplicate option '{}'", path),
                    });
                }
            }
        }

        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read menu data from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Menu data is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid menu data: {message}")]
    Invalid { message: String },
}

fn invalid(path: &str, errors: validator::ValidationErrors) -> CatalogError {
    CatalogError::Invalid {
        message: format!("{}: {}", path, errors),
    }
}

/// The product collection handed over by a data source, in display order.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Catalog {
    pub products: Vec<ProductDefinition>,
}

impl Catalog {
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut product_ids = HashSet::new();
        for product in &self.products {
            product.check()?;
            if !product_ids.insert(product.id.as_str()) {
                return Err(CatalogError::Invalid {
                    message: format!("duplicate product '{}'", product.id),
                });
            }
        }
        Ok(())
    }

    pub fn get(&self, product_id: &str) -> Option<&ProductDefinition> {
        self.products.iter().find(|product| product.id == product_id)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PIZZA: &str = r#"{
        "products": [{
            "id": "pizza",
            "name": "Nonno Alberto's Pizza",
            "price": 20,
            "params": [{
                "id": "sauce",
                "label": "Sauce",
                "kind": "radios",
                "options": [
                    {"id": "tomato", "label": "Tomato", "price": 0, "default": true},
                    {"id": "cream", "label": "Sour cream", "price": 2}
                ]
            }]
        }]
    }"#;

    #[test]
    fn test_parse_valid_catalog() {
        let catalog = Catalog::from_json_str(PIZZA).unwrap();
        assert_eq!(catalog.len(), 1);

        let pizza = catalog.get("pizza").unwrap();
        assert_eq!(pizza.price, 20.0);
        assert!(pizza.description.is_none());

        let sauce = pizza.group("sauce").unwrap();
        assert_eq!(sauce.kind, OptionKind::Radios);
        assert_eq!(sauce.default_option_ids().collect::<Vec<_>>(), vec!["tomato"]);
        assert_eq!(sauce.option("cream").unwrap().price, 2.0);
        assert!(!sauce.option("cream").unwrap().default);
    }

    #[test]
    fn test_kind_defaults_to_checkboxes() {
        let json = r#"{"products": [{"id": "salad", "name": "Salad", "price": 9,
            "params": [{"id": "extras", "label": "Extras", "options": []}]}]}"#;
        let catalog = Catalog::from_json_str(json).unwrap();
        assert_eq!(
            catalog.products[0].params[0].kind,
            OptionKind::Checkboxes
        );
    }

    #[test]
    fn test_negative_base_price_is_rejected() {
        let json = r#"{"products": [{"id": "cake", "name": "Cake", "price": -1}]}"#;
        let err = Catalog::from_json_str(json).unwrap_err();
        assert!(matches!(err, CatalogError::Invalid { .. }));
    }

    #[test]
    fn test_bad_identifier_is_rejected() {
        let json = r#"{"products": [{"id": "bad id", "name": "Cake", "price": 1}]}"#;
        assert!(matches!(
            Catalog::from_json_str(json),
            Err(CatalogError::Invalid { .. })
        ));
    }

    #[test]
    fn test_duplicate_products_are_rejected() {
        let json = r#"{"products": [
            {"id": "cake", "name": "Cake", "price": 1},
            {"id": "cake", "name": "Other cake", "price": 2}
        ]}"#;
        let err = Catalog::from_json_str(json).unwrap_err();
        assert!(err.to_string().contains("duplicate product 'cake'"));
    }

    #[test]
    fn test_duplicate_options_are_rejected() {
        let json = r#"{"products": [{"id": "cake", "name": "Cake", "price": 1,
            "params": [{"id": "topping", "label": "Topping", "options": [
                {"id": "sugar", "label": "Sugar", "price": 1},
                {"id": "sugar", "label": "More sugar", "price": 1}
            ]}]}]}"#;
        let err = Catalog::from_json_str(json).unwrap_err();
        assert!(err.to_string().contains("duplicate option 'cake.topping.sugar'"));
    }

    #[test]
    fn test_malformed_json_is_a_parse_error() {
        assert!(matches!(
            Catalog::from_json_str("{\"products\": ["),
            Err(CatalogError::Parse(_))
        ));
    }
}
