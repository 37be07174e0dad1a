use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::models::product::{Catalog, CatalogError};
use crate::utils::config::Settings;

const EMBEDDED_MENU: &str = include_str!("../../data/products.json");

/// Supplies the product catalog once, at startup.
pub trait DataSource {
    fn load(&self) -> Result<Catalog, CatalogError>;

    fn describe(&self) -> String;
}

#[derive(Debug, Clone)]
pub struct JsonFileDataSource {
    path: PathBuf,
}

impl JsonFileDataSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DataSource for JsonFileDataSource {
    fn load(&self) -> Result<Catalog, CatalogError> {
        debug!("Reading menu data from {}", self.path.display());
        let json = fs::read_to_string(&self.path).map_err(|source| CatalogError::Io {
            path: self.path.clone(),
            source,
        })?;

        let catalog = Catalog::from_json_str(&json)?;
        info!(
            "Loaded {} products from {}",
            catalog.len(),
            self.path.display()
        );
        Ok(catalog)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// The menu bundled with the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedDataSource;

impl DataSource for EmbeddedDataSource {
    fn load(&self) -> Result<Catalog, CatalogError> {
        let catalog = Catalog::from_json_str(EMBEDDED_MENU)?;
        info!("Loaded {} products from the built-in menu", catalog.len());
        Ok(catalog)
    }

    fn describe(&self) -> String {
        "built-in menu".to_string()
    }
}

/// Pick the data source the settings point at, falling back to the built-in menu.
pub fn from_settings(settings: &Settings) -> Box<dyn DataSource> {
    match &settings.menu_data_path {
        Some(path) => Box::new(JsonFileDataSource::new(path.clone())),
        None => Box::new(EmbeddedDataSource),
    }
}
