use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::host::ColumnAccessor;
use crate::units::DistanceUnits;

pub const DEFAULT_LATITUDE_COLUMN: &str = "lat";
pub const DEFAULT_LONGITUDE_COLUMN: &str = "lng";
pub const DEFAULT_DISTANCE_COLUMN: &str = "distance";

/// Options accepted when installing geosearch on a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoSearchOptions {
    #[serde(default = "default_latitude_column")]
    pub latitude_column: String,
    #[serde(default = "default_longitude_column")]
    pub longitude_column: String,
    #[serde(default = "default_distance_column")]
    pub distance_column: String,
    /// Kept as a raw symbol so an unknown unit is reported by installation
    /// rather than swallowed by deserialization
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_units: Option<String>,
}

fn default_latitude_column() -> String {
    DEFAULT_LATITUDE_COLUMN.to_string()
}

fn default_longitude_column() -> String {
    DEFAULT_LONGITUDE_COLUMN.to_string()
}

fn default_distance_column() -> String {
    DEFAULT_DISTANCE_COLUMN.to_string()
}

impl Default for GeoSearchOptions {
    fn default() -> Self {
        Self {
            latitude_column: default_latitude_column(),
            longitude_column: default_longitude_column(),
            distance_column: default_distance_column(),
            distance_units: None,
        }
    }
}

impl GeoSearchOptions {
    pub fn latitude_column(mut self, column: impl Into<String>) -> Self {
        self.latitude_column = column.into();
        self
    }

    pub fn longitude_column(mut self, column: impl Into<String>) -> Self {
        self.longitude_column = column.into();
        self
    }

    pub fn distance_column(mut self, column: impl Into<String>) -> Self {
        self.distance_column = column.into();
        self
    }

    pub fn distance_units(mut self, units: impl Into<String>) -> Self {
        self.distance_units = Some(units.into());
        self
    }

    /// Parse options from TOML text
    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("Failed to parse geosearch options")
    }

    /// Load options from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents =
            std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
        Self::from_toml(&contents).with_context(|| format!("Failed to parse {:?}", path))
    }
}

/// Resolved geosearch configuration of one table. Built once by installation and
/// never modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableGeoConfig {
    pub table: String,
    pub latitude_column: String,
    pub longitude_column: String,
    pub distance_column: String,
    pub units: DistanceUnits,
    pub radius: f64,
}

/// Write-once holder for a table's [`TableGeoConfig`]. Embed one in each table
/// definition that may carry geosearch.
#[derive(Debug, Default)]
pub struct GeoSlot(OnceCell<TableGeoConfig>);

impl GeoSlot {
    pub fn get(&self) -> Option<&TableGeoConfig> {
        self.0.get()
    }

    /// Store the config. Fails with the rejected config if one is already present.
    pub(crate) fn set(&self, config: TableGeoConfig) -> Result<&TableGeoConfig, TableGeoConfig> {
        self.0.try_insert(config).map_err(|(_, rejected)| rejected)
    }
}

/// A table (or bare config) able to answer distance queries
pub trait GeoCapable {
    /// Table name used in error messages
    fn geo_table_name(&self) -> &str;

    fn geo_config(&self) -> Option<&TableGeoConfig>;

    /// Distance the query engine materialized for `row`. Only meaningful for rows
    /// loaded through a `distance_from` query; nothing is computed here.
    fn distance_of(&self, row: &dyn ColumnAccessor) -> Option<f64> {
        let config = self.geo_config()?;
        row.column_value(&config.distance_column)?.as_f64()
    }
}

impl GeoCapable for TableGeoConfig {
    fn geo_table_name(&self) -> &str {
        &self.table
    }

    fn geo_config(&self) -> Option<&TableGeoConfig> {
        Some(self)
    }
}

impl<T: crate::host::TableDefinition> GeoCapable for T {
    fn geo_table_name(&self) -> &str {
        self.table_name()
    }

    fn geo_config(&self) -> Option<&TableGeoConfig> {
        self.geo_slot().get()
    }
}
