//! One-time geosearch setup for a table definition.

use tracing::{debug, info, warn};

use crate::config::{GeoSearchOptions, TableGeoConfig};
use crate::error::{GeoError, UnsupportedReason};
use crate::host::TableDefinition;
use crate::units::DistanceUnits;

/// Result of a successful installation call
#[derive(Debug, Clone, PartialEq)]
pub enum InstallOutcome<'a> {
    /// Geosearch is attached; the config is now owned by the table definition
    Enabled(&'a TableGeoConfig),
    /// The table cannot carry geosearch. Nothing was attached; callers should skip
    /// distance queries for this table.
    Disabled(GeoError),
}

impl<'a> InstallOutcome<'a> {
    pub fn is_enabled(&self) -> bool {
        matches!(self, InstallOutcome::Enabled(_))
    }

    pub fn config(&self) -> Option<&'a TableGeoConfig> {
        match self {
            InstallOutcome::Enabled(config) => Some(*config),
            InstallOutcome::Disabled(_) => None,
        }
    }
}

/// Install geosearch on `table`.
///
/// A missing table or unsupported dialect yields `Ok(InstallOutcome::Disabled)`.
/// Unknown units, a distance column that shadows a real column, or a second
/// installation are errors. Config is attached only when every check passes.
pub fn install<'a, T: TableDefinition + ?Sized>(
    table: &'a T,
    options: &GeoSearchOptions,
) -> Result<InstallOutcome<'a>, GeoError> {
    let table_name = table.table_name();

    if let Some(reason) = unsupported_reason(table) {
        warn!("Geosearch disabled for table '{}': {}", table_name, reason);
        metrics::counter!("geosearch.install.disabled_total").increment(1);
        return Ok(InstallOutcome::Disabled(GeoError::UnsupportedTarget {
            table: table_name.to_string(),
            reason,
        }));
    }

    let config = match build_config(table, options) {
        Ok(config) => config,
        Err(e) => {
            metrics::counter!("geosearch.install.failed_total").increment(1);
            return Err(e);
        }
    };

    debug!(
        table = table_name,
        latitude_column = %config.latitude_column,
        longitude_column = %config.longitude_column,
        distance_column = %config.distance_column,
        units = %config.units,
        "Attaching geosearch config"
    );

    let attached = table.geo_slot().set(config).map_err(|_| {
        metrics::counter!("geosearch.install.failed_total").increment(1);
        GeoError::AlreadyInstalled {
            table: table_name.to_string(),
        }
    })?;

    metrics::counter!("geosearch.install.enabled_total").increment(1);
    info!(
        "Geosearch enabled for table '{}' ({}, radius {})",
        table_name, attached.units, attached.radius
    );

    Ok(InstallOutcome::Enabled(attached))
}

fn unsupported_reason<T: TableDefinition + ?Sized>(table: &T) -> Option<UnsupportedReason> {
    if !table.table_exists() {
        return Some(UnsupportedReason::MissingTable);
    }
    let dialect = table.dialect();
    if !dialect.supports_distance() {
        return Some(UnsupportedReason::Dialect(dialect.to_string()));
    }
    None
}

fn build_config<T: TableDefinition + ?Sized>(
    table: &T,
    options: &GeoSearchOptions,
) -> Result<TableGeoConfig, GeoError> {
    let units = DistanceUnits::from_option(options.distance_units.as_deref())?;

    if table.columns().contains(&options.distance_column) {
        return Err(GeoError::ColumnCollision {
            table: table.table_name().to_string(),
            column: options.distance_column.clone(),
        });
    }

    Ok(TableGeoConfig {
        table: table.table_name().to_string(),
        latitude_column: options.latitude_column.clone(),
        longitude_column: options.longitude_column.clone(),
        distance_column: options.distance_column.clone(),
        units,
        radius: units.radius(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeoCapable;
    use crate::host::{Dialect, StaticTable};
    use serde_json::json;

    fn stores() -> StaticTable {
        StaticTable::new("stores", ["id", "name", "lat", "lng"])
    }

    #[test]
    fn test_defaults_install_in_miles() {
        let table = stores();
        let outcome = install(&table, &GeoSearchOptions::default()).unwrap();
        let config = outcome.config().unwrap();
        assert_eq!(config.radius, 3963.0);
        assert_eq!(config.latitude_column, "lat");
        assert_eq!(config.longitude_column, "lng");
        assert_eq!(config.distance_column, "distance");
        assert_eq!(table.geo_config(), Some(config));
    }

    #[test]
    fn test_units_select_radius() {
        let table = stores();
        let options = GeoSearchOptions::default().distance_units("nautical_miles");
        let outcome = install(&table, &options).unwrap();
        assert_eq!(outcome.config().unwrap().radius, 3444.0);
        assert_eq!(outcome.config().unwrap().units, DistanceUnits::NauticalMiles);
    }

    #[test]
    fn test_missing_table_is_disabled_not_failed() {
        let table = StaticTable::missing("ghosts");
        let outcome = install(&table, &GeoSearchOptions::default()).unwrap();
        assert!(!outcome.is_enabled());
        assert!(matches!(
            outcome,
            InstallOutcome::Disabled(GeoError::UnsupportedTarget {
                reason: UnsupportedReason::MissingTable,
                ..
            })
        ));
        assert!(table.geo_config().is_none());
    }

    #[test]
    fn test_unsupported_dialect_is_disabled() {
        let table = stores().with_dialect(Dialect::Sqlite);
        let outcome = install(&table, &GeoSearchOptions::default()).unwrap();
        match outcome {
            InstallOutcome::Disabled(err) => assert!(err.is_soft()),
            InstallOutcome::Enabled(_) => panic!("sqlite must not be enabled"),
        }
        assert!(table.geo_config().is_none());
    }

    #[test]
    fn test_invalid_units_fail_without_attaching() {
        let table = stores();
        let options = GeoSearchOptions::default().distance_units("parsecs");
        let err = install(&table, &options).unwrap_err();
        assert_eq!(err, GeoError::InvalidUnits("parsecs".to_string()));
        assert!(table.geo_config().is_none());
    }

    #[test]
    fn test_distance_column_collision() {
        let table = StaticTable::new("stores", ["id", "lat", "lng", "distance"]);
        let err = install(&table, &GeoSearchOptions::default()).unwrap_err();
        assert_eq!(
            err,
            GeoError::ColumnCollision {
                table: "stores".to_string(),
                column: "distance".to_string(),
            }
        );
        assert!(table.geo_config().is_none());
    }

    #[test]
    fn test_renamed_distance_column_avoids_collision() {
        let table = StaticTable::new("stores", ["id", "lat", "lng", "distance"]);
        let options = GeoSearchOptions::default().distance_column("distance_away");
        let outcome = install(&table, &options).unwrap();
        assert_eq!(outcome.config().unwrap().distance_column, "distance_away");
    }

    #[test]
    fn test_second_install_is_rejected_and_keeps_first_config() {
        let table = stores();
        install(&table, &GeoSearchOptions::default()).unwrap();

        let options = GeoSearchOptions::default().distance_units("kilometers");
        let err = install(&table, &options).unwrap_err();
        assert!(matches!(err, GeoError::AlreadyInstalled { .. }));
        assert_eq!(table.geo_config().unwrap().units, DistanceUnits::Miles);
    }

    #[test]
    fn test_distance_accessor_reads_materialized_column() {
        let table = stores();
        let options = GeoSearchOptions::default().distance_column("miles_away");
        install(&table, &options).unwrap();

        let row = json!({"id": 1, "lat": 34.0, "lng": -84.0, "miles_away": 12.5});
        assert_eq!(table.distance_of(&row), Some(12.5));

        let plain_row = json!({"id": 1, "lat": 34.0, "lng": -84.0});
        assert_eq!(table.distance_of(&plain_row), None);
    }
}
