//! geosearch - great-circle distance search for SQL query builders
//!
//! Install geosearch on a table once, then add a distance column, a distance
//! boundary or a distance ordering to any query against it:
//!
//! ```
//! use geosearch::{GeoSearchOptions, Origin, SelectQuery, StaticTable, distance_boundary, distance_from, install};
//!
//! let stores = StaticTable::new("stores", ["id", "name", "lat", "lng"]);
//! install(&stores, &GeoSearchOptions::default()).unwrap();
//!
//! let origin = Origin::Pair(34.0, -84.0);
//! let query = SelectQuery::from_table("stores");
//! let query = distance_from(&query, &stores, &origin).unwrap();
//! let query = distance_boundary(&query, &stores, 20.0, &origin).unwrap();
//! assert!(query.to_sql().starts_with("SELECT *, (3963 * ACOS(LEAST(1, "));
//! ```

pub mod augment;
pub mod config;
pub mod db;
pub mod error;
pub mod expression;
pub mod host;
pub mod install;
pub mod origin;
pub mod query;
pub mod units;

pub use augment::{distance_boundary, distance_expression, distance_from, order_by_distance};
pub use config::{GeoCapable, GeoSearchOptions, GeoSlot, TableGeoConfig};
pub use error::{GeoError, UnsupportedReason};
pub use expression::DistanceExpression;
pub use host::{
    ColumnAccessor, Dialect, IdentifierQuoter, PgQuoting, QueryDescriptor, StaticTable,
    TableDefinition,
};
pub use install::{InstallOutcome, install};
pub use origin::{Coordinate, Origin, resolve};
pub use query::{Expr, SelectQuery, SortDirection};
pub use units::{DistanceUnits, radius_for};
