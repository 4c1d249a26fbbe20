//! Boundary with the host query builder.
//!
//! Geosearch never owns tables or queries. A host exposes its table metadata through
//! [`TableDefinition`] and its query values through [`QueryDescriptor`]; rows and
//! records are read through [`ColumnAccessor`]. [`StaticTable`] is a plain in-memory
//! table definition usable on its own or filled from database introspection.

use serde_json::{Map, Value};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

use crate::config::GeoSlot;
use crate::query::{Expr, SortDirection};

/// SQL backend family of a table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dialect {
    Postgres,
    Mysql,
    Sqlite,
    Other(String),
}

impl Dialect {
    pub fn from_tag(tag: &str) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Dialect::Postgres,
            "mysql" | "mysql2" | "mariadb" => Dialect::Mysql,
            "sqlite" | "sqlite3" => Dialect::Sqlite,
            _ => Dialect::Other(tag.to_string()),
        }
    }

    /// Whether the dialect provides RADIANS, COS, SIN, ACOS and a scalar LEAST
    pub fn supports_distance(&self) -> bool {
        matches!(self, Dialect::Postgres)
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::Postgres => write!(f, "postgres"),
            Dialect::Mysql => write!(f, "mysql"),
            Dialect::Sqlite => write!(f, "sqlite"),
            Dialect::Other(tag) => write!(f, "{}", tag),
        }
    }
}

/// Quote an identifier the way PostgreSQL expects: wrapped in double quotes with
/// embedded double quotes doubled.
pub fn quote_pg_identifier(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

/// Something that can quote SQL identifiers
pub trait IdentifierQuoter {
    fn quote_identifier(&self, identifier: &str) -> String;
}

/// PostgreSQL identifier quoting
#[derive(Debug, Clone, Copy, Default)]
pub struct PgQuoting;

impl IdentifierQuoter for PgQuoting {
    fn quote_identifier(&self, identifier: &str) -> String {
        quote_pg_identifier(identifier)
    }
}

/// Table metadata the installer needs from the host
pub trait TableDefinition {
    fn table_name(&self) -> &str;

    fn table_exists(&self) -> bool;

    /// Declared column names
    fn columns(&self) -> BTreeSet<String>;

    fn dialect(&self) -> Dialect;

    /// Write-once storage for the table's geosearch configuration
    fn geo_slot(&self) -> &GeoSlot;
}

/// An immutable query value. Every `add_*` method returns a new descriptor and
/// leaves `self` untouched.
pub trait QueryDescriptor: IdentifierQuoter + Sized {
    /// Explicit selection, or `None` when the query implicitly selects all columns
    fn current_selection(&self) -> Option<&[Expr]>;

    /// Append items to the selection. On a query without an explicit selection
    /// the result selects only `items`.
    fn add_selection(&self, items: Vec<Expr>) -> Self;

    /// Add a predicate, conjoined with existing predicates
    fn add_filter(&self, predicate: Expr) -> Self;

    /// Append an ordering term after existing ones
    fn add_order(&self, expr: Expr, direction: SortDirection) -> Self;

    /// Name used to qualify columns of the source table
    fn source_table_name(&self) -> &str;
}

/// Read access to named values of a row or record
pub trait ColumnAccessor {
    fn column_value(&self, column: &str) -> Option<Value>;
}

impl ColumnAccessor for Value {
    fn column_value(&self, column: &str) -> Option<Value> {
        self.as_object().and_then(|object| object.get(column).cloned())
    }
}

impl ColumnAccessor for Map<String, Value> {
    fn column_value(&self, column: &str) -> Option<Value> {
        self.get(column).cloned()
    }
}

impl ColumnAccessor for HashMap<String, Value> {
    fn column_value(&self, column: &str) -> Option<Value> {
        self.get(column).cloned()
    }
}

impl ColumnAccessor for HashMap<String, f64> {
    fn column_value(&self, column: &str) -> Option<Value> {
        self.get(column).map(|v| Value::from(*v))
    }
}

/// In-memory table definition
#[derive(Debug)]
pub struct StaticTable {
    name: String,
    columns: BTreeSet<String>,
    exists: bool,
    dialect: Dialect,
    geo: GeoSlot,
}

impl StaticTable {
    /// An existing PostgreSQL table with the given columns
    pub fn new<I, S>(name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            exists: true,
            dialect: Dialect::Postgres,
            geo: GeoSlot::default(),
        }
    }

    /// A table that is not present in the database
    pub fn missing(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: BTreeSet::new(),
            exists: false,
            dialect: Dialect::Postgres,
            geo: GeoSlot::default(),
        }
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }
}

impl TableDefinition for StaticTable {
    fn table_name(&self) -> &str {
        &self.name
    }

    fn table_exists(&self) -> bool {
        self.exists
    }

    fn columns(&self) -> BTreeSet<String> {
        self.columns.clone()
    }

    fn dialect(&self) -> Dialect {
        self.dialect.clone()
    }

    fn geo_slot(&self) -> &GeoSlot {
        &self.geo
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_quote_pg_identifier_doubles_quotes() {
        assert_eq!(quote_pg_identifier("stores"), "\"stores\"");
        assert_eq!(quote_pg_identifier("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_dialect_tags() {
        assert_eq!(Dialect::from_tag("PostgreSQL"), Dialect::Postgres);
        assert_eq!(Dialect::from_tag("sqlite3"), Dialect::Sqlite);
        assert_eq!(Dialect::from_tag("oracle"), Dialect::Other("oracle".to_string()));
        assert!(Dialect::Postgres.supports_distance());
        assert!(!Dialect::Mysql.supports_distance());
        assert!(!Dialect::Sqlite.supports_distance());
    }

    #[test]
    fn test_json_accessor_reads_object_fields_only() {
        let row = json!({"lat": 1.0});
        assert_eq!(row.column_value("lat"), Some(json!(1.0)));
        assert_eq!(row.column_value("lng"), None);
        assert_eq!(json!([1.0, 2.0]).column_value("lat"), None);
    }

    #[test]
    fn test_static_table_reports_metadata() {
        let table = StaticTable::new("stores", ["id", "lat", "lng"]);
        assert!(table.table_exists());
        assert_eq!(table.table_name(), "stores");
        assert!(table.columns().contains("lat"));
        assert_eq!(table.dialect(), Dialect::Postgres);

        let gone = StaticTable::missing("ghosts").with_dialect(Dialect::Mysql);
        assert!(!gone.table_exists());
        assert_eq!(gone.dialect(), Dialect::Mysql);
    }
}
