//! Errors raised while installing geosearch on a table or building a distance query.

use std::fmt;

/// Why a table cannot carry geosearch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnsupportedReason {
    /// The table is not present in the database
    MissingTable,
    /// The dialect lacks the trigonometric functions the distance formula uses
    Dialect(String),
}

impl fmt::Display for UnsupportedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnsupportedReason::MissingTable => write!(f, "table does not exist"),
            UnsupportedReason::Dialect(dialect) => {
                write!(f, "dialect '{}' is not supported", dialect)
            }
        }
    }
}

/// Errors that can occur during geosearch installation or query augmentation
#[derive(Debug, Clone, PartialEq)]
pub enum GeoError {
    /// The table is absent or its dialect is unsupported. Installation reports this
    /// as a disabled status rather than a hard failure.
    UnsupportedTarget {
        table: String,
        reason: UnsupportedReason,
    },
    /// `distance_units` named something other than miles, kilometers or nautical_miles
    InvalidUnits(String),
    /// The distance column would shadow a real column on the table
    ColumnCollision { table: String, column: String },
    /// The origin could not be turned into a latitude/longitude pair
    MissingCoordinate(String),
    /// A distance boundary that is NaN or infinite, kept as its rendered text
    InvalidBoundary(String),
    /// Geosearch was already installed on this table
    AlreadyInstalled { table: String },
    /// A distance query was requested for a table without geosearch
    NotInstalled { table: String },
}

impl fmt::Display for GeoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeoError::UnsupportedTarget { table, reason } => {
                write!(f, "Unsupported geosearch target '{}': {}", table, reason)
            }
            GeoError::InvalidUnits(units) => write!(
                f,
                "Invalid distance units '{}': expected one of miles, kilometers, nautical_miles",
                units
            ),
            GeoError::ColumnCollision { table, column } => write!(
                f,
                "Distance column '{}' already exists on table '{}'",
                column, table
            ),
            GeoError::MissingCoordinate(detail) => {
                write!(f, "Missing origin coordinate: {}", detail)
            }
            GeoError::InvalidBoundary(limit) => {
                write!(f, "Invalid distance boundary '{}': must be a finite number", limit)
            }
            GeoError::AlreadyInstalled { table } => {
                write!(f, "Geosearch is already installed on table '{}'", table)
            }
            GeoError::NotInstalled { table } => {
                write!(f, "Geosearch is not installed on table '{}'", table)
            }
        }
    }
}

impl std::error::Error for GeoError {}

impl GeoError {
    /// True for errors that only disable geosearch for a table instead of failing installation
    pub fn is_soft(&self) -> bool {
        matches!(self, GeoError::UnsupportedTarget { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_offending_value() {
        let err = GeoError::ColumnCollision {
            table: "stores".to_string(),
            column: "distance".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Distance column 'distance' already exists on table 'stores'"
        );

        let err = GeoError::UnsupportedTarget {
            table: "stores".to_string(),
            reason: UnsupportedReason::Dialect("sqlite".to_string()),
        };
        assert!(err.to_string().contains("dialect 'sqlite' is not supported"));
    }

    #[test]
    fn test_only_unsupported_target_is_soft() {
        let soft = GeoError::UnsupportedTarget {
            table: "t".to_string(),
            reason: UnsupportedReason::MissingTable,
        };
        assert!(soft.is_soft());
        assert!(!GeoError::InvalidUnits("furlongs".to_string()).is_soft());
        assert!(!GeoError::MissingCoordinate("empty".to_string()).is_soft());
        assert!(!GeoError::InvalidBoundary("NaN".to_string()).is_soft());
    }
}
