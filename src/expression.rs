//! Spherical law of cosines as a reusable SQL fragment.
//!
//! The origin's angles are converted to radians when the expression is built; the
//! row's angles are converted inside SQL because they vary per row. The cosine sum
//! is clamped to 1 before `ACOS`: rounding pushes it fractionally above 1 when a
//! row sits exactly on the origin, which is outside `ACOS`'s domain.

use std::fmt;

use crate::config::TableGeoConfig;
use crate::host::{IdentifierQuoter, PgQuoting};
use crate::origin::Coordinate;

/// Piece of the distance formula. Text rendering and Diesel's AST walk both
/// iterate [`FORMULA`] so they cannot drift apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Term {
    Sql(&'static str),
    Radius,
    OriginLatitude,
    OriginLongitude,
    RowLatitude,
    RowLongitude,
}

pub(crate) const FORMULA: &[Term] = &[
    Term::Sql("("),
    Term::Radius,
    Term::Sql(" * ACOS(LEAST(1, COS("),
    Term::OriginLatitude,
    Term::Sql(") * COS("),
    Term::OriginLongitude,
    Term::Sql(") * COS(RADIANS("),
    Term::RowLatitude,
    Term::Sql(")) * COS(RADIANS("),
    Term::RowLongitude,
    Term::Sql(")) + COS("),
    Term::OriginLatitude,
    Term::Sql(") * SIN("),
    Term::OriginLongitude,
    Term::Sql(") * COS(RADIANS("),
    Term::RowLatitude,
    Term::Sql(")) * SIN(RADIANS("),
    Term::RowLongitude,
    Term::Sql(")) + SIN("),
    Term::OriginLatitude,
    Term::Sql(") * SIN(RADIANS("),
    Term::RowLatitude,
    Term::Sql(")))))"),
];

/// Distance from a fixed origin to each row of a table
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceExpression {
    pub(crate) origin: Coordinate,
    pub(crate) origin_latitude_rad: f64,
    pub(crate) origin_longitude_rad: f64,
    pub(crate) table: String,
    pub(crate) latitude_column: String,
    pub(crate) longitude_column: String,
    pub(crate) radius: f64,
}

impl DistanceExpression {
    pub fn build(
        origin: Coordinate,
        table: &str,
        latitude_column: &str,
        longitude_column: &str,
        radius: f64,
    ) -> Self {
        let (origin_latitude_rad, origin_longitude_rad) = origin.to_radians();
        Self {
            origin,
            origin_latitude_rad,
            origin_longitude_rad,
            table: table.to_string(),
            latitude_column: latitude_column.to_string(),
            longitude_column: longitude_column.to_string(),
            radius,
        }
    }

    /// Build against the columns and radius of an installed table, qualifying
    /// columns with `source` (the table name or an alias the query uses for it)
    pub fn for_config(origin: Coordinate, source: &str, config: &TableGeoConfig) -> Self {
        Self::build(
            origin,
            source,
            &config.latitude_column,
            &config.longitude_column,
            config.radius,
        )
    }

    pub fn origin(&self) -> Coordinate {
        self.origin
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Render as SQL text, quoting identifiers with `quoter`
    pub fn to_sql<Q: IdentifierQuoter + ?Sized>(&self, quoter: &Q) -> String {
        let qualified = |column: &str| {
            format!(
                "{}.{}",
                quoter.quote_identifier(&self.table),
                quoter.quote_identifier(column)
            )
        };
        let row_latitude = qualified(&self.latitude_column);
        let row_longitude = qualified(&self.longitude_column);

        let mut sql = String::with_capacity(400);
        for term in FORMULA {
            match term {
                Term::Sql(text) => sql.push_str(text),
                Term::Radius => sql.push_str(&self.radius.to_string()),
                Term::OriginLatitude => sql.push_str(&self.origin_latitude_rad.to_string()),
                Term::OriginLongitude => sql.push_str(&self.origin_longitude_rad.to_string()),
                Term::RowLatitude => sql.push_str(&row_latitude),
                Term::RowLongitude => sql.push_str(&row_longitude),
            }
        }
        sql
    }

    /// Evaluate the same formula locally for one row position, in the
    /// expression's units. Mirrors [`FORMULA`] product by product; keep the two
    /// in step.
    pub fn evaluate(&self, latitude: f64, longitude: f64) -> f64 {
        let (olat, olng) = (self.origin_latitude_rad, self.origin_longitude_rad);
        let (rlat, rlng) = (latitude.to_radians(), longitude.to_radians());

        let cosine_sum = olat.cos() * olng.cos() * rlat.cos() * rlng.cos()
            + olat.cos() * olng.sin() * rlat.cos() * rlng.sin()
            + olat.sin() * rlat.sin();

        self.radius * cosine_sum.min(1.0).acos()
    }
}

impl fmt::Display for DistanceExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql(&PgQuoting))
    }
}
