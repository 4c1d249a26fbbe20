//! [`DistanceExpression`] as a Diesel expression.
//!
//! Origin angles and the radius are sent as `Double` bind parameters; row columns
//! are pushed as quoted identifiers. The expression can be used anywhere a
//! `Double` expression is accepted:
//!
//! ```ignore
//! let distance = DistanceExpression::for_config(origin, "stores", config);
//! stores::table
//!     .select((stores::id, distance.clone()))
//!     .filter(distance.clone().within(20.0))
//!     .order(distance.asc())
//! ```
//!
//! Column names are not checked against the table, the same as `diesel::dsl::sql`.

use diesel::ExpressionMethods;
use diesel::expression::{
    AppearsOnTable, Expression, SelectableExpression, ValidGrouping, is_aggregate,
};
use diesel::pg::Pg;
use diesel::query_builder::{AstPass, QueryFragment, QueryId};
use diesel::result::QueryResult;
use diesel::sql_types::Double;

use crate::expression::{DistanceExpression, FORMULA, Term};

impl Expression for DistanceExpression {
    type SqlType = Double;
}

impl QueryFragment<Pg> for DistanceExpression {
    fn walk_ast<'b>(&'b self, mut out: AstPass<'_, 'b, Pg>) -> QueryResult<()> {
        for term in FORMULA {
            match term {
                Term::Sql(text) => out.push_sql(text),
                Term::Radius => out.push_bind_param::<Double, _>(&self.radius)?,
                Term::OriginLatitude => {
                    out.push_bind_param::<Double, _>(&self.origin_latitude_rad)?
                }
                Term::OriginLongitude => {
                    out.push_bind_param::<Double, _>(&self.origin_longitude_rad)?
                }
                Term::RowLatitude => {
                    out.push_identifier(&self.table)?;
                    out.push_sql(".");
                    out.push_identifier(&self.latitude_column)?;
                }
                Term::RowLongitude => {
                    out.push_identifier(&self.table)?;
                    out.push_sql(".");
                    out.push_identifier(&self.longitude_column)?;
                }
            }
        }
        Ok(())
    }
}

// Identifiers differ between instances, so the SQL text is not static
impl QueryId for DistanceExpression {
    type QueryId = ();

    const HAS_STATIC_QUERY_ID: bool = false;
}

impl<GB> ValidGrouping<GB> for DistanceExpression {
    type IsAggregate = is_aggregate::Never;
}

impl<QS: ?Sized> AppearsOnTable<QS> for DistanceExpression {}

impl<QS: ?Sized> SelectableExpression<QS> for DistanceExpression {}

impl DistanceExpression {
    /// `distance <= limit`, for use in `.filter(..)`
    pub fn within(self, limit: f64) -> diesel::dsl::LtEq<Self, f64> {
        self.le(limit)
    }
}
