//! Composing distance expressions into host queries.
//!
//! Every function here is pure: it returns a new query and leaves its input alone.
//! Origin errors propagate unchanged.

use tracing::debug;

use crate::config::{GeoCapable, TableGeoConfig};
use crate::error::GeoError;
use crate::expression::DistanceExpression;
use crate::host::QueryDescriptor;
use crate::origin::{Origin, resolve};
use crate::query::{Expr, SortDirection};

fn installed_config<G: GeoCapable + ?Sized>(geo: &G) -> Result<&TableGeoConfig, GeoError> {
    geo.geo_config().ok_or_else(|| GeoError::NotInstalled {
        table: geo.geo_table_name().to_string(),
    })
}

/// Distance expression from `origin` to each row of `query`'s source table
pub fn distance_expression<Q, G>(
    query: &Q,
    geo: &G,
    origin: &Origin<'_>,
) -> Result<DistanceExpression, GeoError>
where
    Q: QueryDescriptor,
    G: GeoCapable + ?Sized,
{
    let config = installed_config(geo)?;
    let coordinate = resolve(origin, &config.latitude_column, &config.longitude_column)?;
    Ok(DistanceExpression::for_config(
        coordinate,
        query.source_table_name(),
        config,
    ))
}

/// Select the distance from `origin` as the configured distance column.
///
/// Existing explicit selections are kept. A query without an explicit selection
/// gets an explicit all-columns item first, since appending a column would
/// otherwise narrow it to the distance alone.
pub fn distance_from<Q, G>(query: &Q, geo: &G, origin: &Origin<'_>) -> Result<Q, GeoError>
where
    Q: QueryDescriptor,
    G: GeoCapable + ?Sized,
{
    let distance = distance_expression(query, geo, origin)?;
    let config = installed_config(geo)?;

    debug!(
        table = query.source_table_name(),
        latitude = distance.origin().latitude,
        longitude = distance.origin().longitude,
        "Selecting distance as '{}'",
        config.distance_column
    );

    let column = Expr::from(distance).aliased(config.distance_column.clone());
    let items = match query.current_selection() {
        None => vec![Expr::AllColumns, column],
        Some(_) => vec![column],
    };

    Ok(query.add_selection(items))
}

/// Keep only rows within `limit` (in the table's units) of `origin`.
/// The selection is not touched. A NaN or infinite `limit` is rejected.
pub fn distance_boundary<Q, G>(
    query: &Q,
    geo: &G,
    limit: f64,
    origin: &Origin<'_>,
) -> Result<Q, GeoError>
where
    Q: QueryDescriptor,
    G: GeoCapable + ?Sized,
{
    if !limit.is_finite() {
        return Err(GeoError::InvalidBoundary(limit.to_string()));
    }
    let distance = distance_expression(query, geo, origin)?;

    debug!(
        table = query.source_table_name(),
        limit,
        "Filtering by distance boundary"
    );

    Ok(query.add_filter(Expr::from(distance).at_most(limit)))
}

/// Order rows by their distance from `origin`. Selection and filters are not touched.
pub fn order_by_distance<Q, G>(
    query: &Q,
    geo: &G,
    origin: &Origin<'_>,
    direction: SortDirection,
) -> Result<Q, GeoError>
where
    Q: QueryDescriptor,
    G: GeoCapable + ?Sized,
{
    let distance = distance_expression(query, geo, origin)?;
    Ok(query.add_order(Expr::from(distance), direction))
}
