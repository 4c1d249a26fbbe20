//! Turning caller-supplied origins into a latitude/longitude pair.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::GeoError;
use crate::host::ColumnAccessor;

/// A point in decimal degrees. Ranges are not checked.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// (latitude, longitude) in radians
    pub fn to_radians(self) -> (f64, f64) {
        (self.latitude.to_radians(), self.longitude.to_radians())
    }
}

impl From<geo::Point<f64>> for Coordinate {
    fn from(point: geo::Point<f64>) -> Self {
        Coordinate::new(point.y(), point.x())
    }
}

impl From<Coordinate> for geo::Point<f64> {
    fn from(coordinate: Coordinate) -> Self {
        geo::Point::new(coordinate.longitude, coordinate.latitude)
    }
}

/// PostGIS points store longitude in x and latitude in y
impl From<&postgis_diesel::types::Point> for Coordinate {
    fn from(point: &postgis_diesel::types::Point) -> Self {
        Coordinate::new(point.y, point.x)
    }
}

/// The reference point a distance is measured from
#[derive(Clone, Copy)]
pub enum Origin<'a> {
    /// Latitude and longitude by position
    Pair(f64, f64),
    /// A row-like value read through accessors named after the table's
    /// latitude and longitude columns
    Record(&'a dyn ColumnAccessor),
}

impl std::fmt::Debug for Origin<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Origin::Pair(lat, lng) => f.debug_tuple("Pair").field(lat).field(lng).finish(),
            Origin::Record(_) => f.write_str("Record(..)"),
        }
    }
}

impl<'a> Origin<'a> {
    pub fn record<R: ColumnAccessor>(record: &'a R) -> Self {
        Origin::Record(record)
    }

    /// Build a pair origin from a list that must hold exactly two values
    pub fn from_slice(values: &[f64]) -> Result<Origin<'static>, GeoError> {
        match values {
            [lat, lng] => Ok(Origin::Pair(*lat, *lng)),
            _ => Err(GeoError::MissingCoordinate(format!(
                "expected a [latitude, longitude] pair, got {} value(s)",
                values.len()
            ))),
        }
    }

    /// Interpret loosely-typed input: a two-number array is a pair, an object is a
    /// record. Anything else cannot be an origin.
    pub fn from_json(value: &'a Value) -> Result<Self, GeoError> {
        match value {
            Value::Array(items) => {
                let numbers: Option<Vec<f64>> = items.iter().map(Value::as_f64).collect();
                match numbers {
                    Some(numbers) => Origin::from_slice(&numbers),
                    None => Err(GeoError::MissingCoordinate(
                        "origin array must contain only numbers".to_string(),
                    )),
                }
            }
            Value::Object(_) => Ok(Origin::Record(value)),
            other => Err(GeoError::MissingCoordinate(format!(
                "origin must be a [latitude, longitude] pair or a record, got {}",
                other
            ))),
        }
    }
}

impl From<(f64, f64)> for Origin<'_> {
    fn from((lat, lng): (f64, f64)) -> Self {
        Origin::Pair(lat, lng)
    }
}

impl From<[f64; 2]> for Origin<'_> {
    fn from([lat, lng]: [f64; 2]) -> Self {
        Origin::Pair(lat, lng)
    }
}

impl From<Coordinate> for Origin<'_> {
    fn from(coordinate: Coordinate) -> Self {
        Origin::Pair(coordinate.latitude, coordinate.longitude)
    }
}

/// Resolve an origin to a coordinate. Record origins are read through the
/// accessors named `lat_column` and `lng_column`.
pub fn resolve(origin: &Origin<'_>, lat_column: &str, lng_column: &str) -> Result<Coordinate, GeoError> {
    match origin {
        Origin::Pair(lat, lng) => Ok(Coordinate::new(
            finite(*lat, "latitude")?,
            finite(*lng, "longitude")?,
        )),
        Origin::Record(record) => {
            let latitude = read_numeric(*record, lat_column)?;
            let longitude = read_numeric(*record, lng_column)?;
            Ok(Coordinate::new(latitude, longitude))
        }
    }
}

fn finite(value: f64, what: &str) -> Result<f64, GeoError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(GeoError::MissingCoordinate(format!("{} is not a finite number", what)))
    }
}

fn read_numeric(record: &dyn ColumnAccessor, column: &str) -> Result<f64, GeoError> {
    let value = record.column_value(column).ok_or_else(|| {
        GeoError::MissingCoordinate(format!("origin has no '{}' accessor", column))
    })?;

    let number = match &value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if !s.trim().is_empty() => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match number {
        Some(n) => finite(n, column),
        None => Err(GeoError::MissingCoordinate(format!(
            "origin '{}' is empty or not numeric: {}",
            column, value
        ))),
    }
}
