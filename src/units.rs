use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::GeoError;

/// Earth radius in statute miles
pub const EARTH_RADIUS_MILES: f64 = 3963.0;
/// Earth radius in kilometers
pub const EARTH_RADIUS_KILOMETERS: f64 = 6378.0;
/// Earth radius in nautical miles
pub const EARTH_RADIUS_NAUTICAL_MILES: f64 = 3444.0;

/// Unit a distance expression reports its result in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceUnits {
    #[default]
    Miles,
    Kilometers,
    NauticalMiles,
}

impl DistanceUnits {
    /// Earth radius expressed in this unit
    pub fn radius(self) -> f64 {
        match self {
            DistanceUnits::Miles => EARTH_RADIUS_MILES,
            DistanceUnits::Kilometers => EARTH_RADIUS_KILOMETERS,
            DistanceUnits::NauticalMiles => EARTH_RADIUS_NAUTICAL_MILES,
        }
    }

    /// Resolve an optional unit symbol. Only an absent symbol falls back to miles;
    /// a present but unknown symbol is an error.
    pub fn from_option(symbol: Option<&str>) -> Result<Self, GeoError> {
        match symbol {
            None => Ok(DistanceUnits::default()),
            Some(s) => s.parse(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DistanceUnits::Miles => "miles",
            DistanceUnits::Kilometers => "kilometers",
            DistanceUnits::NauticalMiles => "nautical_miles",
        }
    }
}

impl FromStr for DistanceUnits {
    type Err = GeoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "miles" => Ok(DistanceUnits::Miles),
            "kilometers" => Ok(DistanceUnits::Kilometers),
            "nautical_miles" => Ok(DistanceUnits::NauticalMiles),
            other => Err(GeoError::InvalidUnits(other.to_string())),
        }
    }
}

impl fmt::Display for DistanceUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Earth radius for a unit symbol
pub fn radius_for(symbol: Option<&str>) -> Result<f64, GeoError> {
    DistanceUnits::from_option(symbol).map(DistanceUnits::radius)
}
