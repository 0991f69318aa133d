use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geolocation::GeolocationError;

/// What a single request asks the weather endpoint for.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    City(String),
    Coordinates(Coordinates),
}

impl LocationQuery {
    /// Builds a city query from raw user input.
    ///
    /// Returns `None` when the input is empty after trimming.
    pub fn city(input: &str) -> Option<Self> {
        let city = input.trim();
        if city.is_empty() {
            None
        } else {
            Some(Self::City(city.to_string()))
        }
    }
}

impl std::fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocationQuery::City(city) => f.write_str(city),
            LocationQuery::Coordinates(c) => write!(f, "({}, {})", c.latitude, c.longitude),
        }
    }
}

/// Latitude and longitude as supplied, before any range check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawPosition {
    pub latitude: f64,
    pub longitude: f64,
}

impl From<Coordinates> for RawPosition {
    fn from(c: Coordinates) -> Self {
        Self { latitude: c.latitude, longitude: c.longitude }
    }
}

/// A position known to be in range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPosition")]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, GeolocationError> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(GeolocationError::InvalidCoordinates { latitude, longitude });
        }
        Ok(Self { latitude, longitude })
    }
}

impl TryFrom<RawPosition> for Coordinates {
    type Error = GeolocationError;

    fn try_from(raw: RawPosition) -> Result<Self, Self::Error> {
        Self::new(raw.latitude, raw.longitude)
    }
}

/// Raw JSON body returned by the endpoint. Nothing about its shape is
/// checked until it is rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherDocument(pub serde_json::Value);

/// Fields extracted from a [`WeatherDocument`] for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub location_name: String,
    pub temperature_c: f64,
    pub description: String,
    pub humidity_pct: i64,
    pub icon_code: String,
    pub observation_time: Option<DateTime<Utc>>,
}
