//! Core library for the `weather-widget` binary.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The weather fetcher abstraction and its OpenWeather client
//! - The geolocation and alert seams
//! - Display slots and the [`WeatherWidget`] that fills them
//!
//! It is used by `weather-widget`, but can also be embedded in other front ends.

pub mod alert;
pub mod config;
pub mod display;
pub mod geolocation;
pub mod model;
pub mod provider;
pub mod widget;

pub use alert::{AlertSink, RecordingAlerts};
pub use config::Config;
pub use display::{DisplaySlots, IconSlot, RenderError};
pub use geolocation::{FixedGeolocator, GeolocationError, Geolocator, NoGeolocation};
pub use model::{Coordinates, LocationQuery, RawPosition, WeatherDocument, WeatherReport};
pub use provider::{Endpoint, FetchError, WeatherFetcher, openweather::OpenWeatherClient};
pub use widget::{Outcome, RequestError, WeatherWidget};
