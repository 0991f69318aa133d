//! The weather widget: one object owning the display slots and everything
//! needed to fill them.
//!
//! Every request cycle takes a ticket from a monotonically increasing counter.
//! A cycle may only touch the slots (or raise an alert) while its ticket is
//! still the latest one issued, so a slow response can never overwrite the
//! result of a request started after it.

use parking_lot::Mutex;
use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};
use tracing::{debug, error, info, warn};

use crate::{
    Config, Coordinates, DisplaySlots, LocationQuery, WeatherReport,
    alert::{AlertSink, CURRENT_LOCATION_ALERT, FETCH_ALERT, INPUT_ALERT, RENDER_ALERT},
    config::DEFAULT_CITY,
    display::{DEFAULT_CITY_TEXT, IconSlot, LOCATING_TEXT, RenderError},
    geolocation::{GeolocationError, Geolocator, locate_with_timeout},
    provider::{FetchError, WeatherFetcher, fetcher_from_config},
};

#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

impl RequestError {
    fn alert_message(&self) -> &'static str {
        match self {
            RequestError::Fetch(_) => FETCH_ALERT,
            RequestError::Render(_) => RENDER_ALERT,
        }
    }

    fn outcome(&self) -> Outcome {
        match self {
            RequestError::Fetch(_) => Outcome::FetchFailed,
            RequestError::Render(_) => Outcome::RenderFailed,
        }
    }
}

/// How a single widget action ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Rendered,
    FetchFailed,
    RenderFailed,
    /// Empty input; nothing was requested.
    InputRejected,
    /// A newer request was issued before this one finished.
    Superseded,
}

#[derive(Debug)]
pub struct WeatherWidget {
    fetcher: Box<dyn WeatherFetcher>,
    geolocator: Box<dyn Geolocator>,
    alerts: Arc<dyn AlertSink>,
    slots: Mutex<DisplaySlots>,
    issued: AtomicU64,
    default_city: String,
    geolocation_timeout: Duration,
}

impl WeatherWidget {
    pub fn new(
        fetcher: Box<dyn WeatherFetcher>,
        geolocator: Box<dyn Geolocator>,
        alerts: Arc<dyn AlertSink>,
    ) -> Self {
        Self {
            fetcher,
            geolocator,
            alerts,
            slots: Mutex::new(DisplaySlots::default()),
            issued: AtomicU64::new(0),
            default_city: DEFAULT_CITY.to_string(),
            geolocation_timeout: Duration::from_secs(10),
        }
    }

    pub fn from_config(
        config: &Config,
        geolocator: Box<dyn Geolocator>,
        alerts: Arc<dyn AlertSink>,
    ) -> anyhow::Result<Self> {
        Ok(Self::new(fetcher_from_config(config)?, geolocator, alerts)
            .with_default_city(config.default_city())
            .with_geolocation_timeout(config.geolocation_timeout()))
    }

    pub fn with_default_city(mut self, city: impl Into<String>) -> Self {
        self.default_city = city.into();
        self
    }

    pub fn with_geolocation_timeout(mut self, timeout: Duration) -> Self {
        self.geolocation_timeout = timeout;
        self
    }

    /// Snapshot of what the widget currently shows.
    pub fn slots(&self) -> DisplaySlots {
        self.slots.lock().clone()
    }

    /// Page-load behaviour: try the device position, fall back to the
    /// default city.
    pub async fn init(&self) -> Outcome {
        let ticket = self.issue();
        self.apply(ticket, |s| s.icon = IconSlot::default());

        if !self.geolocator.is_supported() {
            return self.fall_back(ticket, GeolocationError::Unsupported.to_string()).await;
        }

        self.apply(ticket, |s| s.location = LOCATING_TEXT.to_string());
        match locate_with_timeout(self.geolocator.as_ref(), self.geolocation_timeout).await {
            Ok(position) => self.show_position(ticket, position).await,
            Err(err) => self.fall_back(ticket, err.to_string()).await,
        }
    }

    /// Search for the city typed by the user (button press or Enter).
    pub async fn submit(&self, input: &str) -> Outcome {
        let Some(query) = LocationQuery::city(input) else {
            debug!("empty city input rejected");
            self.alerts.alert(INPUT_ALERT);
            return Outcome::InputRejected;
        };

        let ticket = self.issue();
        match self.load(ticket, &query).await {
            Ok(report) => self.finish(ticket, &report),
            Err(err) => self.fail(ticket, err, true),
        }
    }

    async fn show_position(&self, ticket: u64, position: Coordinates) -> Outcome {
        if !self.is_current(ticket) {
            return Outcome::Superseded;
        }

        match self.load(ticket, &LocationQuery::Coordinates(position)).await {
            Ok(report) => self.finish(ticket, &report),
            Err(RequestError::Fetch(err)) => {
                if !self.is_current(ticket) {
                    debug!(ticket, "discarding superseded failure");
                    return Outcome::Superseded;
                }
                error!(error = %err, "failed to fetch weather for current location");
                self.alerts.alert(CURRENT_LOCATION_ALERT);
                self.fall_back(ticket, err.to_string()).await
            }
            Err(err) => self.fail(ticket, err, true),
        }
    }

    /// Shows the default city. Failures here are logged, never alerted.
    async fn fall_back(&self, ticket: u64, reason: String) -> Outcome {
        warn!(%reason, city = %self.default_city, "location unavailable, using default city");
        if !self.apply(ticket, |s| s.location = DEFAULT_CITY_TEXT.to_string()) {
            return Outcome::Superseded;
        }

        let query = LocationQuery::City(self.default_city.clone());
        match self.load(ticket, &query).await {
            Ok(report) => self.finish(ticket, &report),
            Err(err) => self.fail(ticket, err, false),
        }
    }

    async fn load(&self, ticket: u64, query: &LocationQuery) -> Result<WeatherReport, RequestError> {
        debug!(ticket, %query, "requesting weather");
        let document = self.fetcher.fetch(query).await?;
        Ok(WeatherReport::try_from(&document)?)
    }

    fn finish(&self, ticket: u64, report: &WeatherReport) -> Outcome {
        if !self.apply(ticket, |s| s.show(report)) {
            debug!(ticket, "discarding superseded response");
            return Outcome::Superseded;
        }
        info!(ticket, location = %report.location_name, "weather rendered");
        Outcome::Rendered
    }

    fn fail(&self, ticket: u64, err: RequestError, alert: bool) -> Outcome {
        if !self.apply(ticket, DisplaySlots::show_error) {
            debug!(ticket, error = %err, "discarding superseded failure");
            return Outcome::Superseded;
        }
        error!(ticket, error = %err, "weather request failed");
        if alert {
            self.alerts.alert(err.alert_message());
        }
        err.outcome()
    }

    fn issue(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, ticket: u64) -> bool {
        self.issued.load(Ordering::SeqCst) == ticket
    }

    /// Runs `update` on the slots if `ticket` is still the latest. The check
    /// happens under the slot lock.
    fn apply(&self, ticket: u64, update: impl FnOnce(&mut DisplaySlots)) -> bool {
        let mut slots = self.slots.lock();
        if !self.is_current(ticket) {
            return false;
        }
        update(&mut slots);
        true
    }
}
