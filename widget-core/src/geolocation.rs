//! Device position lookup.
//!
//! The widget only needs "where am I, roughly" once at start-up, and must cope
//! with the capability being missing or failing.

use async_trait::async_trait;
use std::{fmt::Debug, time::Duration};

use crate::{Coordinates, RawPosition};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeolocationError {
    #[error("location permission denied")]
    PermissionDenied,
    #[error("location request timed out after {0:?}")]
    Timeout(Duration),
    #[error("geolocation is not supported")]
    Unsupported,
    #[error("invalid coordinates ({latitude}, {longitude})")]
    InvalidCoordinates { latitude: f64, longitude: f64 },
    #[error("location error: {0}")]
    Other(String),
}

#[async_trait]
pub trait Geolocator: Send + Sync + Debug {
    /// Whether this host can provide a position at all.
    fn is_supported(&self) -> bool {
        true
    }

    async fn current_position(&self) -> Result<Coordinates, GeolocationError>;
}

/// A position known up front, e.g. from the command line or config file.
///
/// The range check happens on lookup, so a bad value surfaces as a
/// geolocation failure rather than a request.
#[derive(Debug, Clone, Copy)]
pub struct FixedGeolocator {
    position: RawPosition,
}

impl FixedGeolocator {
    pub fn new(position: impl Into<RawPosition>) -> Self {
        Self { position: position.into() }
    }
}

#[async_trait]
impl Geolocator for FixedGeolocator {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        Coordinates::try_from(self.position)
    }
}

/// Host without any geolocation capability.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGeolocation;

#[async_trait]
impl Geolocator for NoGeolocation {
    fn is_supported(&self) -> bool {
        false
    }

    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        Err(GeolocationError::Unsupported)
    }
}

/// Asks `geolocator` for a position, giving up after `limit`.
pub async fn locate_with_timeout(
    geolocator: &dyn Geolocator,
    limit: Duration,
) -> Result<Coordinates, GeolocationError> {
    tokio::time::timeout(limit, geolocator.current_position())
        .await
        .map_err(|_| GeolocationError::Timeout(limit))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Stalled;

    #[async_trait]
    impl Geolocator for Stalled {
        async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Err(GeolocationError::Other("unreachable".into()))
        }
    }

    #[tokio::test]
    async fn fixed_position_is_returned() {
        let pos = Coordinates::new(43.06, 141.35).unwrap();
        let got = locate_with_timeout(&FixedGeolocator::new(pos), Duration::from_secs(1)).await;
        assert_eq!(got, Ok(pos));
    }

    #[tokio::test]
    async fn fixed_out_of_range_position_is_a_lookup_error() {
        let geo = FixedGeolocator::new(RawPosition { latitude: 200.0, longitude: 0.0 });
        let err = geo.current_position().await.unwrap_err();
        assert_eq!(err, GeolocationError::InvalidCoordinates { latitude: 200.0, longitude: 0.0 });
    }

    #[tokio::test]
    async fn unsupported_host_reports_unsupported() {
        assert!(!NoGeolocation.is_supported());
        let err = NoGeolocation.current_position().await.unwrap_err();
        assert_eq!(err, GeolocationError::Unsupported);
    }

    #[tokio::test]
    async fn slow_lookup_times_out() {
        let limit = Duration::from_millis(20);
        let err = locate_with_timeout(&Stalled, limit).await.unwrap_err();
        assert_eq!(err, GeolocationError::Timeout(limit));
    }

    #[test]
    fn out_of_range_coordinates_are_rejected() {
        assert!(Coordinates::new(91.0, 0.0).is_err());
        assert!(Coordinates::new(0.0, -180.5).is_err());
        assert!(Coordinates::new(-90.0, 180.0).is_ok());
    }
}
