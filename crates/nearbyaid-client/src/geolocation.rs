//! Device location with a bounded wait and a fallback coordinate.

use std::time::Duration;

use async_trait::async_trait;
use nearbyaid_shared::GeoPoint;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("location unavailable: {0}")]
    Unavailable(String),
}

/// Source of the device position (GPS, OS location service, IP lookup...).
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_location(&self) -> Result<GeoPoint, LocationError>;
}

/// Provider that always reports the same point.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub GeoPoint);

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn current_location(&self) -> Result<GeoPoint, LocationError> {
        Ok(self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationSource {
    Device,
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Located {
    pub point: GeoPoint,
    pub source: LocationSource,
}

/// Ask `provider` once. Any failure, a non-finite fix, or no answer within
/// `timeout` yields `fallback` instead of an error.
pub async fn locate_with_fallback(
    provider: &dyn LocationProvider,
    timeout: Duration,
    fallback: GeoPoint,
) -> Located {
    let outcome = tokio::time::timeout(timeout, provider.current_location()).await;
    match outcome {
        Ok(Ok(point)) if point.is_finite() => Located {
            point,
            source: LocationSource::Device,
        },
        Ok(Ok(point)) => {
            debug!(?point, "Device reported a non-finite position, using fallback");
            fallback_to(fallback)
        }
        Ok(Err(e)) => {
            debug!(error = %e, "Geolocation failed, using fallback");
            fallback_to(fallback)
        }
        Err(_) => {
            debug!(timeout_ms = timeout.as_millis() as u64, "Geolocation timed out, using fallback");
            fallback_to(fallback)
        }
    }
}

fn fallback_to(point: GeoPoint) -> Located {
    Located {
        point,
        source: LocationSource::Fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Denied;

    #[async_trait]
    impl LocationProvider for Denied {
        async fn current_location(&self) -> Result<GeoPoint, LocationError> {
            Err(LocationError::PermissionDenied)
        }
    }

    struct Hanging;

    #[async_trait]
    impl LocationProvider for Hanging {
        async fn current_location(&self) -> Result<GeoPoint, LocationError> {
            std::future::pending().await
        }
    }

    fn varanasi() -> GeoPoint {
        GeoPoint::from_lat_lng(25.3176, 82.9739)
    }

    #[tokio::test]
    async fn test_device_fix_is_used() {
        let here = GeoPoint::from_lat_lng(28.61, 77.21);
        let located =
            locate_with_fallback(&FixedLocation(here), Duration::from_secs(1), varanasi()).await;
        assert_eq!(located.point, here);
        assert_eq!(located.source, LocationSource::Device);
    }

    #[tokio::test]
    async fn test_failure_falls_back() {
        let located = locate_with_fallback(&Denied, Duration::from_secs(1), varanasi()).await;
        assert_eq!(located.point, varanasi());
        assert_eq!(located.source, LocationSource::Fallback);
    }

    #[tokio::test]
    async fn test_timeout_falls_back() {
        let located = locate_with_fallback(&Hanging, Duration::from_millis(50), varanasi()).await;
        assert_eq!(located.source, LocationSource::Fallback);
    }
}
