use std::time::Duration;

use nearbyaid_shared::constants::{FALLBACK_LATITUDE, FALLBACK_LONGITUDE};
use nearbyaid_shared::GeoPoint;

const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";

/// Client settings. `base_url` points at the API mount, e.g.
/// `https://aid.example.org/api`.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub base_url: String,
    pub request_timeout: Duration,
    /// How long to wait for a device fix before using `fallback_location`.
    pub geolocation_timeout: Duration,
    pub fallback_location: GeoPoint,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(10),
            geolocation_timeout: Duration::from_secs(10),
            fallback_location: GeoPoint::from_lat_lng(FALLBACK_LATITUDE, FALLBACK_LONGITUDE),
        }
    }
}

impl ClientConfig {
    /// Defaults, with `NEARBYAID_API_URL` overriding the base URL.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("NEARBYAID_API_URL") {
            if !url.trim().is_empty() {
                config.base_url = url;
            }
        }
        config
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_geolocation_timeout(mut self, timeout: Duration) -> Self {
        self.geolocation_timeout = timeout;
        self
    }
}
