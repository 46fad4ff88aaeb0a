/// Application name
pub const APP_NAME: &str = "NearByAid";

/// Radius used by `/api/aid/nearby` when `maxDistance` is omitted (meters)
pub const DEFAULT_MAX_DISTANCE_M: f64 = 10_000.0;

/// Radius the client switches to in emergency mode (meters)
pub const EMERGENCY_MAX_DISTANCE_M: f64 = 15_000.0;

/// Field length limits, counted in characters
pub const MAX_TITLE_LEN: usize = 100;
pub const MAX_DESCRIPTION_LEN: usize = 500;
pub const MAX_CONTACT_LEN: usize = 20;
pub const MAX_NAME_LEN: usize = 50;
pub const MIN_PASSWORD_LEN: usize = 6;

/// Map position used when the device location is unavailable (Varanasi).
pub const FALLBACK_LATITUDE: f64 = 25.3176;
pub const FALLBACK_LONGITUDE: f64 = 82.9739;

/// Default HTTP API port (server)
pub const DEFAULT_HTTP_PORT: u16 = 5000;
