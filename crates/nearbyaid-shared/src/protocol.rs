//! JSON bodies exchanged between the server and its clients.
//!
//! Request bodies keep every field optional so that a missing field reaches
//! the validation layer and comes back as a field-level 400 instead of a
//! generic deserialization failure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{AidStatus, Category, GeoPoint};

/// A coordinate as sent by a client: either a JSON number or a numeric
/// string (form-encoded clients send the latter).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumberOrText {
    Number(f64),
    Text(String),
}

impl From<f64> for NumberOrText {
    fn from(v: f64) -> Self {
        NumberOrText::Number(v)
    }
}

/// Body of `POST /api/aid`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateAidRequest {
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub category: Option<String>,
    pub description: Option<String>,
    pub lat: Option<NumberOrText>,
    pub lng: Option<NumberOrText>,
    pub contact: Option<String>,
}

/// Display-safe identity of the account that published a help point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublisherSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// A help point as returned by the API, with its publisher resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HelpPointView {
    pub id: Uuid,
    pub title: String,
    #[serde(rename = "type")]
    pub category: Category,
    pub description: String,
    pub location: GeoPoint,
    pub publisher: PublisherSummary,
    pub contact: String,
    pub status: AidStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl HelpPointView {
    pub fn lat(&self) -> f64 {
        self.location.lat
    }

    pub fn lng(&self) -> f64 {
        self.location.lon
    }

    /// Directions link for the marker popup.
    pub fn navigation_url(&self) -> String {
        format!(
            "https://www.google.com/maps/dir/?api=1&destination={},{}",
            self.lat(),
            self.lng()
        )
    }

    pub fn tel_url(&self) -> Option<String> {
        if self.contact.is_empty() {
            None
        } else {
            Some(format!("tel:{}", self.contact))
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAidResponse {
    pub success: bool,
    pub message: String,
    pub aid: HelpPointView,
}

/// Body of `GET /api/aid/nearby`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearbyResponse {
    pub success: bool,
    pub count: usize,
    pub data: Vec<HelpPointView>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub success: bool,
    pub token: String,
    pub user: PublisherSummary,
}

/// Error envelope used by every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
