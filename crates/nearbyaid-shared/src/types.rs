use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The closed set of help-point categories accepted by the store.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Food,
    Medical,
    Shelter,
    Other,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Food,
        Category::Medical,
        Category::Shelter,
        Category::Other,
    ];

    /// Categories shown while the client is in emergency mode.
    pub const EMERGENCY: [Category; 2] = [Category::Medical, Category::Shelter];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Food => "food",
            Category::Medical => "medical",
            Category::Shelter => "shelter",
            Category::Other => "other",
        }
    }

    pub fn is_emergency(&self) -> bool {
        Self::EMERGENCY.contains(self)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown value '{0}'")]
pub struct UnknownVariant(pub String);

impl FromStr for Category {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "food" => Ok(Category::Food),
            "medical" => Ok(Category::Medical),
            "shelter" => Ok(Category::Shelter),
            "other" => Ok(Category::Other),
            _ => Err(UnknownVariant(s.to_string())),
        }
    }
}

/// Lifecycle status of a help point. Only `Active` records are returned
/// by radius queries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AidStatus {
    #[default]
    Active,
    Expired,
    Inactive,
}

impl AidStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AidStatus::Active => "active",
            AidStatus::Expired => "expired",
            AidStatus::Inactive => "inactive",
        }
    }
}

impl fmt::Display for AidStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AidStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(AidStatus::Active),
            "expired" => Ok(AidStatus::Expired),
            "inactive" => Ok(AidStatus::Inactive),
            _ => Err(UnknownVariant(s.to_string())),
        }
    }
}

/// A point on the globe, always ordered `(longitude, latitude)`.
///
/// On the wire it is a GeoJSON-style `{"coordinates": [lon, lat]}` object,
/// so the ordering survives every hop between the store and the map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "GeoJsonPoint", into = "GeoJsonPoint")]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Build a point from map-order `(lat, lng)` arguments.
    pub fn from_lat_lng(lat: f64, lng: f64) -> Self {
        Self { lon: lng, lat }
    }

    /// Storage order: `[longitude, latitude]`.
    pub fn coordinates(&self) -> [f64; 2] {
        [self.lon, self.lat]
    }

    pub fn is_finite(&self) -> bool {
        self.lon.is_finite() && self.lat.is_finite()
    }

    pub fn in_bounds(&self) -> bool {
        (-180.0..=180.0).contains(&self.lon) && (-90.0..=90.0).contains(&self.lat)
    }
}

#[derive(Serialize, Deserialize)]
struct GeoJsonPoint {
    coordinates: [f64; 2],
}

impl From<GeoJsonPoint> for GeoPoint {
    fn from(p: GeoJsonPoint) -> Self {
        GeoPoint::new(p.coordinates[0], p.coordinates[1])
    }
}

impl From<GeoPoint> for GeoJsonPoint {
    fn from(p: GeoPoint) -> Self {
        GeoJsonPoint {
            coordinates: p.coordinates(),
        }
    }
}

/// Category selector of the map view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn matches(&self, category: Category) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(c) => *c == category,
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            return Ok(CategoryFilter::All);
        }
        s.parse().map(CategoryFilter::Only)
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => f.write_str("all"),
            CategoryFilter::Only(c) => c.fmt(f),
        }
    }
}
