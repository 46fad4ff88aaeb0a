//! # nearbyaid-shared
//!
//! Domain vocabulary shared by the NearByAid server and client: help-point
//! categories and statuses, the longitude-first [`GeoPoint`], the JSON wire
//! shapes exchanged over `/api`, and the explicit validation functions that
//! guard every write.

pub mod constants;
pub mod error;
pub mod protocol;
pub mod types;
pub mod validation;

pub use error::ValidationError;
pub use types::{AidStatus, Category, CategoryFilter, GeoPoint};
