//! # nearbyaid-store
//!
//! Persistent storage for NearByAid, backed by SQLite.
//!
//! The crate exposes a synchronous `Database` handle that wraps a
//! `rusqlite::Connection` and provides typed helpers for the two domain
//! tables: accounts (`users`) and published help points (`help_points`).
//! Help-point locations are indexed with an SQLite R*Tree so that radius
//! queries only examine candidates inside the query's bounding box.

pub mod database;
pub mod geo;
pub mod help_points;
pub mod migrations;
pub mod models;
pub mod users;

mod error;

pub use database::Database;
pub use error::StoreError;
pub use models::*;
