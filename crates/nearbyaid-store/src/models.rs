//! Domain model structs persisted in the SQLite database.

use chrono::{DateTime, Utc};
use nearbyaid_shared::protocol::{HelpPointView, PublisherSummary};
use nearbyaid_shared::validation::AidDraft;
use nearbyaid_shared::{AidStatus, Category, GeoPoint};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// A registered account. Owns the help points it publishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    /// Lower-cased, unique.
    pub email: String,
    /// Argon2id PHC string. Never leaves the server.
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// The subset of the account that may be shown to other users.
    pub fn summary(&self) -> PublisherSummary {
        PublisherSummary {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

// ---------------------------------------------------------------------------
// Help point
// ---------------------------------------------------------------------------

/// A published, location-tagged help point.
#[derive(Debug, Clone, PartialEq)]
pub struct HelpPoint {
    pub id: Uuid,
    pub title: String,
    pub category: Category,
    pub description: String,
    /// Longitude-first, see [`GeoPoint`].
    pub location: GeoPoint,
    /// Owner; fixed for the lifetime of the record.
    pub publisher_id: Uuid,
    pub contact: String,
    pub status: AidStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl HelpPoint {
    /// Project into the API shape with the publisher resolved.
    pub fn into_view(self, publisher: PublisherSummary) -> HelpPointView {
        HelpPointView {
            id: self.id,
            title: self.title,
            category: self.category,
            description: self.description,
            location: self.location,
            publisher,
            contact: self.contact,
            status: self.status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Input of [`Database::create_help_point`](crate::Database::create_help_point).
#[derive(Debug, Clone)]
pub struct NewHelpPoint {
    pub draft: AidDraft,
    pub publisher_id: Uuid,
}
