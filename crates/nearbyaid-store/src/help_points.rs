//! Help-point records: insert and radius query.

use std::cmp::Ordering;
use std::collections::HashSet;

use chrono::{DateTime, Utc};
use nearbyaid_shared::{AidStatus, GeoPoint};
use rusqlite::params;
use uuid::Uuid;

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::geo;
use crate::models::{HelpPoint, NewHelpPoint};

const POINT_COLUMNS: &str = "h.id, h.title, h.category, h.description, h.lon, h.lat, \
     h.publisher_id, h.contact, h.status, h.created_at, h.updated_at";

impl Database {
    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Validate and persist a new help point, returning the stored record.
    ///
    /// The draft is re-validated here even when the caller already did so.
    /// The publisher must be an existing account, otherwise
    /// [`StoreError::UnknownPublisher`] is returned and nothing is written.
    pub fn create_help_point(&self, new: &NewHelpPoint) -> Result<HelpPoint> {
        new.draft.validate()?;

        let id = Uuid::new_v4();
        let now = Utc::now().to_rfc3339();
        let draft = &new.draft;

        let tx = self.conn().unchecked_transaction()?;
        let publisher_exists: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1)",
            params![new.publisher_id.to_string()],
            |row| row.get(0),
        )?;
        if !publisher_exists {
            return Err(StoreError::UnknownPublisher);
        }
        tx.execute(
            "INSERT INTO help_points
                (id, title, category, description, lon, lat, publisher_id,
                 contact, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)",
            params![
                id.to_string(),
                draft.title,
                draft.category.as_str(),
                draft.description,
                draft.location.lon,
                draft.location.lat,
                new.publisher_id.to_string(),
                draft.contact,
                AidStatus::Active.as_str(),
                now,
            ],
        )?;
        let seq = tx.last_insert_rowid();
        tx.execute(
            "INSERT INTO help_points_geo (seq, min_lon, max_lon, min_lat, max_lat)
             VALUES (?1, ?2, ?2, ?3, ?3)",
            params![seq, draft.location.lon, draft.location.lat],
        )?;
        tx.commit()?;

        tracing::debug!(
            id = %id,
            category = %draft.category,
            publisher = %new.publisher_id,
            "stored help point"
        );

        self.get_help_point(id)
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    pub fn get_help_point(&self, id: Uuid) -> Result<HelpPoint> {
        self.conn()
            .query_row(
                &format!("SELECT {POINT_COLUMNS} FROM help_points h WHERE h.id = ?1"),
                params![id.to_string()],
                row_to_help_point,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
                other => StoreError::Sqlite(other),
            })
    }

    /// Every active help point within `max_distance_m` meters of `center`,
    /// nearest first.
    ///
    /// Candidates come from the R*Tree bounding-box lookup; the exact
    /// great-circle distance decides membership. Equal distances are ordered
    /// by creation time, then id, so repeated calls return the same sequence.
    /// No category filter and no limit are applied.
    pub fn find_near(&self, center: &GeoPoint, max_distance_m: f64) -> Result<Vec<HelpPoint>> {
        if !center.is_finite() || !max_distance_m.is_finite() || max_distance_m < 0.0 {
            return Ok(Vec::new());
        }

        let mut stmt = self.conn().prepare_cached(&format!(
            "SELECT {POINT_COLUMNS}
             FROM help_points_geo g
             JOIN help_points h ON h.seq = g.seq
             WHERE g.max_lon >= ?1 AND g.min_lon <= ?2
               AND g.max_lat >= ?3 AND g.min_lat <= ?4
               AND h.status = ?5"
        ))?;

        let mut seen = HashSet::new();
        let mut hits: Vec<(f64, HelpPoint)> = Vec::new();

        for bbox in geo::bounding_boxes(center, max_distance_m) {
            let rows = stmt.query_map(
                params![
                    bbox.min_lon,
                    bbox.max_lon,
                    bbox.min_lat,
                    bbox.max_lat,
                    AidStatus::Active.as_str(),
                ],
                row_to_help_point,
            )?;
            for row in rows {
                let point = row?;
                if !seen.insert(point.id) {
                    continue;
                }
                let distance = geo::distance_m(center, &point.location);
                if distance <= max_distance_m {
                    hits.push((distance, point));
                }
            }
        }

        hits.sort_by(|(da, a), (db, b)| {
            da.partial_cmp(db)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.created_at.cmp(&b.created_at))
                .then_with(|| a.id.cmp(&b.id))
        });

        tracing::debug!(
            lon = center.lon,
            lat = center.lat,
            max_distance_m,
            matches = hits.len(),
            "radius query"
        );

        Ok(hits.into_iter().map(|(_, point)| point).collect())
    }

    // ------------------------------------------------------------------
    // Update
    // ------------------------------------------------------------------

    /// Change the lifecycle status of a help point and bump `updated_at`.
    pub fn set_help_point_status(&self, id: Uuid, status: AidStatus) -> Result<()> {
        let affected = self.conn().execute(
            "UPDATE help_points SET status = ?1, updated_at = ?2 WHERE id = ?3",
            params![status.as_str(), Utc::now().to_rfc3339(), id.to_string()],
        )?;
        if affected == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

fn row_to_help_point(row: &rusqlite::Row<'_>) -> rusqlite::Result<HelpPoint> {
    let category: String = row.get(2)?;
    let status: String = row.get(8)?;

    Ok(HelpPoint {
        id: parse_uuid(row, 0)?,
        title: row.get(1)?,
        category: category.parse().map_err(|e| conversion_error(2, e))?,
        description: row.get(3)?,
        location: GeoPoint::new(row.get(4)?, row.get(5)?),
        publisher_id: parse_uuid(row, 6)?,
        contact: row.get(7)?,
        status: status.parse().map_err(|e| conversion_error(8, e))?,
        created_at: parse_ts(row, 9)?,
        updated_at: parse_ts(row, 10)?,
    })
}

pub(crate) fn parse_uuid(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let raw: String = row.get(idx)?;
    Uuid::parse_str(&raw).map_err(|e| conversion_error(idx, e))
}

pub(crate) fn parse_ts(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e))
}

fn conversion_error<E>(idx: usize, e: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
}
