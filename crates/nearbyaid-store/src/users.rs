//! CRUD operations for [`User`] records.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use nearbyaid_shared::protocol::PublisherSummary;
use rusqlite::{params, params_from_iter, ErrorCode, OptionalExtension};
use uuid::Uuid;

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::help_points::{parse_ts, parse_uuid};
use crate::models::{NewUser, User};

const USER_COLUMNS: &str = "id, name, email, password_hash, created_at";

/// Ids bound per `IN (...)` lookup, well under SQLite's variable limit.
const PUBLISHER_BATCH: usize = 500;

impl Database {
    /// Insert a new account. Emails are compared case-insensitively.
    pub fn create_user(&self, new: &NewUser) -> Result<User> {
        let user = User {
            id: Uuid::new_v4(),
            name: new.name.clone(),
            email: new.email.to_lowercase(),
            password_hash: new.password_hash.clone(),
            created_at: Utc::now(),
        };

        let inserted = self.conn().execute(
            "INSERT INTO users (id, name, email, password_hash, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user.id.to_string(),
                user.name,
                user.email,
                user.password_hash,
                user.created_at.to_rfc3339(),
            ],
        );

        match inserted {
            Ok(_) => {
                tracing::debug!(user_id = %user.id, "created user");
                Ok(user)
            }
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == ErrorCode::ConstraintViolation =>
            {
                Err(StoreError::DuplicateEmail)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn get_user(&self, id: Uuid) -> Result<User> {
        self.conn()
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                params![id.to_string()],
                row_to_user,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
                other => StoreError::Sqlite(other),
            })
    }

    pub fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = self
            .conn()
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
                params![email.to_lowercase()],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    /// Resolve publisher ids to their display-safe summaries, one `IN (...)`
    /// query per 500 ids.
    ///
    /// Ids with no matching account are absent from the returned map.
    pub fn publishers_for(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, PublisherSummary>> {
        let unique: Vec<String> = ids
            .iter()
            .collect::<HashSet<_>>()
            .into_iter()
            .map(Uuid::to_string)
            .collect();

        let mut found = HashMap::with_capacity(unique.len());
        for chunk in unique.chunks(PUBLISHER_BATCH) {
            let placeholders = vec!["?"; chunk.len()].join(", ");
            let mut stmt = self.conn().prepare(&format!(
                "SELECT id, name, email FROM users WHERE id IN ({placeholders})"
            ))?;
            let rows = stmt.query_map(params_from_iter(chunk), |row| {
                Ok(PublisherSummary {
                    id: parse_uuid(row, 0)?,
                    name: row.get(1)?,
                    email: row.get(2)?,
                })
            })?;
            for row in rows {
                let summary = row?;
                found.insert(summary.id, summary);
            }
        }
        Ok(found)
    }
}

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: parse_uuid(row, 0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        created_at: parse_ts(row, 4)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Asha".into(),
            email: email.into(),
            password_hash: "$argon2id$stub".into(),
        }
    }

    #[test]
    fn create_and_lookup() {
        let db = Database::open_in_memory().unwrap();
        let user = db.create_user(&new_user("Asha@Example.org")).unwrap();
        assert_eq!(user.email, "asha@example.org");

        assert_eq!(db.get_user(user.id).unwrap(), user);
        let by_email = db.find_user_by_email("ASHA@example.org").unwrap();
        assert_eq!(by_email, Some(user));
        assert!(db.find_user_by_email("nobody@example.org").unwrap().is_none());
    }

    #[test]
    fn duplicate_email_rejected() {
        let db = Database::open_in_memory().unwrap();
        db.create_user(&new_user("asha@example.org")).unwrap();
        let err = db.create_user(&new_user("ASHA@example.org")).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail));
    }

    #[test]
    fn missing_user_is_not_found() {
        let db = Database::open_in_memory().unwrap();
        assert!(matches!(
            db.get_user(Uuid::new_v4()),
            Err(StoreError::NotFound)
        ));
    }

    #[test]
    fn publishers_exclude_credentials() {
        let db = Database::open_in_memory().unwrap();
        let user = db.create_user(&new_user("asha@example.org")).unwrap();
        let ghost = Uuid::new_v4();

        let map = db.publishers_for(&[user.id, ghost, user.id]).unwrap();
        assert_eq!(map.len(), 1);
        let summary = &map[&user.id];
        assert_eq!(summary.name, "Asha");
        let json = serde_json::to_value(summary).unwrap();
        assert!(json.get("password_hash").is_none());
    }

    #[test]
    fn publishers_resolved_across_batches() {
        let db = Database::open_in_memory().unwrap();
        let mut ids: Vec<Uuid> = (0..PUBLISHER_BATCH + 3)
            .map(|i| {
                db.create_user(&new_user(&format!("user{i}@example.org")))
                    .unwrap()
                    .id
            })
            .collect();
        ids.push(Uuid::new_v4());

        let map = db.publishers_for(&ids).unwrap();
        assert_eq!(map.len(), PUBLISHER_BATCH + 3);
        assert!(db.publishers_for(&[]).unwrap().is_empty());
    }
}
