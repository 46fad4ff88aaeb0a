//! v001 -- Initial schema creation.
//!
//! Creates `users`, `help_points`, and the `help_points_geo` R*Tree that
//! indexes help-point locations.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Users (publishers)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS users (
    id            TEXT PRIMARY KEY NOT NULL,  -- UUID v4
    name          TEXT NOT NULL,
    email         TEXT NOT NULL UNIQUE,       -- stored lower-cased
    password_hash TEXT NOT NULL,              -- Argon2id PHC string
    created_at    TEXT NOT NULL               -- RFC-3339
);

-- ----------------------------------------------------------------
-- Help points
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS help_points (
    seq          INTEGER PRIMARY KEY AUTOINCREMENT,  -- R*Tree key
    id           TEXT NOT NULL UNIQUE,               -- UUID v4
    title        TEXT NOT NULL CHECK (length(trim(title)) > 0),
    category     TEXT NOT NULL
                 CHECK (category IN ('food', 'medical', 'shelter', 'other')),
    description  TEXT NOT NULL DEFAULT '',
    lon          REAL NOT NULL CHECK (lon BETWEEN -180.0 AND 180.0),
    lat          REAL NOT NULL CHECK (lat BETWEEN -90.0 AND 90.0),
    publisher_id TEXT NOT NULL,                      -- FK -> users(id)
    contact      TEXT NOT NULL DEFAULT '',
    status       TEXT NOT NULL DEFAULT 'active'
                 CHECK (status IN ('active', 'expired', 'inactive')),
    created_at   TEXT NOT NULL,
    updated_at   TEXT NOT NULL,

    FOREIGN KEY (publisher_id) REFERENCES users(id)
);

CREATE INDEX IF NOT EXISTS idx_help_points_publisher ON help_points(publisher_id);

-- ----------------------------------------------------------------
-- Spatial index: one degenerate box per help point
-- ----------------------------------------------------------------
CREATE VIRTUAL TABLE IF NOT EXISTS help_points_geo USING rtree(
    seq,
    min_lon, max_lon,
    min_lat, max_lat
);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
