//! Database schema definitions
//!
//! The table layout matches databases written by earlier versions of the
//! tool, so existing files open without migration.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per AMV ever discovered
CREATE TABLE IF NOT EXISTS amvs (
    id TEXT PRIMARY KEY,
    article_url TEXT NOT NULL,
    torrentfile TEXT,
    state INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_amvs_state ON amvs(state);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
