//! Database schema definitions
//!
//! The store holds one table, `jobs`, keyed by the posting's canonical URL.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per posting, identified by its canonical URL
CREATE TABLE IF NOT EXISTS jobs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL UNIQUE CHECK (length(url) > 0),
    title TEXT NOT NULL CHECK (length(title) > 0),
    source_host TEXT NOT NULL DEFAULT '',
    detail TEXT NOT NULL DEFAULT '',
    price TEXT NOT NULL DEFAULT '',
    period TEXT NOT NULL DEFAULT '',
    skills TEXT NOT NULL DEFAULT '',
    other TEXT NOT NULL DEFAULT '',
    reserved TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_jobs_created_at ON jobs(created_at);
CREATE INDEX IF NOT EXISTS idx_jobs_source_host ON jobs(source_host);
"#;

/// Insert-or-update of one posting; `created_at` is only written on insert
pub const UPSERT_JOB_SQL: &str = r#"
INSERT INTO jobs (url, title, source_host, detail, price, period, skills, other, reserved, created_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
ON CONFLICT(url) DO UPDATE SET
    title = excluded.title,
    source_host = excluded.source_host,
    detail = excluded.detail,
    price = excluded.price,
    period = excluded.period,
    skills = excluded.skills,
    other = excluded.other,
    reserved = excluded.reserved
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)
}
