//! SQLite schema definition.

/// Local storage schema for the dental-lab client.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Local storage (browser localStorage equivalent)
-- ============================================================================

CREATE TABLE IF NOT EXISTS local_storage (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

/// Key under which the bearer token is stored.
pub const TOKEN_KEY: &str = "auth_token";
