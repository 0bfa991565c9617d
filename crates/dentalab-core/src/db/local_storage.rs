//! Key/value local storage operations.

use rusqlite::{params, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{Database, DbResult};

impl Database {
    /// Read a stored string.
    pub fn get_item(&self, key: &str) -> DbResult<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM local_storage WHERE key = ?",
                [key],
                |row| row.get(0),
            )
            .optional()
            .map_err(Into::into)
    }

    /// Store a string, replacing any previous value.
    pub fn set_item(&self, key: &str, value: &str) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO local_storage (key, value, updated_at)
            VALUES (?1, ?2, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    /// Remove a key. Returns true if it existed.
    pub fn remove_item(&self, key: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM local_storage WHERE key = ?", [key])?;
        Ok(rows_affected > 0)
    }

    /// Read and deserialize a JSON value.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> DbResult<Option<T>> {
        match self.get_item(key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Serialize and store a JSON value.
    pub fn set_json<T: Serialize>(&self, key: &str, value: &T) -> DbResult<()> {
        let raw = serde_json::to_string(value)?;
        self.set_item(key, &raw)
    }

    /// All stored keys, sorted.
    pub fn keys(&self) -> DbResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key FROM local_storage ORDER BY key")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Remove everything.
    pub fn clear(&self) -> DbResult<()> {
        self.conn.execute("DELETE FROM local_storage", [])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn test_set_and_get() {
        let db = setup_db();
        db.set_item("auth_token", "abc").unwrap();
        assert_eq!(db.get_item("auth_token").unwrap(), Some("abc".into()));
    }

    #[test]
    fn test_overwrite() {
        let db = setup_db();
        db.set_item("auth_token", "abc").unwrap();
        db.set_item("auth_token", "def").unwrap();
        assert_eq!(db.get_item("auth_token").unwrap(), Some("def".into()));
        assert_eq!(db.keys().unwrap(), vec!["auth_token".to_string()]);
    }

    #[test]
    fn test_remove() {
        let db = setup_db();
        db.set_item("auth_token", "abc").unwrap();
        assert!(db.remove_item("auth_token").unwrap());
        assert!(!db.remove_item("auth_token").unwrap());
        assert_eq!(db.get_item("auth_token").unwrap(), None);
    }

    #[test]
    fn test_json_roundtrip() {
        let db = setup_db();
        db.set_json("recent_patients", &vec![3, 7, 12]).unwrap();
        let ids: Vec<i64> = db.get_json("recent_patients").unwrap().unwrap();
        assert_eq!(ids, vec![3, 7, 12]);
    }

    #[test]
    fn test_clear() {
        let db = setup_db();
        db.set_item("a", "1").unwrap();
        db.set_item("b", "2").unwrap();
        db.clear().unwrap();
        assert!(db.keys().unwrap().is_empty());
    }
}
