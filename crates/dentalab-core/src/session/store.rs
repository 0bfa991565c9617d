//! Bearer-token persistence.

use std::sync::{Arc, Mutex};

use crate::db::{Database, DbResult, TOKEN_KEY};

/// Where the session keeps its bearer token between runs.
pub trait TokenStore {
    fn load_token(&self) -> DbResult<Option<String>>;
    fn save_token(&self, token: &str) -> DbResult<()>;
    fn clear_token(&self) -> DbResult<()>;
}

impl TokenStore for Database {
    fn load_token(&self) -> DbResult<Option<String>> {
        Ok(self.get_item(TOKEN_KEY)?.filter(|t| !t.is_empty()))
    }

    fn save_token(&self, token: &str) -> DbResult<()> {
        self.set_item(TOKEN_KEY, token)
    }

    fn clear_token(&self) -> DbResult<()> {
        self.remove_item(TOKEN_KEY)?;
        Ok(())
    }
}

/// Non-persistent store. Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStore {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        let store = Self::default();
        store.set(Some(token.to_string()));
        store
    }

    fn set(&self, value: Option<String>) {
        let mut slot = self.slot.lock().unwrap_or_else(|p| p.into_inner());
        *slot = value;
    }

    /// Current token, without going through the trait.
    pub fn peek(&self) -> Option<String> {
        self.slot.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }
}

impl TokenStore for MemoryTokenStore {
    fn load_token(&self) -> DbResult<Option<String>> {
        Ok(self.peek())
    }

    fn save_token(&self, token: &str) -> DbResult<()> {
        self.set(Some(token.to_string()));
        Ok(())
    }

    fn clear_token(&self) -> DbResult<()> {
        self.set(None);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_store() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.load_token().unwrap(), None);

        db.save_token("abc").unwrap();
        assert_eq!(db.load_token().unwrap(), Some("abc".into()));

        db.clear_token().unwrap();
        assert_eq!(db.load_token().unwrap(), None);
        // clearing twice is fine
        db.clear_token().unwrap();
    }

    #[test]
    fn test_empty_token_is_absent() {
        let db = Database::open_in_memory().unwrap();
        db.set_item(TOKEN_KEY, "").unwrap();
        assert_eq!(db.load_token().unwrap(), None);
    }

    #[test]
    fn test_memory_store_shared() {
        let store = MemoryTokenStore::new();
        let handle = store.clone();
        store.save_token("xyz").unwrap();
        assert_eq!(handle.peek(), Some("xyz".into()));
    }
}
