//! MaxFlow Storage - persistence layer for bot users and navigation state
//!
//! This crate provides the persistence layer for MaxFlow, using redb as the
//! embedded database. Records are serialized as JSON bytes.
//!
//! # Tables
//!
//! - `users` - identity records, keyed by the platform user id
//! - `user_states` - per-user navigation/session state, keyed by numeric user id

pub mod user;

use anyhow::Result;
use redb::Database;
use std::sync::Arc;

pub use user::{TrackedMessage, User, UserState, UserStorage, EMPTY_PAGE};

/// Central storage manager that initializes all storage subsystems
pub struct Storage {
    db: Arc<Database>,
    pub users: UserStorage,
}

impl Storage {
    /// Create a new storage instance at the given path.
    ///
    /// This will create the database file if it doesn't exist and initialize
    /// all required tables.
    pub fn new(path: &str) -> Result<Self> {
        let db = Arc::new(Database::create(path)?);

        let users = UserStorage::new(db.clone())?;

        Ok(Self { db, users })
    }

    /// Get a reference to the underlying database
    pub fn get_db(&self) -> Arc<Database> {
        self.db.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_storage_initializes_tables() {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let storage = Storage::new(db_path.to_str().unwrap()).unwrap();

        let (user, state) = storage.users.get_or_create("max-1").unwrap();
        assert_eq!(user.max_id, "max-1");
        assert_eq!(state.flow_stack, vec!["main".to_string()]);
    }
}
