//! User and navigation-state storage.

use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use redb::{Database, ReadableDatabase, ReadableTableMetadata, TableDefinition};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

const USERS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("users");
const STATES_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("user_states");

/// Sentinel for "no active pagination" in the persisted state.
pub const EMPTY_PAGE: i64 = -1;

/// Identity record for a bot user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub max_id: String,
    #[serde(default)]
    pub is_vip: bool,
    #[serde(default)]
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A previously sent message whose keyboard must be cleared or which must be
/// deleted before the next reply goes out.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrackedMessage {
    pub message_id: String,
    #[serde(default)]
    pub inline_markup: Option<serde_json::Value>,
    #[serde(default)]
    pub needs_deletion: bool,
}

/// Per-user navigation and session state.
///
/// The flow stack is bottom-anchored at `"main"` and is never empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UserState {
    pub user_id: i64,
    pub flow_stack: Vec<String>,
    pub search_type: String,
    pub use_pagination: bool,
    pub cards: Option<Vec<serde_json::Value>>,
    pub cards_current_page: i64,
    pub cards_total_length: i64,
    pub tracked_message: Option<TrackedMessage>,
    pub updated_at: DateTime<Utc>,
}

impl Default for UserState {
    fn default() -> Self {
        Self {
            user_id: 0,
            flow_stack: vec!["main".to_string()],
            search_type: String::new(),
            use_pagination: false,
            cards: None,
            cards_current_page: EMPTY_PAGE,
            cards_total_length: EMPTY_PAGE,
            tracked_message: None,
            updated_at: Utc::now(),
        }
    }
}

impl UserState {
    /// Create default state for a user.
    pub fn for_user(user_id: i64) -> Self {
        Self {
            user_id,
            ..Self::default()
        }
    }

    /// Drop any active pagination/search context.
    pub fn clear_search(&mut self) {
        self.use_pagination = false;
        self.search_type.clear();
        self.cards = None;
        self.cards_current_page = EMPTY_PAGE;
        self.cards_total_length = EMPTY_PAGE;
    }
}

/// Storage for users and their navigation state.
#[derive(Debug, Clone)]
pub struct UserStorage {
    db: Arc<Database>,
}

impl UserStorage {
    pub fn new(db: Arc<Database>) -> Result<Self> {
        let write_txn = db.begin_write()?;
        write_txn.open_table(USERS_TABLE)?;
        write_txn.open_table(STATES_TABLE)?;
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Fetch a user and their state by platform id, creating both on first
    /// contact.
    pub fn get_or_create(&self, max_id: &str) -> Result<(User, UserState)> {
        if let Some(user) = self.get_by_max_id(max_id)? {
            let state = self
                .get_state(user.id)?
                .unwrap_or_else(|| UserState::for_user(user.id));
            return Ok((user, state));
        }

        let write_txn = self.db.begin_write()?;
        let (user, state) = {
            let mut users = write_txn.open_table(USERS_TABLE)?;
            let next_id = users.len()? as i64 + 1;
            let now = Utc::now();
            let user = User {
                id: next_id,
                max_id: max_id.to_string(),
                is_vip: false,
                is_admin: false,
                created_at: now,
                updated_at: now,
            };
            let bytes = serde_json::to_vec(&user)?;
            users.insert(max_id, bytes.as_slice())?;

            let state = UserState::for_user(user.id);
            let mut states = write_txn.open_table(STATES_TABLE)?;
            let state_bytes = serde_json::to_vec(&state)?;
            states.insert(user.id.to_string().as_str(), state_bytes.as_slice())?;

            (user, state)
        };
        write_txn.commit()?;

        debug!(max_id, user_id = user.id, "created user");
        Ok((user, state))
    }

    /// Look up a user by platform id.
    pub fn get_by_max_id(&self, max_id: &str) -> Result<Option<User>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(USERS_TABLE)?;

        match table.get(max_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Fetch a user's navigation state.
    pub fn get_state(&self, user_id: i64) -> Result<Option<UserState>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(STATES_TABLE)?;

        match table.get(user_id.to_string().as_str())? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Persist a user's navigation state. Identity fields are never touched;
    /// the record's `updated_at` is stamped here.
    pub fn update_state(&self, user_id: i64, state: &UserState) -> Result<()> {
        if state.user_id != user_id {
            return Err(anyhow!(
                "state belongs to user {}, not {}",
                state.user_id,
                user_id
            ));
        }

        let mut stamped = state.clone();
        stamped.updated_at = Utc::now();
        let bytes = serde_json::to_vec(&stamped)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(STATES_TABLE)?;
            table.insert(user_id.to_string().as_str(), bytes.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Flip the VIP flag for a user (admin tooling).
    pub fn set_vip(&self, max_id: &str, is_vip: bool) -> Result<()> {
        let mut user = self
            .get_by_max_id(max_id)?
            .ok_or_else(|| anyhow!("user not found: {}", max_id))?;
        user.is_vip = is_vip;
        user.updated_at = Utc::now();
        let bytes = serde_json::to_vec(&user)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(USERS_TABLE)?;
            table.insert(max_id, bytes.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn storage() -> (UserStorage, tempfile::TempDir) {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let db = Arc::new(Database::create(db_path).unwrap());
        (UserStorage::new(db).unwrap(), temp_dir)
    }

    #[test]
    fn test_get_or_create_is_idempotent() {
        let (users, _tmp) = storage();

        let (first, _) = users.get_or_create("max-42").unwrap();
        let (second, _) = users.get_or_create("max-42").unwrap();
        assert_eq!(first.id, second.id);
    }

    #[test]
    fn test_new_users_get_distinct_ids() {
        let (users, _tmp) = storage();

        let (a, _) = users.get_or_create("max-1").unwrap();
        let (b, _) = users.get_or_create("max-2").unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_default_state_is_main_stack() {
        let (users, _tmp) = storage();

        let (_, state) = users.get_or_create("max-1").unwrap();
        assert_eq!(state.flow_stack, vec!["main".to_string()]);
        assert!(!state.use_pagination);
        assert_eq!(state.cards_current_page, EMPTY_PAGE);
        assert_eq!(state.cards_total_length, EMPTY_PAGE);
    }

    #[test]
    fn test_update_state_round_trip() {
        let (users, _tmp) = storage();

        let (user, mut state) = users.get_or_create("max-1").unwrap();
        state.flow_stack.push("Search".to_string());
        state.search_type = "products".to_string();
        state.use_pagination = true;
        users.update_state(user.id, &state).unwrap();

        let loaded = users.get_state(user.id).unwrap().unwrap();
        assert_eq!(loaded.flow_stack, vec!["main", "Search"]);
        assert_eq!(loaded.search_type, "products");
        assert!(loaded.use_pagination);
    }

    #[test]
    fn test_update_state_rejects_foreign_state() {
        let (users, _tmp) = storage();

        let (user, state) = users.get_or_create("max-1").unwrap();
        assert!(users.update_state(user.id + 1, &state).is_err());
    }

    #[test]
    fn test_set_vip() {
        let (users, _tmp) = storage();

        users.get_or_create("max-1").unwrap();
        users.set_vip("max-1", true).unwrap();

        let user = users.get_by_max_id("max-1").unwrap().unwrap();
        assert!(user.is_vip);
    }

    #[test]
    fn test_clear_search_resets_pagination() {
        let mut state = UserState::for_user(7);
        state.use_pagination = true;
        state.search_type = "companies".to_string();
        state.cards = Some(vec![serde_json::json!({"name": "x"})]);
        state.cards_current_page = 1;
        state.cards_total_length = 3;

        state.clear_search();

        assert!(!state.use_pagination);
        assert!(state.search_type.is_empty());
        assert!(state.cards.is_none());
        assert_eq!(state.cards_current_page, EMPTY_PAGE);
        assert_eq!(state.cards_total_length, EMPTY_PAGE);
    }
}
