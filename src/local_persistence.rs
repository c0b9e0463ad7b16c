//! Local persistence for activity history and preferences.
//!
//! The collection itself never touches storage; anything durable goes through the
//! [`LocalPersistence`] capability injected into the store. Two implementations
//! ship: [`RedbPersistence`] for a file-backed store and [`MemoryPersistence`] for
//! callers (and tests) that want no file at all.
//!
//! # Activity entry schema
//!
//! Entries are stored as JSON objects under an ascending `u64` sequence key:
//!
//! ```json
//! {
//!   "seq": 12,
//!   "at_ms": 1754400000000,
//!   "outcome": "rolled_back",
//!   "kind": "update",
//!   "action_id": 7,
//!   "entity_id": "deal_12345"
//! }
//! ```
//!
//! `kind`, `action_id` and `entity_id` are omitted for store-level events such as
//! `hydrated` and `cleared`. `at_ms` is Unix time in milliseconds.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use redb::{Database, ReadableTable, TableDefinition};
use serde::{Deserialize, Serialize};

use crate::app_response::AppResponse;
use crate::collection_model::EntityId;
use crate::optimistic_action::{ActionId, ActionKind};

const ACTIVITY_TABLE: TableDefinition<u64, &str> = TableDefinition::new("activity_log");
const PREFERENCES_TABLE: TableDefinition<&str, &str> = TableDefinition::new("preferences");

/// How a recorded collection event ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityOutcome {
    /// An optimistic mutation was applied locally.
    Applied,
    /// A pending action settled as confirmed.
    Confirmed,
    /// A pending action settled as rolled back.
    RolledBack,
    /// The collection was replaced with a server snapshot.
    Hydrated,
    /// The collection was emptied.
    Cleared,
}

/// One line of the persisted activity history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    /// Storage sequence number, assigned by the persistence layer on append.
    pub seq: u64,
    /// Unix milliseconds at which the event was recorded.
    pub at_ms: u64,
    pub outcome: ActivityOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ActionKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_id: Option<ActionId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<EntityId>,
}

impl ActivityEntry {
    /// Entry describing one optimistic action event.
    pub fn action(
        outcome: ActivityOutcome,
        kind: ActionKind,
        action_id: ActionId,
        entity_id: EntityId,
    ) -> Self {
        Self {
            seq: 0,
            at_ms: unix_millis(),
            outcome,
            kind: Some(kind),
            action_id: Some(action_id),
            entity_id: Some(entity_id),
        }
    }

    /// Entry describing a store-level event (hydrate, clear).
    pub fn store_event(outcome: ActivityOutcome) -> Self {
        Self {
            seq: 0,
            at_ms: unix_millis(),
            outcome,
            kind: None,
            action_id: None,
            entity_id: None,
        }
    }
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}

/// Injected key-value persistence capability.
///
/// Explicit load/save operations only; core collection logic never reaches for
/// ambient storage. Implementations assign sequence numbers on append and return
/// history newest-first.
pub trait LocalPersistence {
    fn append_activity(&mut self, entry: ActivityEntry) -> Result<u64, AppResponse>;
    fn recent_activity(&self, limit: usize) -> Result<Vec<ActivityEntry>, AppResponse>;
    fn clear_activity(&mut self) -> Result<(), AppResponse>;
    fn set_preference(&mut self, key: &str, value: &str) -> Result<(), AppResponse>;
    fn get_preference(&self, key: &str) -> Result<Option<String>, AppResponse>;
    /// Remove everything: activity history and preferences.
    fn wipe(&mut self) -> Result<(), AppResponse>;
    /// Explicit shutdown indicator; the handle must not be used afterwards.
    fn close(&mut self) -> Result<(), AppResponse>;
}

/// File-backed persistence on redb. Every write commits its own transaction.
pub struct RedbPersistence {
    db: Database,
    next_seq: u64,
}

impl RedbPersistence {
    /// Open (or create) `<name>.redb`, ensure both tables exist, and resume the
    /// activity sequence from the last stored key.
    pub fn open(name: &str) -> Result<Self, AppResponse> {
        let path = format!("{name}.redb");
        let db = Database::create(&path)?;

        let txn = db.begin_write()?;
        txn.open_table(ACTIVITY_TABLE)?;
        txn.open_table(PREFERENCES_TABLE)?;
        txn.commit()?;

        let next_seq = {
            let txn = db.begin_read()?;
            let table = txn.open_table(ACTIVITY_TABLE)?;
            let next = table.last()?.map(|(key, _)| key.value() + 1).unwrap_or(1);
            next
        };

        Ok(Self { db, next_seq })
    }
}

impl LocalPersistence for RedbPersistence {
    fn append_activity(&mut self, mut entry: ActivityEntry) -> Result<u64, AppResponse> {
        entry.seq = self.next_seq;
        let encoded = serde_json::to_string(&entry)?;

        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(ACTIVITY_TABLE)?;
            table.insert(entry.seq, encoded.as_str())?;
        }
        txn.commit()?;

        self.next_seq += 1;
        Ok(entry.seq)
    }

    fn recent_activity(&self, limit: usize) -> Result<Vec<ActivityEntry>, AppResponse> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(ACTIVITY_TABLE)?;

        let mut entries = Vec::new();
        for row in table.iter()?.rev() {
            if entries.len() == limit {
                break;
            }
            let (_, value) = row?;
            let entry: ActivityEntry = serde_json::from_str(value.value())?;
            entries.push(entry);
        }

        Ok(entries)
    }

    fn clear_activity(&mut self) -> Result<(), AppResponse> {
        let txn = self.db.begin_write()?;
        txn.delete_table(ACTIVITY_TABLE)?;
        txn.open_table(ACTIVITY_TABLE)?;
        txn.commit()?;

        self.next_seq = 1;
        Ok(())
    }

    fn set_preference(&mut self, key: &str, value: &str) -> Result<(), AppResponse> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(PREFERENCES_TABLE)?;
            table.insert(key, value)?;
        }
        txn.commit()?;
        Ok(())
    }

    fn get_preference(&self, key: &str) -> Result<Option<String>, AppResponse> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(PREFERENCES_TABLE)?;
        Ok(table.get(key)?.map(|guard| guard.value().to_string()))
    }

    fn wipe(&mut self) -> Result<(), AppResponse> {
        let txn = self.db.begin_write()?;
        txn.delete_table(ACTIVITY_TABLE)?;
        txn.delete_table(PREFERENCES_TABLE)?;
        txn.open_table(ACTIVITY_TABLE)?;
        txn.open_table(PREFERENCES_TABLE)?;
        txn.commit()?;

        self.next_seq = 1;
        Ok(())
    }

    fn close(&mut self) -> Result<(), AppResponse> {
        // redb commits every transaction eagerly; dropping the handle closes the
        // file. This is the explicit "stop using me" signal for hot restart.
        Ok(())
    }
}

/// In-memory persistence: same contract, nothing written to disk.
pub struct MemoryPersistence {
    activity: Vec<ActivityEntry>,
    preferences: HashMap<String, String>,
    next_seq: u64,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self {
            activity: Vec::new(),
            preferences: HashMap::new(),
            next_seq: 1,
        }
    }
}

impl Default for MemoryPersistence {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalPersistence for MemoryPersistence {
    fn append_activity(&mut self, mut entry: ActivityEntry) -> Result<u64, AppResponse> {
        entry.seq = self.next_seq;
        self.next_seq += 1;
        let seq = entry.seq;
        self.activity.push(entry);
        Ok(seq)
    }

    fn recent_activity(&self, limit: usize) -> Result<Vec<ActivityEntry>, AppResponse> {
        Ok(self.activity.iter().rev().take(limit).cloned().collect())
    }

    fn clear_activity(&mut self) -> Result<(), AppResponse> {
        self.activity.clear();
        self.next_seq = 1;
        Ok(())
    }

    fn set_preference(&mut self, key: &str, value: &str) -> Result<(), AppResponse> {
        self.preferences.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get_preference(&self, key: &str) -> Result<Option<String>, AppResponse> {
        Ok(self.preferences.get(key).cloned())
    }

    fn wipe(&mut self) -> Result<(), AppResponse> {
        self.activity.clear();
        self.preferences.clear();
        self.next_seq = 1;
        Ok(())
    }

    fn close(&mut self) -> Result<(), AppResponse> {
        Ok(())
    }
}
