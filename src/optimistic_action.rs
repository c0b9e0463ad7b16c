//! Pending mutation tracking for the optimistic collection.
//!
//! Every optimistic add, update, or delete registers one [`OptimisticAction`]: a
//! reversible record of the mutation carrying enough state to undo it. Actions
//! follow a fixed lifecycle:
//!
//! ```text
//! created ──confirm──> confirmed (removed from pending)
//!    │
//!    └───rollback───> rolled back (removed from pending, items reverted)
//! ```
//!
//! Settling an already-settled action id is a safe no-op, never an error.

use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::collection_model::EntityModel;

/// Global action id counter.
static NEXT_ACTION_ID: AtomicU64 = AtomicU64::new(1);

/// Unique token identifying one pending optimistic mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionId(pub u64);

impl ActionId {
    /// Generate a new process-unique action id.
    pub fn new() -> Self {
        ActionId(NEXT_ACTION_ID.fetch_add(1, Ordering::SeqCst))
    }

    /// Get the raw id value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for ActionId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for ActionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "act_{}", self.0)
    }
}

/// Which mutation a pending action represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Add,
    Update,
    Delete,
}

impl Display for ActionKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionKind::Add => write!(f, "add"),
            ActionKind::Update => write!(f, "update"),
            ActionKind::Delete => write!(f, "delete"),
        }
    }
}

/// A recorded, not-yet-settled optimistic mutation.
///
/// `entity` is the pre-mutation snapshot for updates and deletes, and the
/// tentative entity itself for adds. Rollback is driven entirely by this
/// snapshot; confirmation discards it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimisticAction {
    pub action_id: ActionId,
    pub kind: ActionKind,
    pub entity: EntityModel,
}

impl OptimisticAction {
    pub fn new(kind: ActionKind, entity: EntityModel) -> Self {
        Self {
            action_id: ActionId::new(),
            kind,
            entity,
        }
    }
}
