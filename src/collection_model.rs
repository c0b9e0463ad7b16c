//! Data model definitions for the optimistic collection.
//!
//! This module defines the core data structures handled by the store. The primary
//! model is [`EntityModel`], a flexible container pairing a stable identifier with
//! arbitrary JSON data, plus [`EntityId`], the tagged identifier type that keeps
//! server-assigned ids and store-generated tentative ids apart at the type level.

use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Global counter backing temporary id generation.
static NEXT_TEMP_TOKEN: AtomicU64 = AtomicU64::new(1);

/// Identifier for an entity held by the collection.
///
/// Two kinds of identity exist in an optimistic UI: ids the backend has already
/// assigned, and ids the store mints locally for entities whose create request is
/// still in flight. Keeping them as distinct variants means reconciliation logic
/// is a type-level match instead of a string-prefix convention.
///
/// # Serialization
///
/// The enum is `untagged`: a persisted id serializes as a bare JSON string, a
/// temporary id as an object carrying its token. Both shapes deserialize
/// unambiguously.
///
/// ```rust
/// use optimistic_core::collection_model::EntityId;
///
/// let persisted: EntityId = serde_json::from_str(r#""deal_12345""#)?;
/// assert_eq!(persisted, EntityId::Persisted("deal_12345".to_string()));
///
/// let temporary: EntityId = serde_json::from_str(r#"{"temp_token":7}"#)?;
/// assert!(temporary.is_temporary());
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    /// Server-assigned identifier, stable across sessions.
    Persisted(String),

    /// Store-generated tentative identifier for a not-yet-confirmed add.
    Temporary {
        /// Process-unique token minted from a global counter.
        temp_token: u64,
    },
}

impl EntityId {
    /// Mint a fresh temporary id.
    ///
    /// Tokens come from a process-wide counter, so two temporary ids created in
    /// the same process never collide.
    ///
    /// ```rust
    /// use optimistic_core::collection_model::EntityId;
    ///
    /// let a = EntityId::temporary();
    /// let b = EntityId::temporary();
    /// assert_ne!(a, b);
    /// ```
    pub fn temporary() -> Self {
        EntityId::Temporary {
            temp_token: NEXT_TEMP_TOKEN.fetch_add(1, Ordering::SeqCst),
        }
    }

    /// True for ids minted by [`EntityId::temporary`].
    pub fn is_temporary(&self) -> bool {
        matches!(self, EntityId::Temporary { .. })
    }
}

impl Display for EntityId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityId::Persisted(id) => write!(f, "{}", id),
            EntityId::Temporary { temp_token } => write!(f, "tmp_{}", temp_token),
        }
    }
}

/// A flexible data model for entities tracked by the optimistic collection.
///
/// `EntityModel` is the primary data container crossing the FFI boundary. It
/// consists of a unique identifier and arbitrary JSON data; identity is the only
/// structural requirement, everything else is opaque payload owned by the
/// application.
///
/// # Examples
///
/// ```rust
/// use optimistic_core::collection_model::{EntityId, EntityModel};
/// use serde_json::json;
///
/// let model = EntityModel {
///     id: EntityId::Persisted("deal_12345".to_string()),
///     data: json!({
///         "name": "Riverside Plaza",
///         "stage": "due_diligence",
///         "broker": {"name": "J. Alvarez", "phone": "+1 555 0100"}
///     }),
/// };
/// ```
///
/// # Serialization
///
/// The model implements [`Serialize`] and [`Deserialize`], enabling seamless JSON
/// conversion for FFI payloads.
///
/// ```rust
/// use optimistic_core::collection_model::{EntityId, EntityModel};
/// use serde_json::json;
///
/// let model = EntityModel {
///     id: EntityId::Persisted("task_1".to_string()),
///     data: json!({"title": "Call lender"}),
/// };
///
/// let encoded = serde_json::to_string(&model)?;
/// let decoded: EntityModel = serde_json::from_str(&encoded)?;
/// assert_eq!(model, decoded);
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EntityModel {
    /// Unique identifier for this entity.
    ///
    /// Serves as the lookup key for every collection operation. Never changed by
    /// a patch; confirmation is the only path that swaps a temporary id for a
    /// persisted one.
    pub id: EntityId,

    /// Arbitrary JSON data containing the actual application payload.
    ///
    /// Any valid JSON value is accepted. Objects get shallow-merge patch
    /// semantics; every other shape is replaced wholesale on update.
    #[serde(default)]
    pub data: JsonValue,
}

impl EntityModel {
    /// Return a copy of this entity with `patch` applied.
    ///
    /// When both `data` and `patch` are JSON objects, the top-level keys named by
    /// the patch replace the matching keys of `data` (a shallow merge). Any other
    /// combination replaces `data` with the patch wholesale. The id is never
    /// touched.
    ///
    /// ```rust
    /// use optimistic_core::collection_model::{EntityId, EntityModel};
    /// use serde_json::json;
    ///
    /// let entity = EntityModel {
    ///     id: EntityId::Persisted("1".to_string()),
    ///     data: json!({"name": "A", "stage": "lead"}),
    /// };
    ///
    /// let patched = entity.apply_patch(&json!({"name": "B"}));
    /// assert_eq!(patched.data, json!({"name": "B", "stage": "lead"}));
    /// assert_eq!(patched.id, entity.id);
    /// ```
    pub fn apply_patch(&self, patch: &JsonValue) -> EntityModel {
        let mut next = self.clone();
        match (&mut next.data, patch) {
            (JsonValue::Object(base), JsonValue::Object(changes)) => {
                for (key, value) in changes {
                    base.insert(key.clone(), value.clone());
                }
            }
            _ => next.data = patch.clone(),
        }
        next
    }
}

/// Input shape for an optimistic add.
///
/// The id is optional: callers that already know the server id may supply it,
/// everyone else gets a fresh [`EntityId::temporary`] assigned by the store.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NewEntity {
    /// Caller-supplied identifier, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,

    /// Initial payload for the tentative entity.
    #[serde(default)]
    pub data: JsonValue,
}
