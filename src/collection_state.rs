use std::collections::HashMap;

use serde_json::Value as JsonValue;

use crate::collection_model::{EntityId, EntityModel, NewEntity};
use crate::optimistic_action::{ActionId, ActionKind, OptimisticAction};

/// In-memory optimistic collection: the visible entity list plus the map of
/// in-flight mutations. Owns both exclusively; callers mutate only through the
/// operations below. Performs no I/O and no operation here can fail.
pub struct CollectionState {
    items: Vec<EntityModel>,
    pending: HashMap<ActionId, OptimisticAction>,
}

impl CollectionState {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            pending: HashMap::new(),
        }
    }

    /// Replace the whole collection with a server snapshot. Pending actions are
    /// dropped: the snapshot is authoritative.
    pub fn hydrate(&mut self, items: Vec<EntityModel>) {
        self.items = items;
        self.pending.clear();
    }

    pub fn items(&self) -> &[EntityModel] {
        &self.items
    }

    /// Look up a single entity by id, as the collection currently sees it
    /// (tentative mutations included).
    pub fn get_by_id(&self, id: &EntityId) -> Option<&EntityModel> {
        self.items.iter().find(|item| &item.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Pending actions in creation order (ascending action id).
    pub fn pending_actions(&self) -> Vec<&OptimisticAction> {
        let mut actions: Vec<&OptimisticAction> = self.pending.values().collect();
        actions.sort_by_key(|action| action.action_id);
        actions
    }

    /// Apply a tentative add: the entity becomes visible immediately, prepended
    /// to the list. Always succeeds; a missing id gets a fresh temporary one.
    pub fn add_optimistic(&mut self, new_entity: NewEntity) -> (ActionId, EntityModel) {
        let id = new_entity.id.unwrap_or_else(EntityId::temporary);
        let entity = EntityModel {
            id,
            data: new_entity.data,
        };

        self.items.insert(0, entity.clone());

        let action = OptimisticAction::new(ActionKind::Add, entity.clone());
        let action_id = action.action_id;
        self.pending.insert(action_id, action);

        (action_id, entity)
    }

    /// Apply a tentative update as a shallow merge. An unknown id is a silent
    /// no-op: there is nothing to optimistically update.
    pub fn update_optimistic(
        &mut self,
        id: &EntityId,
        patch: &JsonValue,
    ) -> Option<(ActionId, EntityModel)> {
        let position = self.items.iter().position(|item| &item.id == id)?;

        // Snapshot the original before it is replaced; rollback restores it.
        let original = self.items[position].clone();
        let updated = original.apply_patch(patch);
        self.items[position] = updated.clone();

        let action = OptimisticAction::new(ActionKind::Update, original);
        let action_id = action.action_id;
        self.pending.insert(action_id, action);

        Some((action_id, updated))
    }

    /// Apply a tentative delete. An unknown id is a silent no-op.
    pub fn delete_optimistic(&mut self, id: &EntityId) -> Option<(ActionId, EntityModel)> {
        let position = self.items.iter().position(|item| &item.id == id)?;
        let removed = self.items.remove(position);

        let action = OptimisticAction::new(ActionKind::Delete, removed.clone());
        let action_id = action.action_id;
        self.pending.insert(action_id, action);

        Some((action_id, removed))
    }

    /// Settle an action as confirmed. For an add with a server payload, the
    /// tentative entity (matched by its tentative id) is replaced in place by the
    /// confirmed one; updates and deletes already reflect the desired outcome, so
    /// the items are left untouched. An unknown action id is a no-op.
    pub fn confirm_action(
        &mut self,
        action_id: ActionId,
        confirmed: Option<EntityModel>,
    ) -> Option<OptimisticAction> {
        let action = self.pending.remove(&action_id)?;

        if action.kind == ActionKind::Add {
            if let Some(confirmed) = confirmed {
                if let Some(position) = self.items.iter().position(|item| item.id == action.entity.id)
                {
                    self.items[position] = confirmed;
                }
            }
        }

        Some(action)
    }

    /// Settle an action as rolled back, reversing its effect on the items. An
    /// unknown action id is a no-op, which makes double settlement harmless.
    pub fn rollback_action(&mut self, action_id: ActionId) -> Option<OptimisticAction> {
        let action = self.pending.remove(&action_id)?;

        match action.kind {
            ActionKind::Add => {
                if let Some(position) =
                    self.items.iter().position(|item| item.id == action.entity.id)
                {
                    self.items.remove(position);
                }
            }
            ActionKind::Update => {
                match self.items.iter().position(|item| item.id == action.entity.id) {
                    Some(position) => self.items[position] = action.entity.clone(),
                    // The entity vanished in a racing delete; put the snapshot back in front.
                    None => self.items.insert(0, action.entity.clone()),
                }
            }
            ActionKind::Delete => {
                // Re-inserted at the front, not at the original index.
                self.items.insert(0, action.entity.clone());
            }
        }

        Some(action)
    }

    /// True while at least one pending action references this id.
    pub fn is_pending(&self, id: &EntityId) -> bool {
        self.pending.values().any(|action| &action.entity.id == id)
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.pending.clear();
    }
}

impl Default for CollectionState {
    fn default() -> Self {
        Self::new()
    }
}
