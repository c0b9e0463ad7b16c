use log::warn;
use serde_json::Value as JsonValue;

use crate::app_response::AppResponse;
use crate::collection_model::{EntityId, EntityModel, NewEntity};
use crate::collection_state::CollectionState;
use crate::local_persistence::{
    ActivityEntry, ActivityOutcome, LocalPersistence, MemoryPersistence, RedbPersistence,
};
use crate::optimistic_action::{ActionId, ActionKind, OptimisticAction};

/// Store state handed across the FFI boundary: the optimistic collection plus
/// the injected persistence capability recording activity history.
///
/// Collection mutations never fail; activity recording is best-effort and a
/// persistence error only produces a `warn!`, never a lost mutation.
pub struct AppStoreState {
    collection: CollectionState,
    persistence: Box<dyn LocalPersistence>,
}

impl AppStoreState {
    /// File-backed store: opens `<name>.redb` for activity and preferences.
    pub fn init(name: &str) -> Result<Self, AppResponse> {
        let persistence = RedbPersistence::open(name)?;
        Ok(Self {
            collection: CollectionState::new(),
            persistence: Box::new(persistence),
        })
    }

    /// Store with no file behind it; activity and preferences live in memory.
    pub fn in_memory() -> Self {
        Self {
            collection: CollectionState::new(),
            persistence: Box::new(MemoryPersistence::new()),
        }
    }

    fn record(&mut self, entry: ActivityEntry) {
        if let Err(response) = self.persistence.append_activity(entry) {
            warn!("Failed to record activity entry: {response}");
        }
    }

    pub fn hydrate(&mut self, items: Vec<EntityModel>) {
        self.collection.hydrate(items);
        self.record(ActivityEntry::store_event(ActivityOutcome::Hydrated));
    }

    pub fn add_optimistic(&mut self, new_entity: NewEntity) -> (ActionId, EntityModel) {
        let (action_id, entity) = self.collection.add_optimistic(new_entity);
        self.record(ActivityEntry::action(
            ActivityOutcome::Applied,
            ActionKind::Add,
            action_id,
            entity.id.clone(),
        ));
        (action_id, entity)
    }

    pub fn update_optimistic(
        &mut self,
        id: &EntityId,
        patch: &JsonValue,
    ) -> Option<(ActionId, EntityModel)> {
        let (action_id, entity) = self.collection.update_optimistic(id, patch)?;
        self.record(ActivityEntry::action(
            ActivityOutcome::Applied,
            ActionKind::Update,
            action_id,
            entity.id.clone(),
        ));
        Some((action_id, entity))
    }

    pub fn delete_optimistic(&mut self, id: &EntityId) -> Option<(ActionId, EntityModel)> {
        let (action_id, entity) = self.collection.delete_optimistic(id)?;
        self.record(ActivityEntry::action(
            ActivityOutcome::Applied,
            ActionKind::Delete,
            action_id,
            entity.id.clone(),
        ));
        Some((action_id, entity))
    }

    pub fn confirm_action(
        &mut self,
        action_id: ActionId,
        confirmed: Option<EntityModel>,
    ) -> Option<OptimisticAction> {
        let action = self.collection.confirm_action(action_id, confirmed)?;
        self.record(ActivityEntry::action(
            ActivityOutcome::Confirmed,
            action.kind,
            action.action_id,
            action.entity.id.clone(),
        ));
        Some(action)
    }

    pub fn rollback_action(&mut self, action_id: ActionId) -> Option<OptimisticAction> {
        let action = self.collection.rollback_action(action_id)?;
        self.record(ActivityEntry::action(
            ActivityOutcome::RolledBack,
            action.kind,
            action.action_id,
            action.entity.id.clone(),
        ));
        Some(action)
    }

    pub fn is_pending(&self, id: &EntityId) -> bool {
        self.collection.is_pending(id)
    }

    pub fn items(&self) -> &[EntityModel] {
        self.collection.items()
    }

    pub fn get_by_id(&self, id: &EntityId) -> Option<&EntityModel> {
        self.collection.get_by_id(id)
    }

    pub fn pending_actions(&self) -> Vec<&OptimisticAction> {
        self.collection.pending_actions()
    }

    pub fn pending_count(&self) -> usize {
        self.collection.pending_count()
    }

    pub fn len(&self) -> usize {
        self.collection.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collection.is_empty()
    }

    /// Empty the collection. The activity history is an audit trail and stays.
    pub fn clear_store(&mut self) {
        self.collection.clear();
        self.record(ActivityEntry::store_event(ActivityOutcome::Cleared));
    }

    /// Back to factory state: collection emptied, activity and preferences wiped.
    pub fn reset_store(&mut self) -> Result<(), AppResponse> {
        self.collection.clear();
        self.persistence.wipe()
    }

    pub fn close_store(&mut self) -> Result<(), AppResponse> {
        self.persistence.close()
    }

    pub fn recent_activity(&self, limit: usize) -> Result<Vec<ActivityEntry>, AppResponse> {
        self.persistence.recent_activity(limit)
    }

    pub fn set_preference(&mut self, key: &str, value: &str) -> Result<(), AppResponse> {
        self.persistence.set_preference(key, value)
    }

    pub fn get_preference(&self, key: &str) -> Result<Option<String>, AppResponse> {
        self.persistence.get_preference(key)
    }
}
