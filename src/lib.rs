//! # Optimistic Core
//!
//! An in-memory optimistic collection store designed for FFI (Foreign Function
//! Interface) integration with Flutter and other cross-platform applications.
//! The store lets a UI show the effect of a create/update/delete request the
//! instant the user acts, while the real network request is still in flight, and
//! deterministically reconciles or undoes that effect once the request settles.
//!
//! ## Features
//!
//! - **Immediate mutations**: tentative adds, updates and deletes become visible
//!   synchronously, before the backend answers
//! - **Deterministic reconciliation**: every mutation is tracked as a pending
//!   action that settles as confirmed or rolled back, without disturbing other
//!   in-flight actions
//! - **Tagged identity**: store-generated temporary ids and server-assigned ids
//!   are distinct types, so confirmation logic never inspects string prefixes
//! - **redb-backed activity history**: applied/confirmed/rolled-back events and
//!   preferences persist locally through an injected capability
//! - **FFI-optimized**: C-compatible surface with a JSON response envelope and
//!   hot restart support
//! - **Safe error handling**: no `unwrap()` calls in production code
//!
//! ## Quick Start
//!
//! ```no_run
//! use optimistic_core::{create_store, add_optimistic, confirm_action};
//! use std::ffi::CString;
//!
//! // Create a store instance backed by "deals.redb"
//! let store_name = CString::new("deals").unwrap();
//! let store = create_store(store_name.as_ptr());
//!
//! // Apply a tentative add; the response carries the action id to settle later
//! let json_data = CString::new(r#"{"data":{"name":"Riverside Plaza"}}"#).unwrap();
//! let result = add_optimistic(store, json_data.as_ptr());
//!
//! // Once the backend answers, confirm with the server-assigned entity
//! let confirmed = CString::new(r#"{"id":"deal_1","data":{"name":"Riverside Plaza"}}"#).unwrap();
//! let result = confirm_action(store, 1, confirmed.as_ptr());
//! ```
//!
//! ## FFI Functions
//!
//! This library exposes C-compatible functions for cross-language integration:
//!
//! - [`create_store`] / [`create_store_in_memory`] - Initialize a store instance
//! - [`hydrate_store`] - Load a server snapshot into the collection
//! - [`add_optimistic`] - Apply a tentative add
//! - [`update_optimistic`] - Apply a tentative shallow-merge update
//! - [`delete_optimistic`] - Apply a tentative delete
//! - [`confirm_action`] - Settle a pending action as confirmed
//! - [`rollback_action`] - Settle a pending action as rolled back
//! - [`is_pending`] - Check whether an entity has unsettled actions
//! - [`get_by_id`] - Retrieve a single entity as the UI currently sees it
//! - [`get_all`] - Retrieve the current entity list
//! - [`get_pending_actions`] - Retrieve all unsettled actions
//! - [`get_activity_log`] - Retrieve recent persisted activity entries
//! - [`set_preference`] / [`get_preference`] - Local key-value preferences
//! - [`clear_store`] - Empty the collection
//! - [`reset_store`] - Wipe collection, activity history and preferences
//! - [`close_store`] - Explicit connection cleanup

pub mod app_response;
pub mod app_store;
pub mod collection_model;
pub mod collection_state;
pub mod local_persistence;
pub mod optimistic_action;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use log::{info, warn};
use serde_json::json;

use crate::app_response::AppResponse;
use crate::app_store::AppStoreState;
use crate::collection_model::{EntityId, EntityModel, NewEntity};
use crate::optimistic_action::ActionId;

/// Creates a new store instance with the specified name.
///
/// Initializes an empty optimistic collection and opens the local persistence
/// file (`<name>.redb`) that records activity history and preferences.
///
/// # Parameters
///
/// * `name` - A null-terminated C string containing the store name
///
/// # Returns
///
/// Returns a pointer to the [`AppStoreState`] instance on success, or a null
/// pointer on failure. The caller is responsible for managing the returned
/// pointer's lifetime.
///
/// # Safety
///
/// This function is unsafe because it:
/// - Dereferences a raw pointer without validation
/// - Returns a raw pointer that must be properly managed
/// - Requires the input string to be valid UTF-8
///
/// # Examples
///
/// ```no_run
/// use std::ffi::CString;
/// use optimistic_core::create_store;
///
/// let name = CString::new("deals").unwrap();
/// let store = create_store(name.as_ptr());
///
/// if !store.is_null() {
///     // Store created successfully
/// }
/// ```
///
/// # Errors
///
/// Returns null pointer if:
/// - Input name pointer is null
/// - Input string contains invalid UTF-8
/// - The persistence file cannot be opened
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn create_store(name: *const c_char) -> *mut AppStoreState {
    if name.is_null() {
        warn!("Null name pointer passed to create_store");
        return std::ptr::null_mut();
    }

    let name_str = match unsafe { CStr::from_ptr(name).to_str() } {
        Ok(s) => s,
        Err(e) => {
            warn!("Invalid UTF-8 in name parameter: {e}");
            return std::ptr::null_mut();
        }
    };

    info!("Attempting to create/open store at: {name_str}.redb");

    match AppStoreState::init(name_str) {
        Ok(state) => {
            info!("✅ Store initialized successfully");
            Box::into_raw(Box::new(state))
        }
        Err(e) => {
            warn!("❌ Failed to initialize store: {e}");
            warn!("Attempted path: {name_str}.redb");
            warn!("Current working directory might not be writable");
            std::ptr::null_mut()
        }
    }
}

/// Creates a store instance with no file behind it.
///
/// Activity history and preferences live in process memory only; everything else
/// behaves exactly like a store created with [`create_store`]. Useful for
/// ephemeral sessions and widget tests.
///
/// # Returns
///
/// Returns a pointer to the [`AppStoreState`] instance. Never null.
#[no_mangle]
pub extern "C" fn create_store_in_memory() -> *mut AppStoreState {
    Box::into_raw(Box::new(AppStoreState::in_memory()))
}

/// Replaces the collection with a server snapshot.
///
/// All pending actions are dropped: the snapshot is authoritative. This is the
/// load/refetch path a UI calls after fetching the entity list from its backend.
///
/// # Parameters
///
/// * `state` - Pointer to the store state instance
/// * `json_ptr` - Null-terminated C string containing a JSON array of entities
///
/// # Returns
///
/// Returns a JSON-formatted C string containing the operation result. The
/// returned string must be freed by the caller.
///
/// # Safety
///
/// Both parameters must be valid pointers.
///
/// # JSON Format
///
/// ```json
/// [
///   {"id": "deal_1", "data": {"name": "Riverside Plaza"}},
///   {"id": "deal_2", "data": {"name": "Harbor Point"}}
/// ]
/// ```
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn hydrate_store(state: *mut AppStoreState, json_ptr: *const c_char) -> *const c_char {
    if state.is_null() {
        let error = AppResponse::BadRequest("Null state pointer passed to hydrate_store".to_string());
        return response_to_c_string(&error);
    }

    let json_str = match c_ptr_to_string(json_ptr, "JSON") {
        Ok(json) => json,
        Err(error_ptr) => return error_ptr,
    };

    let items: Vec<EntityModel> = match serde_json::from_str(&json_str) {
        Ok(items) => items,
        Err(e) => {
            let error = AppResponse::SerializationError(format!("Invalid entity array: {e}"));
            return response_to_c_string(&error);
        }
    };

    let state = unsafe { &mut *state };

    let count = items.len();
    state.hydrate(items);

    let success = AppResponse::Ok(format!("Hydrated {count} entities"));
    response_to_c_string(&success)
}

/// Applies a tentative add to the collection.
///
/// The entity becomes visible immediately, prepended to the list. A
/// caller-supplied id is used as-is; otherwise the store mints a temporary id
/// that confirmation later swaps for the server-assigned one. This operation
/// always succeeds for well-formed input.
///
/// # Parameters
///
/// * `state` - Pointer to the store state instance
/// * `json_ptr` - Null-terminated C string containing the new entity JSON
///
/// # Returns
///
/// Returns a JSON-formatted C string; the `Ok` payload carries the action id to
/// settle later plus the tentative entity:
///
/// ```json
/// {"action_id": 7, "entity": {"id": {"temp_token": 3}, "data": {"name": "New"}}}
/// ```
///
/// # Safety
///
/// Both parameters must be valid pointers.
///
/// # Examples
///
/// ```no_run
/// use std::ffi::CString;
/// use optimistic_core::{create_store, add_optimistic};
///
/// let name = CString::new("deals").unwrap();
/// let store = create_store(name.as_ptr());
///
/// let json = CString::new(r#"{"data":{"name":"Riverside Plaza","stage":"lead"}}"#).unwrap();
/// let result = add_optimistic(store, json.as_ptr());
/// ```
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn add_optimistic(state: *mut AppStoreState, json_ptr: *const c_char) -> *const c_char {
    let state = match unsafe { state.as_mut() } {
        Some(s) => s,
        None => {
            let error = AppResponse::BadRequest("Null state pointer".to_string());
            return response_to_c_string(&error);
        }
    };

    let json_str = match c_ptr_to_string(json_ptr, "JSON") {
        Ok(json) => json,
        Err(error_ptr) => return error_ptr,
    };

    let new_entity: NewEntity = match serde_json::from_str(&json_str) {
        Ok(entity) => entity,
        Err(e) => {
            let error = AppResponse::SerializationError(format!("Invalid JSON: {e}"));
            return response_to_c_string(&error);
        }
    };

    let (action_id, entity) = state.add_optimistic(new_entity);
    action_payload(action_id, &entity)
}

/// Applies a tentative update as a shallow merge.
///
/// The entity is replaced in place by the merge of the patch into its data; the
/// pre-update entity is snapshotted so a later rollback can restore it exactly.
/// An id that is not currently listed leaves the collection untouched and
/// registers no pending action.
///
/// # Parameters
///
/// * `state` - Pointer to the store state instance
/// * `id_ptr` - Null-terminated C string containing the entity id (a raw server
///   id, or the JSON form of a temporary id such as `{"temp_token":3}`)
/// * `patch_ptr` - Null-terminated C string containing the JSON patch object
///
/// # Returns
///
/// Returns a JSON-formatted C string: the `Ok` payload carries the action id and
/// the updated entity, or a `NotFound` envelope when the id is not listed.
///
/// # Safety
///
/// All parameters must be valid pointers.
///
/// # Examples
///
/// ```no_run
/// use std::ffi::CString;
/// use optimistic_core::{create_store, update_optimistic};
///
/// let name = CString::new("deals").unwrap();
/// let store = create_store(name.as_ptr());
///
/// let id = CString::new("deal_1").unwrap();
/// let patch = CString::new(r#"{"stage":"closed"}"#).unwrap();
/// let result = update_optimistic(store, id.as_ptr(), patch.as_ptr());
/// ```
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn update_optimistic(
    state: *mut AppStoreState,
    id_ptr: *const c_char,
    patch_ptr: *const c_char,
) -> *const c_char {
    if state.is_null() {
        let error = AppResponse::BadRequest("Null state pointer passed to update_optimistic".to_string());
        return response_to_c_string(&error);
    }

    let id_str = match c_ptr_to_string(id_ptr, "id") {
        Ok(id) => id,
        Err(error_ptr) => return error_ptr,
    };

    let patch_str = match c_ptr_to_string(patch_ptr, "patch") {
        Ok(patch) => patch,
        Err(error_ptr) => return error_ptr,
    };

    let patch: serde_json::Value = match serde_json::from_str(&patch_str) {
        Ok(patch) => patch,
        Err(e) => {
            let error = AppResponse::SerializationError(format!("Invalid patch JSON: {e}"));
            return response_to_c_string(&error);
        }
    };

    let state = unsafe { &mut *state };
    let id = parse_entity_id(&id_str);

    match state.update_optimistic(&id, &patch) {
        Some((action_id, entity)) => action_payload(action_id, &entity),
        None => {
            let not_found = AppResponse::NotFound(format!("No entity found with id: {id}"));
            response_to_c_string(&not_found)
        }
    }
}

/// Applies a tentative delete.
///
/// The entity disappears from the list immediately and is snapshotted into the
/// pending action; a later rollback re-inserts it at the front of the list. An
/// id that is not currently listed leaves the collection untouched.
///
/// # Parameters
///
/// * `state` - Pointer to the store state instance
/// * `id_ptr` - Null-terminated C string containing the entity id
///
/// # Returns
///
/// Returns a JSON-formatted C string: the `Ok` payload carries the action id and
/// the removed entity, or a `NotFound` envelope when the id is not listed.
///
/// # Safety
///
/// Both parameters must be valid pointers.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn delete_optimistic(state: *mut AppStoreState, id_ptr: *const c_char) -> *const c_char {
    if state.is_null() {
        let error = AppResponse::BadRequest("Null state pointer passed to delete_optimistic".to_string());
        return response_to_c_string(&error);
    }

    let id_str = match c_ptr_to_string(id_ptr, "id") {
        Ok(id) => id,
        Err(error_ptr) => return error_ptr,
    };

    let state = unsafe { &mut *state };
    let id = parse_entity_id(&id_str);

    match state.delete_optimistic(&id) {
        Some((action_id, entity)) => action_payload(action_id, &entity),
        None => {
            let not_found = AppResponse::NotFound(format!("No entity found with id: {id}"));
            response_to_c_string(&not_found)
        }
    }
}

/// Settles a pending action as confirmed.
///
/// For an add, the optional `confirmed_ptr` payload (typically carrying the
/// server-assigned id in place of the temporary one) replaces the tentative
/// entity in the list. Updates and deletes already reflect the desired outcome,
/// so their confirmation only removes the pending entry. Settling an action id
/// that is unknown (already confirmed or rolled back) is a benign no-op: the
/// double-settlement race between a timeout rollback and a late success is
/// expected, not an error.
///
/// # Parameters
///
/// * `state` - Pointer to the store state instance
/// * `action_id` - The action id returned by the optimistic call
/// * `confirmed_ptr` - Null-terminated C string containing the server-confirmed
///   entity JSON, or null when no reconciliation payload exists
///
/// # Returns
///
/// Returns a JSON-formatted C string indicating the settlement result.
///
/// # Safety
///
/// `state` must be a valid pointer; `confirmed_ptr` may be null.
///
/// # Examples
///
/// ```no_run
/// use std::ffi::CString;
/// use optimistic_core::{create_store, confirm_action};
///
/// let name = CString::new("deals").unwrap();
/// let store = create_store(name.as_ptr());
///
/// let confirmed = CString::new(r#"{"id":"deal_9","data":{"name":"New"}}"#).unwrap();
/// let result = confirm_action(store, 7, confirmed.as_ptr());
///
/// // No reconciliation payload for updates and deletes
/// let result = confirm_action(store, 8, std::ptr::null());
/// ```
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn confirm_action(
    state: *mut AppStoreState,
    action_id: u64,
    confirmed_ptr: *const c_char,
) -> *const c_char {
    if state.is_null() {
        let error = AppResponse::BadRequest("Null state pointer passed to confirm_action".to_string());
        return response_to_c_string(&error);
    }

    let confirmed: Option<EntityModel> = if confirmed_ptr.is_null() {
        None
    } else {
        let confirmed_str = match c_ptr_to_string(confirmed_ptr, "confirmed entity") {
            Ok(json) => json,
            Err(error_ptr) => return error_ptr,
        };
        match serde_json::from_str(&confirmed_str) {
            Ok(entity) => Some(entity),
            Err(e) => {
                let error = AppResponse::SerializationError(format!("Invalid confirmed entity: {e}"));
                return response_to_c_string(&error);
            }
        }
    };

    let state = unsafe { &mut *state };

    match state.confirm_action(ActionId(action_id), confirmed) {
        Some(action) => {
            let success = AppResponse::Ok(format!("Action {} confirmed", action.action_id));
            response_to_c_string(&success)
        }
        None => {
            let settled = AppResponse::Ok(format!("Action act_{action_id} already settled"));
            response_to_c_string(&settled)
        }
    }
}

/// Settles a pending action as rolled back, reversing its effect.
///
/// Adds remove their tentative entity, updates restore the pre-update snapshot
/// in place, deletes re-insert the removed entity at the front of the list.
/// Settling an unknown action id is a benign no-op, matching [`confirm_action`].
///
/// # Parameters
///
/// * `state` - Pointer to the store state instance
/// * `action_id` - The action id returned by the optimistic call
///
/// # Returns
///
/// Returns a JSON-formatted C string indicating the settlement result.
///
/// # Safety
///
/// `state` must be a valid pointer.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn rollback_action(state: *mut AppStoreState, action_id: u64) -> *const c_char {
    if state.is_null() {
        let error = AppResponse::BadRequest("Null state pointer passed to rollback_action".to_string());
        return response_to_c_string(&error);
    }

    let state = unsafe { &mut *state };

    match state.rollback_action(ActionId(action_id)) {
        Some(action) => {
            let success = AppResponse::Ok(format!("Action {} rolled back", action.action_id));
            response_to_c_string(&success)
        }
        None => {
            let settled = AppResponse::Ok(format!("Action act_{action_id} already settled"));
            response_to_c_string(&settled)
        }
    }
}

/// Checks whether any pending action references the given entity id.
///
/// UIs use this to disable further edits on rows whose request is in flight.
///
/// # Parameters
///
/// * `state` - Pointer to the store state instance
/// * `id_ptr` - Null-terminated C string containing the entity id
///
/// # Returns
///
/// Returns a JSON-formatted C string whose `Ok` payload is `"true"` or `"false"`.
///
/// # Safety
///
/// Both parameters must be valid pointers.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn is_pending(state: *mut AppStoreState, id_ptr: *const c_char) -> *const c_char {
    if state.is_null() {
        let error = AppResponse::BadRequest("Null state pointer passed to is_pending".to_string());
        return response_to_c_string(&error);
    }

    let id_str = match c_ptr_to_string(id_ptr, "id") {
        Ok(id) => id,
        Err(error_ptr) => return error_ptr,
    };

    let state = unsafe { &*state };
    let id = parse_entity_id(&id_str);

    let pending = state.is_pending(&id);
    let success = AppResponse::Ok(pending.to_string());
    response_to_c_string(&success)
}

/// Retrieves a single entity by its id.
///
/// The lookup sees the collection as the UI does: tentative mutations included.
/// An entity whose delete is still in flight is therefore not found.
///
/// # Parameters
///
/// * `state` - Pointer to the store state instance
/// * `id_ptr` - Null-terminated C string containing the entity id
///
/// # Returns
///
/// Returns a JSON-formatted C string: the `Ok` payload carries the entity, or a
/// `NotFound` envelope when the id is not listed.
///
/// # Safety
///
/// Both parameters must be valid pointers.
///
/// # Examples
///
/// ```no_run
/// use std::ffi::CString;
/// use optimistic_core::{create_store, get_by_id};
///
/// let name = CString::new("deals").unwrap();
/// let store = create_store(name.as_ptr());
///
/// let id = CString::new("deal_1").unwrap();
/// let result = get_by_id(store, id.as_ptr());
/// ```
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_by_id(state: *mut AppStoreState, id_ptr: *const c_char) -> *const c_char {
    if state.is_null() {
        let error = AppResponse::BadRequest("Null state pointer passed to get_by_id".to_string());
        return response_to_c_string(&error);
    }

    let id_str = match c_ptr_to_string(id_ptr, "id") {
        Ok(id) => id,
        Err(error_ptr) => return error_ptr,
    };

    let state = unsafe { &*state };
    let id = parse_entity_id(&id_str);

    match state.get_by_id(&id) {
        Some(entity) => match serde_json::to_string(entity) {
            Ok(json) => {
                let success = AppResponse::Ok(json);
                response_to_c_string(&success)
            }
            Err(e) => {
                let error = AppResponse::SerializationError(format!("Error serializing entity: {e:?}"));
                response_to_c_string(&error)
            }
        },
        None => {
            let not_found = AppResponse::NotFound(format!("No entity found with id: {id}"));
            response_to_c_string(&not_found)
        }
    }
}

/// Retrieves the current entity list.
///
/// The list reflects every unsettled optimistic mutation: tentative adds are
/// present (newest first), tentative deletes are absent.
///
/// # Parameters
///
/// * `state` - Pointer to the store state instance
///
/// # Returns
///
/// Returns a JSON-formatted C string containing an array of all entities,
/// or an error response on failure.
///
/// # Safety
///
/// The state parameter must be a valid pointer to an [`AppStoreState`] instance.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_all(state: *mut AppStoreState) -> *const c_char {
    if state.is_null() {
        let error = AppResponse::BadRequest("Null state pointer passed to get_all".to_string());
        return response_to_c_string(&error);
    }

    let state = unsafe { &*state };

    match serde_json::to_string(state.items()) {
        Ok(json) => {
            let success = AppResponse::Ok(json);
            response_to_c_string(&success)
        }
        Err(e) => {
            let error = AppResponse::SerializationError(format!("Error serializing entities: {e:?}"));
            response_to_c_string(&error)
        }
    }
}

/// Retrieves all unsettled actions in creation order.
///
/// # Safety
///
/// The state parameter must be a valid pointer.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_pending_actions(state: *mut AppStoreState) -> *const c_char {
    if state.is_null() {
        let error = AppResponse::BadRequest("Null state pointer passed to get_pending_actions".to_string());
        return response_to_c_string(&error);
    }

    let state = unsafe { &*state };

    match serde_json::to_string(&state.pending_actions()) {
        Ok(json) => {
            let success = AppResponse::Ok(json);
            response_to_c_string(&success)
        }
        Err(e) => {
            let error = AppResponse::SerializationError(format!("Error serializing actions: {e:?}"));
            response_to_c_string(&error)
        }
    }
}

/// Retrieves recent persisted activity entries, newest first.
///
/// # Parameters
///
/// * `state` - Pointer to the store state instance
/// * `limit` - Maximum number of entries to return
///
/// # Safety
///
/// The state parameter must be a valid pointer.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_activity_log(state: *mut AppStoreState, limit: u64) -> *const c_char {
    if state.is_null() {
        let error = AppResponse::BadRequest("Null state pointer passed to get_activity_log".to_string());
        return response_to_c_string(&error);
    }

    let state = unsafe { &*state };

    match state.recent_activity(limit as usize) {
        Ok(entries) => match serde_json::to_string(&entries) {
            Ok(json) => {
                let success = AppResponse::Ok(json);
                response_to_c_string(&success)
            }
            Err(e) => {
                let error = AppResponse::SerializationError(format!("Error serializing entries: {e:?}"));
                response_to_c_string(&error)
            }
        },
        Err(e) => response_to_c_string(&e),
    }
}

/// Stores a local preference value under a key.
///
/// # Safety
///
/// All parameters must be valid pointers.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn set_preference(
    state: *mut AppStoreState,
    key_ptr: *const c_char,
    value_ptr: *const c_char,
) -> *const c_char {
    if state.is_null() {
        let error = AppResponse::BadRequest("Null state pointer passed to set_preference".to_string());
        return response_to_c_string(&error);
    }

    let key = match c_ptr_to_string(key_ptr, "key") {
        Ok(key) => key,
        Err(error_ptr) => return error_ptr,
    };

    let value = match c_ptr_to_string(value_ptr, "value") {
        Ok(value) => value,
        Err(error_ptr) => return error_ptr,
    };

    let state = unsafe { &mut *state };

    match state.set_preference(&key, &value) {
        Ok(_) => {
            let success = AppResponse::success("Preference saved successfully");
            response_to_c_string(&success)
        }
        Err(e) => response_to_c_string(&e),
    }
}

/// Retrieves a local preference value by key.
///
/// # Safety
///
/// Both parameters must be valid pointers.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_preference(state: *mut AppStoreState, key_ptr: *const c_char) -> *const c_char {
    if state.is_null() {
        let error = AppResponse::BadRequest("Null state pointer passed to get_preference".to_string());
        return response_to_c_string(&error);
    }

    let key = match c_ptr_to_string(key_ptr, "key") {
        Ok(key) => key,
        Err(error_ptr) => return error_ptr,
    };

    let state = unsafe { &*state };

    match state.get_preference(&key) {
        Ok(Some(value)) => {
            let success = AppResponse::Ok(value);
            response_to_c_string(&success)
        }
        Ok(None) => {
            let not_found = AppResponse::NotFound(format!("No preference found with key: {key}"));
            response_to_c_string(&not_found)
        }
        Err(e) => response_to_c_string(&e),
    }
}

/// Empties the collection: all entities and pending actions are dropped.
///
/// The persisted activity history is an audit trail and survives this call; use
/// [`reset_store`] to wipe everything.
///
/// # Safety
///
/// The state parameter must be a valid pointer.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn clear_store(state: *mut AppStoreState) -> *const c_char {
    if state.is_null() {
        let error = AppResponse::BadRequest("Null state pointer passed to clear_store".to_string());
        return response_to_c_string(&error);
    }

    let state = unsafe { &mut *state };

    state.clear_store();
    let success = AppResponse::success("All entities cleared successfully");
    response_to_c_string(&success)
}

/// Resets the store to a clean state.
///
/// This operation:
/// 1. Empties the collection and drops all pending actions
/// 2. Wipes the persisted activity history and preferences
///
/// # Safety
///
/// The state parameter must be a valid pointer.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn reset_store(state: *mut AppStoreState) -> *const c_char {
    if state.is_null() {
        let error = AppResponse::BadRequest("Null state pointer passed to reset_store".to_string());
        return response_to_c_string(&error);
    }

    let state = unsafe { &mut *state };

    match state.reset_store() {
        Ok(_) => {
            let success = AppResponse::success("Store was reset successfully");
            response_to_c_string(&success)
        }
        Err(e) => response_to_c_string(&e),
    }
}

/// Explicitly closes the store's persistence handle.
///
/// Provides explicit connection management, which is particularly useful for
/// Flutter hot restart scenarios where resources need to be cleaned up before
/// reconnecting.
///
/// # Safety
///
/// The state parameter must be a valid pointer.
///
/// # Notes
///
/// redb commits every transaction eagerly and closes the file when the handle is
/// dropped. This function serves as an explicit indicator that the store should
/// no longer be used.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn close_store(state: *mut AppStoreState) -> *const c_char {
    if state.is_null() {
        let error = AppResponse::BadRequest("Null state pointer passed to close_store".to_string());
        return response_to_c_string(&error);
    }

    let state = unsafe { &mut *state };

    match state.close_store() {
        Ok(_) => {
            let success = AppResponse::success("Store closed successfully");
            response_to_c_string(&success)
        }
        Err(e) => response_to_c_string(&e),
    }
}

/// Builds the `Ok` envelope shared by the optimistic mutation functions.
fn action_payload(action_id: ActionId, entity: &EntityModel) -> *const c_char {
    let payload = json!({"action_id": action_id, "entity": entity});
    let success = AppResponse::Ok(payload.to_string());
    response_to_c_string(&success)
}

/// Resolves a raw id string arriving over FFI to an [`EntityId`].
///
/// JSON shapes (`{"temp_token":3}`, `"deal_1"`) deserialize directly; anything
/// that is not valid JSON is taken verbatim as a persisted id.
fn parse_entity_id(raw: &str) -> EntityId {
    serde_json::from_str::<EntityId>(raw).unwrap_or_else(|_| EntityId::Persisted(raw.to_string()))
}

/// Converts an [`AppResponse`] to a C-compatible string.
///
/// This internal helper function serializes the response to JSON format
/// and converts it to a C string that can be returned to FFI callers.
///
/// # Parameters
///
/// * `response` - Reference to the response to convert
///
/// # Returns
///
/// Returns a pointer to a null-terminated C string containing the JSON response.
/// The caller is responsible for freeing this memory.
///
/// # Safety
///
/// Returns a null pointer if serialization or C string creation fails.
fn response_to_c_string(response: &AppResponse) -> *const c_char {
    let json = match serde_json::to_string(response) {
        Ok(j) => j,
        Err(e) => {
            warn!("Error serializing response: {e}");
            return std::ptr::null();
        }
    };

    match CString::new(json) {
        Ok(c_str) => c_str.into_raw(),
        Err(e) => {
            warn!("Error creating CString: {e}");
            std::ptr::null()
        }
    }
}

/// Converts a C string pointer to a Rust String with comprehensive error handling.
///
/// This internal helper function safely converts C string pointers to Rust
/// strings, handling all possible error conditions including null pointers and
/// invalid UTF-8.
///
/// # Parameters
///
/// * `ptr` - Pointer to the C string
/// * `field_name` - Name of the field for descriptive error messages
///
/// # Returns
///
/// * `Ok(String)` - If conversion was successful
/// * `Err(*const c_char)` - Pointer to error message in C format if conversion failed
///
/// # Safety
///
/// This function safely handles null pointers and invalid UTF-8 sequences.
fn c_ptr_to_string(ptr: *const c_char, field_name: &str) -> Result<String, *const c_char> {
    if ptr.is_null() {
        let error = AppResponse::BadRequest(format!("Null {field_name} pointer"));
        return Err(response_to_c_string(&error));
    }

    match unsafe { CStr::from_ptr(ptr).to_str() } {
        Ok(s) => Ok(s.to_string()),
        Err(e) => {
            let error = AppResponse::BadRequest(format!("Invalid UTF-8 in {field_name}: {e}"));
            Err(response_to_c_string(&error))
        }
    }
}
