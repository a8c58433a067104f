//=========================================================================
// Internal State Store
//=========================================================================
//
// Side-table holding each extension instance's private state.
//
// Keys are `(ObjectId, ExtensionId)`, so state is never shared between
// objects, even for the same extension. Values are type-erased and
// recovered by downcast.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::Any;
use std::collections::HashMap;
use std::fmt;

//=== Internal Dependencies ===============================================

use super::ExtensionId;
use crate::core::object::ObjectId;

//=== InternalStore =======================================================

type StateKey = (ObjectId, ExtensionId);

/// Per-instance private state.
#[derive(Default)]
pub struct InternalStore {
    entries: HashMap<StateKey, Box<dyn Any + Send>>,
}

impl InternalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores state for an instance, replacing any previous value.
    pub fn insert<S: Any + Send>(&mut self, object: ObjectId, extension: &ExtensionId, state: S) {
        self.entries
            .insert((object, extension.clone()), Box::new(state));
    }

    /// State for an instance, if present and of type `S`.
    pub fn get<S: Any>(&self, object: ObjectId, extension: &ExtensionId) -> Option<&S> {
        self.entries
            .get(&(object, extension.clone()))
            .and_then(|state| state.downcast_ref())
    }

    pub fn get_mut<S: Any>(&mut self, object: ObjectId, extension: &ExtensionId) -> Option<&mut S> {
        self.entries
            .get_mut(&(object, extension.clone()))
            .and_then(|state| state.downcast_mut())
    }

    /// Removes and returns an instance's state if it is of type `S`.
    ///
    /// State of another type is left untouched.
    pub fn take<S: Any>(&mut self, object: ObjectId, extension: &ExtensionId) -> Option<S> {
        let key = (object, extension.clone());
        if !self.entries.get(&key)?.is::<S>() {
            return None;
        }
        self.entries
            .remove(&key)
            .and_then(|state| state.downcast().ok())
            .map(|state| *state)
    }

    pub fn contains(&self, object: ObjectId, extension: &ExtensionId) -> bool {
        self.entries.contains_key(&(object, extension.clone()))
    }

    /// Drops an instance's state whatever its type.
    pub fn remove(&mut self, object: ObjectId, extension: &ExtensionId) -> bool {
        self.entries.remove(&(object, extension.clone())).is_some()
    }

    /// Drops the state of every instance on `object`.
    pub fn remove_object(&mut self, object: ObjectId) {
        self.entries.retain(|(owner, _), _| *owner != object);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for InternalStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InternalStore")
            .field("entries", &self.entries.len())
            .finish()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
