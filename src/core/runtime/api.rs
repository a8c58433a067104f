//=========================================================================
// Runtime API
//=========================================================================
//
// Context handed to every runtime hook.
//
// Gives an extension instance:
//   - read access to the input state flushed for this tick
//   - its own private state in the `InternalStore`
//   - a logger scoped to `extension::<id>`
//   - deferred spawn/destroy requests
//
// The API is fully built before the hook runs, including for
// `on_created`.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::Any;
use std::fmt::Display;

use log::{log, Level};

//=== Internal Dependencies ===============================================

use super::{WorldQueue, WorldRequest};
use crate::core::extension::{ExtensionId, InternalStore};
use crate::core::input::InputState;
use crate::core::object::{IdAllocator, ObjectData, ObjectId};

//=== RuntimeApi ==========================================================

/// Per-call context for runtime hooks.
pub struct RuntimeApi<'a> {
    object: ObjectId,
    extension: &'a ExtensionId,
    tick: u64,
    input: &'a InputState,
    store: &'a mut InternalStore,
    ids: &'a mut IdAllocator,
    requests: &'a mut WorldQueue,
}

impl<'a> RuntimeApi<'a> {
    pub(crate) fn new(
        object: ObjectId,
        extension: &'a ExtensionId,
        tick: u64,
        input: &'a InputState,
        store: &'a mut InternalStore,
        ids: &'a mut IdAllocator,
        requests: &'a mut WorldQueue,
    ) -> Self {
        Self {
            object,
            extension,
            tick,
            input,
            store,
            ids,
            requests,
        }
    }

    //--- Context ----------------------------------------------------------

    /// Object this instance is attached to.
    pub fn object_id(&self) -> ObjectId {
        self.object
    }

    pub fn extension(&self) -> &ExtensionId {
        self.extension
    }

    /// Number of the tick being run.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Input state as flushed at the start of this tick.
    pub fn input(&self) -> &InputState {
        self.input
    }

    //--- Internal State ---------------------------------------------------

    /// Stores this instance's private state, replacing any previous value.
    pub fn init_state<S: Any + Send>(&mut self, state: S) {
        self.store.insert(self.object, self.extension, state);
    }

    pub fn state<S: Any>(&self) -> Option<&S> {
        self.store.get(self.object, self.extension)
    }

    pub fn state_mut<S: Any>(&mut self) -> Option<&mut S> {
        self.store.get_mut(self.object, self.extension)
    }

    pub fn take_state<S: Any>(&mut self) -> Option<S> {
        self.store.take(self.object, self.extension)
    }

    //--- Logging ----------------------------------------------------------

    /// Logs under the `extension::<id>` target.
    pub fn log(&self, level: Level, message: impl Display) {
        let target = format!("extension::{}", self.extension);
        log!(target: target.as_str(), level, "[{}] {}", self.object, message);
    }

    pub fn debug(&self, message: impl Display) {
        self.log(Level::Debug, message);
    }

    pub fn info(&self, message: impl Display) {
        self.log(Level::Info, message);
    }

    pub fn warn(&self, message: impl Display) {
        self.log(Level::Warn, message);
    }

    pub fn error(&self, message: impl Display) {
        self.log(Level::Error, message);
    }

    //--- World Requests ---------------------------------------------------

    /// Fresh object data with a newly allocated id.
    pub fn new_object(&mut self, name: impl Into<String>) -> ObjectData {
        ObjectData::new(self.ids.allocate(), name)
    }

    /// Queues an object for creation at the end of this tick.
    ///
    /// Its extensions receive `on_created` at the tick boundary and their
    /// first `on_update` on the next tick.
    pub fn spawn<I, E>(&mut self, data: ObjectData, extensions: I) -> ObjectId
    where
        I: IntoIterator<Item = E>,
        E: Into<ExtensionId>,
    {
        let id = data.id;
        self.requests.push(WorldRequest::Spawn {
            data,
            extensions: extensions.into_iter().map(Into::into).collect(),
        });
        id
    }

    /// Queues an object for destruction at the end of this tick.
    ///
    /// The object keeps receiving this tick's remaining hooks.
    pub fn destroy(&mut self, id: ObjectId) {
        if !self.requests.is_destroy_pending(id) {
            self.requests.push(WorldRequest::Destroy(id));
        }
    }

    /// Queues the calling object for destruction.
    pub fn destroy_self(&mut self) {
        self.destroy(self.object);
    }
}
