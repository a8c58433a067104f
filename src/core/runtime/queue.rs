//=========================================================================
// World Queue
//=========================================================================
//
// Deferred spawn and destroy requests.
//
// Hooks queue requests here during a tick. The scheduler processes the
// queue at the tick boundary: destroys first, then spawns. Requests made
// while the boundary is being processed wait for the next tick.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use crate::core::extension::ExtensionId;
use crate::core::object::{ObjectData, ObjectId};

//=== WorldRequest ========================================================

/// A structural change to apply at the next tick boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum WorldRequest {
    /// Create an object with extensions attached in order.
    Spawn {
        data: ObjectData,
        extensions: Vec<ExtensionId>,
    },

    /// Destroy an object after its remaining hooks this tick.
    Destroy(ObjectId),
}

//=== WorldQueue ==========================================================

/// Queue of pending [`WorldRequest`]s.
#[derive(Debug, Default)]
pub struct WorldQueue {
    queue: Vec<WorldRequest>,
}

impl WorldQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a request for the next tick boundary.
    pub fn push(&mut self, request: WorldRequest) {
        self.queue.push(request);
    }

    pub fn iter(&self) -> impl Iterator<Item = &WorldRequest> {
        self.queue.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn clear(&mut self) {
        self.queue.clear()
    }

    /// Returns true if `id` is already queued for destruction.
    pub fn is_destroy_pending(&self, id: ObjectId) -> bool {
        self.queue
            .iter()
            .any(|request| matches!(request, WorldRequest::Destroy(target) if *target == id))
    }

    /// Takes all requests, leaving the queue empty.
    ///
    /// Anything pushed afterwards belongs to the next batch.
    pub fn take(&mut self) -> Vec<WorldRequest> {
        std::mem::take(&mut self.queue)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
