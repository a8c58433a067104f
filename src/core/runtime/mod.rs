//=========================================================================
// Runtime
//=========================================================================
//
// Play-mode execution of a scene.
//
// Architecture:
//   FrameScheduler::advance(dt)
//     ├─ InputState::flush()
//     ├─ RuntimeHooks::on_update(object, dt, RuntimeApi)
//     ├─ CollisionDetector::detect() → normalize → contact hooks
//     └─ WorldQueue (deferred destroy, then spawn)
//
//=========================================================================

//=== Module Declarations =================================================

mod api;
mod collision;
mod queue;
mod scheduler;

//=== Public API ==========================================================

pub use api::RuntimeApi;
pub use collision::{CollisionDetector, ContactEvent, ContactKind, ContactPhase, ContactTracker};
pub use queue::{WorldQueue, WorldRequest};
pub use scheduler::FrameScheduler;
