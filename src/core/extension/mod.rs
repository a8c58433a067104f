//=========================================================================
// Extension System
//=========================================================================
//
// Pluggable behavior modules attached to game objects.
//
// Architecture:
//   ExtensionRegistry
//     └─ identifier → Arc<ExtensionDefinition>
//                        ├─ EditorHooks   (EditorView drives these)
//                        └─ RuntimeHooks  (FrameScheduler drives these)
//
//   GameObject.extensions: Vec<ExtensionInstance>   (attachment order)
//   InternalStore: (ObjectId, ExtensionId) → private state
//
//=========================================================================

//=== Module Declarations =================================================

mod definition;
mod instance;
mod internal;
pub(crate) mod invoke;
mod proxy;
mod registry;

//=== Public API ==========================================================

pub use definition::{
    ContactHook, EditorDestroyHook, EditorHook, EditorHooks, ExtensionDefinition,
    ExtensionDefinitionBuilder, HookResult, LifecycleHook, RuntimeHooks, UpdateHook,
};
pub use instance::{ExtensionId, ExtensionInstance, LifecyclePhase};
pub use internal::InternalStore;
pub use proxy::EditorProxy;
pub use registry::ExtensionRegistry;
