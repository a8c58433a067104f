//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use tessera_engine::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Engine core
pub use crate::engine::{Engine, EngineBuilder};

// Extensions
pub use crate::core::extension::{
    EditorProxy, ExtensionDefinition, ExtensionId, ExtensionRegistry, HookResult,
};
pub use crate::core::runtime::{
    CollisionDetector, ContactEvent, ContactKind, ContactPhase, RuntimeApi,
};

// Objects and scenes
pub use crate::core::object::{GameObject, ObjectData, ObjectId, Scene};

// Input system
pub use crate::core::input::{InputEvent, InputSender, InputState, KeyCode};

// Errors and notifications
pub use crate::core::error::{EngineError, EngineResult, ErrorKind};
pub use crate::core::notify::{notification_channel, Notification, NotificationReceiver};

// Editor
pub use crate::editor::{Command, CommandHistory, Editor, EditorBuilder, FnCommand};
