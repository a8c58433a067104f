//=========================================================================
// Engine Core
//
// Platform-independent building blocks shared by the runtime and the
// editor.
//
// Responsibilities:
// - Game object model and scenes (`object`)
// - Extension definitions, registry and instance state (`extension`)
// - Frame-granular keyboard input (`input`)
// - Tick scheduling, contact dispatch and deferred world changes (`runtime`)
// - Error taxonomy and user-facing notifications (`error`, `notify`)
//
// Notes:
// Everything here runs on one logical thread. The only cross-thread
// entry point is `InputSender`, which feeds the input inbox.
//
//=========================================================================

//=== Module Declarations =================================================

pub mod error;
pub mod extension;
pub mod input;
pub mod notify;
pub mod object;
pub mod runtime;
pub mod time;

//=== Public API ==========================================================

pub use error::{EngineError, EngineResult, ErrorKind};
pub use extension::{ExtensionDefinition, ExtensionId, ExtensionRegistry, HookResult};
pub use input::{InputEvent, InputSender, InputState, KeyCode};
pub use notify::{notification_channel, Notification, NotificationReceiver, NotificationSender};
pub use object::{GameObject, ObjectData, ObjectId, Scene};
pub use runtime::{FrameScheduler, RuntimeApi};
