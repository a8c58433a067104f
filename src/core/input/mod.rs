//=========================================================================
// Input System
//=========================================================================
//
// Keyboard input with frame-granular edge detection.
//
// Architecture:
//   Platform ──InputEvent──> InputSender ──inbox──> InputState
//                                                      │
//                              FrameScheduler::advance ┘ flush()
//                                                      │
//   Extensions <── is_key_pressed / just_pressed / axis ┘
//
//=========================================================================

//=== Module Declarations =================================================

pub mod event;
mod input_state;

//=== Public API ==========================================================

pub use event::{InputEvent, KeyCode, KeyInput, UnknownKeyCode};
pub use input_state::{InputSender, InputState, MovementAxis, DEFAULT_INBOX_CAPACITY};
