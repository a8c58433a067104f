//=========================================================================
// Platform Subsystem
//
// Bridges Winit (OS-level events) with the engine's input inbox.
//
// Architecture:
// ```text
//  Host Event Loop (main thread)         Engine
//  ┌──────────────────────────┐         ┌──────────────────────┐
//  │  Winit WindowEvent       │         │  InputState          │
//  │   ↓                      │         │   ↑ flush() at the   │
//  │  InputProcessor          │         │   │ start of a tick  │
//  │   ├─ physical + logical  │ inbox   │   │                  │
//  │   └─ drops repeats       │ ──────► │  bounded channel     │
//  └──────────────────────────┘         └──────────────────────┘
// ```
//
// The host owns the window and the event loop; the engine only consumes
// the input they produce. Events sent between two ticks become visible
// together at the next tick.
//
//=========================================================================

//=== Submodules ==========================================================

mod input_processor;

//=== Public API ==========================================================

pub use input_processor::{translate_key, translate_window_event, InputProcessor};
