//=========================================================================
// Tessera Engine - Library Root
//
// Editor and runtime core for 2D scenes built from game objects and
// pluggable extensions.
//
// Responsibilities:
// - Expose the runtime facade (`Engine`) that ticks a loaded scene
// - Expose the editor facade (`editor::Editor`) with undo/redo
// - Keep Winit translation in `platform`, away from the core types
//
// Typical usage:
// ```no_run
// use tessera_engine::prelude::*;
//
// let mut registry = ExtensionRegistry::new();
// registry.register(
//     ExtensionDefinition::builder("player")
//         .on_update(|data, _dt, api| {
//             let x = data.number("x").unwrap_or(0.0);
//             data.set_property("x", x + f64::from(api.input().movement_axis().x));
//             Ok(())
//         })
//         .build()
//         .unwrap(),
// );
//
// let editor = EditorBuilder::new(registry.clone()).build();
// let mut engine = EngineBuilder::new(registry).build();
// engine.load(editor.snapshot());
// loop {
//     engine.tick();
// }
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------
//
// `core` holds the runtime model: objects, extensions, input, scheduler.
// `editor` holds commands, history and editor proxies.
// `platform` converts Winit events into engine input.
//
pub mod core;
pub mod editor;
pub mod logging;
pub mod platform;
pub mod prelude;

//--- Internal Modules ----------------------------------------------------

mod engine;

//--- Public Exports ------------------------------------------------------

pub use engine::{Engine, EngineBuilder};
