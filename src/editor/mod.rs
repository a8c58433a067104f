//=========================================================================
// Editor
//=========================================================================
//
// Edit-time side of the engine: undoable commands over a scene and the
// editor proxies that visualize it.
//
// Architecture:
// ```text
//     EditorBuilder ──build()──> Editor
//                                  ├─ Scene            (edited state)
//                                  ├─ CommandHistory   (undo / redo, depth 50)
//                                  └─ EditorView       (one proxy per instance)
//
//     execute / undo / redo  ──mutate──>  Scene  ──sync──>  EditorView
// ```
//
// Play mode takes `Editor::snapshot()` and hands it to the runtime; the
// edited scene is never touched by running hooks.
//
//=========================================================================

mod command;
mod commands;
mod history;
mod view;

//=== Public API ==========================================================

pub use command::{Command, FnCommand};
pub use commands::{
    AddToGroup, AttachExtension, RemoveFromGroup, RemoveObject, Rename, SetLayer,
    SetProperty, SpawnObject,
};
pub use history::{CommandHistory, DEFAULT_HISTORY_DEPTH};
pub use view::EditorView;

//=== External Dependencies ===============================================

use std::fmt;

use log::info;

//=== Internal Dependencies ===============================================

use crate::core::error::EngineResult;
use crate::core::extension::ExtensionRegistry;
use crate::core::notify::{detached_sender, NotificationSender};
use crate::core::object::{ObjectRecord, Scene};

//=== EditorBuilder =======================================================

/// Builder for an [`Editor`].
///
/// # Default Values
///
/// - **History depth**: 50 commands
/// - **Scene**: empty
pub struct EditorBuilder {
    registry: ExtensionRegistry,
    history_depth: usize,
    scene: Scene,
    notifier: NotificationSender,
}

impl EditorBuilder {
    pub fn new(registry: ExtensionRegistry) -> Self {
        Self {
            registry,
            history_depth: DEFAULT_HISTORY_DEPTH,
            scene: Scene::new(),
            notifier: detached_sender(),
        }
    }

    /// Sets how many commands the undo stack retains.
    ///
    /// # Panics
    ///
    /// Panics if `depth == 0`.
    pub fn with_history_depth(mut self, depth: usize) -> Self {
        assert!(depth > 0, "History depth must be positive");
        self.history_depth = depth;
        self
    }

    pub fn with_scene(mut self, scene: Scene) -> Self {
        self.scene = scene;
        self
    }

    pub fn with_notifications(mut self, notifier: NotificationSender) -> Self {
        self.notifier = notifier;
        self
    }

    /// Builds the editor and mounts proxies for the initial scene.
    pub fn build(self) -> Editor {
        info!(
            target: "editor",
            "Building editor (history depth: {}, objects: {})",
            self.history_depth,
            self.scene.len()
        );

        let mut editor = Editor {
            scene: self.scene,
            registry: self.registry,
            history: CommandHistory::with_max_depth(self.history_depth)
                .with_notifications(self.notifier.clone()),
            view: EditorView::new().with_notifications(self.notifier.clone()),
            notifier: self.notifier,
        };
        editor.refresh();
        editor
    }
}

//=== Editor ==============================================================

/// A scene under edit.
///
/// Every mutation goes through a [`Command`] so it lands on the history;
/// the view is re-synced after each one.
pub struct Editor {
    scene: Scene,
    registry: ExtensionRegistry,
    history: CommandHistory<Scene>,
    view: EditorView,
    notifier: NotificationSender,
}

impl Editor {
    //--- Editing ----------------------------------------------------------

    /// Runs `command` against the scene and records it.
    ///
    /// Returns `false` if the command failed or could not run.
    pub fn execute<C>(&mut self, command: C) -> bool
    where
        C: Command<Scene> + 'static,
    {
        self.execute_boxed(Box::new(command))
    }

    pub fn execute_boxed(&mut self, command: Box<dyn Command<Scene>>) -> bool {
        let applied = self.history.execute_boxed(command, &mut self.scene);
        self.refresh();
        applied
    }

    pub fn undo(&mut self) -> bool {
        let applied = self.history.undo(&mut self.scene);
        self.refresh();
        applied
    }

    pub fn redo(&mut self) -> bool {
        let applied = self.history.redo(&mut self.scene);
        self.refresh();
        applied
    }

    //--- Scene Lifecycle --------------------------------------------------

    /// Replaces the edited scene and forgets the history.
    pub fn open(&mut self, scene: Scene) {
        self.view.clear(&self.registry);
        self.history.clear();
        self.scene = scene;
        self.refresh();
        info!(target: "editor", "Opened scene with {} objects", self.scene.len());
    }

    /// Rebuilds a scene from saved records and opens it.
    pub fn open_records(&mut self, records: Vec<ObjectRecord>) -> EngineResult<()> {
        let scene = Scene::from_records(records, &self.registry)?;
        self.open(scene);
        Ok(())
    }

    /// Copy of the edited scene ready to be loaded by the runtime.
    pub fn snapshot(&self) -> Scene {
        self.scene.snapshot()
    }

    /// Re-syncs the view against the scene.
    pub fn refresh(&mut self) {
        self.view.sync(&self.scene, &self.registry);
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Destroys every proxy and hands back the edited scene.
    pub fn close(mut self) -> Scene {
        self.view.clear(&self.registry);
        self.scene
    }

    //--- Accessors --------------------------------------------------------

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn registry(&self) -> &ExtensionRegistry {
        &self.registry
    }

    pub fn view(&self) -> &EditorView {
        &self.view
    }

    pub fn history(&self) -> &CommandHistory<Scene> {
        &self.history
    }

    pub fn notifier(&self) -> &NotificationSender {
        &self.notifier
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo_label(&self) -> Option<&str> {
        self.history.undo_label()
    }

    pub fn redo_label(&self) -> Option<&str> {
        self.history.redo_label()
    }
}

impl fmt::Debug for Editor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Editor")
            .field("objects", &self.scene.len())
            .field("proxies", &self.view.len())
            .field("history", &self.history)
            .finish()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::extension::{ExtensionDefinition, ExtensionId};
    use crate::core::object::GameObject;

    fn registry() -> ExtensionRegistry {
        let mut registry = ExtensionRegistry::new();
        registry.register(
            ExtensionDefinition::builder("label")
                .default_property("text", "?")
                .editor_create(|proxy, data| {
                    proxy.set_visual(data.name.clone());
                    Ok(())
                })
                .editor_update(|proxy, data| {
                    proxy.set_visual(data.name.clone());
                    Ok(())
                })
                .build()
                .unwrap(),
        );
        registry
    }

    fn visual(editor: &Editor, id: crate::core::object::ObjectId) -> Option<String> {
        editor
            .view()
            .proxy(id, &ExtensionId::from("label"))
            .and_then(|proxy| proxy.visual::<String>().cloned())
    }

    #[test]
    fn edits_flow_through_history_and_view() {
        let mut editor = EditorBuilder::new(registry()).build();

        let mut scene = Scene::new();
        let object = GameObject::new(scene.new_object_data("door"));
        let id = object.id();
        editor.open(scene);

        assert!(editor.execute(SpawnObject::new(object)));
        let attach = AttachExtension::new(editor.registry(), id, "label").unwrap();
        assert!(editor.execute(attach));
        assert_eq!(visual(&editor, id).as_deref(), Some("door"));

        assert!(editor.execute(Rename::new(id, "gate")));
        assert_eq!(visual(&editor, id).as_deref(), Some("gate"));
        assert_eq!(editor.undo_label(), Some("Rename"));

        assert!(editor.undo());
        assert_eq!(visual(&editor, id).as_deref(), Some("door"));

        assert!(editor.undo());
        assert!(editor.view().is_empty(), "Detaching unmounts the proxy");

        assert!(editor.redo());
        assert_eq!(visual(&editor, id).as_deref(), Some("door"));
    }

    #[test]
    fn open_resets_history() {
        let mut editor = EditorBuilder::new(registry()).build();
        let mut scene = Scene::new();
        let object = GameObject::new(scene.new_object_data("a"));
        editor.execute(SpawnObject::new(object));
        assert!(editor.can_undo());

        editor.open(Scene::new());
        assert!(!editor.can_undo());
        assert!(!editor.can_redo());
    }

    #[test]
    fn snapshot_is_detached_from_edits() {
        let mut scene = Scene::new();
        let data = scene.new_object_data("hero");
        let id = scene.insert(GameObject::new(data)).unwrap();
        let mut editor = EditorBuilder::new(registry()).with_scene(scene).build();

        let snapshot = editor.snapshot();
        editor.execute(Rename::new(id, "villain"));

        assert_eq!(snapshot.get(id).unwrap().data().name, "hero");
        assert_eq!(editor.scene().get(id).unwrap().data().name, "villain");
    }

    #[test]
    fn records_reopen_with_proxies() {
        let mut scene = Scene::new();
        let reg = registry();
        let mut object = GameObject::new(scene.new_object_data("sign"));
        reg.instantiate(&mut object, "label").unwrap();
        let id = scene.insert(object).unwrap();
        let records = scene.records();

        let mut editor = EditorBuilder::new(reg).build();
        editor.open_records(records).unwrap();

        assert_eq!(visual(&editor, id).as_deref(), Some("sign"));
    }

    #[test]
    #[should_panic(expected = "History depth must be positive")]
    fn zero_history_depth_panics() {
        let _ = EditorBuilder::new(ExtensionRegistry::new()).with_history_depth(0);
    }
}
