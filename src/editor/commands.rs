//=========================================================================
// Scene Commands
//=========================================================================
//
// Built-in reversible edits on a `Scene`.
//
// Each command captures just enough on `execute` to restore the prior
// state on `undo`:
//   SetProperty      previous value (or absence)
//   Rename           previous name
//   SetLayer         previous layer
//   AddToGroup       whether the group was actually added
//   RemoveFromGroup  whether the group was actually removed
//   AttachExtension  default property keys it introduced
//   SpawnObject      the object itself while undone
//   RemoveObject     the object and its former position
//
//=========================================================================

//=== External Dependencies ===============================================

use std::sync::Arc;

use anyhow::{anyhow, Context};
use serde_json::Value;

//=== Internal Dependencies ===============================================

use super::Command;
use crate::core::error::EngineResult;
use crate::core::extension::{ExtensionDefinition, ExtensionRegistry, HookResult};
use crate::core::object::{GameObject, ObjectId, Scene};

//=== SetProperty =========================================================

/// Sets one property on one object.
#[derive(Debug, Clone)]
pub struct SetProperty {
    label: String,
    object: ObjectId,
    key: String,
    value: Value,
    previous: Option<Option<Value>>,
}

impl SetProperty {
    pub fn new(object: ObjectId, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        Self {
            label: format!("Set '{}' on {}", key, object),
            object,
            key,
            value: value.into(),
            previous: None,
        }
    }
}

impl Command<Scene> for SetProperty {
    fn name(&self) -> &str {
        &self.label
    }

    fn has_undo(&self) -> bool {
        true
    }

    fn execute(&mut self, scene: &mut Scene) -> HookResult {
        let data = scene.require_mut(self.object)?.data_mut();
        self.previous = Some(data.set_property(self.key.clone(), self.value.clone()));
        Ok(())
    }

    fn undo(&mut self, scene: &mut Scene) -> HookResult {
        let previous = self
            .previous
            .take()
            .ok_or_else(|| anyhow!("'{}' was never executed", self.label))?;
        let data = scene.require_mut(self.object)?.data_mut();

        match previous {
            Some(value) => {
                data.set_property(self.key.clone(), value);
            }
            None => {
                data.remove_property(&self.key);
            }
        }
        Ok(())
    }
}

//=== Rename ==============================================================

/// Changes an object's name.
#[derive(Debug, Clone)]
pub struct Rename {
    object: ObjectId,
    name: String,
    previous: Option<String>,
}

impl Rename {
    pub fn new(object: ObjectId, name: impl Into<String>) -> Self {
        Self {
            object,
            name: name.into(),
            previous: None,
        }
    }
}

impl Command<Scene> for Rename {
    fn name(&self) -> &str {
        "Rename"
    }

    fn has_undo(&self) -> bool {
        true
    }

    fn execute(&mut self, scene: &mut Scene) -> HookResult {
        let data = scene.require_mut(self.object)?.data_mut();
        self.previous = Some(std::mem::replace(&mut data.name, self.name.clone()));
        Ok(())
    }

    fn undo(&mut self, scene: &mut Scene) -> HookResult {
        let previous = self
            .previous
            .take()
            .ok_or_else(|| anyhow!("rename of {} was never executed", self.object))?;
        scene.require_mut(self.object)?.data_mut().name = previous;
        Ok(())
    }
}

//=== SetLayer ============================================================

/// Moves an object to another draw layer.
#[derive(Debug, Clone)]
pub struct SetLayer {
    object: ObjectId,
    layer: i32,
    previous: Option<i32>,
}

impl SetLayer {
    pub fn new(object: ObjectId, layer: i32) -> Self {
        Self {
            object,
            layer,
            previous: None,
        }
    }
}

impl Command<Scene> for SetLayer {
    fn name(&self) -> &str {
        "Set layer"
    }

    fn has_undo(&self) -> bool {
        true
    }

    fn execute(&mut self, scene: &mut Scene) -> HookResult {
        let data = scene.require_mut(self.object)?.data_mut();
        self.previous = Some(std::mem::replace(&mut data.layer, self.layer));
        Ok(())
    }

    fn undo(&mut self, scene: &mut Scene) -> HookResult {
        let previous = self
            .previous
            .take()
            .ok_or_else(|| anyhow!("layer change of {} was never executed", self.object))?;
        scene.require_mut(self.object)?.data_mut().layer = previous;
        Ok(())
    }
}

//=== Group Membership ====================================================

/// Adds an object to a group.
#[derive(Debug, Clone)]
pub struct AddToGroup {
    object: ObjectId,
    group: String,
    added: bool,
}

impl AddToGroup {
    pub fn new(object: ObjectId, group: impl Into<String>) -> Self {
        Self {
            object,
            group: group.into(),
            added: false,
        }
    }
}

impl Command<Scene> for AddToGroup {
    fn name(&self) -> &str {
        "Add to group"
    }

    fn has_undo(&self) -> bool {
        true
    }

    fn execute(&mut self, scene: &mut Scene) -> HookResult {
        let data = scene.require_mut(self.object)?.data_mut();
        self.added = data.groups.insert(self.group.clone());
        Ok(())
    }

    fn undo(&mut self, scene: &mut Scene) -> HookResult {
        if self.added {
            let data = scene.require_mut(self.object)?.data_mut();
            data.groups.remove(&self.group);
            self.added = false;
        }
        Ok(())
    }
}

/// Removes an object from a group.
#[derive(Debug, Clone)]
pub struct RemoveFromGroup {
    object: ObjectId,
    group: String,
    removed: bool,
}

impl RemoveFromGroup {
    pub fn new(object: ObjectId, group: impl Into<String>) -> Self {
        Self {
            object,
            group: group.into(),
            removed: false,
        }
    }
}

impl Command<Scene> for RemoveFromGroup {
    fn name(&self) -> &str {
        "Remove from group"
    }

    fn has_undo(&self) -> bool {
        true
    }

    fn execute(&mut self, scene: &mut Scene) -> HookResult {
        let data = scene.require_mut(self.object)?.data_mut();
        self.removed = data.groups.remove(&self.group);
        Ok(())
    }

    fn undo(&mut self, scene: &mut Scene) -> HookResult {
        if self.removed {
            let data = scene.require_mut(self.object)?.data_mut();
            data.groups.insert(self.group.clone());
            self.removed = false;
        }
        Ok(())
    }
}

//=== AttachExtension =====================================================

/// Attaches an extension, merging in its default properties.
#[derive(Debug, Clone)]
pub struct AttachExtension {
    label: String,
    object: ObjectId,
    definition: Arc<ExtensionDefinition>,
    added_keys: Vec<String>,
}

impl AttachExtension {
    /// Resolves `identifier` now so that an unknown extension fails before
    /// the command reaches the history.
    pub fn new(registry: &ExtensionRegistry, object: ObjectId, identifier: &str) -> EngineResult<Self> {
        let definition = registry.require(identifier)?.clone();
        Ok(Self {
            label: format!("Attach '{}'", identifier),
            object,
            definition,
            added_keys: Vec::new(),
        })
    }
}

impl Command<Scene> for AttachExtension {
    fn name(&self) -> &str {
        &self.label
    }

    fn has_undo(&self) -> bool {
        true
    }

    fn execute(&mut self, scene: &mut Scene) -> HookResult {
        let object = scene.require_mut(self.object)?;
        self.added_keys = self.definition.attach_to(object)?;
        Ok(())
    }

    fn undo(&mut self, scene: &mut Scene) -> HookResult {
        let object = scene.require_mut(self.object)?;
        object
            .detach(self.definition.identifier())
            .with_context(|| format!("'{}' is not attached to {}", self.definition.identifier(), self.object))?;

        let data = object.data_mut();
        for key in self.added_keys.drain(..) {
            data.remove_property(&key);
        }
        Ok(())
    }
}

//=== SpawnObject =========================================================

/// Adds a new object to the scene.
#[derive(Debug, Clone)]
pub struct SpawnObject {
    id: ObjectId,
    object: Option<GameObject>,
}

impl SpawnObject {
    pub fn new(object: GameObject) -> Self {
        Self {
            id: object.id(),
            object: Some(object),
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }
}

impl Command<Scene> for SpawnObject {
    fn name(&self) -> &str {
        "Spawn object"
    }

    fn has_undo(&self) -> bool {
        true
    }

    fn execute(&mut self, scene: &mut Scene) -> HookResult {
        let object = self
            .object
            .take()
            .ok_or_else(|| anyhow!("object {} is already in the scene", self.id))?;

        if let Err(err) = scene.insert(object.clone()) {
            self.object = Some(object);
            return Err(err.into());
        }
        Ok(())
    }

    fn undo(&mut self, scene: &mut Scene) -> HookResult {
        let (_, object) = scene
            .remove(self.id)
            .ok_or_else(|| anyhow!("object {} is not in the scene", self.id))?;
        self.object = Some(object);
        Ok(())
    }
}

//=== RemoveObject ========================================================

/// Removes an object, restoring it at the same position on undo.
#[derive(Debug, Clone)]
pub struct RemoveObject {
    id: ObjectId,
    removed: Option<(usize, GameObject)>,
}

impl RemoveObject {
    pub fn new(id: ObjectId) -> Self {
        Self { id, removed: None }
    }
}

impl Command<Scene> for RemoveObject {
    fn name(&self) -> &str {
        "Remove object"
    }

    fn has_undo(&self) -> bool {
        true
    }

    fn execute(&mut self, scene: &mut Scene) -> HookResult {
        let removed = scene
            .remove(self.id)
            .ok_or_else(|| anyhow!("object {} is not in the scene", self.id))?;
        self.removed = Some(removed);
        Ok(())
    }

    fn undo(&mut self, scene: &mut Scene) -> HookResult {
        let (position, object) = self
            .removed
            .take()
            .ok_or_else(|| anyhow!("removal of {} was never executed", self.id))?;
        scene.insert_at(position, object)?;
        Ok(())
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::object::ObjectData;
    use crate::editor::CommandHistory;
    use serde_json::json;

    fn scene() -> (Scene, ObjectId) {
        let mut scene = Scene::new();
        let data = scene.new_object_data("player").with_property("x", 5);
        let id = scene.insert(GameObject::new(data)).unwrap();
        (scene, id)
    }

    fn data(scene: &Scene, id: ObjectId) -> &ObjectData {
        scene.get(id).unwrap().data()
    }

    #[test]
    fn set_property_restores_previous_or_absence() {
        let (mut scene, id) = scene();
        let mut history = CommandHistory::new();

        history.execute(SetProperty::new(id, "x", 10), &mut scene);
        history.execute(SetProperty::new(id, "hp", 3), &mut scene);
        assert_eq!(data(&scene, id).property("hp"), Some(&json!(3)));

        history.undo(&mut scene);
        assert_eq!(data(&scene, id).property("hp"), None);

        history.undo(&mut scene);
        assert_eq!(data(&scene, id).property("x"), Some(&json!(5)));
    }

    #[test]
    fn set_property_on_missing_object_fails() {
        let (mut scene, _) = scene();
        let mut history = CommandHistory::new();

        assert!(!history.execute(SetProperty::new(ObjectId(99), "x", 1), &mut scene));
        assert!(!history.can_undo());
    }

    #[test]
    fn rename_and_layer_round_trip() {
        let (mut scene, id) = scene();
        let mut history = CommandHistory::new();

        history.execute(Rename::new(id, "hero"), &mut scene);
        history.execute(SetLayer::new(id, 4), &mut scene);
        assert_eq!(data(&scene, id).name, "hero");
        assert_eq!(data(&scene, id).layer, 4);

        history.undo(&mut scene);
        history.undo(&mut scene);
        assert_eq!(data(&scene, id).name, "player");
        assert_eq!(data(&scene, id).layer, 0);

        history.redo(&mut scene);
        assert_eq!(data(&scene, id).name, "hero");
    }

    #[test]
    fn group_commands_only_undo_what_they_changed() {
        let (mut scene, id) = scene();
        scene.get_mut(id).unwrap().data_mut().groups.insert("solid".into());
        let mut history = CommandHistory::new();

        // Already a member: undo must not remove the pre-existing group.
        history.execute(AddToGroup::new(id, "solid"), &mut scene);
        history.undo(&mut scene);
        assert!(data(&scene, id).in_group("solid"));

        // Not a member: undo must not add it.
        history.execute(RemoveFromGroup::new(id, "enemies"), &mut scene);
        history.undo(&mut scene);
        assert!(!data(&scene, id).in_group("enemies"));

        history.execute(RemoveFromGroup::new(id, "solid"), &mut scene);
        assert!(!data(&scene, id).in_group("solid"));
        history.undo(&mut scene);
        assert!(data(&scene, id).in_group("solid"));
    }

    #[test]
    fn attach_undo_removes_only_introduced_defaults() {
        let mut registry = ExtensionRegistry::new();
        registry.register(
            ExtensionDefinition::builder("health")
                .default_property("x", 0)
                .default_property("hp", 100)
                .with_runtime()
                .build()
                .unwrap(),
        );

        let (mut scene, id) = scene();
        let mut history = CommandHistory::new();
        let attach = AttachExtension::new(&registry, id, "health").unwrap();

        history.execute(attach, &mut scene);
        assert_eq!(data(&scene, id).property("x"), Some(&json!(5)));
        assert_eq!(data(&scene, id).property("hp"), Some(&json!(100)));

        history.undo(&mut scene);
        let object = scene.get(id).unwrap();
        assert!(object.extensions().is_empty());
        assert_eq!(object.data().property("x"), Some(&json!(5)));
        assert_eq!(object.data().property("hp"), None);

        assert!(history.redo(&mut scene));
        assert_eq!(scene.get(id).unwrap().extensions().len(), 1);
    }

    #[test]
    fn attach_unknown_extension_fails_early() {
        let registry = ExtensionRegistry::new();
        assert!(AttachExtension::new(&registry, ObjectId(1), "ghost").is_err());
    }

    #[test]
    fn spawn_and_remove_preserve_position() {
        let (mut scene, first) = scene();
        let mut history = CommandHistory::new();

        let second = scene.new_object_data("second");
        let spawn = SpawnObject::new(GameObject::new(second));
        let second_id = spawn.id();
        history.execute(spawn, &mut scene);
        let third = scene.new_object_data("third");
        history.execute(SpawnObject::new(GameObject::new(third)), &mut scene);
        assert_eq!(scene.len(), 3);

        history.execute(RemoveObject::new(second_id), &mut scene);
        assert_eq!(scene.len(), 2);

        history.undo(&mut scene);
        assert_eq!(scene.position(second_id), Some(1));
        assert_eq!(scene.position(first), Some(0));

        history.undo(&mut scene);
        history.undo(&mut scene);
        assert_eq!(scene.ids(), vec![first]);

        history.redo(&mut scene);
        assert!(scene.contains(second_id));
    }

    #[test]
    fn spawn_duplicate_id_is_not_recorded() {
        let (mut scene, id) = scene();
        let mut history = CommandHistory::new();

        let clash = SpawnObject::new(GameObject::new(ObjectData::new(id, "clone")));
        assert!(!history.execute(clash, &mut scene));
        assert_eq!(scene.len(), 1);
    }
}
