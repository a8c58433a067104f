//=========================================================================
// Scene
//=========================================================================
//
// Ordered container of game objects with unique ids.
//
// Objects are stored in a Vec so that iteration order (and therefore
// hook order) is stable and matches insertion order. Lookups are linear;
// scenes authored in the editor are small.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::debug;

//=== Internal Dependencies ===============================================

use super::{GameObject, IdAllocator, ObjectData, ObjectId, ObjectRecord};
use crate::core::error::{EngineError, EngineResult};
use crate::core::extension::{ExtensionInstance, ExtensionRegistry};

//=== Scene ===============================================================

/// A set of game objects, iterated in insertion order.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    objects: Vec<GameObject>,
    ids: IdAllocator,
}

impl Scene {
    /// Creates an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a scene from saved records.
    ///
    /// Extensions are instantiated through the registry so that their
    /// default properties fill any keys the record lacks.
    pub fn from_records(
        records: impl IntoIterator<Item = ObjectRecord>,
        registry: &ExtensionRegistry,
    ) -> EngineResult<Self> {
        let mut scene = Self::new();
        for record in records {
            let mut object = GameObject::new(record.data);
            for extension in &record.extensions {
                registry.instantiate(&mut object, extension.as_str())?;
            }
            scene.insert(object)?;
        }
        Ok(scene)
    }

    /// Save/load representation of every object, in scene order.
    pub fn records(&self) -> Vec<ObjectRecord> {
        self.objects.iter().map(GameObject::to_record).collect()
    }

    /// Copy of this scene whose extension instances have not started yet.
    ///
    /// Used to enter play mode without touching the edited scene.
    pub fn snapshot(&self) -> Self {
        let objects = self
            .objects
            .iter()
            .map(|object| GameObject {
                data: object.data.clone(),
                extensions: object
                    .extension_ids()
                    .cloned()
                    .map(ExtensionInstance::new)
                    .collect(),
            })
            .collect();

        Self {
            objects,
            ids: self.ids.clone(),
        }
    }

    //--- Identity ---------------------------------------------------------

    /// Reserves a fresh id for a new object.
    pub fn allocate_id(&mut self) -> ObjectId {
        self.ids.allocate()
    }

    /// Convenience: allocates an id and returns fresh object data.
    pub fn new_object_data(&mut self, name: impl Into<String>) -> ObjectData {
        ObjectData::new(self.allocate_id(), name)
    }

    //--- Mutation ---------------------------------------------------------

    /// Appends an object.
    ///
    /// # Errors
    ///
    /// [`EngineError::DuplicateObject`] if the id is already used.
    pub fn insert(&mut self, object: GameObject) -> EngineResult<ObjectId> {
        let index = self.objects.len();
        self.insert_at(index, object)
    }

    /// Inserts an object at a position (clamped to the scene length).
    pub fn insert_at(&mut self, index: usize, object: GameObject) -> EngineResult<ObjectId> {
        let id = object.id();
        if self.contains(id) {
            return Err(EngineError::DuplicateObject(id));
        }

        self.ids.observe(id);
        let index = index.min(self.objects.len());
        self.objects.insert(index, object);
        debug!(target: "scene", "Inserted object {} at position {}", id, index);
        Ok(id)
    }

    /// Removes an object, returning it with its former position.
    pub fn remove(&mut self, id: ObjectId) -> Option<(usize, GameObject)> {
        let pos = self.position(id)?;
        debug!(target: "scene", "Removing object {} from position {}", id, pos);
        Some((pos, self.objects.remove(pos)))
    }

    /// Empties the scene. Id allocation keeps counting.
    pub fn clear(&mut self) {
        self.objects.clear();
    }

    //--- Lookup -----------------------------------------------------------

    pub fn get(&self, id: ObjectId) -> Option<&GameObject> {
        self.objects.iter().find(|obj| obj.id() == id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut GameObject> {
        self.objects.iter_mut().find(|obj| obj.id() == id)
    }

    /// Like [`get_mut`](Self::get_mut) but reports a missing object.
    pub fn require_mut(&mut self, id: ObjectId) -> EngineResult<&mut GameObject> {
        self.get_mut(id).ok_or(EngineError::UnknownObject(id))
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.position(id).is_some()
    }

    pub fn position(&self, id: ObjectId) -> Option<usize> {
        self.objects.iter().position(|obj| obj.id() == id)
    }

    /// First object with the given name.
    pub fn find_by_name(&self, name: &str) -> Option<&GameObject> {
        self.objects.iter().find(|obj| obj.data.name == name)
    }

    /// Objects belonging to a group, in scene order.
    pub fn in_group<'a>(&'a self, group: &'a str) -> impl Iterator<Item = &'a GameObject> + 'a {
        self.objects.iter().filter(move |obj| obj.data.in_group(group))
    }

    pub fn objects(&self) -> &[GameObject] {
        &self.objects
    }

    pub fn ids(&self) -> Vec<ObjectId> {
        self.objects.iter().map(GameObject::id).collect()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    //--- Internal ---------------------------------------------------------

    /// Disjoint access to objects and the id allocator for the tick loop.
    pub(crate) fn split_mut(&mut self) -> (&mut [GameObject], &mut IdAllocator) {
        (&mut self.objects, &mut self.ids)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
