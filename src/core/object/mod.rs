//=========================================================================
// Game Object Model
//=========================================================================
//
// In-memory scene entities.
//
// Architecture:
//   Scene
//     ├─ objects: Vec<GameObject>          (stable iteration order)
//     │    ├─ data: ObjectData             (editor-visible, serializable)
//     │    └─ extensions: Vec<ExtensionInstance>  (attachment order)
//     └─ ids: IdAllocator
//
// `ObjectData` is what extension hooks see: editor hooks read it,
// runtime hooks mutate it. The extension list is owned by the object
// and is never exposed mutably to hooks.
//
//=========================================================================

//=== Module Declarations =================================================

mod scene;

//=== External Dependencies ===============================================

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

//=== Internal Dependencies ===============================================

use crate::core::extension::{ExtensionId, ExtensionInstance};

//=== Public API ==========================================================

pub use scene::Scene;

/// Editor-configurable, runtime-mutable property bag.
///
/// Keys are kept sorted so that saved scenes stay diff-friendly.
pub type PropertyMap = BTreeMap<String, Value>;

//=== ObjectId ============================================================

/// Scene-unique object identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub u64);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

//=== IdAllocator =========================================================

/// Hands out increasing object ids.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    /// Returns a fresh id.
    pub fn allocate(&mut self) -> ObjectId {
        self.next += 1;
        ObjectId(self.next)
    }

    /// Ensures future ids never collide with `id`.
    pub(crate) fn observe(&mut self, id: ObjectId) {
        self.next = self.next.max(id.0);
    }
}

//=== ObjectData ==========================================================

/// Identity and properties of a game object.
///
/// This is the `data` handed to editor hooks and the `object` handed to
/// runtime hooks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectData {
    pub id: ObjectId,
    pub name: String,
    #[serde(default)]
    pub groups: BTreeSet<String>,
    #[serde(default)]
    pub properties: PropertyMap,
    #[serde(default)]
    pub layer: i32,
}

impl ObjectData {
    /// Creates an object with no groups, no properties, on layer 0.
    pub fn new(id: ObjectId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            groups: BTreeSet::new(),
            properties: PropertyMap::new(),
            layer: 0,
        }
    }

    //--- Builder Helpers --------------------------------------------------

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.groups.insert(group.into());
        self
    }

    pub fn with_layer(mut self, layer: i32) -> Self {
        self.layer = layer;
        self
    }

    //--- Property Access --------------------------------------------------

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Numeric property, if present and numeric.
    pub fn number(&self, key: &str) -> Option<f64> {
        self.properties.get(key).and_then(Value::as_f64)
    }

    /// Sets a property, returning the previous value.
    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.properties.insert(key.into(), value.into())
    }

    pub fn remove_property(&mut self, key: &str) -> Option<Value> {
        self.properties.remove(key)
    }

    pub fn in_group(&self, group: &str) -> bool {
        self.groups.contains(group)
    }
}

//=== GameObject ==========================================================

/// A scene entity: data plus its ordered extension instances.
#[derive(Debug, Clone)]
pub struct GameObject {
    pub(crate) data: ObjectData,
    pub(crate) extensions: Vec<ExtensionInstance>,
}

impl GameObject {
    /// Creates an object with no extensions attached.
    pub fn new(data: ObjectData) -> Self {
        Self {
            data,
            extensions: Vec::new(),
        }
    }

    pub fn id(&self) -> ObjectId {
        self.data.id
    }

    pub fn data(&self) -> &ObjectData {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut ObjectData {
        &mut self.data
    }

    /// Attached instances in attachment order.
    pub fn extensions(&self) -> &[ExtensionInstance] {
        &self.extensions
    }

    pub fn has_extension(&self, extension: &ExtensionId) -> bool {
        self.extensions.iter().any(|inst| inst.extension() == extension)
    }

    /// Identifiers of attached extensions in attachment order.
    pub fn extension_ids(&self) -> impl Iterator<Item = &ExtensionId> {
        self.extensions.iter().map(ExtensionInstance::extension)
    }

    /// Detaches an extension instance, returning it if it was attached.
    pub fn detach(&mut self, extension: &ExtensionId) -> Option<ExtensionInstance> {
        let pos = self
            .extensions
            .iter()
            .position(|inst| inst.extension() == extension)?;
        Some(self.extensions.remove(pos))
    }

    /// Serializable description of this object.
    pub fn to_record(&self) -> ObjectRecord {
        ObjectRecord {
            data: self.data.clone(),
            extensions: self.extension_ids().cloned().collect(),
        }
    }
}

//=== ObjectRecord ========================================================

/// Save/load representation of a game object.
///
/// Only identity, properties and the ordered extension list are kept;
/// lifecycle phases and internal state are runtime-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectRecord {
    #[serde(flatten)]
    pub data: ObjectData,
    #[serde(default)]
    pub extensions: Vec<ExtensionId>,
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn allocator_skips_observed_ids() {
        let mut ids = IdAllocator::default();
        assert_eq!(ids.allocate(), ObjectId(1));

        ids.observe(ObjectId(10));
        assert_eq!(ids.allocate(), ObjectId(11));

        ids.observe(ObjectId(3));
        assert_eq!(ids.allocate(), ObjectId(12));
    }

    #[test]
    fn set_property_returns_previous_value() {
        let mut data = ObjectData::new(ObjectId(1), "player").with_property("x", 5);

        assert_eq!(data.set_property("x", 10), Some(json!(5)));
        assert_eq!(data.number("x"), Some(10.0));
        assert_eq!(data.set_property("hp", 3), None);
    }

    #[test]
    fn record_serializes_flat() {
        let mut object = GameObject::new(
            ObjectData::new(ObjectId(7), "coin")
                .with_group("pickups")
                .with_property("value", 1),
        );
        object.extensions.push(ExtensionInstance::new(ExtensionId::from("spin")));

        let value = serde_json::to_value(object.to_record()).unwrap();
        assert_eq!(value["id"], json!(7));
        assert_eq!(value["name"], json!("coin"));
        assert_eq!(value["groups"], json!(["pickups"]));
        assert_eq!(value["properties"]["value"], json!(1));
        assert_eq!(value["extensions"], json!(["spin"]));

        let back: ObjectRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, object.to_record());
    }

    #[test]
    fn detach_preserves_remaining_order() {
        let mut object = GameObject::new(ObjectData::new(ObjectId(1), "a"));
        for ext in ["one", "two", "three"] {
            object.extensions.push(ExtensionInstance::new(ExtensionId::from(ext)));
        }

        assert!(object.detach(&ExtensionId::from("two")).is_some());
        assert!(object.detach(&ExtensionId::from("two")).is_none());

        let ids: Vec<_> = object.extension_ids().map(ExtensionId::as_str).collect();
        assert_eq!(ids, vec!["one", "three"]);
    }
}
