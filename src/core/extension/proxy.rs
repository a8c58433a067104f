//=========================================================================
// Editor Proxy
//=========================================================================
//
// Editor-side stand-in for one extension instance.
//
// The core registers the proxy's identity (object id, name, groups,
// layer) before the extension's `create` hook runs; the hook only fills
// in the visual. The visual itself is opaque to the core.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::Any;
use std::collections::BTreeSet;
use std::fmt;

//=== Internal Dependencies ===============================================

use crate::core::object::{ObjectData, ObjectId};

//=== EditorProxy =========================================================

/// Visual proxy handed to editor hooks.
pub struct EditorProxy {
    object: ObjectId,
    name: String,
    groups: BTreeSet<String>,
    layer: i32,
    visual: Option<Box<dyn Any + Send>>,
}

impl EditorProxy {
    /// Creates a proxy whose identity mirrors `data`.
    pub fn new(data: &ObjectData) -> Self {
        Self {
            object: data.id,
            name: data.name.clone(),
            groups: data.groups.clone(),
            layer: data.layer,
            visual: None,
        }
    }

    /// Re-registers identity after the object changed.
    pub(crate) fn sync_identity(&mut self, data: &ObjectData) {
        self.name.clone_from(&data.name);
        self.groups.clone_from(&data.groups);
        self.layer = data.layer;
    }

    //--- Identity ---------------------------------------------------------

    pub fn object(&self) -> ObjectId {
        self.object
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn groups(&self) -> &BTreeSet<String> {
        &self.groups
    }

    pub fn layer(&self) -> i32 {
        self.layer
    }

    //--- Visual -----------------------------------------------------------

    /// Installs the visual, replacing any previous one.
    pub fn set_visual<V: Any + Send>(&mut self, visual: V) {
        self.visual = Some(Box::new(visual));
    }

    pub fn visual<V: Any>(&self) -> Option<&V> {
        self.visual.as_ref().and_then(|v| v.downcast_ref())
    }

    pub fn visual_mut<V: Any>(&mut self) -> Option<&mut V> {
        self.visual.as_mut().and_then(|v| v.downcast_mut())
    }

    pub fn has_visual(&self) -> bool {
        self.visual.is_some()
    }

    /// Drops the visual.
    pub fn clear_visual(&mut self) {
        self.visual = None;
    }
}

impl fmt::Debug for EditorProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditorProxy")
            .field("object", &self.object)
            .field("name", &self.name)
            .field("groups", &self.groups)
            .field("layer", &self.layer)
            .field("has_visual", &self.visual.is_some())
            .finish()
    }
}
