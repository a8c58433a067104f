//=========================================================================
// Extension Registry
//=========================================================================
//
// Identifier → definition lookup and instance factory.
//
// Definitions are loaded once and shared read-only (`Arc`). Cloning the
// registry clones the map of handles, not the definitions, so the
// editor and the runtime can each hold their own copy.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, warn};

//=== Internal Dependencies ===============================================

use super::{ExtensionDefinition, ExtensionId};
use crate::core::error::{EngineError, EngineResult};
use crate::core::object::GameObject;

//=== ExtensionRegistry ===================================================

/// Registered extension definitions, keyed by identifier.
#[derive(Debug, Clone, Default)]
pub struct ExtensionRegistry {
    definitions: HashMap<ExtensionId, Arc<ExtensionDefinition>>,
}

impl ExtensionRegistry {
    //--- Construction -----------------------------------------------------

    pub fn new() -> Self {
        Self::default()
    }

    //--- Registration -----------------------------------------------------

    /// Registers a definition under its identifier.
    ///
    /// A definition already registered under the same identifier is
    /// replaced and returned.
    pub fn register(&mut self, definition: ExtensionDefinition) -> Option<Arc<ExtensionDefinition>> {
        let id = definition.identifier().clone();
        let replaced = self.definitions.insert(id.clone(), Arc::new(definition));

        if replaced.is_some() {
            warn!(target: "registry", "Extension '{}' was already registered and has been replaced", id);
        } else {
            debug!(target: "registry", "Registered extension '{}'", id);
        }
        replaced
    }

    /// Removes a definition. Instances already attached keep their id but
    /// no longer resolve.
    pub fn unregister(&mut self, identifier: &str) -> Option<Arc<ExtensionDefinition>> {
        let removed = self.definitions.remove(&ExtensionId::from(identifier));
        if removed.is_some() {
            debug!(target: "registry", "Unregistered extension '{}'", identifier);
        }
        removed
    }

    //--- Lookup -----------------------------------------------------------

    pub fn get(&self, identifier: &ExtensionId) -> Option<&Arc<ExtensionDefinition>> {
        self.definitions.get(identifier)
    }

    /// Like [`get`](Self::get) but reports a missing identifier.
    pub fn require(&self, identifier: &str) -> EngineResult<&Arc<ExtensionDefinition>> {
        self.definitions
            .get(&ExtensionId::from(identifier))
            .ok_or_else(|| EngineError::UnknownExtension(identifier.to_string()))
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.definitions.contains_key(&ExtensionId::from(identifier))
    }

    /// Registered identifiers, sorted.
    pub fn identifiers(&self) -> Vec<&ExtensionId> {
        let mut ids: Vec<_> = self.definitions.keys().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    //--- Factory ----------------------------------------------------------

    /// Attaches a new instance of `identifier` to `object`.
    ///
    /// Returns the default property keys that were added.
    ///
    /// # Errors
    ///
    /// [`EngineError::UnknownExtension`] or [`EngineError::AlreadyAttached`].
    pub fn instantiate(&self, object: &mut GameObject, identifier: &str) -> EngineResult<Vec<String>> {
        self.require(identifier)?.attach_to(object)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::object::{ObjectData, ObjectId};

    fn def(id: &str) -> ExtensionDefinition {
        ExtensionDefinition::builder(id).with_runtime().build().unwrap()
    }

    #[test]
    fn register_replaces_existing() {
        let mut registry = ExtensionRegistry::new();
        assert!(registry.register(def("spin")).is_none());
        assert!(registry.register(def("spin")).is_some());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn identifiers_are_sorted() {
        let mut registry = ExtensionRegistry::new();
        for id in ["sprite", "health", "spin"] {
            registry.register(def(id));
        }

        let ids: Vec<_> = registry.identifiers().into_iter().map(ExtensionId::as_str).collect();
        assert_eq!(ids, vec!["health", "spin", "sprite"]);
    }

    #[test]
    fn instantiate_unknown_fails() {
        let registry = ExtensionRegistry::new();
        let mut object = GameObject::new(ObjectData::new(ObjectId(1), "a"));

        let err = registry.instantiate(&mut object, "ghost").unwrap_err();
        assert!(matches!(err, EngineError::UnknownExtension(ref id) if id == "ghost"));
        assert!(object.extensions().is_empty());
    }

    #[test]
    fn clones_share_definitions() {
        let mut registry = ExtensionRegistry::new();
        registry.register(def("spin"));
        let copy = registry.clone();

        let id = ExtensionId::from("spin");
        assert!(Arc::ptr_eq(registry.get(&id).unwrap(), copy.get(&id).unwrap()));
    }

    #[test]
    fn unregister_removes_lookup() {
        let mut registry = ExtensionRegistry::new();
        registry.register(def("spin"));

        assert!(registry.unregister("spin").is_some());
        assert!(!registry.contains("spin"));
        assert!(registry.unregister("spin").is_none());
    }
}
