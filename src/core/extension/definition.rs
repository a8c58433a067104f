//=========================================================================
// Extension Definitions
//=========================================================================
//
// Immutable description of an extension: identifier, default
// properties, and two optional hook modules.
//
// Architecture:
//   ExtensionDefinition
//     ├─ editor:  Option<EditorHooks>   create / update / destroy
//     ├─ runtime: Option<RuntimeHooks>  on_created / on_update / ...
//     └─ default_properties
//
// Every hook is an optional slot. Callers check presence explicitly
// rather than relying on no-op defaults.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt;

use serde_json::Value;

//=== Internal Dependencies ===============================================

use super::{EditorProxy, ExtensionId, ExtensionInstance};
use crate::core::error::{EngineError, EngineResult};
use crate::core::object::{GameObject, ObjectData, PropertyMap};
use crate::core::runtime::{ContactKind, ContactPhase, RuntimeApi};

//=== Hook Signatures =====================================================

/// Return type of every hook and command body.
///
/// Errors are caught by the caller, reported, and never propagate
/// past the failing instance.
pub type HookResult = anyhow::Result<()>;

/// `create(proxy, data)` and `update(proxy, data)`.
pub type EditorHook = Box<dyn Fn(&mut EditorProxy, &ObjectData) -> HookResult + Send + Sync>;

/// `destroy(proxy)`.
pub type EditorDestroyHook = Box<dyn Fn(&mut EditorProxy) -> HookResult + Send + Sync>;

/// `on_created(object, api)` and `on_destroyed(object, api)`.
pub type LifecycleHook =
    Box<dyn Fn(&mut ObjectData, &mut RuntimeApi<'_>) -> HookResult + Send + Sync>;

/// `on_update(object, dt_ms, api)`.
pub type UpdateHook =
    Box<dyn Fn(&mut ObjectData, f64, &mut RuntimeApi<'_>) -> HookResult + Send + Sync>;

/// `on_<kind>_<phase>(object, other, api)`.
pub type ContactHook =
    Box<dyn Fn(&mut ObjectData, &ObjectData, &mut RuntimeApi<'_>) -> HookResult + Send + Sync>;

//=== EditorHooks =========================================================

/// Editor-side contract.
///
/// `create` is required whenever the module is present; `update` must
/// be a full re-render from `data`.
#[derive(Default)]
pub struct EditorHooks {
    pub create: Option<EditorHook>,
    pub update: Option<EditorHook>,
    pub destroy: Option<EditorDestroyHook>,
}

//=== RuntimeHooks ========================================================

/// Runtime-side contract. Every slot is optional.
#[derive(Default)]
pub struct RuntimeHooks {
    pub on_created: Option<LifecycleHook>,
    pub on_update: Option<UpdateHook>,
    pub on_destroyed: Option<LifecycleHook>,

    pub on_collision_enter: Option<ContactHook>,
    pub on_collision_stay: Option<ContactHook>,
    pub on_collision_exit: Option<ContactHook>,

    pub on_trigger_enter: Option<ContactHook>,
    pub on_trigger_stay: Option<ContactHook>,
    pub on_trigger_exit: Option<ContactHook>,
}

impl RuntimeHooks {
    /// Slot for a contact transition.
    pub fn contact(&self, kind: ContactKind, phase: ContactPhase) -> Option<&ContactHook> {
        use ContactKind::*;
        use ContactPhase::*;

        match (kind, phase) {
            (Collision, Enter) => self.on_collision_enter.as_ref(),
            (Collision, Stay) => self.on_collision_stay.as_ref(),
            (Collision, Exit) => self.on_collision_exit.as_ref(),
            (Trigger, Enter) => self.on_trigger_enter.as_ref(),
            (Trigger, Stay) => self.on_trigger_stay.as_ref(),
            (Trigger, Exit) => self.on_trigger_exit.as_ref(),
        }
    }

    fn contact_slot(&mut self, kind: ContactKind, phase: ContactPhase) -> &mut Option<ContactHook> {
        use ContactKind::*;
        use ContactPhase::*;

        match (kind, phase) {
            (Collision, Enter) => &mut self.on_collision_enter,
            (Collision, Stay) => &mut self.on_collision_stay,
            (Collision, Exit) => &mut self.on_collision_exit,
            (Trigger, Enter) => &mut self.on_trigger_enter,
            (Trigger, Stay) => &mut self.on_trigger_stay,
            (Trigger, Exit) => &mut self.on_trigger_exit,
        }
    }
}

//=== ExtensionDefinition =================================================

/// A loaded extension, shared read-only between every instance.
pub struct ExtensionDefinition {
    identifier: ExtensionId,
    editor: Option<EditorHooks>,
    runtime: Option<RuntimeHooks>,
    default_properties: PropertyMap,
}

impl ExtensionDefinition {
    /// Starts building a definition.
    pub fn builder(identifier: impl Into<ExtensionId>) -> ExtensionDefinitionBuilder {
        ExtensionDefinitionBuilder {
            identifier: identifier.into(),
            editor: None,
            runtime: None,
            default_properties: PropertyMap::new(),
        }
    }

    pub fn identifier(&self) -> &ExtensionId {
        &self.identifier
    }

    pub fn editor(&self) -> Option<&EditorHooks> {
        self.editor.as_ref()
    }

    pub fn runtime(&self) -> Option<&RuntimeHooks> {
        self.runtime.as_ref()
    }

    pub fn default_properties(&self) -> &PropertyMap {
        &self.default_properties
    }

    /// Attaches a new instance to `object`.
    ///
    /// Default properties are merged without overwriting existing keys.
    /// Returns the keys that were added, so that the attachment can be
    /// reverted exactly.
    pub fn attach_to(&self, object: &mut GameObject) -> EngineResult<Vec<String>> {
        if object.has_extension(&self.identifier) {
            return Err(EngineError::AlreadyAttached {
                object: object.id(),
                extension: self.identifier.to_string(),
            });
        }

        let mut added = Vec::new();
        for (key, value) in &self.default_properties {
            if !object.data.properties.contains_key(key) {
                object.data.properties.insert(key.clone(), value.clone());
                added.push(key.clone());
            }
        }

        object
            .extensions
            .push(ExtensionInstance::new(self.identifier.clone()));
        Ok(added)
    }
}

impl fmt::Debug for ExtensionDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionDefinition")
            .field("identifier", &self.identifier)
            .field("editor", &self.editor.is_some())
            .field("runtime", &self.runtime.is_some())
            .field("default_properties", &self.default_properties)
            .finish()
    }
}

//=== ExtensionDefinitionBuilder ==========================================

/// Fluent builder for [`ExtensionDefinition`].
///
/// Setting any editor hook creates the editor module; setting any
/// runtime hook creates the runtime module.
///
/// # Examples
///
/// ```
/// use tessera_engine::core::extension::ExtensionDefinition;
///
/// let spin = ExtensionDefinition::builder("spin")
///     .default_property("speed", 90)
///     .on_update(|object, dt, _api| {
///         let speed = object.number("speed").unwrap_or(0.0);
///         let angle = object.number("angle").unwrap_or(0.0);
///         object.set_property("angle", angle + speed * dt / 1000.0);
///         Ok(())
///     })
///     .build()
///     .unwrap();
///
/// assert!(spin.runtime().is_some());
/// assert!(spin.editor().is_none());
/// ```
pub struct ExtensionDefinitionBuilder {
    identifier: ExtensionId,
    editor: Option<EditorHooks>,
    runtime: Option<RuntimeHooks>,
    default_properties: PropertyMap,
}

impl ExtensionDefinitionBuilder {
    pub fn default_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.default_properties.insert(key.into(), value.into());
        self
    }

    //--- Editor Module ----------------------------------------------------

    /// Declares an editor module, even if no hook is set.
    pub fn with_editor(mut self) -> Self {
        self.editor.get_or_insert_with(EditorHooks::default);
        self
    }

    pub fn editor_create<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut EditorProxy, &ObjectData) -> HookResult + Send + Sync + 'static,
    {
        self.editor.get_or_insert_with(EditorHooks::default).create = Some(Box::new(hook));
        self
    }

    pub fn editor_update<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut EditorProxy, &ObjectData) -> HookResult + Send + Sync + 'static,
    {
        self.editor.get_or_insert_with(EditorHooks::default).update = Some(Box::new(hook));
        self
    }

    pub fn editor_destroy<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut EditorProxy) -> HookResult + Send + Sync + 'static,
    {
        self.editor.get_or_insert_with(EditorHooks::default).destroy = Some(Box::new(hook));
        self
    }

    //--- Runtime Module ---------------------------------------------------

    /// Declares a runtime module, even if no hook is set.
    pub fn with_runtime(mut self) -> Self {
        self.runtime.get_or_insert_with(RuntimeHooks::default);
        self
    }

    pub fn on_created<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut ObjectData, &mut RuntimeApi<'_>) -> HookResult + Send + Sync + 'static,
    {
        self.runtime.get_or_insert_with(RuntimeHooks::default).on_created = Some(Box::new(hook));
        self
    }

    pub fn on_update<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut ObjectData, f64, &mut RuntimeApi<'_>) -> HookResult + Send + Sync + 'static,
    {
        self.runtime.get_or_insert_with(RuntimeHooks::default).on_update = Some(Box::new(hook));
        self
    }

    pub fn on_destroyed<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut ObjectData, &mut RuntimeApi<'_>) -> HookResult + Send + Sync + 'static,
    {
        self.runtime.get_or_insert_with(RuntimeHooks::default).on_destroyed = Some(Box::new(hook));
        self
    }

    /// Sets the hook for one contact transition.
    pub fn on_contact<F>(mut self, kind: ContactKind, phase: ContactPhase, hook: F) -> Self
    where
        F: Fn(&mut ObjectData, &ObjectData, &mut RuntimeApi<'_>) -> HookResult
            + Send
            + Sync
            + 'static,
    {
        *self
            .runtime
            .get_or_insert_with(RuntimeHooks::default)
            .contact_slot(kind, phase) = Some(Box::new(hook));
        self
    }

    pub fn on_collision_enter<F>(self, hook: F) -> Self
    where
        F: Fn(&mut ObjectData, &ObjectData, &mut RuntimeApi<'_>) -> HookResult
            + Send
            + Sync
            + 'static,
    {
        self.on_contact(ContactKind::Collision, ContactPhase::Enter, hook)
    }

    pub fn on_collision_stay<F>(self, hook: F) -> Self
    where
        F: Fn(&mut ObjectData, &ObjectData, &mut RuntimeApi<'_>) -> HookResult
            + Send
            + Sync
            + 'static,
    {
        self.on_contact(ContactKind::Collision, ContactPhase::Stay, hook)
    }

    pub fn on_collision_exit<F>(self, hook: F) -> Self
    where
        F: Fn(&mut ObjectData, &ObjectData, &mut RuntimeApi<'_>) -> HookResult
            + Send
            + Sync
            + 'static,
    {
        self.on_contact(ContactKind::Collision, ContactPhase::Exit, hook)
    }

    pub fn on_trigger_enter<F>(self, hook: F) -> Self
    where
        F: Fn(&mut ObjectData, &ObjectData, &mut RuntimeApi<'_>) -> HookResult
            + Send
            + Sync
            + 'static,
    {
        self.on_contact(ContactKind::Trigger, ContactPhase::Enter, hook)
    }

    pub fn on_trigger_stay<F>(self, hook: F) -> Self
    where
        F: Fn(&mut ObjectData, &ObjectData, &mut RuntimeApi<'_>) -> HookResult
            + Send
            + Sync
            + 'static,
    {
        self.on_contact(ContactKind::Trigger, ContactPhase::Stay, hook)
    }

    pub fn on_trigger_exit<F>(self, hook: F) -> Self
    where
        F: Fn(&mut ObjectData, &ObjectData, &mut RuntimeApi<'_>) -> HookResult
            + Send
            + Sync
            + 'static,
    {
        self.on_contact(ContactKind::Trigger, ContactPhase::Exit, hook)
    }

    //--- Build ------------------------------------------------------------

    /// Validates and builds the definition.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidDefinition`] if the identifier is blank or
    /// neither module is declared.
    pub fn build(self) -> EngineResult<ExtensionDefinition> {
        if self.identifier.as_str().trim().is_empty() {
            return Err(EngineError::InvalidDefinition(
                "identifier must not be empty".into(),
            ));
        }

        if self.editor.is_none() && self.runtime.is_none() {
            return Err(EngineError::InvalidDefinition(format!(
                "'{}' declares neither an editor nor a runtime module",
                self.identifier
            )));
        }

        Ok(ExtensionDefinition {
            identifier: self.identifier,
            editor: self.editor,
            runtime: self.runtime,
            default_properties: self.default_properties,
        })
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::object::ObjectId;
    use serde_json::json;

    #[test]
    fn blank_identifier_is_rejected() {
        let err = ExtensionDefinition::builder("  ").with_runtime().build().unwrap_err();
        assert!(matches!(err, EngineError::InvalidDefinition(_)));
    }

    #[test]
    fn definition_without_modules_is_rejected() {
        let err = ExtensionDefinition::builder("empty")
            .default_property("x", 0)
            .build()
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidDefinition(_)));
    }

    #[test]
    fn contact_slots_map_to_their_hooks() {
        let def = ExtensionDefinition::builder("sensor")
            .on_trigger_enter(|_, _, _| Ok(()))
            .build()
            .unwrap();
        let hooks = def.runtime().unwrap();

        assert!(hooks.contact(ContactKind::Trigger, ContactPhase::Enter).is_some());
        assert!(hooks.contact(ContactKind::Trigger, ContactPhase::Exit).is_none());
        assert!(hooks.contact(ContactKind::Collision, ContactPhase::Enter).is_none());
    }

    #[test]
    fn attach_merges_defaults_without_overwriting() {
        let def = ExtensionDefinition::builder("health")
            .default_property("hp", 100)
            .default_property("regen", 1)
            .with_runtime()
            .build()
            .unwrap();

        let mut object = GameObject::new(ObjectData::new(ObjectId(1), "hero").with_property("hp", 30));
        let added = def.attach_to(&mut object).unwrap();

        assert_eq!(added, vec!["regen".to_string()]);
        assert_eq!(object.data().property("hp"), Some(&json!(30)));
        assert_eq!(object.data().property("regen"), Some(&json!(1)));
        assert!(object.has_extension(&ExtensionId::from("health")));
    }

    #[test]
    fn attaching_twice_fails_without_side_effects() {
        let def = ExtensionDefinition::builder("spin").with_runtime().build().unwrap();
        let mut object = GameObject::new(ObjectData::new(ObjectId(1), "a"));

        def.attach_to(&mut object).unwrap();
        let err = def.attach_to(&mut object).unwrap_err();

        assert!(matches!(err, EngineError::AlreadyAttached { .. }));
        assert_eq!(object.extensions().len(), 1);
    }
}
