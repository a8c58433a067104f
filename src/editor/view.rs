//=========================================================================
// Editor View
//=========================================================================
//
// Keeps one editor proxy per (object, extension) in step with a scene.
//
// `sync` diffs the scene against the mounted proxies:
//   - new instance with an editor module → identity registered, create()
//   - changed object data                → identity re-registered, update()
//   - instance or object gone            → destroy(), proxy dropped
//
// Extensions without an editor module never get a proxy. An editor
// module missing `create` is reported once per (object, extension) until
// that attachment goes away.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::{BTreeMap, BTreeSet};

use log::{debug, trace};

//=== Internal Dependencies ===============================================

use crate::core::error::EngineError;
use crate::core::extension::invoke::guarded;
use crate::core::extension::{EditorProxy, ExtensionId, ExtensionRegistry};
use crate::core::notify::{detached_sender, NotificationSender};
use crate::core::object::{ObjectData, ObjectId, Scene};

//=== EditorView ==========================================================

type ProxyKey = (ObjectId, ExtensionId);

struct Mounted {
    proxy: EditorProxy,

    /// Data the proxy was last rendered from.
    rendered: ObjectData,
}

/// Mounted editor proxies for a scene.
pub struct EditorView {
    mounted: BTreeMap<ProxyKey, Mounted>,
    /// Attachments already reported as unmountable.
    reported: BTreeSet<ProxyKey>,
    notifier: NotificationSender,
}

impl EditorView {
    pub fn new() -> Self {
        Self {
            mounted: BTreeMap::new(),
            reported: BTreeSet::new(),
            notifier: detached_sender(),
        }
    }

    pub fn with_notifications(mut self, notifier: NotificationSender) -> Self {
        self.notifier = notifier;
        self
    }

    //--- Synchronization --------------------------------------------------

    /// Brings the proxies in line with `scene`.
    pub fn sync(&mut self, scene: &Scene, registry: &ExtensionRegistry) {
        self.unmount_stale(scene, registry);

        for object in scene.objects() {
            let data = object.data();
            for extension in object.extension_ids() {
                let key = (data.id, extension.clone());
                if self.mounted.contains_key(&key) {
                    self.refresh(&key, data, registry);
                } else {
                    self.mount(key, data, registry);
                }
            }
        }
    }

    /// Destroys every proxy.
    pub fn clear(&mut self, registry: &ExtensionRegistry) {
        let keys: Vec<_> = self.mounted.keys().cloned().collect();
        for key in keys {
            self.unmount(&key, registry);
        }
        self.reported.clear();
    }

    //--- Queries ----------------------------------------------------------

    pub fn proxy(&self, object: ObjectId, extension: &ExtensionId) -> Option<&EditorProxy> {
        self.mounted
            .get(&(object, extension.clone()))
            .map(|mounted| &mounted.proxy)
    }

    /// Proxies of one object, in extension identifier order.
    pub fn proxies_of(&self, object: ObjectId) -> impl Iterator<Item = &EditorProxy> {
        self.mounted
            .iter()
            .filter(move |((owner, _), _)| *owner == object)
            .map(|(_, mounted)| &mounted.proxy)
    }

    pub fn len(&self) -> usize {
        self.mounted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mounted.is_empty()
    }

    //--- Internal ---------------------------------------------------------

    fn mount(&mut self, key: ProxyKey, data: &ObjectData, registry: &ExtensionRegistry) {
        let Some(definition) = registry.get(&key.1) else {
            debug!(target: "editor", "No definition for '{}', nothing to mount", key.1);
            return;
        };
        let Some(editor) = definition.editor() else {
            return;
        };
        let Some(create) = editor.create.as_ref() else {
            let error = EngineError::contract(key.1.as_str(), "create");
            if self.reported.insert(key) {
                self.notifier.report("editor", &error);
            }
            return;
        };

        let mut proxy = EditorProxy::new(data);
        if let Err(reason) = guarded(|| create(&mut proxy, data)) {
            let subject = format!("{} on {}", key.1, key.0);
            self.notifier
                .report("editor", &EngineError::hook(subject, "create", reason));
        }

        trace!(target: "editor", "Mounted '{}' on {}", key.1, key.0);
        self.mounted.insert(
            key,
            Mounted {
                proxy,
                rendered: data.clone(),
            },
        );
    }

    fn refresh(&mut self, key: &ProxyKey, data: &ObjectData, registry: &ExtensionRegistry) {
        let Some(mounted) = self.mounted.get_mut(key) else {
            return;
        };
        if mounted.rendered == *data {
            return;
        }

        mounted.proxy.sync_identity(data);
        mounted.rendered = data.clone();

        let update = registry
            .get(&key.1)
            .and_then(|definition| definition.editor())
            .and_then(|editor| editor.update.as_ref());
        if let Some(update) = update {
            let proxy = &mut mounted.proxy;
            if let Err(reason) = guarded(|| update(proxy, data)) {
                let subject = format!("{} on {}", key.1, key.0);
                self.notifier
                    .report("editor", &EngineError::hook(subject, "update", reason));
            }
        }
    }

    fn unmount_stale(&mut self, scene: &Scene, registry: &ExtensionRegistry) {
        let attached = |(object, extension): &ProxyKey| {
            scene
                .get(*object)
                .is_some_and(|obj| obj.has_extension(extension))
        };

        self.reported.retain(|key| attached(key));
        let stale: Vec<ProxyKey> = self
            .mounted
            .keys()
            .filter(|key| !attached(*key))
            .cloned()
            .collect();

        for key in stale {
            self.unmount(&key, registry);
        }
    }

    fn unmount(&mut self, key: &ProxyKey, registry: &ExtensionRegistry) {
        let Some(mut mounted) = self.mounted.remove(key) else {
            return;
        };

        let destroy = registry
            .get(&key.1)
            .and_then(|definition| definition.editor())
            .and_then(|editor| editor.destroy.as_ref());
        if let Some(destroy) = destroy {
            if let Err(reason) = guarded(|| destroy(&mut mounted.proxy)) {
                let subject = format!("{} on {}", key.1, key.0);
                self.notifier
                    .report("editor", &EngineError::hook(subject, "destroy", reason));
            }
        }
        trace!(target: "editor", "Unmounted '{}' from {}", key.1, key.0);
    }
}

impl Default for EditorView {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::extension::ExtensionDefinition;
    use crate::core::object::GameObject;
    use std::sync::{Arc, Mutex};

    type Journal = Arc<Mutex<Vec<String>>>;

    /// Editor extension whose visual is the rendered label.
    fn label_extension(journal: &Journal) -> ExtensionDefinition {
        let (j1, j2, j3) = (journal.clone(), journal.clone(), journal.clone());
        ExtensionDefinition::builder("label")
            .editor_create(move |proxy, data| {
                j1.lock().unwrap().push(format!("create:{}", proxy.name()));
                proxy.set_visual(data.name.clone());
                Ok(())
            })
            .editor_update(move |proxy, data| {
                j2.lock().unwrap().push(format!("update:{}", data.name));
                proxy.set_visual(data.name.clone());
                Ok(())
            })
            .editor_destroy(move |proxy| {
                j3.lock().unwrap().push(format!("destroy:{}", proxy.name()));
                Ok(())
            })
            .build()
            .unwrap()
    }

    fn setup() -> (Scene, ExtensionRegistry, Journal, ObjectId) {
        let journal = Arc::new(Mutex::new(Vec::new()));
        let mut registry = ExtensionRegistry::new();
        registry.register(label_extension(&journal));
        registry.register(ExtensionDefinition::builder("logic").with_runtime().build().unwrap());

        let mut scene = Scene::new();
        let mut object = GameObject::new(scene.new_object_data("sign"));
        registry.instantiate(&mut object, "label").unwrap();
        registry.instantiate(&mut object, "logic").unwrap();
        let id = scene.insert(object).unwrap();
        (scene, registry, journal, id)
    }

    #[test]
    fn identity_is_registered_before_create() {
        let (scene, registry, journal, id) = setup();
        let mut view = EditorView::new();
        view.sync(&scene, &registry);

        assert_eq!(*journal.lock().unwrap(), vec!["create:sign"]);
        assert_eq!(view.len(), 1, "Runtime-only extensions get no proxy");

        let proxy = view.proxy(id, &ExtensionId::from("label")).unwrap();
        assert_eq!(proxy.object(), id);
        assert_eq!(proxy.visual::<String>().map(String::as_str), Some("sign"));
    }

    #[test]
    fn update_fires_only_on_change() {
        let (mut scene, registry, journal, id) = setup();
        let mut view = EditorView::new();
        view.sync(&scene, &registry);
        view.sync(&scene, &registry);

        scene.get_mut(id).unwrap().data_mut().name = "board".into();
        view.sync(&scene, &registry);

        assert_eq!(*journal.lock().unwrap(), vec!["create:sign", "update:board"]);
        let proxy = view.proxy(id, &ExtensionId::from("label")).unwrap();
        assert_eq!(proxy.name(), "board");
    }

    #[test]
    fn removed_objects_are_unmounted() {
        let (mut scene, registry, journal, id) = setup();
        let mut view = EditorView::new();
        view.sync(&scene, &registry);

        scene.remove(id);
        view.sync(&scene, &registry);

        assert_eq!(*journal.lock().unwrap(), vec!["create:sign", "destroy:sign"]);
        assert!(view.is_empty());
    }

    #[test]
    fn editor_module_without_create_is_a_contract_violation() {
        let mut registry = ExtensionRegistry::new();
        registry.register(
            ExtensionDefinition::builder("broken")
                .editor_update(|_, _| Ok(()))
                .build()
                .unwrap(),
        );

        let mut scene = Scene::new();
        let mut object = GameObject::new(scene.new_object_data("a"));
        registry.instantiate(&mut object, "broken").unwrap();
        scene.insert(object).unwrap();

        let (tx, rx) = crate::core::notify::notification_channel();
        let mut view = EditorView::new().with_notifications(tx);
        view.sync(&scene, &registry);

        assert!(view.is_empty());
        assert_eq!(rx.drain()[0].kind, crate::core::error::ErrorKind::ContractViolation);
    }

    #[test]
    fn missing_create_is_reported_once_per_attachment() {
        let mut registry = ExtensionRegistry::new();
        registry.register(
            ExtensionDefinition::builder("broken")
                .editor_update(|_, _| Ok(()))
                .build()
                .unwrap(),
        );

        let mut scene = Scene::new();
        let mut object = GameObject::new(scene.new_object_data("a"));
        registry.instantiate(&mut object, "broken").unwrap();
        let id = scene.insert(object).unwrap();

        let (tx, rx) = crate::core::notify::notification_channel();
        let mut view = EditorView::new().with_notifications(tx);
        for name in ["b", "c", "d"] {
            scene.get_mut(id).unwrap().data_mut().name = name.into();
            view.sync(&scene, &registry);
        }
        assert_eq!(rx.drain().len(), 1);

        // Re-attaching after removal is a new attachment
        let (_, object) = scene.remove(id).unwrap();
        view.sync(&scene, &registry);
        scene.insert(object).unwrap();
        view.sync(&scene, &registry);
        assert_eq!(rx.drain().len(), 1);
    }

    #[test]
    fn failed_create_keeps_the_proxy() {
        let mut registry = ExtensionRegistry::new();
        registry.register(
            ExtensionDefinition::builder("faulty")
                .editor_create(|_, _| anyhow::bail!("texture missing"))
                .build()
                .unwrap(),
        );

        let mut scene = Scene::new();
        let mut object = GameObject::new(scene.new_object_data("a"));
        registry.instantiate(&mut object, "faulty").unwrap();
        let id = scene.insert(object).unwrap();

        let mut view = EditorView::new();
        view.sync(&scene, &registry);

        let proxy = view.proxy(id, &ExtensionId::from("faulty")).unwrap();
        assert!(!proxy.has_visual());
        assert_eq!(proxy.name(), "a");
    }
}
