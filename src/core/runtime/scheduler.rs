//=========================================================================
// Frame Scheduler
//=========================================================================
//
// Drives the simulation one tick at a time.
//
// Tick order (`advance(dt)`):
//   1. flush InputState (drain inbox, publish edges)
//   2. on_created for instances that are still pending
//   3. on_update(dt) for every live instance, scene order then
//      attachment order
//   4. collision detection and contact dispatch
//   5. tick boundary: queued destroys, then queued spawns, then destroys
//      aimed at objects spawned in the same batch
//
// Hook failures are isolated: the failing instance is reported and
// skipped for the rest of the tick. Siblings and later ticks run as
// usual.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::sync::Arc;

use log::{debug, trace, warn};

//=== Internal Dependencies ===============================================

use super::collision::normalize;
use super::{CollisionDetector, ContactEvent, RuntimeApi, WorldQueue, WorldRequest};
use crate::core::error::{EngineError, EngineResult};
use crate::core::extension::invoke::guarded;
use crate::core::extension::{
    ExtensionDefinition, ExtensionId, ExtensionInstance, ExtensionRegistry, HookResult,
    InternalStore, LifecyclePhase,
};
use crate::core::input::{InputSender, InputState};
use crate::core::notify::{detached_sender, NotificationSender};
use crate::core::object::{GameObject, IdAllocator, ObjectData, ObjectId, Scene};

//=== FrameScheduler ======================================================

/// Owns a running scene and advances it tick by tick.
pub struct FrameScheduler {
    scene: Scene,
    registry: ExtensionRegistry,
    input: InputState,
    store: InternalStore,
    requests: WorldQueue,
    detector: Option<Box<dyn CollisionDetector>>,
    notifier: NotificationSender,
    tick: u64,
}

impl FrameScheduler {
    //--- Construction -----------------------------------------------------

    /// Creates a scheduler with an empty scene.
    pub fn new(registry: ExtensionRegistry) -> Self {
        Self {
            scene: Scene::new(),
            registry,
            input: InputState::new(),
            store: InternalStore::new(),
            requests: WorldQueue::new(),
            detector: None,
            notifier: detached_sender(),
            tick: 0,
        }
    }

    /// Replaces the input state, e.g. to change the inbox capacity.
    pub fn with_input(mut self, input: InputState) -> Self {
        self.input = input;
        self
    }

    pub fn with_detector<D>(self, detector: D) -> Self
    where
        D: CollisionDetector + 'static,
    {
        self.with_boxed_detector(Box::new(detector))
    }

    pub fn with_boxed_detector(mut self, detector: Box<dyn CollisionDetector>) -> Self {
        self.detector = Some(detector);
        self
    }

    pub fn with_notifications(mut self, notifier: NotificationSender) -> Self {
        self.notifier = notifier;
        self
    }

    //--- Scene Lifecycle --------------------------------------------------

    /// Makes `scene` the running scene and creates its instances.
    ///
    /// A previously loaded scene is torn down first.
    pub fn load(&mut self, scene: Scene) {
        if !self.scene.is_empty() {
            self.unload();
        }

        debug!(target: "scheduler", "Loading scene with {} objects", scene.len());
        self.scene = scene;
        self.activate_pending();
    }

    /// Fires `on_destroyed` on every live instance and hands back the scene.
    ///
    /// Requests queued by teardown hooks are discarded.
    pub fn unload(&mut self) -> Scene {
        let (objects, mut dispatch) = self.split();

        for object in objects.iter_mut() {
            dispatch.destroy(object);
        }

        debug!(target: "scheduler", "Unloaded scene with {} objects", self.scene.len());
        self.store.clear();
        self.requests.clear();
        std::mem::take(&mut self.scene)
    }

    //--- Tick -------------------------------------------------------------

    /// Runs one tick with `dt_ms` milliseconds of elapsed time.
    ///
    /// Negative or non-finite deltas are treated as zero.
    pub fn advance(&mut self, dt_ms: f64) {
        let dt = sanitize_delta(dt_ms);

        self.tick += 1;
        let tick = self.tick;
        trace!(target: "scheduler", "Tick {} (dt: {:.3} ms)", tick, dt);

        //--- Step 1: Publish input -------------------------------------
        self.input.flush();

        //--- Step 2: Late creations ------------------------------------
        self.activate_pending();

        //--- Step 3: Updates -------------------------------------------
        {
            let (objects, mut dispatch) = self.split();

            for object in objects.iter_mut() {
                dispatch.update(object, dt);
            }
        }

        //--- Step 4: Contacts ------------------------------------------
        let events = match self.detector.as_mut() {
            Some(detector) => normalize(detector.detect(&self.scene)),
            None => Vec::new(),
        };

        if !events.is_empty() {
            let (objects, mut dispatch) = self.split();

            for event in &events {
                dispatch.contact(objects, event);
            }
        }

        //--- Step 5: Tick boundary -------------------------------------
        self.process_requests();
    }

    //--- Scene Edits (between ticks) -------------------------------------

    /// Fresh object data with an id unique in the running scene.
    pub fn new_object_data(&mut self, name: impl Into<String>) -> ObjectData {
        self.scene.new_object_data(name)
    }

    /// Adds an object to the running scene.
    ///
    /// Its instances are created at the start of the next tick.
    ///
    /// # Errors
    ///
    /// [`EngineError::DuplicateObject`] if the id is already used.
    pub fn insert_object(&mut self, object: GameObject) -> EngineResult<ObjectId> {
        self.scene.insert(object)
    }

    /// Destroys an object immediately, firing `on_destroyed` and dropping
    /// its internal state.
    ///
    /// Returns `false` if the object is not in the scene.
    pub fn remove_object(&mut self, id: ObjectId) -> bool {
        self.destroy_object(id)
    }

    //--- Accessors --------------------------------------------------------

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut InputState {
        &mut self.input
    }

    /// Handle for feeding input events into the inbox.
    pub fn input_sender(&self) -> InputSender {
        self.input.sender()
    }

    pub fn registry(&self) -> &ExtensionRegistry {
        &self.registry
    }

    pub fn store(&self) -> &InternalStore {
        &self.store
    }

    /// Number of ticks run so far.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Requests waiting for the next tick boundary.
    pub fn pending_requests(&self) -> usize {
        self.requests.len()
    }

    //--- Internal ---------------------------------------------------------

    /// Splits the scheduler into the scene's objects and a hook dispatcher.
    fn split(&mut self) -> (&mut [GameObject], Dispatch<'_>) {
        let (objects, ids) = self.scene.split_mut();
        let dispatch = Dispatch {
            registry: &self.registry,
            input: &self.input,
            store: &mut self.store,
            ids,
            requests: &mut self.requests,
            notifier: &self.notifier,
            tick: self.tick,
        };
        (objects, dispatch)
    }

    fn activate_pending(&mut self) {
        let (objects, mut dispatch) = self.split();

        for object in objects.iter_mut() {
            dispatch.create(object);
        }
    }

    /// Applies the current batch of world requests.
    fn process_requests(&mut self) {
        let batch = self.requests.take();
        if batch.is_empty() {
            return;
        }

        let (destroys, spawns): (Vec<_>, Vec<_>) = batch
            .into_iter()
            .partition(|request| matches!(request, WorldRequest::Destroy(_)));

        let mut missed = Vec::new();
        for request in destroys {
            if let WorldRequest::Destroy(id) = request {
                if !self.destroy_object(id) {
                    missed.push(id);
                }
            }
        }

        for request in spawns {
            if let WorldRequest::Spawn { data, extensions } = request {
                self.spawn_object(data, extensions);
            }
        }

        // Objects spawned and destroyed in the same tick are created, then
        // torn down right away
        for id in missed {
            if !self.destroy_object(id) {
                debug!(target: "scheduler", "Destroy of {} skipped, object not in scene", id);
            }
        }
    }

    /// Fires `on_destroyed` and removes the object with its internal state.
    fn destroy_object(&mut self, id: ObjectId) -> bool {
        let (objects, mut dispatch) = self.split();
        let Some(object) = objects.iter_mut().find(|object| object.id() == id) else {
            return false;
        };
        dispatch.destroy(object);

        self.scene.remove(id);
        self.store.remove_object(id);
        debug!(target: "scheduler", "Destroyed object {}", id);
        true
    }

    fn spawn_object(&mut self, data: ObjectData, extensions: Vec<ExtensionId>) {
        let id = data.id;
        let mut object = GameObject::new(data);

        for extension in &extensions {
            if let Err(err) = self.registry.instantiate(&mut object, extension.as_str()) {
                self.notifier.report("scheduler", &err);
            }
        }

        if let Err(err) = self.scene.insert(object) {
            self.notifier.report("scheduler", &err);
            return;
        }

        let (objects, mut dispatch) = self.split();
        if let Some(object) = objects.iter_mut().find(|object| object.id() == id) {
            dispatch.create(object);
        }
        debug!(target: "scheduler", "Spawned object {}", id);
    }
}

//=== Dispatch ============================================================

/// Borrowed view of everything a hook call needs besides the scene.
struct Dispatch<'a> {
    registry: &'a ExtensionRegistry,
    input: &'a InputState,
    store: &'a mut InternalStore,
    ids: &'a mut IdAllocator,
    requests: &'a mut WorldQueue,
    notifier: &'a NotificationSender,
    tick: u64,
}

impl Dispatch<'_> {
    fn definition(&self, instance: &ExtensionInstance) -> Option<Arc<ExtensionDefinition>> {
        self.registry.get(instance.extension()).cloned()
    }

    /// Fires `on_created` for pending instances.
    ///
    /// The instance becomes live whatever the hook's outcome; a failed
    /// creation is reported, never retried.
    fn create(&mut self, object: &mut GameObject) {
        let GameObject { data, extensions } = object;

        for instance in extensions.iter_mut() {
            if instance.phase != LifecyclePhase::Pending {
                continue;
            }

            match self.definition(instance) {
                Some(def) => {
                    if let Some(hook) = def.runtime().and_then(|r| r.on_created.as_ref()) {
                        self.guard(data, instance, "on_created", |data, api| hook(data, api));
                    }
                }
                None => self.notifier.report(
                    "scheduler",
                    &EngineError::UnknownExtension(instance.extension().to_string()),
                ),
            }

            instance.phase = LifecyclePhase::Live;
        }
    }

    fn update(&mut self, object: &mut GameObject, dt: f64) {
        let GameObject { data, extensions } = object;

        for instance in extensions.iter_mut() {
            if !instance.is_active(self.tick) {
                continue;
            }
            let Some(def) = self.definition(instance) else {
                continue;
            };
            let Some(hook) = def.runtime().and_then(|r| r.on_update.as_ref()) else {
                continue;
            };

            self.guard(data, instance, "on_update", |data, api| hook(data, dt, api));
        }
    }

    /// Delivers one contact event to both participants.
    fn contact(&mut self, objects: &mut [GameObject], event: &ContactEvent) {
        for (me, other) in [(event.a, event.b), (event.b, event.a)] {
            let Some(other_data) = objects
                .iter()
                .find(|object| object.id() == other)
                .map(|object| object.data.clone())
            else {
                debug!(target: "scheduler", "Contact with missing object {} ignored", other);
                return;
            };
            let Some(object) = objects.iter_mut().find(|object| object.id() == me) else {
                debug!(target: "scheduler", "Contact with missing object {} ignored", me);
                return;
            };

            let GameObject { data, extensions } = object;
            for instance in extensions.iter_mut() {
                if !instance.is_active(self.tick) {
                    continue;
                }
                let Some(def) = self.definition(instance) else {
                    continue;
                };
                let Some(hook) = def.runtime().and_then(|r| r.contact(event.kind, event.phase))
                else {
                    continue;
                };

                self.guard(data, instance, event.hook_name(), |data, api| {
                    hook(data, &other_data, api)
                });
            }
        }
    }

    /// Fires `on_destroyed` for live instances and retires every instance.
    ///
    /// Pending instances never started, so they are retired silently.
    fn destroy(&mut self, object: &mut GameObject) {
        let GameObject { data, extensions } = object;

        for instance in extensions.iter_mut() {
            if instance.phase == LifecyclePhase::Live {
                if let Some(def) = self.definition(instance) {
                    if let Some(hook) = def.runtime().and_then(|r| r.on_destroyed.as_ref()) {
                        self.guard(data, instance, "on_destroyed", |data, api| hook(data, api));
                    }
                }
            }
            instance.phase = LifecyclePhase::Destroyed;
        }
    }

    /// Runs one hook body with a fresh [`RuntimeApi`].
    ///
    /// Returns `false` if the hook failed; the instance is then skipped
    /// for the rest of the tick.
    fn guard<F>(
        &mut self,
        data: &mut ObjectData,
        instance: &mut ExtensionInstance,
        hook: &'static str,
        body: F,
    ) -> bool
    where
        F: FnOnce(&mut ObjectData, &mut RuntimeApi<'_>) -> HookResult,
    {
        let extension = instance.extension().clone();
        let object = data.id;

        let mut api = RuntimeApi::new(
            object,
            &extension,
            self.tick,
            self.input,
            &mut *self.store,
            &mut *self.ids,
            &mut *self.requests,
        );

        match guarded(|| body(data, &mut api)) {
            Ok(()) => true,
            Err(reason) => {
                instance.faulted_tick = Some(self.tick);
                let subject = format!("{} on {}", extension, object);
                self.notifier
                    .report("scheduler", &EngineError::hook(subject, hook, reason));
                false
            }
        }
    }
}

//=== Helpers =============================================================

fn sanitize_delta(dt_ms: f64) -> f64 {
    if dt_ms.is_finite() && dt_ms >= 0.0 {
        dt_ms
    } else {
        warn!(target: "scheduler", "Invalid frame delta {} ms, using 0", dt_ms);
        0.0
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
