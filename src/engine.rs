//=========================================================================
// Tessera Engine
//
// Runtime entry point: owns the frame scheduler and the frame clock.
//
// Architecture:
// ```text
//     EngineBuilder  ──build()──>  Engine  ──tick()──>  FrameScheduler::advance(dt)
//         │                          │
//         ├─ with_input_capacity()   ├─ load(scene)
//         ├─ with_max_delta_ms()     ├─ input_sender() ──> platform layer
//         └─ with_collision_detector └─ stop() ──> Scene
// ```
//
// The host drives the loop. Each call to `tick()` measures the elapsed
// time since the previous one and runs exactly one scheduler tick.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::time::Duration;

use log::info;

//=== Internal Dependencies ===============================================

use crate::core::extension::ExtensionRegistry;
use crate::core::input::{InputSender, InputState, DEFAULT_INBOX_CAPACITY};
use crate::core::notify::NotificationSender;
use crate::core::object::Scene;
use crate::core::runtime::{CollisionDetector, FrameScheduler};
use crate::core::time::{FrameClock, FrameTime};

//=== EngineBuilder =======================================================

/// Builder for configuring and constructing an [`Engine`].
///
/// # Default Values
///
/// - **Input inbox capacity**: 256 events
/// - **Max delta**: none (wall-clock deltas are passed through)
/// - **Collision detector**: none
///
/// # Examples
///
/// ```
/// use tessera_engine::EngineBuilder;
/// use tessera_engine::core::{ExtensionDefinition, ExtensionRegistry, GameObject, Scene};
///
/// let mut registry = ExtensionRegistry::new();
/// registry.register(
///     ExtensionDefinition::builder("spin")
///         .default_property("angle", 0.0)
///         .on_update(|data, dt, _api| {
///             let angle = data.number("angle").unwrap_or(0.0);
///             data.set_property("angle", angle + dt * 0.1);
///             Ok(())
///         })
///         .build()
///         .unwrap(),
/// );
///
/// let mut scene = Scene::new();
/// let mut wheel = GameObject::new(scene.new_object_data("wheel"));
/// registry.instantiate(&mut wheel, "spin").unwrap();
/// let id = scene.insert(wheel).unwrap();
///
/// let mut engine = EngineBuilder::new(registry).build();
/// engine.load(scene);
/// engine.advance(10.0);
///
/// let angle = engine.scene().get(id).unwrap().data().number("angle");
/// assert_eq!(angle, Some(1.0));
/// ```
pub struct EngineBuilder {
    registry: ExtensionRegistry,
    input_capacity: usize,
    max_delta_ms: Option<f64>,
    detector: Option<Box<dyn CollisionDetector>>,
    notifier: Option<NotificationSender>,
}

impl EngineBuilder {
    /// Creates a builder with default settings.
    pub fn new(registry: ExtensionRegistry) -> Self {
        Self {
            registry,
            input_capacity: DEFAULT_INBOX_CAPACITY,
            max_delta_ms: None,
            detector: None,
            notifier: None,
        }
    }

    /// Sets how many input events may queue between two ticks.
    ///
    /// Events beyond the capacity are dropped with a warning.
    ///
    /// Default: 256
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn with_input_capacity(mut self, capacity: usize) -> Self {
        assert!(capacity > 0, "Input inbox capacity must be positive");
        self.input_capacity = capacity;
        self
    }

    /// Caps the delta reported by [`Engine::tick`], so a stalled host
    /// never produces one huge step.
    ///
    /// Default: none
    ///
    /// # Panics
    ///
    /// Panics if `max_ms` is not a positive finite number.
    pub fn with_max_delta_ms(mut self, max_ms: f64) -> Self {
        assert!(
            max_ms.is_finite() && max_ms > 0.0,
            "Max delta must be positive, got {}",
            max_ms
        );
        self.max_delta_ms = Some(max_ms);
        self
    }

    /// Installs the contact source consulted once per tick.
    pub fn with_collision_detector<D>(mut self, detector: D) -> Self
    where
        D: CollisionDetector + 'static,
    {
        self.detector = Some(Box::new(detector));
        self
    }

    /// Routes hook failures and contract violations to `notifier`.
    pub fn with_notifications(mut self, notifier: NotificationSender) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Builds the engine with an empty scene loaded.
    pub fn build(self) -> Engine {
        info!(
            "Building engine (extensions: {}, input capacity: {}, max delta: {:?} ms)",
            self.registry.len(),
            self.input_capacity,
            self.max_delta_ms
        );

        let mut scheduler = FrameScheduler::new(self.registry)
            .with_input(InputState::with_capacity(self.input_capacity));
        if let Some(detector) = self.detector {
            scheduler = scheduler.with_boxed_detector(detector);
        }
        if let Some(notifier) = self.notifier {
            scheduler = scheduler.with_notifications(notifier);
        }

        let clock = match self.max_delta_ms {
            Some(max_ms) => FrameClock::with_max_delta(Duration::from_secs_f64(max_ms / 1000.0)),
            None => FrameClock::new(),
        };

        Engine { scheduler, clock }
    }
}

//=== Engine ==============================================================

/// Running game.
///
/// Create via [`EngineBuilder`]. The engine is single-threaded: hooks run
/// on the thread that calls [`tick`](Self::tick). Other threads feed input
/// through [`input_sender`](Self::input_sender).
pub struct Engine {
    scheduler: FrameScheduler,
    clock: FrameClock,
}

impl Engine {
    //--- Scene Lifecycle --------------------------------------------------

    /// Starts `scene`, tearing down the current one first.
    pub fn load(&mut self, scene: Scene) {
        self.scheduler.load(scene);
        self.clock.reset();
    }

    /// Tears down the running scene and hands it back.
    pub fn stop(&mut self) -> Scene {
        info!("Stopping engine after {} ticks", self.scheduler.tick());
        self.scheduler.unload()
    }

    //--- Tick -------------------------------------------------------------

    /// Runs one tick using the wall-clock time since the previous one.
    pub fn tick(&mut self) -> FrameTime {
        let frame = self.clock.tick();
        self.scheduler.advance(frame.dt_ms);
        frame
    }

    /// Runs one tick with an explicit delta, bypassing the clock.
    pub fn advance(&mut self, dt_ms: f64) {
        self.scheduler.advance(dt_ms);
    }

    //--- Accessors --------------------------------------------------------

    /// Handle for platform callbacks; events land at the next tick.
    pub fn input_sender(&self) -> InputSender {
        self.scheduler.input_sender()
    }

    pub fn scene(&self) -> &Scene {
        self.scheduler.scene()
    }

    pub fn input(&self) -> &InputState {
        self.scheduler.input()
    }

    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut FrameScheduler {
        &mut self.scheduler
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
