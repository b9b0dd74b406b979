use log::{info, warn};

use crate::animation::{AnimationDriver, AnimationHandle, FrameScheduler};
use crate::camera::Camera;
use crate::error::{DrawError, SetupError};
use crate::factory;
use crate::scene::SceneGraph;
use crate::surface::{DrawTarget, SurfaceBinder};
use crate::viewport::{Viewport, ViewportSync};

/// Objects generated per mount unless configured otherwise.
pub const DEFAULT_OBJECT_COUNT: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Unmounted,
    Mounting,
    Running,
    Unmounting,
}

/// Orchestrates the backdrop lifecycle:
/// `Unmounted -> Mounting -> Running -> Unmounting -> Unmounted`.
///
/// Every per-mount handle (scene, draw target, pending frame, listener
/// registration) is an explicit field so teardown can walk them in strict
/// reverse order of acquisition, each step independently idempotent.
pub struct Backdrop {
    state: LifecycleState,
    object_count: usize,
    scene: Option<SceneGraph>,
    target: Option<Box<dyn DrawTarget>>,
    driver: AnimationDriver,
    sync: ViewportSync,
    loaded: bool,
}

impl Backdrop {
    pub fn new() -> Self {
        Self::with_object_count(DEFAULT_OBJECT_COUNT)
    }

    pub fn with_object_count(object_count: usize) -> Self {
        Self {
            state: LifecycleState::Unmounted,
            object_count,
            scene: None,
            target: None,
            driver: AnimationDriver::new(),
            sync: ViewportSync::new(),
            loaded: false,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Readiness signal for surrounding UI; flips true once per mount after
    /// the first successful `Mounting -> Running` transition.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn scene(&self) -> Option<&SceneGraph> {
        self.scene.as_ref()
    }

    /// Number of live scene objects; zero when unmounted.
    pub fn live_objects(&self) -> usize {
        self.scene.as_ref().map_or(0, SceneGraph::len)
    }

    /// Handle of the currently scheduled frame, if any.
    pub fn pending_frame(&self) -> Option<AnimationHandle> {
        self.driver.pending()
    }

    pub fn viewport_registered(&self) -> bool {
        self.sync.is_registered()
    }

    /// Pixel dimensions of the bound surface; (0, 0) when unmounted.
    pub fn surface_dimensions(&self) -> (u32, u32) {
        self.target.as_ref().map_or((0, 0), |t| t.dimensions())
    }

    /// Mount the backdrop: generate a fresh object set, bind the drawing
    /// surface, register viewport sync, and schedule the first frame.
    ///
    /// A missing mount point returns the machine to `Unmounted` with nothing
    /// acquired. A surface-creation failure leaves it in `Mounting`; the
    /// partial state is fully reclaimed by `unmount`.
    pub fn mount(
        &mut self,
        binder: &mut dyn SurfaceBinder,
        scheduler: &mut dyn FrameScheduler,
        viewport: Viewport,
    ) -> Result<(), SetupError> {
        if self.state != LifecycleState::Unmounted {
            return Err(SetupError::AlreadyMounted);
        }
        self.state = LifecycleState::Mounting;
        info!(
            "mounting backdrop: {} objects into {}x{} viewport",
            self.object_count, viewport.width, viewport.height
        );

        let mut scene = SceneGraph::new(Camera::new(viewport.aspect()));
        for object in factory::generate(self.object_count) {
            scene.add(object);
        }
        self.scene = Some(scene);

        match binder.bind(viewport) {
            Ok(target) => self.target = Some(target),
            Err(err) => {
                warn!("backdrop setup failed: {}", err);
                if matches!(err, SetupError::Mount(_)) {
                    // Nothing external was acquired; fold back to Unmounted.
                    if let Some(mut scene) = self.scene.take() {
                        scene.dispose_all();
                    }
                    self.state = LifecycleState::Unmounted;
                }
                return Err(err);
            }
        }

        self.sync.register();
        self.driver.start(scheduler);
        self.state = LifecycleState::Running;
        self.loaded = true;
        info!("backdrop running");
        Ok(())
    }

    /// Execute one animation tick at wall-clock `time` seconds.
    ///
    /// Returns `Ok(false)` outside `Running` or when the pending frame was
    /// cancelled. A draw error is propagated and the loop stops.
    pub fn tick(
        &mut self,
        time: f32,
        scheduler: &mut dyn FrameScheduler,
    ) -> Result<bool, DrawError> {
        if self.state != LifecycleState::Running {
            return Ok(false);
        }
        let (scene, target) = match (self.scene.as_mut(), self.target.as_mut()) {
            (Some(scene), Some(target)) => (scene, target),
            _ => return Ok(false),
        };
        self.driver.tick(scene, target.as_mut(), time, scheduler)
    }

    /// Apply a host resize notification to camera and surface.
    pub fn handle_resize(&mut self, viewport: Viewport) {
        if let (Some(scene), Some(target)) = (self.scene.as_mut(), self.target.as_mut()) {
            self.sync
                .handle_resize(&mut scene.camera, target.as_mut(), viewport);
        }
    }

    /// Tear down in strict reverse order of acquisition: cancel the pending
    /// frame, unregister viewport sync, release the surface, dispose the
    /// scene. Runs against whatever partial state exists; calling it on an
    /// unmounted backdrop is a no-op.
    pub fn unmount(&mut self, scheduler: &mut dyn FrameScheduler) {
        if self.state == LifecycleState::Unmounted {
            return;
        }
        self.state = LifecycleState::Unmounting;
        info!("unmounting backdrop");

        self.driver.cancel(scheduler);
        self.sync.unregister();
        if let Some(mut target) = self.target.take() {
            target.release();
        }
        if let Some(mut scene) = self.scene.take() {
            scene.dispose_all();
        }

        self.loaded = false;
        self.state = LifecycleState::Unmounted;
    }
}

impl Default for Backdrop {
    fn default() -> Self {
        Self::new()
    }
}
