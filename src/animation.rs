use log::trace;

use crate::error::DrawError;
use crate::factory::SceneObject;
use crate::scene::SceneGraph;
use crate::surface::DrawTarget;

/// Base per-tick rotation increment, radians per axis.
pub const ROTATION_STEP: f32 = 0.01;

/// Extra rotation per tick scaled by the object's phase index, so speeds
/// vary visibly across the field. Tunable; no upper bound is enforced.
pub const ROTATION_PHASE_STEP: f32 = 0.001;

/// Hard cap on the vertical oscillation around each object's rest height.
pub const BOB_AMPLITUDE: f32 = 0.1;

/// Per-tick rotation advance for an object with the given phase index.
pub fn rotation_step(phase: usize) -> f32 {
    ROTATION_STEP + phase as f32 * ROTATION_PHASE_STEP
}

/// Mutate every object for one tick: accumulate rotation and set the
/// bounded vertical oscillation from wall-clock `time` (seconds).
pub fn advance(objects: &mut [SceneObject], time: f32) {
    for object in objects.iter_mut() {
        let step = rotation_step(object.phase);
        object.rotation.x += step;
        object.rotation.y += step;
        object.position.y = object.rest_y + BOB_AMPLITUDE * (time + object.phase as f32).sin();
    }
}

/// Opaque token for the single scheduled frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnimationHandle(u64);

impl AnimationHandle {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Host frame-scheduling primitive: single-threaded, at most one callback
/// per handle, fire-and-forget.
pub trait FrameScheduler {
    /// Schedule one frame callback for the next display refresh.
    fn schedule(&mut self) -> AnimationHandle;

    /// Prevent the callback identified by `handle` from running.
    fn cancel(&mut self, handle: AnimationHandle);
}

/// The per-frame loop: an infinite, cancellable sequence of
/// mutate-then-draw ticks over the host scheduler.
///
/// At most one frame is pending at any time; the pending handle is the
/// cancellation point. A tick that arrives after cancellation finds no
/// pending handle and does nothing.
#[derive(Debug, Default)]
pub struct AnimationDriver {
    pending: Option<AnimationHandle>,
    ticks: u64,
}

impl AnimationDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule the first tick. No-op if a frame is already pending.
    pub fn start(&mut self, scheduler: &mut dyn FrameScheduler) {
        if self.pending.is_none() {
            self.pending = Some(scheduler.schedule());
        }
    }

    /// Handle of the currently scheduled frame, if any.
    pub fn pending(&self) -> Option<AnimationHandle> {
        self.pending
    }

    /// Ticks executed since the driver was created.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Execute one tick: mutate all objects, draw, schedule the successor.
    ///
    /// Returns `Ok(false)` when no frame was pending (the loop was
    /// cancelled). A draw failure aborts the tick without scheduling a
    /// successor; the loop is not restarted here.
    pub fn tick(
        &mut self,
        scene: &mut SceneGraph,
        target: &mut dyn DrawTarget,
        time: f32,
        scheduler: &mut dyn FrameScheduler,
    ) -> Result<bool, DrawError> {
        if self.pending.take().is_none() {
            return Ok(false);
        }

        advance(scene.objects_mut(), time);
        self.ticks += 1;
        trace!("tick {} at t={:.3}s", self.ticks, time);

        target.draw(scene)?;

        self.pending = Some(scheduler.schedule());
        Ok(true)
    }

    /// Cancel the pending frame. Idempotent; an in-flight tick on the host
    /// thread has either already consumed the handle or will find none.
    pub fn cancel(&mut self, scheduler: &mut dyn FrameScheduler) {
        if let Some(handle) = self.pending.take() {
            scheduler.cancel(handle);
        }
    }
}
