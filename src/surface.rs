use crate::error::{DrawError, SetupError};
use crate::scene::SceneGraph;
use crate::viewport::Viewport;

/// A GPU-backed drawing surface attached to a host mount point.
///
/// Exactly one target exists per mounted backdrop. All calls arrive on the
/// single host thread; implementations never need interior locking.
pub trait DrawTarget {
    /// Draw one frame of the scene through its camera.
    ///
    /// A failed draw is fatal to that tick; the caller decides whether to
    /// log and stop. It is never retried here.
    fn draw(&mut self, scene: &SceneGraph) -> Result<(), DrawError>;

    /// Match the surface's pixel dimensions to the viewport.
    fn resize(&mut self, viewport: Viewport);

    /// Detach from the mount point and free the GPU context.
    ///
    /// Must be idempotent and must tolerate the mount point already being
    /// detached, so unmount can never fail.
    fn release(&mut self);

    /// Current pixel dimensions; (0, 0) once released.
    fn dimensions(&self) -> (u32, u32);
}

/// Binds a drawing surface into the host-provided mount point.
pub trait SurfaceBinder {
    /// Create a surface sized to `viewport` and attach it to the mount point.
    ///
    /// Fails with [`crate::error::MountError`] (wrapped in `SetupError`) when
    /// the mount point is absent at call time, or with
    /// [`SetupError::SurfaceCreation`] when no GPU context is available.
    /// Neither failure is retried.
    fn bind(&mut self, viewport: Viewport) -> Result<Box<dyn DrawTarget>, SetupError>;
}
