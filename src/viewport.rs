use log::{debug, trace};

use crate::camera::Camera;
use crate::surface::DrawTarget;

/// Host viewport dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Minimized windows report zero-sized viewports.
    pub fn is_zero(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Keeps camera projection and surface size consistent with the viewport.
///
/// Every resize notification is handled, no debouncing. Handlers run
/// interleaved with animation ticks on the same thread, never concurrently.
#[derive(Debug, Default)]
pub struct ViewportSync {
    registered: bool,
}

impl ViewportSync {
    pub fn new() -> Self {
        Self { registered: false }
    }

    /// Subscribe to resize notifications. Idempotent.
    pub fn register(&mut self) {
        if !self.registered {
            debug!("viewport sync registered");
        }
        self.registered = true;
    }

    /// Unsubscribe. Idempotent; part of teardown.
    pub fn unregister(&mut self) {
        if self.registered {
            debug!("viewport sync unregistered");
        }
        self.registered = false;
    }

    pub fn is_registered(&self) -> bool {
        self.registered
    }

    /// Apply one resize notification: recompute the camera aspect ratio and
    /// resize the drawing surface. Zero-sized viewports (minimized window)
    /// are ignored so the GPU surface is never configured to zero.
    pub fn handle_resize(
        &self,
        camera: &mut Camera,
        target: &mut dyn DrawTarget,
        viewport: Viewport,
    ) {
        if !self.registered || viewport.is_zero() {
            return;
        }

        trace!("resize to {}x{}", viewport.width, viewport.height);
        camera.set_aspect(viewport.aspect());
        target.resize(viewport);
    }
}
