use glam::Vec3;
use log::debug;

use crate::camera::Camera;
use crate::factory::SceneObject;

/// Constant fill light. Immutable after creation.
#[derive(Debug, Clone, Copy)]
pub struct AmbientLight {
    pub color: [f32; 3],
    pub intensity: f32,
}

/// Single key light shining from a fixed position toward the origin.
/// Immutable after creation.
#[derive(Debug, Clone, Copy)]
pub struct DirectionalLight {
    pub color: [f32; 3],
    pub intensity: f32,
    pub position: Vec3,
}

/// The renderable world state: camera, light rig, and the generated objects.
///
/// Objects are added during setup only and disposed exactly once during
/// teardown; `dispose_all` is safe to call repeatedly and after partial setup.
#[derive(Debug)]
pub struct SceneGraph {
    pub camera: Camera,
    pub ambient: AmbientLight,
    pub directional: DirectionalLight,
    objects: Vec<SceneObject>,
    disposed: bool,
}

impl SceneGraph {
    pub fn new(camera: Camera) -> Self {
        Self {
            camera,
            // 0x404040 gray at 0.6, white key light from (10, 10, 5).
            ambient: AmbientLight {
                color: [0.25, 0.25, 0.25],
                intensity: 0.6,
            },
            directional: DirectionalLight {
                color: [1.0, 1.0, 1.0],
                intensity: 1.0,
                position: Vec3::new(10.0, 10.0, 5.0),
            },
            objects: Vec::new(),
            disposed: false,
        }
    }

    /// Attach an object. Setup only; adding after disposal is a logic error.
    pub fn add(&mut self, object: SceneObject) {
        debug_assert!(!self.disposed, "add() after dispose_all()");
        self.objects.push(object);
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn objects_mut(&mut self) -> &mut [SceneObject] {
        &mut self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Release every object exactly once. The second call is a no-op.
    pub fn dispose_all(&mut self) {
        if self.disposed {
            return;
        }
        debug!("disposing {} scene objects", self.objects.len());
        self.objects.clear();
        self.disposed = true;
    }
}
