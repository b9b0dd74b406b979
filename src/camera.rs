use glam::{Mat4, Vec3};

pub const DEFAULT_FOV_Y_DEG: f32 = 75.0;
pub const DEFAULT_NEAR: f32 = 0.1;
pub const DEFAULT_FAR: f32 = 1000.0;
pub const DEFAULT_POSITION: Vec3 = Vec3::new(0.0, 0.0, 15.0);

/// Perspective camera looking down -Z into the object field.
///
/// After creation only `aspect` changes, and only through viewport sync.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub fov_y_deg: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
}

impl Camera {
    pub fn new(aspect: f32) -> Self {
        Self {
            fov_y_deg: DEFAULT_FOV_Y_DEG,
            aspect,
            near: DEFAULT_NEAR,
            far: DEFAULT_FAR,
            position: DEFAULT_POSITION,
        }
    }

    /// Recompute the projection for a new viewport aspect ratio.
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y_deg.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, Vec3::NEG_Z, Vec3::Y)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection() * self.view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_camera_uses_scene_defaults() {
        let camera = Camera::new(16.0 / 9.0);
        assert_eq!(camera.fov_y_deg, 75.0);
        assert_eq!(camera.near, 0.1);
        assert_eq!(camera.far, 1000.0);
        assert_eq!(camera.position, Vec3::new(0.0, 0.0, 15.0));
    }

    #[test]
    fn set_aspect_only_changes_aspect() {
        let mut camera = Camera::new(4.0 / 3.0);
        camera.set_aspect(2.0);

        assert_eq!(camera.aspect, 2.0);
        assert_eq!(camera.fov_y_deg, 75.0);
        assert_eq!(camera.position, DEFAULT_POSITION);
    }

    #[test]
    fn view_projection_maps_origin_in_front_of_camera() {
        let camera = Camera::new(1.0);
        let clip = camera.view_projection() * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);

        // The origin sits 15 units in front of the camera, well inside the
        // frustum: centered in x/y, positive depth after the perspective divide.
        assert!(clip.w > 0.0);
        assert!((clip.x / clip.w).abs() < 0.001);
        assert!((clip.y / clip.w).abs() < 0.001);
        let depth = clip.z / clip.w;
        assert!((0.0..1.0).contains(&depth), "depth: {}", depth);
    }
}
