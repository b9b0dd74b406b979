use glam::Vec3;
use rand::Rng;

/// Fixed catalog of primitive solids the backdrop is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    Box,
    Sphere,
    Cone,
    Octahedron,
}

impl GeometryKind {
    pub const ALL: [GeometryKind; 4] = [
        GeometryKind::Box,
        GeometryKind::Sphere,
        GeometryKind::Cone,
        GeometryKind::Octahedron,
    ];
}

/// Shared opacity of every generated material.
pub const OBJECT_OPACITY: f32 = 0.7;

/// Side length of the cube positions are sampled in, centered at the origin.
pub const FIELD_EXTENT: f32 = 20.0;

/// One floating solid in the backdrop.
///
/// Created once at mount; rotation and vertical position are mutated every
/// frame by the animation driver. Owned exclusively by the scene graph.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub kind: GeometryKind,
    /// Hue in [0, 1); saturation and lightness are fixed per material band.
    pub hue: f32,
    pub opacity: f32,
    pub position: Vec3,
    /// Spawn height; the vertical oscillation is an offset from this.
    pub rest_y: f32,
    /// Euler rotation in radians, one component per axis.
    pub rotation: Vec3,
    /// Index into the generated sequence; staggers the animation per object.
    pub phase: usize,
}

/// Generate `count` randomized scene objects using the thread-local RNG.
pub fn generate(count: usize) -> Vec<SceneObject> {
    generate_with(&mut rand::thread_rng(), count)
}

/// Generate `count` randomized scene objects from a caller-supplied RNG.
///
/// Each object samples a geometry kind uniformly from the catalog, a hue in
/// [0, 1), a position uniform in the field cube, and a per-axis rotation in
/// [0, pi). Sampling cannot fail; `count = 0` yields an empty set.
pub fn generate_with<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<SceneObject> {
    (0..count)
        .map(|index| {
            let kind = GeometryKind::ALL[rng.gen_range(0..GeometryKind::ALL.len())];
            let position = Vec3::new(
                (rng.gen::<f32>() - 0.5) * FIELD_EXTENT,
                (rng.gen::<f32>() - 0.5) * FIELD_EXTENT,
                (rng.gen::<f32>() - 0.5) * FIELD_EXTENT,
            );
            let rotation = Vec3::new(
                rng.gen::<f32>() * std::f32::consts::PI,
                rng.gen::<f32>() * std::f32::consts::PI,
                rng.gen::<f32>() * std::f32::consts::PI,
            );

            SceneObject {
                kind,
                hue: rng.gen::<f32>(),
                opacity: OBJECT_OPACITY,
                position,
                rest_y: position.y,
                rotation,
                phase: index,
            }
        })
        .collect()
}
