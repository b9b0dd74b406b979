use std::f32::consts::{PI, TAU};
use std::mem;

use glam::Vec3;

use crate::factory::GeometryKind;

/// A lit 3D vertex: position and outward normal.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    pub const ATTRS: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    #[inline]
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }

    fn new(position: Vec3, normal: Vec3) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
        }
    }
}

/// CPU-side indexed triangle mesh. Uploaded once per mount via
/// `wgpu::util::DeviceExt::create_buffer_init`.
#[derive(Clone, Debug, Default)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u16>,
}

impl Mesh {
    /// The mesh for one geometry kind, with the catalog's fixed parameters.
    pub fn for_kind(kind: GeometryKind) -> Self {
        match kind {
            GeometryKind::Box => Self::cube(1.0),
            GeometryKind::Sphere => Self::uv_sphere(0.5, 32, 32),
            GeometryKind::Cone => Self::cone(0.5, 1.0, 8),
            GeometryKind::Octahedron => Self::octahedron(0.7),
        }
    }

    /// Axis-aligned cube of the given edge length, flat-shaded.
    pub fn cube(size: f32) -> Self {
        let half = size * 0.5;
        let mut mesh = Mesh::default();

        // (normal, tangent, bitangent) with tangent x bitangent = normal,
        // so the four corners below wind counter-clockwise seen from outside.
        let faces = [
            (Vec3::X, Vec3::Y, Vec3::Z),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::Z, Vec3::X),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::Y, Vec3::X),
        ];

        for (normal, tangent, bitangent) in faces {
            let base = mesh.vertices.len() as u16;
            for (s, t) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
                let position = (normal + tangent * s + bitangent * t) * half;
                mesh.vertices.push(Vertex::new(position, normal));
            }
            mesh.indices
                .extend([base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        mesh
    }

    /// Latitude/longitude sphere with smooth normals.
    pub fn uv_sphere(radius: f32, segments: u16, rings: u16) -> Self {
        let mut mesh = Mesh::default();

        for ring in 0..=rings {
            let phi = PI * ring as f32 / rings as f32;
            let (sin_phi, cos_phi) = phi.sin_cos();
            for segment in 0..=segments {
                let theta = TAU * segment as f32 / segments as f32;
                let (sin_theta, cos_theta) = theta.sin_cos();

                let normal = Vec3::new(sin_phi * cos_theta, cos_phi, sin_phi * sin_theta);
                mesh.vertices.push(Vertex::new(normal * radius, normal));
            }
        }

        let stride = segments + 1;
        for ring in 0..rings {
            for segment in 0..segments {
                let a = ring * stride + segment;
                let b = a + stride;
                mesh.indices.extend([a, a + 1, b, b, a + 1, b + 1]);
            }
        }

        mesh
    }

    /// Upright cone: apex at +y, circular cap at -y, flat-shaded cap and
    /// per-segment smooth side normals.
    pub fn cone(radius: f32, height: f32, segments: u16) -> Self {
        let mut mesh = Mesh::default();
        let half = height * 0.5;
        let slant = (height * height + radius * radius).sqrt();

        // Side: one base-ring vertex per seam plus one apex vertex per
        // segment so the apex normal follows the segment center.
        let ring_base = mesh.vertices.len() as u16;
        for segment in 0..=segments {
            let theta = TAU * segment as f32 / segments as f32;
            let (sin_theta, cos_theta) = theta.sin_cos();
            let normal = Vec3::new(height * cos_theta, radius, height * sin_theta) / slant;
            mesh.vertices.push(Vertex::new(
                Vec3::new(radius * cos_theta, -half, radius * sin_theta),
                normal,
            ));
        }
        for segment in 0..segments {
            let theta = TAU * (segment as f32 + 0.5) / segments as f32;
            let (sin_theta, cos_theta) = theta.sin_cos();
            let normal = Vec3::new(height * cos_theta, radius, height * sin_theta) / slant;
            let apex = mesh.vertices.len() as u16;
            mesh.vertices.push(Vertex::new(Vec3::new(0.0, half, 0.0), normal));
            mesh.indices
                .extend([ring_base + segment, apex, ring_base + segment + 1]);
        }

        // Base cap, facing -y.
        let center = mesh.vertices.len() as u16;
        mesh.vertices
            .push(Vertex::new(Vec3::new(0.0, -half, 0.0), Vec3::NEG_Y));
        let cap_base = mesh.vertices.len() as u16;
        for segment in 0..=segments {
            let theta = TAU * segment as f32 / segments as f32;
            let (sin_theta, cos_theta) = theta.sin_cos();
            mesh.vertices.push(Vertex::new(
                Vec3::new(radius * cos_theta, -half, radius * sin_theta),
                Vec3::NEG_Y,
            ));
        }
        for segment in 0..segments {
            mesh.indices
                .extend([center, cap_base + segment, cap_base + segment + 1]);
        }

        mesh
    }

    /// Regular octahedron circumscribed by the given radius, flat-shaded.
    pub fn octahedron(radius: f32) -> Self {
        let mut mesh = Mesh::default();

        for sx in [1.0f32, -1.0] {
            for sy in [1.0f32, -1.0] {
                for sz in [1.0f32, -1.0] {
                    let a = Vec3::new(sx * radius, 0.0, 0.0);
                    let b = Vec3::new(0.0, sy * radius, 0.0);
                    let c = Vec3::new(0.0, 0.0, sz * radius);
                    let normal = Vec3::new(sx, sy, sz).normalize();

                    let base = mesh.vertices.len() as u16;
                    mesh.vertices.push(Vertex::new(a, normal));
                    // Mirrored octants reverse the winding.
                    if sx * sy * sz > 0.0 {
                        mesh.vertices.push(Vertex::new(b, normal));
                        mesh.vertices.push(Vertex::new(c, normal));
                    } else {
                        mesh.vertices.push(Vertex::new(c, normal));
                        mesh.vertices.push(Vertex::new(b, normal));
                    }
                    mesh.indices.extend([base, base + 1, base + 2]);
                }
            }
        }

        mesh
    }
}
