use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4, Vec3};
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub pos: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

pub struct MeshBuffer {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

/// Index of a mesh registered with the renderer at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshId(pub usize);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn empty() -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.indices.is_empty()
    }

    /// Bake a transform into positions and normals.
    pub fn transform(&mut self, m: Mat4) {
        let normal_matrix = Mat3::from_mat4(m).inverse().transpose();
        for v in self.vertices.iter_mut() {
            v.pos = m.transform_point3(Vec3::from(v.pos)).to_array();
            v.normal = (normal_matrix * Vec3::from(v.normal))
                .normalize_or_zero()
                .to_array();
        }
    }

    /// Append another mesh, rebasing its indices.
    pub fn append(&mut self, other: &Mesh) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.indices.extend(other.indices.iter().map(|i| i + base));
    }

    /// Axis-aligned extent of the vertex positions as (min, max).
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let mut iter = self.vertices.iter().map(|v| Vec3::from(v.pos));
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p))))
    }

    pub fn upload(&self, device: &wgpu::Device) -> MeshBuffer {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Vertex Buffer"),
            contents: bytemuck::cast_slice(&self.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Index Buffer"),
            contents: bytemuck::cast_slice(&self.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        MeshBuffer {
            vertex_buffer,
            index_buffer,
            index_count: self.indices.len() as u32,
        }
    }
}

/// Unit cube centred at the origin (edge length 1) with per-face normals and uvs.
pub fn create_cube_mesh() -> Mesh {
    // (normal, tangent u, tangent v) per face
    let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (normal, u, v) in faces {
        let n = Vec3::from(normal);
        let u = Vec3::from(u);
        let v = Vec3::from(v);
        let base = vertices.len() as u32;
        for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            let pos = n * 0.5 + u * (0.5 * su) + v * (0.5 * sv);
            vertices.push(Vertex {
                pos: pos.to_array(),
                normal,
                uv: [(su + 1.0) * 0.5, 1.0 - (sv + 1.0) * 0.5],
            });
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }

    Mesh { vertices, indices }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_is_unit_sized() {
        let cube = create_cube_mesh();
        assert_eq!(cube.vertices.len(), 24);
        assert_eq!(cube.indices.len(), 36);
        let (lo, hi) = cube.bounds().unwrap();
        assert!(lo.abs_diff_eq(Vec3::splat(-0.5), 1e-6));
        assert!(hi.abs_diff_eq(Vec3::splat(0.5), 1e-6));
    }

    #[test]
    fn cube_faces_wind_counter_clockwise() {
        let cube = create_cube_mesh();
        for tri in cube.indices.chunks(3) {
            let a = Vec3::from(cube.vertices[tri[0] as usize].pos);
            let b = Vec3::from(cube.vertices[tri[1] as usize].pos);
            let c = Vec3::from(cube.vertices[tri[2] as usize].pos);
            let n = Vec3::from(cube.vertices[tri[0] as usize].normal);
            assert!((b - a).cross(c - a).dot(n) > 0.0);
        }
    }

    #[test]
    fn append_rebases_indices() {
        let mut a = create_cube_mesh();
        let b = create_cube_mesh();
        a.append(&b);
        assert_eq!(a.vertices.len(), 48);
        assert_eq!(a.indices[36], 24);
    }

    #[test]
    fn transform_moves_bounds() {
        let mut cube = create_cube_mesh();
        cube.transform(Mat4::from_translation(Vec3::new(0.0, 2.0, 0.0)));
        let (lo, hi) = cube.bounds().unwrap();
        assert!((lo.y - 1.5).abs() < 1e-6);
        assert!((hi.y - 2.5).abs() < 1e-6);
    }

    #[test]
    fn empty_mesh_has_no_bounds() {
        assert!(Mesh::empty().bounds().is_none());
        assert!(Mesh::empty().is_empty());
    }
}
