use glam::{Mat3, Mat4, Vec3};

/// Vertex layout shared by tile archetypes, prefabs and merged renderables
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }
}

/// Indexed triangle mesh
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Bounds of all vertex positions, `None` for an empty mesh
    pub fn bounds(&self) -> Option<Aabb> {
        let first = Vec3::from_array(self.vertices.first()?.position);
        let (min, max) = self.vertices.iter().fold((first, first), |(min, max), v| {
            let p = Vec3::from_array(v.position);
            (min.min(p), max.max(p))
        });
        Some(Aabb { min, max })
    }

    /// Append `other` baked into world space by `transform`
    ///
    /// Positions go through the full affine transform, normals through the
    /// inverse-transpose of its linear part. Indices are re-based onto the
    /// vertices already present.
    pub fn append_transformed(&mut self, other: &MeshData, transform: &Mat4) {
        let linear = Mat3::from_mat4(*transform);
        let normal_matrix = if linear.determinant().abs() > f32::EPSILON {
            linear.inverse().transpose()
        } else {
            linear
        };

        let vertex_offset = self.vertices.len() as u32;
        self.vertices.reserve(other.vertices.len());
        for v in &other.vertices {
            let position = transform.transform_point3(Vec3::from_array(v.position));
            let normal = (normal_matrix * Vec3::from_array(v.normal)).normalize_or_zero();
            self.vertices.push(MeshVertex {
                position: position.to_array(),
                normal: normal.to_array(),
                uv: v.uv,
            });
        }
        self.indices.extend(other.indices.iter().map(|idx| idx + vertex_offset));
    }

    /// Merge meshes in iteration order into a single mesh
    pub fn combine<'a>(parts: impl IntoIterator<Item = (&'a MeshData, Mat4)>) -> MeshData {
        let mut combined = MeshData::default();
        for (mesh, transform) in parts {
            combined.append_transformed(mesh, &transform);
        }
        combined
    }
}

/// Recompute smooth vertex normals by averaging adjacent face normals
pub(crate) fn recalculate_normals(vertices: &mut [MeshVertex], indices: &[u32]) {
    let mut accumulated = vec![Vec3::ZERO; vertices.len()];

    for triangle in indices.chunks_exact(3) {
        let i0 = triangle[0] as usize;
        let i1 = triangle[1] as usize;
        let i2 = triangle[2] as usize;

        let p0 = Vec3::from_array(vertices[i0].position);
        let p1 = Vec3::from_array(vertices[i1].position);
        let p2 = Vec3::from_array(vertices[i2].position);

        let face_normal = (p1 - p0).cross(p2 - p0);
        accumulated[i0] += face_normal;
        accumulated[i1] += face_normal;
        accumulated[i2] += face_normal;
    }

    for (vertex, normal) in vertices.iter_mut().zip(accumulated) {
        vertex.normal = normal.normalize_or_zero().to_array();
    }
}
