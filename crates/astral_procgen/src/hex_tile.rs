use crate::mesh::{MeshData, MeshVertex};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Parameters for a flat-top hexagonal prism tile
///
/// `width` is the corner-to-corner extent along X, which is the tile size the
/// grid mapper spaces columns by (`0.75 * width`) and rows by
/// (`width * sqrt(3) / 2`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HexTileRecipe {
    pub width: f32,
    pub height: f32,
}

impl Default for HexTileRecipe {
    fn default() -> Self {
        Self {
            width: 1.0,
            height: 0.2,
        }
    }
}

impl HexTileRecipe {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    fn corner(&self, i: u32) -> Vec3 {
        let radius = self.width * 0.5;
        let angle = (i % 6) as f32 * PI / 3.0;
        Vec3::new(radius * angle.cos(), 0.0, radius * angle.sin())
    }
}

/// Generate a hexagonal prism: a fan-triangulated top face plus six side walls.
/// The base sits at y = 0 and is left open since tiles rest on each other's
/// footprint.
pub fn generate_hex_tile(recipe: &HexTileRecipe) -> MeshData {
    let radius = recipe.width * 0.5;
    let top = Vec3::Y * recipe.height;

    let mut vertices = Vec::with_capacity(7 + 24);
    let mut indices = Vec::with_capacity(18 * 3);

    // Top face
    vertices.push(MeshVertex {
        position: top.to_array(),
        normal: [0.0, 1.0, 0.0],
        uv: [0.5, 0.5],
    });
    for i in 0..6 {
        let c = recipe.corner(i);
        vertices.push(MeshVertex {
            position: (c + top).to_array(),
            normal: [0.0, 1.0, 0.0],
            uv: [0.5 + c.x / (2.0 * radius), 0.5 + c.z / (2.0 * radius)],
        });
    }
    for i in 0..6u32 {
        let current = 1 + i;
        let next = 1 + (i + 1) % 6;
        indices.extend_from_slice(&[0, next, current]);
    }

    // Side walls, one flat-shaded quad per edge
    for i in 0..6u32 {
        let a = recipe.corner(i);
        let b = recipe.corner(i + 1);
        let mid_angle = (i as f32 + 0.5) * PI / 3.0;
        let normal = [mid_angle.cos(), 0.0, mid_angle.sin()];

        let base = vertices.len() as u32;
        let quad = [
            (a, [0.0, 0.0]),
            (a + top, [0.0, 1.0]),
            (b + top, [1.0, 1.0]),
            (b, [1.0, 0.0]),
        ];
        for (position, uv) in quad {
            vertices.push(MeshVertex {
                position: position.to_array(),
                normal,
                uv,
            });
        }

        indices.extend_from_slice(&[base, base + 1, base + 2]);
        indices.extend_from_slice(&[base, base + 2, base + 3]);
    }

    MeshData { vertices, indices }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_tile_counts() {
        let mesh = generate_hex_tile(&HexTileRecipe::default());
        assert_eq!(mesh.vertex_count(), 31);
        assert_eq!(mesh.triangle_count(), 18);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertex_count()));
    }

    #[test]
    fn test_hex_tile_extent_matches_width() {
        let mesh = generate_hex_tile(&HexTileRecipe::new(2.0, 0.5));
        let bounds = mesh.bounds().unwrap();

        assert!((bounds.size().x - 2.0).abs() < 1e-5);
        assert!((bounds.size().z - 3.0_f32.sqrt()).abs() < 1e-5);
        assert!((bounds.max.y - 0.5).abs() < 1e-6);
        assert_eq!(bounds.min.y, 0.0);
    }

    #[test]
    fn test_top_face_winding_points_up() {
        let mesh = generate_hex_tile(&HexTileRecipe::default());
        for tri in mesh.indices[..18].chunks(3) {
            let p0 = Vec3::from_array(mesh.vertices[tri[0] as usize].position);
            let p1 = Vec3::from_array(mesh.vertices[tri[1] as usize].position);
            let p2 = Vec3::from_array(mesh.vertices[tri[2] as usize].position);
            assert!((p1 - p0).cross(p2 - p0).y > 0.0);
        }
    }

    #[test]
    fn test_side_walls_face_outward() {
        let mesh = generate_hex_tile(&HexTileRecipe::default());
        for tri in mesh.indices[18..].chunks(3) {
            let p0 = Vec3::from_array(mesh.vertices[tri[0] as usize].position);
            let p1 = Vec3::from_array(mesh.vertices[tri[1] as usize].position);
            let p2 = Vec3::from_array(mesh.vertices[tri[2] as usize].position);
            let face = (p1 - p0).cross(p2 - p0);
            let centroid = (p0 + p1 + p2) / 3.0;
            assert!(face.dot(Vec3::new(centroid.x, 0.0, centroid.z)) > 0.0);
        }
    }
}
