use crate::mesh::{recalculate_normals, MeshData, MeshVertex};
use glam::Vec3;
use noise::{NoiseFn, Perlin};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Types of rock formations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RockType {
    Boulder,
    RiverStone,
    SharpRock,
}

/// Parameters for procedural rock generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RockRecipe {
    pub rock_type: RockType,
    pub base_size: [f32; 3],
    pub seed: u32,
    pub subdivision_levels: u32,
    pub roughness: f32,
    pub deformation: f32,
}

impl Default for RockRecipe {
    fn default() -> Self {
        Self::boulder()
    }
}

impl RockRecipe {
    pub fn boulder() -> Self {
        RockRecipe {
            rock_type: RockType::Boulder,
            base_size: [0.5, 0.4, 0.5],
            seed: 0,
            subdivision_levels: 2,
            roughness: 0.1,
            deformation: 0.2,
        }
    }

    pub fn river_stone() -> Self {
        RockRecipe {
            rock_type: RockType::RiverStone,
            base_size: [0.25, 0.15, 0.25],
            seed: 0,
            subdivision_levels: 3, // smoother
            roughness: 0.05,
            deformation: 0.1,
        }
    }

    pub fn sharp_rock() -> Self {
        RockRecipe {
            rock_type: RockType::SharpRock,
            base_size: [0.4, 0.6, 0.4],
            seed: 0,
            subdivision_levels: 1, // angular
            roughness: 0.4,
            deformation: 0.5,
        }
    }

    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }
}

/// Generate a rock mesh from a recipe
pub fn generate_rock(recipe: &RockRecipe) -> MeshData {
    let (mut vertices, mut indices) = base_icosphere();

    // Subdivision levels above 5 explode the vertex count for no visible gain
    for _ in 0..recipe.subdivision_levels.min(5) {
        subdivide(&mut vertices, &mut indices);
    }

    displace_vertices(&mut vertices, recipe);
    recalculate_normals(&mut vertices, &indices);

    MeshData { vertices, indices }
}

fn base_icosphere() -> (Vec<MeshVertex>, Vec<u32>) {
    // Golden ratio
    let t = (1.0 + 5.0_f32.sqrt()) / 2.0;

    let corners = [
        Vec3::new(-1.0, t, 0.0),
        Vec3::new(1.0, t, 0.0),
        Vec3::new(-1.0, -t, 0.0),
        Vec3::new(1.0, -t, 0.0),
        Vec3::new(0.0, -1.0, t),
        Vec3::new(0.0, 1.0, t),
        Vec3::new(0.0, -1.0, -t),
        Vec3::new(0.0, 1.0, -t),
        Vec3::new(t, 0.0, -1.0),
        Vec3::new(t, 0.0, 1.0),
        Vec3::new(-t, 0.0, -1.0),
        Vec3::new(-t, 0.0, 1.0),
    ];

    let vertices = corners
        .iter()
        .map(|c| {
            let p = c.normalize();
            MeshVertex {
                position: p.to_array(),
                normal: p.to_array(),
                uv: [0.0, 0.0],
            }
        })
        .collect();

    let indices = vec![
        0, 11, 5, 0, 5, 1, 0, 1, 7, 0, 7, 10, 0, 10, 11, //
        1, 5, 9, 5, 11, 4, 11, 10, 2, 10, 7, 6, 7, 1, 8, //
        3, 9, 4, 3, 4, 2, 3, 2, 6, 3, 6, 8, 3, 8, 9, //
        4, 9, 5, 2, 4, 11, 6, 2, 10, 8, 6, 7, 9, 8, 1,
    ];

    (vertices, indices)
}

fn subdivide(vertices: &mut Vec<MeshVertex>, indices: &mut Vec<u32>) {
    let mut midpoints = HashMap::new();
    let mut refined = Vec::with_capacity(indices.len() * 4);

    for tri in indices.chunks_exact(3) {
        let (i0, i1, i2) = (tri[0], tri[1], tri[2]);

        let a = midpoint(i0, i1, vertices, &mut midpoints);
        let b = midpoint(i1, i2, vertices, &mut midpoints);
        let c = midpoint(i2, i0, vertices, &mut midpoints);

        refined.extend_from_slice(&[i0, a, c]);
        refined.extend_from_slice(&[i1, b, a]);
        refined.extend_from_slice(&[i2, c, b]);
        refined.extend_from_slice(&[a, b, c]);
    }

    *indices = refined;
}

fn midpoint(
    p1: u32,
    p2: u32,
    vertices: &mut Vec<MeshVertex>,
    midpoints: &mut HashMap<(u32, u32), u32>,
) -> u32 {
    let key = if p1 < p2 { (p1, p2) } else { (p2, p1) };
    if let Some(&index) = midpoints.get(&key) {
        return index;
    }

    let a = Vec3::from_array(vertices[p1 as usize].position);
    let b = Vec3::from_array(vertices[p2 as usize].position);
    let middle = (a + b).normalize(); // stay on the unit sphere until displacement

    let index = vertices.len() as u32;
    vertices.push(MeshVertex {
        position: middle.to_array(),
        normal: middle.to_array(),
        uv: [0.0, 0.0],
    });
    midpoints.insert(key, index);
    index
}

fn displace_vertices(vertices: &mut [MeshVertex], recipe: &RockRecipe) {
    let perlin = Perlin::new(recipe.seed);
    let base_size = Vec3::from_array(recipe.base_size);

    for v in vertices.iter_mut() {
        let dir = Vec3::from_array(v.position);
        let mut deformed = dir * base_size;

        let noise_val = perlin.get([dir.x as f64 * 2.0, dir.y as f64 * 2.0, dir.z as f64 * 2.0]) as f32;
        let displacement = noise_val * recipe.roughness * recipe.deformation;

        // Sharp rocks sit on a flattened base
        if recipe.rock_type == RockType::SharpRock && deformed.y < -0.2 * base_size.y {
            deformed.y *= 0.3;
        }

        let displaced = deformed + dir * displacement;
        v.position = displaced.to_array();

        // Spherical projection
        let u = 0.5 + dir.z.atan2(dir.x) / (2.0 * std::f32::consts::PI);
        let v_coord = 0.5 - dir.y.clamp(-1.0, 1.0).asin() / std::f32::consts::PI;
        v.uv = [u, v_coord];
    }
}
