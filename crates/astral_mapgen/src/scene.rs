//! Generated scene content: merged tile renderables and scattered object groups.

use std::sync::Arc;

use astral_procgen::{Aabb, MeshData};
use glam::{Quat, Vec3};

use crate::hex::GridCoord;
use crate::layers::CollisionCategory;

pub const COMBINED_MESH_PREFIX: &str = "CombinedMesh_Layer_";
pub const MOUNTAIN_ROCKS_GROUP: &str = "Mountain_Rocks";
pub const MAP_OBJECTS_GROUP: &str = "Map_Objects";

pub fn combined_mesh_name(layer: usize) -> String {
    format!("{}{}", COMBINED_MESH_PREFIX, layer)
}

/// Collision volume built from a merged mesh
#[derive(Debug, Clone, PartialEq)]
pub struct MeshCollider {
    pub category: CollisionCategory,
    pub bounds: Option<Aabb>,
}

/// One flushed combine batch
#[derive(Debug, Clone)]
pub struct CombinedMesh {
    pub name: String,
    pub layer: usize,
    pub mesh: Arc<MeshData>,
    pub material: String,
    pub collider: MeshCollider,
    /// Tiles merged into this renderable
    pub instance_count: usize,
}

/// A scattered prefab instance
#[derive(Debug, Clone)]
pub struct PlacedObject {
    pub name: String,
    pub coord: GridCoord,
    pub prefab: usize,
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: f32,
    pub mesh: Arc<MeshData>,
}

#[derive(Debug, Clone)]
pub struct ObjectGroup {
    pub name: String,
    pub objects: Vec<PlacedObject>,
}

/// Stand-in for the host scene node the generator parents its output under.
///
/// Merged meshes come first in child order, followed by object groups in
/// creation order.
#[derive(Debug, Default)]
pub struct MapScene {
    meshes: Vec<CombinedMesh>,
    groups: Vec<ObjectGroup>,
    dirty: bool,
}

impl MapScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_combined(&mut self, mesh: CombinedMesh) {
        self.meshes.push(mesh);
    }

    pub fn child_count(&self) -> usize {
        self.meshes.len() + self.groups.len()
    }

    pub fn child_names(&self) -> impl Iterator<Item = &str> {
        self.meshes
            .iter()
            .map(|m| m.name.as_str())
            .chain(self.groups.iter().map(|g| g.name.as_str()))
    }

    pub fn combined_meshes(&self) -> impl Iterator<Item = &CombinedMesh> {
        self.meshes.iter()
    }

    pub fn combined_meshes_in_layer(&self, layer: usize) -> usize {
        self.meshes.iter().filter(|m| m.layer == layer).count()
    }

    pub fn group(&self, name: &str) -> Option<&ObjectGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// Group by name, created empty on first use
    pub fn group_mut(&mut self, name: &str) -> &mut ObjectGroup {
        let slot = match self.groups.iter().position(|g| g.name == name) {
            Some(slot) => slot,
            None => {
                self.groups.push(ObjectGroup {
                    name: name.to_string(),
                    objects: Vec::new(),
                });
                self.groups.len() - 1
            }
        };
        &mut self.groups[slot]
    }

    /// Prior output is recognized by the merged-mesh naming convention.
    pub fn has_combined_mesh(&self) -> bool {
        self.child_names().any(|name| name.contains(COMBINED_MESH_PREFIX))
    }

    /// Remove every child. Returns how many were removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.child_count();
        self.meshes.clear();
        self.groups.clear();
        removed
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Called by the host once it has persisted the scene
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }
}
