//! Grid scan that classifies every cell and merges tile geometry per layer in
//! bounded batches.

use std::sync::Arc;

use astral_procgen::{MeshData, MeshRecipe};
use glam::{EulerRot, Mat4, Quat, Vec3};

use crate::config::{MapConfig, TerrainLayer};
use crate::hex::GridCoord;
use crate::layers::{classify, collision_category};
use crate::mountains::MountainTileSet;
use crate::noise_util::NoiseField;
use crate::scene::{combined_mesh_name, CombinedMesh, MeshCollider};
use crate::tile_map::{TileMap, TileRecord};

/// Archetype geometry built once per run and shared by every tile of a layer
#[derive(Debug, Clone)]
pub struct LayerAsset {
    pub mesh: Arc<MeshData>,
    pub material: String,
    /// Extent along X that one grid step of `tile_size` should cover
    pub footprint: f32,
}

impl LayerAsset {
    pub fn from_layers(layers: &[TerrainLayer]) -> Vec<LayerAsset> {
        layers
            .iter()
            .map(|layer| {
                let mesh = layer.archetype.mesh.build();
                let footprint = match &layer.archetype.mesh {
                    MeshRecipe::HexPrism(recipe) => recipe.width,
                    _ => mesh.bounds().map_or(0.0, |b| b.size().x),
                };
                LayerAsset {
                    mesh: Arc::new(mesh),
                    material: layer.archetype.material.clone(),
                    footprint,
                }
            })
            .collect()
    }

    /// Horizontal scale that stretches the archetype to `tile_size`
    pub fn scale_for(&self, tile_size: f32) -> Vec3 {
        if self.footprint > 0.0 {
            let s = tile_size / self.footprint;
            Vec3::new(s, 1.0, s)
        } else {
            Vec3::ONE
        }
    }
}

/// Tile geometry waiting to be merged
#[derive(Debug, Clone)]
pub struct CombineInstance {
    pub coord: GridCoord,
    pub mesh: Arc<MeshData>,
    pub transform: Mat4,
}

/// Append-only buffer for one layer; its length is the running count.
#[derive(Debug, Default)]
struct CombineBatch {
    instances: Vec<CombineInstance>,
}

/// Per-layer tally of one grid scan
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerReport {
    pub tiles: usize,
    /// Instance count of each flushed batch, in flush order
    pub flushes: Vec<usize>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildReport {
    pub layers: Vec<LayerReport>,
    /// Cells dropped as water
    pub excluded: usize,
}

impl BuildReport {
    pub fn tiles_emitted(&self) -> usize {
        self.layers.iter().map(|l| l.tiles).sum()
    }

    pub fn flush_count(&self) -> usize {
        self.layers.iter().map(|l| l.flushes.len()).sum()
    }
}

pub struct GridOutput {
    /// Merged renderables in flush order
    pub combined: Vec<CombinedMesh>,
    pub tiles: TileMap,
    pub report: BuildReport,
}

pub struct GridBuilder<'a> {
    config: &'a MapConfig,
    noise: &'a NoiseField,
    mountains: &'a MountainTileSet,
    assets: &'a [LayerAsset],
}

impl<'a> GridBuilder<'a> {
    pub fn new(
        config: &'a MapConfig,
        noise: &'a NoiseField,
        mountains: &'a MountainTileSet,
        assets: &'a [LayerAsset],
    ) -> Self {
        Self {
            config,
            noise,
            mountains,
            assets,
        }
    }

    /// Visit every cell once, x outer and z inner.
    pub fn build(&self) -> GridOutput {
        let layer_count = self.config.layers.len();
        let threshold = self.config.combine_threshold.max(1);

        let mut batches: Vec<CombineBatch> = (0..layer_count).map(|_| CombineBatch::default()).collect();
        let mut report = BuildReport {
            layers: vec![LayerReport::default(); layer_count],
            excluded: 0,
        };
        let mut combined = Vec::new();
        let mut tiles = TileMap::new();

        if layer_count == 0 {
            log::warn!("No terrain layers configured, grid is empty");
            return GridOutput { combined, tiles, report };
        }

        let (tilt_x, tilt_z) = self.config.tile_rotation_offset;
        let rotation = Quat::from_euler(EulerRot::YXZ, 0.0, tilt_x.to_radians(), tilt_z.to_radians());
        let scales: Vec<Vec3> = self
            .assets
            .iter()
            .map(|asset| asset.scale_for(self.config.tile_size))
            .collect();

        for x in 0..self.config.width {
            for z in 0..self.config.height {
                let coord = GridCoord::new(x, z);
                let world = coord.to_world(self.config.tile_size);
                let noise = self.noise.sample(world);
                let mountain = self.mountains.contains(coord);

                let Some(layer) = classify(noise, mountain, &self.config.layers) else {
                    report.excluded += 1;
                    continue;
                };

                tiles.insert(TileRecord {
                    coord,
                    world,
                    noise,
                    layer,
                    mountain,
                    category: collision_category(layer, &self.config.obstacle_layers),
                });

                let transform = Mat4::from_scale_rotation_translation(
                    scales[layer],
                    rotation,
                    Vec3::new(world.x, 0.0, world.y),
                );
                batches[layer].instances.push(CombineInstance {
                    coord,
                    mesh: Arc::clone(&self.assets[layer].mesh),
                    transform,
                });
                report.layers[layer].tiles += 1;

                if batches[layer].instances.len() >= threshold {
                    combined.push(self.flush(layer, &mut batches[layer], &mut report.layers[layer]));
                }
            }
        }

        for (layer, batch) in batches.iter_mut().enumerate() {
            if !batch.instances.is_empty() {
                combined.push(self.flush(layer, batch, &mut report.layers[layer]));
            }
        }

        log::info!(
            "Built {} tiles into {} merged meshes ({} water cells skipped)",
            report.tiles_emitted(),
            combined.len(),
            report.excluded
        );

        GridOutput { combined, tiles, report }
    }

    fn flush(&self, layer: usize, batch: &mut CombineBatch, layer_report: &mut LayerReport) -> CombinedMesh {
        let merged = MeshData::combine(
            batch
                .instances
                .iter()
                .map(|instance| (instance.mesh.as_ref(), instance.transform)),
        );
        let instance_count = batch.instances.len();
        batch.instances.clear();

        let name = combined_mesh_name(layer);
        log::debug!("Flushed {} tiles into {}", instance_count, name);
        layer_report.flushes.push(instance_count);

        let collider = MeshCollider {
            category: collision_category(layer, &self.config.obstacle_layers),
            bounds: merged.bounds(),
        };

        CombinedMesh {
            name,
            layer,
            mesh: Arc::new(merged),
            material: self.assets[layer].material.clone(),
            collider,
            instance_count,
        }
    }
}
