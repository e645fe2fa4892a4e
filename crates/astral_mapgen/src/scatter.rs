//! Rock and map-object scattering.
//!
//! Both scatterers are resumable: `step` places at most about
//! [`PLACEMENTS_PER_YIELD`] objects and returns, so a frame-paced host can
//! spread the work across turns. Draw order from the random stream is the same
//! however the work is split.

use std::sync::Arc;

use astral_procgen::MeshData;
use glam::{EulerRot, Quat, Vec2, Vec3};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::{MapConfig, MapObjectSettings, MountainSettings, Prefab};
use crate::hex::GridCoord;
use crate::layers::classify_by_noise;
use crate::mountains::MountainTileSet;
use crate::noise_util::NoiseField;
use crate::scene::PlacedObject;

/// Placements between two cooperative yields
pub const PLACEMENTS_PER_YIELD: usize = 20;

const ROCK_VERTICAL_JITTER: (f32, f32) = (-0.2, 0.3);
const ROCK_MAX_TILT_DEGREES: f32 = 15.0;
const OBJECT_VERTICAL_JITTER: (f32, f32) = (-0.1, 0.2);
const OBJECT_MAX_TILT_DEGREES: f32 = 5.0;

/// Prefab geometry built once per run
#[derive(Debug, Clone)]
pub struct PrefabAsset {
    pub name: String,
    pub mesh: Arc<MeshData>,
}

impl PrefabAsset {
    pub fn from_prefabs(prefabs: &[Prefab]) -> Vec<PrefabAsset> {
        prefabs
            .iter()
            .map(|prefab| PrefabAsset {
                name: prefab.name.clone(),
                mesh: Arc::new(prefab.mesh.build()),
            })
            .collect()
    }
}

/// Inclusive float draw; degenerate or inverted ranges yield `min`.
fn range_f32<R: Rng>(rng: &mut R, min: f32, max: f32) -> f32 {
    if min < max {
        rng.gen_range(min..=max)
    } else {
        min
    }
}

/// Random local variation applied around a tile center
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JitterProfile {
    pub spread_radius: f32,
    pub height_offset: f32,
    pub vertical_jitter: (f32, f32),
    /// Max pitch and roll in degrees; yaw is always a full turn
    pub max_tilt: f32,
    pub scale_range: (f32, f32),
}

impl JitterProfile {
    pub fn rocks(settings: &MountainSettings) -> Self {
        Self {
            spread_radius: settings.rock_spread_radius,
            height_offset: settings.rock_height_offset,
            vertical_jitter: ROCK_VERTICAL_JITTER,
            max_tilt: ROCK_MAX_TILT_DEGREES,
            scale_range: settings.rock_scale_range,
        }
    }

    pub fn objects(settings: &MapObjectSettings) -> Self {
        Self {
            spread_radius: settings.spread_radius,
            height_offset: settings.height_offset,
            vertical_jitter: OBJECT_VERTICAL_JITTER,
            max_tilt: OBJECT_MAX_TILT_DEGREES,
            scale_range: settings.scale_range,
        }
    }

    /// Draws position (x, y, z), then pitch, yaw, roll, then scale.
    pub fn sample<R: Rng>(&self, center: Vec2, rng: &mut R) -> (Vec3, Quat, f32) {
        let spread = self.spread_radius;
        let offset = Vec3::new(
            range_f32(rng, -spread, spread),
            range_f32(rng, self.vertical_jitter.0, self.vertical_jitter.1),
            range_f32(rng, -spread, spread),
        );
        let position = Vec3::new(center.x, self.height_offset, center.y) + offset;

        let pitch = range_f32(rng, -self.max_tilt, self.max_tilt);
        let yaw = range_f32(rng, 0.0, 360.0);
        let roll = range_f32(rng, -self.max_tilt, self.max_tilt);
        let rotation = Quat::from_euler(
            EulerRot::YXZ,
            yaw.to_radians(),
            pitch.to_radians(),
            roll.to_radians(),
        );

        let scale = range_f32(rng, self.scale_range.0, self.scale_range.1);
        (position, rotation, scale)
    }
}

/// Rocks on mountain tiles, visited in the set's insertion order
pub struct RockScatter {
    candidates: Vec<GridCoord>,
    prefabs: Vec<PrefabAsset>,
    density: f32,
    rocks_per_tile: (u32, u32),
    tile_size: f32,
    profile: JitterProfile,
    cursor: usize,
    placed: usize,
}

impl RockScatter {
    pub fn new(
        settings: &MountainSettings,
        tiles: &MountainTileSet,
        prefabs: Vec<PrefabAsset>,
        tile_size: f32,
    ) -> Self {
        if prefabs.is_empty() {
            log::warn!("No rock prefabs configured, skipping rock placement");
        } else if tiles.is_empty() {
            log::warn!("No mountain tiles to place rocks on");
        }

        Self {
            candidates: tiles.iter().collect(),
            prefabs,
            density: settings.rock_density,
            rocks_per_tile: settings.rocks_per_tile,
            tile_size,
            profile: JitterProfile::rocks(settings),
            cursor: 0,
            placed: 0,
        }
    }

    pub fn is_done(&self) -> bool {
        self.prefabs.is_empty() || self.cursor >= self.candidates.len()
    }

    pub fn placed(&self) -> usize {
        self.placed
    }

    /// Visit tiles until at least [`PLACEMENTS_PER_YIELD`] rocks were placed or
    /// the candidates run out. Returns the number placed by this call.
    pub fn step<R: Rng>(&mut self, rng: &mut R, out: &mut Vec<PlacedObject>) -> usize {
        let start = self.placed;
        while !self.is_done() && self.placed - start < PLACEMENTS_PER_YIELD {
            let coord = self.candidates[self.cursor];
            self.cursor += 1;
            self.place_on_tile(coord, rng, out);
        }

        if self.is_done() && !self.prefabs.is_empty() {
            log::info!("Placed {} rocks on mountain ranges", self.placed);
        }
        self.placed - start
    }

    pub fn run_to_end<R: Rng>(&mut self, rng: &mut R, out: &mut Vec<PlacedObject>) -> usize {
        let start = self.placed;
        while !self.is_done() {
            self.step(rng, out);
        }
        self.placed - start
    }

    fn place_on_tile<R: Rng>(&mut self, coord: GridCoord, rng: &mut R, out: &mut Vec<PlacedObject>) {
        if rng.gen::<f32>() >= self.density {
            return;
        }

        let center = coord.to_world(self.tile_size);
        let (min, max) = self.rocks_per_tile;
        let count = rng.gen_range(min..=max.max(min));

        for i in 0..count {
            let (position, rotation, scale) = self.profile.sample(center, rng);
            let prefab = rng.gen_range(0..self.prefabs.len());

            out.push(PlacedObject {
                name: format!("Rock_{}_{}_{}", coord.x, coord.z, i),
                coord,
                prefab,
                position,
                rotation,
                scale,
                mesh: Arc::clone(&self.prefabs[prefab].mesh),
            });
            self.placed += 1;
        }
    }
}

/// Tiles eligible for general objects, in scan order (x outer, z inner).
///
/// Only beach and ground tiles (noise layer 0 or 1) qualify, and the excluded
/// layer list is applied on top of that.
pub fn collect_map_object_candidates(
    config: &MapConfig,
    noise: &NoiseField,
    mountains: &MountainTileSet,
) -> Vec<GridCoord> {
    let Some(first) = config.layers.first() else {
        log::warn!("No terrain layers configured, no map object candidates");
        return Vec::new();
    };
    let settings = &config.map_objects;

    let mut candidates = Vec::new();
    for x in 0..config.width {
        for z in 0..config.height {
            let coord = GridCoord::new(x, z);
            if settings.avoid_mountain_tiles && mountains.contains(coord) {
                continue;
            }

            let value = noise.sample(coord.to_world(config.tile_size));
            let layer = classify_by_noise(value, &config.layers);

            if layer != 0 && layer != 1 {
                continue;
            }
            if settings.excluded_layers.contains(&layer) {
                continue;
            }
            if value < first.threshold {
                continue;
            }
            candidates.push(coord);
        }
    }

    log::debug!("Found {} candidate tiles for map objects", candidates.len());
    candidates
}

/// One object per shuffled candidate tile until the target count is met
pub struct ObjectScatter {
    candidates: Vec<GridCoord>,
    prefabs: Vec<PrefabAsset>,
    target: usize,
    tile_size: f32,
    profile: JitterProfile,
    cursor: usize,
}

impl ObjectScatter {
    /// Shuffles the candidates, drawing from `rng`.
    pub fn new<R: Rng>(
        settings: &MapObjectSettings,
        mut candidates: Vec<GridCoord>,
        prefabs: Vec<PrefabAsset>,
        tile_size: f32,
        rng: &mut R,
    ) -> Self {
        if prefabs.is_empty() {
            log::warn!("No map object prefabs configured, skipping map objects");
        } else if candidates.is_empty() {
            log::warn!("No valid tiles found for map objects");
        } else {
            candidates.shuffle(rng);
        }

        Self {
            candidates,
            prefabs,
            target: settings.target_count,
            tile_size,
            profile: JitterProfile::objects(settings),
            cursor: 0,
        }
    }

    pub fn candidate_count(&self) -> usize {
        self.candidates.len()
    }

    pub fn placed(&self) -> usize {
        self.cursor
    }

    pub fn is_done(&self) -> bool {
        self.prefabs.is_empty() || self.cursor >= self.candidates.len() || self.cursor >= self.target
    }

    /// Place up to [`PLACEMENTS_PER_YIELD`] objects. Returns the number placed.
    pub fn step<R: Rng>(&mut self, rng: &mut R, out: &mut Vec<PlacedObject>) -> usize {
        let start = self.cursor;
        while !self.is_done() && self.cursor - start < PLACEMENTS_PER_YIELD {
            let coord = self.candidates[self.cursor];
            let (position, rotation, scale) = self.profile.sample(coord.to_world(self.tile_size), rng);
            let prefab = rng.gen_range(0..self.prefabs.len());

            out.push(PlacedObject {
                name: format!("MapObject_{}_{}", coord.x, coord.z),
                coord,
                prefab,
                position,
                rotation,
                scale,
                mesh: Arc::clone(&self.prefabs[prefab].mesh),
            });
            self.cursor += 1;
        }

        if self.is_done() && !self.prefabs.is_empty() {
            log::info!(
                "Placed {} map objects on beach/ground tiles (target was {})",
                self.cursor,
                self.target
            );
        }
        self.cursor - start
    }

    pub fn run_to_end<R: Rng>(&mut self, rng: &mut R, out: &mut Vec<PlacedObject>) -> usize {
        let start = self.cursor;
        while !self.is_done() {
            self.step(rng, out);
        }
        self.cursor - start
    }
}
