//! Map generation configuration with inspector-style defaults and JSON persistence.

use std::path::Path;

use astral_procgen::{HexTileRecipe, MeshRecipe, RockRecipe};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::seed::UNSET_NOISE_SEED;

/// Everything one generation run reads. Immutable for the duration of a run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MapConfig {
    /// Grid columns.
    pub width: i32,
    /// Grid rows.
    pub height: i32,
    /// Corner-to-corner hex width in world units.
    pub tile_size: f32,
    /// Tiles merged into one renderable per layer before a batch is flushed.
    pub combine_threshold: usize,
    /// Leave an existing map alone instead of regenerating it.
    pub skip_generation_if_map_exists: bool,
    pub generate_mountain_ranges: bool,
    pub generate_map_objects: bool,
    /// Tile tilt in degrees about X and Z, applied to every tile transform.
    pub tile_rotation_offset: (f32, f32),
    /// Layer indices whose merged colliders are obstacles rather than ground.
    pub obstacle_layers: Vec<usize>,
    /// Seed of the placement random stream. Derived from the noise seed when absent.
    pub random_seed: Option<u64>,
    pub noise: NoiseSettings,
    pub mountains: MountainSettings,
    pub map_objects: MapObjectSettings,
    /// Ordered lowest to highest; thresholds are expected to be non-decreasing.
    pub layers: Vec<TerrainLayer>,
}

/// Elevation noise parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NoiseSettings {
    /// Coordinate offset; `-1` draws a fresh seed per run.
    pub seed: i32,
    /// Divisor applied to world coordinates for the first octave.
    pub base_frequency: f32,
    pub octaves: u32,
    pub persistence: f32,
    pub lacunarity: f32,
}

/// Mountain region placement and rock scattering.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MountainSettings {
    pub range_count: u32,
    /// Minimum (width, height) of a range rectangle in tiles.
    pub min_size: (i32, i32),
    /// Maximum (width, height) of a range rectangle in tiles, inclusive.
    pub max_size: (i32, i32),
    /// Minimum distance between range centers, in tiles.
    pub min_distance_between_ranges: f32,
    pub rock_prefabs: Vec<Prefab>,
    /// Probability that a mountain tile receives rocks.
    pub rock_density: f32,
    /// Inclusive (min, max) rocks placed on an accepted tile.
    pub rocks_per_tile: (u32, u32),
    pub rock_scale_range: (f32, f32),
    pub rock_height_offset: f32,
    /// Planar jitter radius around the tile center.
    pub rock_spread_radius: f32,
}

/// Beach and ground decoration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MapObjectSettings {
    /// Target number of objects, one per tile at most.
    pub target_count: usize,
    pub prefabs: Vec<Prefab>,
    pub scale_range: (f32, f32),
    pub height_offset: f32,
    pub spread_radius: f32,
    pub avoid_mountain_tiles: bool,
    pub excluded_layers: Vec<usize>,
}

/// One elevation band and the tile geometry drawn for it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TerrainLayer {
    pub threshold: f32,
    pub archetype: TileArchetype,
}

/// Tile geometry plus the material its merged renderables use.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TileArchetype {
    pub name: String,
    pub material: String,
    pub mesh: MeshRecipe,
}

/// Scatterable object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Prefab {
    pub name: String,
    pub mesh: MeshRecipe,
}

impl TerrainLayer {
    pub fn new(threshold: f32, name: &str, material: &str, tile_height: f32) -> Self {
        Self {
            threshold,
            archetype: TileArchetype {
                name: name.to_string(),
                material: material.to_string(),
                mesh: MeshRecipe::HexPrism(HexTileRecipe::new(1.0, tile_height)),
            },
        }
    }
}

impl Prefab {
    pub fn rock(name: &str, recipe: RockRecipe) -> Self {
        Self {
            name: name.to_string(),
            mesh: MeshRecipe::Rock(recipe),
        }
    }
}

// --- Default implementations ---

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: 50,
            height: 50,
            tile_size: 1.0,
            combine_threshold: 10,
            skip_generation_if_map_exists: false,
            generate_mountain_ranges: true,
            generate_map_objects: true,
            tile_rotation_offset: (0.0, 0.0),
            obstacle_layers: vec![2, 3],
            random_seed: None,
            noise: NoiseSettings::default(),
            mountains: MountainSettings::default(),
            map_objects: MapObjectSettings::default(),
            layers: vec![
                TerrainLayer::new(0.35, "beach", "sand", 0.1),
                TerrainLayer::new(0.45, "ground", "grass", 0.2),
                TerrainLayer::new(0.58, "hills", "rock", 0.5),
                TerrainLayer::new(0.7, "mountain", "stone", 1.0),
            ],
        }
    }
}

impl Default for NoiseSettings {
    fn default() -> Self {
        Self {
            seed: 45687254,
            base_frequency: 100.0,
            octaves: 3,
            persistence: 0.5,
            lacunarity: 2.0,
        }
    }
}

impl Default for MountainSettings {
    fn default() -> Self {
        Self {
            range_count: 3,
            min_size: (3, 3),
            max_size: (8, 8),
            min_distance_between_ranges: 5.0,
            rock_prefabs: vec![
                Prefab::rock("rock_boulder", RockRecipe::boulder().with_seed(11)),
                Prefab::rock("rock_sharp", RockRecipe::sharp_rock().with_seed(12)),
            ],
            rock_density: 0.7,
            rocks_per_tile: (1, 3),
            rock_scale_range: (0.6, 1.4),
            rock_height_offset: 0.5,
            rock_spread_radius: 1.5,
        }
    }
}

impl Default for MapObjectSettings {
    fn default() -> Self {
        Self {
            target_count: 100,
            prefabs: vec![
                Prefab::rock("river_stone", RockRecipe::river_stone().with_seed(21)),
                Prefab::rock("boulder_small", RockRecipe::boulder().with_seed(22)),
            ],
            scale_range: (0.8, 1.2),
            height_offset: 0.0,
            spread_radius: 0.8,
            avoid_mountain_tiles: true,
            excluded_layers: Vec::new(),
        }
    }
}

fn ordered<T: PartialOrd + Copy + std::fmt::Debug>(name: &str, pair: &mut (T, T)) {
    if pair.0 > pair.1 {
        log::warn!("{} {:?} is inverted, swapping", name, pair);
        *pair = (pair.1, pair.0);
    }
}

impl MapConfig {
    /// Repair values that would divide by zero or invert a random range.
    /// Each repair is logged; threshold ordering is left untouched.
    pub fn sanitized(mut self) -> Self {
        if self.width < 0 || self.height < 0 {
            log::warn!("Negative map size {}x{}, clamping to 0", self.width, self.height);
            self.width = self.width.max(0);
            self.height = self.height.max(0);
        }
        if !(self.tile_size > 0.0) {
            log::warn!("Tile size {} is not positive, using 1.0", self.tile_size);
            self.tile_size = 1.0;
        }
        if self.combine_threshold == 0 {
            log::warn!("Combine threshold 0, flushing every tile");
            self.combine_threshold = 1;
        }
        if !(self.noise.base_frequency > 0.0) {
            log::warn!("Base noise frequency {} is not positive, using 1.0", self.noise.base_frequency);
            self.noise.base_frequency = 1.0;
        }
        if !(self.noise.lacunarity > 0.0) {
            log::warn!("Lacunarity {} is not positive, using 1.0", self.noise.lacunarity);
            self.noise.lacunarity = 1.0;
        }
        if self.noise.seed < UNSET_NOISE_SEED {
            log::warn!("Noise seed {} below the unset sentinel, treating as unset", self.noise.seed);
            self.noise.seed = UNSET_NOISE_SEED;
        }

        let m = &mut self.mountains;
        m.min_size = (m.min_size.0.max(1), m.min_size.1.max(1));
        m.max_size = (m.max_size.0.max(1), m.max_size.1.max(1));
        let (mut widths, mut heights) = ((m.min_size.0, m.max_size.0), (m.min_size.1, m.max_size.1));
        ordered("Mountain width range", &mut widths);
        ordered("Mountain height range", &mut heights);
        m.min_size = (widths.0, heights.0);
        m.max_size = (widths.1, heights.1);
        ordered("Rocks per tile", &mut m.rocks_per_tile);
        ordered("Rock scale range", &mut m.rock_scale_range);
        m.rock_density = m.rock_density.clamp(0.0, 1.0);
        m.rock_spread_radius = m.rock_spread_radius.abs();

        let o = &mut self.map_objects;
        ordered("Map object scale range", &mut o.scale_range);
        o.spread_radius = o.spread_radius.abs();

        self
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(ConfigError::Parse)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Load a config file; missing fields fall back to their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Read)?;
        let config = Self::from_json_str(&contents)?;
        log::info!("Loaded map config from {}", path.display());
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(ConfigError::Write)?;
            }
        }
        let serialized = self.to_json_string()?;
        std::fs::write(path, serialized).map_err(ConfigError::Write)?;
        Ok(())
    }
}
