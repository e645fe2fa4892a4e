//! Hex terrain generation: mountain planning, layer classification, merged
//! tile meshes and object scattering, driven by [`MapGenerator`].

pub mod config;
pub mod error;
pub mod generator;
pub mod grid_builder;
pub mod hex;
pub mod layers;
pub mod mountains;
pub mod noise_util;
pub mod scatter;
pub mod scene;
pub mod seed;
pub mod tile_map;

// Re-export commonly used items
pub use config::{MapConfig, MapObjectSettings, MountainSettings, NoiseSettings, Prefab, TerrainLayer, TileArchetype};
pub use error::ConfigError;
pub use generator::{
    GeneratedMap, GenerationOutcome, GenerationStage, GenerationStats, MapGenerator, NoopHooks, PostGenerationHooks,
};
pub use grid_builder::{BuildReport, GridBuilder, GridOutput, LayerReport};
pub use hex::{hex_to_world, GridCoord};
pub use layers::{classify, classify_by_noise, collision_category, CollisionCategory};
pub use mountains::{MountainPlanner, MountainRange, MountainTileSet};
pub use noise_util::NoiseField;
pub use scatter::{collect_map_object_candidates, ObjectScatter, RockScatter, PLACEMENTS_PER_YIELD};
pub use scene::{CombinedMesh, MapScene, ObjectGroup, PlacedObject};
pub use seed::WorldSeed;
pub use tile_map::{TileMap, TileRecord};
