//! Generation pipeline and its two entry points.
//!
//! A run moves through `Idle -> MountainsPlanned -> GridBuilt -> RocksPlaced ->
//! ObjectsPlaced -> ScanRequested -> Done`. [`MapGenerator::tick`] advances by
//! one bounded unit of work (one mountain region, the whole grid, or a slice of
//! placements) so a frame-paced host can interleave it with other work.
//! [`MapGenerator::regenerate`] drives the same ticks to completion, which is
//! why both modes produce identical maps.

use rand_chacha::ChaCha8Rng;

use crate::config::MapConfig;
use crate::grid_builder::{BuildReport, GridBuilder, LayerAsset};
use crate::hex::GridCoord;
use crate::layers::CollisionCategory;
use crate::mountains::{MountainPlanner, MountainRange, MountainTileSet};
use crate::noise_util::NoiseField;
use crate::scatter::{collect_map_object_candidates, ObjectScatter, PrefabAsset, RockScatter};
use crate::scene::{MapScene, MAP_OBJECTS_GROUP, MOUNTAIN_ROCKS_GROUP};
use crate::seed::{placement_rng, resolve_noise_seed};
use crate::tile_map::{TileMap, TileRecord};

/// Last completed stage of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GenerationStage {
    Idle,
    MountainsPlanned,
    GridBuilt,
    RocksPlaced,
    ObjectsPlaced,
    ScanRequested,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// A cooperative run was set up; drive it with `tick`.
    Started,
    /// The pipeline ran to `Done`.
    Completed,
    /// Existing content was kept because of `skip_generation_if_map_exists`.
    Skipped,
}

/// Downstream collaborators notified once the map exists.
///
/// Called in order after objects are placed. Nothing they do is observed by
/// the generator.
pub trait PostGenerationHooks {
    fn rescan_navigation(&mut self, map: &GeneratedMap);
    fn spawn_resources(&mut self, map: &GeneratedMap);
}

/// Hooks for callers without collaborators
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHooks;

impl PostGenerationHooks for NoopHooks {
    fn rescan_navigation(&mut self, _map: &GeneratedMap) {}
    fn spawn_resources(&mut self, _map: &GeneratedMap) {}
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationStats {
    pub noise_seed: i32,
    pub mountain_ranges: usize,
    pub mountain_tiles: usize,
    pub tiles: usize,
    pub water_cells: usize,
    pub combined_meshes: usize,
    pub rocks: usize,
    pub objects: usize,
    /// Candidate tiles the object scatter could choose from
    pub object_candidates: usize,
}

/// Result of a finished run, kept for downstream ground lookups
#[derive(Debug, Clone, Default)]
pub struct GeneratedMap {
    pub ranges: Vec<MountainRange>,
    pub mountain_tiles: MountainTileSet,
    pub tiles: TileMap,
    pub report: BuildReport,
    pub stats: GenerationStats,
}

impl GeneratedMap {
    pub fn tile(&self, coord: GridCoord) -> Option<&TileRecord> {
        self.tiles.get(coord)
    }

    /// `None` for water or out-of-map cells
    pub fn layer_at(&self, coord: GridCoord) -> Option<usize> {
        self.tile(coord).map(|t| t.layer)
    }

    pub fn category_at(&self, coord: GridCoord) -> Option<CollisionCategory> {
        self.tile(coord).map(|t| t.category)
    }

    pub fn is_mountain(&self, coord: GridCoord) -> bool {
        self.mountain_tiles.contains(coord)
    }
}

/// State owned by one run. Replaced wholesale on every start.
struct GenerationRun {
    stage: GenerationStage,
    rng: ChaCha8Rng,
    noise: NoiseField,
    regions_attempted: u32,
    map: GeneratedMap,
    rocks: Option<RockScatter>,
    objects: Option<ObjectScatter>,
}

impl GenerationRun {
    fn new(config: &MapConfig) -> Self {
        let mut rng = placement_rng(config.random_seed, config.noise.seed);
        let noise_seed = resolve_noise_seed(config.noise.seed, &mut rng);
        let noise = NoiseField::new(&config.noise, noise_seed);

        let mut map = GeneratedMap::default();
        map.stats.noise_seed = noise_seed;

        Self {
            stage: GenerationStage::Idle,
            rng,
            noise,
            regions_attempted: 0,
            map,
            rocks: None,
            objects: None,
        }
    }
}

pub struct MapGenerator {
    config: MapConfig,
    scene: MapScene,
    run: Option<GenerationRun>,
    generated: Option<GeneratedMap>,
}

impl MapGenerator {
    pub fn new(config: MapConfig) -> Self {
        Self::with_scene(config, MapScene::new())
    }

    /// Attach to a scene that may already hold content from an earlier session
    pub fn with_scene(config: MapConfig, scene: MapScene) -> Self {
        Self {
            config: config.sanitized(),
            scene,
            run: None,
            generated: None,
        }
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    /// Takes effect on the next start or regenerate.
    pub fn set_config(&mut self, config: MapConfig) {
        self.config = config.sanitized();
    }

    pub fn scene(&self) -> &MapScene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut MapScene {
        &mut self.scene
    }

    /// Output of the last run that got past object placement
    pub fn generated(&self) -> Option<&GeneratedMap> {
        self.generated.as_ref()
    }

    pub fn stage(&self) -> GenerationStage {
        self.run.as_ref().map_or(GenerationStage::Idle, |run| run.stage)
    }

    pub fn is_running(&self) -> bool {
        self.run.as_ref().is_some_and(|run| run.stage != GenerationStage::Done)
    }

    pub fn has_existing_generated_content(&self) -> bool {
        self.scene.has_combined_mesh()
    }

    /// Drop every generated child and all run state. Safe to repeat.
    pub fn clear_generated(&mut self) {
        let removed = self.scene.clear();
        self.run = None;
        self.generated = None;
        if removed > 0 {
            log::info!("Cleared {} generated scene children", removed);
        }
    }

    fn should_skip(&self) -> bool {
        if self.config.skip_generation_if_map_exists && self.has_existing_generated_content() {
            log::info!("Map generation skipped, existing map detected and skip option is enabled");
            return true;
        }
        false
    }

    /// Clear prior output and set up a cooperative run.
    pub fn start(&mut self) -> GenerationOutcome {
        if self.should_skip() {
            return GenerationOutcome::Skipped;
        }
        self.clear_generated();
        self.run = Some(GenerationRun::new(&self.config));
        log::info!(
            "Generating {}x{} map with noise seed {}",
            self.config.width,
            self.config.height,
            self.run.as_ref().map_or(0, |run| run.map.stats.noise_seed)
        );
        GenerationOutcome::Started
    }

    /// Clear prior output and run the whole pipeline now.
    pub fn regenerate(&mut self, hooks: &mut dyn PostGenerationHooks) -> GenerationOutcome {
        if self.start() == GenerationOutcome::Skipped {
            return GenerationOutcome::Skipped;
        }
        while self.tick(hooks) != GenerationStage::Done {}
        self.scene.mark_dirty();
        GenerationOutcome::Completed
    }

    /// Advance the current run by one unit of work and report the stage reached.
    /// Without a run this does nothing and reports `Idle`.
    pub fn tick(&mut self, hooks: &mut dyn PostGenerationHooks) -> GenerationStage {
        let Some(mut run) = self.run.take() else {
            return GenerationStage::Idle;
        };

        let current = run.stage;
        run.stage = match current {
            GenerationStage::Idle => self.plan_next_region(&mut run),
            GenerationStage::MountainsPlanned => self.build_grid(&mut run),
            GenerationStage::GridBuilt => self.place_rocks(&mut run),
            GenerationStage::RocksPlaced => self.place_objects(&mut run),
            GenerationStage::ObjectsPlaced => {
                let map = std::mem::take(&mut run.map);
                let generated = self.generated.insert(map);
                hooks.rescan_navigation(generated);
                GenerationStage::ScanRequested
            }
            GenerationStage::ScanRequested => {
                if let Some(generated) = &self.generated {
                    hooks.spawn_resources(generated);
                    log::info!("Map generation complete: {:?}", generated.stats);
                }
                GenerationStage::Done
            }
            GenerationStage::Done => GenerationStage::Done,
        };

        let stage = run.stage;
        self.run = Some(run);
        stage
    }

    fn plan_next_region(&self, run: &mut GenerationRun) -> GenerationStage {
        let settings = &self.config.mountains;
        let planner = MountainPlanner::new(settings, self.config.width, self.config.height);

        if self.config.generate_mountain_ranges && run.regions_attempted < planner.range_count() {
            if let Some(range) = planner.plan_region(&run.map.ranges, &mut run.rng) {
                run.map.ranges.push(range);
            }
            run.regions_attempted += 1;
            if run.regions_attempted < planner.range_count() {
                return GenerationStage::Idle;
            }
        }

        run.map.mountain_tiles = MountainTileSet::from_ranges(&run.map.ranges);
        run.map.stats.mountain_ranges = run.map.ranges.len();
        run.map.stats.mountain_tiles = run.map.mountain_tiles.len();
        if self.config.generate_mountain_ranges {
            log::info!(
                "Generated {} mountain ranges with a total of {} mountain tiles",
                run.map.ranges.len(),
                run.map.mountain_tiles.len()
            );
        }
        GenerationStage::MountainsPlanned
    }

    fn build_grid(&mut self, run: &mut GenerationRun) -> GenerationStage {
        let assets = LayerAsset::from_layers(&self.config.layers);
        let output = GridBuilder::new(&self.config, &run.noise, &run.map.mountain_tiles, &assets).build();

        run.map.stats.tiles = output.tiles.len();
        run.map.stats.water_cells = output.report.excluded;
        run.map.stats.combined_meshes = output.combined.len();
        run.map.tiles = output.tiles;
        run.map.report = output.report;

        for mesh in output.combined {
            self.scene.add_combined(mesh);
        }
        GenerationStage::GridBuilt
    }

    fn place_rocks(&mut self, run: &mut GenerationRun) -> GenerationStage {
        let settings = &self.config.mountains;
        if !self.config.generate_mountain_ranges {
            return GenerationStage::RocksPlaced;
        }
        if settings.rock_prefabs.is_empty() {
            log::warn!("No rock prefabs configured, skipping mountain rocks");
            return GenerationStage::RocksPlaced;
        }

        let scatter = run.rocks.get_or_insert_with(|| {
            RockScatter::new(
                settings,
                &run.map.mountain_tiles,
                PrefabAsset::from_prefabs(&settings.rock_prefabs),
                self.config.tile_size,
            )
        });

        let group = self.scene.group_mut(MOUNTAIN_ROCKS_GROUP);
        scatter.step(&mut run.rng, &mut group.objects);
        run.map.stats.rocks = scatter.placed();

        if scatter.is_done() {
            run.rocks = None;
            GenerationStage::RocksPlaced
        } else {
            GenerationStage::GridBuilt
        }
    }

    fn place_objects(&mut self, run: &mut GenerationRun) -> GenerationStage {
        let settings = &self.config.map_objects;
        if !self.config.generate_map_objects {
            return GenerationStage::ObjectsPlaced;
        }
        if settings.prefabs.is_empty() {
            log::warn!("No map object prefabs configured, skipping map objects");
            return GenerationStage::ObjectsPlaced;
        }

        if run.objects.is_none() {
            let candidates = collect_map_object_candidates(&self.config, &run.noise, &run.map.mountain_tiles);
            run.map.stats.object_candidates = candidates.len();
            run.objects = Some(ObjectScatter::new(
                settings,
                candidates,
                PrefabAsset::from_prefabs(&settings.prefabs),
                self.config.tile_size,
                &mut run.rng,
            ));
        }

        let group = self.scene.group_mut(MAP_OBJECTS_GROUP);
        let Some(scatter) = run.objects.as_mut() else {
            return GenerationStage::ObjectsPlaced;
        };
        scatter.step(&mut run.rng, &mut group.objects);
        run.map.stats.objects = scatter.placed();

        if scatter.is_done() {
            run.objects = None;
            GenerationStage::ObjectsPlaced
        } else {
            GenerationStage::RocksPlaced
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Prefab, TerrainLayer};
    use crate::scene::PlacedObject;
    use astral_procgen::RockRecipe;

    fn small_config() -> MapConfig {
        let mut config = MapConfig {
            width: 24,
            height: 24,
            random_seed: Some(1234),
            ..Default::default()
        };
        config.noise.base_frequency = 10.0;
        config.mountains.range_count = 3;
        config.mountains.min_size = (4, 4);
        config.mountains.max_size = (7, 7);
        config.mountains.rock_prefabs = vec![Prefab::rock("rock", RockRecipe::sharp_rock().with_seed(3))];
        config.map_objects.target_count = 40;
        config.map_objects.prefabs = vec![Prefab::rock("stone", RockRecipe::sharp_rock().with_seed(4))];
        config
    }

    #[derive(Default)]
    struct RecordingHooks {
        calls: Vec<&'static str>,
        tiles_seen: usize,
    }

    impl PostGenerationHooks for RecordingHooks {
        fn rescan_navigation(&mut self, map: &GeneratedMap) {
            self.calls.push("scan");
            self.tiles_seen = map.tiles.len();
        }

        fn spawn_resources(&mut self, _map: &GeneratedMap) {
            self.calls.push("spawn");
        }
    }

    fn layers_of(generator: &MapGenerator) -> Vec<(GridCoord, usize)> {
        generator
            .generated()
            .map(|g| g.tiles.iter().map(|t| (t.coord, t.layer)).collect())
            .unwrap_or_default()
    }

    fn objects_in(generator: &MapGenerator, group: &str) -> Vec<(String, [f32; 3], usize)> {
        generator
            .scene()
            .group(group)
            .map(|g| {
                g.objects
                    .iter()
                    .map(|o: &PlacedObject| (o.name.clone(), o.position.to_array(), o.prefab))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn combined_sizes(generator: &MapGenerator) -> Vec<(String, usize)> {
        generator
            .scene()
            .combined_meshes()
            .map(|m| (m.name.clone(), m.instance_count))
            .collect()
    }

    #[test]
    fn test_regenerate_completes() {
        let mut generator = MapGenerator::new(small_config());
        let mut hooks = RecordingHooks::default();

        assert_eq!(generator.regenerate(&mut hooks), GenerationOutcome::Completed);
        assert_eq!(generator.stage(), GenerationStage::Done);
        assert!(!generator.is_running());
        assert!(generator.scene().is_dirty());
        assert!(generator.has_existing_generated_content());
        assert_eq!(hooks.calls, vec!["scan", "spawn"]);

        let generated = generator.generated().unwrap();
        assert_eq!(hooks.tiles_seen, generated.tiles.len());
        assert_eq!(generated.stats.combined_meshes, generator.scene().combined_meshes().count());
        assert!(generated.stats.objects <= 40usize.min(generated.stats.object_candidates));
    }

    #[test]
    fn test_cooperative_matches_synchronous() {
        let mut sync = MapGenerator::new(small_config());
        sync.regenerate(&mut NoopHooks);

        let mut coop = MapGenerator::new(small_config());
        assert_eq!(coop.start(), GenerationOutcome::Started);
        let mut ticks = 0;
        let mut stages = Vec::new();
        while coop.tick(&mut NoopHooks) != GenerationStage::Done {
            stages.push(coop.stage());
            ticks += 1;
        }

        assert!(ticks >= 6);
        assert!(stages.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(layers_of(&sync), layers_of(&coop));
        assert_eq!(
            sync.generated().unwrap().ranges,
            coop.generated().unwrap().ranges
        );
        assert_eq!(combined_sizes(&sync), combined_sizes(&coop));
        assert_eq!(
            objects_in(&sync, MOUNTAIN_ROCKS_GROUP),
            objects_in(&coop, MOUNTAIN_ROCKS_GROUP)
        );
        assert_eq!(
            objects_in(&sync, MAP_OBJECTS_GROUP),
            objects_in(&coop, MAP_OBJECTS_GROUP)
        );
        assert_eq!(sync.generated().unwrap().stats, coop.generated().unwrap().stats);
    }

    #[test]
    fn test_one_region_per_tick() {
        let mut config = small_config();
        config.mountains.range_count = 4;
        let mut generator = MapGenerator::new(config);
        generator.start();

        for _ in 0..3 {
            assert_eq!(generator.tick(&mut NoopHooks), GenerationStage::Idle);
        }
        assert_eq!(generator.tick(&mut NoopHooks), GenerationStage::MountainsPlanned);
        assert_eq!(generator.tick(&mut NoopHooks), GenerationStage::GridBuilt);
    }

    #[test]
    fn test_regenerate_is_idempotent() {
        let mut once = MapGenerator::new(small_config());
        once.regenerate(&mut NoopHooks);

        let mut twice = MapGenerator::new(small_config());
        twice.regenerate(&mut NoopHooks);
        twice.regenerate(&mut NoopHooks);

        assert_eq!(layers_of(&once), layers_of(&twice));
        assert_eq!(combined_sizes(&once), combined_sizes(&twice));
        assert_eq!(once.scene().child_count(), twice.scene().child_count());
        assert_eq!(
            objects_in(&once, MAP_OBJECTS_GROUP),
            objects_in(&twice, MAP_OBJECTS_GROUP)
        );
    }

    #[test]
    fn test_skip_guard_keeps_existing_map() {
        let mut config = small_config();
        config.skip_generation_if_map_exists = true;
        let mut generator = MapGenerator::new(config);

        assert_eq!(generator.regenerate(&mut NoopHooks), GenerationOutcome::Completed);
        let before = combined_sizes(&generator);

        let mut hooks = RecordingHooks::default();
        assert_eq!(generator.regenerate(&mut hooks), GenerationOutcome::Skipped);
        assert_eq!(generator.start(), GenerationOutcome::Skipped);
        assert!(hooks.calls.is_empty());
        assert_eq!(combined_sizes(&generator), before);
        assert!(generator.generated().is_some());
    }

    #[test]
    fn test_clear_generated() {
        let mut generator = MapGenerator::new(small_config());
        generator.regenerate(&mut NoopHooks);

        generator.clear_generated();
        assert!(!generator.has_existing_generated_content());
        assert!(generator.scene().child_count() == 0);
        assert!(generator.generated().is_none());
        assert_eq!(generator.stage(), GenerationStage::Idle);

        generator.clear_generated();
        assert!(generator.scene().child_count() == 0);
        assert_eq!(generator.tick(&mut NoopHooks), GenerationStage::Idle);
    }

    #[test]
    fn test_flat_ten_by_ten() {
        let config = MapConfig {
            width: 10,
            height: 10,
            tile_size: 1.0,
            combine_threshold: 8,
            generate_mountain_ranges: false,
            generate_map_objects: false,
            layers: vec![TerrainLayer::new(0.0, "ground", "grass", 0.2)],
            ..Default::default()
        };
        let mut generator = MapGenerator::new(config);
        generator.regenerate(&mut NoopHooks);

        assert_eq!(generator.scene().combined_meshes_in_layer(0), 13);
        assert_eq!(generator.scene().combined_meshes_in_layer(1), 0);
        assert_eq!(generator.scene().child_count(), 13);
        let generated = generator.generated().unwrap();
        assert_eq!(generated.tiles.len(), 100);
        assert!(generated.ranges.is_empty());
        assert_eq!(generated.report.layers[0].flushes.last(), Some(&4));
    }

    #[test]
    fn test_mountain_tiles_use_top_layer() {
        let mut generator = MapGenerator::new(small_config());
        generator.regenerate(&mut NoopHooks);
        let generated = generator.generated().unwrap();
        let top = generator.config().layers.len() - 1;

        assert!(!generated.mountain_tiles.is_empty());
        for coord in generated.mountain_tiles.iter() {
            assert_eq!(generated.layer_at(coord), Some(top));
            assert!(generated.is_mountain(coord));
            assert_eq!(generated.category_at(coord), Some(CollisionCategory::Obstacle));
        }
        for rock in &generator.scene().group(MOUNTAIN_ROCKS_GROUP).unwrap().objects {
            assert!(generated.is_mountain(rock.coord));
        }
    }

    #[test]
    fn test_objects_avoid_mountains() {
        let mut generator = MapGenerator::new(small_config());
        generator.regenerate(&mut NoopHooks);
        let generated = generator.generated().unwrap();

        if let Some(group) = generator.scene().group(MAP_OBJECTS_GROUP) {
            for object in &group.objects {
                assert!(!generated.is_mountain(object.coord));
            }
        }
    }

    #[test]
    fn test_unset_noise_seed_is_drawn_once() {
        let mut config = small_config();
        config.noise.seed = crate::seed::UNSET_NOISE_SEED;
        let mut a = MapGenerator::new(config.clone());
        let mut b = MapGenerator::new(config);
        a.regenerate(&mut NoopHooks);
        b.regenerate(&mut NoopHooks);

        let seed = a.generated().unwrap().stats.noise_seed;
        assert!((0..10_000).contains(&seed));
        assert_eq!(seed, b.generated().unwrap().stats.noise_seed);
        assert_eq!(layers_of(&a), layers_of(&b));
    }

    #[test]
    fn test_toggles_disable_stages() {
        let mut config = small_config();
        config.generate_mountain_ranges = false;
        config.generate_map_objects = false;
        let mut generator = MapGenerator::new(config);
        generator.regenerate(&mut NoopHooks);

        let generated = generator.generated().unwrap();
        assert!(generated.ranges.is_empty());
        assert!(generator.scene().group(MOUNTAIN_ROCKS_GROUP).is_none());
        assert!(generator.scene().group(MAP_OBJECTS_GROUP).is_none());
    }

    #[test]
    fn test_missing_assets_still_finish() {
        let mut config = small_config();
        config.layers.clear();
        config.mountains.rock_prefabs.clear();
        config.map_objects.prefabs.clear();
        let mut generator = MapGenerator::new(config);
        let mut hooks = RecordingHooks::default();

        assert_eq!(generator.regenerate(&mut hooks), GenerationOutcome::Completed);
        assert_eq!(generator.stage(), GenerationStage::Done);
        assert_eq!(generator.scene().child_count(), 0);
        assert!(generator.scene().is_dirty());
        assert_eq!(hooks.calls, vec!["scan", "spawn"]);

        let generated = generator.generated().unwrap();
        assert_eq!(generated.stats.tiles, 0);
        assert_eq!(generated.stats.rocks, 0);
        assert_eq!(generated.stats.objects, 0);
    }
}
