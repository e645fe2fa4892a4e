//! Downstream systems notified after a map is generated.

use astral_mapgen::{CollisionCategory, GeneratedMap, PostGenerationHooks};

/// Walkability grid rebuilt from the ground lookup after every generation
#[derive(Debug, Default)]
pub struct NavigationGrid {
    pub walkable: usize,
    pub blocked: usize,
    pub scans: u32,
}

impl NavigationGrid {
    pub fn rescan(&mut self, map: &GeneratedMap) {
        self.walkable = map.tiles.count_in_category(CollisionCategory::Ground);
        self.blocked = map.tiles.count_in_category(CollisionCategory::Obstacle);
        self.scans += 1;
        log::info!(
            "Navigation scan #{}: {} walkable, {} blocked",
            self.scans,
            self.walkable,
            self.blocked
        );
    }
}

/// Resource placement hook; only records that it was triggered
#[derive(Debug, Default)]
pub struct ResourceSpawner {
    pub triggered: u32,
}

impl ResourceSpawner {
    pub fn spawn(&mut self, map: &GeneratedMap) {
        self.triggered += 1;
        log::info!(
            "Resource spawn requested on {} tiles ({} mountain)",
            map.tiles.len(),
            map.mountain_tiles.len()
        );
    }
}

#[derive(Debug, Default)]
pub struct Collaborators {
    pub navigation: NavigationGrid,
    pub resources: ResourceSpawner,
}

impl PostGenerationHooks for Collaborators {
    fn rescan_navigation(&mut self, map: &GeneratedMap) {
        self.navigation.rescan(map);
    }

    fn spawn_resources(&mut self, map: &GeneratedMap) {
        self.resources.spawn(map);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use astral_mapgen::{MapConfig, MapGenerator};

    #[test]
    fn test_collaborators_run_after_generation() {
        let config = MapConfig {
            width: 16,
            height: 16,
            random_seed: Some(7),
            ..Default::default()
        };
        let mut generator = MapGenerator::new(config);
        let mut collaborators = Collaborators::default();
        generator.regenerate(&mut collaborators);

        let map = generator.generated().unwrap();
        assert_eq!(collaborators.navigation.scans, 1);
        assert_eq!(collaborators.resources.triggered, 1);
        assert_eq!(
            collaborators.navigation.walkable + collaborators.navigation.blocked,
            map.tiles.len()
        );
    }
}
