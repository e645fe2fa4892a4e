use serde::{Deserialize, Serialize};

use crate::config::TerrainLayer;

/// Physics category of a merged tile collider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollisionCategory {
    Ground,
    Obstacle,
}

/// Highest layer whose threshold the value meets, scanning upward and stopping
/// at the first threshold above it. Values below every threshold map to 0.
pub fn classify_by_noise(noise: f32, layers: &[TerrainLayer]) -> usize {
    let mut index = 0;
    for (i, layer) in layers.iter().enumerate() {
        if noise >= layer.threshold {
            index = i;
        } else {
            break;
        }
    }
    index
}

/// Layer of a tile, or `None` when the tile is not emitted at all.
///
/// Mountain tiles take the top layer when there are more than two layers.
/// Other tiles below the first threshold are water and produce nothing.
pub fn classify(noise: f32, is_mountain: bool, layers: &[TerrainLayer]) -> Option<usize> {
    let first = layers.first()?;

    if is_mountain && layers.len() > 2 {
        return Some(layers.len() - 1);
    }
    if !is_mountain && noise < first.threshold {
        return None;
    }
    Some(classify_by_noise(noise, layers))
}

pub fn collision_category(layer: usize, obstacle_layers: &[usize]) -> CollisionCategory {
    if obstacle_layers.contains(&layer) {
        CollisionCategory::Obstacle
    } else {
        CollisionCategory::Ground
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layers(thresholds: &[f32]) -> Vec<TerrainLayer> {
        thresholds
            .iter()
            .enumerate()
            .map(|(i, t)| TerrainLayer::new(*t, &format!("layer{}", i), "default", 0.2))
            .collect()
    }

    #[test]
    fn test_scan_picks_highest_met_threshold() {
        let layers = layers(&[0.3, 0.5, 0.7, 0.9]);
        assert_eq!(classify(0.3, false, &layers), Some(0));
        assert_eq!(classify(0.55, false, &layers), Some(1));
        assert_eq!(classify(0.7, false, &layers), Some(2));
        assert_eq!(classify(0.95, false, &layers), Some(3));
    }

    #[test]
    fn test_below_first_threshold_is_excluded() {
        let layers = layers(&[0.3, 0.5, 0.7]);
        assert_eq!(classify(0.1, false, &layers), None);
    }

    #[test]
    fn test_mountain_override() {
        let layers = layers(&[0.3, 0.5, 0.7, 0.9]);
        assert_eq!(classify(0.0, true, &layers), Some(3));
        assert_eq!(classify(0.6, true, &layers), Some(3));
    }

    #[test]
    fn test_mountain_needs_three_layers() {
        let layers = layers(&[0.3, 0.5]);
        assert_eq!(classify(0.6, true, &layers), Some(1));
        // Still emitted even though it is below the first threshold
        assert_eq!(classify(0.1, true, &layers), Some(0));
    }

    #[test]
    fn test_scan_stops_at_first_higher_threshold() {
        let layers = layers(&[0.2, 0.8, 0.4]);
        assert_eq!(classify_by_noise(0.5, &layers), 0);
    }

    #[test]
    fn test_no_layers() {
        assert_eq!(classify(0.5, false, &[]), None);
        assert_eq!(classify(0.5, true, &[]), None);
    }

    #[test]
    fn test_collision_category() {
        let obstacles = [2, 3];
        assert_eq!(collision_category(0, &obstacles), CollisionCategory::Ground);
        assert_eq!(collision_category(1, &obstacles), CollisionCategory::Ground);
        assert_eq!(collision_category(2, &obstacles), CollisionCategory::Obstacle);
        assert_eq!(collision_category(3, &obstacles), CollisionCategory::Obstacle);
        assert_eq!(collision_category(4, &obstacles), CollisionCategory::Ground);
    }
}
