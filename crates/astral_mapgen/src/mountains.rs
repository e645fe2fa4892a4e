//! Organic mountain regions placed by rejection sampling.

use std::collections::HashSet;

use glam::Vec2;
use rand::Rng;
use serde::Serialize;

use crate::config::MountainSettings;
use crate::hex::GridCoord;
use crate::noise_util::RegionNoise;

/// Attempts spent looking for a non-conflicting rectangle before a region is skipped
pub const MAX_PLACEMENT_ATTEMPTS: u32 = 50;

/// Outline noise must exceed `BASE + FALLOFF * normalized_distance` for a cell to be kept
const OUTLINE_BASE_THRESHOLD: f32 = 0.3;
const OUTLINE_FALLOFF: f32 = 0.7;

/// One accepted region. Never mutated after planning.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MountainRange {
    /// Lowest corner of the bounding rectangle
    pub origin: GridCoord,
    /// Rectangle (width, height) in tiles
    pub size: (i32, i32),
    /// Carved cells in scan order (x outer, z inner)
    pub tiles: Vec<GridCoord>,
}

impl MountainRange {
    pub fn center(&self) -> Vec2 {
        rect_center(self.origin, self.size)
    }
}

fn rect_center(origin: GridCoord, size: (i32, i32)) -> Vec2 {
    Vec2::new(
        origin.x as f32 + size.0 as f32 / 2.0,
        origin.z as f32 + size.1 as f32 / 2.0,
    )
}

/// Union of every range's cells, iterated in insertion order.
///
/// Rock scattering walks this set while drawing from the run's random stream,
/// so a stable order is what keeps two runs with one seed identical.
#[derive(Debug, Clone, Default)]
pub struct MountainTileSet {
    order: Vec<GridCoord>,
    members: HashSet<GridCoord>,
}

impl MountainTileSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_ranges(ranges: &[MountainRange]) -> Self {
        let mut set = Self::new();
        for range in ranges {
            set.extend(range.tiles.iter().copied());
        }
        set
    }

    /// Returns false if the cell was already present.
    pub fn insert(&mut self, coord: GridCoord) -> bool {
        if self.members.insert(coord) {
            self.order.push(coord);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, coord: GridCoord) -> bool {
        self.members.contains(&coord)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = GridCoord> + '_ {
        self.order.iter().copied()
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.members.clear();
    }
}

impl Extend<GridCoord> for MountainTileSet {
    fn extend<I: IntoIterator<Item = GridCoord>>(&mut self, iter: I) {
        for coord in iter {
            self.insert(coord);
        }
    }
}

pub struct MountainPlanner<'a> {
    settings: &'a MountainSettings,
    width: i32,
    height: i32,
    outline: RegionNoise,
}

impl<'a> MountainPlanner<'a> {
    pub fn new(settings: &'a MountainSettings, width: i32, height: i32) -> Self {
        Self {
            settings,
            width,
            height,
            outline: RegionNoise::default(),
        }
    }

    pub fn range_count(&self) -> u32 {
        self.settings.range_count
    }

    /// Plan one more region against the ones already accepted.
    ///
    /// Returns `None` when every attempt conflicted or the carved outline came
    /// out empty; either way the caller moves on to the next region.
    pub fn plan_region<R: Rng>(&self, accepted: &[MountainRange], rng: &mut R) -> Option<MountainRange> {
        let (min_w, min_h) = self.settings.min_size;
        let (max_w, max_h) = self.settings.max_size;

        for _ in 0..MAX_PLACEMENT_ATTEMPTS {
            let w = rng.gen_range(min_w..=max_w.max(min_w));
            let h = rng.gen_range(min_h..=max_h.max(min_h));

            let origin = GridCoord::new(
                draw_origin(rng, self.width - w),
                draw_origin(rng, self.height - h),
            );
            let center = rect_center(origin, (w, h));

            let conflicts = accepted.iter().any(|range| {
                range.center().distance(center) < self.settings.min_distance_between_ranges
            });
            if conflicts {
                continue;
            }

            let tiles = self.carve(origin, (w, h));
            if tiles.is_empty() {
                log::debug!("Mountain range at {:?} carved no tiles, skipping", origin);
                return None;
            }
            return Some(MountainRange {
                origin,
                size: (w, h),
                tiles,
            });
        }

        log::debug!(
            "No room for another mountain range after {} attempts",
            MAX_PLACEMENT_ATTEMPTS
        );
        None
    }

    /// Plan every configured region in order.
    pub fn plan_all<R: Rng>(&self, rng: &mut R) -> Vec<MountainRange> {
        let mut ranges = Vec::new();
        for _ in 0..self.settings.range_count {
            if let Some(range) = self.plan_region(&ranges, rng) {
                ranges.push(range);
            }
        }
        ranges
    }

    /// Keep cells whose outline noise beats a threshold rising toward the rim.
    fn carve(&self, origin: GridCoord, size: (i32, i32)) -> Vec<GridCoord> {
        let center = rect_center(origin, size);
        let max_distance = size.0.min(size.1) as f32 / 2.0;

        let mut tiles = Vec::new();
        for x in origin.x..origin.x + size.0 {
            for z in origin.z..origin.z + size.1 {
                let coord = GridCoord::new(x, z);
                if !coord.in_bounds(self.width, self.height) {
                    continue;
                }

                let normalized = Vec2::new(x as f32, z as f32).distance(center) / max_distance;
                let threshold = OUTLINE_BASE_THRESHOLD + normalized * OUTLINE_FALLOFF;

                if self.outline.sample(x, z) > threshold {
                    tiles.push(coord);
                }
            }
        }
        tiles
    }
}

/// Origin in `0..span`, pinned to 0 when the rectangle is as wide as the map
fn draw_origin<R: Rng>(rng: &mut R, span: i32) -> i32 {
    if span > 0 {
        rng.gen_range(0..span)
    } else {
        0
    }
}
