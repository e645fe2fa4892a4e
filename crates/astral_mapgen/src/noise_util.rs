use crate::config::NoiseSettings;
use glam::Vec2;
use noise::{NoiseFn, Perlin};

/// Permutation seed of the terrain primitive. The configured seed is applied as
/// a coordinate offset, not as a permutation seed.
const TERRAIN_PERLIN_SEED: u32 = 0;
/// Permutation seed of the coordinate noise that carves mountain outlines
const REGION_PERLIN_SEED: u32 = 1;
/// Sampling scale of the mountain outline noise, in grid cells
pub const REGION_NOISE_SCALE: f64 = 0.3;

/// Perlin sample remapped from [-1, 1] to [0, 1]
fn unit_perlin(perlin: &Perlin, x: f64, y: f64) -> f64 {
    ((perlin.get([x, y]) + 1.0) * 0.5).clamp(0.0, 1.0)
}

/// Multi-octave elevation noise over world coordinates
///
/// Each octave samples `(world + seed) / frequency`; the frequency term is a
/// divisor, so it starts at the base frequency and grows by `lacunarity` while
/// the amplitude shrinks by `persistence`. The sum is normalized by the total
/// amplitude used, keeping the result in [0, 1].
#[derive(Clone)]
pub struct NoiseField {
    perlin: Perlin,
    seed: f64,
    base_frequency: f64,
    octaves: u32,
    persistence: f64,
    lacunarity: f64,
}

impl NoiseField {
    /// `seed` must already be resolved (never the unset sentinel).
    pub fn new(settings: &NoiseSettings, seed: i32) -> Self {
        Self {
            perlin: Perlin::new(TERRAIN_PERLIN_SEED),
            seed: seed as f64,
            base_frequency: settings.base_frequency as f64,
            octaves: settings.octaves,
            persistence: settings.persistence as f64,
            lacunarity: settings.lacunarity as f64,
        }
    }

    pub fn sample(&self, point: Vec2) -> f32 {
        let mut frequency = self.base_frequency;
        let mut amplitude = 1.0;
        let mut max_amplitude = 0.0;
        let mut value = 0.0;

        for _ in 0..self.octaves {
            let sample_x = (point.x as f64 + self.seed) / frequency;
            let sample_y = (point.y as f64 + self.seed) / frequency;

            value += unit_perlin(&self.perlin, sample_x, sample_y) * amplitude;
            max_amplitude += amplitude;

            amplitude *= self.persistence;
            frequency *= self.lacunarity;
        }

        if max_amplitude <= 0.0 {
            return 0.0;
        }
        (value / max_amplitude) as f32
    }
}

/// Low-frequency noise over raw grid cells, independent of the terrain field
#[derive(Clone)]
pub struct RegionNoise {
    perlin: Perlin,
}

impl Default for RegionNoise {
    fn default() -> Self {
        Self {
            perlin: Perlin::new(REGION_PERLIN_SEED),
        }
    }
}

impl RegionNoise {
    pub fn sample(&self, x: i32, z: i32) -> f32 {
        unit_perlin(
            &self.perlin,
            x as f64 * REGION_NOISE_SCALE,
            z as f64 * REGION_NOISE_SCALE,
        ) as f32
    }
}
