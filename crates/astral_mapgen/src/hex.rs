use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Integer tile address on the map grid
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCoord {
    pub x: i32,
    pub z: i32,
}

impl GridCoord {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Planar world position of this tile's center
    pub fn to_world(self, tile_size: f32) -> Vec2 {
        hex_to_world(self.x, self.z, tile_size)
    }

    pub fn in_bounds(self, width: i32, height: i32) -> bool {
        self.x >= 0 && self.x < width && self.z >= 0 && self.z < height
    }
}

/// Vertical distance between two rows of the same column
pub fn hex_row_height(tile_size: f32) -> f32 {
    tile_size * 3.0_f32.sqrt() / 2.0
}

/// Map a grid index to the plane using a staggered (odd columns shifted by half a
/// row) flat-top layout. Columns sit `0.75 * tile_size` apart.
pub fn hex_to_world(x: i32, z: i32, tile_size: f32) -> Vec2 {
    let row_height = hex_row_height(tile_size);

    let world_x = x as f32 * tile_size * 0.75;
    let stagger = if x.rem_euclid(2) == 1 { row_height / 2.0 } else { 0.0 };
    let world_y = z as f32 * row_height + stagger;

    Vec2::new(world_x, world_y)
}
