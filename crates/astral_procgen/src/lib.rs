pub mod mesh;
pub mod hex_tile;
pub mod rock;
pub mod recipe;

pub use mesh::*;
pub use hex_tile::*;
pub use rock::*;
pub use recipe::*;
