use crate::hex_tile::{generate_hex_tile, HexTileRecipe};
use crate::mesh::MeshData;
use crate::rock::{generate_rock, RockRecipe};
use serde::{Deserialize, Serialize};

/// Names a piece of procedural geometry by the recipe that builds it, so tile
/// archetypes and prefabs can live in plain config files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MeshRecipe {
    HexPrism(HexTileRecipe),
    Rock(RockRecipe),
}

impl Default for MeshRecipe {
    fn default() -> Self {
        MeshRecipe::HexPrism(HexTileRecipe::default())
    }
}

impl MeshRecipe {
    pub fn build(&self) -> MeshData {
        match self {
            MeshRecipe::HexPrism(recipe) => generate_hex_tile(recipe),
            MeshRecipe::Rock(recipe) => generate_rock(recipe),
        }
    }
}
