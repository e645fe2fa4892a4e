use std::collections::HashMap;

use glam::Vec2;
use serde::Serialize;

use crate::hex::GridCoord;
use crate::layers::CollisionCategory;

/// What the grid scan decided for one emitted tile
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TileRecord {
    pub coord: GridCoord,
    pub world: Vec2,
    pub noise: f32,
    pub layer: usize,
    pub mountain: bool,
    pub category: CollisionCategory,
}

/// Emitted tiles in visitation order with lookup by grid coordinate.
/// Water cells are absent.
#[derive(Debug, Clone, Default)]
pub struct TileMap {
    records: Vec<TileRecord>,
    index: HashMap<GridCoord, usize>,
}

impl TileMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, record: TileRecord) {
        match self.index.get(&record.coord) {
            Some(&slot) => self.records[slot] = record,
            None => {
                self.index.insert(record.coord, self.records.len());
                self.records.push(record);
            }
        }
    }

    pub fn get(&self, coord: GridCoord) -> Option<&TileRecord> {
        self.index.get(&coord).map(|&slot| &self.records[slot])
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TileRecord> {
        self.records.iter()
    }

    pub fn count_in_layer(&self, layer: usize) -> usize {
        self.records.iter().filter(|r| r.layer == layer).count()
    }

    pub fn count_in_category(&self, category: CollisionCategory) -> usize {
        self.records.iter().filter(|r| r.category == category).count()
    }
}
