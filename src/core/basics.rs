use bevy::prelude::*;
use std::{
    fmt::Debug,
    ops::{Add, Sub},
};

use crate::core::{constants::TILE_SIZE_IN_UNITS, units::TilesCount};

// --- Coordinate Structs ---

/// Absolute world tile coordinates.
///
/// Rows grow downward: world +y points down, so the tile directly above
/// `(x, y)` is `(x, y - 1)`.
#[derive(Debug, Default, PartialEq, Eq, Hash, Clone, Copy, Reflect)]
pub struct Point {
    pub x: isize,
    pub y: isize,
}

impl Point {
    pub const fn new(x: isize, y: isize) -> Self {
        Self { x, y }
    }

    /// The tile `rows` rows above this one, same column.
    pub const fn above(self, rows: isize) -> Self {
        Self {
            x: self.x,
            y: self.y.saturating_sub(rows),
        }
    }

    /// Tile containing the given world position.
    pub fn from_world_pos(pos: Vec2) -> Self {
        Point {
            x: (pos.x / TILE_SIZE_IN_UNITS).floor() as isize,
            y: (pos.y / TILE_SIZE_IN_UNITS).floor() as isize,
        }
    }

    /// World position of the tile's top-left corner.
    pub fn to_world_pos(self) -> Vec2 {
        Vec2::new(
            self.x as f32 * TILE_SIZE_IN_UNITS,
            self.y as f32 * TILE_SIZE_IN_UNITS,
        )
    }

    /// World position where an agent standing on this tile has its feet:
    /// horizontally centred, on the tile's top edge.
    pub fn standing_pos(self) -> Vec2 {
        self.to_world_pos() + Vec2::new(TILE_SIZE_IN_UNITS / 2.0, 0.0)
    }
}

impl Add for Point {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl Sub for Point {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

// --- Common Grid Data ---
pub trait GridData: Send + Sync + 'static + Debug + Clone {
    type Item: Copy + Debug + Default;
    fn dimension(&self) -> TilesCount;
    fn get_item(&self, x: TilesCount, y: TilesCount) -> Option<&Self::Item>;
    fn set_item(&mut self, x: TilesCount, y: TilesCount, item: Self::Item) -> bool;
}

/// Square, row-major grid backing a single chunk.
#[derive(Debug, Clone)]
pub struct FlatGrid<T>
where
    T: Copy + Debug + Send + Sync + 'static + Default,
{
    data: Vec<T>,
    dimension: TilesCount,
}

impl<T> FlatGrid<T>
where
    T: Copy + Debug + Send + Sync + 'static + Default,
{
    pub fn new(dimension: TilesCount, default_value: T) -> Self {
        FlatGrid {
            data: vec![default_value; dimension * dimension],
            dimension,
        }
    }

    fn calculate_index(&self, x: TilesCount, y: TilesCount) -> Option<usize> {
        if x < self.dimension && y < self.dimension {
            Some(y * self.dimension + x)
        } else {
            None
        }
    }
}

impl<T> GridData for FlatGrid<T>
where
    T: Copy + Debug + Send + Sync + 'static + Default,
{
    type Item = T;

    fn dimension(&self) -> TilesCount {
        self.dimension
    }

    fn get_item(&self, x: TilesCount, y: TilesCount) -> Option<&Self::Item> {
        self.calculate_index(x, y).map(|idx| &self.data[idx])
    }

    fn set_item(&mut self, x: TilesCount, y: TilesCount, item: Self::Item) -> bool {
        if let Some(idx) = self.calculate_index(x, y) {
            self.data[idx] = item;
            true
        } else {
            false
        }
    }
}

/// A chunk of specific map data. The manager knows its coordinates.
#[derive(Debug, Clone)]
pub struct DataChunk<T: GridData> {
    pub grid: T,
}
