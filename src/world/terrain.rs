use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::{
    core::{
        basics::{DataChunk, FlatGrid, GridData, Point},
        chunks::{ChunkCoords, MapDataProducer},
        units::TilesCount,
    },
    world::tiles::{MaterialId, MaterialTable, Tile, TileProducer},
};

/// Shape of the generated world.
#[derive(Debug, Clone)]
pub struct TerrainSettings {
    pub seed: u64,
    /// Mean row of the ground surface. `None` generates no ground at all.
    pub surface_row: Option<isize>,
    /// How far, in rows, the surface wanders above and below `surface_row`.
    pub surface_amplitude: f32,
    pub dirt_depth: isize,
    /// Per-row chance of a floating platform inside a chunk.
    pub platform_chance: f64,
    pub platform_max_len: TilesCount,
    /// Share of platforms built from wood instead of stone.
    pub wood_share: f64,
}

impl Default for TerrainSettings {
    fn default() -> Self {
        Self {
            seed: 0x5EED,
            surface_row: Some(8),
            surface_amplitude: 3.0,
            dirt_depth: 3,
            platform_chance: 0.2,
            platform_max_len: 6,
            wood_share: 0.25,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TerrainProducer {
    pub settings: TerrainSettings,
    pub materials: MaterialTable,
}

impl Default for TerrainProducer {
    fn default() -> Self {
        Self::new(TerrainSettings::default())
    }
}

impl TerrainProducer {
    pub fn new(settings: TerrainSettings) -> Self {
        Self {
            settings,
            materials: MaterialTable::standard(),
        }
    }

    /// All-air world; the usual base for hand-placed tiles.
    pub fn empty() -> Self {
        Self::new(TerrainSettings {
            surface_row: None,
            platform_chance: 0.0,
            ..TerrainSettings::default()
        })
    }

    /// Ground surface row for a world column, if there is ground.
    pub fn surface_at(&self, column: isize) -> Option<isize> {
        self.settings.surface_row.map(|row| {
            let wave = (column as f32 * 0.15).sin() + 0.5 * (column as f32 * 0.041).sin();
            row + (wave / 1.5 * self.settings.surface_amplitude).round() as isize
        })
    }

    fn ground_tile(&self, point: Point) -> Tile {
        match self.surface_at(point.x) {
            Some(surface) if point.y >= surface + self.settings.dirt_depth => {
                Tile::solid(MaterialId::STONE)
            }
            Some(surface) if point.y >= surface => Tile::solid(MaterialId::DIRT),
            _ => Tile::EMPTY,
        }
    }

    fn chunk_rng(&self, coords: ChunkCoords) -> ChaCha8Rng {
        let mixed = self.settings.seed
            ^ (coords.x as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
            ^ (coords.y as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F);
        ChaCha8Rng::seed_from_u64(mixed)
    }
}

impl MapDataProducer for TerrainProducer {
    type Item = Tile;
    type GridType = FlatGrid<Tile>;

    fn generate_chunk(
        &self,
        coords: ChunkCoords,
        dimension_tiles: TilesCount,
    ) -> DataChunk<Self::GridType> {
        let mut grid = FlatGrid::new(dimension_tiles, Tile::EMPTY);
        let origin = coords.to_origin_tile_point(dimension_tiles);

        for y in 0..dimension_tiles {
            for x in 0..dimension_tiles {
                let point = origin + Point::new(x as isize, y as isize);
                grid.set_item(x, y, self.ground_tile(point));
            }
        }

        let settings = &self.settings;
        if settings.platform_chance <= 0.0 || settings.platform_max_len == 0 {
            return DataChunk { grid };
        }

        let mut rng = self.chunk_rng(coords);
        // Platforms sit on even rows so there is always headroom between two of them
        for y in (0..dimension_tiles).step_by(2) {
            if !rng.random_bool(settings.platform_chance) {
                continue;
            }
            let len = rng.random_range(1..=settings.platform_max_len);
            let start = rng.random_range(0..dimension_tiles);
            let material = if rng.random_bool(settings.wood_share) {
                MaterialId::PLATFORM_WOOD
            } else {
                MaterialId::STONE
            };

            for x in start..(start + len).min(dimension_tiles) {
                let point = origin + Point::new(x as isize, y as isize);
                let clear_of_ground = self
                    .surface_at(point.x)
                    .is_none_or(|surface| point.y < surface - 2);
                if clear_of_ground {
                    grid.set_item(x, y, Tile::solid(material));
                }
            }
        }

        DataChunk { grid }
    }
}

impl TileProducer for TerrainProducer {
    fn materials(&self) -> &MaterialTable {
        &self.materials
    }
}
