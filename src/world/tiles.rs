use bevy::platform::collections::HashSet;

use crate::core::{
    basics::{FlatGrid, Point},
    chunks::{DataMap, MapDataProducer},
};

/// Identifier of a tile's material. Solidity is looked up in a [`MaterialTable`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialId(pub u16);

impl MaterialId {
    pub const AIR: MaterialId = MaterialId(0);
    pub const DIRT: MaterialId = MaterialId(1);
    pub const STONE: MaterialId = MaterialId(2);
    // Placed like a tile, but agents fall through it
    pub const PLATFORM_WOOD: MaterialId = MaterialId(3);
}

/// A single cell of the tile world. `Default` is "no tile here".
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    pub exists: bool,
    pub material: MaterialId,
}

impl Tile {
    pub const EMPTY: Tile = Tile {
        exists: false,
        material: MaterialId::AIR,
    };

    pub const fn solid(material: MaterialId) -> Self {
        Tile {
            exists: true,
            material,
        }
    }
}

/// Which materials can be stood on and block headroom.
#[derive(Debug, Default, Clone)]
pub struct MaterialTable {
    solid: HashSet<MaterialId>,
}

impl MaterialTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stock materials: dirt and stone are solid, air and wooden platforms are not.
    pub fn standard() -> Self {
        Self::new()
            .with_solid(MaterialId::DIRT)
            .with_solid(MaterialId::STONE)
    }

    pub fn with_solid(mut self, material: MaterialId) -> Self {
        self.solid.insert(material);
        self
    }

    /// Unknown materials are not solid.
    pub fn is_solid(&self, material: MaterialId) -> bool {
        self.solid.contains(&material)
    }
}

/// Read-only access to the tile world.
///
/// Coordinates outside the generated or loaded world must come back as
/// [`Tile::EMPTY`]; implementations never panic on any `Point`.
pub trait TileSource {
    fn tile(&self, point: Point) -> Tile;

    fn is_solid(&self, material: MaterialId) -> bool;

    fn is_solid_tile(&self, point: Point) -> bool {
        let tile = self.tile(point);
        tile.exists && self.is_solid(tile.material)
    }
}

/// A chunk producer for tile data that also owns the solidity lookup of its materials.
pub trait TileProducer: MapDataProducer<Item = Tile, GridType = FlatGrid<Tile>> {
    fn materials(&self) -> &MaterialTable;
}

impl<P: TileProducer> TileSource for DataMap<P> {
    fn tile(&self, point: Point) -> Tile {
        self.read(point).unwrap_or_default()
    }

    fn is_solid(&self, material: MaterialId) -> bool {
        self.producer.materials().is_solid(material)
    }
}
