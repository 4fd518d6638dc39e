pub mod terrain;
pub mod tiles;

pub use terrain::{TerrainProducer, TerrainSettings};
pub use tiles::{MaterialId, MaterialTable, Tile, TileProducer, TileSource};
