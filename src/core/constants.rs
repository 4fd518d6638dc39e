use crate::core::units::{TilesCount, Units};

pub const TILE_SIZE_IN_UNITS: f32 = 16.0; // World units per tile
pub const TILE_SIZE_IN_UNITS_UNITS: Units = 16; // World units per tile
pub const DEFAULT_CHUNK_DIMENSION_TILES: TilesCount = 16; // 16x16 tiles per chunk
pub const DEFAULT_RENDER_DISTANCE_CHUNKS: usize = 3; // Load 3 chunks out from focus

// Navigator defaults, per fixed tick
pub const DEFAULT_GRAVITY: f32 = 0.3;
pub const DEFAULT_HOP_COOLDOWN_SECS: f32 = 0.75;
pub const HOP_WINDOW_COLUMNS: isize = 8;
pub const HOP_WINDOW_ROWS: isize = 5;
pub const FIXED_TICK_HZ: f64 = 60.0;

// Below this row a navigator is considered lost and respawned
pub const KILL_ROW: isize = 256;
