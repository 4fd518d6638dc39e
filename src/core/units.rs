/// Count of tiles along one axis.
pub type TilesCount = usize;

/// Integer world length units. One tile spans `TILE_SIZE_IN_UNITS_UNITS` of these.
pub type Units = isize;
