pub mod core;
pub mod game;
pub mod nav;
pub mod world;

pub use nav::presets::{default_is_tile_valid, default_jump_function};
