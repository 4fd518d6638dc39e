//! Node-validity and jump callbacks consumed by a navigation mesh and the
//! navigators that walk it, with the stock presets installed by default.

use bevy::prelude::*;
use std::{fmt, sync::Arc};

use crate::{
    core::{basics::Point, constants::TILE_SIZE_IN_UNITS, units::Units},
    world::tiles::TileSource,
};

pub mod presets;

pub use presets::{default_is_tile_valid, default_jump_function};

/// Physical footprint of a navigator, in world units.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hitbox {
    pub width: Units,
    pub height: Units,
}

impl Hitbox {
    pub const fn new(width: Units, height: Units) -> Self {
        Self { width, height }
    }

    /// Rows of headroom the hitbox needs above the tile it stands on.
    pub fn clearance_tiles(&self) -> isize {
        (self.height as f32 / TILE_SIZE_IN_UNITS).ceil() as isize
    }
}

impl From<Rect> for Hitbox {
    fn from(rect: Rect) -> Self {
        let size = rect.size();
        Hitbox {
            width: size.x.ceil() as Units,
            height: size.y.ceil() as Units,
        }
    }
}

/// Decides whether a tile can hold a mesh node for the given hitbox.
pub type IsValidNodeFn<S> = Arc<dyn Fn(&S, Point, Hitbox) -> bool + Send + Sync>;

/// Launch velocity from a start to an end world position, given a gravity accessor.
pub type JumpFn = Arc<dyn Fn(Vec2, Vec2, &dyn Fn() -> f32) -> Vec2 + Send + Sync>;

/// `true` when the velocity can be handed to a navigator.
/// Non-positive gravity makes the jump solver return NaN components.
pub fn is_launchable(velocity: Vec2) -> bool {
    velocity.is_finite()
}

/// Settings a navigation mesh is built with.
#[derive(Resource)]
pub struct NavMeshParameters<S: TileSource + Send + Sync + 'static> {
    pub is_valid_node: IsValidNodeFn<S>,
    pub hitbox: Hitbox,
}

impl<S: TileSource + Send + Sync + 'static> NavMeshParameters<S> {
    pub fn new(hitbox: Hitbox) -> Self {
        Self {
            is_valid_node: Arc::new(default_is_tile_valid::<S>),
            hitbox,
        }
    }

    pub fn with_is_valid_node(
        mut self,
        is_valid_node: impl Fn(&S, Point, Hitbox) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.is_valid_node = Arc::new(is_valid_node);
        self
    }

    pub fn is_valid(&self, tiles: &S, tile: Point) -> bool {
        (self.is_valid_node)(tiles, tile, self.hitbox)
    }
}

impl<S: TileSource + Send + Sync + 'static> Default for NavMeshParameters<S> {
    fn default() -> Self {
        Self::new(Hitbox::new(16, 32))
    }
}

impl<S: TileSource + Send + Sync + 'static> Clone for NavMeshParameters<S> {
    fn clone(&self) -> Self {
        Self {
            is_valid_node: self.is_valid_node.clone(),
            hitbox: self.hitbox,
        }
    }
}

impl<S: TileSource + Send + Sync + 'static> fmt::Debug for NavMeshParameters<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavMeshParameters")
            .field("hitbox", &self.hitbox)
            .finish_non_exhaustive()
    }
}

/// Per-navigator movement settings.
#[derive(Component, Clone)]
pub struct NavigatorParameters {
    pub jump_function: JumpFn,
}

impl NavigatorParameters {
    pub fn with_jump_function(
        jump_function: impl Fn(Vec2, Vec2, &dyn Fn() -> f32) -> Vec2 + Send + Sync + 'static,
    ) -> Self {
        Self {
            jump_function: Arc::new(jump_function),
        }
    }

    pub fn jump(&self, start: Vec2, end: Vec2, gravity: &dyn Fn() -> f32) -> Vec2 {
        (self.jump_function)(start, end, gravity)
    }
}

impl Default for NavigatorParameters {
    fn default() -> Self {
        Self::with_jump_function(default_jump_function)
    }
}

impl fmt::Debug for NavigatorParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigatorParameters").finish_non_exhaustive()
    }
}
