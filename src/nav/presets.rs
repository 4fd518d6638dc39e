use bevy::math::Vec2;

use crate::{
    core::basics::Point,
    nav::Hitbox,
    world::tiles::TileSource,
};

/// Preset for [`NavMeshParameters::is_valid_node`](crate::nav::NavMeshParameters).
///
/// Returns `true` for solid tiles with enough vertical clearance in the tiles
/// above them to fit `hitbox`. The clearance band is `ceil(height / 16)` tiles
/// tall, starting one row above `tile`. Horizontal clearance is **not** checked;
/// callers that need it combine this with their own predicate.
///
/// Tiles missing from `tiles` (off-map or not generated yet) can never be stood
/// on, and never obstruct headroom.
pub fn default_is_tile_valid<S: TileSource + ?Sized>(tiles: &S, tile: Point, hitbox: Hitbox) -> bool {
    // Nothing to stand on
    if !tiles.is_solid_tile(tile) {
        return false;
    }

    let height_in_tiles = hitbox.clearance_tiles();
    (1..=height_in_tiles).all(|rows| !tiles.is_solid_tile(tile.above(rows)))
}

/// Preset for [`NavigatorParameters::jump_function`](crate::nav::NavigatorParameters).
///
/// Minimum launch velocity that carries a point mass ballistically from `start`
/// to `end` under the gravity returned by `gravity`. Positions and the result
/// use world space, where +y points down.
///
/// The vertical component already has one tick of gravity subtracted: the
/// integrator this is built for adds gravity to the velocity before moving, so
/// the first step travels with the uncompensated launch velocity.
///
/// Gravity must be positive. Otherwise the components may come back NaN,
/// which [`is_launchable`](crate::nav::is_launchable) detects. When `start == end`
/// the launch speed is zero and only the compensation term remains.
pub fn default_jump_function(start: Vec2, end: Vec2, gravity: &dyn Fn() -> f32) -> Vec2 {
    let dx = end.x - start.x;
    // Solve with +y up
    let dy = -(end.y - start.y);

    let r = (dx * dx + dy * dy).sqrt();
    let g = gravity();

    let minimal_v0 = (g * (dy + r)).sqrt();
    let theta = (dy + r).atan2(dx);

    let ux = minimal_v0 * theta.cos();
    let uy = -minimal_v0 * theta.sin() - g;

    Vec2::new(ux, uy)
}

#[cfg(test)]
mod tests {
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::{
        core::{chunks::DataMap, constants::TILE_SIZE_IN_UNITS_UNITS},
        nav::is_launchable,
        world::{
            terrain::{TerrainProducer, TerrainSettings},
            tiles::{MaterialId, Tile},
        },
    };

    const STAND: Point = Point::new(3, 10);

    fn empty_world() -> DataMap<TerrainProducer> {
        DataMap::new(TerrainProducer::empty(), 16, 1)
    }

    fn world_with_floor() -> DataMap<TerrainProducer> {
        let mut world = empty_world();
        world.write(STAND, Tile::solid(MaterialId::STONE));
        world
    }

    fn tall(height: isize) -> Hitbox {
        Hitbox::new(16, height)
    }

    fn const_gravity(g: f32) -> impl Fn() -> f32 {
        move || g
    }

    // --- Tile validity ---

    #[test]
    fn missing_tile_is_never_valid() {
        let world = empty_world();
        assert!(!default_is_tile_valid(&world, STAND, tall(32)));
        assert!(!default_is_tile_valid(&world, Point::new(-500, 9000), tall(0)));
        assert!(!default_is_tile_valid(&world, Point::new(isize::MAX, isize::MIN), tall(48)));
    }

    #[test]
    fn non_solid_tile_is_not_valid() {
        let mut world = empty_world();
        world.write(STAND, Tile::solid(MaterialId::PLATFORM_WOOD));
        assert!(!default_is_tile_valid(&world, STAND, tall(16)));

        // Exists flag without a tile is still nothing to stand on
        world.write(
            STAND,
            Tile {
                exists: false,
                material: MaterialId::STONE,
            },
        );
        assert!(!default_is_tile_valid(&world, STAND, tall(16)));
    }

    #[test]
    fn solid_tile_with_open_sky_is_valid() {
        let world = world_with_floor();
        assert!(default_is_tile_valid(&world, STAND, tall(48)));
    }

    #[test]
    fn clearance_band_is_exactly_k_tiles_for_exact_multiples() {
        for k in 1..=5 {
            let hitbox = tall(k * TILE_SIZE_IN_UNITS_UNITS);

            let mut blocked = world_with_floor();
            blocked.write(STAND.above(k), Tile::solid(MaterialId::DIRT));
            assert!(!default_is_tile_valid(&blocked, STAND, hitbox), "k = {k}");

            let mut just_outside = world_with_floor();
            just_outside.write(STAND.above(k + 1), Tile::solid(MaterialId::DIRT));
            assert!(default_is_tile_valid(&just_outside, STAND, hitbox), "k = {k}");
        }
    }

    #[test]
    fn clearance_rounds_up() {
        let mut world = world_with_floor();
        world.write(STAND.above(2), Tile::solid(MaterialId::STONE));
        assert!(default_is_tile_valid(&world, STAND, tall(16)));
        assert!(!default_is_tile_valid(&world, STAND, tall(17)));
        assert!(!default_is_tile_valid(&world, STAND, tall(32)));
    }

    #[test]
    fn zero_height_only_needs_a_floor() {
        let mut world = world_with_floor();
        world.write(STAND.above(1), Tile::solid(MaterialId::STONE));
        assert!(default_is_tile_valid(&world, STAND, tall(0)));
        assert!(!default_is_tile_valid(&world, STAND, tall(1)));
    }

    #[test]
    fn non_solid_tiles_do_not_obstruct() {
        let mut world = world_with_floor();
        world.write(STAND.above(1), Tile::solid(MaterialId::PLATFORM_WOOD));
        assert!(default_is_tile_valid(&world, STAND, tall(32)));
    }

    #[test]
    fn horizontal_clearance_is_ignored() {
        let mut world = world_with_floor();
        for rows in 1..=3 {
            world.write(STAND.above(rows) + Point::new(1, 0), Tile::solid(MaterialId::STONE));
            world.write(STAND.above(rows) - Point::new(1, 0), Tile::solid(MaterialId::STONE));
        }
        assert!(default_is_tile_valid(&world, STAND, Hitbox::new(64, 48)));
    }

    #[test]
    fn adding_obstructions_never_makes_a_tile_valid() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..200 {
            let hitbox = tall(rng.random_range(0..=80i64) as isize);
            let mut world = world_with_floor();
            for rows in 1..=6 {
                if rng.random_bool(0.2) {
                    world.write(STAND.above(rows), Tile::solid(MaterialId::STONE));
                }
            }
            let before = default_is_tile_valid(&world, STAND, hitbox);

            let extra = rng.random_range(1..=hitbox.clearance_tiles().max(1) as i64) as isize;
            world.write(STAND.above(extra), Tile::solid(MaterialId::DIRT));
            let after = default_is_tile_valid(&world, STAND, hitbox);

            assert!(before || !after, "obstruction turned an invalid tile valid");
        }
    }

    #[test]
    fn validity_on_generated_terrain() {
        let producer = TerrainProducer::new(TerrainSettings {
            platform_chance: 0.0,
            ..TerrainSettings::default()
        });
        let surface = producer.surface_at(5).unwrap();
        let mut world = DataMap::new(producer, 16, 1);
        world.load_now(crate::core::chunks::ChunkCoords { x: 0, y: 0 });

        assert!(default_is_tile_valid(&world, Point::new(5, surface), tall(32)));
        assert!(!default_is_tile_valid(&world, Point::new(5, surface + 1), tall(32)));
        assert!(!default_is_tile_valid(&world, Point::new(5, surface - 1), tall(32)));
    }

    #[test]
    fn validity_is_pure() {
        let mut world = world_with_floor();
        world.write(STAND.above(3), Tile::solid(MaterialId::STONE));
        for height in [0, 16, 33, 48, 64] {
            let first = default_is_tile_valid(&world, STAND, tall(height));
            let second = default_is_tile_valid(&world, STAND, tall(height));
            assert_eq!(first, second);
        }
        assert!(world.requested_chunks.len() <= 1);
    }

    // --- Jump solver ---

    /// Displacement after `t` ticks of continuous motion, with the one-tick
    /// compensation undone.
    fn trajectory(velocity: Vec2, g: f32, t: f32) -> Vec2 {
        let launch = Vec2::new(velocity.x, velocity.y + g);
        Vec2::new(launch.x * t, launch.y * t + 0.5 * g * t * t)
    }

    #[test]
    fn same_start_and_end_is_a_zero_launch() {
        let g = 0.4;
        let v = default_jump_function(Vec2::new(32.0, 48.0), Vec2::new(32.0, 48.0), &const_gravity(g));
        assert_eq!(v.x, 0.0);
        assert_eq!(v.y + g, 0.0);
    }

    #[test]
    fn horizontal_jump_lands_on_target() {
        let g = 20.0;
        let v = default_jump_function(Vec2::ZERO, Vec2::new(100.0, 0.0), &const_gravity(g));
        assert!(is_launchable(v));
        assert!(v.x > 0.0);
        assert!(v.y + g < 0.0, "launch must go up, got {v:?}");

        let t = 100.0 / v.x;
        assert!(t > 0.0);
        let landing = trajectory(v, g, t);
        assert!((landing.x - 100.0).abs() < 1e-3, "{landing:?}");
        assert!(landing.y.abs() < 1e-2, "{landing:?}");
    }

    #[test]
    fn minimal_launch_is_at_45_degrees_on_flat_ground() {
        let g = 20.0;
        let v = default_jump_function(Vec2::ZERO, Vec2::new(100.0, 0.0), &const_gravity(g));
        let launch = Vec2::new(v.x, v.y + g);
        assert!((launch.x + launch.y).abs() < 1e-3);
        assert!((launch.length() - (g * 100.0).sqrt()).abs() < 1e-3);
    }

    #[test]
    fn reaches_targets_above_below_and_behind() {
        let g = 0.35;
        let start = Vec2::new(40.0, 160.0);
        for offset in [
            Vec2::new(80.0, -48.0),
            Vec2::new(-64.0, -16.0),
            Vec2::new(96.0, 64.0),
            Vec2::new(-32.0, 128.0),
        ] {
            let v = default_jump_function(start, start + offset, &const_gravity(g));
            assert!(is_launchable(v));
            assert_eq!(v.x.signum(), offset.x.signum());

            let t = offset.x / v.x;
            let hit = trajectory(v, g, t);
            assert!((hit - offset).length() < 1e-2, "target {offset:?}, hit {hit:?}");
        }
    }

    #[test]
    fn pure_vertical_rise_goes_up_to_exactly_the_target() {
        let g = 0.5;
        let v = default_jump_function(Vec2::new(0.0, 100.0), Vec2::ZERO, &const_gravity(g));
        assert!(is_launchable(v));
        assert!(v.x.abs() < 1e-3);

        let vy = v.y + g;
        assert!(vy < 0.0);
        // Apex of a vertical throw: v² / 2g
        let apex = vy * vy / (2.0 * g);
        assert!((apex - 100.0).abs() < 1e-2, "apex {apex}");
    }

    #[test]
    fn pure_vertical_drop_needs_no_launch() {
        let g = 0.5;
        let v = default_jump_function(Vec2::ZERO, Vec2::new(0.0, 64.0), &const_gravity(g));
        assert!(is_launchable(v));
        assert!(v.x.abs() < 1e-6);
        assert!((v.y + g).abs() < 1e-6);
    }

    #[test]
    fn non_positive_gravity_is_not_launchable() {
        let v = default_jump_function(Vec2::ZERO, Vec2::new(100.0, 0.0), &const_gravity(-1.0));
        assert!(v.x.is_nan());
        assert!(!is_launchable(v));
    }

    #[test]
    fn gravity_accessor_is_read_per_call() {
        let g = std::cell::Cell::new(0.2_f32);
        let read = || g.get();
        let low = default_jump_function(Vec2::ZERO, Vec2::new(64.0, 0.0), &read);
        g.set(0.8);
        let high = default_jump_function(Vec2::ZERO, Vec2::new(64.0, 0.0), &read);
        assert!(high.x > low.x);
    }

    #[test]
    fn jump_is_pure() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..100 {
            let start = Vec2::new(rng.random_range(-500.0..500.0), rng.random_range(-500.0..500.0));
            let end = Vec2::new(rng.random_range(-500.0..500.0), rng.random_range(-500.0..500.0));
            let g = rng.random_range(0.05..2.0);
            let a = default_jump_function(start, end, &const_gravity(g));
            let b = default_jump_function(start, end, &const_gravity(g));
            assert_eq!(a, b);
        }
    }
}
