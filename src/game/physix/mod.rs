use bevy::prelude::*;

use crate::{
    core::{basics::Point, constants::{KILL_ROW, TILE_SIZE_IN_UNITS}},
    game::{Airborne, FeetPosition, Gravity, Navigator, SpawnPoint, TileWorld, Velocity},
    world::tiles::TileSource,
};

/// One fixed tick of motion, +y down. Gravity is applied before moving,
/// which is the convention the jump preset compensates for.
pub fn step_ballistic(position: Vec2, velocity: Vec2, gravity: f32) -> (Vec2, Vec2) {
    let velocity = Vec2::new(velocity.x, velocity.y + gravity);
    (position + velocity, velocity)
}

/// First solid tile whose top edge the feet crossed while moving from `from`
/// down to `to`. Column is taken at `to`.
pub fn landing_row<S: TileSource + ?Sized>(tiles: &S, from: Vec2, to: Vec2) -> Option<isize> {
    if to.y <= from.y {
        return None;
    }
    let column = Point::from_world_pos(to).x;
    let first = (from.y / TILE_SIZE_IN_UNITS).floor() as isize + 1;
    let last = (to.y / TILE_SIZE_IN_UNITS).floor() as isize;

    (first..=last).find(|&row| tiles.is_solid_tile(Point::new(column, row)))
}

pub fn navigator_integrate_system(
    tiles: Res<TileWorld>,
    mut query: Query<
        (
            &mut FeetPosition,
            &mut Velocity,
            &Gravity,
            &mut Airborne,
            &SpawnPoint,
        ),
        With<Navigator>,
    >,
) {
    for (mut feet, mut velocity, gravity, mut airborne, spawn) in query.iter_mut() {
        // Hold still until the chunk underneath has streamed in
        if !tiles.is_loaded(Point::from_world_pos(feet.0)) {
            continue;
        }

        if !airborne.0 {
            // Chunk unloaded or tile removed underneath
            if !tiles.is_solid_tile(Point::from_world_pos(feet.0)) {
                airborne.0 = true;
            }
            continue;
        }

        let (position, next_velocity) = step_ballistic(feet.0, velocity.0, gravity.0);
        match landing_row(&*tiles, feet.0, position) {
            Some(row) => {
                feet.0 = Vec2::new(position.x, row as f32 * TILE_SIZE_IN_UNITS);
                velocity.0 = Vec2::ZERO;
                airborne.0 = false;
                trace!("navigator landed on row {row}");
            }
            None => {
                feet.0 = position;
                velocity.0 = next_velocity;
            }
        }

        if Point::from_world_pos(feet.0).y > KILL_ROW {
            info!("navigator fell out of the world at {:?}, respawning", feet.0);
            feet.0 = spawn.0;
            velocity.0 = Vec2::ZERO;
        }
    }
}

#[cfg(test)]
mod tests {
    use bevy::ecs::system::RunSystemOnce;

    use super::*;
    use crate::{
        core::chunks::ChunkCoords,
        nav::default_jump_function,
        world::{MaterialId, TerrainProducer, Tile},
    };

    fn floor_at(points: &[Point]) -> TileWorld {
        let mut world = TileWorld::new(TerrainProducer::empty(), 16, 1);
        world.load_now(ChunkCoords { x: 0, y: 0 });
        for &point in points {
            world.write(point, Tile::solid(MaterialId::STONE));
        }
        world
    }

    #[test]
    fn first_step_moves_by_uncompensated_launch_velocity() {
        let g = 0.3;
        let start = Vec2::new(8.0, 160.0);
        let launch = default_jump_function(start, Vec2::new(72.0, 128.0), &|| g);
        let (position, velocity) = step_ballistic(start, launch, g);
        assert_eq!(velocity, Vec2::new(launch.x, launch.y + g));
        assert_eq!(position, start + velocity);
    }

    #[test]
    fn landing_only_while_falling() {
        let tiles = floor_at(&[Point::new(0, 10)]);
        assert_eq!(landing_row(&tiles, Vec2::new(8.0, 150.0), Vec2::new(8.0, 165.0)), Some(10));
        assert_eq!(landing_row(&tiles, Vec2::new(8.0, 165.0), Vec2::new(8.0, 150.0)), None);
        // Starting exactly on the edge is not a crossing
        assert_eq!(landing_row(&tiles, Vec2::new(8.0, 160.0), Vec2::new(8.0, 170.0)), None);
    }

    #[test]
    fn fast_falls_stop_at_the_first_solid_row() {
        let tiles = floor_at(&[Point::new(0, 6), Point::new(0, 9)]);
        assert_eq!(landing_row(&tiles, Vec2::new(4.0, 10.0), Vec2::new(4.0, 200.0)), Some(6));
    }

    #[test]
    fn solved_hop_lands_on_target_tile() {
        let target = Point::new(4, 10);
        let mut world = World::new();
        world.insert_resource(floor_at(&[Point::new(0, 10), target]));

        let g = 0.3;
        let start = Point::new(0, 10).standing_pos();
        let launch = default_jump_function(start, target.standing_pos(), &|| g);
        let navigator = world
            .spawn((
                Navigator,
                FeetPosition(start),
                Velocity(launch),
                Gravity(g),
                Airborne(true),
                SpawnPoint(start),
            ))
            .id();

        for _ in 0..200 {
            world.run_system_once(navigator_integrate_system).unwrap();
            if !world.get::<Airborne>(navigator).unwrap().0 {
                break;
            }
        }

        assert!(!world.get::<Airborne>(navigator).unwrap().0);
        let feet = world.get::<FeetPosition>(navigator).unwrap().0;
        assert_eq!(Point::from_world_pos(feet), target);
        assert_eq!(world.get::<Velocity>(navigator).unwrap().0, Vec2::ZERO);
    }

    #[test]
    fn lost_navigators_respawn() {
        let mut world = World::new();
        let mut tiles = floor_at(&[]);
        tiles.load_now(ChunkCoords { x: 0, y: KILL_ROW / 16 });
        world.insert_resource(tiles);
        let spawn = Vec2::new(8.0, -32.0);
        let navigator = world
            .spawn((
                Navigator,
                FeetPosition(Vec2::new(8.0, KILL_ROW as f32 * TILE_SIZE_IN_UNITS + 15.0)),
                Velocity(Vec2::new(0.0, 4.0)),
                Gravity(0.3),
                Airborne(true),
                SpawnPoint(spawn),
            ))
            .id();

        world.run_system_once(navigator_integrate_system).unwrap();
        assert_eq!(world.get::<FeetPosition>(navigator).unwrap().0, spawn);
    }

    #[test]
    fn navigators_wait_for_unloaded_chunks() {
        let mut world = World::new();
        world.insert_resource(TileWorld::new(TerrainProducer::empty(), 16, 1));
        let feet = Vec2::new(8.0, 40.0);
        let navigator = world
            .spawn((
                Navigator,
                FeetPosition(feet),
                Velocity::default(),
                Gravity(0.3),
                Airborne(true),
                SpawnPoint(feet),
            ))
            .id();

        world.run_system_once(navigator_integrate_system).unwrap();
        assert_eq!(world.get::<FeetPosition>(navigator).unwrap().0, feet);
        assert_eq!(world.get::<Velocity>(navigator).unwrap().0, Vec2::ZERO);
    }
}
