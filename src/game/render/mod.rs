use bevy::prelude::*;

use crate::{
    core::{
        basics::Point,
        chunks::render_from_world,
        constants::TILE_SIZE_IN_UNITS,
    },
    game::{FeetPosition, HopTarget, Navigator, TileWorld},
    nav::NavMeshParameters,
    world::tiles::TileSource,
};

const DRAW_RADIUS_COLUMNS: isize = 24;
const DRAW_RADIUS_ROWS: isize = 14;

fn tile_centre(point: Point) -> Vec2 {
    let centre = point.to_world_pos() + Vec2::splat(TILE_SIZE_IN_UNITS / 2.0);
    render_from_world(centre, 0.0).truncate()
}

// Solid tiles around each navigator, standable ones outlined
pub fn draw_tiles_system(
    mut gizmos: Gizmos,
    tiles: Res<TileWorld>,
    mesh: Res<NavMeshParameters<TileWorld>>,
    query: Query<&FeetPosition, With<Navigator>>,
) {
    let size = Vec2::splat(TILE_SIZE_IN_UNITS);
    for feet in query.iter() {
        let focus = Point::from_world_pos(feet.0);
        for dy in -DRAW_RADIUS_ROWS..=DRAW_RADIUS_ROWS {
            for dx in -DRAW_RADIUS_COLUMNS..=DRAW_RADIUS_COLUMNS {
                let point = focus + Point::new(dx, dy);
                let tile = tiles.tile(point);
                if !tile.exists {
                    continue;
                }
                let colour = if tiles.is_solid(tile.material) {
                    Color::srgba(0.6, 0.55, 0.5, 0.8)
                } else {
                    Color::srgba(0.7, 0.45, 0.2, 0.5)
                };
                gizmos.rect_2d(tile_centre(point), size, colour);
                if mesh.is_valid(&tiles, point) {
                    gizmos.rect_2d(tile_centre(point), size * 0.8, Color::srgba(0.2, 1.0, 0.3, 0.6));
                }
            }
        }
    }
}

pub fn draw_hop_targets_system(
    mut gizmos: Gizmos,
    query: Query<(&FeetPosition, &HopTarget), With<Navigator>>,
) {
    for (feet, target) in query.iter() {
        let Some(target) = target.0 else {
            continue;
        };
        let end = render_from_world(target.standing_pos(), 0.0).truncate();
        gizmos.line_2d(render_from_world(feet.0, 0.0).truncate(), end, Color::srgb(1.0, 0.8, 0.0));
        gizmos.circle_2d(end, 3.0, Color::srgb(1.0, 0.8, 0.0));
    }
}
