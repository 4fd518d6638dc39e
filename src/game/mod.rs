use bevy::prelude::*;
use rand::{Rng, seq::IndexedRandom};

use crate::{
    core::{
        basics::Point,
        chunks::{DataMap, render_from_world},
        constants::{
            DEFAULT_GRAVITY, DEFAULT_HOP_COOLDOWN_SECS, HOP_WINDOW_COLUMNS, HOP_WINDOW_ROWS,
        },
    },
    nav::{NavMeshParameters, NavigatorParameters, is_launchable},
    world::{terrain::TerrainProducer, tiles::TileSource},
};

pub mod physix;
pub mod render;

/// The tile world the demo runs on.
pub type TileWorld = DataMap<TerrainProducer>;

#[derive(Component, Debug, Default, Clone, Copy)]
pub struct Navigator;

/// Where the navigator's feet are, in world space (+y down).
#[derive(Component, Debug, Default, Clone, Copy, PartialEq)]
pub struct FeetPosition(pub Vec2);

/// Per-tick velocity, world space.
#[derive(Component, Debug, Default, Clone, Copy, PartialEq)]
pub struct Velocity(pub Vec2);

/// Downward acceleration per tick².
#[derive(Component, Debug, Clone, Copy)]
pub struct Gravity(pub f32);

impl Default for Gravity {
    fn default() -> Self {
        Gravity(DEFAULT_GRAVITY)
    }
}

#[derive(Component, Debug, Default, Clone, Copy)]
pub struct Airborne(pub bool);

#[derive(Component, Debug)]
pub struct HopCooldown(pub Timer);

impl Default for HopCooldown {
    fn default() -> Self {
        HopCooldown(Timer::from_seconds(DEFAULT_HOP_COOLDOWN_SECS, TimerMode::Once))
    }
}

#[derive(Component, Debug, Default, Clone, Copy)]
pub struct SpawnPoint(pub Vec2);

/// Tile the navigator last decided to hop to.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct HopTarget(pub Option<Point>);

/// Everything a hopping navigator needs, dropped in the air at `spawn`.
pub fn navigator_bundle(spawn: Vec2) -> impl Bundle {
    (
        Navigator,
        NavigatorParameters::default(),
        FeetPosition(spawn),
        Velocity::default(),
        Gravity::default(),
        Airborne(true),
        HopCooldown::default(),
        HopTarget::default(),
        SpawnPoint(spawn),
    )
}

/// Every tile accepted by the mesh parameters in the window around `from`, excluding `from`.
pub fn hop_candidates<S>(tiles: &S, mesh: &NavMeshParameters<S>, from: Point) -> Vec<Point>
where
    S: TileSource + Send + Sync + 'static,
{
    let mut candidates = Vec::new();
    for dy in -HOP_WINDOW_ROWS..=HOP_WINDOW_ROWS {
        for dx in -HOP_WINDOW_COLUMNS..=HOP_WINDOW_COLUMNS {
            let tile = from + Point::new(dx, dy);
            if tile != from && mesh.is_valid(tiles, tile) {
                candidates.push(tile);
            }
        }
    }
    candidates
}

pub fn choose_hop_target<S, R>(
    tiles: &S,
    mesh: &NavMeshParameters<S>,
    from: Point,
    rng: &mut R,
) -> Option<Point>
where
    S: TileSource + Send + Sync + 'static,
    R: Rng + ?Sized,
{
    hop_candidates(tiles, mesh, from).choose(rng).copied()
}

pub fn navigator_hop_system(
    time: Res<Time>,
    tiles: Res<TileWorld>,
    mesh: Res<NavMeshParameters<TileWorld>>,
    mut query: Query<
        (
            &NavigatorParameters,
            &FeetPosition,
            &Gravity,
            &mut Velocity,
            &mut Airborne,
            &mut HopCooldown,
            &mut HopTarget,
        ),
        With<Navigator>,
    >,
) {
    let mut rng = rand::rng();
    for (params, feet, gravity, mut velocity, mut airborne, mut cooldown, mut hop_target) in
        query.iter_mut()
    {
        if airborne.0 {
            continue;
        }
        cooldown.0.tick(time.delta());
        if !cooldown.0.finished() {
            continue;
        }
        cooldown.0.reset();

        let standing_on = Point::from_world_pos(feet.0);
        let Some(target) = choose_hop_target(&*tiles, &mesh, standing_on, &mut rng) else {
            debug!("no standable tile around {:?}", standing_on);
            continue;
        };

        let g = gravity.0;
        let launch = params.jump(feet.0, target.standing_pos(), &|| g);
        if !is_launchable(launch) {
            warn!(
                "jump from {:?} to {:?} under gravity {} is not launchable: {:?}",
                standing_on, target, g, launch
            );
            continue;
        }

        debug!("hop {:?} -> {:?} with velocity {:?}", standing_on, target, launch);
        velocity.0 = launch;
        airborne.0 = true;
        hop_target.0 = Some(target);
    }
}

// Body centre follows the feet, half a hitbox up
pub fn sync_navigator_transforms(
    mesh: Res<NavMeshParameters<TileWorld>>,
    mut query: Query<(&FeetPosition, &mut Transform), With<Navigator>>,
) {
    let half_height = mesh.hitbox.height as f32 / 2.0;
    for (feet, mut transform) in query.iter_mut() {
        let centre = feet.0 - Vec2::new(0.0, half_height);
        transform.translation = render_from_world(centre, transform.translation.z);
    }
}

/// Hopping navigators over a `TileWorld`. The world itself comes from
/// `insert_chunked_plugin`.
pub struct NavDemoPlugin;

impl Plugin for NavDemoPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<NavMeshParameters<TileWorld>>()
            .add_systems(
                FixedUpdate,
                (navigator_hop_system, physix::navigator_integrate_system).chain(),
            )
            .add_systems(
                Update,
                (
                    sync_navigator_transforms,
                    render::draw_tiles_system,
                    render::draw_hop_targets_system,
                ),
            );
    }
}
