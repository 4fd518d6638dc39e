use bevy::{color::palettes::css::LIMEGREEN, prelude::*};

use tile_nav::{
    core::{
        chunks::{ChunkLoader, insert_chunked_plugin},
        constants::{FIXED_TICK_HZ, TILE_SIZE_IN_UNITS},
    },
    game::{NavDemoPlugin, Navigator, navigator_bundle},
    world::TerrainProducer,
};

#[derive(Component)]
struct FollowCamera {
    pub smoothing: f32, // Higher values = smoother but slower following
    pub offset: Vec3,
}

impl Default for FollowCamera {
    fn default() -> Self {
        Self {
            smoothing: 2.0,
            offset: Vec3::ZERO,
        }
    }
}

fn setup_game(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
) {
    commands.spawn((Camera2d, FollowCamera::default()));

    let spawn = Vec2::new(TILE_SIZE_IN_UNITS / 2.0, -2.0 * TILE_SIZE_IN_UNITS);
    commands.spawn((
        navigator_bundle(spawn),
        ChunkLoader,
        Transform::from_translation(Vec3::new(spawn.x, -spawn.y, 10.0)),
        Mesh2d(meshes.add(Rectangle::new(12.0, 30.0))),
        MeshMaterial2d(materials.add(ColorMaterial::from_color(Color::from(LIMEGREEN)))),
    ));
    info!("navigator spawned at {:?}", spawn);
}

fn camera_follow_system(
    navigator_query: Query<&Transform, (With<Navigator>, Without<FollowCamera>)>,
    mut camera_query: Query<(&mut Transform, &FollowCamera), Without<Navigator>>,
    time: Res<Time>,
) {
    let Ok(navigator_transform) = navigator_query.single() else {
        return;
    };
    for (mut camera_transform, follow_camera) in camera_query.iter_mut() {
        let target_position = navigator_transform.translation + follow_camera.offset;

        // Exponential decay towards the target
        let smoothing_factor = 1.0 - (-follow_camera.smoothing * time.delta_secs()).exp();

        camera_transform.translation = camera_transform
            .translation
            .lerp(target_position, smoothing_factor);
    }
}

fn main() {
    let mut app = App::new();

    app.add_plugins(DefaultPlugins)
        .insert_resource(Time::<Fixed>::from_hz(FIXED_TICK_HZ))
        .add_systems(Startup, setup_game)
        .add_systems(Update, camera_follow_system);
    insert_chunked_plugin(&mut app, TerrainProducer::default(), 48);
    app.add_plugins(NavDemoPlugin);
    app.run();
}
