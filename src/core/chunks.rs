use bevy::{
    platform::collections::{HashMap, HashSet},
    prelude::*,
    tasks::{AsyncComputeTaskPool, Task},
};
use futures_lite::future;
use std::sync::Arc;

use crate::core::{
    basics::{DataChunk, GridData, Point},
    constants::{DEFAULT_CHUNK_DIMENSION_TILES, DEFAULT_RENDER_DISTANCE_CHUNKS, TILE_SIZE_IN_UNITS},
    units::TilesCount,
};

/// Absolute chunk coordinates.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Reflect, Component)]
#[reflect(Component)]
pub struct ChunkCoords {
    pub x: isize,
    pub y: isize,
}

impl ChunkCoords {
    /// Converts a world tile `Point` to `ChunkCoords`.
    pub fn from_point(point: Point, chunk_dimension_tiles: TilesCount) -> Self {
        let dim = chunk_dimension_tiles as isize;
        ChunkCoords {
            x: point.x.div_euclid(dim),
            y: point.y.div_euclid(dim),
        }
    }

    /// Converts a world unit `Vec2` to `ChunkCoords`.
    pub fn from_world_pos(pos: Vec2, chunk_size_units: f32) -> Self {
        ChunkCoords {
            x: (pos.x / chunk_size_units).floor() as isize,
            y: (pos.y / chunk_size_units).floor() as isize,
        }
    }

    /// World tile `Point` of the chunk's top-left tile.
    pub fn to_origin_tile_point(&self, chunk_dimension_tiles: TilesCount) -> Point {
        Point {
            x: self.x * chunk_dimension_tiles as isize,
            y: self.y * chunk_dimension_tiles as isize,
        }
    }
}

/// Position of `point` inside its chunk.
fn local_coords(point: Point, chunk_dimension_tiles: TilesCount) -> (TilesCount, TilesCount) {
    let dim = chunk_dimension_tiles as isize;
    (
        point.x.rem_euclid(dim) as TilesCount,
        point.y.rem_euclid(dim) as TilesCount,
    )
}

// Marker component for tasks in flight
#[derive(Component)]
pub struct ChunkGenTask<T: GridData>(pub Task<DataChunk<T>>);

/// Entities carrying this keep the chunks around them loaded.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct ChunkLoader;

/// Defines how a specific type of map data is generated.
pub trait MapDataProducer: Send + Sync + 'static + Clone {
    type Item: Copy + Default + Send + Sync;
    type GridType: GridData<Item = Self::Item> + Send + Sync;

    /// Generates a chunk of data for the given coordinates.
    fn generate_chunk(
        &self,
        coords: ChunkCoords,
        dimension_tiles: TilesCount,
    ) -> DataChunk<Self::GridType>;
}

/// The central resource for managing a chunked map of type T.
#[derive(Resource)]
pub struct DataMap<P: MapDataProducer> {
    pub loaded_chunks: HashMap<ChunkCoords, DataChunk<P::GridType>>,
    pub requested_chunks: HashSet<ChunkCoords>,
    // Maps chunk coords to the entity holding the generation task
    pub pending_tasks: HashMap<ChunkCoords, Entity>,
    pub write_queue: HashMap<Point, P::Item>, // Writes to unloaded cells
    pub producer: P,
    pub chunk_dimension_tiles: TilesCount,
    pub chunk_size_units: f32,
    pub render_distance_chunks: usize,
}

impl<P: MapDataProducer> DataMap<P> {
    pub fn new(
        producer: P,
        chunk_dimension_tiles: TilesCount,
        render_distance_chunks: usize,
    ) -> Self {
        let chunk_size_units = chunk_dimension_tiles as f32 * TILE_SIZE_IN_UNITS;
        Self {
            loaded_chunks: HashMap::new(),
            requested_chunks: HashSet::new(),
            pending_tasks: HashMap::new(),
            write_queue: HashMap::new(),
            producer,
            chunk_dimension_tiles,
            chunk_size_units,
            render_distance_chunks,
        }
    }

    /// Reads the data at a world tile Point without spawning any generation requests.
    /// Returns `None` if the chunk is not loaded and no write is queued there.
    pub fn read(&self, point: Point) -> Option<P::Item> {
        if let Some(&queued_value) = self.write_queue.get(&point) {
            return Some(queued_value);
        }

        let chunk_coords = ChunkCoords::from_point(point, self.chunk_dimension_tiles);
        self.loaded_chunks.get(&chunk_coords).and_then(|chunk| {
            let (local_x, local_y) = local_coords(point, self.chunk_dimension_tiles);
            chunk.grid.get_item(local_x, local_y).copied()
        })
    }

    /// Whether the chunk holding `point` has been generated and loaded.
    pub fn is_loaded(&self, point: Point) -> bool {
        self.loaded_chunks
            .contains_key(&ChunkCoords::from_point(point, self.chunk_dimension_tiles))
    }

    /// Reads the tile containing a world position. See [`DataMap::read`].
    pub fn read_world(&self, world_pos: Vec2) -> Option<P::Item> {
        self.read(Point::from_world_pos(world_pos))
    }

    /// Writes data to a world tile Point.
    /// Applied immediately when the chunk is loaded, otherwise queued until it is generated.
    pub fn write(&mut self, point: Point, value: P::Item) {
        let chunk_coords = ChunkCoords::from_point(point, self.chunk_dimension_tiles);
        if let Some(chunk) = self.loaded_chunks.get_mut(&chunk_coords) {
            let (local_x, local_y) = local_coords(point, self.chunk_dimension_tiles);
            chunk.grid.set_item(local_x, local_y, value);
            self.write_queue.remove(&point);
        } else {
            self.write_queue.insert(point, value);
            self.requested_chunks.insert(chunk_coords);
        }
    }

    /// Requests every chunk within `radius_tiles` of the origin.
    pub fn init(&mut self, radius_tiles: TilesCount) {
        let radius_chunks =
            (radius_tiles as f32 / self.chunk_dimension_tiles as f32).ceil() as isize;

        for x in -radius_chunks..=radius_chunks {
            for y in -radius_chunks..=radius_chunks {
                let coords = ChunkCoords { x, y };
                if !self.loaded_chunks.contains_key(&coords)
                    && !self.pending_tasks.contains_key(&coords)
                {
                    self.requested_chunks.insert(coords);
                }
            }
        }
        debug!(
            "DataMap<{}> init requested {} chunks",
            std::any::type_name::<P::Item>(),
            self.requested_chunks.len()
        );
    }

    /// Generates the chunk on the calling thread and loads it.
    pub fn load_now(&mut self, coords: ChunkCoords) {
        let chunk = self
            .producer
            .generate_chunk(coords, self.chunk_dimension_tiles);
        self.requested_chunks.remove(&coords);
        self.apply_generated_chunk(coords, chunk);
    }

    /// Applies queued writes that fall inside `coords` to the chunk, then loads it.
    pub fn apply_generated_chunk(
        &mut self,
        coords: ChunkCoords,
        mut chunk: DataChunk<P::GridType>,
    ) {
        let dim = self.chunk_dimension_tiles;
        let queued: Vec<Point> = self
            .write_queue
            .keys()
            .filter(|point| ChunkCoords::from_point(**point, dim) == coords)
            .copied()
            .collect();

        for point in queued {
            if let Some(value) = self.write_queue.remove(&point) {
                let (local_x, local_y) = local_coords(point, dim);
                chunk.grid.set_item(local_x, local_y, value);
            }
        }

        self.loaded_chunks.insert(coords, chunk);
    }
}

/// Flips a render-space translation (+y up) into world space (+y down).
pub fn world_from_render(translation: Vec3) -> Vec2 {
    Vec2::new(translation.x, -translation.y)
}

/// Places a world-space position (+y down) into render space at depth `z`.
pub fn render_from_world(pos: Vec2, z: f32) -> Vec3 {
    Vec3::new(pos.x, -pos.y, z)
}

// Keeps chunks around every ChunkLoader loaded and drops the rest
pub fn data_map_load_unload_system<P: MapDataProducer>(
    loader_query: Query<&Transform, With<ChunkLoader>>,
    mut data_map: ResMut<DataMap<P>>,
) {
    let distance = data_map.render_distance_chunks as isize;
    let mut required_chunks_set: HashSet<ChunkCoords> = HashSet::new();

    for loader_transform in loader_query.iter() {
        let focus = ChunkCoords::from_world_pos(
            world_from_render(loader_transform.translation),
            data_map.chunk_size_units,
        );
        for dx in -distance..=distance {
            for dy in -distance..=distance {
                required_chunks_set.insert(ChunkCoords {
                    x: focus.x + dx,
                    y: focus.y + dy,
                });
            }
        }
    }

    if required_chunks_set.is_empty() {
        return;
    }

    data_map
        .loaded_chunks
        .retain(|coords, _| required_chunks_set.contains(coords));

    for coords in required_chunks_set.iter() {
        if !data_map.loaded_chunks.contains_key(coords)
            && !data_map.pending_tasks.contains_key(coords)
        {
            data_map.requested_chunks.insert(*coords);
        }
    }
}

// Spawns background tasks for requested chunks
pub fn data_map_spawn_tasks_system<P: MapDataProducer>(
    mut commands: Commands,
    mut data_map: ResMut<DataMap<P>>,
) {
    if data_map.requested_chunks.is_empty() {
        return;
    }

    let thread_pool = AsyncComputeTaskPool::get();
    let producer = Arc::new(data_map.producer.clone());
    let chunk_dimension = data_map.chunk_dimension_tiles;

    let mut new_pending_tasks = Vec::new();
    for &coords in data_map.requested_chunks.iter() {
        if data_map.pending_tasks.contains_key(&coords) {
            continue;
        }
        let pr = producer.clone();
        let task = thread_pool.spawn(async move { pr.generate_chunk(coords, chunk_dimension) });
        let task_entity = commands.spawn((coords, ChunkGenTask(task))).id();
        new_pending_tasks.push((coords, task_entity));
    }

    debug!(
        "DataMap<{}> spawned {} gen tasks",
        std::any::type_name::<P::Item>(),
        new_pending_tasks.len()
    );

    for (coords, entity) in new_pending_tasks {
        data_map.pending_tasks.insert(coords, entity);
    }
    data_map.requested_chunks.clear();
}

// Moves finished chunks into the map
pub fn data_map_process_completed_tasks_system<P: MapDataProducer>(
    mut commands: Commands,
    mut query: Query<(Entity, &ChunkCoords, &mut ChunkGenTask<P::GridType>)>,
    mut data_map: ResMut<DataMap<P>>,
) {
    for (task_entity, coords, mut gen_task) in query.iter_mut() {
        if let Some(generated_chunk) = future::block_on(future::poll_once(&mut gen_task.0)) {
            commands.entity(task_entity).despawn();
            data_map.pending_tasks.remove(coords);
            data_map.apply_generated_chunk(*coords, generated_chunk);
            trace!(
                "DataMap<{}> chunk {:?} generated",
                std::any::type_name::<P::Item>(),
                coords
            );
        }
    }
}

/// Inserts a `DataMap<P>` resource and the systems that stream its chunks.
pub fn insert_chunked_plugin<P>(app: &mut App, producer: P, init_radius_tiles: TilesCount) -> &mut App
where
    P: MapDataProducer,
{
    app.add_systems(Startup, move |mut map: ResMut<DataMap<P>>| {
        map.init(init_radius_tiles)
    });
    app.insert_resource(DataMap::<P>::new(
        producer,
        DEFAULT_CHUNK_DIMENSION_TILES,
        DEFAULT_RENDER_DISTANCE_CHUNKS,
    ))
    .add_systems(
        Update,
        (
            data_map_load_unload_system::<P>,
            data_map_spawn_tasks_system::<P>,
            data_map_process_completed_tasks_system::<P>,
        )
            .chain(),
    )
}
