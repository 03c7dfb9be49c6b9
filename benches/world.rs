/// Benchmark suite for world simulation
/// Terrain generation, raycasting, player physics and whole frames.
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec3;
use soft_voxel::config::{PhysicsConfig, TerrainConfig, WorldConfig};
use soft_voxel::{
    raycast, BlockGrid, BlockType, EngineConfig, Game, InputState, MoveIntent, PlayerBody, Scene,
    TerrainGenerator,
};

fn bench_terrain_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("terrain_generation");

    for &size in &[64, 128, 256] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let generator = TerrainGenerator::new(TerrainConfig::default());
            b.iter(|| {
                let mut grid = BlockGrid::new(size, size, 0, 31);
                generator.generate(&mut grid);
                black_box(grid.solid_count())
            });
        });
    }
    group.finish();
}

fn bench_height_map(c: &mut Criterion) {
    c.bench_function("height_map_256", |b| {
        let generator = TerrainGenerator::new(TerrainConfig::default());
        b.iter(|| black_box(generator.height_map(256, 256, 31)));
    });
}

fn bench_raycast(c: &mut Criterion) {
    let mut grid = BlockGrid::new(128, 128, 0, 31);
    TerrainGenerator::new(TerrainConfig::default()).generate(&mut grid);
    let origin = grid.block_center(64, 2, 64);

    c.bench_function("raycast_down", |b| {
        b.iter(|| raycast(black_box(&grid), origin, Vec3::NEG_Y, 64.0));
    });

    c.bench_function("raycast_horizon_miss", |b| {
        let dir = Vec3::new(1.0, 0.0, 0.3).normalize();
        b.iter(|| raycast(black_box(&grid), origin, black_box(dir), 64.0));
    });
}

fn bench_player_step(c: &mut Criterion) {
    let mut grid = BlockGrid::new(32, 32, 0, 15);
    for x in 0..32 {
        for z in 0..32 {
            grid.set(x, 10, z, BlockType::Stone);
        }
    }
    let physics = PhysicsConfig::default();

    c.bench_function("player_step_walking", |b| {
        let mut body = PlayerBody::new(physics.clone());
        let start = Vec3::new(0.5, -10.0 + physics.player_height, 0.5);
        let intent = MoveIntent {
            direction: Vec3::new(1.0, 0.0, 1.0),
            jump: false,
        };
        b.iter(|| {
            let mut pos = start;
            black_box(body.step(&grid, &mut pos, &intent, 1.0 / 60.0));
            black_box(pos)
        });
    });
}

fn bench_game_frame(c: &mut Criterion) {
    let mut config = EngineConfig {
        world: WorldConfig {
            size_x: 128,
            size_z: 128,
            render_distance_chunks: 2,
            ..Default::default()
        },
        ..Default::default()
    };
    config.render.window_width = 640;
    config.render.window_height = 360;

    c.bench_function("game_frame", |b| {
        let mut game = Game::new(config.clone()).expect("procedural textures");
        let mut input = InputState::default();
        b.iter(|| black_box(game.frame(&mut input, 1.0 / 60.0)));
    });
}

criterion_group!(
    benches,
    bench_terrain_generation,
    bench_height_map,
    bench_raycast,
    bench_player_step,
    bench_game_frame,
);
criterion_main!(benches);
