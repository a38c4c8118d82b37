// Generation throughput: resolver, parallel survey, full star systems, and
// planet terrain.
//
// Run with: cargo bench -p cosmic_fortune_sim --bench generation

use cosmic_fortune_sim::config::TerrainConfig;
use cosmic_fortune_sim::context::GenContext;
use cosmic_fortune_sim::galaxy::{Detail, body_at, survey};
use cosmic_fortune_sim::star_system::StarSystem;
use cosmic_fortune_sim::terrain::ChunkGrid;
use cosmic_fortune_sim::types::SectorCoord;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

fn bench_resolver(c: &mut Criterion) {
    let ctx = GenContext::new(44);
    let mut group = c.benchmark_group("resolver");
    group.throughput(Throughput::Elements(256 * 256));
    group.bench_function("serial_256x256", |b| {
        b.iter(|| {
            let mut occupied = 0u32;
            for y in 0..256 {
                for x in 0..256 {
                    if body_at(&ctx, SectorCoord::new(x, y)).is_some() {
                        occupied += 1;
                    }
                }
            }
            black_box(occupied)
        });
    });
    group.bench_function("survey_256x256", |b| {
        b.iter(|| black_box(survey(&ctx, SectorCoord::new(0, 0), 256, 256)));
    });
    group.finish();
}

fn bench_star_systems(c: &mut Criterion) {
    let ctx = GenContext::new(44);
    let systems: Vec<SectorCoord> = survey(&ctx, SectorCoord::new(0, 0), 200, 200)
        .into_iter()
        .map(|entry| entry.coord)
        .collect();
    c.bench_function("star_system_full", |b| {
        let mut i = 0;
        b.iter(|| {
            i = (i + 1) % systems.len();
            black_box(StarSystem::generate(&ctx, systems[i], Detail::Full))
        });
    });
}

fn bench_terrain(c: &mut Criterion) {
    let ctx = GenContext::new(44);
    let config = TerrainConfig::default();
    let planets: Vec<_> = (0..400)
        .flat_map(|x| StarSystem::generate(&ctx, SectorCoord::new(x, 0), Detail::Full).planets)
        .collect();
    c.bench_function("terrain_generate", |b| {
        let mut i = 0;
        b.iter(|| {
            i = (i + 1) % planets.len();
            black_box(ChunkGrid::generate(&ctx, &planets[i], &config))
        });
    });
}

criterion_group!(benches, bench_resolver, bench_star_systems, bench_terrain);
criterion_main!(benches);
